//! The animation state machine for one actor.
//!
//! A [`Fighter`] pairs an [`Actor`] with its [`AnimationCursor`] and the clip
//! library of its kind. The battle driver calls into it in a fixed order each
//! tick: [`Fighter::advance_frame`] when the shared frame timer fires, then
//! [`Fighter::apply_intent`] for each discrete intent, then
//! [`Fighter::evaluate`] once with whatever move key is still held.
//!
//! `evaluate` is a priority list; the first rule that applies wins:
//!
//! 1. An attack clip is playing: it keeps playing. Held movement still slides
//!    the actor at walk speed unless the kind is rooted while attacking.
//! 2. Airborne: the clip is `jump`. Held movement slides at walk speed.
//! 3. A move key is held: move and play `walk`.
//! 4. The clip is `jump` and the actor is back on the ground: rewind `idle`.
//! 5. Otherwise pick an idle clip according to the kind's [`IdlePolicy`].

use std::sync::Arc;

use fastrand::Rng;

use crate::actor::{Actor, Facing, Seat};
use crate::animation::{AnimationCursor, ClipLibrary, ClipTag};
use crate::battle::FighterSnapshot;
use crate::character::{CharacterKind, IdlePolicy};
use crate::error::BattleError;
use crate::input::Intent;

/// Costs and odds the transitions depend on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRules {
    pub attack_cost: u32,
    /// Chance per evaluation that an idle [`IdlePolicy::RareVariant`] actor
    /// starts `idle_2`.
    pub idle_variant_chance: f64,
}

impl Default for AnimationRules {
    fn default() -> Self {
        Self {
            attack_cost: 5,
            idle_variant_chance: 0.004,
        }
    }
}

/// A move key held this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveHold {
    pub direction: Facing,
    pub running: bool,
}

impl MoveHold {
    /// The last `MoveHeld` among a tick's intents, if any.
    pub fn from_intents(intents: &[Intent]) -> Option<Self> {
        intents.iter().rev().find_map(|intent| match *intent {
            Intent::MoveHeld { direction, running } => Some(Self { direction, running }),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Fighter {
    pub seat: Seat,
    pub actor: Actor,
    pub cursor: AnimationCursor,
    library: Arc<ClipLibrary>,
}

impl Fighter {
    /// A fighter standing in `idle` on frame 0.
    pub fn new(seat: Seat, actor: Actor, library: Arc<ClipLibrary>, now_ms: u64) -> Self {
        Self {
            seat,
            actor,
            cursor: AnimationCursor::new(ClipTag::Idle, now_ms),
            library,
        }
    }

    pub fn kind(&self) -> CharacterKind {
        self.actor.kind
    }

    /// True while this fighter's idle variant slows the shared frame timer.
    pub fn is_slow_idle(&self) -> bool {
        self.actor.kind == CharacterKind::Wizard && self.cursor.clip == ClipTag::Idle2
    }

    /// Step the cursor one frame. A one-shot clip (attack or jump) that
    /// wraps hands control back to the idle family on frame 0.
    pub fn advance_frame(&mut self, now_ms: u64, rng: &mut Rng) -> Result<(), BattleError> {
        let wrapped = self.cursor.advance(&self.library, now_ms)?;
        if wrapped && self.cursor.clip.returns_to_idle() {
            log::debug!("{}: '{}' finished", self.seat.label(), self.cursor.clip);
            self.finish_one_shot(rng)?;
        }
        Ok(())
    }

    /// Handle one discrete intent. `MoveHeld` is level-triggered and only
    /// read by [`Fighter::evaluate`].
    pub fn apply_intent(
        &mut self,
        intent: Intent,
        rng: &mut Rng,
        rules: &AnimationRules,
    ) -> Result<(), BattleError> {
        match intent {
            Intent::JumpPressed => {
                self.jump()?;
            }
            Intent::AttackPressed => {
                self.attack(rng, rules)?;
            }
            Intent::MoveReleased => self.release_movement()?,
            Intent::MoveHeld { .. } => {}
        }
        Ok(())
    }

    /// Start a jump. Returns false when already airborne. The frame index
    /// carries over from the previous clip.
    pub fn jump(&mut self) -> Result<bool, BattleError> {
        self.library.require(ClipTag::Jump)?;
        if !self.actor.jump() {
            return Ok(false);
        }
        self.cursor.switch(ClipTag::Jump, &self.library)?;
        log::debug!("{} ({}) jumps", self.seat.label(), self.actor.kind);
        Ok(true)
    }

    /// Spend the attack cost and start a random attack clip from frame 0.
    /// Returns false, changing nothing, when the pool cannot cover the cost.
    pub fn attack(&mut self, rng: &mut Rng, rules: &AnimationRules) -> Result<bool, BattleError> {
        if !self.actor.resource.can_afford(rules.attack_cost) {
            log::trace!(
                "{}: {} {} is short of {}",
                self.seat.label(),
                self.actor.resource.kind,
                self.actor.resource.value,
                rules.attack_cost
            );
            return Ok(false);
        }
        let choices = self.actor.kind.attack_clips();
        let tag = choices[rng.usize(..choices.len())];
        self.cursor.restart(tag, &self.library)?;
        self.actor.resource.try_spend(rules.attack_cost);
        log::debug!(
            "{} ({}) attacks with '{}', {} left: {}",
            self.seat.label(),
            self.actor.kind,
            tag,
            self.actor.resource.kind,
            self.actor.resource.value
        );
        Ok(true)
    }

    /// A move key went up: back to `idle` immediately, whatever was playing.
    pub fn release_movement(&mut self) -> Result<(), BattleError> {
        self.cursor.switch(ClipTag::Idle, &self.library)
    }

    /// Apply the priority rules once for this tick.
    pub fn evaluate(
        &mut self,
        held: Option<MoveHold>,
        rng: &mut Rng,
        rules: &AnimationRules,
    ) -> Result<(), BattleError> {
        let clip = self.cursor.clip;

        if clip.is_attack() {
            if let Some(hold) = held {
                if !self.actor.kind.roots_during_attack() {
                    self.actor.move_horizontally(hold.direction, false);
                }
            }
            return Ok(());
        }

        if self.actor.airborne {
            self.cursor.switch(ClipTag::Jump, &self.library)?;
            if let Some(hold) = held {
                self.actor.move_horizontally(hold.direction, false);
            }
            return Ok(());
        }

        if let Some(hold) = held {
            self.actor.move_horizontally(hold.direction, hold.running);
            return self.cursor.switch(ClipTag::Walk, &self.library);
        }

        if clip == ClipTag::Jump {
            if self.actor.is_grounded() {
                return self.cursor.restart(ClipTag::Idle, &self.library);
            }
            return Ok(());
        }

        self.select_idle(rng, rules)
    }

    fn select_idle(&mut self, rng: &mut Rng, rules: &AnimationRules) -> Result<(), BattleError> {
        match self.actor.kind.idle_policy() {
            IdlePolicy::Single => self.cursor.switch(ClipTag::Idle, &self.library),
            IdlePolicy::RareVariant => {
                if self.cursor.clip == ClipTag::Idle2
                    && self.cursor.on_final_frame(&self.library)?
                {
                    self.cursor.restart(ClipTag::Idle, &self.library)
                } else if self.cursor.clip == ClipTag::Idle
                    && rng.f64() < rules.idle_variant_chance
                {
                    log::debug!("{} ({}) starts idle_2", self.seat.label(), self.actor.kind);
                    self.cursor.restart(ClipTag::Idle2, &self.library)
                } else {
                    // Anything else, including a `walk` left over from a
                    // dropped key, keeps playing.
                    Ok(())
                }
            }
            IdlePolicy::Flicker => {
                let tag = self.flicker_idle(rng);
                self.cursor.switch(tag, &self.library)
            }
        }
    }

    fn finish_one_shot(&mut self, rng: &mut Rng) -> Result<(), BattleError> {
        let tag = match self.actor.kind.idle_policy() {
            IdlePolicy::Flicker => self.flicker_idle(rng),
            IdlePolicy::Single | IdlePolicy::RareVariant => ClipTag::Idle,
        };
        self.cursor.restart(tag, &self.library)
    }

    fn flicker_idle(&self, rng: &mut Rng) -> ClipTag {
        if self.library.has(ClipTag::Idle2) && rng.bool() {
            ClipTag::Idle2
        } else {
            ClipTag::Idle
        }
    }

    /// Read-only view for the renderer. Repairs a stale frame index first.
    pub fn snapshot(&mut self) -> Result<FighterSnapshot, BattleError> {
        let frame = self.cursor.settle(&self.library)?;
        let sprite = self
            .library
            .require(self.cursor.clip)?
            .frame(frame)
            .cloned()
            .ok_or(BattleError::ClipNotInLibrary {
                kind: self.actor.kind,
                clip: self.cursor.clip,
            })?;
        Ok(FighterSnapshot {
            seat: self.seat,
            kind: self.actor.kind,
            x: self.actor.position.x,
            y: self.actor.position.y,
            facing: self.actor.facing,
            clip: self.cursor.clip,
            frame,
            sprite,
            health: self.actor.health,
            defense: self.actor.defense,
            resource_kind: self.actor.resource.kind,
            resource_value: self.actor.resource.value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Roster;
    use glam::Vec2;

    fn fighter(kind: CharacterKind) -> Fighter {
        let roster = Roster::builtin().expect("builtin roster");
        let actor = Actor::new(kind, Seat::One, Vec2::new(200.0, 480.0));
        Fighter::new(Seat::One, actor, roster.animation_library(kind), 0)
    }

    fn walk_right() -> Option<MoveHold> {
        Some(MoveHold {
            direction: Facing::Right,
            running: false,
        })
    }

    #[test]
    fn attack_needs_full_cost() {
        let mut rng = Rng::with_seed(1);
        let rules = AnimationRules::default();
        let mut f = fighter(CharacterKind::Knight);

        f.actor.resource.value = 4;
        assert!(!f.attack(&mut rng, &rules).unwrap());
        assert_eq!(f.cursor.clip, ClipTag::Idle);
        assert_eq!(f.actor.resource.value, 4);

        f.actor.resource.value = 5;
        assert!(f.attack(&mut rng, &rules).unwrap());
        assert!(f.cursor.clip.is_attack());
        assert_eq!(f.cursor.frame, 0);
        assert_eq!(f.actor.resource.value, 0);
    }

    #[test]
    fn attack_choice_stays_in_kind_set() {
        let mut rng = Rng::with_seed(9);
        let rules = AnimationRules::default();
        for &kind in CharacterKind::ALL {
            let mut f = fighter(kind);
            for _ in 0..10 {
                f.actor.resource.value = 100;
                f.attack(&mut rng, &rules).unwrap();
                assert!(kind.attack_clips().contains(&f.cursor.clip));
            }
        }
    }

    #[test]
    fn attack_in_progress_blocks_walk_but_slides() {
        let mut rng = Rng::with_seed(2);
        let rules = AnimationRules::default();
        let mut f = fighter(CharacterKind::Knight);
        f.attack(&mut rng, &rules).unwrap();
        let clip = f.cursor.clip;

        f.evaluate(walk_right(), &mut rng, &rules).unwrap();
        assert_eq!(f.cursor.clip, clip);
        assert_eq!(f.actor.position.x, 205.0);
    }

    #[test]
    fn archer_is_rooted_while_shooting() {
        let mut rng = Rng::with_seed(3);
        let rules = AnimationRules::default();
        let mut f = fighter(CharacterKind::Archer);
        f.attack(&mut rng, &rules).unwrap();
        assert!(matches!(f.cursor.clip, ClipTag::Shot1 | ClipTag::Shot2));

        f.evaluate(walk_right(), &mut rng, &rules).unwrap();
        assert_eq!(f.actor.position.x, 200.0);
    }

    #[test]
    fn release_cancels_attack_and_keeps_frame() {
        let mut f = fighter(CharacterKind::Knight);
        f.cursor.restart(ClipTag::Attack1, f.library.as_ref()).unwrap();
        f.cursor.frame = 3;

        f.release_movement().unwrap();
        assert_eq!(f.cursor.clip, ClipTag::Idle);
        assert_eq!(f.cursor.frame, 3);
    }

    #[test]
    fn held_move_walks() {
        let mut rng = Rng::with_seed(5);
        let rules = AnimationRules::default();
        let mut f = fighter(CharacterKind::Musketeer);
        f.evaluate(
            Some(MoveHold {
                direction: Facing::Left,
                running: false,
            }),
            &mut rng,
            &rules,
        )
        .unwrap();
        assert_eq!(f.cursor.clip, ClipTag::Walk);
        assert_eq!(f.actor.facing, Facing::Left);
        assert_eq!(f.actor.position.x, 195.0);
    }

    #[test]
    fn airborne_forces_jump_clip() {
        let mut rng = Rng::with_seed(6);
        let rules = AnimationRules::default();
        let mut f = fighter(CharacterKind::Knight);
        assert!(f.jump().unwrap());
        assert!(!f.jump().unwrap());
        f.actor.update_physics();

        f.evaluate(walk_right(), &mut rng, &rules).unwrap();
        assert_eq!(f.cursor.clip, ClipTag::Jump);
        assert_eq!(f.actor.position.x, 205.0);
    }

    #[test]
    fn landing_rewinds_idle() {
        let mut rng = Rng::with_seed(7);
        let rules = AnimationRules::default();
        let mut f = fighter(CharacterKind::Archer);
        f.jump().unwrap();
        f.cursor.frame = 4;
        while f.actor.airborne {
            f.actor.update_physics();
        }

        f.evaluate(None, &mut rng, &rules).unwrap();
        assert_eq!(f.cursor.clip, ClipTag::Idle);
        assert_eq!(f.cursor.frame, 0);
    }

    #[test]
    fn finished_attack_returns_to_idle() {
        let mut rng = Rng::with_seed(8);
        let mut f = fighter(CharacterKind::Wizard);
        f.cursor.restart(ClipTag::Attack2, f.library.as_ref()).unwrap();
        for step in 1..=4u64 {
            f.advance_frame(step * 101, &mut rng).unwrap();
        }
        assert_eq!(f.cursor.clip, ClipTag::Idle);
        assert_eq!(f.cursor.frame, 0);
    }

    #[test]
    fn looping_clips_wrap_in_place() {
        let mut rng = Rng::with_seed(10);
        let mut f = fighter(CharacterKind::Knight);
        f.cursor.switch(ClipTag::Walk, f.library.as_ref()).unwrap();
        for step in 1..=8u64 {
            f.advance_frame(step * 101, &mut rng).unwrap();
        }
        assert_eq!(f.cursor.clip, ClipTag::Walk);
        assert_eq!(f.cursor.frame, 0);
    }

    #[test]
    fn wizard_rare_idle_plays_once() {
        let mut rng = Rng::with_seed(11);
        let always = AnimationRules {
            idle_variant_chance: 1.0,
            ..AnimationRules::default()
        };
        let mut f = fighter(CharacterKind::Wizard);
        f.evaluate(None, &mut rng, &always).unwrap();
        assert_eq!(f.cursor.clip, ClipTag::Idle2);
        assert!(f.is_slow_idle());

        // Mid-clip, the variant keeps playing.
        f.cursor.frame = 2;
        f.evaluate(None, &mut rng, &always).unwrap();
        assert_eq!(f.cursor.clip, ClipTag::Idle2);

        f.cursor.frame = 4;
        f.evaluate(None, &mut rng, &always).unwrap();
        assert_eq!(f.cursor.clip, ClipTag::Idle);
        assert_eq!(f.cursor.frame, 0);
    }

    #[test]
    fn wizard_never_varies_at_zero_chance() {
        let mut rng = Rng::with_seed(12);
        let never = AnimationRules {
            idle_variant_chance: 0.0,
            ..AnimationRules::default()
        };
        let mut f = fighter(CharacterKind::Wizard);
        for _ in 0..500 {
            f.evaluate(None, &mut rng, &never).unwrap();
            assert_eq!(f.cursor.clip, ClipTag::Idle);
        }
    }

    #[test]
    fn wizard_keeps_walk_without_release() {
        let mut rng = Rng::with_seed(15);
        let never = AnimationRules {
            idle_variant_chance: 0.0,
            ..AnimationRules::default()
        };
        let mut f = fighter(CharacterKind::Wizard);
        f.evaluate(walk_right(), &mut rng, &never).unwrap();
        assert_eq!(f.cursor.clip, ClipTag::Walk);

        // Keys cleared without a release event: no rule picks a new clip.
        for _ in 0..10 {
            f.evaluate(None, &mut rng, &never).unwrap();
            assert_eq!(f.cursor.clip, ClipTag::Walk);
        }

        f.release_movement().unwrap();
        f.evaluate(None, &mut rng, &never).unwrap();
        assert_eq!(f.cursor.clip, ClipTag::Idle);
    }

    #[test]
    fn swordsman_flickers_between_idles() {
        let mut rng = Rng::with_seed(13);
        let rules = AnimationRules::default();
        let mut f = fighter(CharacterKind::Swordsman);
        let mut seen_variant = false;
        let mut seen_idle = false;
        for _ in 0..64 {
            f.evaluate(None, &mut rng, &rules).unwrap();
            match f.cursor.clip {
                ClipTag::Idle => seen_idle = true,
                ClipTag::Idle2 => seen_variant = true,
                other => panic!("unexpected clip {other}"),
            }
        }
        assert!(seen_idle && seen_variant);
    }

    #[test]
    fn knight_without_variant_stays_idle() {
        let mut rng = Rng::with_seed(14);
        let rules = AnimationRules::default();
        let mut f = fighter(CharacterKind::Knight);
        f.cursor.switch(ClipTag::Walk, f.library.as_ref()).unwrap();
        f.evaluate(None, &mut rng, &rules).unwrap();
        assert_eq!(f.cursor.clip, ClipTag::Idle);
    }

    #[test]
    fn snapshot_repairs_stale_frame() {
        let mut f = fighter(CharacterKind::Swordsman);
        f.cursor.frame = 7;
        f.cursor.switch(ClipTag::Idle2, f.library.as_ref()).unwrap();
        let snap = f.snapshot().unwrap();
        assert_eq!(snap.clip, ClipTag::Idle2);
        assert_eq!(snap.frame, 0);
        assert_eq!(f.cursor.frame, 0);
        assert_eq!(snap.sprite.as_str(), "assets/characters/Swordsman/idle_2/00.png");
    }

    #[test]
    fn move_hold_takes_last_held_intent() {
        let intents = [
            Intent::JumpPressed,
            Intent::MoveHeld {
                direction: Facing::Left,
                running: false,
            },
            Intent::MoveReleased,
            Intent::MoveHeld {
                direction: Facing::Right,
                running: true,
            },
        ];
        assert_eq!(
            MoveHold::from_intents(&intents),
            Some(MoveHold {
                direction: Facing::Right,
                running: true
            })
        );
        assert_eq!(MoveHold::from_intents(&[Intent::AttackPressed]), None);
    }
}
