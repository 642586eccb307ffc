//! Battle session: two fighters, one clock.
//!
//! [`BattleSession::tick`] is the only entry point that moves the simulation.
//! Each call runs, in order:
//!
//! 1. shared regeneration for both pools,
//! 2. the effective frame delay (slowed while a Wizard plays `idle_2`),
//! 3. one frame advance for both cursors if the delay has passed,
//! 4. each seat's discrete intents, then the animation priority rules,
//! 5. vertical physics,
//! 6. the bounds clamp,
//! 7. a snapshot for the renderer.
//!
//! A [`BattleError`] aborts the tick part way; the session should be dropped.

use fastrand::Rng;

use crate::actor::{Actor, Facing, Seat};
use crate::animation::{ClipTag, FrameHandle};
use crate::character::{CharacterKind, Roster};
use crate::config::BattleConfig;
use crate::error::BattleError;
use crate::fighter::{AnimationRules, Fighter, MoveHold};
use crate::input::TickInput;
use crate::resource::{RegenClock, RegenPolicy, ResourceKind};

/// What the renderer needs to draw one fighter.
#[derive(Debug, Clone, PartialEq)]
pub struct FighterSnapshot {
    pub seat: Seat,
    pub kind: CharacterKind,
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub clip: ClipTag,
    pub frame: usize,
    pub sprite: FrameHandle,
    pub health: u32,
    pub defense: u32,
    pub resource_kind: ResourceKind,
    pub resource_value: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BattleSnapshot {
    /// Ticks completed so far.
    pub tick: u64,
    pub now_ms: u64,
    pub fighters: [FighterSnapshot; 2],
}

impl BattleSnapshot {
    pub fn fighter(&self, seat: Seat) -> &FighterSnapshot {
        &self.fighters[seat.index()]
    }
}

pub struct BattleSession {
    fighters: [Fighter; 2],
    config: BattleConfig,
    rules: AnimationRules,
    regen_policy: RegenPolicy,
    regen_clock: RegenClock,
    last_frame_ms: u64,
    tick_count: u64,
    now_ms: u64,
    rng: Rng,
}

impl BattleSession {
    /// Start a battle at `now_ms` with an entropy-seeded random source.
    pub fn new(
        roster: &Roster,
        player_one: CharacterKind,
        player_two: CharacterKind,
        config: BattleConfig,
        now_ms: u64,
    ) -> Self {
        Self::with_rng(roster, player_one, player_two, config, now_ms, Rng::new())
    }

    /// Start a battle whose random choices replay identically for `seed`.
    pub fn with_seed(
        roster: &Roster,
        player_one: CharacterKind,
        player_two: CharacterKind,
        config: BattleConfig,
        now_ms: u64,
        seed: u64,
    ) -> Self {
        Self::with_rng(
            roster,
            player_one,
            player_two,
            config,
            now_ms,
            Rng::with_seed(seed),
        )
    }

    fn with_rng(
        roster: &Roster,
        player_one: CharacterKind,
        player_two: CharacterKind,
        config: BattleConfig,
        now_ms: u64,
        rng: Rng,
    ) -> Self {
        let make = |seat: Seat, kind: CharacterKind| {
            let actor = Actor::new(kind, seat, config.spawn_point(seat));
            Fighter::new(seat, actor, roster.animation_library(kind), now_ms)
        };
        let fighters = [make(Seat::One, player_one), make(Seat::Two, player_two)];
        log::info!("Battle started: {} vs {}", player_one, player_two);

        Self {
            fighters,
            rules: AnimationRules {
                attack_cost: config.attack_cost,
                idle_variant_chance: config.idle_variant_chance,
            },
            regen_policy: config.regen_policy(),
            regen_clock: RegenClock::new(now_ms),
            last_frame_ms: now_ms,
            tick_count: 0,
            now_ms,
            config,
            rng,
        }
    }

    pub fn fighter(&self, seat: Seat) -> &Fighter {
        &self.fighters[seat.index()]
    }

    pub fn fighter_mut(&mut self, seat: Seat) -> &mut Fighter {
        &mut self.fighters[seat.index()]
    }

    /// Timestamp of the last frame advance, shared by both cursors.
    pub fn last_frame_ms(&self) -> u64 {
        self.last_frame_ms
    }

    /// Frame delay for this tick. Both fighters share one timer, so a
    /// Wizard in `idle_2` slows its opponent's animation too.
    pub fn effective_frame_delay_ms(&self) -> u64 {
        if self.fighters.iter().any(Fighter::is_slow_idle) {
            self.config.slow_frame_delay_ms()
        } else {
            self.config.frame_delay_ms
        }
    }

    /// Run one simulation step at `now_ms`. Timestamps must not decrease.
    pub fn tick(&mut self, now_ms: u64, input: &TickInput) -> Result<BattleSnapshot, BattleError> {
        self.now_ms = now_ms;

        if self.regen_clock.poll(now_ms, &self.regen_policy) {
            for fighter in &mut self.fighters {
                let pool = &mut fighter.actor.resource;
                pool.refill(self.regen_policy.amount_for(pool.kind));
            }
            log::trace!(
                "Regen at {}ms: {} / {}",
                now_ms,
                self.fighters[0].actor.resource.value,
                self.fighters[1].actor.resource.value
            );
        }

        let delay = self.effective_frame_delay_ms();
        if now_ms.saturating_sub(self.last_frame_ms) > delay {
            self.last_frame_ms = now_ms;
            for fighter in &mut self.fighters {
                fighter.advance_frame(now_ms, &mut self.rng)?;
            }
        }

        for fighter in &mut self.fighters {
            let intents = input.for_seat(fighter.seat);
            for &intent in intents {
                fighter.apply_intent(intent, &mut self.rng, &self.rules)?;
            }
            fighter.evaluate(MoveHold::from_intents(intents), &mut self.rng, &self.rules)?;
        }

        for fighter in &mut self.fighters {
            fighter.actor.update_physics();
        }

        let bounds = self.config.bounds();
        for fighter in &mut self.fighters {
            fighter.actor.clamp_to(&bounds);
        }

        self.tick_count += 1;
        self.snapshot()
    }

    /// Current state for rendering without advancing anything.
    pub fn snapshot(&mut self) -> Result<BattleSnapshot, BattleError> {
        let [one, two] = &mut self.fighters;
        Ok(BattleSnapshot {
            tick: self.tick_count,
            now_ms: self.now_ms,
            fighters: [one.snapshot()?, two.snapshot()?],
        })
    }
}
