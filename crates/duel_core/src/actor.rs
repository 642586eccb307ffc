//! One live combatant: position, facing, health, resource pool and the
//! vertical jump physics.
//!
//! Horizontal movement has no velocity: each call to
//! [`Actor::move_horizontally`] shifts the actor by one tick's worth of speed
//! and the driver repeats it for as long as the input is held. Vertical motion
//! is integrated once per tick in [`Actor::update_physics`].

use glam::Vec2;

use crate::character::{base_stats, CharacterKind};
use crate::resource::ResourcePool;

/// Downward acceleration, units per tick squared.
pub const DEFAULT_GRAVITY: f32 = 0.7;

/// Which side of the arena a player starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    One,
    Two,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::One, Seat::Two];

    pub fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    /// Player one starts facing right, player two facing left.
    pub fn default_facing(self) -> Facing {
        match self {
            Self::One => Facing::Right,
            Self::Two => Facing::Left,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::One => "Player 1",
            Self::Two => "Player 2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// +1 for right, -1 for left.
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Axis-aligned limits for an actor's anchor point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn clamp(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            position.x.max(self.min_x).min(self.max_x),
            position.y.max(self.min_y).min(self.max_y),
        )
    }
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub kind: CharacterKind,
    pub position: Vec2,
    pub ground_y: f32,
    pub facing: Facing,
    pub health: u32,
    pub defense: u32,
    pub resource: ResourcePool,
    pub airborne: bool,
    pub vertical_velocity: f32,
    pub gravity: f32,
    pub jump_impulse: f32,
    pub speed_walk: f32,
    pub speed_run: f32,
}

impl Actor {
    /// Create an actor standing on the ground at `spawn`.
    pub fn new(kind: CharacterKind, seat: Seat, spawn: Vec2) -> Self {
        let stats = base_stats(kind);
        Self {
            kind,
            position: spawn,
            ground_y: spawn.y,
            facing: seat.default_facing(),
            health: stats.health,
            defense: stats.defense,
            resource: ResourcePool::new(kind.resource_kind()),
            airborne: false,
            vertical_velocity: 0.0,
            gravity: DEFAULT_GRAVITY,
            jump_impulse: stats.jump_height,
            speed_walk: stats.speed_walk,
            speed_run: stats.speed_run,
        }
    }

    /// Face `facing` and shift one tick's worth of walk or run speed.
    pub fn move_horizontally(&mut self, facing: Facing, running: bool) {
        self.facing = facing;
        let speed = if running {
            self.speed_run
        } else {
            self.speed_walk
        };
        self.position.x += facing.sign() * speed;
    }

    /// Start a jump from the ground. Returns false (and does nothing) while
    /// already airborne.
    pub fn jump(&mut self) -> bool {
        if self.airborne {
            return false;
        }
        self.airborne = true;
        self.vertical_velocity = -self.jump_impulse;
        true
    }

    /// Integrate one tick of vertical motion. Landing snaps to `ground_y`.
    pub fn update_physics(&mut self) {
        if !self.airborne {
            return;
        }
        self.position.y += self.vertical_velocity;
        self.vertical_velocity += self.gravity;

        if self.position.y >= self.ground_y {
            self.position.y = self.ground_y;
            self.airborne = false;
            self.vertical_velocity = 0.0;
        }
    }

    /// Apply a hit. Defense absorbs damage but at least 1 point always
    /// lands. Returns true once health reaches 0.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        let effective = amount.saturating_sub(self.defense).max(1);
        self.health = self.health.saturating_sub(effective);
        self.health == 0
    }

    pub fn is_grounded(&self) -> bool {
        !self.airborne && self.position.y >= self.ground_y
    }

    pub fn clamp_to(&mut self, bounds: &Bounds) {
        self.position = bounds.clamp(self.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knight() -> Actor {
        Actor::new(CharacterKind::Knight, Seat::One, Vec2::new(200.0, 480.0))
    }

    #[test]
    fn seats_face_each_other() {
        let p1 = Actor::new(CharacterKind::Wizard, Seat::One, Vec2::ZERO);
        let p2 = Actor::new(CharacterKind::Wizard, Seat::Two, Vec2::ZERO);
        assert_eq!(p1.facing, Facing::Right);
        assert_eq!(p2.facing, Facing::Left);
    }

    #[test]
    fn move_uses_walk_or_run_speed() {
        let mut actor = knight();
        actor.move_horizontally(Facing::Left, false);
        assert_eq!(actor.position.x, 195.0);
        assert_eq!(actor.facing, Facing::Left);

        actor.move_horizontally(Facing::Right, true);
        assert_eq!(actor.position.x, 205.0);
        assert_eq!(actor.facing, Facing::Right);
    }

    #[test]
    fn jump_is_ignored_while_airborne() {
        let mut actor = knight();
        assert!(actor.jump());
        assert!(actor.airborne);
        assert_eq!(actor.vertical_velocity, -15.0);

        actor.update_physics();
        let velocity = actor.vertical_velocity;
        assert!(!actor.jump());
        assert_eq!(actor.vertical_velocity, velocity);
    }

    #[test]
    fn jump_lands_back_on_ground() {
        let mut actor = knight();
        actor.jump();

        let mut peak = actor.position.y;
        let mut ticks = 0;
        while actor.airborne {
            actor.update_physics();
            peak = peak.min(actor.position.y);
            ticks += 1;
            assert!(ticks < 1000, "jump never landed");
        }

        assert!(peak < actor.ground_y);
        assert_eq!(actor.position.y, actor.ground_y);
        assert_eq!(actor.vertical_velocity, 0.0);

        // Landing is idempotent.
        actor.update_physics();
        actor.update_physics();
        assert_eq!(actor.position.y, actor.ground_y);
        assert!(actor.is_grounded());
    }

    #[test]
    fn damage_is_reduced_by_defense_with_floor_of_one() {
        let mut actor = knight();
        assert!(!actor.take_damage(10));
        assert_eq!(actor.health, 99);

        assert!(!actor.take_damage(70));
        assert_eq!(actor.health, 79);
    }

    #[test]
    fn damage_reports_death_and_floors_health() {
        let mut actor = knight();
        actor.health = 10;
        assert!(actor.take_damage(500));
        assert_eq!(actor.health, 0);

        assert!(actor.take_damage(1));
        assert_eq!(actor.health, 0);
    }

    #[test]
    fn damage_formula_holds_across_inputs() {
        for defense in [0u32, 1, 50] {
            for amount in [0u32, 1, 49, 50, 51, 150, 1000] {
                for start in [1u32, 5, 100] {
                    let mut actor = knight();
                    actor.defense = defense;
                    actor.health = start;
                    let died = actor.take_damage(amount);
                    let expected = start.saturating_sub(amount.saturating_sub(defense).max(1));
                    assert_eq!(actor.health, expected);
                    assert_eq!(died, expected == 0);
                }
            }
        }
    }

    #[test]
    fn bounds_clamp_both_axes() {
        let bounds = Bounds {
            min_x: 50.0,
            max_x: 1820.0,
            min_y: 50.0,
            max_y: 980.0,
        };
        let mut actor = knight();
        actor.position = Vec2::new(5000.0, -300.0);
        actor.clamp_to(&bounds);
        assert_eq!(actor.position, Vec2::new(1820.0, 50.0));

        actor.position = Vec2::new(-10.0, 2000.0);
        actor.clamp_to(&bounds);
        assert_eq!(actor.position, Vec2::new(50.0, 980.0));
    }
}
