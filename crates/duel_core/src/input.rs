//! Keyboard state and the per-tick intents derived from it.
//!
//! - **Level-triggered (held):** `is_held(key)` is true every tick the key is
//!   down. Movement keys are read this way and become a `MoveHeld` intent on
//!   every tick they stay down.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only for the
//!   frame the transition happened, cleared by `end_frame()`. The main loop
//!   calls it only after a fixed step has consumed them, so a press landing
//!   on a frame with zero steps is not lost.

use std::collections::HashSet;

use crate::actor::{Facing, Seat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    A,
    C,
    D,
    I,
    J,
    L,
    N,
    S,
    W,
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    /// Forget everything, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
        self.just_pressed.clear();
        self.just_released.clear();
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// A discrete command for one actor, as consumed by the battle driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// A move key is down this tick.
    MoveHeld { direction: Facing, running: bool },
    /// A move key went up this tick.
    MoveReleased,
    JumpPressed,
    AttackPressed,
}

/// Intents for both seats for one tick, in arrival order per seat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    seats: [Vec<Intent>; 2],
}

impl TickInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, seat: Seat, intent: Intent) {
        self.seats[seat.index()].push(intent);
    }

    pub fn with(mut self, seat: Seat, intent: Intent) -> Self {
        self.push(seat, intent);
        self
    }

    pub fn for_seat(&self, seat: Seat) -> &[Intent] {
        &self.seats[seat.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.seats.iter().all(Vec::is_empty)
    }
}

/// Key layout for one seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerBindings {
    pub left: Key,
    pub right: Key,
    pub jump: Key,
    pub attack: Key,
}

impl PlayerBindings {
    pub fn for_seat(seat: Seat) -> Self {
        match seat {
            Seat::One => Self {
                left: Key::A,
                right: Key::D,
                jump: Key::W,
                attack: Key::C,
            },
            Seat::Two => Self {
                left: Key::J,
                right: Key::L,
                jump: Key::I,
                attack: Key::N,
            },
        }
    }

    /// Translate this tick's key state into intents. Edge events come first
    /// so a release clears the clip before the held key re-selects `walk`.
    pub fn intents(&self, input: &InputState) -> Vec<Intent> {
        let mut intents = Vec::new();
        if input.is_just_pressed(self.jump) {
            intents.push(Intent::JumpPressed);
        }
        if input.is_just_pressed(self.attack) {
            intents.push(Intent::AttackPressed);
        }
        if input.is_just_released(self.left) || input.is_just_released(self.right) {
            intents.push(Intent::MoveReleased);
        }
        // Left wins when both directions are held.
        if input.is_held(self.left) {
            intents.push(Intent::MoveHeld {
                direction: Facing::Left,
                running: false,
            });
        } else if input.is_held(self.right) {
            intents.push(Intent::MoveHeld {
                direction: Facing::Right,
                running: false,
            });
        }
        intents
    }
}

/// Collect intents for both seats with the default layouts.
pub fn collect_intents(input: &InputState) -> TickInput {
    let mut tick = TickInput::new();
    for seat in Seat::BOTH {
        for intent in PlayerBindings::for_seat(seat).intents(input) {
            tick.push(seat, intent);
        }
    }
    tick
}
