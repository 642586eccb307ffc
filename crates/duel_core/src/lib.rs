//! Simulation core for the two-player duel.
//!
//! Everything here is deterministic given a timestamp per tick and a seeded
//! random source. Window, rendering and file-backed content live in other
//! crates and talk to this one through [`input::TickInput`] and
//! [`battle::BattleSnapshot`].

pub mod actor;
pub mod animation;
pub mod battle;
pub mod character;
pub mod config;
pub mod error;
pub mod fighter;
pub mod input;
pub mod resource;
pub mod time;

