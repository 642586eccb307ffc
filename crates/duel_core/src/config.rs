//! Tunable battle constants.
//!
//! Every field has a default matching the shipped game, so a config file only
//! needs the values it changes. The JSON loader validates ranges the driver
//! relies on (non-zero delays, a bounds box that is not inverted, a real
//! probability).

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::Deserialize;

use crate::actor::{Bounds, Seat};
use crate::resource::RegenPolicy;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub screen_width: f32,
    pub screen_height: f32,
    /// Minimum interval between animation frame advances.
    pub frame_delay_ms: u64,
    /// Frame delay multiplier while a Wizard plays `idle_2`.
    pub slow_idle_multiplier: u64,
    pub regen_interval_ms: u64,
    pub mana_regen: u32,
    pub stamina_regen: u32,
    pub attack_cost: u32,
    /// Per-evaluation chance that an idle Wizard starts `idle_2`.
    pub idle_variant_chance: f64,
    /// Lowest x and y an actor may occupy.
    pub bounds_min: f32,
    /// Distance from the right and bottom screen edges actors stay inside.
    pub bounds_inset: f32,
    /// Ground line, measured up from the bottom edge.
    pub ground_offset: f32,
    pub spawn_x_one: f32,
    /// Measured from the right screen edge.
    pub spawn_inset_two: f32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            screen_width: 1920.0,
            screen_height: 1080.0,
            frame_delay_ms: 100,
            slow_idle_multiplier: 4,
            regen_interval_ms: 1000,
            mana_regen: 1,
            stamina_regen: 2,
            attack_cost: 5,
            idle_variant_chance: 0.004,
            bounds_min: 50.0,
            bounds_inset: 100.0,
            ground_offset: 600.0,
            spawn_x_one: 200.0,
            spawn_inset_two: 300.0,
        }
    }
}

impl BattleConfig {
    pub fn bounds(&self) -> Bounds {
        Bounds {
            min_x: self.bounds_min,
            max_x: self.screen_width - self.bounds_inset,
            min_y: self.bounds_min,
            max_y: self.screen_height - self.bounds_inset,
        }
    }

    pub fn ground_y(&self) -> f32 {
        self.screen_height - self.ground_offset
    }

    pub fn spawn_point(&self, seat: Seat) -> Vec2 {
        let x = match seat {
            Seat::One => self.spawn_x_one,
            Seat::Two => self.screen_width - self.spawn_inset_two,
        };
        Vec2::new(x, self.ground_y())
    }

    pub fn regen_policy(&self) -> RegenPolicy {
        RegenPolicy {
            interval_ms: self.regen_interval_ms,
            mana_per_interval: self.mana_regen,
            stamina_per_interval: self.stamina_regen,
        }
    }

    pub fn slow_frame_delay_ms(&self) -> u64 {
        self.frame_delay_ms * self.slow_idle_multiplier
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.frame_delay_ms == 0 {
            return Err("Battle config validation failed: frame_delay_ms must be > 0".to_string());
        }
        if self.slow_idle_multiplier == 0 {
            return Err(
                "Battle config validation failed: slow_idle_multiplier must be > 0".to_string(),
            );
        }
        if self.regen_interval_ms == 0 {
            return Err(
                "Battle config validation failed: regen_interval_ms must be > 0".to_string(),
            );
        }
        if !(0.0..=1.0).contains(&self.idle_variant_chance) {
            return Err(format!(
                "Battle config validation failed: idle_variant_chance {} is not a probability",
                self.idle_variant_chance
            ));
        }
        let bounds = self.bounds();
        if bounds.min_x > bounds.max_x || bounds.min_y > bounds.max_y {
            return Err(format!(
                "Battle config validation failed: bounds are inverted ({:?})",
                bounds
            ));
        }
        Ok(())
    }
}

/// Load and validate a battle config file.
pub fn load_battle_config(path: &Path) -> Result<BattleConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read battle config {}: {e}", path.display()))?;
    let config: BattleConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse battle config {}: {e}", path.display()))?;
    config.validate()?;
    Ok(config)
}
