//! Mana/stamina pools and the shared regeneration timer.

use std::fmt;

/// Ceiling of every resource pool.
pub const RESOURCE_MAX: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Mana,
    Stamina,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Mana => "Mana",
            Self::Stamina => "Stamina",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One actor's attack budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePool {
    pub kind: ResourceKind,
    pub value: u32,
}

impl ResourcePool {
    /// A full pool.
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            value: RESOURCE_MAX,
        }
    }

    pub fn can_afford(&self, cost: u32) -> bool {
        self.value >= cost
    }

    /// Debit `cost` if the pool can cover it. An insufficient pool is left
    /// untouched and reports false.
    pub fn try_spend(&mut self, cost: u32) -> bool {
        if self.value < cost {
            return false;
        }
        self.value -= cost;
        true
    }

    pub fn refill(&mut self, amount: u32) {
        self.value = (self.value + amount).min(RESOURCE_MAX);
    }
}

/// Passive regeneration amounts and cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegenPolicy {
    pub interval_ms: u64,
    pub mana_per_interval: u32,
    pub stamina_per_interval: u32,
}

impl Default for RegenPolicy {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            mana_per_interval: 1,
            stamina_per_interval: 2,
        }
    }
}

impl RegenPolicy {
    pub fn amount_for(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Mana => self.mana_per_interval,
            ResourceKind::Stamina => self.stamina_per_interval,
        }
    }
}

/// Single timer shared by both actors of a battle.
///
/// Advances in whole intervals from the session start, independent of which
/// tick observed the interval elapsing. After a gap of two or more intervals
/// the clock restarts at the late tick, so missed intervals are dropped
/// rather than paid out one per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegenClock {
    last_regen_ms: u64,
}

impl RegenClock {
    pub fn new(now_ms: u64) -> Self {
        Self {
            last_regen_ms: now_ms,
        }
    }

    /// Returns true at most once per call when an interval has elapsed.
    pub fn poll(&mut self, now_ms: u64, policy: &RegenPolicy) -> bool {
        if now_ms.saturating_sub(self.last_regen_ms) < policy.interval_ms {
            return false;
        }
        let elapsed = now_ms - self.last_regen_ms;
        if elapsed >= policy.interval_ms.saturating_mul(2) {
            log::debug!("Regen clock skipped {elapsed}ms, restarting at {now_ms}ms");
            self.last_regen_ms = now_ms;
        } else {
            self.last_regen_ms += policy.interval_ms;
        }
        true
    }

    pub fn last_regen_ms(&self) -> u64 {
        self.last_regen_ms
    }
}
