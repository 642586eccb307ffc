//! Character model: playable kinds, their fixed stats, and the roster of clip
//! libraries built once at startup.
//!
//! The roster is the only place clip libraries are created. Construction
//! checks every kind against the clips its animation rules will ask for, so
//! a roster that builds successfully can never make a transition fail at
//! runtime.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::animation::{AnimationClip, ClipLibrary, ClipTag, FrameHandle};
use crate::error::RosterError;
use crate::resource::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CharacterKind {
    Archer,
    Enchantress,
    Knight,
    Musketeer,
    Swordsman,
    Wizard,
}

/// How a kind picks its idle clip when nothing else is happening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdlePolicy {
    /// Always `idle`.
    Single,
    /// `idle`, with a rare one-shot `idle_2` played at a slower frame rate.
    RareVariant,
    /// Re-rolls between `idle` and `idle_2` on every evaluation when the
    /// library has `idle_2`, otherwise `idle`.
    Flicker,
}

impl CharacterKind {
    /// Selection order, also used for cycling on the inventory screen.
    pub const ALL: &'static [CharacterKind] = &[
        CharacterKind::Archer,
        CharacterKind::Enchantress,
        CharacterKind::Knight,
        CharacterKind::Musketeer,
        CharacterKind::Swordsman,
        CharacterKind::Wizard,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Archer => "Archer",
            Self::Enchantress => "Enchantress",
            Self::Knight => "Knight",
            Self::Musketeer => "Musketeer",
            Self::Swordsman => "Swordsman",
            Self::Wizard => "Wizard",
        }
    }

    pub fn resource_kind(self) -> ResourceKind {
        match self {
            Self::Wizard => ResourceKind::Mana,
            _ => ResourceKind::Stamina,
        }
    }

    /// Clips an attack press chooses from, uniformly.
    pub fn attack_clips(self) -> &'static [ClipTag] {
        match self {
            Self::Archer => &[ClipTag::Shot1, ClipTag::Shot2],
            Self::Enchantress | Self::Knight | Self::Musketeer => &[
                ClipTag::Attack1,
                ClipTag::Attack2,
                ClipTag::Attack3,
                ClipTag::Attack4,
            ],
            Self::Swordsman | Self::Wizard => {
                &[ClipTag::Attack1, ClipTag::Attack2, ClipTag::Attack3]
            }
        }
    }

    pub fn idle_policy(self) -> IdlePolicy {
        match self {
            Self::Archer => IdlePolicy::Single,
            Self::Wizard => IdlePolicy::RareVariant,
            _ => IdlePolicy::Flicker,
        }
    }

    /// Archer shots are rooted: no lateral movement while one plays.
    pub fn roots_during_attack(self) -> bool {
        self == Self::Archer
    }

    /// Every clip the animation rules may request for this kind.
    pub fn required_clips(self) -> Vec<ClipTag> {
        let mut clips = ClipTag::REQUIRED.to_vec();
        clips.extend_from_slice(self.attack_clips());
        if self.idle_policy() == IdlePolicy::RareVariant {
            clips.push(ClipTag::Idle2);
        }
        clips
    }

    /// Next kind in selection order (wraps around).
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|&k| k == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Previous kind in selection order (wraps around).
    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|&k| k == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for CharacterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CharacterKind {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| RosterError::UnknownCharacter(s.to_string()))
    }
}

/// Fixed attributes an actor is created with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseStats {
    pub health: u32,
    pub defense: u32,
    pub speed_walk: f32,
    pub speed_run: f32,
    pub jump_height: f32,
}

/// Every kind currently ships the same numbers; kinds differ by clips and
/// resource type only.
pub const BASE_STATS: BaseStats = BaseStats {
    health: 100,
    defense: 50,
    speed_walk: 5.0,
    speed_run: 10.0,
    jump_height: 15.0,
};

pub fn base_stats(_kind: CharacterKind) -> BaseStats {
    BASE_STATS
}

/// Frame counts per clip for the shipped sprite sets.
///
/// The Archer sheet has no hurt frames, so its `hurt` clip is a 2-frame
/// placeholder. Its 4-frame melee `attack` sheet is not loaded: the Archer
/// only ever plays `shot_1` and `shot_2`.
const BUILTIN_FRAME_COUNTS: &[(CharacterKind, &[(ClipTag, usize)])] = &[
    (
        CharacterKind::Archer,
        &[
            (ClipTag::Idle, 6),
            (ClipTag::Walk, 8),
            (ClipTag::Run, 8),
            (ClipTag::Jump, 9),
            (ClipTag::Dead, 3),
            (ClipTag::Hurt, 2),
            (ClipTag::Shot1, 14),
            (ClipTag::Shot2, 13),
        ],
    ),
    (
        CharacterKind::Enchantress,
        &[
            (ClipTag::Idle, 5),
            (ClipTag::Walk, 8),
            (ClipTag::Run, 8),
            (ClipTag::Jump, 8),
            (ClipTag::Dead, 5),
            (ClipTag::Hurt, 2),
            (ClipTag::Attack1, 6),
            (ClipTag::Attack2, 3),
            (ClipTag::Attack3, 3),
            (ClipTag::Attack4, 10),
        ],
    ),
    (
        CharacterKind::Knight,
        &[
            (ClipTag::Idle, 6),
            (ClipTag::Walk, 8),
            (ClipTag::Run, 7),
            (ClipTag::Jump, 6),
            (ClipTag::Dead, 4),
            (ClipTag::Hurt, 3),
            (ClipTag::Attack1, 5),
            (ClipTag::Attack2, 2),
            (ClipTag::Attack3, 5),
            (ClipTag::Attack4, 5),
        ],
    ),
    (
        CharacterKind::Musketeer,
        &[
            (ClipTag::Idle, 5),
            (ClipTag::Walk, 8),
            (ClipTag::Run, 8),
            (ClipTag::Jump, 7),
            (ClipTag::Dead, 4),
            (ClipTag::Hurt, 2),
            (ClipTag::Attack1, 5),
            (ClipTag::Attack2, 4),
            (ClipTag::Attack3, 6),
            (ClipTag::Attack4, 5),
        ],
    ),
    (
        CharacterKind::Swordsman,
        &[
            (ClipTag::Idle, 8),
            (ClipTag::Idle2, 3),
            (ClipTag::Walk, 8),
            (ClipTag::Run, 8),
            (ClipTag::Jump, 3),
            (ClipTag::Dead, 3),
            (ClipTag::Hurt, 3),
            (ClipTag::Attack1, 6),
            (ClipTag::Attack2, 3),
            (ClipTag::Attack3, 4),
        ],
    ),
    (
        CharacterKind::Wizard,
        &[
            (ClipTag::Idle, 6),
            (ClipTag::Idle2, 5),
            (ClipTag::Walk, 7),
            (ClipTag::Run, 8),
            (ClipTag::Jump, 11),
            (ClipTag::Dead, 4),
            (ClipTag::Hurt, 4),
            (ClipTag::Attack1, 10),
            (ClipTag::Attack2, 4),
            (ClipTag::Attack3, 7),
        ],
    ),
];

/// Process-wide set of clip libraries, one per kind.
#[derive(Debug, Clone)]
pub struct Roster {
    libraries: HashMap<CharacterKind, Arc<ClipLibrary>>,
}

impl Roster {
    /// Roster for the sprite sets shipped under `assets/characters`.
    pub fn builtin() -> Result<Self, RosterError> {
        let counts = BUILTIN_FRAME_COUNTS
            .iter()
            .map(|(kind, clips)| (*kind, clips.to_vec()))
            .collect();
        Self::from_frame_counts(counts)
    }

    /// Build and validate a roster from per-kind clip frame counts.
    pub fn from_frame_counts(
        counts: HashMap<CharacterKind, Vec<(ClipTag, usize)>>,
    ) -> Result<Self, RosterError> {
        let mut libraries = HashMap::new();
        for &kind in CharacterKind::ALL {
            let clip_counts = counts
                .get(&kind)
                .ok_or(RosterError::MissingCharacter(kind))?;
            let mut clips = HashMap::new();
            for &(tag, count) in clip_counts {
                if count == 0 {
                    return Err(RosterError::EmptyClip { kind, clip: tag });
                }
                let frames = (0..count)
                    .map(|i| {
                        FrameHandle::new(format!("assets/characters/{}/{}/{}0.png", kind, tag, i))
                    })
                    .collect();
                clips.insert(tag, AnimationClip { frames });
            }
            for tag in kind.required_clips() {
                if !clips.contains_key(&tag) {
                    return Err(RosterError::MissingClip { kind, clip: tag });
                }
            }
            log::debug!("Roster: {} with {} clips", kind, clips.len());
            libraries.insert(kind, Arc::new(ClipLibrary::new(kind, clips)));
        }
        Ok(Self { libraries })
    }

    /// Parse a roster manifest (see [`load_roster_manifest`]).
    pub fn from_manifest_str(raw: &str) -> Result<Self, RosterError> {
        let manifest: RosterManifestJson =
            serde_json::from_str(raw).map_err(|e| RosterError::Manifest(e.to_string()))?;
        if manifest.version != "0.1" {
            return Err(RosterError::Manifest(format!(
                "unsupported version '{}'",
                manifest.version
            )));
        }

        let mut counts = HashMap::new();
        for (kind_name, clips) in manifest.characters {
            let kind: CharacterKind = kind_name.parse()?;
            let mut clip_counts = Vec::with_capacity(clips.len());
            for (clip_name, frames) in clips {
                let tag = clip_name
                    .parse::<ClipTag>()
                    .map_err(|_| RosterError::UnknownClip {
                        kind,
                        clip: clip_name.clone(),
                    })?;
                clip_counts.push((tag, frames));
            }
            counts.insert(kind, clip_counts);
        }
        Self::from_frame_counts(counts)
    }

    /// Clip library for `kind`. Total: a built roster covers every kind.
    pub fn animation_library(&self, kind: CharacterKind) -> Arc<ClipLibrary> {
        Arc::clone(&self.libraries[&kind])
    }
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct RosterManifestJson {
    version: String,
    characters: BTreeMap<String, BTreeMap<String, usize>>,
}

/// Load a roster manifest from disk.
///
/// ```json
/// { "version": "0.1", "characters": { "Knight": { "idle": 6, "walk": 8 } } }
/// ```
pub fn load_roster_manifest(path: &Path) -> Result<Roster, RosterError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        RosterError::Manifest(format!("failed to read {}: {e}", path.display()))
    })?;
    Roster::from_manifest_str(&raw)
}
