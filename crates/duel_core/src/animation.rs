//! Sprite clip types and the per-actor animation cursor.
//!
//! A clip is an ordered, non-empty run of frame handles. Handles are opaque
//! asset references; the core only ever counts them and hands the current one
//! to the renderer. Clip identity is a closed [`ClipTag`] set rather than a
//! free-form string, so a misspelt clip can only come from content files and
//! is rejected when the roster is built.
//!
//! Frame timing is owned by the battle driver, which advances every cursor in
//! lockstep. The cursor itself only knows how to step, wrap and recover from
//! a stale index.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::character::CharacterKind;
use crate::error::BattleError;

/// Opaque reference to one sprite image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameHandle(Arc<str>);

impl FrameHandle {
    pub fn new(path: impl Into<Arc<str>>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Every clip name the animation rules know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClipTag {
    Idle,
    /// Rare secondary idle.
    Idle2,
    Walk,
    Run,
    Jump,
    Dead,
    Hurt,
    Attack1,
    Attack2,
    Attack3,
    Attack4,
    Shot1,
    Shot2,
}

impl ClipTag {
    pub const ALL: &'static [ClipTag] = &[
        ClipTag::Idle,
        ClipTag::Idle2,
        ClipTag::Walk,
        ClipTag::Run,
        ClipTag::Jump,
        ClipTag::Dead,
        ClipTag::Hurt,
        ClipTag::Attack1,
        ClipTag::Attack2,
        ClipTag::Attack3,
        ClipTag::Attack4,
        ClipTag::Shot1,
        ClipTag::Shot2,
    ];

    /// Clips every kind must provide regardless of its attack style.
    pub const REQUIRED: &'static [ClipTag] = &[
        ClipTag::Idle,
        ClipTag::Walk,
        ClipTag::Run,
        ClipTag::Jump,
        ClipTag::Dead,
        ClipTag::Hurt,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Idle2 => "idle_2",
            Self::Walk => "walk",
            Self::Run => "run",
            Self::Jump => "jump",
            Self::Dead => "dead",
            Self::Hurt => "hurt",
            Self::Attack1 => "attack_1",
            Self::Attack2 => "attack_2",
            Self::Attack3 => "attack_3",
            Self::Attack4 => "attack_4",
            Self::Shot1 => "shot_1",
            Self::Shot2 => "shot_2",
        }
    }

    /// Melee attacks and ranged shots.
    pub fn is_attack(self) -> bool {
        matches!(
            self,
            Self::Attack1
                | Self::Attack2
                | Self::Attack3
                | Self::Attack4
                | Self::Shot1
                | Self::Shot2
        )
    }

    /// Clips that play once and hand control back to the idle family when
    /// their last frame wraps.
    pub fn returns_to_idle(self) -> bool {
        self.is_attack() || self == Self::Jump
    }
}

impl fmt::Display for ClipTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClipTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|tag| tag.name() == s)
            .ok_or_else(|| format!("unknown clip '{s}'"))
    }
}

/// A named, ordered sequence of frames.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub frames: Vec<FrameHandle>,
}

impl AnimationClip {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame at `index`, falling back to the first frame for a stale index.
    pub fn frame(&self, index: usize) -> Option<&FrameHandle> {
        self.frames.get(index).or_else(|| self.frames.first())
    }
}

/// All clips of one character kind. Built once, shared read-only.
#[derive(Debug, Clone)]
pub struct ClipLibrary {
    kind: CharacterKind,
    clips: HashMap<ClipTag, AnimationClip>,
}

impl ClipLibrary {
    pub(crate) fn new(kind: CharacterKind, clips: HashMap<ClipTag, AnimationClip>) -> Self {
        Self { kind, clips }
    }

    pub fn kind(&self) -> CharacterKind {
        self.kind
    }

    pub fn has(&self, tag: ClipTag) -> bool {
        self.clips.contains_key(&tag)
    }

    pub fn clip(&self, tag: ClipTag) -> Option<&AnimationClip> {
        self.clips.get(&tag)
    }

    /// Look up a clip a transition is about to use. A miss means the roster
    /// contract was broken and is reported, never papered over.
    pub fn require(&self, tag: ClipTag) -> Result<&AnimationClip, BattleError> {
        self.clips.get(&tag).ok_or_else(|| {
            log::error!("{} has no '{}' clip", self.kind, tag);
            BattleError::ClipNotInLibrary {
                kind: self.kind,
                clip: tag,
            }
        })
    }
}

/// Playback position of one actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationCursor {
    pub clip: ClipTag,
    pub frame: usize,
    pub last_advance_ms: u64,
}

impl AnimationCursor {
    pub fn new(clip: ClipTag, now_ms: u64) -> Self {
        Self {
            clip,
            frame: 0,
            last_advance_ms: now_ms,
        }
    }

    /// Switch clip and keep the frame index. A stale index is repaired the
    /// next time the cursor is read.
    pub fn switch(&mut self, tag: ClipTag, library: &ClipLibrary) -> Result<(), BattleError> {
        library.require(tag)?;
        if self.clip != tag {
            log::trace!("{}: {} -> {}", library.kind(), self.clip, tag);
        }
        self.clip = tag;
        Ok(())
    }

    /// Switch clip and rewind to its first frame.
    pub fn restart(&mut self, tag: ClipTag, library: &ClipLibrary) -> Result<(), BattleError> {
        self.switch(tag, library)?;
        self.frame = 0;
        Ok(())
    }

    /// Clamp the frame index into the current clip, resetting to 0 when it
    /// has fallen outside. Returns the repaired index.
    pub fn settle(&mut self, library: &ClipLibrary) -> Result<usize, BattleError> {
        let len = library.require(self.clip)?.len();
        if self.frame >= len {
            log::trace!(
                "{}: frame {} out of range for '{}' ({} frames), reset to 0",
                library.kind(),
                self.frame,
                self.clip,
                len
            );
            self.frame = 0;
        }
        Ok(self.frame)
    }

    /// Step one frame forward, wrapping at the end of the clip. Returns true
    /// when the step wrapped back to frame 0.
    pub fn advance(&mut self, library: &ClipLibrary, now_ms: u64) -> Result<bool, BattleError> {
        let len = library.require(self.clip)?.len();
        self.frame = (self.frame + 1) % len;
        self.last_advance_ms = now_ms;
        Ok(self.frame == 0)
    }

    /// True while the cursor sits on the last frame of its clip.
    pub fn on_final_frame(&self, library: &ClipLibrary) -> Result<bool, BattleError> {
        let len = library.require(self.clip)?.len();
        Ok(self.frame + 1 == len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_library(clips: &[(ClipTag, usize)]) -> ClipLibrary {
        let clips = clips
            .iter()
            .map(|&(tag, count)| {
                let frames = (0..count)
                    .map(|i| FrameHandle::new(format!("sprite_{}_{}", tag, i)))
                    .collect();
                (tag, AnimationClip { frames })
            })
            .collect();
        ClipLibrary::new(CharacterKind::Knight, clips)
    }

    #[test]
    fn clip_names_round_trip_through_from_str() {
        for &tag in ClipTag::ALL {
            assert_eq!(tag.name().parse::<ClipTag>(), Ok(tag));
        }
        assert!("attack_5".parse::<ClipTag>().is_err());
    }

    #[test]
    fn attack_and_jump_return_to_idle() {
        assert!(ClipTag::Attack3.returns_to_idle());
        assert!(ClipTag::Shot2.returns_to_idle());
        assert!(ClipTag::Jump.returns_to_idle());
        assert!(!ClipTag::Jump.is_attack());
        assert!(!ClipTag::Idle2.returns_to_idle());
        assert!(!ClipTag::Walk.returns_to_idle());
    }

    #[test]
    fn advance_wraps_at_clip_end() {
        let lib = make_library(&[(ClipTag::Idle, 3)]);
        let mut cursor = AnimationCursor::new(ClipTag::Idle, 0);

        assert!(!cursor.advance(&lib, 100).unwrap());
        assert_eq!(cursor.frame, 1);
        assert!(!cursor.advance(&lib, 200).unwrap());
        assert!(cursor.on_final_frame(&lib).unwrap());
        assert!(cursor.advance(&lib, 300).unwrap());
        assert_eq!(cursor.frame, 0);
        assert_eq!(cursor.last_advance_ms, 300);
    }

    #[test]
    fn frame_stays_in_range_after_many_advances() {
        let lib = make_library(&[(ClipTag::Idle, 5), (ClipTag::Walk, 7)]);
        let mut cursor = AnimationCursor::new(ClipTag::Idle, 0);
        for step in 0..200u64 {
            if step == 37 {
                cursor.switch(ClipTag::Walk, &lib).unwrap();
            }
            cursor.advance(&lib, step).unwrap();
            let len = lib.clip(cursor.clip).unwrap().len();
            assert!(cursor.frame < len);
        }
    }

    #[test]
    fn switch_keeps_stale_frame_until_settled() {
        let lib = make_library(&[(ClipTag::Attack1, 8), (ClipTag::Idle, 3)]);
        let mut cursor = AnimationCursor::new(ClipTag::Attack1, 0);
        cursor.frame = 6;

        cursor.switch(ClipTag::Idle, &lib).unwrap();
        assert_eq!(cursor.frame, 6);
        assert_eq!(cursor.settle(&lib).unwrap(), 0);
        assert_eq!(cursor.frame, 0);
    }

    #[test]
    fn restart_rewinds_frame() {
        let lib = make_library(&[(ClipTag::Idle, 4), (ClipTag::Jump, 4)]);
        let mut cursor = AnimationCursor::new(ClipTag::Idle, 0);
        cursor.frame = 2;
        cursor.restart(ClipTag::Jump, &lib).unwrap();
        assert_eq!(cursor.clip, ClipTag::Jump);
        assert_eq!(cursor.frame, 0);
    }

    #[test]
    fn switching_to_missing_clip_is_an_error_and_leaves_cursor_alone() {
        let lib = make_library(&[(ClipTag::Idle, 4)]);
        let mut cursor = AnimationCursor::new(ClipTag::Idle, 0);
        let err = cursor
            .switch(ClipTag::Idle2, &lib)
            .expect_err("idle_2 is not in the library");
        assert_eq!(
            err,
            BattleError::ClipNotInLibrary {
                kind: CharacterKind::Knight,
                clip: ClipTag::Idle2
            }
        );
        assert_eq!(cursor.clip, ClipTag::Idle);
    }

    #[test]
    fn stale_frame_lookup_falls_back_to_first() {
        let lib = make_library(&[(ClipTag::Idle, 2)]);
        let clip = lib.clip(ClipTag::Idle).unwrap();
        assert_eq!(clip.frame(1).unwrap().as_str(), "sprite_idle_1");
        assert_eq!(clip.frame(9).unwrap().as_str(), "sprite_idle_0");
    }
}
