//! Error taxonomy for the duel core.
//!
//! Two families exist and they are never mixed:
//!
//! - [`RosterError`] is raised while the character roster is being built.
//!   It is a configuration problem and the caller is expected to abort
//!   startup.
//! - [`BattleError`] is raised mid-tick when a transition names a clip the
//!   actor's library does not have. The tick is abandoned and the error is
//!   handed to the caller unchanged.
//!
//! Recoverable anomalies (a stale frame index, an attack without enough
//! resource) are handled in place and never produce an error value.

use crate::animation::ClipTag;
use crate::character::CharacterKind;

/// Configuration errors found while building a [`crate::character::Roster`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    /// A character name did not match any known kind.
    #[error("unknown character '{0}'")]
    UnknownCharacter(String),

    /// A clip name did not match any known clip tag.
    #[error("unknown clip '{clip}' for character {kind}")]
    UnknownClip { kind: CharacterKind, clip: String },

    /// A roster does not describe one of the playable kinds at all.
    #[error("character {0} is missing from the roster")]
    MissingCharacter(CharacterKind),

    /// A kind is missing a clip its animation rules depend on.
    #[error("character {kind} is missing required clip '{clip}'")]
    MissingClip { kind: CharacterKind, clip: ClipTag },

    /// A clip was declared with no frames.
    #[error("clip '{clip}' of character {kind} has no frames")]
    EmptyClip { kind: CharacterKind, clip: ClipTag },

    /// The roster manifest could not be read or parsed.
    #[error("roster manifest: {0}")]
    Manifest(String),
}

/// Internal-consistency failures raised while a battle tick runs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    /// A transition asked for a clip that the actor's library lacks.
    #[error("transition requested clip '{clip}' which character {kind} does not define")]
    ClipNotInLibrary { kind: CharacterKind, clip: ClipTag },
}
