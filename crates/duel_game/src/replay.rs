use duel_core::actor::{Facing, Seat};
use duel_core::battle::BattleSnapshot;
use duel_core::character::CharacterKind;
use duel_core::input::{Intent, TickInput};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::flow::BattleFactory;

/// Simulated time between replay ticks.
pub const REPLAY_TICK_MS: u64 = 16;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayScript {
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_character")]
    pub player1: String,
    #[serde(default = "default_character")]
    pub player2: String,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub p1: Vec<ReplayAction>,
    #[serde(default)]
    pub p2: Vec<ReplayAction>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplayAction {
    Left,
    Right,
    RunLeft,
    RunRight,
    Release,
    Jump,
    Attack,
}

impl ReplayAction {
    fn intent(self) -> Intent {
        let held = |direction: Facing, running: bool| Intent::MoveHeld { direction, running };
        match self {
            Self::Left => held(Facing::Left, false),
            Self::Right => held(Facing::Right, false),
            Self::RunLeft => held(Facing::Left, true),
            Self::RunRight => held(Facing::Right, true),
            Self::Release => Intent::MoveReleased,
            Self::Jump => Intent::JumpPressed,
            Self::Attack => Intent::AttackPressed,
        }
    }
}

impl ReplayScript {
    pub fn characters(&self) -> Result<(CharacterKind, CharacterKind), String> {
        let parse = |name: &str| {
            name.parse::<CharacterKind>()
                .map_err(|e| format!("Replay validation failed: {e}"))
        };
        Ok((parse(&self.player1)?, parse(&self.player2)?))
    }

    /// One `TickInput` per tick, with `repeat` applied.
    pub fn expanded_inputs(&self) -> Vec<TickInput> {
        let mut out = Vec::new();
        for frame in &self.frames {
            let mut input = TickInput::new();
            for (seat, actions) in [(Seat::One, &frame.p1), (Seat::Two, &frame.p2)] {
                for action in actions {
                    input.push(seat, action.intent());
                }
            }
            for _ in 0..frame.repeat.max(1) {
                out.push(input.clone());
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplayScript, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplayScript = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplayScript) -> Result<(), String> {
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    replay.characters()?;
    Ok(())
}

/// Play `replay` headless from 0 ms. Returns the snapshot of every tick.
pub fn run_replay(
    replay: &ReplayScript,
    factory: BattleFactory,
) -> Result<Vec<BattleSnapshot>, String> {
    let (one, two) = replay.characters()?;
    let factory = factory.with_seed(replay.seed);
    let mut session = factory.create(one, two, 0);

    let inputs = replay.expanded_inputs();
    let mut snapshots = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        let now_ms = (i as u64 + 1) * REPLAY_TICK_MS;
        let snapshot = session
            .tick(now_ms, input)
            .map_err(|e| format!("Replay aborted at tick {}: {e}", i + 1))?;
        snapshots.push(snapshot);
    }
    log::info!(
        "Replay finished: {} ticks, {}ms simulated",
        snapshots.len(),
        snapshots.len() as u64 * REPLAY_TICK_MS
    );
    Ok(snapshots)
}

fn default_character() -> String {
    "Archer".to_string()
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_core::animation::ClipTag;
    use duel_core::character::Roster;
    use duel_core::config::BattleConfig;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "duel_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn factory() -> BattleFactory {
        BattleFactory::new(
            Roster::builtin().expect("builtin roster"),
            BattleConfig::default(),
        )
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "seed": 7,
              "player1": "Knight",
              "frames": [
                { "p1": ["right"], "p2": ["attack"], "repeat": 3 },
                { "p1": ["release", "jump"] }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        assert_eq!(
            replay.characters(),
            Ok((CharacterKind::Knight, CharacterKind::Archer))
        );
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 4);
        assert_eq!(expanded[2].for_seat(Seat::Two), &[Intent::AttackPressed]);
        assert_eq!(
            expanded[3].for_seat(Seat::One),
            &[Intent::MoveReleased, Intent::JumpPressed]
        );
        assert!(expanded[3].for_seat(Seat::Two).is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn unknown_character_is_rejected() {
        let path = temp_file_path("unknown");
        fs::write(&path, r#"{ "player2": "Ninja", "frames": [ {} ] }"#)
            .expect("write replay file");

        let err = load_replay_from_path(&path).expect_err("Ninja is not a kind");
        assert!(err.contains("Ninja"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("no frames");
        assert!(err.contains("empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = temp_file_path("deterministic");
        fs::write(
            &path,
            r#"{
              "seed": 7,
              "player1": "Swordsman",
              "player2": "Wizard",
              "frames": [
                { "p1": ["right"], "repeat": 60 },
                { "p1": ["right", "jump"], "p2": ["attack"] },
                { "p1": ["right"], "p2": ["left"], "repeat": 120 },
                { "p1": ["release"], "p2": ["release"] },
                { "p1": ["attack"], "p2": ["attack"] },
                { "repeat": 200 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let run_a = run_replay(&replay, factory()).expect("run a");
        let run_b = run_replay(&replay, factory()).expect("run b");
        assert_eq!(run_a.len(), 383);
        assert_eq!(run_a, run_b);

        let last = run_a.last().expect("final snapshot");
        assert_eq!(last.now_ms, 383 * REPLAY_TICK_MS);
        assert_eq!(last.fighter(Seat::One).y, 480.0);
        assert!(last.fighter(Seat::One).x > 200.0);
        assert!(last.fighter(Seat::Two).x < 1620.0);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn scripted_attack_spends_resource() {
        let replay = ReplayScript {
            seed: 1,
            player1: "Knight".to_string(),
            player2: "Wizard".to_string(),
            frames: vec![ReplayFrame {
                p1: vec![ReplayAction::Attack],
                p2: vec![ReplayAction::Attack],
                repeat: 1,
            }],
        };
        let snapshots = run_replay(&replay, factory()).expect("run");
        let snap = &snapshots[0];
        assert!(snap.fighter(Seat::One).clip.is_attack());
        assert_eq!(snap.fighter(Seat::One).resource_value, 95);
        assert_ne!(snap.fighter(Seat::Two).clip, ClipTag::Idle);
        assert_eq!(snap.fighter(Seat::Two).resource_value, 95);
    }
}
