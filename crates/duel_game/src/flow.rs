//! Screen flow around the battle: main menu, arena settings, character
//! selection and the fight itself.
//!
//! The flow owns at most one [`BattleSession`]. It is built by
//! [`BattleFactory`] when the selection screen confirms and dropped on the way
//! out, so every battle starts from spawn with full pools.

use duel_core::actor::Seat;
use duel_core::battle::{BattleSession, BattleSnapshot};
use duel_core::character::{CharacterKind, Roster};
use duel_core::config::BattleConfig;
use duel_core::input::{collect_intents, InputState, Key, PlayerBindings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    Menu,
    Settings,
    Inventory,
    Battle,
}

/// Battle background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Arena {
    Castle,
    #[default]
    DeadForest,
    Terrace,
    ThroneRoom,
}

impl Arena {
    pub fn name(self) -> &'static str {
        match self {
            Self::Castle => "Castle",
            Self::DeadForest => "Dead Forest",
            Self::Terrace => "Terrace",
            Self::ThroneRoom => "Throne Room",
        }
    }

    pub fn background_path(self) -> &'static str {
        match self {
            Self::Castle => "assets/Maps/castle.png",
            Self::DeadForest => "assets/Maps/dead forest.png",
            Self::Terrace => "assets/Maps/terrace.png",
            Self::ThroneRoom => "assets/Maps/throne room.png",
        }
    }

    fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Digit1 => Some(Self::Castle),
            Key::Digit2 => Some(Self::DeadForest),
            Key::Digit3 => Some(Self::Terrace),
            Key::Digit4 => Some(Self::ThroneRoom),
            _ => None,
        }
    }
}

/// Builds battle sessions from the loaded roster and config.
pub struct BattleFactory {
    roster: Roster,
    config: BattleConfig,
    seed: Option<u64>,
}

impl BattleFactory {
    pub fn new(roster: Roster, config: BattleConfig) -> Self {
        Self {
            roster,
            config,
            seed: None,
        }
    }

    /// Every session created afterwards uses `seed` for its random choices.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn create(
        &self,
        player_one: CharacterKind,
        player_two: CharacterKind,
        now_ms: u64,
    ) -> BattleSession {
        let config = self.config.clone();
        match self.seed {
            Some(seed) => BattleSession::with_seed(
                &self.roster,
                player_one,
                player_two,
                config,
                now_ms,
                seed,
            ),
            None => BattleSession::new(&self.roster, player_one, player_two, config, now_ms),
        }
    }
}

/// What the caller should do after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    Continue,
    Quit,
}

pub struct GameFlow {
    scene: Scene,
    arena: Arena,
    selection: [CharacterKind; 2],
    factory: BattleFactory,
    battle: Option<BattleSession>,
    last_snapshot: Option<BattleSnapshot>,
}

impl GameFlow {
    pub fn new(factory: BattleFactory) -> Self {
        Self {
            scene: Scene::Menu,
            arena: Arena::default(),
            selection: [CharacterKind::Archer; 2],
            factory,
            battle: None,
            last_snapshot: None,
        }
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn arena(&self) -> Arena {
        self.arena
    }

    pub fn selection(&self, seat: Seat) -> CharacterKind {
        self.selection[seat.index()]
    }

    /// Snapshot from the most recent battle tick, if a battle is running.
    pub fn last_snapshot(&self) -> Option<&BattleSnapshot> {
        self.last_snapshot.as_ref()
    }

    /// Run one fixed step of whichever screen is active.
    pub fn update(&mut self, input: &InputState, now_ms: u64) -> FlowAction {
        match self.scene {
            Scene::Menu => {
                if input.is_just_pressed(Key::Escape) {
                    return FlowAction::Quit;
                }
                if input.is_just_pressed(Key::Enter) {
                    self.enter(Scene::Inventory);
                } else if input.is_just_pressed(Key::S) {
                    self.enter(Scene::Settings);
                }
            }
            Scene::Settings => {
                let picked = [Key::Digit1, Key::Digit2, Key::Digit3, Key::Digit4]
                    .into_iter()
                    .find(|&key| input.is_just_pressed(key))
                    .and_then(Arena::from_key);
                if let Some(arena) = picked {
                    self.arena = arena;
                    log::info!("Arena: {}", arena.name());
                    self.enter(Scene::Menu);
                } else if input.is_just_pressed(Key::Escape) {
                    self.enter(Scene::Menu);
                }
            }
            Scene::Inventory => {
                if input.is_just_pressed(Key::Escape) {
                    self.enter(Scene::Menu);
                    return FlowAction::Continue;
                }
                for seat in Seat::BOTH {
                    let bindings = PlayerBindings::for_seat(seat);
                    let slot = &mut self.selection[seat.index()];
                    if input.is_just_pressed(bindings.left) {
                        *slot = slot.prev();
                    } else if input.is_just_pressed(bindings.right) {
                        *slot = slot.next();
                    }
                }
                if input.is_just_pressed(Key::Enter) {
                    self.start_battle(now_ms);
                }
            }
            Scene::Battle => {
                if input.is_just_pressed(Key::Escape) {
                    log::info!("Battle abandoned");
                    self.end_battle();
                    return FlowAction::Continue;
                }
                self.step_battle(input, now_ms);
            }
        }
        FlowAction::Continue
    }

    fn enter(&mut self, scene: Scene) {
        log::debug!("Scene {:?} -> {:?}", self.scene, scene);
        self.scene = scene;
    }

    fn start_battle(&mut self, now_ms: u64) {
        let [one, two] = self.selection;
        let mut session = self.factory.create(one, two, now_ms);
        match session.snapshot() {
            Ok(snapshot) => {
                self.last_snapshot = Some(snapshot);
                self.battle = Some(session);
                log::info!(
                    "Fighting in {} ({})",
                    self.arena.name(),
                    self.arena.background_path()
                );
                self.enter(Scene::Battle);
            }
            Err(err) => log::error!("Battle could not start: {err}"),
        }
    }

    fn step_battle(&mut self, input: &InputState, now_ms: u64) {
        let Some(session) = self.battle.as_mut() else {
            self.enter(Scene::Inventory);
            return;
        };
        match session.tick(now_ms, &collect_intents(input)) {
            Ok(snapshot) => self.last_snapshot = Some(snapshot),
            Err(err) => {
                log::error!("Battle aborted: {err}");
                self.end_battle();
            }
        }
    }

    fn end_battle(&mut self) {
        self.battle = None;
        self.last_snapshot = None;
        self.enter(Scene::Inventory);
    }
}
