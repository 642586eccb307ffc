//! Duel Arena -- main loop and application entry point.
//!
//! winit drives the event loop via `ApplicationHandler`. All simulation runs
//! inside `RedrawRequested` on a fixed timestep (see `TimeState`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. `while should_step()` -- advance the scene flow (and the battle, if
//!      one is running) with the simulated timestamp of that step
//!   3. Refresh the text HUD in the window title
//!
//! `duel_game --replay <path>` skips the window and plays a scripted replay
//! headless instead.

mod flow;
mod hud;
mod inventory;
mod replay;

use std::path::Path;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use duel_core::character::{load_roster_manifest, Roster};
use duel_core::config::{load_battle_config, BattleConfig};
use duel_core::error::RosterError;
use duel_core::input::{InputState, Key};
use duel_core::time::TimeState;
use duel_platform::window::PlatformConfig;

use flow::{BattleFactory, FlowAction, GameFlow, Scene};
use inventory::{load_or_create_inventory, Inventory};

const BATTLE_CONFIG_PATH: &str = "assets/battle.json";
const ROSTER_MANIFEST_PATH: &str = "assets/roster.json";
const INVENTORY_PATH: &str = "inventory.json";

struct GameState {
    window: Arc<Window>,
    time: TimeState,
    input: InputState,
    flow: GameFlow,
    inventory: Inventory,
    title: String,
}

impl GameState {
    fn refresh_title(&mut self) {
        let title = hud::window_title(&self.flow, &self.inventory);
        if title == self.title {
            return;
        }
        if self.flow.scene() == Scene::Battle {
            if let Some(snapshot) = self.flow.last_snapshot() {
                for line in hud::battle_lines(snapshot) {
                    log::debug!("{line}");
                }
            }
        }
        self.window.set_title(&title);
        self.title = title;
    }
}

struct App {
    config: PlatformConfig,
    pending: Option<(BattleFactory, Inventory)>,
    state: Option<GameState>,
}

impl App {
    fn new(factory: BattleFactory, inventory: Inventory) -> Self {
        let arena = factory.config();
        Self {
            config: PlatformConfig::for_arena(arena.screen_width, arena.screen_height),
            pending: Some((factory, inventory)),
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let Some((factory, inventory)) = self.pending.take() else {
            return;
        };
        let window = match duel_platform::window::create_window(event_loop, &self.config) {
            Ok(window) => window,
            Err(err) => {
                log::error!("Failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };
        log::info!(
            "Window created: {}x{}",
            self.config.width,
            self.config.height
        );
        let mut state = GameState {
            window,
            time: TimeState::new(),
            input: InputState::new(),
            flow: GameFlow::new(factory),
            inventory,
            title: String::new(),
        };
        state.refresh_title();
        self.state = Some(state);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Focused(false) => {
                state.input.clear();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(game_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(game_key),
                            ElementState::Released => state.input.key_up(game_key),
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                state.time.begin_frame();

                while state.time.should_step() {
                    let now_ms = state.time.now_ms();
                    if state.flow.update(&state.input, now_ms) == FlowAction::Quit {
                        log::info!("Quit from menu, exiting.");
                        event_loop.exit();
                        return;
                    }
                    // One step per edge, even when a slow frame runs several.
                    state.input.end_frame();
                }
                if state.time.steps_this_frame > 1 {
                    log::trace!("Caught up {} steps", state.time.steps_this_frame);
                }

                state.refresh_title();
            }

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(Key::Enter),
        KeyCode::Digit1 => Some(Key::Digit1),
        KeyCode::Digit2 => Some(Key::Digit2),
        KeyCode::Digit3 => Some(Key::Digit3),
        KeyCode::Digit4 => Some(Key::Digit4),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyC => Some(Key::C),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyI => Some(Key::I),
        KeyCode::KeyJ => Some(Key::J),
        KeyCode::KeyL => Some(Key::L),
        KeyCode::KeyN => Some(Key::N),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyW => Some(Key::W),
        _ => None,
    }
}

fn load_config_or_default(path: &Path) -> BattleConfig {
    if !path.exists() {
        log::info!("No battle config at {}, using defaults", path.display());
        return BattleConfig::default();
    }
    match load_battle_config(path) {
        Ok(config) => {
            log::info!("Battle config loaded from {}", path.display());
            config
        }
        Err(err) => {
            log::warn!("{err}; using defaults");
            BattleConfig::default()
        }
    }
}

fn load_roster(path: &Path) -> Result<Roster, RosterError> {
    if path.exists() {
        log::info!("Loading roster manifest {}", path.display());
        load_roster_manifest(path)
    } else {
        Roster::builtin()
    }
}

fn replay_arg() -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--replay" {
            return args.next();
        }
    }
    None
}

fn run_replay_file(path: &Path, factory: BattleFactory) -> Result<(), String> {
    let script = replay::load_replay_from_path(path)?;
    let snapshots = replay::run_replay(&script, factory)?;
    if let Some(last) = snapshots.last() {
        for line in hud::battle_lines(last) {
            log::info!("{line}");
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Duel Arena starting...");

    let config = load_config_or_default(Path::new(BATTLE_CONFIG_PATH));
    let roster = match load_roster(Path::new(ROSTER_MANIFEST_PATH)) {
        Ok(roster) => roster,
        Err(err) => {
            log::error!("Roster failed to load: {err}");
            std::process::exit(1);
        }
    };
    let factory = BattleFactory::new(roster, config);

    if let Some(path) = replay_arg() {
        if let Err(err) = run_replay_file(Path::new(&path), factory) {
            log::error!("{err}");
            std::process::exit(1);
        }
        return;
    }

    let inventory = load_or_create_inventory(Path::new(INVENTORY_PATH)).unwrap_or_else(|err| {
        log::warn!("{err}; starting with an empty inventory");
        Inventory::default()
    });

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(factory, inventory);
    event_loop.run_app(&mut app).expect("Event loop error");
}
