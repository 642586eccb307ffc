use std::sync::Arc;
use winit::error::OsError;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Duel Arena".to_string(),
            width: 1920,
            height: 1080,
        }
    }
}

impl PlatformConfig {
    /// Match the window to the arena the simulation clamps against.
    pub fn for_arena(width: f32, height: f32) -> Self {
        Self {
            width: width.round().max(1.0) as u32,
            height: height.round().max(1.0) as u32,
            ..Self::default()
        }
    }
}

pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &PlatformConfig,
) -> Result<Arc<Window>, OsError> {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_resizable(false)
        .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

    let window = event_loop.create_window(attrs)?;
    log::debug!("Window '{}' created", config.title);
    Ok(Arc::new(window))
}
