//! Window bootstrap. The game renders a fixed-size world, so the window
//! opens at world size; later resizes only rescale the surface.

use std::sync::Arc;
use winit::dpi::LogicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl PlatformConfig {
    fn attributes(&self) -> WindowAttributes {
        WindowAttributes::default()
            .with_title(&self.title)
            .with_inner_size(LogicalSize::new(self.width, self.height))
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Chon: The Learning Game".to_string(),
            width: 1280,
            height: 780,
        }
    }
}

/// Opens the game window. winit only allows window creation while the event
/// loop is active, so this runs from `ApplicationHandler::resumed`.
pub fn create_window(event_loop: &ActiveEventLoop, config: &PlatformConfig) -> Arc<Window> {
    let window = event_loop
        .create_window(config.attributes())
        .expect("Failed to create window");
    Arc::new(window)
}
