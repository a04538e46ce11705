pub mod hud;

pub use hud::{HudActions, HudOverlay, HudStats};
