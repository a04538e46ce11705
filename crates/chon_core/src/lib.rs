//! Engine-agnostic state shared by the game and its tooling: keyboard input
//! tracking, the fixed-timestep clock, and axis-aligned box geometry.

pub mod geom;
pub mod input;
pub mod time;
