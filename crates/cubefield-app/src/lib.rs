//! Windowed front end for the cube field: event loop, frame timing and
//! keyboard controls.

pub mod frame_clock;
pub mod settings;
pub mod window;

pub use frame_clock::{FrameClock, FrameStats};
pub use settings::{apply_effects, simulation_settings};
pub use window::{AppState, Control, run};
