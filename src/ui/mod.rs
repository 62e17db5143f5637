//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - Layout and header
//! - `helpers` - Fetch task spawning and panic capture
//! - `stories` - Story list widget
//! - `status` - Status bar widget
//! - `help` - Keybinding overlay

mod events;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod status;
mod stories;

pub use loop_runner::{run, Action};
