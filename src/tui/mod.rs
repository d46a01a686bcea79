//! TUI debugger for the DCPU-16 emulator.
//!
//! Provides an interactive terminal-based debugger with:
//! - Register and EX/skip-flag view
//! - Scrollable memory view
//! - Step/run/breakpoint controls
//! - Decoded listing around PC

mod app;
mod ui;

pub use app::{DebuggerApp, run_debugger};
