//! Program images and memory dumps.
//!
//! This module provides:
//! - The binary image format (little-endian 16-bit words, no header)
//! - A memory map renderer for inspecting a machine after a run

pub mod loader;
pub mod dump;

pub use loader::{load_image, parse_image, save_image, to_bytes, ImageError};
pub use dump::memory_map;
