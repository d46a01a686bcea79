//! Memory map rendering.
//!
//! The whole address space is drawn as a grid, one character cell per word:
//! `.` for zero, the word in hex otherwise.

use crate::cpu::Memory;
use std::fmt::Write;

/// Words per row of the memory map.
pub const MAP_COLUMNS: usize = 128;
/// Rows in the memory map.
pub const MAP_ROWS: usize = 512;

/// Render the full memory map, `MAP_ROWS` lines of `MAP_COLUMNS` words.
pub fn memory_map(mem: &Memory) -> String {
    let mut out = String::new();
    for row in mem.as_slice().chunks(MAP_COLUMNS) {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out
}

fn render_row(row: &[u16]) -> String {
    let mut line = String::with_capacity(row.len());
    for &word in row {
        if word == 0 {
            line.push('.');
        } else {
            let _ = write!(line, "{:04x}", word);
        }
    }
    line
}
