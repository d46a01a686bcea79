//! DCPU-16 main memory.
//!
//! A flat space of 65536 sixteen-bit words. Addresses are [`Word`]s, so
//! address arithmetic wraps and every address is valid.

use crate::word::{Word, ADDRESS_SPACE};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The number of addressable words.
pub const MEMORY_SIZE: usize = ADDRESS_SPACE;

/// Largest loadable program. At least one address must lie outside the
/// image or PC could never leave it.
pub const MAX_PROGRAM_WORDS: usize = MEMORY_SIZE - 1;

/// DCPU-16 memory: 65536 words.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Word>", into = "Vec<Word>")]
pub struct Memory {
    cells: Vec<Word>,
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    /// Read a word.
    #[inline]
    pub fn read(&self, addr: Word) -> Word {
        self.cells[usize::from(addr)]
    }

    /// Write a word.
    #[inline]
    pub fn write(&mut self, addr: Word, value: Word) {
        self.cells[usize::from(addr)] = value;
    }

    /// All cells, in address order.
    pub fn as_slice(&self) -> &[Word] {
        &self.cells
    }

    /// Copy a program image into memory starting at address 0.
    pub fn load_program(&mut self, program: &[Word]) -> Result<(), MemoryError> {
        if program.len() > MAX_PROGRAM_WORDS {
            return Err(MemoryError::ProgramTooLarge {
                size: program.len(),
                available: MAX_PROGRAM_WORDS,
            });
        }

        self.cells[..program.len()].copy_from_slice(program);
        Ok(())
    }

    /// Dump memory contents (for debugging).
    pub fn dump(&self, start: Word, count: usize) -> Vec<(Word, Word)> {
        let start = usize::from(start);
        let end = (start + count).min(MEMORY_SIZE);
        (start..end)
            .map(|i| (i as Word, self.cells[i]))
            .collect()
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<Word>> for Memory {
    type Error = MemoryError;

    fn try_from(cells: Vec<Word>) -> Result<Self, Self::Error> {
        if cells.len() != MEMORY_SIZE {
            return Err(MemoryError::WrongSize(cells.len()));
        }
        Ok(Self { cells })
    }
}

impl From<Memory> for Vec<Word> {
    fn from(mem: Memory) -> Self {
        mem.cells
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let non_zero = self.cells.iter().filter(|&&cell| cell != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// Program is too large to fit in memory.
    #[error("program size {size} exceeds available space {available}")]
    ProgramTooLarge { size: usize, available: usize },

    /// A memory image does not cover the whole address space.
    #[error("memory image has {0} cells, expected {}", MEMORY_SIZE)]
    WrongSize(usize),
}
