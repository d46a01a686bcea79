//! Binary program images.
//!
//! An image is a sequence of 16-bit words, each stored low byte first.
//! There is no header; the word count is the program length.

use crate::cpu::memory::MAX_PROGRAM_WORDS;
use crate::word::Word;
use log::info;
use std::path::Path;
use thiserror::Error;

/// Load an image file from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Vec<Word>, ImageError> {
    let bytes = std::fs::read(path.as_ref())
        .map_err(|e| ImageError::IoError(e.to_string()))?;
    let words = parse_image(&bytes)?;
    info!("loaded {} words from {}", words.len(), path.as_ref().display());
    Ok(words)
}

/// Assemble raw bytes into words.
pub fn parse_image(bytes: &[u8]) -> Result<Vec<Word>, ImageError> {
    if bytes.len() % 2 != 0 {
        return Err(ImageError::OddLength(bytes.len()));
    }

    let words: Vec<Word> = bytes
        .chunks_exact(2)
        .map(|pair| Word::from_le_bytes([pair[0], pair[1]]))
        .collect();

    if words.len() > MAX_PROGRAM_WORDS {
        return Err(ImageError::TooLarge(words.len()));
    }

    Ok(words)
}

/// Serialize words in image byte order.
pub fn to_bytes(words: &[Word]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// Save words as an image file.
pub fn save_image<P: AsRef<Path>>(path: P, words: &[Word]) -> Result<(), ImageError> {
    std::fs::write(path.as_ref(), to_bytes(words))
        .map_err(|e| ImageError::IoError(e.to_string()))
}

/// Errors that can occur while reading or writing images.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("image is {0} bytes, not a whole number of words")]
    OddLength(usize),

    #[error("image has {0} words, more than the {} a program may occupy", MAX_PROGRAM_WORDS)]
    TooLarge(usize),
}
