//! Program image format.
//!
//! An image is a flat binary file of little-endian 16-bit words, loaded
//! verbatim at address 0. It can fill at most the whole address space
//! (65536 bytes) and must contain a whole number of words.

use crate::cpu::MEMORY_SIZE;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Largest accepted image, in bytes.
pub const MAX_IMAGE_BYTES: usize = MEMORY_SIZE * 2;

/// A loaded program image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramImage {
    /// The program words, starting at address 0.
    pub words: Vec<u16>,
}

impl ProgramImage {
    /// Get the number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.words
    }
}

/// Load a program image from disk.
///
/// The size is checked before the file contents are read.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ProgramImage, ImageError> {
    let path = path.as_ref();
    let size = std::fs::metadata(path)
        .map_err(|e| ImageError::Io(e.to_string()))?
        .len();
    if size > MAX_IMAGE_BYTES as u64 {
        return Err(ImageError::TooLarge { size: size as usize });
    }

    let bytes = std::fs::read(path).map_err(|e| ImageError::Io(e.to_string()))?;
    let image = parse_image(&bytes)?;
    debug!(path = %path.display(), words = image.len(), "image loaded");
    Ok(image)
}

/// Decode image bytes into words.
pub fn parse_image(bytes: &[u8]) -> Result<ProgramImage, ImageError> {
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge { size: bytes.len() });
    }
    if bytes.len() % 2 != 0 {
        return Err(ImageError::OddLength { size: bytes.len() });
    }

    let words = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Ok(ProgramImage { words })
}

/// Encode words into image bytes.
pub fn encode_image(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// Errors that can occur while loading an image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("program image too large: {size} bytes (max {max})", max = MAX_IMAGE_BYTES)]
    TooLarge { size: usize },

    #[error("program image has odd length: {size} bytes")]
    OddLength { size: usize },

    #[error("I/O error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_little_endian() {
        let image = parse_image(&[0x13, 0x00, 0x41, 0x00, 0x00, 0x80]).unwrap();
        assert_eq!(image.words, vec![19, 65, 32768]);
        assert_eq!(image.len(), 3);
    }

    #[test]
    fn test_parse_empty() {
        let image = parse_image(&[]).unwrap();
        assert!(image.is_empty());
    }

    #[test]
    fn test_parse_odd_length() {
        assert_eq!(parse_image(&[1, 0, 2]), Err(ImageError::OddLength { size: 3 }));
    }

    #[test]
    fn test_parse_too_large() {
        let bytes = vec![0u8; MAX_IMAGE_BYTES + 2];
        assert_eq!(
            parse_image(&bytes),
            Err(ImageError::TooLarge { size: MAX_IMAGE_BYTES + 2 })
        );
    }

    #[test]
    fn test_parse_full_address_space() {
        let bytes = vec![0u8; MAX_IMAGE_BYTES];
        assert_eq!(parse_image(&bytes).unwrap().len(), MEMORY_SIZE);
    }

    #[test]
    fn test_encode_matches_parse() {
        let words = [9, 32768, 32769, 4, 19, 32768];
        assert_eq!(parse_image(&encode_image(&words)).unwrap().as_slice(), &words);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_image("/nonexistent/synacor/challenge.bin");
        assert!(matches!(result, Err(ImageError::Io(_))));
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("synacor-image-{}.bin", std::process::id()));
        std::fs::write(&path, encode_image(&[19, 65, 0])).unwrap();

        let image = load_image(&path);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(image.unwrap().words, vec![19, 65, 0]);
    }
}
