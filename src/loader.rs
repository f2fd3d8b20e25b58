//! Text program loader.
//!
//! A program file holds one memory cell per line: a decimal address followed by
//! the cell's tokens, e.g. `3 out acc`. Blank lines and lines starting with `#`
//! are skipped.

use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::cpu::{address, Cell};
use crate::error::LoadError;

/// Sparse `(address, tokens)` assignments, applied in order over fresh memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramImage {
    cells: Vec<(usize, Cell)>,
}

impl ProgramImage {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let src = fs::read_to_string(path.as_ref())?;
        Self::parse(&src)
    }

    pub fn parse(src: &str) -> Result<Self, LoadError> {
        let mut cells = Vec::new();
        for (idx, raw) in src.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace().map(str::to_string);
            // A trimmed non-empty line always has a first token.
            let Some(addr_token) = tokens.next() else {
                continue;
            };
            let addr: i32 = addr_token.parse().map_err(|_| LoadError::InvalidAddress {
                line: idx + 1,
                token: addr_token.clone(),
            })?;
            let Some(addr) = address(addr) else {
                warn!("line {}: invalid memory address {} in program, skipped", idx + 1, addr);
                continue;
            };

            let cell: Cell = tokens.collect();
            if cell.is_empty() {
                warn!("line {}: address {} has no tokens, skipped", idx + 1, addr);
                continue;
            }
            debug!("line {}: [{}] {}", idx + 1, addr, cell.join(" "));
            cells.push((addr, cell));
        }
        Ok(Self { cells })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (usize, Cell)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl From<Vec<(usize, Cell)>> for ProgramImage {
    fn from(cells: Vec<(usize, Cell)>) -> Self {
        Self { cells }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let src = "# adds two numbers\n\n0 movv a 5\n   \n1 halt\n";
        let image = ProgramImage::parse(src).unwrap();
        assert_eq!(image.len(), 2, "Only the two instruction lines should load");
        let cells: Vec<_> = image.iter().cloned().collect();
        assert_eq!(cells[0], (0, vec!["movv".to_string(), "a".into(), "5".into()]));
        assert_eq!(cells[1], (1, vec!["halt".to_string()]));
    }

    #[test]
    fn test_parse_collapses_extra_whitespace() {
        let image = ProgramImage::parse("  12\tstore   40  b  ").unwrap();
        let (addr, cell) = image.iter().next().unwrap();
        assert_eq!(*addr, 12);
        assert_eq!(cell, &["store", "40", "b"]);
    }

    #[test]
    fn test_parse_skips_out_of_range_addresses() {
        let image = ProgramImage::parse("100 halt\n-1 halt\n99 halt").unwrap();
        assert_eq!(image.len(), 1, "Only address 99 is inside memory");
        assert_eq!(image.iter().next().unwrap().0, 99);
    }

    #[test]
    fn test_parse_skips_address_without_tokens() {
        let image = ProgramImage::parse("4\n5 halt").unwrap();
        assert_eq!(image.len(), 1);
        assert_eq!(image.iter().next().unwrap().0, 5);
    }

    #[test]
    fn test_parse_rejects_non_integer_address() {
        let err = ProgramImage::parse("0 halt\nstart movv a 1").unwrap_err();
        match err {
            LoadError::InvalidAddress { line, token } => {
                assert_eq!(line, 2);
                assert_eq!(token, "start");
            }
            other => panic!("Unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = ProgramImage::load("definitely/not/here.asm").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)), "Unexpected error: {:?}", err);
    }
}
