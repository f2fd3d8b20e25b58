use log::trace;

use crate::config::{EMPTY_CELL_TOKEN, MEM_SIZE};
use crate::error::Fault;
use crate::loader::ProgramImage;
use crate::reg::RegisterFile;

/// One memory slot: an opcode with operands, or a single integer token.
pub type Cell = Vec<String>;

/// Converts a register or literal value into a memory index, if it is one.
pub fn address(val: i32) -> Option<usize> {
    usize::try_from(val).ok().filter(|&i| i < MEM_SIZE)
}

/// Parses a decimal integer token.
pub fn parse_int(token: &str) -> Result<i32, Fault> {
    token.parse().map_err(|_| Fault::OperandParse {
        token: token.to_string(),
    })
}

/// Flat array of `MEM_SIZE` token cells, each initialised to `["0"]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<Cell>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            cells: vec![vec![EMPTY_CELL_TOKEN.to_string()]; MEM_SIZE],
        }
    }
}

impl Memory {
    pub fn cell(&self, addr: usize) -> Option<&[String]> {
        self.cells.get(addr).map(Vec::as_slice)
    }

    /// Replaces a whole cell. Empty cells and out of range addresses are ignored.
    pub fn set_cell(&mut self, addr: usize, cell: Cell) {
        if cell.is_empty() {
            return;
        }
        if let Some(slot) = self.cells.get_mut(addr) {
            *slot = cell;
        }
    }

    /// Reads the first token of a cell as an integer.
    pub fn read_scalar(&self, addr: usize) -> Result<i32, Fault> {
        let token = self
            .cells
            .get(addr)
            .and_then(|c| c.first())
            .ok_or(Fault::InvalidMemoryAccess { addr: addr as i32 })?;
        parse_int(token)
    }

    /// Overwrites the first token of a cell, keeping any tokens after it.
    pub fn write_scalar(&mut self, addr: usize, val: i32) -> Result<(), Fault> {
        let cell = self
            .cells
            .get_mut(addr)
            .ok_or(Fault::InvalidMemoryAccess { addr: addr as i32 })?;
        // Cells are never empty.
        cell[0] = val.to_string();
        Ok(())
    }

    /// `(address, tokens)` pairs in address order, untouched cells included.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[String])> + '_ {
        self.cells.iter().enumerate().map(|(i, c)| (i, c.as_slice()))
    }
}

/// Complete machine state: register file plus memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Machine {
    pub regs: RegisterFile,
    pub mem: Memory,
}

impl Machine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a fresh machine with `image` written over the initial memory.
    pub fn with_program(image: &ProgramImage) -> Self {
        let mut m = Self::new();
        m.apply(image);
        m
    }

    pub fn apply(&mut self, image: &ProgramImage) {
        for (addr, cell) in image.iter() {
            trace!("mem[{}] <- {:?}", addr, cell);
            self.mem.set_cell(*addr, cell.clone());
        }
    }
}
