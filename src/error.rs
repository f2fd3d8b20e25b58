use std::io;

use thiserror::Error;

/// Conditions that stop the simulated machine.
///
/// None of these abort the host process: the engine reports the fault once,
/// raises the `halt` register and the run loop exits on its next check.
#[derive(Debug, Error)]
pub enum Fault {
    /// `pc` outside memory or pointing at an empty cell.
    #[error("invalid program counter: pc = {pc}")]
    InvalidProgramCounter { pc: i32 },
    #[error("invalid instruction '{opcode}' at pc = {pc}")]
    InvalidOpcode { opcode: String, pc: i32 },
    /// Load/store address outside memory, or a load from an empty cell.
    #[error("invalid memory access at address {addr}")]
    InvalidMemoryAccess { addr: i32 },
    #[error("stack overflow at sp = {sp}")]
    StackOverflow { sp: i32 },
    #[error("stack underflow at sp = {sp}")]
    StackUnderflow { sp: i32 },
    /// A token that had to be a decimal integer was not.
    #[error("cannot parse '{token}' as an integer")]
    OperandParse { token: String },
    #[error("unknown register '{name}'")]
    UnknownRegister { name: String },
    #[error("'{opcode}' is missing operand {index}")]
    MissingOperand { opcode: &'static str, index: usize },
    #[error("division by zero at pc = {pc}")]
    DivisionByZero { pc: i32 },
    #[error("output failed: {0}")]
    Output(#[from] io::Error),
}

/// Errors raised while turning a program file into a program image.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: '{token}' is not a valid address")]
    InvalidAddress { line: usize, token: String },
}
