use std::fmt;
use std::str::FromStr;

use crate::error::Fault;

/// Every register the machine has, in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Register {
    A,
    B,
    C,
    D,
    E,
    F,
    /// Stack pointer. The stack grows upward from address 0.
    Sp,
    /// Accumulator, the only destination of arithmetic.
    Acc,
    Pc,
    /// Interrupt vector.
    Ivec,
    /// Interrupt pending flag.
    Int,
    /// Interrupt countdown, decremented once per cycle.
    Timer,
    Halt,
}

impl Register {
    pub const COUNT: usize = 13;

    pub const ALL: [Register; Register::COUNT] = [
        Register::A,
        Register::B,
        Register::C,
        Register::D,
        Register::E,
        Register::F,
        Register::Sp,
        Register::Acc,
        Register::Pc,
        Register::Ivec,
        Register::Int,
        Register::Timer,
        Register::Halt,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Register::A => "a",
            Register::B => "b",
            Register::C => "c",
            Register::D => "d",
            Register::E => "e",
            Register::F => "f",
            Register::Sp => "sp",
            Register::Acc => "acc",
            Register::Pc => "pc",
            Register::Ivec => "ivec",
            Register::Int => "int",
            Register::Timer => "timer",
            Register::Halt => "halt",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Register {
    type Err = Fault;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Register::ALL
            .iter()
            .copied()
            .find(|r| r.name() == s)
            .ok_or_else(|| Fault::UnknownRegister { name: s.to_string() })
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed register file. Every slot starts at 0.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [i32; Register::COUNT],
}

impl RegisterFile {
    pub fn get(&self, reg: Register) -> i32 {
        self.regs[reg.index()]
    }

    pub fn set(&mut self, reg: Register, val: i32) {
        self.regs[reg.index()] = val;
    }

    /// `(register, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Register, i32)> + '_ {
        Register::ALL.iter().map(move |&r| (r, self.get(r)))
    }
}
