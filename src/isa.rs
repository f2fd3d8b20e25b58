use std::fmt;

/// Instruction set. Mnemonics are matched exactly (case-sensitive).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    Mov,
    Movv,
    Load,
    Loadr,
    Store,
    Storer,
    Add,
    Sub,
    Mod,
    Call,
    Ret,
    Out,
    Push,
    Pop,
    Jmp,
    Jnz,
    Halt,
}

impl Opcode {
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        let op = match s {
            "mov" => Opcode::Mov,
            "movv" => Opcode::Movv,
            "load" => Opcode::Load,
            "loadr" => Opcode::Loadr,
            "store" => Opcode::Store,
            "storer" => Opcode::Storer,
            "add" => Opcode::Add,
            "sub" => Opcode::Sub,
            "mod" => Opcode::Mod,
            "call" => Opcode::Call,
            "ret" => Opcode::Ret,
            "out" => Opcode::Out,
            "push" => Opcode::Push,
            "pop" => Opcode::Pop,
            "jmp" => Opcode::Jmp,
            "jnz" => Opcode::Jnz,
            "halt" => Opcode::Halt,
            _ => return None,
        };
        Some(op)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Mov => "mov",
            Opcode::Movv => "movv",
            Opcode::Load => "load",
            Opcode::Loadr => "loadr",
            Opcode::Store => "store",
            Opcode::Storer => "storer",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mod => "mod",
            Opcode::Call => "call",
            Opcode::Ret => "ret",
            Opcode::Out => "out",
            Opcode::Push => "push",
            Opcode::Pop => "pop",
            Opcode::Jmp => "jmp",
            Opcode::Jnz => "jnz",
            Opcode::Halt => "halt",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonics_are_case_sensitive() {
        assert_eq!(Opcode::from_mnemonic("jnz"), Some(Opcode::Jnz));
        assert_eq!(Opcode::from_mnemonic("JNZ"), None);
    }

    #[test]
    fn test_unassigned_cell_token_is_not_an_opcode() {
        assert_eq!(Opcode::from_mnemonic("0"), None);
    }

    #[test]
    fn test_mnemonic_matches_parser() {
        for name in [
            "mov", "movv", "load", "loadr", "store", "storer", "add", "sub", "mod", "call", "ret",
            "out", "push", "pop", "jmp", "jnz", "halt",
        ] {
            let op = Opcode::from_mnemonic(name).unwrap();
            assert_eq!(op.mnemonic(), name);
        }
    }
}
