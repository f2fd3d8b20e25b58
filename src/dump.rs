use std::io::{self, Write};

use crate::cpu::Machine;

/// Writes every register in declaration order, then every memory cell in address order.
pub fn write_state(w: &mut impl Write, machine: &Machine) -> io::Result<()> {
    writeln!(w, "\nRegister states:")?;
    for (reg, val) in machine.regs.iter() {
        writeln!(w, "{}: {}", reg, val)?;
    }

    writeln!(w, "\nMemory contents:")?;
    for (addr, cell) in machine.mem.iter() {
        write!(w, "{}: ", addr)?;
        for token in cell {
            write!(w, "{} ", token)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MEM_SIZE;
    use crate::loader::ProgramImage;
    use crate::reg::Register;

    fn dump(machine: &Machine) -> String {
        let mut buf = Vec::new();
        write_state(&mut buf, machine).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_dump_lists_registers_in_order() {
        let mut m = Machine::new();
        m.regs.set(Register::Acc, 8);
        m.regs.set(Register::Halt, 1);
        let text = dump(&m);

        let regs: Vec<_> = text
            .lines()
            .skip_while(|l| *l != "Register states:")
            .skip(1)
            .take_while(|l| !l.is_empty())
            .collect();
        assert_eq!(regs.len(), Register::COUNT);
        assert_eq!(regs[0], "a: 0");
        assert_eq!(regs[7], "acc: 8");
        assert_eq!(regs[12], "halt: 1");
    }

    #[test]
    fn test_dump_lists_every_cell() {
        let image = ProgramImage::parse("0 movv a 5\n1 halt").unwrap();
        let text = dump(&Machine::with_program(&image));

        let cells: Vec<_> = text
            .lines()
            .skip_while(|l| *l != "Memory contents:")
            .skip(1)
            .collect();
        assert_eq!(cells.len(), MEM_SIZE, "Untouched cells are dumped too");
        assert_eq!(cells[0], "0: movv a 5 ");
        assert_eq!(cells[1], "1: halt ");
        assert_eq!(cells[99], "99: 0 ");
    }
}
