use std::io::Write;

use log::{error, info, trace};

use crate::cpu::{address, parse_int, Machine};
use crate::error::Fault;
use crate::isa::Opcode;
use crate::reg::Register;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    Halted,
}

/// Fetch/decode/execute engine over a single owned [`Machine`].
///
/// `out` receives one line per `out` instruction.
pub struct Vm<W: Write> {
    machine: Machine,
    out: W,
    cycles: u64,
    fault: Option<Fault>,
}

fn operand<'a>(op: Opcode, ops: &'a [String], index: usize) -> Result<&'a str, Fault> {
    ops.get(index)
        .map(String::as_str)
        .ok_or(Fault::MissingOperand { opcode: op.mnemonic(), index })
}

fn reg_operand(op: Opcode, ops: &[String], index: usize) -> Result<Register, Fault> {
    operand(op, ops, index)?.parse()
}

fn int_operand(op: Opcode, ops: &[String], index: usize) -> Result<i32, Fault> {
    parse_int(operand(op, ops, index)?)
}

/// Memory index of a stack slot, or the matching stack fault.
fn stack_slot(sp: i32) -> Result<usize, Fault> {
    if sp < 0 {
        return Err(Fault::StackUnderflow { sp });
    }
    address(sp).ok_or(Fault::StackOverflow { sp })
}

impl<W: Write> Vm<W> {
    pub fn new(machine: Machine, out: W) -> Self {
        Self {
            machine,
            out,
            cycles: 0,
            fault: None,
        }
    }

    #[cfg(test)]
    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    #[cfg(test)]
    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    /// First fault raised during the run, if any.
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    /// Cycles that reached an instruction handler.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn is_halted(&self) -> bool {
        self.reg(Register::Halt) != 0
    }

    fn reg(&self, r: Register) -> i32 {
        self.machine.regs.get(r)
    }

    fn set(&mut self, r: Register, val: i32) {
        self.machine.regs.set(r, val);
    }

    fn advance(&mut self) {
        let pc = self.reg(Register::Pc).wrapping_add(1);
        self.set(Register::Pc, pc);
    }

    /// Reports a fault and stops the machine.
    fn raise(&mut self, fault: Fault) {
        error!("{}", fault);
        self.set(Register::Halt, 1);
        self.fault.get_or_insert(fault);
    }

    /// Runs until the `halt` register is set and returns the cycles executed.
    pub fn run(&mut self) -> u64 {
        let start = self.cycles;
        info!("Starting execution at pc = {}", self.reg(Register::Pc));
        while self.step() == Status::Running {}
        let ran = self.cycles - start;
        match &self.fault {
            Some(f) => info!("Machine halted after {} cycles: {}", ran, f),
            None => info!("Machine halted after {} cycles", ran),
        }
        ran
    }

    /// Executes one cycle: fetch, dispatch, timer tick and interrupt check.
    pub fn step(&mut self) -> Status {
        if self.is_halted() {
            return Status::Halted;
        }

        let pc = self.reg(Register::Pc);
        let (op, operands) = match self.fetch(pc) {
            Ok(decoded) => decoded,
            Err(fault) => {
                self.raise(fault);
                return Status::Halted;
            }
        };

        self.cycles += 1;
        trace!("[{}] {} {}", pc, op, operands.join(" "));
        if let Err(fault) = self.execute(op, &operands) {
            self.raise(fault);
        }
        if let Err(fault) = self.tick() {
            self.raise(fault);
        }

        if self.is_halted() {
            Status::Halted
        } else {
            Status::Running
        }
    }

    fn fetch(&self, pc: i32) -> Result<(Opcode, Vec<String>), Fault> {
        let (name, operands) = address(pc)
            .and_then(|a| self.machine.mem.cell(a))
            .and_then(<[String]>::split_first)
            .ok_or(Fault::InvalidProgramCounter { pc })?;
        let op = Opcode::from_mnemonic(name).ok_or_else(|| Fault::InvalidOpcode {
            opcode: name.clone(),
            pc,
        })?;
        Ok((op, operands.to_vec()))
    }

    fn execute(&mut self, op: Opcode, ops: &[String]) -> Result<(), Fault> {
        match op {
            Opcode::Mov => {
                let dst = reg_operand(op, ops, 0)?;
                let src = reg_operand(op, ops, 1)?;
                let val = self.reg(src);
                self.set(dst, val);
                self.advance();
            }
            Opcode::Movv => {
                let dst = reg_operand(op, ops, 0)?;
                let imm = int_operand(op, ops, 1)?;
                self.set(dst, imm);
                self.advance();
            }
            Opcode::Load | Opcode::Loadr => {
                let dst = reg_operand(op, ops, 0)?;
                let addr = if op == Opcode::Load {
                    int_operand(op, ops, 1)?
                } else {
                    self.reg(reg_operand(op, ops, 1)?)
                };
                let idx = address(addr).ok_or(Fault::InvalidMemoryAccess { addr })?;
                let val = self.machine.mem.read_scalar(idx)?;
                self.set(dst, val);
                self.advance();
            }
            Opcode::Store | Opcode::Storer => {
                let addr = if op == Opcode::Store {
                    int_operand(op, ops, 0)?
                } else {
                    self.reg(reg_operand(op, ops, 0)?)
                };
                let src = reg_operand(op, ops, 1)?;
                let idx = address(addr).ok_or(Fault::InvalidMemoryAccess { addr })?;
                let val = self.reg(src);
                self.machine.mem.write_scalar(idx, val)?;
                self.advance();
            }
            Opcode::Add | Opcode::Sub | Opcode::Mod => {
                let lhs = self.reg(reg_operand(op, ops, 0)?);
                let rhs = self.reg(reg_operand(op, ops, 1)?);
                let acc = match op {
                    Opcode::Add => lhs.wrapping_add(rhs),
                    Opcode::Sub => lhs.wrapping_sub(rhs),
                    _ if rhs == 0 => {
                        return Err(Fault::DivisionByZero {
                            pc: self.reg(Register::Pc),
                        })
                    }
                    _ => lhs.wrapping_rem(rhs),
                };
                self.set(Register::Acc, acc);
                self.advance();
            }
            Opcode::Call => {
                let target = int_operand(op, ops, 0)?;
                let sp = self.reg(Register::Sp).wrapping_add(1);
                self.set(Register::Sp, sp);
                let slot = stack_slot(sp)?;
                let ret = self.reg(Register::Pc).wrapping_add(1);
                self.machine.mem.write_scalar(slot, ret)?;
                self.set(Register::Pc, target);
            }
            Opcode::Ret => {
                let sp = self.reg(Register::Sp);
                let ret = self.machine.mem.read_scalar(stack_slot(sp)?)?;
                self.set(Register::Pc, ret);
                self.set(Register::Sp, sp.wrapping_sub(1));
            }
            Opcode::Out => {
                let val = self.reg(reg_operand(op, ops, 0)?);
                writeln!(self.out, "{}", val)?;
                self.advance();
            }
            Opcode::Push => {
                let r = reg_operand(op, ops, 0)?;
                let sp = self.reg(Register::Sp);
                let slot = stack_slot(sp.wrapping_add(1)).map_err(|f| match f {
                    Fault::StackOverflow { .. } => Fault::StackOverflow { sp },
                    other => other,
                })?;
                let val = self.reg(r);
                self.set(Register::Sp, sp.wrapping_add(1));
                self.machine.mem.write_scalar(slot, val)?;
                self.advance();
            }
            Opcode::Pop => {
                let dst = reg_operand(op, ops, 0)?;
                let val = self.machine.mem.read_scalar(stack_slot(self.reg(Register::Sp))?)?;
                self.set(dst, val);
                // sp may have just been the destination.
                let sp = self.reg(Register::Sp).wrapping_sub(1);
                self.set(Register::Sp, sp);
                self.advance();
            }
            Opcode::Jmp => {
                let target = int_operand(op, ops, 0)?;
                self.set(Register::Pc, target);
            }
            Opcode::Jnz => {
                let target = int_operand(op, ops, 0)?;
                let test = reg_operand(op, ops, 1)?;
                if self.reg(test) != 0 {
                    self.set(Register::Pc, target);
                } else {
                    self.advance();
                }
            }
            Opcode::Halt => {
                self.set(Register::Halt, 1);
                self.advance();
            }
        }
        Ok(())
    }

    /// Decrements the timer and injects the interrupt once it is due.
    fn tick(&mut self) -> Result<(), Fault> {
        let timer = self.reg(Register::Timer).wrapping_sub(1);
        self.set(Register::Timer, timer);
        if self.reg(Register::Int) != 1 || timer != 0 {
            return Ok(());
        }

        // The timer is not reloaded; another interrupt needs `int` and `timer` set again.
        let sp = self.reg(Register::Sp).wrapping_add(1);
        let slot = stack_slot(sp)?;
        let pc = self.reg(Register::Pc);
        let ivec = self.reg(Register::Ivec);
        trace!("Interrupt: saving pc = {} at {}, jumping to {}", pc, slot, ivec);
        self.set(Register::Sp, sp);
        self.machine.mem.write_scalar(slot, pc)?;
        self.set(Register::Pc, ivec);
        self.set(Register::Int, 0);
        Ok(())
    }

    pub fn into_parts(self) -> (Machine, W) {
        (self.machine, self.out)
    }
}
