mod config;
mod cpu;
mod dump;
mod error;
mod isa;
mod loader;
mod reg;
mod vm;

use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, info, log_enabled, trace, warn};

use crate::config::{Args, DEFAULT_LOG_FILTER};
use crate::cpu::Machine;
use crate::loader::ProgramImage;
use crate::vm::Vm;

fn main() -> anyhow::Result<()> {
    // Initialize logger from environment variables
    // Use RUST_LOG=trace to see every executed instruction
    env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_LOG_FILTER)).init();
    let args = Args::parse();

    info!("Loading program from {}", args.program.display());
    let image = ProgramImage::load(&args.program)
        .with_context(|| format!("failed to load program {}", args.program.display()))?;
    if image.is_empty() {
        warn!("{} contains no memory cells", args.program.display());
    }
    debug!("Loaded {} cells", image.len());

    let stdout = io::stdout();
    let mut vm = Vm::new(Machine::with_program(&image), stdout.lock());
    vm.run();
    match vm.fault() {
        Some(fault) => warn!("Program stopped by a fault after {} cycles: {}", vm.cycles(), fault),
        None => debug!("Program halted after {} cycles", vm.cycles()),
    }

    let (machine, mut out) = vm.into_parts();
    if log_enabled!(log::Level::Trace) {
        for (reg, val) in machine.regs.iter() {
            trace!("Register {} = {}", reg, val);
        }
    }
    if !args.no_dump {
        dump::write_state(&mut out, &machine).context("failed to write final state")?;
    }
    out.flush()?;

    Ok(())
}
