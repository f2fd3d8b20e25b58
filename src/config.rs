//! Machine and runner configuration.

use std::path::PathBuf;

use clap::Parser;

// ============================================================================
// Machine constants
// ============================================================================
/// Number of addressable memory cells.
pub const MEM_SIZE: usize = 100;
/// Token every cell holds before a program is loaded.
pub const EMPTY_CELL_TOKEN: &str = "0";

// ============================================================================
// Runner defaults
// ============================================================================
pub const DEFAULT_PROGRAM: &str = "prog.asm";
/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
#[command(
    name = "tokvm",
    about = "Runs a textual register-machine program and dumps the final state."
)]
pub struct Args {
    /// Program file: one `ADDR TOKEN...` cell per line, `#` starts a comment line.
    #[arg(value_name = "PATH", default_value = DEFAULT_PROGRAM)]
    pub program: PathBuf,

    /// Skip the register/memory dump after the machine halts.
    #[arg(long, default_value_t = false)]
    pub no_dump: bool,
}
