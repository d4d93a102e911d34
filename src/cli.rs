use std::path::PathBuf;

use clap::Parser;

use crate::output::OutputFormat;

/// Rewrite ELF shared objects in place so every LOAD segment starts on a
/// 16 KiB file-offset boundary.
#[derive(Parser, Debug)]
#[command(name = "elfalign", version, about)]
pub struct Cli {
    /// Shared objects to align, processed in order.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,
}
