use serde::Serialize;
use std::fmt;

use crate::error::ElfAlignError;

/// Output format selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per file on stdout.
    Json,
    /// Human-readable summary on stdout.
    #[default]
    Human,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Human => write!(f, "human"),
        }
    }
}

/// Write a successful result to stdout.
///
/// - **Json**: a single JSON object, no extraneous text.
/// - **Human**: the `Display` representation.
pub fn emit<T: Serialize + fmt::Display>(
    format: OutputFormat,
    value: &T,
) -> Result<(), ElfAlignError> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string(value)?;
            println!("{json}");
        }
        OutputFormat::Human => {
            println!("{value}");
        }
    }
    Ok(())
}

/// Write an error to stdout (JSON mode) or stderr (human mode).
///
/// `exit_code_num` is the raw numeric exit code (0, 1, or 2).
pub fn emit_error(format: OutputFormat, exit_code_num: u8, message: &str) {
    match format {
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "error": message,
                "exit_code": exit_code_num,
            });
            // JSON errors go to stdout so the caller always gets valid JSON on stdout.
            println!("{}", serde_json::to_string(&obj).unwrap_or_else(|_| {
                format!("{{\"error\":\"{message}\"}}")
            }));
        }
        OutputFormat::Human => {
            eprintln!("error: {message}");
        }
    }
}
