/// All errors produced by elfalign.
///
/// Variants are split into two categories:
/// - **Infrastructure errors** (exit code 2): I/O and serialization failures
/// - **Operational errors** (exit code 1): malformed or unsupported ELF input
#[derive(thiserror::Error, Debug)]
pub enum ElfAlignError {
    // ── Infrastructure errors (exit code 2) ──────────────────────────

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Operational errors (exit code 1) ─────────────────────────────

    #[error("not an ELF binary (bad magic)")]
    BadMagic,

    #[error("unsupported ELF class: {value:#04x}")]
    UnsupportedClass { value: u8 },

    #[error("unsupported ELF data encoding: {value:#04x}")]
    UnsupportedEncoding { value: u8 },

    #[error("file truncated: need {needed} bytes, found {actual}")]
    Truncated { needed: u64, actual: u64 },

    #[error("header table entry size too small: need at least {expected} bytes, found {actual}")]
    BadEntrySize { expected: u16, actual: u16 },

    #[error("no program headers to align")]
    NoProgramHeaders,

    #[error("LOAD segment {index} extends past end of file")]
    SegmentOutOfBounds { index: usize },

    #[error("overlapping padding plan at offset {offset:#x}")]
    OverlappingPlan { offset: u64 },

    #[error("remapped offset {offset:#x} does not fit in an ELF32 field")]
    OffsetOverflow { offset: u64 },
}

impl ElfAlignError {
    /// Map each error variant to its numeric process exit code.
    ///
    /// - `2` — infrastructure error (I/O, serialization)
    /// - `1` — operational failure (the input file cannot be aligned)
    pub fn exit_code(&self) -> u8 {
        match self {
            // Infrastructure errors → 2
            Self::Io(_) | Self::Json(_) => 2,

            // Operational errors → 1
            Self::BadMagic
            | Self::UnsupportedClass { .. }
            | Self::UnsupportedEncoding { .. }
            | Self::Truncated { .. }
            | Self::BadEntrySize { .. }
            | Self::NoProgramHeaders
            | Self::SegmentOutOfBounds { .. }
            | Self::OverlappingPlan { .. }
            | Self::OffsetOverflow { .. } => 1,
        }
    }
}
