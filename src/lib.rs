//! In-place 16 KiB alignment of LOAD segments in ELF shared objects.
//!
//! Loaders on 16 KiB-page systems reject shared objects whose LOAD segments
//! sit at file offsets that are only 4 KiB-aligned. This crate rewrites such
//! files in place: it inserts zero padding in front of every misaligned LOAD
//! segment, shifts the bytes behind it, and patches each file offset stored
//! in the ELF header, program header table, and section header table so the
//! result stays consistent.

pub mod align;
pub mod cli;
pub mod endian;
pub mod error;
pub mod header;
pub mod output;
pub mod patch;
pub mod plan;
pub mod rewrite;
pub mod tables;

pub use align::{align_bytes, align_file, AlignReport};
pub use error::ElfAlignError;
