//! Per-file pipeline: decode the header, read the tables, plan the padding,
//! splice the buffer, patch the offsets, write the result back.
//!
//! Write-back is atomic: the rewritten buffer goes to a temporary file next
//! to the target, takes over the original file's permissions, and is renamed
//! into place. An interrupted run therefore leaves either the old bytes or
//! the new bytes on disk, never a half-written file. A file whose rewritten
//! bytes equal the input is not rewritten at all.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::endian::Endian;
use crate::error::ElfAlignError;
use crate::header::{Class, ElfHeader};
use crate::patch;
use crate::plan::{PaddingPlan, TARGET_ALIGNMENT};
use crate::rewrite;
use crate::tables;

/// Result of aligning one in-memory buffer.
#[derive(Debug)]
pub struct Aligned {
    /// The rewritten file contents.
    pub bytes: Vec<u8>,
    /// Header fields as decoded from the *input* buffer.
    pub header: ElfHeader,
    /// Number of LOAD segments in the program header table.
    pub load_segments: usize,
    pub plan: PaddingPlan,
}

/// Per-file summary reported after a successful run.
#[derive(Clone, Debug, Serialize)]
pub struct AlignReport {
    pub path: PathBuf,
    pub class: Class,
    pub endianness: Endian,
    pub load_segments: usize,
    /// Number of zero-gap insertions.
    pub breakpoints: usize,
    /// Total zero bytes inserted.
    pub padding_bytes: u64,
    pub original_size: u64,
    pub aligned_size: u64,
    /// False when the file already had the rewritten bytes and was not touched.
    pub changed: bool,
}

impl fmt::Display for AlignReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.display();
        if self.padding_bytes > 0 {
            write!(
                f,
                "{path}: LOAD alignment fixed (segments: {}, gaps: {}, padding: {} bytes, size: {} -> {})",
                self.load_segments,
                self.breakpoints,
                self.padding_bytes,
                self.original_size,
                self.aligned_size
            )
        } else if self.changed {
            write!(
                f,
                "{path}: offsets already aligned, LOAD p_align raised to {TARGET_ALIGNMENT}"
            )
        } else {
            write!(f, "{path}: already aligned, unchanged")
        }
    }
}

/// Run the full alignment pipeline over one in-memory file image.
///
/// The input is never modified; the rewritten image is returned together
/// with the plan that produced it.
pub fn align_bytes(data: &[u8]) -> Result<Aligned, ElfAlignError> {
    let header = ElfHeader::decode(data)?;
    let phdrs = tables::read_program_headers(data, &header)?;
    let shdrs = tables::read_section_headers(data, &header)?;

    let plan = PaddingPlan::for_segments(&phdrs);
    let mut bytes = rewrite::apply_plan(data, &plan)?;
    patch::patch_elf_header(&mut bytes, &header, &plan)?;
    patch::patch_program_headers(&mut bytes, &header, &plan, &phdrs)?;
    patch::patch_section_headers(&mut bytes, &header, &plan, &shdrs)?;

    Ok(Aligned {
        bytes,
        header,
        load_segments: phdrs.iter().filter(|p| p.is_load()).count(),
        plan,
    })
}

/// Align one file on disk, rewriting it in place.
///
/// On any error the file is left exactly as it was.
pub fn align_file(path: &Path) -> Result<AlignReport, ElfAlignError> {
    let original = fs::read(path)?;
    let aligned = align_bytes(&original)?;
    let changed = aligned.bytes != original;
    if changed {
        write_back(path, &aligned.bytes)?;
    }

    Ok(AlignReport {
        path: path.to_path_buf(),
        class: aligned.header.identity.class,
        endianness: aligned.header.identity.endian,
        load_segments: aligned.load_segments,
        breakpoints: aligned.plan.len(),
        padding_bytes: aligned.plan.total_padding(),
        original_size: original.len() as u64,
        aligned_size: aligned.bytes.len() as u64,
        changed,
    })
}

/// Replace `path` with `bytes` via a temp file in the same directory.
fn write_back(path: &Path, bytes: &[u8]) -> Result<(), ElfAlignError> {
    let dir = path.parent().ok_or_else(|| {
        ElfAlignError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no parent directory for output file",
        ))
    })?;
    let mut tmp_name = path
        .file_name()
        .ok_or_else(|| {
            ElfAlignError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "output path has no file name",
            ))
        })?
        .to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = dir.join(tmp_name);

    // Write to a temp file in the same directory, then rename for atomicity.
    // The temp file takes over the original's permissions first, so an
    // executable .so stays executable.
    let permissions = fs::metadata(path)?.permissions();
    fs::write(&tmp_path, bytes)?;
    fs::set_permissions(&tmp_path, permissions)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
