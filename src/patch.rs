//! Offset fix-up of the rewritten buffer: ELF header table offsets, program
//! header entries, section header entries, in that order.
//!
//! Entries are located through the *remapped* table offsets, since the
//! tables themselves may have been displaced by padding inserted below them.

use crate::error::ElfAlignError;
use crate::header::ElfHeader;
use crate::plan::{PaddingPlan, TARGET_ALIGNMENT};
use crate::tables::{self, ProgramHeaderRecord, SectionHeaderRecord};

/// Rewrite the ELF header's program/section table offsets.
///
/// A zero section-table offset means "no table" and stays zero.
pub fn patch_elf_header(
    data: &mut [u8],
    hdr: &ElfHeader,
    plan: &PaddingPlan,
) -> Result<(), ElfAlignError> {
    let identity = hdr.identity;
    let class = identity.class;
    identity.write_word(data, class.phoff_at(), plan.remap(hdr.e_phoff))?;
    let new_shoff = if hdr.e_shoff == 0 {
        0
    } else {
        plan.remap(hdr.e_shoff)
    };
    identity.write_word(data, class.shoff_at(), new_shoff)?;
    Ok(())
}

/// Rewrite every program header entry at its slot in the remapped table.
///
/// Each offset is remapped; LOAD entries additionally get their alignment
/// raised to at least [`TARGET_ALIGNMENT`]. All other fields are written
/// back verbatim from the parsed records.
pub fn patch_program_headers(
    data: &mut [u8],
    hdr: &ElfHeader,
    plan: &PaddingPlan,
    records: &[ProgramHeaderRecord],
) -> Result<(), ElfAlignError> {
    let table_offset = plan.remap(hdr.e_phoff);
    for rec in records {
        let at = (table_offset + rec.index as u64 * u64::from(hdr.e_phentsize)) as usize;
        let mut patched = *rec;
        patched.p_offset = plan.remap(rec.p_offset);
        if rec.is_load() {
            patched.p_align = rec.p_align.max(TARGET_ALIGNMENT);
        }
        tables::write_program_header(data, hdr.identity, at, &patched)?;
    }
    Ok(())
}

/// Rewrite every section header entry at its slot in the remapped table.
///
/// Only `sh_offset` changes; all other fields are written back verbatim.
/// No-op when the file has no section table.
pub fn patch_section_headers(
    data: &mut [u8],
    hdr: &ElfHeader,
    plan: &PaddingPlan,
    records: &[SectionHeaderRecord],
) -> Result<(), ElfAlignError> {
    if records.is_empty() {
        return Ok(());
    }
    let table_offset = plan.remap(hdr.e_shoff);
    for rec in records {
        let at = (table_offset + rec.index as u64 * u64::from(hdr.e_shentsize)) as usize;
        let mut patched = *rec;
        patched.sh_offset = plan.remap(rec.sh_offset);
        tables::write_section_header(data, hdr.identity, at, &patched)?;
    }
    Ok(())
}
