//! Program and section header tables: decoding into records and writing
//! patched records back at their table slots.

use crate::error::ElfAlignError;
use crate::header::{Class, ElfHeader, ElfIdentity};

/// Program header type: loadable segment.
pub const PT_LOAD: u32 = 1;

/// One decoded program header table entry.
///
/// Field values are widened to u64 for ELF32 inputs and narrowed (checked)
/// on write-back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramHeaderRecord {
    /// Position in the table; fixes where the entry is written back.
    pub index: usize,
    pub p_type: u32,
    pub p_flags: u32,
    pub p_offset: u64,
    pub p_vaddr: u64,
    pub p_paddr: u64,
    pub p_filesz: u64,
    pub p_memsz: u64,
    pub p_align: u64,
}

impl ProgramHeaderRecord {
    /// Whether the loader maps this segment (`PT_LOAD`).
    pub fn is_load(&self) -> bool {
        self.p_type == PT_LOAD
    }
}

/// One decoded section header table entry. Only `sh_offset` is ever changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionHeaderRecord {
    pub index: usize,
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u64,
    pub sh_entsize: u64,
}

fn check_entry_size(actual: u16, fixed: usize) -> Result<u16, ElfAlignError> {
    if (actual as usize) < fixed {
        return Err(ElfAlignError::BadEntrySize {
            expected: fixed as u16,
            actual,
        });
    }
    Ok(actual)
}

fn check_table_bounds(
    data: &[u8],
    offset: u64,
    count: u16,
    entsize: u16,
) -> Result<(), ElfAlignError> {
    let end = offset.saturating_add(u64::from(count) * u64::from(entsize));
    if end > data.len() as u64 {
        return Err(ElfAlignError::Truncated {
            needed: end,
            actual: data.len() as u64,
        });
    }
    Ok(())
}

/// Deserialize the program header table.
///
/// A missing table (zero count or zero offset) is fatal: a shared object
/// with no loadable segments cannot be meaningfully aligned.
pub fn read_program_headers(
    data: &[u8],
    hdr: &ElfHeader,
) -> Result<Vec<ProgramHeaderRecord>, ElfAlignError> {
    if hdr.e_phnum == 0 || hdr.e_phoff == 0 {
        return Err(ElfAlignError::NoProgramHeaders);
    }
    let class = hdr.identity.class;
    let entsize = check_entry_size(hdr.e_phentsize, class.phdr_size())?;
    check_table_bounds(data, hdr.e_phoff, hdr.e_phnum, entsize)?;

    let endian = hdr.identity.endian;
    let mut records = Vec::with_capacity(usize::from(hdr.e_phnum));
    for index in 0..usize::from(hdr.e_phnum) {
        let at = hdr.e_phoff as usize + index * usize::from(entsize);
        let entry = &data[at..];
        let rec = match class {
            Class::Elf64 => ProgramHeaderRecord {
                index,
                p_type: endian.read_u32(entry),
                p_flags: endian.read_u32(&entry[4..]),
                p_offset: endian.read_u64(&entry[8..]),
                p_vaddr: endian.read_u64(&entry[16..]),
                p_paddr: endian.read_u64(&entry[24..]),
                p_filesz: endian.read_u64(&entry[32..]),
                p_memsz: endian.read_u64(&entry[40..]),
                p_align: endian.read_u64(&entry[48..]),
            },
            // 32-bit layout stores the flags after the sizes, not after the type.
            Class::Elf32 => ProgramHeaderRecord {
                index,
                p_type: endian.read_u32(entry),
                p_offset: u64::from(endian.read_u32(&entry[4..])),
                p_vaddr: u64::from(endian.read_u32(&entry[8..])),
                p_paddr: u64::from(endian.read_u32(&entry[12..])),
                p_filesz: u64::from(endian.read_u32(&entry[16..])),
                p_memsz: u64::from(endian.read_u32(&entry[20..])),
                p_flags: endian.read_u32(&entry[24..]),
                p_align: u64::from(endian.read_u32(&entry[28..])),
            },
        };
        // The rewriter splices at LOAD offsets; an extent past the end of the
        // buffer could not be copied correctly.
        if rec.is_load() && rec.p_offset.saturating_add(rec.p_filesz) > data.len() as u64 {
            return Err(ElfAlignError::SegmentOutOfBounds { index });
        }
        records.push(rec);
    }
    Ok(records)
}

/// Deserialize the section header table.
///
/// A zero offset or count is valid and yields an empty table.
pub fn read_section_headers(
    data: &[u8],
    hdr: &ElfHeader,
) -> Result<Vec<SectionHeaderRecord>, ElfAlignError> {
    if hdr.e_shoff == 0 || hdr.e_shnum == 0 {
        return Ok(Vec::new());
    }
    let identity = hdr.identity;
    let entsize = check_entry_size(hdr.e_shentsize, identity.class.shdr_size())?;
    check_table_bounds(data, hdr.e_shoff, hdr.e_shnum, entsize)?;

    let endian = identity.endian;
    let word = identity.class.word_size();
    let mut records = Vec::with_capacity(usize::from(hdr.e_shnum));
    for index in 0..usize::from(hdr.e_shnum) {
        // Both classes share the section field order; only the word width differs.
        let base = hdr.e_shoff as usize + index * usize::from(entsize);
        let sh_name = endian.read_u32(&data[base..]);
        let sh_type = endian.read_u32(&data[base + 4..]);
        let words = base + 8;
        let sh_flags = identity.read_word(data, words);
        let sh_addr = identity.read_word(data, words + word);
        let sh_offset = identity.read_word(data, words + 2 * word);
        let sh_size = identity.read_word(data, words + 3 * word);
        let links = words + 4 * word;
        let sh_link = endian.read_u32(&data[links..]);
        let sh_info = endian.read_u32(&data[links + 4..]);
        let tail = links + 8;
        let sh_addralign = identity.read_word(data, tail);
        let sh_entsize = identity.read_word(data, tail + word);

        records.push(SectionHeaderRecord {
            index,
            sh_name,
            sh_type,
            sh_flags,
            sh_addr,
            sh_offset,
            sh_size,
            sh_link,
            sh_info,
            sh_addralign,
            sh_entsize,
        });
    }
    Ok(records)
}

/// Write a full program header entry at `at`, in the layout for `identity`.
pub fn write_program_header(
    data: &mut [u8],
    identity: ElfIdentity,
    at: usize,
    rec: &ProgramHeaderRecord,
) -> Result<(), ElfAlignError> {
    let endian = identity.endian;
    match identity.class {
        Class::Elf64 => {
            endian.write_u32(&mut data[at..], rec.p_type);
            endian.write_u32(&mut data[at + 4..], rec.p_flags);
            endian.write_u64(&mut data[at + 8..], rec.p_offset);
            endian.write_u64(&mut data[at + 16..], rec.p_vaddr);
            endian.write_u64(&mut data[at + 24..], rec.p_paddr);
            endian.write_u64(&mut data[at + 32..], rec.p_filesz);
            endian.write_u64(&mut data[at + 40..], rec.p_memsz);
            endian.write_u64(&mut data[at + 48..], rec.p_align);
        }
        Class::Elf32 => {
            endian.write_u32(&mut data[at..], rec.p_type);
            identity.write_word(data, at + 4, rec.p_offset)?;
            identity.write_word(data, at + 8, rec.p_vaddr)?;
            identity.write_word(data, at + 12, rec.p_paddr)?;
            identity.write_word(data, at + 16, rec.p_filesz)?;
            identity.write_word(data, at + 20, rec.p_memsz)?;
            endian.write_u32(&mut data[at + 24..], rec.p_flags);
            identity.write_word(data, at + 28, rec.p_align)?;
        }
    }
    Ok(())
}

/// Write a full section header entry at `at`, in the layout for `identity`.
pub fn write_section_header(
    data: &mut [u8],
    identity: ElfIdentity,
    at: usize,
    rec: &SectionHeaderRecord,
) -> Result<(), ElfAlignError> {
    let endian = identity.endian;
    let word = identity.class.word_size();
    endian.write_u32(&mut data[at..], rec.sh_name);
    endian.write_u32(&mut data[at + 4..], rec.sh_type);
    let words = at + 8;
    identity.write_word(data, words, rec.sh_flags)?;
    identity.write_word(data, words + word, rec.sh_addr)?;
    identity.write_word(data, words + 2 * word, rec.sh_offset)?;
    identity.write_word(data, words + 3 * word, rec.sh_size)?;
    let links = words + 4 * word;
    endian.write_u32(&mut data[links..], rec.sh_link);
    endian.write_u32(&mut data[links + 4..], rec.sh_info);
    let tail = links + 8;
    identity.write_word(data, tail, rec.sh_addralign)?;
    identity.write_word(data, tail + word, rec.sh_entsize)?;
    Ok(())
}
