//! ELF identification and header decoding.
//!
//! Only the fields needed to locate and rewrite the program/section header
//! tables are decoded; everything else in the header passes through untouched.

use serde::Serialize;

use crate::endian::Endian;
use crate::error::ElfAlignError;

/// ELF magic number: 0x7F 'E' 'L' 'F'
pub const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];

/// ELF class: 32-bit
pub const ELFCLASS32: u8 = 1;

/// ELF class: 64-bit
pub const ELFCLASS64: u8 = 2;

/// ELF data encoding: little endian
pub const ELFDATA2LSB: u8 = 1;

/// ELF data encoding: big endian
pub const ELFDATA2MSB: u8 = 2;

/// Offset of the class byte within e_ident.
const EI_CLASS: usize = 4;

/// Offset of the data-encoding byte within e_ident.
const EI_DATA: usize = 5;

/// Word size of the file, from EI_CLASS.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Class {
    Elf32,
    Elf64,
}

impl Class {
    /// Size in bytes of the fixed ELF header for this class.
    pub fn ehdr_size(self) -> usize {
        match self {
            Class::Elf32 => 52,
            Class::Elf64 => 64,
        }
    }

    /// Size in bytes of a word-sized header field.
    pub fn word_size(self) -> usize {
        match self {
            Class::Elf32 => 4,
            Class::Elf64 => 8,
        }
    }

    /// Offset of `e_phoff` within the ELF header.
    pub fn phoff_at(self) -> usize {
        match self {
            Class::Elf32 => 28,
            Class::Elf64 => 32,
        }
    }

    /// Offset of `e_shoff` within the ELF header.
    pub fn shoff_at(self) -> usize {
        match self {
            Class::Elf32 => 32,
            Class::Elf64 => 40,
        }
    }

    /// Offset of `e_phentsize` within the ELF header; `e_phnum` follows it.
    pub fn phentsize_at(self) -> usize {
        match self {
            Class::Elf32 => 42,
            Class::Elf64 => 54,
        }
    }

    /// Offset of `e_shentsize` within the ELF header; `e_shnum` follows it.
    pub fn shentsize_at(self) -> usize {
        match self {
            Class::Elf32 => 46,
            Class::Elf64 => 58,
        }
    }

    /// Size in bytes of one program header entry's fixed layout.
    pub fn phdr_size(self) -> usize {
        match self {
            Class::Elf32 => 32,
            Class::Elf64 => 56,
        }
    }

    /// Size in bytes of one section header entry's fixed layout.
    pub fn shdr_size(self) -> usize {
        match self {
            Class::Elf32 => 40,
            Class::Elf64 => 64,
        }
    }
}

/// Word size and byte order, derived solely from the first six identification
/// bytes; immutable once read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElfIdentity {
    pub class: Class,
    pub endian: Endian,
}

impl ElfIdentity {
    /// Parse the identification prefix: magic, class byte, encoding byte.
    pub fn parse(data: &[u8]) -> Result<Self, ElfAlignError> {
        if data.len() <= EI_DATA {
            return Err(ElfAlignError::Truncated {
                needed: EI_DATA as u64 + 1,
                actual: data.len() as u64,
            });
        }
        if data[..4] != ELF_MAGIC {
            return Err(ElfAlignError::BadMagic);
        }
        let class = match data[EI_CLASS] {
            ELFCLASS32 => Class::Elf32,
            ELFCLASS64 => Class::Elf64,
            value => return Err(ElfAlignError::UnsupportedClass { value }),
        };
        let endian = match data[EI_DATA] {
            ELFDATA2LSB => Endian::Little,
            ELFDATA2MSB => Endian::Big,
            value => return Err(ElfAlignError::UnsupportedEncoding { value }),
        };
        Ok(Self { class, endian })
    }

    /// Read a word-sized field (u32 for ELF32, u64 for ELF64) at `at`,
    /// widened to u64.
    pub fn read_word(&self, data: &[u8], at: usize) -> u64 {
        match self.class {
            Class::Elf32 => u64::from(self.endian.read_u32(&data[at..])),
            Class::Elf64 => self.endian.read_u64(&data[at..]),
        }
    }

    /// Write a u64 into a word-sized field at `at`, narrowing for ELF32.
    ///
    /// Fails when a remapped offset has grown past what a 32-bit field can
    /// represent.
    pub fn write_word(&self, data: &mut [u8], at: usize, value: u64) -> Result<(), ElfAlignError> {
        match self.class {
            Class::Elf32 => {
                let narrow = u32::try_from(value)
                    .map_err(|_| ElfAlignError::OffsetOverflow { offset: value })?;
                self.endian.write_u32(&mut data[at..], narrow);
            }
            Class::Elf64 => self.endian.write_u64(&mut data[at..], value),
        }
        Ok(())
    }
}

/// The decoded ELF header fields the aligner needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElfHeader {
    pub identity: ElfIdentity,
    pub e_phoff: u64,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    pub e_shoff: u64,
    pub e_shentsize: u16,
    pub e_shnum: u16,
}

impl ElfHeader {
    /// Decode the fixed-position header fields from the start of `data`.
    pub fn decode(data: &[u8]) -> Result<Self, ElfAlignError> {
        let identity = ElfIdentity::parse(data)?;
        let class = identity.class;
        if data.len() < class.ehdr_size() {
            return Err(ElfAlignError::Truncated {
                needed: class.ehdr_size() as u64,
                actual: data.len() as u64,
            });
        }

        let endian = identity.endian;
        let e_phoff = identity.read_word(data, class.phoff_at());
        let e_shoff = identity.read_word(data, class.shoff_at());
        let e_phentsize = endian.read_u16(&data[class.phentsize_at()..]);
        let e_phnum = endian.read_u16(&data[class.phentsize_at() + 2..]);
        let e_shentsize = endian.read_u16(&data[class.shentsize_at()..]);
        let e_shnum = endian.read_u16(&data[class.shentsize_at() + 2..]);

        Ok(Self {
            identity,
            e_phoff,
            e_phentsize,
            e_phnum,
            e_shoff,
            e_shentsize,
            e_shnum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elf64_le_header() -> Vec<u8> {
        let mut data = vec![0u8; 64];
        data[..4].copy_from_slice(&ELF_MAGIC);
        data[EI_CLASS] = ELFCLASS64;
        data[EI_DATA] = ELFDATA2LSB;
        data[32..40].copy_from_slice(&0x40u64.to_le_bytes()); // e_phoff
        data[40..48].copy_from_slice(&0x2800u64.to_le_bytes()); // e_shoff
        data[54..56].copy_from_slice(&56u16.to_le_bytes()); // e_phentsize
        data[56..58].copy_from_slice(&3u16.to_le_bytes()); // e_phnum
        data[58..60].copy_from_slice(&64u16.to_le_bytes()); // e_shentsize
        data[60..62].copy_from_slice(&2u16.to_le_bytes()); // e_shnum
        data
    }

    fn elf32_be_header() -> Vec<u8> {
        let mut data = vec![0u8; 52];
        data[..4].copy_from_slice(&ELF_MAGIC);
        data[EI_CLASS] = ELFCLASS32;
        data[EI_DATA] = ELFDATA2MSB;
        data[28..32].copy_from_slice(&0x34u32.to_be_bytes()); // e_phoff
        data[32..36].copy_from_slice(&0x1200u32.to_be_bytes()); // e_shoff
        data[42..44].copy_from_slice(&32u16.to_be_bytes()); // e_phentsize
        data[44..46].copy_from_slice(&1u16.to_be_bytes()); // e_phnum
        data[46..48].copy_from_slice(&40u16.to_be_bytes()); // e_shentsize
        data[48..50].copy_from_slice(&4u16.to_be_bytes()); // e_shnum
        data
    }

    #[test]
    fn decodes_elf64_little_endian_fields() {
        let hdr = ElfHeader::decode(&elf64_le_header()).unwrap();
        assert_eq!(hdr.identity.class, Class::Elf64);
        assert_eq!(hdr.identity.endian, Endian::Little);
        assert_eq!(hdr.e_phoff, 0x40);
        assert_eq!(hdr.e_shoff, 0x2800);
        assert_eq!(hdr.e_phentsize, 56);
        assert_eq!(hdr.e_phnum, 3);
        assert_eq!(hdr.e_shentsize, 64);
        assert_eq!(hdr.e_shnum, 2);
    }

    #[test]
    fn decodes_elf32_big_endian_fields() {
        let hdr = ElfHeader::decode(&elf32_be_header()).unwrap();
        assert_eq!(hdr.identity.class, Class::Elf32);
        assert_eq!(hdr.identity.endian, Endian::Big);
        assert_eq!(hdr.e_phoff, 0x34);
        assert_eq!(hdr.e_shoff, 0x1200);
        assert_eq!(hdr.e_phentsize, 32);
        assert_eq!(hdr.e_phnum, 1);
        assert_eq!(hdr.e_shentsize, 40);
        assert_eq!(hdr.e_shnum, 4);
    }

    #[test]
    fn rejects_non_elf_buffer() {
        // Arbitrary 64-byte buffer without the magic prefix.
        let junk: Vec<u8> = (0u8..64).map(|i| i.wrapping_mul(7).wrapping_add(3)).collect();
        let err = ElfHeader::decode(&junk).unwrap_err();
        assert!(matches!(err, ElfAlignError::BadMagic));
    }

    #[test]
    fn rejects_unknown_class_byte() {
        let mut data = elf64_le_header();
        data[EI_CLASS] = 3;
        let err = ElfHeader::decode(&data).unwrap_err();
        assert!(matches!(err, ElfAlignError::UnsupportedClass { value: 3 }));
    }

    #[test]
    fn rejects_unknown_encoding_byte() {
        let mut data = elf64_le_header();
        data[EI_DATA] = 0;
        let err = ElfHeader::decode(&data).unwrap_err();
        assert!(matches!(err, ElfAlignError::UnsupportedEncoding { value: 0 }));
    }

    #[test]
    fn rejects_buffer_shorter_than_identification() {
        let err = ElfHeader::decode(&[0x7F, b'E', b'L']).unwrap_err();
        assert!(matches!(err, ElfAlignError::Truncated { .. }));
    }

    #[test]
    fn rejects_header_shorter_than_class_requires() {
        let mut data = elf64_le_header();
        data.truncate(40);
        let err = ElfHeader::decode(&data).unwrap_err();
        assert!(matches!(err, ElfAlignError::Truncated { needed: 64, .. }));
    }

    #[test]
    fn word_write_narrows_for_elf32_and_rejects_overflow() {
        let identity = ElfIdentity {
            class: Class::Elf32,
            endian: Endian::Big,
        };
        let mut buf = [0u8; 8];
        identity.write_word(&mut buf, 0, 0x0102_0304).unwrap();
        assert_eq!(&buf[..4], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(identity.read_word(&buf, 0), 0x0102_0304);

        let err = identity.write_word(&mut buf, 0, u64::from(u32::MAX) + 1).unwrap_err();
        assert!(matches!(err, ElfAlignError::OffsetOverflow { .. }));
    }
}
