// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2026 The elf-linker Authors
//
// vim: ts=4 sw=4 et

use super::types::*;
use super::Elf64AddrRange;
use super::Elf64FileRange;
use super::ElfError;
use bitflags::bitflags;

bitflags! {
    /// Flags associated with ELF64 section header (e.g.,
    /// writable, contains null-terminated string, etc.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Elf64ShdrFlags : Elf64Xword {
        const WRITE            = 0x001;
        const ALLOC            = 0x002;
        const EXECINSTR        = 0x004;
        const MERGE            = 0x010;
        const STRINGS          = 0x020;
        const INFO_LINK        = 0x040;
        const LINK_ORDER       = 0x080;
        const OS_NONCONFORMING = 0x100;
        const GROUP            = 0x200;
        const TLS              = 0x400;
        const COMPRESSED       = 0x800;
    }
}

/// An ELF64 section header
#[derive(Debug, Clone, Copy)]
pub struct Elf64Shdr {
    pub sh_name: Elf64Word,
    pub sh_type: Elf64Word,
    pub sh_flags: Elf64ShdrFlags,
    pub sh_addr: Elf64Addr,
    pub sh_offset: Elf64Off,
    /// Size of the section
    pub sh_size: Elf64Xword,
    /// Link to another section
    pub sh_link: Elf64Word,
    /// Additional section information
    pub sh_info: Elf64Word,
    /// Address alignment constraint
    pub sh_addralign: Elf64Xword,
    /// Size of each entry
    pub sh_entsize: Elf64Xword,
}

impl Elf64Shdr {
    pub const SHT_NULL: Elf64Word = 0;
    pub const SHT_PROGBITS: Elf64Word = 1;
    pub const SHT_STRTAB: Elf64Word = 3;
    pub const SHT_RELA: Elf64Word = 4;
    pub const SHT_HASH: Elf64Word = 5;
    /// Section occupies memory but no space in the file
    pub const SHT_NOBITS: Elf64Word = 8;
    pub const SHT_REL: Elf64Word = 9;
    pub const SHT_DYNSYM: Elf64Word = 11;
    pub const SHT_INIT_ARRAY: Elf64Word = 14;
    pub const SHT_FINI_ARRAY: Elf64Word = 15;

    /// Reads a section header from a buffer holding exactly one entry.
    pub fn read(shdr_buf: &[u8]) -> Self {
        Self {
            sh_name: le_u32(shdr_buf, 0),
            sh_type: le_u32(shdr_buf, 4),
            sh_flags: Elf64ShdrFlags::from_bits_truncate(le_u64(shdr_buf, 8)),
            sh_addr: le_u64(shdr_buf, 16),
            sh_offset: le_u64(shdr_buf, 24),
            sh_size: le_u64(shdr_buf, 32),
            sh_link: le_u32(shdr_buf, 40),
            sh_info: le_u32(shdr_buf, 44),
            sh_addralign: le_u64(shdr_buf, 48),
            sh_entsize: le_u64(shdr_buf, 56),
        }
    }

    /// Verifies that a section occupying file space lies within a file of
    /// `file_len` bytes. `SHT_NOBITS` sections are not checked.
    pub fn verify(&self, file_len: usize) -> Result<(), ElfError> {
        if self.sh_type != Self::SHT_NOBITS {
            self.file_range(file_len)?;
        }
        Ok(())
    }

    /// Returns the file range holding the section's contents. A
    /// `SHT_NOBITS` section has an empty range.
    pub fn file_range(&self, file_len: usize) -> Result<Elf64FileRange, ElfError> {
        let size = if self.sh_type == Self::SHT_NOBITS {
            0
        } else {
            self.sh_size
        };
        Elf64FileRange::checked(
            self.sh_offset,
            size,
            file_len,
            ElfError::InvalidSectionOffset,
            ElfError::InvalidSectionSize,
        )
    }

    /// Verifies a section holding an array of 8-byte function pointers
    /// against a memory image of `exec_size` bytes.
    pub fn verify_array(&self, exec_size: usize) -> Result<Elf64AddrRange, ElfError> {
        let begin = usize::try_from(self.sh_addr).map_err(|_| ElfError::InvalidSectionAddress)?;
        if begin > exec_size {
            return Err(ElfError::InvalidSectionAddress);
        }
        let size = usize::try_from(self.sh_size).map_err(|_| ElfError::InvalidSectionSize)?;
        if size > exec_size - begin || size % 8 != 0 {
            return Err(ElfError::InvalidSectionSize);
        }
        Ok(Elf64AddrRange {
            vaddr_begin: self.sh_addr,
            vaddr_end: self.sh_addr + self.sh_size,
        })
    }
}
