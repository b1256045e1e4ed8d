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
    /// Access permissions requested for a segment
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Elf64PhdrFlags : Elf64Word {
        const EXECUTE = 0x01;
        const WRITE   = 0x02;
        const READ    = 0x04;
    }
}

/// Program header entry in an ELF64 file
#[derive(Debug, Clone, Copy)]
pub struct Elf64Phdr {
    /// Type of the program header entry
    pub p_type: Elf64Word,
    /// Flags specifying the attributes of the segment
    pub p_flags: Elf64PhdrFlags,
    /// Offset in the ELF file where the segment data begins
    pub p_offset: Elf64Off,
    /// Offset of the segment inside the module's memory image
    pub p_vaddr: Elf64Addr,
    /// Physical address, unused for extension modules
    pub p_paddr: Elf64Addr,
    /// Size of the segment in the ELF file (may be smaller than `p_memsz`)
    pub p_filesz: Elf64Xword,
    /// Size of the segment in memory
    pub p_memsz: Elf64Xword,
    /// Alignment of the segment in memory and in the file
    pub p_align: Elf64Xword,
}

impl Elf64Phdr {
    /// Represents a null program header type
    pub const PT_NULL: Elf64Word = 0;
    /// Represents a loadable segment program header type
    pub const PT_LOAD: Elf64Word = 1;

    /// Reads a program header from a buffer holding exactly one entry.
    pub fn read(phdr_buf: &[u8]) -> Self {
        Self {
            p_type: le_u32(phdr_buf, 0),
            p_flags: Elf64PhdrFlags::from_bits_truncate(le_u32(phdr_buf, 4)),
            p_offset: le_u64(phdr_buf, 8),
            p_vaddr: le_u64(phdr_buf, 16),
            p_paddr: le_u64(phdr_buf, 24),
            p_filesz: le_u64(phdr_buf, 32),
            p_memsz: le_u64(phdr_buf, 40),
            p_align: le_u64(phdr_buf, 48),
        }
    }

    /// Verifies the program header against a file of `file_len` bytes.
    ///
    /// The on-disk part of every segment must lie within the file and may
    /// not be larger than the segment's memory size. Loadable segments must
    /// additionally describe a memory range that does not overflow.
    pub fn verify(&self, file_len: usize) -> Result<(), ElfError> {
        self.file_range(file_len)?;

        if self.p_filesz > self.p_memsz {
            return Err(ElfError::InvalidSegmentMemSize);
        }

        if self.p_type == Self::PT_LOAD {
            self.vaddr_range()?;
        }

        Ok(())
    }

    /// Returns the range of the file holding the segment's initialized data.
    pub fn file_range(&self, file_len: usize) -> Result<Elf64FileRange, ElfError> {
        Elf64FileRange::checked(
            self.p_offset,
            self.p_filesz,
            file_len,
            ElfError::InvalidSegmentOffset,
            ElfError::InvalidSegmentFileSize,
        )
    }

    /// Returns the range of the memory image covered by the segment.
    pub fn vaddr_range(&self) -> Result<Elf64AddrRange, ElfError> {
        Elf64AddrRange::try_from((self.p_vaddr, self.p_memsz))
    }
}
