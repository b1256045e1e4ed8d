// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2026 The elf-linker Authors
//
// vim: ts=4 sw=4 et

use super::types::*;
use super::ElfError;

/// Header of an ELF64 extension module. Only little-endian x86-64 shared
/// objects with the standard structure sizes are accepted.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Elf64Hdr {
    /// ELF identification bytes, including the magic number
    pub e_ident: [Elf64char; 16],
    /// The type of ELF file
    pub e_type: Elf64Half,
    /// The target architecture of the ELF file
    pub e_machine: Elf64Half,
    /// The version of the ELF file
    pub e_version: Elf64Word,
    /// Entry point, relative to the start of the memory image
    pub e_entry: Elf64Addr,
    /// The file offset to the start of the program header table
    pub e_phoff: Elf64Off,
    /// The file offset to the start of the section header table
    pub e_shoff: Elf64Off,
    /// Processor-specific flags associated with the file
    pub e_flags: Elf64Word,
    /// The size of the ELF header
    pub e_ehsize: Elf64Half,
    /// The size of a program header entry
    pub e_phentsize: Elf64Half,
    /// The number of program header entries
    pub e_phnum: Elf64Half,
    /// The size of a section header entry
    pub e_shentsize: Elf64Half,
    /// The number of section header entries
    pub e_shnum: Elf64Half,
    /// The section header table index of the section name string table
    pub e_shstrndx: Elf64Half,
}

impl Elf64Hdr {
    const EI_MAG0: usize = 0;
    const EI_MAG1: usize = 1;
    const EI_MAG2: usize = 2;
    const EI_MAG3: usize = 3;
    const EI_CLASS: usize = 4;
    const EI_DATA: usize = 5;
    const EI_VERSION: usize = 6;
    const EI_OSABI: usize = 7;
    const EI_ABIVERSION: usize = 8;

    const ELFMAG: [Elf64char; 4] = [0x7f, b'E', b'L', b'F'];

    const ELFCLASS64: Elf64char = 2;

    const ELFDATA2LSB: Elf64char = 1;

    const ELFOSABI_SYSV: Elf64char = 0;

    const ET_DYN: Elf64Half = 3;

    const EM_X86_64: Elf64Half = 62;

    const EV_CURRENT: Elf64Word = 1;

    /// Reads and validates the ELF64 header at the start of `buf`.
    ///
    /// Besides the identification and type checks, the entry point and both
    /// header table offsets must lie strictly inside the file, and the three
    /// structure sizes must match the ELF64 layouts exactly.
    ///
    /// # Errors
    ///
    /// Every rejected field maps to its own [`ElfError`] kind, checked in
    /// file order: [`ElfError::FileTooShort`], the four magic bytes, class,
    /// data encoding, identification version, OS ABI, ABI version, type,
    /// machine, version, entry, table offsets, flags and structure sizes.
    pub fn read(buf: &[u8]) -> Result<Self, ElfError> {
        if buf.len() < ELF64_EHDR_SIZE {
            return Err(ElfError::FileTooShort);
        }

        let mut e_ident = [0; 16];
        e_ident.copy_from_slice(&buf[..16]);
        if e_ident[Self::EI_MAG0] != Self::ELFMAG[0] {
            return Err(ElfError::InvalidMagic0);
        } else if e_ident[Self::EI_MAG1] != Self::ELFMAG[1] {
            return Err(ElfError::InvalidMagic1);
        } else if e_ident[Self::EI_MAG2] != Self::ELFMAG[2] {
            return Err(ElfError::InvalidMagic2);
        } else if e_ident[Self::EI_MAG3] != Self::ELFMAG[3] {
            return Err(ElfError::InvalidMagic3);
        } else if e_ident[Self::EI_CLASS] != Self::ELFCLASS64 {
            return Err(ElfError::UnsupportedClass);
        } else if e_ident[Self::EI_DATA] != Self::ELFDATA2LSB {
            return Err(ElfError::UnsupportedEndianess);
        } else if Elf64Word::from(e_ident[Self::EI_VERSION]) != Self::EV_CURRENT {
            return Err(ElfError::UnsupportedIdentVersion);
        } else if e_ident[Self::EI_OSABI] != Self::ELFOSABI_SYSV {
            return Err(ElfError::UnsupportedOsAbi);
        } else if e_ident[Self::EI_ABIVERSION] != 0 {
            return Err(ElfError::UnsupportedAbiVersion);
        }

        let hdr = Self {
            e_ident,
            e_type: le_u16(buf, 16),
            e_machine: le_u16(buf, 18),
            e_version: le_u32(buf, 20),
            e_entry: le_u64(buf, 24),
            e_phoff: le_u64(buf, 32),
            e_shoff: le_u64(buf, 40),
            e_flags: le_u32(buf, 48),
            e_ehsize: le_u16(buf, 52),
            e_phentsize: le_u16(buf, 54),
            e_phnum: le_u16(buf, 56),
            e_shentsize: le_u16(buf, 58),
            e_shnum: le_u16(buf, 60),
            e_shstrndx: le_u16(buf, 62),
        };
        hdr.verify(buf.len())?;

        Ok(hdr)
    }

    fn verify(&self, file_len: usize) -> Result<(), ElfError> {
        if self.e_type != Self::ET_DYN {
            return Err(ElfError::UnsupportedType);
        }
        if self.e_machine != Self::EM_X86_64 {
            return Err(ElfError::UnsupportedMachine);
        }
        if self.e_version != Self::EV_CURRENT {
            return Err(ElfError::UnsupportedVersion);
        }

        // Offset 0 is as invalid as anything at or past the end of the file.
        let inside = |off: Elf64Off| off != 0 && usize::try_from(off).is_ok_and(|o| o < file_len);
        if !inside(self.e_entry) {
            return Err(ElfError::InvalidEntry);
        }
        if !inside(self.e_phoff) {
            return Err(ElfError::InvalidPhdrOffset);
        }
        if !inside(self.e_shoff) {
            return Err(ElfError::InvalidShdrOffset);
        }

        if self.e_flags != 0 {
            return Err(ElfError::UnsupportedFlags);
        }
        if usize::from(self.e_ehsize) != ELF64_EHDR_SIZE {
            return Err(ElfError::InvalidEhdrSize);
        }
        if usize::from(self.e_phentsize) != ELF64_PHDR_SIZE {
            return Err(ElfError::InvalidPhdrSize);
        }
        if usize::from(self.e_shentsize) != ELF64_SHDR_SIZE {
            return Err(ElfError::InvalidShdrSize);
        }

        Ok(())
    }
}
