// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2026 The elf-linker Authors
//
// vim: ts=4 sw=4 et

use super::types::*;
use super::ElfError;

/// A relocation entry with an implicit addend ([`Elf64Rel`])
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elf64Rel {
    /// Offset inside the memory image where the relocation is applied
    pub r_offset: Elf64Addr,
    /// A combination of symbol index and relocation type information
    pub r_info: Elf64Xword,
}

impl Elf64Rel {
    /// Extracts the symbol index from the `r_info` field
    pub fn sym(&self) -> Elf64Word {
        (self.r_info >> 32) as Elf64Word
    }

    /// Extracts the relocation type from the `r_info` field
    pub fn r_type(&self) -> Elf64Word {
        (self.r_info & 0xffff_ffff) as Elf64Word
    }

    pub fn read(rel_buf: &[u8]) -> Self {
        Self {
            r_offset: le_u64(rel_buf, 0),
            r_info: le_u64(rel_buf, 8),
        }
    }
}

/// A relocation entry with an explicit addend ([`Elf64Rela`])
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elf64Rela {
    /// Offset inside the memory image where the relocation is applied
    pub r_offset: Elf64Addr,
    /// A combination of symbol index and relocation type information
    pub r_info: Elf64Xword,
    /// The value to add to the target symbol's value during relocation
    pub r_addend: Elf64Sxword,
}

impl Elf64Rela {
    /// Extracts the symbol index from the `r_info` field
    pub fn sym(&self) -> Elf64Word {
        (self.r_info >> 32) as Elf64Word
    }

    /// Extracts the relocation type from the `r_info` field
    pub fn r_type(&self) -> Elf64Word {
        (self.r_info & 0xffff_ffff) as Elf64Word
    }

    pub fn read(rela_buf: &[u8]) -> Self {
        Self {
            r_offset: le_u64(rela_buf, 0),
            r_info: le_u64(rela_buf, 8),
            r_addend: le_i64(rela_buf, 16),
        }
    }
}

/// The contents of one `SHT_REL` section
#[derive(Debug, Clone, Copy)]
pub struct Elf64Rels<'a> {
    rels_buf: &'a [u8],
}

impl<'a> Elf64Rels<'a> {
    pub fn new(rels_buf: &'a [u8]) -> Self {
        Self { rels_buf }
    }

    pub fn len(&self) -> usize {
        self.rels_buf.len() / ELF64_REL_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Elf64Rel> + 'a {
        self.rels_buf
            .chunks_exact(ELF64_REL_SIZE)
            .map(Elf64Rel::read)
    }
}

/// The contents of one `SHT_RELA` section
#[derive(Debug, Clone, Copy)]
pub struct Elf64Relas<'a> {
    relas_buf: &'a [u8],
}

impl<'a> Elf64Relas<'a> {
    pub fn new(relas_buf: &'a [u8]) -> Self {
        Self { relas_buf }
    }

    pub fn len(&self) -> usize {
        self.relas_buf.len() / ELF64_RELA_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Elf64Rela> + 'a {
        self.relas_buf
            .chunks_exact(ELF64_RELA_SIZE)
            .map(Elf64Rela::read)
    }
}

/// A relocation ready to be written into a module's memory image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elf64RelocOp {
    /// Offset of the 8-byte destination inside the memory image
    pub dst: usize,
    /// The value to be written to the destination
    pub value: Elf64Addr,
}

/// Computes relocation values for one machine.
///
/// Symbol lookup and destination bounds checks happen before the processor
/// is consulted; it only maps a relocation type to the value to store.
pub trait Elf64RelocProcessor {
    /// Whether a `RELA` relocation of type `r_type` refers to a symbol. Types
    /// that do not are applied without any symbol lookup.
    fn uses_symbol(&self, r_type: Elf64Word) -> bool;

    /// Computes the value for a `REL` relocation against a symbol resolved
    /// to `sym_addr`.
    fn apply_rel(&self, rel: &Elf64Rel, sym_addr: Elf64Addr) -> Result<Elf64Addr, ElfError>;

    /// Computes the value for a `RELA` relocation. `load_base` is the
    /// address of the relocated module's memory image; `sym_addr` is 0 for
    /// types that do not refer to a symbol.
    fn apply_rela(
        &self,
        rela: &Elf64Rela,
        load_base: Elf64Addr,
        sym_addr: Elf64Addr,
    ) -> Result<Elf64Addr, ElfError>;
}

/// Relocation processor for x86-64 extension modules.
#[derive(Clone, Copy, Debug, Default)]
pub struct Elf64X86RelocProcessor;

impl Elf64X86RelocProcessor {
    /// Relocation type value for a 64-bit absolute relocation
    pub const R_X86_64_64: Elf64Word = 1;
    /// Relocation type value for a GOT entry
    pub const R_X86_64_GLOB_DAT: Elf64Word = 6;
    /// Relocation type value for a PLT slot
    pub const R_X86_64_JUMP_SLOT: Elf64Word = 7;
    /// Relocation type value for a relative relocation
    pub const R_X86_64_RELATIVE: Elf64Word = 8;

    pub fn new() -> Self {
        Self
    }
}

impl Elf64RelocProcessor for Elf64X86RelocProcessor {
    fn uses_symbol(&self, r_type: Elf64Word) -> bool {
        r_type != Self::R_X86_64_RELATIVE
    }

    fn apply_rel(&self, rel: &Elf64Rel, sym_addr: Elf64Addr) -> Result<Elf64Addr, ElfError> {
        match rel.r_type() {
            Self::R_X86_64_GLOB_DAT | Self::R_X86_64_JUMP_SLOT => Ok(sym_addr),
            _ => Err(ElfError::InvalidRelocationType),
        }
    }

    fn apply_rela(
        &self,
        rela: &Elf64Rela,
        load_base: Elf64Addr,
        sym_addr: Elf64Addr,
    ) -> Result<Elf64Addr, ElfError> {
        // Use two's complement arithmethic for the addend.
        let a = rela.r_addend as u64;
        match rela.r_type() {
            Self::R_X86_64_64 => Ok(sym_addr.wrapping_add(a)),
            Self::R_X86_64_GLOB_DAT | Self::R_X86_64_JUMP_SLOT => Ok(sym_addr),
            Self::R_X86_64_RELATIVE => Ok(load_base.wrapping_add(a)),
            _ => Err(ElfError::InvalidRelocationType),
        }
    }
}
