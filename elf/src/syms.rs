// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2026 The elf-linker Authors
//
// vim: ts=4 sw=4 et

use super::types::*;
use super::ElfError;

/// Represents an ELF64 symbol ([`Elf64Sym`]) within the symbol table.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Elf64Sym {
    /// Name of the symbol as an index into the string table
    pub st_name: Elf64Word,
    /// Symbol information and binding attributes
    pub st_info: Elf64char,
    /// Reserved for additional symbol attributes (unused)
    pub st_other: Elf64char,
    /// Section index associated with the symbol
    pub st_shndx: Elf64Half,
    /// Offset of the symbol inside the defining module's memory image, or
    /// 0 when the module only declares it
    pub st_value: Elf64Addr,
    /// Size of the symbol in bytes
    pub st_size: Elf64Xword,
}

impl Elf64Sym {
    pub const STB_GLOBAL: Elf64char = 1;
    pub const STT_FUNC: Elf64char = 2;

    /// Reads an [`Elf64Sym`] from a buffer holding exactly one entry.
    pub fn read(buf: &[u8]) -> Self {
        Self {
            st_name: le_u32(buf, 0),
            st_info: buf[4],
            st_other: buf[5],
            st_shndx: le_u16(buf, 6),
            st_value: le_u64(buf, 8),
            st_size: le_u64(buf, 16),
        }
    }

    /// Symbol binding, the upper nibble of `st_info`
    pub fn bind(&self) -> Elf64char {
        self.st_info >> 4
    }

    /// Symbol type, the lower nibble of `st_info`
    pub fn sym_type(&self) -> Elf64char {
        self.st_info & 0xf
    }

    /// Whether the symbol has a nonzero value, i.e. it can satisfy a lookup.
    pub fn is_defined(&self) -> bool {
        self.st_value != 0
    }
}

/// The dynamic symbol table ([`Elf64Symtab`]) of an ELF64 file.
#[derive(Debug, Default, Clone, Copy)]
pub struct Elf64Symtab<'a> {
    /// The underlying buffer containing the symbol table data
    syms_buf: &'a [u8],
    /// Number of symbols in the symbol table
    syms_num: usize,
}

impl<'a> Elf64Symtab<'a> {
    /// Indicates an undefined symbol
    pub const STN_UNDEF: Elf64Word = 0;

    /// Creates a symbol table view over `syms_buf`. Trailing bytes that do
    /// not form a whole entry are ignored.
    pub fn new(syms_buf: &'a [u8]) -> Self {
        Self {
            syms_buf,
            syms_num: syms_buf.len() / ELF64_SYM_SIZE,
        }
    }

    pub fn len(&self) -> usize {
        self.syms_num
    }

    pub fn is_empty(&self) -> bool {
        self.syms_num == 0
    }

    /// Reads the symbol at index `i`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::InvalidIndex`] if `i` is out of bounds.
    pub fn read_sym(&self, i: Elf64Word) -> Result<Elf64Sym, ElfError> {
        let i = usize::try_from(i).map_err(|_| ElfError::InvalidIndex)?;
        if i >= self.syms_num {
            return Err(ElfError::InvalidIndex);
        }
        let sym_off = i * ELF64_SYM_SIZE;
        Ok(Elf64Sym::read(
            &self.syms_buf[sym_off..sym_off + ELF64_SYM_SIZE],
        ))
    }

    /// Iterates all symbols in table order, including the null symbol.
    pub fn iter(&self) -> impl Iterator<Item = Elf64Sym> + 'a {
        self.syms_buf
            .chunks_exact(ELF64_SYM_SIZE)
            .map(Elf64Sym::read)
    }
}
