// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2026 The elf-linker Authors
//
// vim: ts=4 sw=4 et

pub type Elf64Addr = u64;
pub type Elf64Off = u64;
pub type Elf64Half = u16;
pub type Elf64Word = u32;
pub type Elf64Sword = i32;
pub type Elf64Xword = u64;
pub type Elf64Sxword = i64;
pub type Elf64char = u8;

/// On-disk size of the ELF64 file header
pub const ELF64_EHDR_SIZE: usize = 64;
/// On-disk size of one ELF64 program header
pub const ELF64_PHDR_SIZE: usize = 56;
/// On-disk size of one ELF64 section header
pub const ELF64_SHDR_SIZE: usize = 64;
/// On-disk size of one ELF64 symbol table entry
pub const ELF64_SYM_SIZE: usize = 24;
/// On-disk size of one ELF64 `Rel` entry
pub const ELF64_REL_SIZE: usize = 16;
/// On-disk size of one ELF64 `Rela` entry
pub const ELF64_RELA_SIZE: usize = 24;

// Field accessors for little-endian on-disk structures. Callers slice the
// input to the exact structure size first, so the field offsets are always
// in bounds.

pub(crate) fn le_u16(buf: &[u8], off: usize) -> Elf64Half {
    let mut bytes = [0u8; 2];
    bytes.copy_from_slice(&buf[off..off + 2]);
    Elf64Half::from_le_bytes(bytes)
}

pub(crate) fn le_u32(buf: &[u8], off: usize) -> Elf64Word {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[off..off + 4]);
    Elf64Word::from_le_bytes(bytes)
}

pub(crate) fn le_u64(buf: &[u8], off: usize) -> Elf64Xword {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[off..off + 8]);
    Elf64Xword::from_le_bytes(bytes)
}

pub(crate) fn le_i64(buf: &[u8], off: usize) -> Elf64Sxword {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[off..off + 8]);
    Elf64Sxword::from_le_bytes(bytes)
}
