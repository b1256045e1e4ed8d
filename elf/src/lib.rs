// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2026 The elf-linker Authors
//
// vim: ts=4 sw=4 et

//! Loader and linker for ELF64 hypervisor extension modules.
//!
//! Extensions are x86-64 shared objects. Each raw image is validated into an
//! [`ElfFile`], copied into a caller-provided memory image with
//! [`ElfFile::load`], registered with an [`ElfLoader`] group and finally
//! linked with [`ElfLoader::relocate`]. Nothing in this crate allocates: all
//! file and image memory is borrowed from the caller.

#![no_std]

#[cfg(test)]
extern crate alloc;

mod addr_range;
mod error;
mod file;
mod file_range;
mod hash;
mod header;
mod load_segments;
mod loader;
mod program_header;
mod relocation;
mod section_header;
mod strtab;
mod syms;
mod types;

#[cfg(test)]
mod test_image;

pub use addr_range::Elf64AddrRange;
pub use error::ElfError;
pub use file::ElfFile;
pub use file_range::Elf64FileRange;
pub use hash::{elf_hash, Elf64Hash, Elf64HashChain};
pub use load_segments::{
    Elf64ArrayInfo, Elf64ImageLoadSegment, Elf64ImageLoadSegmentIterator, Elf64SectionInfo,
    ElfArrayKind,
};
pub use loader::{ElfLoader, ModuleId};
pub use program_header::{Elf64Phdr, Elf64PhdrFlags};
pub use relocation::{
    Elf64Rel, Elf64Rela, Elf64Relas, Elf64RelocOp, Elf64RelocProcessor, Elf64Rels,
    Elf64X86RelocProcessor,
};
pub use section_header::{Elf64Shdr, Elf64ShdrFlags};
pub use strtab::{Elf64Strtab, ElfStr};
pub use syms::{Elf64Sym, Elf64Symtab};
pub use types::*;

/// Maximum number of modules in one [`ElfLoader`] group
pub const MAX_MODULES: usize = 25;

/// Maximum number of `SHT_REL` sections, and separately of `SHT_RELA`
/// sections, in one module
pub const MAX_RELOC_TABLES: usize = 3;
