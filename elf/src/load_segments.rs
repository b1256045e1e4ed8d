// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2026 The elf-linker Authors
//
// vim: ts=4 sw=4 et

use super::types::*;
use super::Elf64AddrRange;
use super::Elf64FileRange;
use super::Elf64Phdr;
use super::Elf64PhdrFlags;

use core::slice;

/// Represents an ELF64 image load segment
#[derive(Debug)]
pub struct Elf64ImageLoadSegment<'a> {
    /// The range of the memory image covered by this segment
    pub vaddr_range: Elf64AddrRange,
    /// The range in the ELF file covering this segment
    pub file_range: Elf64FileRange,
    /// The contents of the segment in the ELF file
    pub file_contents: &'a [u8],
    /// Flags associated with this segment
    pub flags: Elf64PhdrFlags,
}

/// An iterator over the `PT_LOAD` segments of a validated ELF file
#[derive(Debug)]
pub struct Elf64ImageLoadSegmentIterator<'a> {
    file: &'a [u8],
    phdrs: slice::ChunksExact<'a, u8>,
}

impl<'a> Elf64ImageLoadSegmentIterator<'a> {
    pub(crate) fn new(file: &'a [u8], phdrs_buf: &'a [u8]) -> Self {
        Self {
            file,
            phdrs: phdrs_buf.chunks_exact(ELF64_PHDR_SIZE),
        }
    }
}

impl<'a> Iterator for Elf64ImageLoadSegmentIterator<'a> {
    type Item = Elf64ImageLoadSegment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let phdr = Elf64Phdr::read(self.phdrs.next()?);
            if phdr.p_type != Elf64Phdr::PT_LOAD {
                continue;
            }
            // Both ranges were checked when the file was validated.
            let (Ok(vaddr_range), Ok(file_range)) =
                (phdr.vaddr_range(), phdr.file_range(self.file.len()))
            else {
                continue;
            };
            return Some(Elf64ImageLoadSegment {
                vaddr_range,
                file_range,
                file_contents: &self.file[file_range.offset_begin..file_range.offset_end],
                flags: phdr.p_flags,
            });
        }
    }
}

/// The function pointer arrays an extension may carry, located by section
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfArrayKind {
    Ctors,
    Dtors,
    InitArray,
    FiniArray,
}

impl ElfArrayKind {
    pub const ALL: [Self; 4] = [Self::Ctors, Self::Dtors, Self::InitArray, Self::FiniArray];

    /// The section name the array is stored under
    pub fn section_name(self) -> &'static [u8] {
        match self {
            Self::Ctors => b".ctors",
            Self::Dtors => b".dtors",
            Self::InitArray => b".init_array",
            Self::FiniArray => b".fini_array",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Ctors => 0,
            Self::Dtors => 1,
            Self::InitArray => 2,
            Self::FiniArray => 3,
        }
    }
}

/// Location of one function pointer array inside a loaded module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elf64ArrayInfo {
    /// Address of the first entry
    pub addr: Elf64Addr,
    /// Size of the array in bytes, a multiple of 8
    pub size: usize,
}

impl Elf64ArrayInfo {
    /// Number of function pointers in the array
    pub fn count(&self) -> usize {
        self.size / 8
    }
}

/// Locations of a loaded module's constructor and destructor arrays, for
/// the code that runs them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Elf64SectionInfo {
    pub ctors: Option<Elf64ArrayInfo>,
    pub dtors: Option<Elf64ArrayInfo>,
    pub init_array: Option<Elf64ArrayInfo>,
    pub fini_array: Option<Elf64ArrayInfo>,
}

impl Elf64SectionInfo {
    pub fn get(&self, kind: ElfArrayKind) -> Option<Elf64ArrayInfo> {
        match kind {
            ElfArrayKind::Ctors => self.ctors,
            ElfArrayKind::Dtors => self.dtors,
            ElfArrayKind::InitArray => self.init_array,
            ElfArrayKind::FiniArray => self.fini_array,
        }
    }
}
