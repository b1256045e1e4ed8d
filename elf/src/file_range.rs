// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2026 The elf-linker Authors
//
// vim: ts=4 sw=4 et

use super::types::*;
use super::ElfError;

/// A byte range `[offset_begin, offset_end)` inside the raw ELF file.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elf64FileRange {
    pub offset_begin: usize,
    pub offset_end: usize,
}

impl Elf64FileRange {
    /// Builds the range for an `(offset, size)` pair taken from the file and
    /// checks that it lies within the first `file_len` bytes.
    ///
    /// An offset past the end of the file is reported as `offset_err`; an
    /// offset that is in bounds but followed by too few bytes is reported as
    /// `size_err`.
    pub fn checked(
        offset: Elf64Off,
        size: Elf64Xword,
        file_len: usize,
        offset_err: ElfError,
        size_err: ElfError,
    ) -> Result<Self, ElfError> {
        let offset_begin = usize::try_from(offset).map_err(|_| offset_err)?;
        if offset_begin > file_len {
            return Err(offset_err);
        }
        let size = usize::try_from(size).map_err(|_| size_err)?;
        if size > file_len - offset_begin {
            return Err(size_err);
        }
        Ok(Self {
            offset_begin,
            offset_end: offset_begin + size,
        })
    }

    pub fn len(&self) -> usize {
        self.offset_end - self.offset_begin
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
