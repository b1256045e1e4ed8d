// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2026 The elf-linker Authors
//
// vim: ts=4 sw=4 et

use super::types::*;
use super::ElfError;

/// A range of addresses relative to the start of a module's memory image.
///
/// In mathematical notation, the range is [vaddr_begin, vaddr_end)
#[derive(PartialEq, Eq, Debug, Default, Clone, Copy)]
pub struct Elf64AddrRange {
    pub vaddr_begin: Elf64Addr,
    pub vaddr_end: Elf64Addr,
}

impl Elf64AddrRange {
    /// Returns the length of the range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use elf_linker::Elf64AddrRange;
    ///
    /// let range = Elf64AddrRange {
    ///     vaddr_begin: 0x1000,
    ///     vaddr_end: 0x1100,
    /// };
    ///
    /// assert_eq!(range.len(), 0x100);
    /// ```
    pub fn len(&self) -> Elf64Xword {
        self.vaddr_end - self.vaddr_begin
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the whole range lies inside a memory image of `size` bytes.
    pub fn fits_in(&self, size: usize) -> bool {
        usize::try_from(self.vaddr_end).is_ok_and(|end| end <= size)
    }

    /// Converts the range into indices of a memory image slice. Only
    /// meaningful after [`Self::fits_in`] succeeded for that image.
    pub fn as_usize_range(&self) -> core::ops::Range<usize> {
        // Both ends fit in usize once fits_in() held.
        (self.vaddr_begin as usize)..(self.vaddr_end as usize)
    }
}

impl TryFrom<(Elf64Addr, Elf64Xword)> for Elf64AddrRange {
    type Error = ElfError;

    /// Tries to create an [`Elf64AddrRange`] from a `(vaddr, size)` tuple.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::InvalidSegmentMemSize`] if the end of the range
    /// overflows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use elf_linker::Elf64AddrRange;
    ///
    /// let range = Elf64AddrRange::try_from((0x1000, 0x100)).unwrap();
    ///
    /// assert_eq!(range.vaddr_begin, 0x1000);
    /// assert_eq!(range.vaddr_end, 0x1100);
    /// assert!(Elf64AddrRange::try_from((u64::MAX, 2)).is_err());
    /// ```
    fn try_from(value: (Elf64Addr, Elf64Xword)) -> Result<Self, Self::Error> {
        let vaddr_begin = value.0;
        let size = value.1;
        let vaddr_end = vaddr_begin
            .checked_add(size)
            .ok_or(ElfError::InvalidSegmentMemSize)?;
        Ok(Self {
            vaddr_begin,
            vaddr_end,
        })
    }
}
