// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2026 The elf-linker Authors
//
// vim: ts=4 sw=4 et

use super::types::*;
use super::ElfError;

/// A name stored in an ELF string table, as pointer plus explicit length.
///
/// Names are never compared by scanning for a terminator: equality is
/// decided by length first and then byte by byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElfStr<'a> {
    bytes: &'a [u8],
}

impl<'a> ElfStr<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Compares the name with `other`.
    ///
    /// Names of different length, and empty names, never match. A NUL byte
    /// shared by both names before their declared end marks a truncated
    /// string and is reported as [`ElfError::InvalidString`] rather than
    /// treated as an early match.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use elf_linker::{ElfError, ElfStr};
    ///
    /// assert_eq!(ElfStr::new(b"foo").matches(b"foo"), Ok(true));
    /// assert_eq!(ElfStr::new(b"foo").matches(b"fo"), Ok(false));
    /// assert_eq!(ElfStr::new(b"f\0o").matches(b"f\0o"), Err(ElfError::InvalidString));
    /// ```
    pub fn matches(&self, other: &[u8]) -> Result<bool, ElfError> {
        if self.bytes.len() != other.len() || self.bytes.is_empty() {
            return Ok(false);
        }
        for (a, b) in self.bytes.iter().zip(other) {
            if a != b {
                return Ok(false);
            }
            if *a == 0 {
                return Err(ElfError::InvalidString);
            }
        }
        Ok(true)
    }
}

/// A string table section ([`Elf64Strtab`]) of an ELF64 file
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Elf64Strtab<'a> {
    strtab_buf: &'a [u8],
}

impl<'a> Elf64Strtab<'a> {
    /// Creates a new [`Elf64Strtab`] instance from the provided string table buffer
    pub fn new(strtab_buf: &'a [u8]) -> Self {
        Self { strtab_buf }
    }

    /// Retrieves the string starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::InvalidOffset`] if `offset` is not inside the table
    /// and [`ElfError::UnterminatedString`] if no NUL follows it before the
    /// end of the table.
    pub fn get_str(&self, offset: Elf64Word) -> Result<ElfStr<'a>, ElfError> {
        let offset = usize::try_from(offset).map_err(|_| ElfError::InvalidOffset)?;
        let tail = self
            .strtab_buf
            .get(offset..)
            .filter(|tail| !tail.is_empty())
            .ok_or(ElfError::InvalidOffset)?;
        let len = tail
            .iter()
            .position(|&c| c == 0)
            .ok_or(ElfError::UnterminatedString)?;
        Ok(ElfStr::new(&tail[..len]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elf64_strtab_get_str() {
        let strtab = Elf64Strtab::new(b"\0foo\0bar");

        assert_eq!(strtab.get_str(0).unwrap().as_bytes(), b"");
        assert_eq!(strtab.get_str(1).unwrap().as_bytes(), b"foo");
        assert_eq!(strtab.get_str(2).unwrap().as_bytes(), b"oo");
        assert_eq!(strtab.get_str(5), Err(ElfError::UnterminatedString));
        assert_eq!(strtab.get_str(8), Err(ElfError::InvalidOffset));
        assert_eq!(strtab.get_str(u32::MAX), Err(ElfError::InvalidOffset));
    }

    #[test]
    fn test_elf_str_matches() {
        let name = ElfStr::new(b"add_one");

        assert_eq!(name.matches(b"add_one"), Ok(true));
        assert_eq!(name.matches(b"add_two"), Ok(false));
        assert_eq!(name.matches(b"add_one\0"), Ok(false));
        assert_eq!(name.matches(b""), Ok(false));
        assert_eq!(ElfStr::new(b"").matches(b""), Ok(false));
    }

    #[test]
    fn test_elf_str_embedded_nul() {
        let name = ElfStr::new(b"ab\0d");

        assert_eq!(name.matches(b"ab\0d"), Err(ElfError::InvalidString));
        // A difference before the NUL decides the comparison first.
        assert_eq!(name.matches(b"xb\0d"), Ok(false));
    }
}
