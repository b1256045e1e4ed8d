// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2026 The elf-linker Authors
//
// vim: ts=4 sw=4 et

use super::types::*;
use super::ElfError;

/// Computes the System V ELF hash of a symbol name.
///
/// # Examples
///
/// ```rust
/// use elf_linker::elf_hash;
///
/// assert_eq!(elf_hash(b""), 0);
/// assert_eq!(elf_hash(b"printf"), 0x077905a6);
/// ```
pub fn elf_hash(name: &[u8]) -> Elf64Word {
    let mut h: Elf64Word = 0;
    for &c in name {
        h = (h << 4).wrapping_add(Elf64Word::from(c));
        let g = h & 0xf000_0000;
        if g != 0 {
            h ^= g >> 24;
        }
        h &= !g;
    }
    h
}

/// A validated `SHT_HASH` section.
///
/// The section is a sequence of 4-byte words: `nbucket`, `nchain`, the
/// bucket array and then the chain array, one chain entry per symbol.
#[derive(Debug, Clone, Copy)]
pub struct Elf64Hash<'a> {
    hash_buf: &'a [u8],
    nbucket: usize,
    nchain: usize,
}

impl<'a> Elf64Hash<'a> {
    /// Validates the hash section contents against a symbol table with
    /// `syms_num` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::InvalidHashTable`] if the table has no buckets,
    /// does not have exactly one chain entry per symbol, is too short for
    /// the counts in its header, or holds a bucket or chain entry that is
    /// not a symbol index.
    pub fn new(hash_buf: &'a [u8], syms_num: usize) -> Result<Self, ElfError> {
        if hash_buf.len() < 8 {
            return Err(ElfError::InvalidHashTable);
        }
        let nbucket =
            usize::try_from(le_u32(hash_buf, 0)).map_err(|_| ElfError::InvalidHashTable)?;
        let nchain =
            usize::try_from(le_u32(hash_buf, 4)).map_err(|_| ElfError::InvalidHashTable)?;
        if nbucket == 0 || nchain != syms_num {
            return Err(ElfError::InvalidHashTable);
        }
        let nwords = nbucket
            .checked_add(nchain)
            .and_then(|n| n.checked_add(2))
            .ok_or(ElfError::InvalidHashTable)?;
        if nwords.checked_mul(4).is_none_or(|needed| needed > hash_buf.len()) {
            return Err(ElfError::InvalidHashTable);
        }
        let hash = Self {
            hash_buf,
            nbucket,
            nchain,
        };
        if (2..nwords).any(|i| hash.word(i) as usize >= nchain) {
            return Err(ElfError::InvalidHashTable);
        }
        Ok(hash)
    }

    fn word(&self, i: usize) -> Elf64Word {
        le_u32(self.hash_buf, 4 * i)
    }

    /// Returns the indices of all symbols that may be named `name`, in chain
    /// order. The caller still has to compare the names.
    pub fn candidates(&self, name: &[u8]) -> Elf64HashChain<'a> {
        let bucket = elf_hash(name) as usize % self.nbucket;
        Elf64HashChain {
            hash: *self,
            next: self.word(2 + bucket),
            steps: 0,
        }
    }
}

/// Iterator over one hash chain.
///
/// A chain in untrusted input may be cyclic, so the walk gives up after
/// `nchain` steps.
#[derive(Debug)]
pub struct Elf64HashChain<'a> {
    hash: Elf64Hash<'a>,
    next: Elf64Word,
    steps: usize,
}

impl Iterator for Elf64HashChain<'_> {
    type Item = Elf64Word;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next;
        if cur == 0 || self.steps >= self.hash.nchain {
            return None;
        }
        self.steps += 1;

        let idx = cur as usize;
        self.next = if idx < self.hash.nchain {
            self.hash.word(2 + self.hash.nbucket + idx)
        } else {
            0
        };
        Some(cur)
    }
}
