// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2026 The elf-linker Authors
//
// vim: ts=4 sw=4 et

//! Builder for small, well-formed ELF64 extension images.
//!
//! Every image starts with the same fixed layout, so relocation targets can
//! be named before the image is built:
//!
//! | offset      | contents                                  |
//! |-------------|-------------------------------------------|
//! | 0           | ELF header                                |
//! | 64          | two program headers                       |
//! | [`TEXT`]    | 16 bytes of code, the entry point         |
//! | [`DATA`]    | 64 zero bytes, for relocation targets     |
//! | [`PAYLOAD`] | 16 bytes of 0xaa, the optional 2nd segment |
//! | [`ARRAYS`]  | function pointer arrays, then the tables  |
//!
//! The first segment maps the whole file at address 0, so file offsets and
//! image offsets coincide.

use crate::types::*;
use crate::{Elf64Shdr, Elf64Sym};
use alloc::vec;
use alloc::vec::Vec;

pub const TEXT: u64 = 176;
pub const DATA: u64 = 192;
pub const PAYLOAD: u64 = 256;
pub const ARRAYS: u64 = 272;

const NBUCKET: usize = 3;

const REL_NAMES: [&[u8]; 4] = [b".rel.dyn", b".rel.plt", b".rel.got", b".rel.data"];
const RELA_NAMES: [&[u8]; 4] = [b".rela.dyn", b".rela.plt", b".rela.got", b".rela.data"];

#[derive(Debug, Clone, Copy)]
struct TestRel {
    offset: u64,
    sym: u32,
    r_type: u32,
    addend: i64,
}

#[derive(Debug, Default)]
pub struct ImageBuilder {
    syms: Vec<(&'static [u8], u64)>,
    rel_tables: Vec<Vec<TestRel>>,
    rela_tables: Vec<Vec<TestRel>>,
    arrays: Vec<(&'static [u8], Vec<u64>)>,
    hash: bool,
    bss: u64,
    extra_segment: bool,
}

#[derive(Debug)]
struct Section {
    name: &'static [u8],
    sh_type: Elf64Word,
    flags: u64,
    addr: u64,
    offset: u64,
    size: u64,
    link: u32,
    entsize: u64,
}

/// A built image plus what the tests need to find and patch its fields.
#[derive(Debug)]
pub struct TestImage {
    pub bytes: Vec<u8>,
    pub exec_size: usize,
    pub shoff: usize,
    pub dynsym: usize,
    pub hash: Option<usize>,
    names: Vec<&'static [u8]>,
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a dynamic symbol. The first symbol gets index 1.
    pub fn sym(mut self, name: &'static [u8], value: u64) -> Self {
        self.syms.push((name, value));
        self
    }

    pub fn rel(mut self, table: usize, offset: u64, sym: u32, r_type: u32) -> Self {
        if self.rel_tables.len() <= table {
            self.rel_tables.resize(table + 1, Vec::new());
        }
        self.rel_tables[table].push(TestRel {
            offset,
            sym,
            r_type,
            addend: 0,
        });
        self
    }

    pub fn rela(mut self, table: usize, offset: u64, sym: u32, r_type: u32, addend: i64) -> Self {
        if self.rela_tables.len() <= table {
            self.rela_tables.resize(table + 1, Vec::new());
        }
        self.rela_tables[table].push(TestRel {
            offset,
            sym,
            r_type,
            addend,
        });
        self
    }

    /// Adds a named array section of 8-byte entries, placed consecutively
    /// from [`ARRAYS`] on.
    pub fn array(mut self, name: &'static [u8], entries: &[u64]) -> Self {
        self.arrays.push((name, entries.to_vec()));
        self
    }

    pub fn hash(mut self) -> Self {
        self.hash = true;
        self
    }

    /// Extends the first segment by `size` zero bytes past the end of the
    /// file.
    pub fn bss(mut self, size: u64) -> Self {
        self.bss = size;
        self
    }

    /// Maps the 16 payload bytes a second time into a 32 byte segment placed
    /// after the first one.
    pub fn extra_segment(mut self) -> Self {
        self.extra_segment = true;
        self
    }

    pub fn build(&self) -> TestImage {
        let mut secs: Vec<Section> = Vec::new();
        let mut off = ARRAYS as usize;

        let mut array_secs = Vec::new();
        for &(name, ref entries) in &self.arrays {
            let sh_type = match name {
                b".init_array" => Elf64Shdr::SHT_INIT_ARRAY,
                b".fini_array" => Elf64Shdr::SHT_FINI_ARRAY,
                _ => Elf64Shdr::SHT_PROGBITS,
            };
            let size = 8 * entries.len();
            array_secs.push(Section {
                name,
                sh_type,
                flags: 0x3,
                addr: off as u64,
                offset: off as u64,
                size: size as u64,
                link: 0,
                entsize: 8,
            });
            off += size;
        }

        let nsyms = self.syms.len() + 1;
        let dynsym = off;
        off += ELF64_SYM_SIZE * nsyms;
        let dynstr = off;
        let mut strtab = vec![0u8];
        let mut name_offs = Vec::new();
        for (name, _) in &self.syms {
            name_offs.push(strtab.len() as u32);
            strtab.extend_from_slice(name);
            strtab.push(0);
        }
        off = align8(off + strtab.len());

        let hash = self.hash.then(|| {
            let h = off;
            off = align8(off + 4 * (2 + NBUCKET + nsyms));
            h
        });

        let mut rel_offs = Vec::new();
        for table in &self.rel_tables {
            rel_offs.push(off);
            off += ELF64_REL_SIZE * table.len();
        }
        let mut rela_offs = Vec::new();
        for table in &self.rela_tables {
            rela_offs.push(off);
            off += ELF64_RELA_SIZE * table.len();
        }

        secs.push(Section::new(b"", 0, 0, 0));
        secs.push(Section {
            flags: 0x6,
            addr: TEXT,
            ..Section::new(b".text", Elf64Shdr::SHT_PROGBITS, TEXT, 16)
        });
        secs.push(Section {
            flags: 0x3,
            addr: DATA,
            ..Section::new(b".data", Elf64Shdr::SHT_PROGBITS, DATA, 64)
        });
        secs.push(Section {
            link: 4,
            entsize: ELF64_SYM_SIZE as u64,
            ..Section::new(
                b".dynsym",
                Elf64Shdr::SHT_DYNSYM,
                dynsym as u64,
                (ELF64_SYM_SIZE * nsyms) as u64,
            )
        });
        secs.push(Section::new(
            b".dynstr",
            Elf64Shdr::SHT_STRTAB,
            dynstr as u64,
            strtab.len() as u64,
        ));
        if let Some(h) = hash {
            secs.push(Section {
                link: 3,
                entsize: 4,
                ..Section::new(
                    b".hash",
                    Elf64Shdr::SHT_HASH,
                    h as u64,
                    (4 * (2 + NBUCKET + nsyms)) as u64,
                )
            });
        }
        for (i, table) in self.rel_tables.iter().enumerate() {
            secs.push(Section {
                link: 3,
                entsize: ELF64_REL_SIZE as u64,
                ..Section::new(
                    REL_NAMES[i],
                    Elf64Shdr::SHT_REL,
                    rel_offs[i] as u64,
                    (ELF64_REL_SIZE * table.len()) as u64,
                )
            });
        }
        for (i, table) in self.rela_tables.iter().enumerate() {
            secs.push(Section {
                link: 3,
                entsize: ELF64_RELA_SIZE as u64,
                ..Section::new(
                    RELA_NAMES[i],
                    Elf64Shdr::SHT_RELA,
                    rela_offs[i] as u64,
                    (ELF64_RELA_SIZE * table.len()) as u64,
                )
            });
        }
        secs.extend(array_secs);
        if self.bss != 0 {
            // The offset of a NOBITS section is meaningless and not checked.
            secs.push(Section {
                flags: 0x3,
                ..Section::new(b".bss", Elf64Shdr::SHT_NOBITS, 0xdead_0000, self.bss)
            });
        }

        let mut shstrtab = vec![0u8];
        let mut sec_name_offs = Vec::new();
        for sec in secs.iter().map(|s| s.name).chain([b".shstrtab".as_slice()]) {
            if sec.is_empty() {
                sec_name_offs.push(0);
                continue;
            }
            sec_name_offs.push(shstrtab.len() as u32);
            shstrtab.extend_from_slice(sec);
            shstrtab.push(0);
        }
        let shstrtab_off = off;
        off = align8(off + shstrtab.len());
        secs.push(Section::new(
            b".shstrtab",
            Elf64Shdr::SHT_STRTAB,
            shstrtab_off as u64,
            shstrtab.len() as u64,
        ));

        let shoff = off;
        let shnum = secs.len();
        let total = shoff + ELF64_SHDR_SIZE * shnum;
        let mut img = vec![0u8; total];

        // ELF header
        img[..8].copy_from_slice(&[0x7f, b'E', b'L', b'F', 2, 1, 1, 0]);
        put16(&mut img, 16, 3);
        put16(&mut img, 18, 62);
        put32(&mut img, 20, 1);
        put64(&mut img, 24, TEXT);
        put64(&mut img, 32, 64);
        put64(&mut img, 40, shoff as u64);
        put16(&mut img, 52, ELF64_EHDR_SIZE as u16);
        put16(&mut img, 54, ELF64_PHDR_SIZE as u16);
        put16(&mut img, 56, 2);
        put16(&mut img, 58, ELF64_SHDR_SIZE as u16);
        put16(&mut img, 60, shnum as u16);
        put16(&mut img, 62, (shnum - 1) as u16);

        // Segments
        let seg0_memsz = total as u64 + self.bss;
        put_phdr(&mut img, 0, 1, 0, 0, total as u64, seg0_memsz);
        let mut exec_size = seg0_memsz as usize;
        if self.extra_segment {
            let vaddr = (seg0_memsz + 15) & !15;
            put_phdr(&mut img, 1, 1, PAYLOAD, vaddr, 16, 32);
            exec_size = (vaddr + 32) as usize;
        }

        // Contents
        img[TEXT as usize..DATA as usize].fill(0x90);
        img[PAYLOAD as usize..ARRAYS as usize].fill(0xaa);
        let mut at = ARRAYS as usize;
        for entry in self.arrays.iter().flat_map(|(_, entries)| entries) {
            put64(&mut img, at, *entry);
            at += 8;
        }
        for (i, (_, value)) in self.syms.iter().enumerate() {
            let at = dynsym + ELF64_SYM_SIZE * (i + 1);
            put32(&mut img, at, name_offs[i]);
            img[at + 4] = (Elf64Sym::STB_GLOBAL << 4) | Elf64Sym::STT_FUNC;
            put16(&mut img, at + 6, if *value != 0 { 1 } else { 0 });
            put64(&mut img, at + 8, *value);
            put64(&mut img, at + 16, 8);
        }
        img[dynstr..dynstr + strtab.len()].copy_from_slice(&strtab);
        if let Some(h) = hash {
            self.write_hash(&mut img, h);
        }
        for (table, &base) in self.rel_tables.iter().zip(&rel_offs) {
            for (i, r) in table.iter().enumerate() {
                let at = base + ELF64_REL_SIZE * i;
                put64(&mut img, at, r.offset);
                put64(&mut img, at + 8, (u64::from(r.sym) << 32) | u64::from(r.r_type));
            }
        }
        for (table, &base) in self.rela_tables.iter().zip(&rela_offs) {
            for (i, r) in table.iter().enumerate() {
                let at = base + ELF64_RELA_SIZE * i;
                put64(&mut img, at, r.offset);
                put64(&mut img, at + 8, (u64::from(r.sym) << 32) | u64::from(r.r_type));
                put64(&mut img, at + 16, r.addend as u64);
            }
        }
        img[shstrtab_off..shstrtab_off + shstrtab.len()].copy_from_slice(&shstrtab);

        // Section headers
        for (i, sec) in secs.iter().enumerate() {
            let at = shoff + ELF64_SHDR_SIZE * i;
            put32(&mut img, at, sec_name_offs[i]);
            put32(&mut img, at + 4, sec.sh_type);
            put64(&mut img, at + 8, sec.flags);
            put64(&mut img, at + 16, sec.addr);
            put64(&mut img, at + 24, sec.offset);
            put64(&mut img, at + 32, sec.size);
            put32(&mut img, at + 40, sec.link);
            put64(&mut img, at + 48, if sec.sh_type == 0 { 0 } else { 8 });
            put64(&mut img, at + 56, sec.entsize);
        }

        TestImage {
            bytes: img,
            exec_size,
            shoff,
            dynsym,
            hash,
            names: secs.iter().map(|s| s.name).collect(),
        }
    }

    fn write_hash(&self, img: &mut [u8], at: usize) {
        let nsyms = self.syms.len() + 1;
        let mut buckets = [0u32; NBUCKET];
        let mut chain = vec![0u32; nsyms];
        for (i, (name, _)) in self.syms.iter().enumerate() {
            let idx = i + 1;
            let b = crate::elf_hash(name) as usize % NBUCKET;
            chain[idx] = buckets[b];
            buckets[b] = idx as u32;
        }
        put32(img, at, NBUCKET as u32);
        put32(img, at + 4, nsyms as u32);
        for (i, b) in buckets.iter().enumerate() {
            put32(img, at + 8 + 4 * i, *b);
        }
        for (i, c) in chain.iter().enumerate() {
            put32(img, at + 8 + 4 * NBUCKET + 4 * i, *c);
        }
    }
}

impl Section {
    fn new(name: &'static [u8], sh_type: Elf64Word, offset: u64, size: u64) -> Self {
        Self {
            name,
            sh_type,
            flags: 0,
            addr: 0,
            offset,
            size,
            link: 0,
            entsize: 0,
        }
    }
}

impl TestImage {
    pub fn section_index(&self, name: &[u8]) -> usize {
        self.names
            .iter()
            .position(|n| *n == name)
            .unwrap_or_else(|| panic!("no section {:?}", name))
    }

    /// File offset of the section header of section `name`
    pub fn shdr(&self, name: &[u8]) -> usize {
        self.shoff + ELF64_SHDR_SIZE * self.section_index(name)
    }

    /// File offset of program header `i`
    pub fn phdr(&self, i: usize) -> usize {
        64 + ELF64_PHDR_SIZE * i
    }

    pub fn set8(&mut self, off: usize, v: u8) {
        self.bytes[off] = v;
    }

    pub fn set16(&mut self, off: usize, v: u16) {
        put16(&mut self.bytes, off, v);
    }

    pub fn set32(&mut self, off: usize, v: u32) {
        put32(&mut self.bytes, off, v);
    }

    pub fn set64(&mut self, off: usize, v: u64) {
        put64(&mut self.bytes, off, v);
    }

    /// A memory image buffer of the right size, filled with garbage.
    pub fn exec_buf(&self) -> Vec<u8> {
        vec![0xcc; self.exec_size]
    }
}

fn align8(v: usize) -> usize {
    (v + 7) & !7
}

fn put_phdr(img: &mut [u8], i: usize, p_type: u32, offset: u64, vaddr: u64, filesz: u64, memsz: u64) {
    let at = 64 + ELF64_PHDR_SIZE * i;
    put32(img, at, p_type);
    put32(img, at + 4, 0x5);
    put64(img, at + 8, offset);
    put64(img, at + 16, vaddr);
    put64(img, at + 24, vaddr);
    put64(img, at + 32, filesz);
    put64(img, at + 40, memsz);
    put64(img, at + 48, 0x10);
}

fn put16(img: &mut [u8], off: usize, v: u16) {
    img[off..off + 2].copy_from_slice(&v.to_le_bytes());
}

fn put32(img: &mut [u8], off: usize, v: u32) {
    img[off..off + 4].copy_from_slice(&v.to_le_bytes());
}

fn put64(img: &mut [u8], off: usize, v: u64) {
    img[off..off + 8].copy_from_slice(&v.to_le_bytes());
}
