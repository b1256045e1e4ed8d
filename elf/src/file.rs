// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2026 The elf-linker Authors
//
// vim: ts=4 sw=4 et

use super::header::Elf64Hdr;
use super::types::*;
use super::{
    Elf64AddrRange, Elf64ArrayInfo, Elf64FileRange, Elf64Hash, Elf64ImageLoadSegmentIterator,
    Elf64Phdr, Elf64RelocOp, Elf64Relas, Elf64Rels, Elf64SectionInfo, Elf64Shdr, Elf64Strtab,
    Elf64Sym, Elf64Symtab, ElfArrayKind, ElfError, ModuleId, MAX_MODULES, MAX_RELOC_TABLES,
};
use heapless::Vec;

/// One validated ELF64 extension module.
///
/// An [`ElfFile`] only exists once every structural check on the raw image
/// has passed, so all offsets and table references it holds are known to
/// lie inside the borrowed file. The executable image is attached later by
/// [`ElfFile::load`] and rewritten in place by
/// [`ElfLoader::relocate`](super::ElfLoader::relocate).
#[derive(Debug)]
pub struct ElfFile<'a> {
    file: &'a [u8],
    hdr: Elf64Hdr,
    phdrs_buf: &'a [u8],
    shdrs_buf: &'a [u8],
    shstrtab: Elf64Strtab<'a>,
    pub(crate) strtab: Elf64Strtab<'a>,
    pub(crate) symtab: Elf64Symtab<'a>,
    hash: Option<Elf64Hash<'a>>,
    pub(crate) rel_tables: Vec<Elf64Rels<'a>, MAX_RELOC_TABLES>,
    pub(crate) rela_tables: Vec<Elf64Relas<'a>, MAX_RELOC_TABLES>,
    arrays: [Option<Elf64AddrRange>; 4],
    exec_size: usize,
    exec: Option<&'a mut [u8]>,
    pub(crate) peers: Vec<ModuleId, MAX_MODULES>,
}

impl<'a> ElfFile<'a> {
    /// Validates the raw ELF image `file`.
    ///
    /// # Errors
    ///
    /// The first failed check is returned; every header field, table and
    /// section property has its own [`ElfError`] kind.
    pub fn init(file: &'a [u8]) -> Result<Self, ElfError> {
        Self::parse(file).inspect_err(|e| {
            log::warn!("rejecting ELF image of {} bytes: {}", file.len(), e);
        })
    }

    fn parse(file: &'a [u8]) -> Result<Self, ElfError> {
        let hdr = Elf64Hdr::read(file)?;

        if hdr.e_shstrndx >= hdr.e_shnum {
            return Err(ElfError::InvalidShstrndx);
        }
        let shdrs_range = Self::table_range(hdr.e_shoff, hdr.e_shnum, ELF64_SHDR_SIZE, file.len())
            .ok_or(ElfError::InvalidShdrTable)?;
        let phdrs_range = Self::table_range(hdr.e_phoff, hdr.e_phnum, ELF64_PHDR_SIZE, file.len())
            .ok_or(ElfError::InvalidPhdrTable)?;
        let shdrs_buf = Self::slice(file, shdrs_range);
        let phdrs_buf = Self::slice(file, phdrs_range);
        let shdrs = || shdrs_buf.chunks_exact(ELF64_SHDR_SIZE).map(Elf64Shdr::read);
        let shdr = |i: usize| Elf64Shdr::read(&shdrs_buf[i * ELF64_SHDR_SIZE..][..ELF64_SHDR_SIZE]);

        for shdr in shdrs() {
            shdr.verify(file.len())?;
        }

        let mut exec_size = 0;
        for phdr in phdrs_buf.chunks_exact(ELF64_PHDR_SIZE).map(Elf64Phdr::read) {
            phdr.verify(file.len())?;
            if phdr.p_type == Elf64Phdr::PT_LOAD {
                let end = usize::try_from(phdr.vaddr_range()?.vaddr_end)
                    .map_err(|_| ElfError::InvalidSegmentMemSize)?;
                exec_size = exec_size.max(end);
            }
        }

        // The dynamic symbol table and the string tables.
        let mut dynsym_idx = None;
        for (i, sh) in shdrs().enumerate() {
            if sh.sh_type == Elf64Shdr::SHT_DYNSYM {
                if dynsym_idx.is_some() {
                    return Err(ElfError::DuplicateDynamicSymbolTable);
                }
                dynsym_idx = Some(i);
            }
        }
        let dynsym_idx = dynsym_idx.ok_or(ElfError::MissingDynamicSymbolTable)?;
        let dynsym = shdr(dynsym_idx);
        Self::verify_entsize(&dynsym, ELF64_SYM_SIZE)?;
        let strtab_idx = usize::try_from(dynsym.sh_link)
            .ok()
            .filter(|&link| link < usize::from(hdr.e_shnum))
            .ok_or(ElfError::InvalidSectionLink)?;
        let strtab_shdr = shdr(strtab_idx);
        if strtab_shdr.sh_type != Elf64Shdr::SHT_STRTAB {
            return Err(ElfError::InvalidSectionType);
        }
        let shstrtab_shdr = shdr(usize::from(hdr.e_shstrndx));
        if shstrtab_shdr.sh_type != Elf64Shdr::SHT_STRTAB {
            return Err(ElfError::InvalidSectionType);
        }
        let strtab = Elf64Strtab::new(Self::slice(file, strtab_shdr.file_range(file.len())?));
        let shstrtab = Elf64Strtab::new(Self::slice(file, shstrtab_shdr.file_range(file.len())?));
        let symtab = Elf64Symtab::new(Self::slice(file, dynsym.file_range(file.len())?));

        // Relocation tables and the optional symbol hash table.
        let mut rel_tables = Vec::new();
        let mut rela_tables = Vec::new();
        let mut hash = None;
        for sh in shdrs() {
            match sh.sh_type {
                Elf64Shdr::SHT_REL => {
                    Self::verify_entsize(&sh, ELF64_REL_SIZE)?;
                    let rels = Elf64Rels::new(Self::slice(file, sh.file_range(file.len())?));
                    rel_tables
                        .push(rels)
                        .map_err(|_| ElfError::TooManyRelocationTables)?;
                }
                Elf64Shdr::SHT_RELA => {
                    Self::verify_entsize(&sh, ELF64_RELA_SIZE)?;
                    let relas = Elf64Relas::new(Self::slice(file, sh.file_range(file.len())?));
                    rela_tables
                        .push(relas)
                        .map_err(|_| ElfError::TooManyRelocationTables)?;
                }
                Elf64Shdr::SHT_HASH if hash.is_none() => {
                    if usize::try_from(sh.sh_link) != Ok(dynsym_idx) {
                        return Err(ElfError::InvalidHashTable);
                    }
                    let hash_buf = Self::slice(file, sh.file_range(file.len())?);
                    hash = Some(Elf64Hash::new(hash_buf, symtab.len())?);
                }
                _ => {}
            }
        }

        // Constructor and destructor arrays, first match of each name.
        let mut arrays = [None; 4];
        for sh in shdrs() {
            let name = shstrtab
                .get_str(sh.sh_name)
                .map_err(|_| ElfError::InvalidSectionName)?;
            for kind in ElfArrayKind::ALL {
                let slot = &mut arrays[kind.index()];
                if slot.is_none()
                    && name
                        .matches(kind.section_name())
                        .map_err(|_| ElfError::InvalidSectionName)?
                {
                    *slot = Some(sh.verify_array(exec_size)?);
                }
            }
        }

        log::debug!(
            "validated ELF image: {} sections, {} symbols, {} REL and {} RELA tables, {:#x} bytes of memory",
            hdr.e_shnum,
            symtab.len(),
            rel_tables.len(),
            rela_tables.len(),
            exec_size
        );

        Ok(Self {
            file,
            hdr,
            phdrs_buf,
            shdrs_buf,
            shstrtab,
            strtab,
            symtab,
            hash,
            rel_tables,
            rela_tables,
            arrays,
            exec_size,
            exec: None,
            peers: Vec::new(),
        })
    }

    fn table_range(
        offset: Elf64Off,
        num: Elf64Half,
        entsize: usize,
        file_len: usize,
    ) -> Option<Elf64FileRange> {
        let offset_begin = usize::try_from(offset).ok()?;
        let offset_end = usize::from(num)
            .checked_mul(entsize)?
            .checked_add(offset_begin)?;
        (offset_end <= file_len).then_some(Elf64FileRange {
            offset_begin,
            offset_end,
        })
    }

    fn slice(file: &'a [u8], range: Elf64FileRange) -> &'a [u8] {
        &file[range.offset_begin..range.offset_end]
    }

    fn verify_entsize(shdr: &Elf64Shdr, expected: usize) -> Result<(), ElfError> {
        if shdr.sh_entsize != 0 && usize::try_from(shdr.sh_entsize) != Ok(expected) {
            return Err(ElfError::InvalidSectionEntrySize);
        }
        Ok(())
    }

    /// Always true: an [`ElfFile`] can only be obtained from a file that
    /// passed validation.
    pub fn is_valid(&self) -> bool {
        true
    }

    /// Number of section headers
    pub fn section_count(&self) -> usize {
        self.shdrs_buf.len() / ELF64_SHDR_SIZE
    }

    /// Reads the section header at index `i`.
    pub fn section(&self, i: usize) -> Result<Elf64Shdr, ElfError> {
        let off = i.checked_mul(ELF64_SHDR_SIZE).ok_or(ElfError::InvalidIndex)?;
        self.shdrs_buf
            .get(off..)
            .and_then(|buf| buf.get(..ELF64_SHDR_SIZE))
            .map(Elf64Shdr::read)
            .ok_or(ElfError::InvalidIndex)
    }

    /// Resolves the name of a section through the section name string
    /// table.
    pub fn section_name(&self, shdr: &Elf64Shdr) -> Result<&'a [u8], ElfError> {
        Ok(self.shstrtab.get_str(shdr.sh_name)?.as_bytes())
    }

    /// The size in bytes of the memory image the module needs: the highest
    /// end address of any `PT_LOAD` segment.
    pub fn total_exec_size(&self) -> usize {
        self.exec_size
    }

    /// Iterates the `PT_LOAD` segments in program header order.
    pub fn load_segments(&self) -> Elf64ImageLoadSegmentIterator<'a> {
        Elf64ImageLoadSegmentIterator::new(self.file, self.phdrs_buf)
    }

    /// Builds the module's memory image in `exec`.
    ///
    /// The buffer is cleared first, so memory described by a segment but not
    /// backed by file contents reads as zero. `exec` must be exactly
    /// [`Self::total_exec_size`] bytes long, and a module can be loaded only
    /// once.
    pub fn load(&mut self, exec: &'a mut [u8]) -> Result<(), ElfError> {
        if self.exec.is_some() {
            return Err(ElfError::InvalidArgument);
        }
        if exec.len() != self.exec_size {
            log::warn!(
                "ELF image needs {:#x} bytes of memory, got {:#x}",
                self.exec_size,
                exec.len()
            );
            return Err(ElfError::InvalidExecSize);
        }

        exec.fill(0);
        for segment in self.load_segments() {
            if !segment.vaddr_range.fits_in(exec.len()) {
                return Err(ElfError::InvalidSegmentVaddr);
            }
            let dst = segment.vaddr_range.as_usize_range().start;
            exec[dst..dst + segment.file_contents.len()].copy_from_slice(segment.file_contents);
        }

        log::debug!(
            "loaded ELF image at {:#x}, {:#x} bytes",
            exec.as_ptr() as Elf64Addr,
            exec.len()
        );
        self.exec = Some(exec);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.exec.is_some()
    }

    /// The memory image, once loaded
    pub fn exec(&self) -> Option<&[u8]> {
        self.exec.as_deref()
    }

    /// Address of the memory image, once loaded
    pub fn exec_base(&self) -> Option<Elf64Addr> {
        self.exec.as_ref().map(|exec| exec.as_ptr() as Elf64Addr)
    }

    /// Address of the module's entry point inside the loaded image.
    pub fn entry(&self) -> Result<Elf64Addr, ElfError> {
        let base = self.exec_base().ok_or(ElfError::ModuleNotLoaded)?;
        Ok(base.wrapping_add(self.hdr.e_entry))
    }

    /// Finds the dynamic symbol called `name` in this module alone.
    ///
    /// The first symbol in table order with that name is returned, whatever
    /// its value. The hash section, when present, only narrows the search:
    /// among its candidates the lowest index wins, and a chain that misses
    /// the name falls back to scanning the whole table.
    pub fn lookup_local(&self, name: &[u8]) -> Result<Elf64Sym, ElfError> {
        if let Some(hash) = self.hash {
            // Chains list later symbols first.
            let mut best: Option<(Elf64Word, Elf64Sym)> = None;
            for idx in hash.candidates(name) {
                if best.is_none_or(|(best_idx, _)| idx < best_idx) {
                    let sym = self.symtab.read_sym(idx)?;
                    if self.strtab.get_str(sym.st_name)?.matches(name)? {
                        best = Some((idx, sym));
                    }
                }
            }
            if let Some((_, sym)) = best {
                return Ok(sym);
            }
        }
        self.lookup_linear(name)
    }

    fn lookup_linear(&self, name: &[u8]) -> Result<Elf64Sym, ElfError> {
        for sym in self.symtab.iter() {
            if self.strtab.get_str(sym.st_name)?.matches(name)? {
                return Ok(sym);
            }
        }
        Err(ElfError::NoSuchSymbol)
    }

    /// Address of a symbol this module defines itself. A symbol the module
    /// only declares yields [`ElfError::SymbolUndefined`].
    pub fn resolve_local(&self, name: &[u8]) -> Result<Elf64Addr, ElfError> {
        let base = self.exec_base().ok_or(ElfError::ModuleNotLoaded)?;
        let sym = self.lookup_local(name)?;
        if !sym.is_defined() {
            return Err(ElfError::SymbolUndefined);
        }
        Ok(base.wrapping_add(sym.st_value))
    }

    /// Locations of the constructor and destructor arrays in the loaded
    /// image.
    pub fn section_info(&self) -> Result<Elf64SectionInfo, ElfError> {
        let base = self.exec_base().ok_or(ElfError::ModuleNotLoaded)?;
        let info = |kind: ElfArrayKind| {
            self.arrays[kind.index()].map(|range| Elf64ArrayInfo {
                addr: base.wrapping_add(range.vaddr_begin),
                size: range.as_usize_range().len(),
            })
        };
        Ok(Elf64SectionInfo {
            ctors: info(ElfArrayKind::Ctors),
            dtors: info(ElfArrayKind::Dtors),
            init_array: info(ElfArrayKind::InitArray),
            fini_array: info(ElfArrayKind::FiniArray),
        })
    }

    /// Reads entry `index` of a function pointer array from the loaded
    /// image. Once the group is relocated the entry is a callable address.
    pub fn array_entry(&self, kind: ElfArrayKind, index: usize) -> Result<Elf64Addr, ElfError> {
        let exec = self.exec.as_deref().ok_or(ElfError::ModuleNotLoaded)?;
        let range = self.arrays[kind.index()]
            .ok_or(ElfError::InvalidIndex)?
            .as_usize_range();
        let off = index
            .checked_mul(8)
            .and_then(|off| off.checked_add(range.start))
            .filter(|&off| off < range.end)
            .ok_or(ElfError::InvalidIndex)?;
        Ok(le_u64(exec, off))
    }

    pub(crate) fn reloc_count(&self) -> usize {
        self.rel_tables.iter().map(|t| t.len()).sum::<usize>()
            + self.rela_tables.iter().map(|t| t.len()).sum::<usize>()
    }

    /// Checks that an 8-byte relocation at `r_offset` stays inside the
    /// memory image and returns its position.
    pub(crate) fn reloc_target(&self, r_offset: Elf64Addr) -> Result<usize, ElfError> {
        let exec_len = self.exec.as_ref().ok_or(ElfError::ModuleNotLoaded)?.len();
        let range =
            Elf64AddrRange::try_from((r_offset, 8)).map_err(|_| ElfError::InvalidRelocationOffset)?;
        if !range.fits_in(exec_len) {
            return Err(ElfError::InvalidRelocationOffset);
        }
        Ok(range.as_usize_range().start)
    }

    pub(crate) fn write_reloc(&mut self, op: Elf64RelocOp) -> Result<(), ElfError> {
        let exec = self.exec.as_deref_mut().ok_or(ElfError::ModuleNotLoaded)?;
        let dst = op
            .dst
            .checked_add(8)
            .and_then(|end| exec.get_mut(op.dst..end))
            .ok_or(ElfError::InvalidRelocationOffset)?;
        dst.copy_from_slice(&op.value.to_le_bytes());
        Ok(())
    }
}
