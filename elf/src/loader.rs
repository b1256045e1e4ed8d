// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2026 The elf-linker Authors
//
// vim: ts=4 sw=4 et

use super::types::*;
use super::{
    Elf64Rel, Elf64Rela, Elf64RelocOp, Elf64RelocProcessor, Elf64Sym, Elf64X86RelocProcessor,
    ElfError, ElfFile, MAX_MODULES,
};
use core::iter;
use heapless::Vec;

/// Handle of a module inside an [`ElfLoader`], its registration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ModuleId(usize);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A group of extension modules linked against each other.
///
/// Registration order matters: when a symbol is defined by several peers
/// of a module, the one registered first wins.
#[derive(Debug, Default)]
pub struct ElfLoader<'a> {
    modules: Vec<ElfFile<'a>, MAX_MODULES>,
    relocated: bool,
}

impl<'a> ElfLoader<'a> {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            relocated: false,
        }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn is_relocated(&self) -> bool {
        self.relocated
    }

    /// Appends a module to the group. A group that gains a module has to be
    /// relocated again.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::LoaderFull`] once [`MAX_MODULES`] modules are
    /// registered.
    pub fn add(&mut self, file: ElfFile<'a>) -> Result<ModuleId, ElfError> {
        let id = ModuleId(self.modules.len());
        self.modules.push(file).map_err(|_| {
            log::warn!("ELF loader group is full ({} modules)", MAX_MODULES);
            ElfError::LoaderFull
        })?;
        self.relocated = false;
        log::debug!("added ELF module {}", id.0);
        Ok(id)
    }

    pub fn module(&self, id: ModuleId) -> Result<&ElfFile<'a>, ElfError> {
        self.modules.get(id.0).ok_or(ElfError::InvalidModule)
    }

    /// Iterates the registered modules in registration order.
    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &ElfFile<'a>)> {
        self.modules
            .iter()
            .enumerate()
            .map(|(i, module)| (ModuleId(i), module))
    }

    /// Makes every module see all other modules of the group, in
    /// registration order.
    pub fn prepare_peers(&mut self) {
        let count = self.modules.len();
        for (i, module) in self.modules.iter_mut().enumerate() {
            module.peers.clear();
            for peer in (0..count).filter(|&p| p != i) {
                // At most MAX_MODULES - 1 peers, so this cannot fail.
                let _ = module.peers.push(ModuleId(peer));
            }
        }
    }

    /// Looks `name` up on behalf of module `origin`.
    ///
    /// `origin` is searched first, then its peers. Only a symbol with a
    /// nonzero value satisfies the lookup: a module that merely declares a
    /// symbol does not shadow the definition in another module.
    pub fn lookup_global(
        &self,
        origin: ModuleId,
        name: &[u8],
    ) -> Result<(ModuleId, Elf64Sym), ElfError> {
        let module = self.module(origin)?;
        for id in iter::once(origin).chain(module.peers.iter().copied()) {
            match self.module(id)?.lookup_local(name) {
                Ok(sym) if sym.is_defined() => return Ok((id, sym)),
                Ok(_) | Err(ElfError::NoSuchSymbol) => {}
                Err(e) => return Err(e),
            }
        }
        Err(ElfError::NoSuchSymbol)
    }

    fn symbol_address(&self, origin: ModuleId, name: &[u8]) -> Result<Elf64Addr, ElfError> {
        let (owner, sym) = self.lookup_global(origin, name)?;
        let base = self
            .module(owner)?
            .exec_base()
            .ok_or(ElfError::ModuleNotLoaded)?;
        Ok(base.wrapping_add(sym.st_value))
    }

    /// Address of `name` as seen from module `module`, in a relocated group.
    pub fn resolve_symbol(&self, module: ModuleId, name: &[u8]) -> Result<Elf64Addr, ElfError> {
        if !self.relocated {
            return Err(ElfError::NotRelocated);
        }
        self.symbol_address(module, name)
    }

    /// Address of the first definition of `name` in registration order, in a
    /// relocated group.
    pub fn resolve_group_symbol(&self, name: &[u8]) -> Result<Elf64Addr, ElfError> {
        if !self.relocated {
            return Err(ElfError::NotRelocated);
        }
        for (id, module) in self.modules() {
            match module.lookup_local(name) {
                Ok(sym) if sym.is_defined() => {
                    let base = module.exec_base().ok_or(ElfError::ModuleNotLoaded)?;
                    log::trace!("resolved symbol in ELF module {}", id.0);
                    return Ok(base.wrapping_add(sym.st_value));
                }
                Ok(_) | Err(ElfError::NoSuchSymbol) => {}
                Err(e) => return Err(e),
            }
        }
        Err(ElfError::NoSuchSymbol)
    }

    /// Applies the relocations of all modules with the x86-64 relocation
    /// rules.
    pub fn relocate(&mut self) -> Result<(), ElfError> {
        self.relocate_with(&Elf64X86RelocProcessor)
    }

    /// Applies the relocations of all modules using `rp`.
    ///
    /// Every module must have been loaded. Relocation stops at the first
    /// failing entry; entries applied before it stay applied. Relocating a
    /// group that is already relocated does nothing.
    pub fn relocate_with<RP: Elf64RelocProcessor>(&mut self, rp: &RP) -> Result<(), ElfError> {
        if self.relocated {
            return Ok(());
        }
        if let Some(i) = self.modules.iter().position(|m| !m.is_loaded()) {
            log::warn!("cannot relocate: ELF module {} is not loaded", i);
            return Err(ElfError::ModuleNotLoaded);
        }

        self.prepare_peers();
        for i in 0..self.modules.len() {
            let id = ModuleId(i);
            self.relocate_module(id, rp).inspect_err(|e| {
                log::warn!("relocation of ELF module {} failed: {}", i, e);
            })?;
        }
        self.relocated = true;
        Ok(())
    }

    fn relocate_module<RP: Elf64RelocProcessor>(
        &mut self,
        id: ModuleId,
        rp: &RP,
    ) -> Result<(), ElfError> {
        let module = self.module(id)?;
        log::debug!(
            "relocating ELF module {}: {} entries",
            id.0,
            module.reloc_count()
        );
        let rel_tables = module.rel_tables.clone();
        let rela_tables = module.rela_tables.clone();

        for rel in rel_tables.iter().flat_map(|table| table.iter()) {
            let op = self.rel_op(id, &rel, rp)?;
            self.modules[id.0].write_reloc(op)?;
        }
        for rela in rela_tables.iter().flat_map(|table| table.iter()) {
            let op = self.rela_op(id, &rela, rp)?;
            self.modules[id.0].write_reloc(op)?;
        }
        Ok(())
    }

    /// Resolves the symbol a relocation entry of module `id` refers to.
    fn reloc_symbol(&self, id: ModuleId, sym_idx: Elf64Word) -> Result<Elf64Addr, ElfError> {
        let module = self.module(id)?;
        let sym = module.symtab.read_sym(sym_idx)?;
        let name = module.strtab.get_str(sym.st_name)?;
        self.symbol_address(id, name.as_bytes())
    }

    fn rel_op<RP: Elf64RelocProcessor>(
        &self,
        id: ModuleId,
        rel: &Elf64Rel,
        rp: &RP,
    ) -> Result<Elf64RelocOp, ElfError> {
        let sym_addr = self.reloc_symbol(id, rel.sym())?;
        let dst = self.module(id)?.reloc_target(rel.r_offset)?;
        let value = rp.apply_rel(rel, sym_addr)?;
        log::trace!(
            "REL type {} at {:#x} <- {:#x}",
            rel.r_type(),
            rel.r_offset,
            value
        );
        Ok(Elf64RelocOp { dst, value })
    }

    fn rela_op<RP: Elf64RelocProcessor>(
        &self,
        id: ModuleId,
        rela: &Elf64Rela,
        rp: &RP,
    ) -> Result<Elf64RelocOp, ElfError> {
        let module = self.module(id)?;
        let sym_addr = if rp.uses_symbol(rela.r_type()) {
            self.reloc_symbol(id, rela.sym())?
        } else {
            0
        };
        let dst = module.reloc_target(rela.r_offset)?;
        let load_base = module.exec_base().ok_or(ElfError::ModuleNotLoaded)?;
        let value = rp.apply_rela(rela, load_base, sym_addr)?;
        log::trace!(
            "RELA type {} at {:#x} <- {:#x}",
            rela.r_type(),
            rela.r_offset,
            value
        );
        Ok(Elf64RelocOp { dst, value })
    }
}
