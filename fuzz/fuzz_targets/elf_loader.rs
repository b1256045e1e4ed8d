// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2026 The elf-linker Authors
//
// vim: ts=4 sw=4 et

#![no_main]

use arbitrary::Arbitrary;
use core::hint::black_box;
use elf_linker::{ElfFile, ElfLoader, MAX_MODULES};
use libfuzzer_sys::{fuzz_target, Corpus};

const MAX_EXEC_SIZE: usize = 0x10_0000;

#[derive(Arbitrary, Debug)]
struct LinkInput<'a> {
    images: Vec<&'a [u8]>,
    names: Vec<&'a [u8]>,
}

fuzz_target!(|input: LinkInput<'_>| -> Corpus {
    if input.images.is_empty() || input.images.len() > MAX_MODULES {
        return Corpus::Reject;
    }

    // Buffers must outlive the loader borrowing them.
    let mut execs: Vec<Vec<u8>> = Vec::new();
    let files: Vec<ElfFile<'_>> = input
        .images
        .iter()
        .filter_map(|image| ElfFile::init(image).ok())
        .filter(|file| file.total_exec_size() <= MAX_EXEC_SIZE)
        .collect();
    if files.is_empty() {
        return Corpus::Reject;
    }
    for file in files.iter() {
        execs.push(vec![0; file.total_exec_size()]);
    }

    let mut loader = ElfLoader::new();
    for (mut file, exec) in files.into_iter().zip(execs.iter_mut()) {
        if file.load(exec).is_err() {
            return Corpus::Keep;
        }
        if loader.add(file).is_err() {
            return Corpus::Keep;
        }
    }

    let _ = black_box(loader.relocate());
    for (id, _) in loader.modules() {
        for name in input.names.iter() {
            let _ = black_box(loader.lookup_global(id, name));
            let _ = black_box(loader.resolve_symbol(id, name));
        }
    }
    for name in input.names.iter() {
        let _ = black_box(loader.resolve_group_symbol(name));
    }

    Corpus::Keep
});
