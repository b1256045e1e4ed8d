// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2026 The elf-linker Authors
//
// vim: ts=4 sw=4 et

#![no_main]

use core::hint::black_box;
use elf_linker::{ElfArrayKind, ElfFile};
use libfuzzer_sys::{fuzz_target, Corpus};

/// Images needing more memory than this are not loaded.
const MAX_EXEC_SIZE: usize = 0x10_0000;

fuzz_target!(|data: &[u8]| -> Corpus {
    let mut exec = Vec::new();
    let Ok(mut file) = ElfFile::init(data) else {
        return Corpus::Reject;
    };

    for i in 0..file.section_count() {
        if let Ok(shdr) = file.section(i) {
            let _ = black_box(file.section_name(&shdr));
        }
    }
    for segment in file.load_segments() {
        let _ = black_box(segment);
    }
    let _ = black_box(file.lookup_local(b"init"));

    if file.total_exec_size() > MAX_EXEC_SIZE {
        return Corpus::Keep;
    }
    exec.resize(file.total_exec_size(), 0xcc);
    if file.load(&mut exec).is_err() {
        return Corpus::Keep;
    }

    let _ = black_box(file.entry());
    let _ = black_box(file.resolve_local(b"init"));
    if let Ok(info) = file.section_info() {
        for kind in ElfArrayKind::ALL {
            let count = info.get(kind).map_or(0, |array| array.count());
            for i in 0..count {
                let _ = black_box(file.array_entry(kind, i));
            }
        }
    }

    Corpus::Keep
});
