// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2026 The elf-linker Authors
//
// vim: ts=4 sw=4 et

/// Errors while validating, loading or linking ELF extension modules. Every
/// kind names the one field or condition that was rejected, so a failed
/// load can be traced back to the offending byte range. The
/// [`fmt::Display`] trait is implemented to allow formatting error instances.
///
/// # Examples
///
/// ```rust
/// use elf_linker::ElfError;
///
/// let error = ElfError::InvalidMagic1;
/// let error_message = error.to_string();
///
/// assert_eq!(error_message, "ELF magic byte 1 is not 'E'");
/// ```
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfError {
    InvalidArgument,
    FileTooShort,

    InvalidMagic0,
    InvalidMagic1,
    InvalidMagic2,
    InvalidMagic3,
    UnsupportedClass,
    UnsupportedEndianess,
    UnsupportedIdentVersion,
    UnsupportedOsAbi,
    UnsupportedAbiVersion,
    UnsupportedType,
    UnsupportedMachine,
    UnsupportedVersion,
    InvalidEntry,
    InvalidPhdrOffset,
    InvalidShdrOffset,
    UnsupportedFlags,
    InvalidEhdrSize,
    InvalidPhdrSize,
    InvalidShdrSize,
    InvalidShstrndx,

    InvalidPhdrTable,
    InvalidShdrTable,

    InvalidSectionName,
    InvalidSectionType,
    InvalidSectionFlags,
    InvalidSectionAddress,
    InvalidSectionOffset,
    InvalidSectionSize,
    InvalidSectionLink,
    InvalidSectionInfo,
    InvalidSectionAlignment,
    InvalidSectionEntrySize,

    InvalidSegmentType,
    InvalidSegmentFlags,
    InvalidSegmentOffset,
    InvalidSegmentVaddr,
    InvalidSegmentPaddr,
    InvalidSegmentFileSize,
    InvalidSegmentMemSize,
    InvalidSegmentAlignment,

    InvalidIndex,
    InvalidOffset,
    InvalidString,
    UnterminatedString,
    MissingDynamicSymbolTable,
    DuplicateDynamicSymbolTable,
    InvalidHashTable,

    NoSuchSymbol,
    SymbolUndefined,
    InvalidRelocationType,
    InvalidRelocationOffset,

    LoaderFull,
    TooManyRelocationTables,
    InvalidExecSize,
    InvalidModule,
    ModuleNotLoaded,
    NotRelocated,
}

impl fmt::Display for ElfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => {
                write!(f, "invalid argument")
            }
            Self::FileTooShort => {
                write!(f, "ELF file too short")
            }

            Self::InvalidMagic0 => {
                write!(f, "ELF magic byte 0 is not 0x7f")
            }
            Self::InvalidMagic1 => {
                write!(f, "ELF magic byte 1 is not 'E'")
            }
            Self::InvalidMagic2 => {
                write!(f, "ELF magic byte 2 is not 'L'")
            }
            Self::InvalidMagic3 => {
                write!(f, "ELF magic byte 3 is not 'F'")
            }
            Self::UnsupportedClass => {
                write!(f, "unsupported ELF class")
            }
            Self::UnsupportedEndianess => {
                write!(f, "unsupported ELF endianess")
            }
            Self::UnsupportedIdentVersion => {
                write!(f, "unsupported ELF identification version")
            }
            Self::UnsupportedOsAbi => {
                write!(f, "unsupported ELF ABI")
            }
            Self::UnsupportedAbiVersion => {
                write!(f, "unsupported ELF ABI version")
            }
            Self::UnsupportedType => {
                write!(f, "unsupported ELF file type")
            }
            Self::UnsupportedMachine => {
                write!(f, "unsupported ELF machine")
            }
            Self::UnsupportedVersion => {
                write!(f, "unsupported ELF version")
            }
            Self::InvalidEntry => {
                write!(f, "invalid ELF entry point")
            }
            Self::InvalidPhdrOffset => {
                write!(f, "invalid ELF program header table offset")
            }
            Self::InvalidShdrOffset => {
                write!(f, "invalid ELF section header table offset")
            }
            Self::UnsupportedFlags => {
                write!(f, "unsupported ELF flags")
            }
            Self::InvalidEhdrSize => {
                write!(f, "invalid ELF header size")
            }
            Self::InvalidPhdrSize => {
                write!(f, "invalid ELF program header size")
            }
            Self::InvalidShdrSize => {
                write!(f, "invalid ELF section header size")
            }
            Self::InvalidShstrndx => {
                write!(f, "invalid ELF section name string table index")
            }

            Self::InvalidPhdrTable => {
                write!(f, "ELF program header table out of bounds")
            }
            Self::InvalidShdrTable => {
                write!(f, "ELF section header table out of bounds")
            }

            Self::InvalidSectionName => {
                write!(f, "invalid ELF section name")
            }
            Self::InvalidSectionType => {
                write!(f, "invalid ELF section type")
            }
            Self::InvalidSectionFlags => {
                write!(f, "invalid ELF section flags")
            }
            Self::InvalidSectionAddress => {
                write!(f, "invalid ELF section address")
            }
            Self::InvalidSectionOffset => {
                write!(f, "invalid ELF section offset")
            }
            Self::InvalidSectionSize => {
                write!(f, "invalid ELF section size")
            }
            Self::InvalidSectionLink => {
                write!(f, "invalid ELF section link")
            }
            Self::InvalidSectionInfo => {
                write!(f, "invalid ELF section info")
            }
            Self::InvalidSectionAlignment => {
                write!(f, "invalid ELF section alignment")
            }
            Self::InvalidSectionEntrySize => {
                write!(f, "invalid ELF section entry size")
            }

            Self::InvalidSegmentType => {
                write!(f, "invalid ELF segment type")
            }
            Self::InvalidSegmentFlags => {
                write!(f, "invalid ELF segment flags")
            }
            Self::InvalidSegmentOffset => {
                write!(f, "invalid ELF segment offset")
            }
            Self::InvalidSegmentVaddr => {
                write!(f, "invalid ELF segment virtual address")
            }
            Self::InvalidSegmentPaddr => {
                write!(f, "invalid ELF segment physical address")
            }
            Self::InvalidSegmentFileSize => {
                write!(f, "invalid ELF segment file size")
            }
            Self::InvalidSegmentMemSize => {
                write!(f, "invalid ELF segment memory size")
            }
            Self::InvalidSegmentAlignment => {
                write!(f, "invalid ELF segment alignment")
            }

            Self::InvalidIndex => {
                write!(f, "ELF table index out of bounds")
            }
            Self::InvalidOffset => {
                write!(f, "ELF string table offset out of bounds")
            }
            Self::InvalidString => {
                write!(f, "malformed ELF string")
            }
            Self::UnterminatedString => {
                write!(f, "unterminated ELF string table entry")
            }
            Self::MissingDynamicSymbolTable => {
                write!(f, "missing ELF dynamic symbol table")
            }
            Self::DuplicateDynamicSymbolTable => {
                write!(f, "multiple ELF dynamic symbol tables")
            }
            Self::InvalidHashTable => {
                write!(f, "invalid ELF symbol hash table")
            }

            Self::NoSuchSymbol => {
                write!(f, "no such ELF symbol")
            }
            Self::SymbolUndefined => {
                write!(f, "ELF symbol is undefined")
            }
            Self::InvalidRelocationType => {
                write!(f, "unsupported ELF relocation type")
            }
            Self::InvalidRelocationOffset => {
                write!(f, "ELF relocation offset out of bounds")
            }

            Self::LoaderFull => {
                write!(f, "ELF loader group is full")
            }
            Self::TooManyRelocationTables => {
                write!(f, "too many ELF relocation tables")
            }
            Self::InvalidExecSize => {
                write!(f, "executable buffer size does not match ELF image size")
            }
            Self::InvalidModule => {
                write!(f, "invalid ELF module id")
            }
            Self::ModuleNotLoaded => {
                write!(f, "ELF module has not been loaded")
            }
            Self::NotRelocated => {
                write!(f, "ELF loader group has not been relocated")
            }
        }
    }
}
