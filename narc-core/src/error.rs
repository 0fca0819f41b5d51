use alloc::format;
use alloc::string::ToString;
use core::error;
use core::fmt::{Display, Formatter, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    InvalidHeaderId(u32),
    InvalidByteOrderMark(u16),
    InvalidVersion(u16),
    InvalidHeaderSize(u16),
    InvalidChunkCount(u16),
    InvalidFileAllocationTableId(u32),
    InvalidFileAllocationTableReserved(u16),
    InvalidFileNameTableId(u32),
    InvalidFileImagesId(u32),
    InvalidChunkSize(u32),
    /// Sub-table record that could not be decoded at the given FNT offset
    InvalidFileNameTableEntryId(usize),
    InvalidSubtableOffset(u32),
    InvalidFileRange(u16),
    InvalidFileId(u32),
    InvalidDirectoryLink(u16),
    MissingName(u16),
    InvalidNameLength(usize),
    TooManyFiles(usize),
    TooManyDirectories(usize),
    Overflow,
    UnexpectedEof(u64),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> Result {
        use Error::*;

        let msg = match self {
            InvalidHeaderId(id) => format!("Invalid header ID: {:#010x}", id),
            InvalidByteOrderMark(bom) => format!("Invalid byte order mark: {:#06x}", bom),
            InvalidVersion(version) => format!("Invalid NARC version: {:#06x}", version),
            InvalidHeaderSize(size) => format!("Invalid header size: {:#06x}", size),
            InvalidChunkCount(count) => format!("Invalid chunk count: {}", count),
            InvalidFileAllocationTableId(id) => {
                format!("Invalid file allocation table ID: {:#010x}", id)
            }
            InvalidFileAllocationTableReserved(value) => format!(
                "Invalid file allocation table reserved section: {:#06x}",
                value
            ),
            InvalidFileNameTableId(id) => format!("Invalid file name table ID: {:#010x}", id),
            InvalidFileImagesId(id) => format!("Invalid file images ID: {:#010x}", id),
            InvalidChunkSize(size) => format!("Invalid chunk size: {:#x}", size),
            InvalidFileNameTableEntryId(offset) => {
                format!("Invalid file name table entry at offset {:#x}", offset)
            }
            InvalidSubtableOffset(offset) => {
                format!("File name sub-table offset out of bounds: {:#x}", offset)
            }
            InvalidFileRange(id) => format!("File {} lies outside the file images", id),
            InvalidFileId(id) => format!("Invalid file ID: {:#x}", id),
            InvalidDirectoryLink(link) => format!("Invalid directory link: {:#06x}", link),
            MissingName(id) => format!("No name recorded for ID {:#06x}", id),
            InvalidNameLength(len) => {
                format!("Name length {} outside of 1..=127 bytes", len)
            }
            TooManyFiles(count) => format!("Too many files: {}", count),
            TooManyDirectories(count) => format!("Too many directories: {}", count),
            Overflow => "Overflow".to_string(),
            UnexpectedEof(offset) => format!("Unexpected end of archive at {:#x}", offset),
        };
        write!(f, "{}", msg)
    }
}

impl error::Error for Error {}
