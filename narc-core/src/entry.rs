//! Fixed-size table entries of the FAT and FNT chunks
use bytemuck::{Pod, Zeroable};

use crate::FileId;

/// Byte range of one file inside the file images chunk
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C, packed)]
pub struct FatEntry {
    pub start: u32,
    pub end: u32,
}

impl FatEntry {
    pub fn new(start: u32, end: u32) -> FatEntry {
        FatEntry {
            start: start.to_le(),
            end: end.to_le(),
        }
    }

    pub fn start(&self) -> u32 {
        u32::from_le(self.start)
    }

    pub fn end(&self) -> u32 {
        u32::from_le(self.end)
    }

    /// Zero for a malformed range whose end precedes its start
    pub fn len(&self) -> u32 {
        self.end().saturating_sub(self.start())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for FatEntry {
    fn eq(&self, other: &FatEntry) -> bool {
        (self.start(), self.end()) == (other.start(), other.end())
    }
}

/// One directory of the name index
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C, packed)]
pub struct FntEntry {
    /// Offset of this directory's sub-table from the start of the entry array
    pub subtable_offset: u32,
    /// Id of the first file directly inside this directory
    pub first_file_id: u16,
    /// Entry count for the root, parent directory id for everything else
    pub link: u16,
}

impl FntEntry {
    pub fn new(subtable_offset: u32, first_file_id: FileId, link: u16) -> FntEntry {
        FntEntry {
            subtable_offset: subtable_offset.to_le(),
            first_file_id: first_file_id.to_le(),
            link: link.to_le(),
        }
    }

    pub fn subtable_offset(&self) -> u32 {
        u32::from_le(self.subtable_offset)
    }

    pub fn first_file_id(&self) -> FileId {
        u16::from_le(self.first_file_id)
    }

    pub fn link(&self) -> u16 {
        u16::from_le(self.link)
    }
}

impl PartialEq for FntEntry {
    fn eq(&self, other: &FntEntry) -> bool {
        (self.subtable_offset(), self.first_file_id(), self.link())
            == (other.subtable_offset(), other.first_file_id(), other.link())
    }
}
