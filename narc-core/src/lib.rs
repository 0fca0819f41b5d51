#![no_std]
extern crate alloc;

use core::mem;

pub use crate::entry::{FatEntry, FntEntry};
pub use crate::error::Error;
pub use crate::header::{ChunkHeader, FatHeader, Header};
pub use crate::names::{plan, DirectoryPlan, NameTable, PlannedFile};
pub use crate::record::{Record, RecordReader};
pub use crate::src::{ArchiveLayout, ArchiveMode, NarcSrc};
pub use crate::table::{align4, Tables};
pub use crate::tree::{linearize, DirectoryBlock, Entry, EntryKind, LinearEntry, LinearKind, LinearSequence};

mod entry;
mod error;
mod header;
mod names;
mod record;
mod src;
mod table;
mod tree;

pub const HEADER_SIZE: usize = mem::size_of::<Header>();
pub const FAT_HEADER_SIZE: usize = mem::size_of::<FatHeader>();
pub const CHUNK_HEADER_SIZE: usize = mem::size_of::<ChunkHeader>();
pub const FAT_ENTRY_SIZE: usize = mem::size_of::<FatEntry>();
pub const FNT_ENTRY_SIZE: usize = mem::size_of::<FntEntry>();

pub const HEADER_ID: u32 = 0x4352_414E;
pub const FAT_ID: u32 = 0x4641_5442;
pub const FNT_ID: u32 = 0x464E_5442;
pub const FIMG_ID: u32 = 0x4649_4D47;

pub const BYTE_ORDER_MARK: u16 = 0xFFFE;
pub const VERSION: u16 = 0x0100;
/// Older archives carry a zero version and are otherwise identical
pub const VERSION_LEGACY: u16 = 0x0000;
pub const CHUNK_COUNT: u16 = 3;

/// Size of an FNT chunk holding only the flat-mode root record
pub const FNT_FLAT_SIZE: u32 = (CHUNK_HEADER_SIZE + FNT_ENTRY_SIZE) as u32;

/// Filler for chunk tails and the gaps between file images
pub const PADDING_BYTE: u8 = 0xFF;

/// Longest name a sub-table record can hold
pub const MAX_NAME_LEN: usize = 0x7F;

/// Identifier of a file, in linearization order
pub type FileId = u16;

/// Identifier of a directory. The root is always `0xF000`; the n-th
/// directory in pre-order is `0xF000 + n`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DirectoryId(pub u16);

impl DirectoryId {
    pub const ROOT: DirectoryId = DirectoryId(0xF000);

    /// Largest number of directories (root included) the id space can name
    pub const MAX_COUNT: usize = 0x1000;

    pub fn from_index(index: usize) -> Result<DirectoryId, Error> {
        if index >= Self::MAX_COUNT {
            return Err(Error::TooManyDirectories(index + 1));
        }
        Ok(DirectoryId(Self::ROOT.0 + index as u16))
    }

    /// Position of this directory in the name index
    pub fn index(self) -> usize {
        usize::from(self.0 - Self::ROOT.0)
    }

    pub fn is_directory_id(value: u16) -> bool {
        value >= Self::ROOT.0
    }
}
