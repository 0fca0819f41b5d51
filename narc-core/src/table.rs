use alloc::vec;
use alloc::vec::Vec;

use crate::{
    ArchiveMode, ChunkHeader, DirectoryId, Error, FatEntry, FatHeader, FntEntry, Header,
    LinearKind, LinearSequence, Record, CHUNK_HEADER_SIZE, FAT_ENTRY_SIZE, FAT_HEADER_SIZE,
    FNT_ENTRY_SIZE, FNT_FLAT_SIZE, HEADER_SIZE,
};

/// Round `value` up to the next multiple of 4
pub fn align4(value: u32) -> Result<u32, Error> {
    value
        .checked_add(3)
        .map(|value| value & !3)
        .ok_or(Error::Overflow)
}

/// Everything an archive holds besides the file contents, computed from
/// sizes and positions alone.
#[derive(Clone, Debug)]
pub struct Tables {
    pub mode: ArchiveMode,
    /// One range per file, in file id order
    pub ranges: Vec<FatEntry>,
    /// One entry per directory, in directory id order
    pub name_index: Vec<FntEntry>,
    /// Concatenated sub-tables, each with its terminator
    pub subtables: Vec<u8>,
}

impl Tables {
    pub fn build<T>(sequence: &LinearSequence<'_, T>, mode: ArchiveMode) -> Result<Tables, Error> {
        let ranges = Self::ranges(sequence)?;
        let (name_index, subtables) = match mode {
            ArchiveMode::Flat => (vec![FntEntry::new(4, 0, 1)], Vec::new()),
            ArchiveMode::Tree => Self::names(sequence)?,
        };
        Ok(Tables {
            mode,
            ranges,
            name_index,
            subtables,
        })
    }

    fn ranges<T>(sequence: &LinearSequence<'_, T>) -> Result<Vec<FatEntry>, Error> {
        let mut ranges = Vec::with_capacity(sequence.file_count());
        let mut end = 0;
        for (_id, size, _source) in sequence.files() {
            let start = align4(end)?;
            let size = u32::try_from(size).map_err(|_| Error::Overflow)?;
            end = start.checked_add(size).ok_or(Error::Overflow)?;
            ranges.push(FatEntry::new(start, end));
        }
        Ok(ranges)
    }

    fn names<T>(sequence: &LinearSequence<'_, T>) -> Result<(Vec<FntEntry>, Vec<u8>), Error> {
        let blocks = sequence.blocks();
        let entries_size = blocks.len() * FNT_ENTRY_SIZE;
        // Root link carries the entry count instead of a parent
        let count = u16::try_from(blocks.len()).map_err(|_| Error::TooManyDirectories(blocks.len()))?;

        let mut name_index = Vec::with_capacity(blocks.len());
        let mut subtables = Vec::new();
        for block in blocks {
            let offset = u32::try_from(entries_size + subtables.len())
                .map_err(|_| Error::Overflow)?;
            let link = match block.parent {
                Some(DirectoryId(parent)) => parent,
                None => count,
            };
            name_index.push(FntEntry::new(offset, block.first_file_id, link));

            for entry in &block.entries {
                let record = match entry.kind {
                    LinearKind::File { .. } => Record::File(entry.name),
                    LinearKind::Directory { id } => Record::Directory {
                        name: entry.name,
                        id,
                    },
                };
                record.encode(&mut subtables)?;
            }
            Record::Terminator.encode(&mut subtables)?;
        }
        Ok((name_index, subtables))
    }

    pub fn file_count(&self) -> Result<u16, Error> {
        u16::try_from(self.ranges.len()).map_err(|_| Error::TooManyFiles(self.ranges.len()))
    }

    /// Bytes of file contents, padding between files included
    pub fn content_size(&self) -> Result<u32, Error> {
        align4(self.ranges.last().map_or(0, FatEntry::end))
    }

    pub fn fat_size(&self) -> Result<u32, Error> {
        let size = FAT_HEADER_SIZE + self.ranges.len() * FAT_ENTRY_SIZE;
        u32::try_from(size).map_err(|_| Error::Overflow)
    }

    pub fn fnt_size(&self) -> Result<u32, Error> {
        match self.mode {
            ArchiveMode::Flat => Ok(FNT_FLAT_SIZE),
            ArchiveMode::Tree => {
                let size =
                    CHUNK_HEADER_SIZE + self.name_index.len() * FNT_ENTRY_SIZE + self.subtables.len();
                align4(u32::try_from(size).map_err(|_| Error::Overflow)?)
            }
        }
    }

    pub fn fimg_size(&self) -> Result<u32, Error> {
        self.content_size()?
            .checked_add(CHUNK_HEADER_SIZE as u32)
            .ok_or(Error::Overflow)
    }

    /// Size of the whole archive
    pub fn file_size(&self) -> Result<u32, Error> {
        [self.fat_size()?, self.fnt_size()?, self.fimg_size()?]
            .iter()
            .try_fold(HEADER_SIZE as u32, |total, size| total.checked_add(*size))
            .ok_or(Error::Overflow)
    }

    pub fn header(&self) -> Result<Header, Error> {
        Ok(Header::new(self.file_size()?))
    }

    pub fn fat_header(&self) -> Result<FatHeader, Error> {
        Ok(FatHeader::new(self.fat_size()?, self.file_count()?))
    }

    pub fn fnt_header(&self) -> Result<ChunkHeader, Error> {
        Ok(ChunkHeader::fnt(self.fnt_size()?))
    }

    pub fn fimg_header(&self) -> Result<ChunkHeader, Error> {
        Ok(ChunkHeader::fimg(self.fimg_size()?))
    }
}
