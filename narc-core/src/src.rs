use alloc::vec;
use alloc::vec::Vec;

use bytemuck::{Pod, Zeroable};

use crate::{
    ChunkHeader, Error, FatEntry, FatHeader, FileId, FntEntry, Header, CHUNK_HEADER_SIZE,
    FAT_ENTRY_SIZE, FAT_HEADER_SIZE, FNT_ENTRY_SIZE, FNT_FLAT_SIZE,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArchiveMode {
    /// No names; files are numbered only
    Flat,
    /// Hierarchical names in the FNT chunk
    Tree,
}

/// Validated chunk headers and tables of an archive
#[derive(Clone, Debug)]
pub struct ArchiveLayout {
    pub header: Header,
    pub fat: FatHeader,
    pub ranges: Vec<FatEntry>,
    pub fnt: ChunkHeader,
    /// FNT chunk body: the name index followed by the sub-tables. Sub-table
    /// offsets are relative to its start.
    pub fnt_data: Vec<u8>,
    /// Only the root entry in flat mode
    pub name_index: Vec<FntEntry>,
    pub fimg: ChunkHeader,
    pub mode: ArchiveMode,
}

impl ArchiveLayout {
    pub fn fat_offset(&self) -> u64 {
        u64::from(self.header.header_size())
    }

    pub fn fnt_offset(&self) -> u64 {
        self.fat_offset() + u64::from(self.fat.chunk_size())
    }

    pub fn fimg_offset(&self) -> u64 {
        self.fnt_offset() + u64::from(self.fnt.chunk_size())
    }

    /// Offset of the first byte of file contents
    pub fn content_offset(&self) -> u64 {
        self.fimg_offset() + CHUNK_HEADER_SIZE as u64
    }

    pub fn range(&self, id: FileId) -> Result<FatEntry, Error> {
        self.ranges
            .get(usize::from(id))
            .copied()
            .ok_or(Error::InvalidFileId(u32::from(id)))
    }
}

/// Random-access source of an archive
pub trait NarcSrc {
    type Err: From<Error>;

    /// Fill all of `buf` with the bytes at `offset`. Running out of data is an
    /// error rather than a short read.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, Self::Err>;

    fn read_pod<P: Pod>(&mut self, offset: u64) -> Result<P, Self::Err> {
        let mut value = P::zeroed();
        self.read_at(offset, bytemuck::bytes_of_mut(&mut value))?;
        Ok(value)
    }

    /// Read and validate every chunk header, the file ranges and the name
    /// index. Checks run in archive order and stop at the first failure.
    fn read_layout(&mut self) -> Result<ArchiveLayout, Self::Err> {
        let header: Header = self.read_pod(0)?;
        header.validate()?;
        let fat_offset = u64::from(header.header_size());

        let fat: FatHeader = self.read_pod(fat_offset)?;
        fat.validate()?;
        let file_count = usize::from(fat.file_count());
        let ranges_size = file_count * FAT_ENTRY_SIZE;
        if (fat.chunk_size() as usize) < FAT_HEADER_SIZE + ranges_size {
            return Err(Error::InvalidChunkSize(fat.chunk_size()).into());
        }
        let mut ranges = vec![FatEntry::zeroed(); file_count];
        self.read_at(
            fat_offset + FAT_HEADER_SIZE as u64,
            bytemuck::cast_slice_mut(&mut ranges),
        )?;

        let fnt_offset = fat_offset + u64::from(fat.chunk_size());
        let fnt: ChunkHeader = self.read_pod(fnt_offset)?;
        fnt.validate_fnt()?;
        // Room for at least the root entry
        let fnt_data_size = (fnt.chunk_size() as usize)
            .checked_sub(CHUNK_HEADER_SIZE)
            .filter(|size| *size >= FNT_ENTRY_SIZE)
            .ok_or(Error::InvalidChunkSize(fnt.chunk_size()))?;

        let fimg_offset = fnt_offset + u64::from(fnt.chunk_size());
        let fimg: ChunkHeader = self.read_pod(fimg_offset)?;
        fimg.validate_fimg()?;
        let content_size = fimg
            .chunk_size()
            .checked_sub(CHUNK_HEADER_SIZE as u32)
            .ok_or(Error::InvalidChunkSize(fimg.chunk_size()))?;
        for (id, range) in ranges.iter().enumerate() {
            if range.start() > range.end() || range.end() > content_size {
                return Err(Error::InvalidFileRange(id as FileId).into());
            }
        }

        let mut fnt_data = vec![0; fnt_data_size];
        self.read_at(fnt_offset + CHUNK_HEADER_SIZE as u64, &mut fnt_data)?;

        let mode = if fnt.chunk_size() == FNT_FLAT_SIZE {
            ArchiveMode::Flat
        } else {
            ArchiveMode::Tree
        };
        let name_index = match mode {
            ArchiveMode::Flat => vec![bytemuck::pod_read_unaligned(&fnt_data[..FNT_ENTRY_SIZE])],
            ArchiveMode::Tree => read_name_index(&fnt_data)?,
        };

        Ok(ArchiveLayout {
            header,
            fat,
            ranges,
            fnt,
            fnt_data,
            name_index,
            fimg,
            mode,
        })
    }

    /// Read the contents of one file
    fn read_file(&mut self, layout: &ArchiveLayout, id: FileId) -> Result<Vec<u8>, Self::Err> {
        let range = layout.range(id)?;
        let mut data = vec![0; range.len() as usize];
        self.read_at(layout.content_offset() + u64::from(range.start()), &mut data)?;
        Ok(data)
    }
}

/// The entry array has no count of its own: entries are read until the
/// position reaches the first sub-table, which the root entry points at.
fn read_name_index(fnt_data: &[u8]) -> Result<Vec<FntEntry>, Error> {
    let root: FntEntry = bytemuck::pod_read_unaligned(&fnt_data[..FNT_ENTRY_SIZE]);
    let offset = root.subtable_offset();
    let count = (offset as usize).div_ceil(FNT_ENTRY_SIZE).max(1);
    let entries = count
        .checked_mul(FNT_ENTRY_SIZE)
        .and_then(|size| fnt_data.get(..size))
        .ok_or(Error::InvalidSubtableOffset(offset))?;
    Ok(entries
        .chunks_exact(FNT_ENTRY_SIZE)
        .map(bytemuck::pod_read_unaligned)
        .collect())
}

impl<T: AsRef<[u8]>> NarcSrc for T {
    type Err = Error;

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, Error> {
        let data = self.as_ref();
        let start = usize::try_from(offset).map_err(|_| Error::Overflow)?;
        let end = start.checked_add(buf.len()).ok_or(Error::Overflow)?;
        let src = data.get(start..end).ok_or(Error::UnexpectedEof(offset))?;
        buf.copy_from_slice(src);
        Ok(buf.len())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::{linearize, Entry, Tables};

    /// Serialize `tables` the way an archive writer does, with `0xAB` filling
    /// every file
    fn archive(tables: &Tables) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(bytemuck::bytes_of(&tables.header().unwrap()));
        out.extend_from_slice(bytemuck::bytes_of(&tables.fat_header().unwrap()));
        out.extend_from_slice(bytemuck::cast_slice(&tables.ranges));
        out.extend_from_slice(bytemuck::bytes_of(&tables.fnt_header().unwrap()));
        out.extend_from_slice(bytemuck::cast_slice(&tables.name_index));
        out.extend_from_slice(&tables.subtables);
        out.resize(out.len().next_multiple_of(4), 0xFF);
        out.extend_from_slice(bytemuck::bytes_of(&tables.fimg_header().unwrap()));
        for range in &tables.ranges {
            out.resize(out.len().next_multiple_of(4), 0xFF);
            out.resize(out.len() + range.len() as usize, 0xAB);
        }
        out.resize(out.len().next_multiple_of(4), 0xFF);
        out
    }

    fn scenario(mode: ArchiveMode) -> Vec<u8> {
        let root = Entry::directory(
            "",
            vec![
                Entry::file("a.txt", 3, ()),
                Entry::directory("sub", vec![Entry::file("b.txt", 5, ())]),
            ],
        );
        let sequence = linearize(&root).unwrap();
        archive(&Tables::build(&sequence, mode).unwrap())
    }

    #[test]
    fn reads_tree_layout() {
        let data = scenario(ArchiveMode::Tree);
        assert_eq!(data.len(), 108);

        let layout = (&data[..]).read_layout().unwrap();
        assert_eq!(layout.mode, ArchiveMode::Tree);
        assert_eq!(layout.ranges, vec![FatEntry::new(0, 3), FatEntry::new(4, 9)]);
        assert_eq!(
            layout.name_index,
            vec![FntEntry::new(16, 0, 2), FntEntry::new(29, 1, 0xF000)]
        );
        assert_eq!(layout.fnt_data.len(), 36);
        assert_eq!(layout.content_offset(), 16 + 28 + 44 + 8);
    }

    #[test]
    fn reads_flat_layout() {
        let data = scenario(ArchiveMode::Flat);
        let layout = (&data[..]).read_layout().unwrap();
        assert_eq!(layout.mode, ArchiveMode::Flat);
        assert_eq!(layout.name_index, vec![FntEntry::new(4, 0, 1)]);
        assert_eq!(layout.ranges.len(), 2);
    }

    #[test]
    fn reads_file_contents() {
        let mut data = scenario(ArchiveMode::Tree);
        let layout = data.read_layout().unwrap();
        assert_eq!(data.read_file(&layout, 1).unwrap(), vec![0xAB; 5]);
        assert_eq!(
            data.read_file(&layout, 2).unwrap_err(),
            Error::InvalidFileId(2)
        );
    }

    fn poke(data: &mut [u8], offset: usize, bytes: &[u8]) {
        data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    #[test]
    fn each_mutation_has_its_own_error() {
        let cases: [(usize, &[u8], Error); 9] = [
            (0, b"CRAN", Error::InvalidHeaderId(0x4E41_5243)),
            (4, &[0xFF, 0xFE], Error::InvalidByteOrderMark(0xFEFF)),
            (6, &[0x00, 0x02], Error::InvalidVersion(0x0200)),
            (12, &[0x20, 0x00], Error::InvalidHeaderSize(0x20)),
            (14, &[0x04, 0x00], Error::InvalidChunkCount(4)),
            (16, b"XXXX", Error::InvalidFileAllocationTableId(0x5858_5858)),
            (26, &[0x01, 0x00], Error::InvalidFileAllocationTableReserved(1)),
            (44, b"XXXX", Error::InvalidFileNameTableId(0x5858_5858)),
            (88, b"XXXX", Error::InvalidFileImagesId(0x5858_5858)),
        ];
        for (offset, bytes, expected) in cases {
            let mut data = scenario(ArchiveMode::Tree);
            poke(&mut data, offset, bytes);
            assert_eq!((&data[..]).read_layout().unwrap_err(), expected);
        }
    }

    #[test]
    fn legacy_version_is_accepted() {
        let mut data = scenario(ArchiveMode::Tree);
        poke(&mut data, 6, &[0x00, 0x00]);
        assert!((&data[..]).read_layout().is_ok());
    }

    #[test]
    fn out_of_bounds_ranges_are_rejected() {
        let mut data = scenario(ArchiveMode::Tree);
        // second range ends past the file images
        poke(&mut data, 40, &21u32.to_le_bytes());
        assert_eq!(
            (&data[..]).read_layout().unwrap_err(),
            Error::InvalidFileRange(1)
        );
    }

    #[test]
    fn root_offset_bounds_the_name_index() {
        let mut data = scenario(ArchiveMode::Tree);
        poke(&mut data, 52, &0x400u32.to_le_bytes());
        assert_eq!(
            (&data[..]).read_layout().unwrap_err(),
            Error::InvalidSubtableOffset(0x400)
        );
    }

    #[test]
    fn truncated_archive_is_rejected() {
        let data = scenario(ArchiveMode::Tree);
        assert_eq!(
            (&data[..60]).read_layout().unwrap_err(),
            Error::UnexpectedEof(88)
        );
    }
}
