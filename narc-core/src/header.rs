//! The packed structs represent the on-disk format of NARC chunk headers.
//! All fields are little-endian; use the accessors rather than the raw fields.

use bytemuck::{Pod, Zeroable};

use crate::{
    Error, BYTE_ORDER_MARK, CHUNK_COUNT, FAT_ID, FIMG_ID, FNT_ID, HEADER_ID, HEADER_SIZE,
    VERSION, VERSION_LEGACY,
};

#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C, packed)]
pub struct Header {
    pub id: u32,
    pub byte_order_mark: u16,
    pub version: u16,
    /// Size of the whole archive, header included
    pub file_size: u32,
    /// Size of this header, always 0x10
    pub header_size: u16,
    pub chunk_count: u16,
}

impl Header {
    pub fn new(file_size: u32) -> Header {
        Header {
            id: HEADER_ID.to_le(),
            byte_order_mark: BYTE_ORDER_MARK.to_le(),
            version: VERSION.to_le(),
            file_size: file_size.to_le(),
            header_size: (HEADER_SIZE as u16).to_le(),
            chunk_count: CHUNK_COUNT.to_le(),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.id() != HEADER_ID {
            return Err(Error::InvalidHeaderId(self.id()));
        }
        if self.byte_order_mark() != BYTE_ORDER_MARK {
            return Err(Error::InvalidByteOrderMark(self.byte_order_mark()));
        }
        if self.version() != VERSION && self.version() != VERSION_LEGACY {
            return Err(Error::InvalidVersion(self.version()));
        }
        if usize::from(self.header_size()) != HEADER_SIZE {
            return Err(Error::InvalidHeaderSize(self.header_size()));
        }
        if self.chunk_count() != CHUNK_COUNT {
            return Err(Error::InvalidChunkCount(self.chunk_count()));
        }
        Ok(())
    }

    pub fn id(&self) -> u32 {
        u32::from_le(self.id)
    }

    pub fn byte_order_mark(&self) -> u16 {
        u16::from_le(self.byte_order_mark)
    }

    pub fn version(&self) -> u16 {
        u16::from_le(self.version)
    }

    pub fn file_size(&self) -> u32 {
        u32::from_le(self.file_size)
    }

    pub fn header_size(&self) -> u16 {
        u16::from_le(self.header_size)
    }

    pub fn chunk_count(&self) -> u16 {
        u16::from_le(self.chunk_count)
    }
}

/// Head of the file allocation table, followed by `file_count` entries
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C, packed)]
pub struct FatHeader {
    pub id: u32,
    pub chunk_size: u32,
    pub file_count: u16,
    pub reserved: u16,
}

impl FatHeader {
    pub fn new(chunk_size: u32, file_count: u16) -> FatHeader {
        FatHeader {
            id: FAT_ID.to_le(),
            chunk_size: chunk_size.to_le(),
            file_count: file_count.to_le(),
            reserved: 0,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.id() != FAT_ID {
            return Err(Error::InvalidFileAllocationTableId(self.id()));
        }
        if self.reserved() != 0 {
            return Err(Error::InvalidFileAllocationTableReserved(self.reserved()));
        }
        Ok(())
    }

    pub fn id(&self) -> u32 {
        u32::from_le(self.id)
    }

    pub fn chunk_size(&self) -> u32 {
        u32::from_le(self.chunk_size)
    }

    pub fn file_count(&self) -> u16 {
        u16::from_le(self.file_count)
    }

    pub fn reserved(&self) -> u16 {
        u16::from_le(self.reserved)
    }
}

/// Tag and self-inclusive size shared by the FNT and FIMG chunks
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C, packed)]
pub struct ChunkHeader {
    pub id: u32,
    pub chunk_size: u32,
}

impl ChunkHeader {
    pub fn fnt(chunk_size: u32) -> ChunkHeader {
        ChunkHeader {
            id: FNT_ID.to_le(),
            chunk_size: chunk_size.to_le(),
        }
    }

    pub fn fimg(chunk_size: u32) -> ChunkHeader {
        ChunkHeader {
            id: FIMG_ID.to_le(),
            chunk_size: chunk_size.to_le(),
        }
    }

    pub fn validate_fnt(&self) -> Result<(), Error> {
        if self.id() != FNT_ID {
            return Err(Error::InvalidFileNameTableId(self.id()));
        }
        Ok(())
    }

    pub fn validate_fimg(&self) -> Result<(), Error> {
        if self.id() != FIMG_ID {
            return Err(Error::InvalidFileImagesId(self.id()));
        }
        Ok(())
    }

    pub fn id(&self) -> u32 {
        u32::from_le(self.id)
    }

    pub fn chunk_size(&self) -> u32 {
        u32::from_le(self.chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips_through_bytes() {
        let header = Header::new(108);
        let parsed: Header = bytemuck::pod_read_unaligned(bytemuck::bytes_of(&header));
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.file_size(), 108);
        assert_eq!(parsed.version(), VERSION);
        assert_eq!(
            bytemuck::bytes_of(&header)[..8],
            [b'N', b'A', b'R', b'C', 0xFE, 0xFF, 0x00, 0x01]
        );
    }

    #[test]
    fn header_accepts_legacy_version() {
        let mut header = Header::new(0);
        header.version = VERSION_LEGACY.to_le();
        assert!(header.validate().is_ok());
    }

    #[test]
    fn header_checks_run_in_order() {
        let mut header = Header::new(0);
        header.chunk_count = 2u16.to_le();
        header.byte_order_mark = 0xFEFFu16.to_le();
        assert_eq!(header.validate(), Err(Error::InvalidByteOrderMark(0xFEFF)));

        header.byte_order_mark = BYTE_ORDER_MARK.to_le();
        assert_eq!(header.validate(), Err(Error::InvalidChunkCount(2)));
    }

    #[test]
    fn fat_reserved_must_be_zero() {
        let mut fat = FatHeader::new(12, 0);
        assert!(fat.validate().is_ok());
        fat.reserved = 1u16.to_le();
        assert_eq!(
            fat.validate(),
            Err(Error::InvalidFileAllocationTableReserved(1))
        );
    }
}
