//! Variable-length records of the name sub-tables.
//!
//! Each record starts with a tag byte: `0` ends the sub-table, `1..=0x7F` is
//! the length of a file name that follows, `0x80` is reserved and carries no
//! payload, and `0x81..=0xFF` is `0x80` plus the length of a subdirectory name,
//! followed by the name and the subdirectory's 16 bit id.
use alloc::vec::Vec;

use crate::{DirectoryId, Error, MAX_NAME_LEN};

const TERMINATOR: u8 = 0x00;
const RESERVED: u8 = 0x80;
const DIRECTORY_FLAG: u8 = 0x80;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Record<'a> {
    /// Names the next file of the directory
    File(&'a [u8]),
    /// Names a subdirectory, whose own entry lives elsewhere in the index
    Directory { name: &'a [u8], id: DirectoryId },
    Reserved,
    Terminator,
}

impl Record<'_> {
    /// Size of this record once encoded
    pub fn encoded_len(&self) -> usize {
        match self {
            Record::File(name) => 1 + name.len(),
            Record::Directory { name, .. } => 1 + name.len() + 2,
            Record::Reserved | Record::Terminator => 1,
        }
    }

    pub fn encode(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        out.reserve(self.encoded_len());
        match *self {
            Record::File(name) => {
                out.push(name_len(name)?);
                out.extend_from_slice(name);
            }
            Record::Directory { name, id } => {
                out.push(name_len(name)? | DIRECTORY_FLAG);
                out.extend_from_slice(name);
                out.extend_from_slice(&id.0.to_le_bytes());
            }
            Record::Reserved => out.push(RESERVED),
            Record::Terminator => out.push(TERMINATOR),
        }
        Ok(())
    }
}

fn name_len(name: &[u8]) -> Result<u8, Error> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(Error::InvalidNameLength(name.len()));
    }
    Ok(name.len() as u8)
}

/// Decodes one sub-table, one record per step. Iteration stops after the
/// terminator (which is not yielded) or after the first error.
#[derive(Clone, Debug)]
pub struct RecordReader<'a> {
    data: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> RecordReader<'a> {
    /// `data` is the FNT chunk body, `offset` a sub-table offset relative to it
    pub fn new(data: &'a [u8], offset: u32) -> Result<RecordReader<'a>, Error> {
        let pos = usize::try_from(offset).map_err(|_| Error::InvalidSubtableOffset(offset))?;
        if pos >= data.len() {
            return Err(Error::InvalidSubtableOffset(offset));
        }
        Ok(RecordReader {
            data,
            pos,
            done: false,
        })
    }

    /// Decode the record at the current position and step past it
    pub fn next_record(&mut self) -> Result<Record<'a>, Error> {
        let start = self.pos;
        let malformed = Error::InvalidFileNameTableEntryId(start);

        let tag = *self.data.get(start).ok_or(malformed.clone())?;
        let (record, len) = match tag {
            TERMINATOR => (Record::Terminator, 1),
            RESERVED => (Record::Reserved, 1),
            1..=0x7F => {
                let name = self.payload(start + 1, usize::from(tag))
                    .ok_or(malformed)?;
                (Record::File(name), 1 + name.len())
            }
            _ => {
                let name_len = usize::from(tag - DIRECTORY_FLAG);
                let name = self.payload(start + 1, name_len)
                    .ok_or(malformed.clone())?;
                let id_bytes = self.payload(start + 1 + name_len, 2)
                    .ok_or(malformed)?;
                let id = u16::from_le_bytes([id_bytes[0], id_bytes[1]]);
                if !DirectoryId::is_directory_id(id) {
                    return Err(Error::InvalidDirectoryLink(id));
                }
                (Record::Directory { name, id: DirectoryId(id) }, 1 + name_len + 2)
            }
        };
        self.pos = start + len;
        Ok(record)
    }

    fn payload(&self, start: usize, len: usize) -> Option<&'a [u8]> {
        self.data.get(start..start.checked_add(len)?)
    }
}

impl<'a> Iterator for RecordReader<'a> {
    type Item = Result<Record<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Record::Terminator) => {
                self.done = true;
                None
            }
            Ok(record) => Some(Ok(record)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
