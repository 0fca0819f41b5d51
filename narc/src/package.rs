use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use narc_core::NarcSrc;

use crate::{wrap_io_err, Error};

/// An archive on disk, read through a buffered file handle
#[derive(Debug)]
pub struct NarcFile {
    path: PathBuf,
    src: BufReader<File>,
}

impl NarcFile {
    pub fn new(path: impl AsRef<Path>) -> Result<NarcFile, Error> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .open(&path)
            .map_err(wrap_io_err!(InvalidInputFile, &path, "Opening archive"))?;
        Ok(NarcFile {
            path,
            src: BufReader::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without its extension, used to name the members of flat
    /// archives
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl NarcSrc for NarcFile {
    type Err = Error;

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, Self::Err> {
        self.src
            .seek(SeekFrom::Start(offset))
            .map_err(wrap_io_err!(InvalidInputFile, &self.path, "Seeking archive"))?;
        self.src
            .read_exact(buf)
            .map_err(wrap_io_err!(InvalidInputFile, &self.path, "Reading archive"))?;
        Ok(buf.len())
    }
}
