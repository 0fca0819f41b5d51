use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use narc_core::{linearize, ArchiveMode, Entry, LinearSequence, Tables, PADDING_BYTE};
use regex::bytes::Regex;
use tracing::{debug, trace};

use crate::{read_tree, wrap_io_err, Error, READ_WRITE_BUF_SIZE};

lazy_static! {
    /// Names of files produced by unpacking a flat archive
    static ref FLAT_NAME: Regex =
        Regex::new(r"(?s-u)^.*_[0-9]{8}\.bin$").expect("flat name pattern is valid");
}

/// Where the contents of a file come from at write time
#[derive(Clone, Debug)]
pub enum BuilderSource {
    /// Regular file on the build system
    File(PathBuf),
    Buffer(Vec<u8>),
}

/// Builds a NARC archive from a source tree.
///
/// The tree is fixed when the builder is created; sizes recorded in it are
/// checked again while the contents are copied.
///
/// # Example
/// ```
/// use narc::{BuilderSource, NarcBuilder};
/// use narc_core::Entry;
///
/// let file = |name: &str, data: &[u8]| {
///     Entry::file(name, data.len() as u64, BuilderSource::Buffer(data.to_vec()))
/// };
/// let root = Entry::directory("", vec![
///     file("a.txt", b"xxx"),
///     Entry::directory("sub", vec![file("b.txt", b"yyyyy")]),
/// ]);
///
/// let mut archive = Vec::new();
/// let size = NarcBuilder::new(root).write_archive(&mut archive).unwrap();
/// assert_eq!(size, 108);
/// assert_eq!(&archive[..4], b"NARC");
/// ```
#[derive(Debug)]
pub struct NarcBuilder {
    root: Entry<BuilderSource>,
}

impl NarcBuilder {
    pub fn new(root: Entry<BuilderSource>) -> NarcBuilder {
        NarcBuilder { root }
    }

    /// Walk `dir` and build from everything below it
    pub fn dir(dir: impl AsRef<Path>) -> Result<NarcBuilder, Error> {
        let dir = dir.as_ref();
        debug!(dir = %dir.display(), "Reading source tree");
        Ok(NarcBuilder::new(read_tree(dir)?))
    }

    /// Flat when the first top-level entry looks like an unpacked flat
    /// archive member, `<stem>_<8 digits>.bin`
    pub fn mode(&self) -> ArchiveMode {
        match self.root.children().first() {
            Some(first) if FLAT_NAME.is_match(first.name()) => ArchiveMode::Flat,
            _ => ArchiveMode::Tree,
        }
    }

    /// Number the tree and compute every table. Names and id limits are
    /// checked here, before anything is written.
    pub fn prepare(&self) -> Result<PreparedArchive<'_>, Error> {
        let sequence = linearize(&self.root)?;
        let tables = Tables::build(&sequence, self.mode())?;
        Ok(PreparedArchive { sequence, tables })
    }

    /// Write the whole archive to `w`, returning the number of bytes written
    pub fn write_archive<W: Write>(&self, w: &mut W) -> Result<u64, Error> {
        self.prepare()?.write_archive(w)
    }

    /// Write the archive to a new file at `archive_path`. The file is only
    /// created once the tables are known, and removed again if writing fails.
    pub fn write_file(&self, archive_path: impl AsRef<Path>) -> Result<u64, Error> {
        let archive_path = archive_path.as_ref();
        let prepared = self.prepare()?;

        let archive_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(archive_path)
            .map_err(wrap_io_err!(InvalidOutputFile, archive_path, "Opening archive"))?;
        let mut writer = BufWriter::new(archive_file);
        prepared
            .write_archive(&mut writer)
            .and_then(|size| {
                writer
                    .flush()
                    .map_err(wrap_io_err!(InvalidOutputFile, archive_path, "Writing archive"))?;
                Ok(size)
            })
            .map_err(|err| {
                let _ = fs::remove_file(archive_path);
                err
            })
    }
}

/// A numbered tree and its tables, ready to be written
#[derive(Debug)]
pub struct PreparedArchive<'a> {
    sequence: LinearSequence<'a, BuilderSource>,
    tables: Tables,
}

impl PreparedArchive<'_> {
    /// Write the whole archive to `w`, returning the number of bytes written
    pub fn write_archive<W: Write>(&self, w: &mut W) -> Result<u64, Error> {
        let tables = &self.tables;
        let header = tables.header()?;
        debug!(
            mode = ?tables.mode,
            files = tables.ranges.len(),
            directories = tables.name_index.len(),
            size = header.file_size(),
            "Writing archive"
        );

        let mut writer = CountingWriter::new(w);

        writer.put(bytemuck::bytes_of(&header))?;
        writer.put(bytemuck::bytes_of(&tables.fat_header()?))?;
        writer.put(bytemuck::cast_slice(&tables.ranges))?;

        writer.put(bytemuck::bytes_of(&tables.fnt_header()?))?;
        writer.put(bytemuck::cast_slice(&tables.name_index))?;
        writer.put(&tables.subtables)?;
        writer.pad()?;

        writer.put(bytemuck::bytes_of(&tables.fimg_header()?))?;
        let mut buf = vec![0; READ_WRITE_BUF_SIZE];
        for (id, size, source) in self.sequence.files() {
            writer.pad()?;
            let written = copy_source(source, &mut writer, &mut buf)?;
            if written != size {
                return Err(Error::LengthMismatch {
                    path: source_path(source),
                    actual: written,
                    expected: size,
                });
            }
            trace!(id, size, "file contents");
        }
        writer.pad()?;

        writer
            .flush()
            .map_err(wrap_io_err!(InvalidOutputFile, "Flushing archive"))?;

        let expected = u64::from(header.file_size());
        if writer.count != expected {
            return Err(Error::ArchiveSizeMismatch {
                actual: writer.count,
                expected,
            });
        }
        Ok(writer.count)
    }
}

fn source_path(source: &BuilderSource) -> PathBuf {
    match source {
        BuilderSource::File(path) => path.clone(),
        BuilderSource::Buffer(_) => PathBuf::new(),
    }
}

/// Copy a file's contents into `writer`, keeping read and write failures
/// apart. Returns the number of bytes copied.
fn copy_source<W: Write>(
    source: &BuilderSource,
    writer: &mut W,
    buf: &mut [u8],
) -> Result<u64, Error> {
    match source {
        BuilderSource::File(path) => {
            let mut file =
                File::open(path).map_err(wrap_io_err!(InvalidInputFile, path, "Opening source"))?;
            let mut total = 0;
            loop {
                let count = match file.read(buf) {
                    Ok(0) => break,
                    Ok(count) => count,
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                    Err(err) => Err(err)
                        .map_err(wrap_io_err!(InvalidInputFile, path, "Reading source"))?,
                };
                writer
                    .write_all(&buf[..count])
                    .map_err(wrap_io_err!(InvalidOutputFile, "Writing file contents"))?;
                total += count as u64;
            }
            Ok(total)
        }
        BuilderSource::Buffer(data) => {
            writer
                .write_all(data)
                .map_err(wrap_io_err!(InvalidOutputFile, "Writing file contents"))?;
            Ok(data.len() as u64)
        }
    }
}

struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> CountingWriter<W> {
        CountingWriter { inner, count: 0 }
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.write_all(bytes)
            .map_err(wrap_io_err!(InvalidOutputFile, "Writing archive"))
    }

    /// Fill up to the next 4-byte boundary
    fn pad(&mut self) -> Result<(), Error> {
        let len = (4 - (self.count % 4) as usize) % 4;
        self.put(&[PADDING_BYTE; 3][..len])
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let count = self.inner.write(buf)?;
        self.count += count as u64;
        Ok(count)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
