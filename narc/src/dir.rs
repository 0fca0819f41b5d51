use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use narc_core::Entry;
use tracing::trace;

use crate::{wrap_io_err, BuilderSource, Error};

/// Walk `dir` into a source tree. The root entry has an empty name; every
/// other entry is named after its file name. Symlinks are followed; anything
/// that is neither a regular file nor a directory is refused.
pub fn read_tree(dir: impl AsRef<Path>) -> Result<Entry<BuilderSource>, Error> {
    let dir = dir.as_ref();
    Ok(Entry::directory(Vec::new(), read_children(dir)?))
}

fn read_children(dir: &Path) -> Result<Vec<Entry<BuilderSource>>, Error> {
    let read_dir =
        fs::read_dir(dir).map_err(wrap_io_err!(InvalidInputFile, dir, "Reading directory"))?;

    let mut children = Vec::new();
    for entry_result in read_dir {
        let entry = entry_result
            .map_err(wrap_io_err!(InvalidInputFile, dir, "Reading directory entry"))?;
        let path = entry.path();
        let metadata =
            fs::metadata(&path).map_err(wrap_io_err!(InvalidInputFile, &path, "Inspecting entry"))?;
        let name = entry.file_name().as_bytes().to_vec();

        if metadata.is_dir() {
            trace!(path = %path.display(), "directory");
            children.push(Entry::directory(name, read_children(&path)?));
        } else if metadata.is_file() {
            trace!(path = %path.display(), size = metadata.len(), "file");
            children.push(Entry::file(name, metadata.len(), BuilderSource::File(path)));
        } else {
            return Err(Error::InvalidInputFile {
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "not a regular file or directory",
                ),
                path: Some(path),
                context: "Unsupported file type",
            });
        }
    }
    Ok(children)
}
