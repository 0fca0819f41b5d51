use std::path::{Path, PathBuf};

use narc_core::NarcSrc;
use tracing::info;

use crate::{extract_plan, extract_to, Error, NarcBuilder, NarcFile};

/// Pack everything below `folder` into a new archive at `archive_path`
pub fn create(archive_path: impl AsRef<Path>, folder: impl AsRef<Path>) -> Result<(), Error> {
    let archive_path = archive_path.as_ref();
    let size = NarcBuilder::dir(folder)?.write_file(archive_path)?;

    info!(archive = %archive_path.display(), size, "Packed");
    Ok(())
}

/// Unpack the archive at `archive_path` below `base_dir`
pub fn extract(archive_path: impl AsRef<Path>, base_dir: impl AsRef<Path>) -> Result<(), Error> {
    let base_dir = base_dir.as_ref();
    let mut archive = NarcFile::new(archive_path)?;
    let layout = archive.read_layout()?;
    let stem = archive.stem();
    extract_to(&mut archive, &layout, &stem, base_dir)?;

    info!(archive = %archive.path().display(), dir = %base_dir.display(), "Unpacked");
    Ok(())
}

/// Relative path of every file the archive would unpack to, in file id
/// order within each directory
pub fn archive_paths(archive_path: impl AsRef<Path>) -> Result<Vec<PathBuf>, Error> {
    let mut archive = NarcFile::new(archive_path)?;
    let layout = archive.read_layout()?;
    Ok(extract_plan(&layout, &archive.stem())?
        .into_iter()
        .flat_map(|directory| directory.files)
        .map(|file| file.path)
        .collect())
}

pub fn list(archive_path: impl AsRef<Path>) -> Result<(), Error> {
    for path in archive_paths(archive_path)? {
        println!("{}", path.display());
    }
    Ok(())
}
