//! Turning a validated archive layout into files and directories.
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use narc_core::{plan, ArchiveLayout, ArchiveMode, FatEntry, FileId, NarcSrc};
use tracing::{debug, trace};

use crate::ext::NameExt;
use crate::{wrap_io_err, Error, READ_WRITE_BUF_SIZE};

#[derive(Clone, Debug, PartialEq)]
pub struct ExtractFile {
    pub id: FileId,
    /// Relative to the output directory
    pub path: PathBuf,
    pub range: FatEntry,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExtractDirectory {
    /// Relative to the output directory; empty for the output directory
    /// itself
    pub path: PathBuf,
    pub files: Vec<ExtractFile>,
}

/// Every directory and file an archive unpacks to, in creation order.
/// Building this touches nothing on disk, so a bad archive is rejected before
/// any output exists.
pub fn extract_plan(layout: &ArchiveLayout, stem: &str) -> Result<Vec<ExtractDirectory>, Error> {
    match layout.mode {
        ArchiveMode::Flat => {
            let files = layout
                .ranges
                .iter()
                .enumerate()
                .map(|(id, range)| ExtractFile {
                    id: id as FileId,
                    path: PathBuf::from(format!("{}_{:08}.bin", stem, id)),
                    range: *range,
                })
                .collect();
            Ok(vec![ExtractDirectory {
                path: PathBuf::new(),
                files,
            }])
        }
        ArchiveMode::Tree => {
            let mut directories = Vec::new();
            for dir_plan in plan(layout)? {
                let mut path = PathBuf::new();
                for component in &dir_plan.path {
                    path.push(component.check_component()?);
                }

                let mut files = Vec::with_capacity(dir_plan.files.len());
                for file in &dir_plan.files {
                    files.push(ExtractFile {
                        id: file.id,
                        path: path.join(file.name.check_component()?),
                        range: file.range,
                    });
                }
                directories.push(ExtractDirectory { path, files });
            }
            Ok(directories)
        }
    }
}

/// Unpack every file of `src` below `base_dir`, creating it if needed
pub fn extract_to<S>(
    src: &mut S,
    layout: &ArchiveLayout,
    stem: &str,
    base_dir: &Path,
) -> Result<(), Error>
where
    S: NarcSrc,
    Error: From<S::Err>,
{
    let directories = extract_plan(layout, stem)?;
    debug!(
        mode = ?layout.mode,
        directories = directories.len(),
        files = layout.ranges.len(),
        "Extracting archive"
    );

    let mut buf = vec![0; READ_WRITE_BUF_SIZE];
    for directory in &directories {
        let dir_path = if directory.path.as_os_str().is_empty() {
            base_dir.to_path_buf()
        } else {
            base_dir.join(&directory.path)
        };
        fs::create_dir_all(&dir_path)
            .map_err(wrap_io_err!(InvalidOutputFile, &dir_path, "Creating directory"))?;

        for file in &directory.files {
            let path = base_dir.join(&file.path);
            trace!(id = file.id, path = %path.display(), size = file.range.len(), "file");
            copy_range(src, layout, file.range, &path, &mut buf)?;
        }
    }
    Ok(())
}

fn copy_range<S>(
    src: &mut S,
    layout: &ArchiveLayout,
    range: FatEntry,
    path: &Path,
    buf: &mut [u8],
) -> Result<(), Error>
where
    S: NarcSrc,
    Error: From<S::Err>,
{
    let mut output =
        File::create(path).map_err(wrap_io_err!(InvalidOutputFile, path, "Creating file"))?;

    let mut offset = layout.content_offset() + u64::from(range.start());
    let mut remaining = range.len() as usize;
    while remaining > 0 {
        let count = remaining.min(buf.len());
        src.read_at(offset, &mut buf[..count])?;
        output
            .write_all(&buf[..count])
            .map_err(wrap_io_err!(InvalidOutputFile, path, "Writing file"))?;
        offset += count as u64;
        remaining -= count;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use narc_core::Entry;

    use super::*;
    use crate::{BuilderSource, NarcBuilder};

    fn archive(root: Entry<BuilderSource>) -> Vec<u8> {
        let mut data = Vec::new();
        NarcBuilder::new(root).write_archive(&mut data).unwrap();
        data
    }

    fn file(name: &str, data: &[u8]) -> Entry<BuilderSource> {
        Entry::file(name, data.len() as u64, BuilderSource::Buffer(data.to_vec()))
    }

    #[test]
    fn plans_nested_paths() {
        let mut data = archive(Entry::directory(
            "",
            vec![
                file("a.txt", b"xxx"),
                Entry::directory(
                    "sub",
                    vec![file("b.txt", b"yyyyy"), Entry::directory("empty", vec![])],
                ),
            ],
        ));
        let layout = data.read_layout().unwrap();
        let plan = extract_plan(&layout, "unused").unwrap();

        let dirs: Vec<&Path> = plan.iter().map(|dir| dir.path.as_path()).collect();
        assert_eq!(dirs, vec![Path::new(""), Path::new("sub"), Path::new("sub/empty")]);

        assert_eq!(plan[0].files.len(), 1);
        assert_eq!(plan[0].files[0].path, PathBuf::from("a.txt"));
        assert_eq!(plan[0].files[0].range, FatEntry::new(0, 3));
        assert_eq!(plan[1].files[0].path, PathBuf::from("sub/b.txt"));
        assert_eq!(plan[1].files[0].id, 1);
        assert!(plan[2].files.is_empty());
    }

    #[test]
    fn plans_flat_names_from_stem() {
        let mut data = archive(Entry::directory(
            "",
            vec![file("x_00000000.bin", b"a"), file("x_00000001.bin", b"b")],
        ));
        let layout = data.read_layout().unwrap();
        assert_eq!(layout.mode, ArchiveMode::Flat);

        let plan = extract_plan(&layout, "pokemon").unwrap();
        let names: Vec<&Path> = plan[0].files.iter().map(|file| file.path.as_path()).collect();
        assert_eq!(
            names,
            vec![Path::new("pokemon_00000000.bin"), Path::new("pokemon_00000001.bin")]
        );
    }

    #[test]
    fn traversal_names_are_rejected() {
        // Packing accepts any byte string as a name
        let mut data = archive(Entry::directory("", vec![file("..", b"evil")]));
        let layout = data.read_layout().unwrap();
        assert!(matches!(
            extract_plan(&layout, "stem"),
            Err(Error::InvalidPath { .. })
        ));
    }
}
