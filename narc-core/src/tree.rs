//! Source trees and their linearization into directory blocks.
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::{DirectoryId, Error, FileId, MAX_NAME_LEN};

/// One file or directory of a source tree. `T` is whatever the caller needs
/// to fetch the file's contents later (a path, a buffer, ...).
#[derive(Clone, Debug)]
pub struct Entry<T> {
    name: Vec<u8>,
    kind: EntryKind<T>,
}

#[derive(Clone, Debug)]
pub enum EntryKind<T> {
    File { size: u64, source: T },
    Directory(Vec<Entry<T>>),
}

impl<T> Entry<T> {
    pub fn file(name: impl Into<Vec<u8>>, size: u64, source: T) -> Entry<T> {
        Entry {
            name: name.into(),
            kind: EntryKind::File { size, source },
        }
    }

    /// Create a directory; `children` are put in canonical order
    pub fn directory(name: impl Into<Vec<u8>>, mut children: Vec<Entry<T>>) -> Entry<T> {
        children.sort_by(|a, b| compare_names(&a.name, &b.name));
        Entry {
            name: name.into(),
            kind: EntryKind::Directory(children),
        }
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Children in canonical order; empty for files
    pub fn children(&self) -> &[Entry<T>] {
        match &self.kind {
            EntryKind::Directory(children) => children,
            EntryKind::File { .. } => &[],
        }
    }
}

/// Case-insensitive (ASCII) ordering. Names equal under that ordering fall
/// back to their raw bytes so the result never depends on listing order.
pub fn compare_names(a: &[u8], b: &[u8]) -> Ordering {
    let lower = |name: &[u8]| name.iter().map(u8::to_ascii_lowercase).collect::<Vec<_>>();
    lower(a).cmp(&lower(b)).then_with(|| a.cmp(b))
}

#[derive(Debug)]
pub enum LinearKind<'a, T> {
    File { id: FileId, size: u64, source: &'a T },
    Directory { id: DirectoryId },
}

#[derive(Debug)]
pub struct LinearEntry<'a, T> {
    pub name: &'a [u8],
    pub kind: LinearKind<'a, T>,
}

/// The immediate children of one directory, in canonical order
#[derive(Debug)]
pub struct DirectoryBlock<'a, T> {
    pub id: DirectoryId,
    /// `None` for the root
    pub parent: Option<DirectoryId>,
    /// Id the first file of this block has, or would have
    pub first_file_id: FileId,
    pub entries: Vec<LinearEntry<'a, T>>,
}

/// A tree flattened into directory blocks. Blocks are in pre-order, so the
/// n-th block is the directory with id `0xF000 + n`, and files are numbered
/// in the order they appear across blocks.
#[derive(Debug)]
pub struct LinearSequence<'a, T> {
    blocks: Vec<DirectoryBlock<'a, T>>,
    file_count: usize,
}

impl<'a, T> LinearSequence<'a, T> {
    pub fn blocks(&self) -> &[DirectoryBlock<'a, T>] {
        &self.blocks
    }

    pub fn directory_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// Every entry, block after block
    pub fn iter(&self) -> impl Iterator<Item = &LinearEntry<'a, T>> {
        self.blocks.iter().flat_map(|block| block.entries.iter())
    }

    /// `(id, size, source)` of every file, in file id order
    pub fn files(&self) -> impl Iterator<Item = (FileId, u64, &'a T)> + '_ {
        self.iter().filter_map(|entry| match entry.kind {
            LinearKind::File { id, size, source } => Some((id, size, source)),
            LinearKind::Directory { .. } => None,
        })
    }
}

/// Flatten `root` (whose own name is ignored) into directory blocks,
/// assigning file and directory ids.
pub fn linearize<T>(root: &Entry<T>) -> Result<LinearSequence<'_, T>, Error> {
    let mut sequence = LinearSequence {
        blocks: Vec::new(),
        file_count: 0,
    };
    visit(root, None, &mut sequence)?;
    Ok(sequence)
}

fn visit<'a, T>(
    dir: &'a Entry<T>,
    parent: Option<DirectoryId>,
    sequence: &mut LinearSequence<'a, T>,
) -> Result<(), Error> {
    let index = sequence.blocks.len();
    let id = DirectoryId::from_index(index)?;
    let first_file_id = file_id(sequence.file_count)?;

    let mut entries = Vec::with_capacity(dir.children().len());
    let mut subdirs = Vec::new();
    for child in dir.children() {
        if child.name.is_empty() || child.name.len() > MAX_NAME_LEN {
            return Err(Error::InvalidNameLength(child.name.len()));
        }
        let kind = match &child.kind {
            EntryKind::File { size, source } => {
                let id = file_id(sequence.file_count)?;
                sequence.file_count += 1;
                LinearKind::File { id, size: *size, source }
            }
            EntryKind::Directory(_) => {
                subdirs.push((entries.len(), child));
                // Patched below once the subtree is numbered
                LinearKind::Directory { id }
            }
        };
        entries.push(LinearEntry {
            name: &child.name,
            kind,
        });
    }

    sequence.blocks.push(DirectoryBlock {
        id,
        parent,
        first_file_id,
        entries,
    });

    for (position, subdir) in subdirs {
        let child_id = DirectoryId::from_index(sequence.blocks.len())?;
        sequence.blocks[index].entries[position].kind = LinearKind::Directory { id: child_id };
        visit(subdir, Some(id), sequence)?;
    }
    Ok(())
}

fn file_id(count: usize) -> Result<FileId, Error> {
    if count >= usize::from(DirectoryId::ROOT.0) {
        return Err(Error::TooManyFiles(count + 1));
    }
    Ok(count as FileId)
}
