//! Rebuilding names and nesting from the name index.
//!
//! Names are collected into an arena keyed by file id or directory id before
//! anything is resolved, since a directory's name lives in its parent's
//! sub-table and parents can appear anywhere in the index.
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::{ArchiveLayout, DirectoryId, Error, FatEntry, FileId, FntEntry, Record, RecordReader};

/// Every name of an archive, keyed by file id or directory id
#[derive(Clone, Debug, Default)]
pub struct NameTable<'a> {
    names: BTreeMap<u16, &'a [u8]>,
}

impl<'a> NameTable<'a> {
    /// Decode every sub-table once, recording file names under
    /// `first_file_id + position` and directory names under the id stored in
    /// the parent's record.
    pub fn collect(name_index: &[FntEntry], fnt_data: &'a [u8]) -> Result<NameTable<'a>, Error> {
        let mut names = BTreeMap::new();
        for entry in name_index {
            let mut file_id = u32::from(entry.first_file_id());
            for record in RecordReader::new(fnt_data, entry.subtable_offset())? {
                match record? {
                    Record::File(name) => {
                        if file_id >= u32::from(DirectoryId::ROOT.0) {
                            return Err(Error::InvalidFileId(file_id));
                        }
                        names.insert(file_id as u16, name);
                        file_id += 1;
                    }
                    Record::Directory { name, id } => {
                        names.insert(id.0, name);
                    }
                    Record::Reserved | Record::Terminator => {}
                }
            }
        }
        Ok(NameTable { names })
    }

    pub fn get(&self, id: u16) -> Result<&'a [u8], Error> {
        self.names.get(&id).copied().ok_or(Error::MissingName(id))
    }

    /// Path components of directory `index`, from the output root down to the
    /// directory itself. Empty for the root.
    pub fn directory_path(
        &self,
        name_index: &[FntEntry],
        index: usize,
    ) -> Result<Vec<&'a [u8]>, Error> {
        let mut path = Vec::new();
        if index == 0 {
            return Ok(path);
        }
        let id = DirectoryId::from_index(index)?;
        path.push(self.get(id.0)?);

        // Walk up until the root. Every step must land on a real entry, and a
        // chain longer than the index can only be a cycle.
        let mut link = name_index[index].link();
        if !DirectoryId::is_directory_id(link) {
            return Err(Error::InvalidDirectoryLink(link));
        }
        while link > DirectoryId::ROOT.0 {
            if path.len() >= name_index.len() {
                return Err(Error::InvalidDirectoryLink(link));
            }
            let parent = name_index
                .get(DirectoryId(link).index())
                .ok_or(Error::InvalidDirectoryLink(link))?;
            path.push(self.get(link)?);
            link = parent.link();
        }
        path.reverse();
        Ok(path)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlannedFile<'a> {
    pub id: FileId,
    pub name: &'a [u8],
    pub range: FatEntry,
}

/// What to create for one directory of the name index
#[derive(Clone, Debug, PartialEq)]
pub struct DirectoryPlan<'a> {
    pub id: DirectoryId,
    /// Components below the output root; empty for the root itself
    pub path: Vec<&'a [u8]>,
    pub files: Vec<PlannedFile<'a>>,
}

/// Resolve every directory and file of a tree-mode archive before anything
/// touches the output, so a malformed index fails without partial output.
///
/// Directories come out in id order. Each one's sub-table is replayed to pair
/// its file records with consecutive ranges starting at `first_file_id`;
/// subdirectory records are skipped since they get a plan of their own.
pub fn plan(layout: &ArchiveLayout) -> Result<Vec<DirectoryPlan<'_>>, Error> {
    let names = NameTable::collect(&layout.name_index, &layout.fnt_data)?;

    let mut plans = Vec::with_capacity(layout.name_index.len());
    for (index, entry) in layout.name_index.iter().enumerate() {
        let path = names.directory_path(&layout.name_index, index)?;

        let mut files = Vec::new();
        let mut id = entry.first_file_id();
        for record in RecordReader::new(&layout.fnt_data, entry.subtable_offset())? {
            if let Record::File(_) = record? {
                files.push(PlannedFile {
                    id,
                    name: names.get(id)?,
                    range: layout.range(id)?,
                });
                id = id.checked_add(1).ok_or(Error::InvalidFileId(u32::from(id) + 1))?;
            }
        }

        plans.push(DirectoryPlan {
            id: DirectoryId::from_index(index)?,
            path,
            files,
        });
    }
    Ok(plans)
}
