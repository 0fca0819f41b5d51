//! Extention traits for base types defined in `narc-core`.
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Component, Path};

use crate::Error;

pub trait NameExt {
    fn check_component(&self) -> Result<&Path, Error>;
}

impl NameExt for [u8] {
    /// Ensure a stored name is exactly one normal path component, so it can
    /// be joined onto an output directory without escaping it.
    fn check_component(&self) -> Result<&Path, Error> {
        let path = Path::new(OsStr::from_bytes(self));
        let invalid = |component: &Path| Error::InvalidPath {
            entry: path.to_path_buf(),
            component: component.to_path_buf(),
        };

        let mut components = path.components();
        match components.next() {
            Some(Component::Normal(_)) => {}
            Some(other) => return Err(invalid(other.as_ref())),
            None => return Err(invalid(path)),
        }
        // Separators, including a trailing one, and NUL never make a single
        // file name
        if components.next().is_some() || self.iter().any(|b| *b == b'/' || *b == 0) {
            return Err(invalid(path));
        }
        Ok(path)
    }
}
