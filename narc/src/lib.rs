mod bin;
mod builder;
mod dir;
pub mod ext;
mod extract;
mod package;

pub use bin::*;
pub use builder::*;
pub use dir::*;
pub use extract::*;
pub use package::*;

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

const READ_WRITE_BUF_SIZE: usize = 4 * 1024 * 1024;

#[derive(Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] narc_core::Error),

    #[error("{context}: invalid input file{}", path_suffix(.path))]
    InvalidInputFile {
        source: io::Error,
        path: Option<PathBuf>,
        context: &'static str,
    },

    #[error("{context}: invalid output file{}", path_suffix(.path))]
    InvalidOutputFile {
        source: io::Error,
        path: Option<PathBuf>,
        context: &'static str,
    },

    #[error("Invalid path component '{}' in '{}'", component.display(), entry.display())]
    InvalidPath { entry: PathBuf, component: PathBuf },

    #[error("Size of '{}' changed: expected {expected}, got {actual}", path.display())]
    LengthMismatch {
        path: PathBuf,
        actual: u64,
        expected: u64,
    },

    #[error("Archive size mismatch: header says {expected}, wrote {actual}")]
    ArchiveSizeMismatch { actual: u64, expected: u64 },
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" '{}'", path.display()),
        None => String::new(),
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)?;
        let mut source = self.source();
        while let Some(err) = source {
            write!(f, "\n    Caused by: {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

/// Build a closure for `map_err` that turns an `io::Error` into the given
/// `Error` variant, with an optional path and a short context string.
#[macro_export]
macro_rules! wrap_io_err {
    ($variant:ident, $path:expr, $context:expr) => {
        |source| $crate::Error::$variant {
            source,
            path: Some(::std::path::PathBuf::from($path)),
            context: $context,
        }
    };
    ($variant:ident, $context:expr) => {
        |source| $crate::Error::$variant {
            source,
            path: None,
            context: $context,
        }
    };
}
