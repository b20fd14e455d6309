//! Access to the files a deploy is built from.

use std::{fs, path::Path};

use crate::error::{Error, Result};

/// Reads deploy inputs.
pub trait FileSource {
    /// Reads the whole file as raw bytes.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Reads the whole file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

/// Reads from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFiles;

impl FileSource for LocalFiles {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path)
            .map_err(|error| Error::io(format!("unable to read {}", path.display()), error))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .map_err(|error| Error::io(format!("unable to read {}", path.display()), error))
    }
}
