use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use crate::error::{PackError, Result};

/// A random-access byte source a pack can be read from.
pub trait ResourceDataReader: Read + Seek + Send {}

impl<T> ResourceDataReader for T where T: Read + Seek + Send {}

/// Platform services the locators need to (re)open their backing stores.
pub trait SystemApi: Send + Sync {
    fn get_data_reader(&self, path: &Path) -> Result<Box<dyn ResourceDataReader>>;
}

/// Opens readers from the OS file system, optionally relative to a root directory.
#[derive(Debug, Clone, Default)]
pub struct OsSystemApi {
    root: Option<PathBuf>,
}

impl OsSystemApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: Some(root.as_ref().to_path_buf()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl SystemApi for OsSystemApi {
    fn get_data_reader(&self, path: &Path) -> Result<Box<dyn ResourceDataReader>> {
        let path = self.resolve(path);
        let file = File::open(&path)
            .map_err(|e| PackError::IO(std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e))))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_os_system_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("data.bin")).unwrap();
        file.write_all(b"abc").unwrap();
        drop(file);

        let system = OsSystemApi::with_root(dir.path());
        let mut reader = system.get_data_reader(Path::new("data.bin")).unwrap();
        let mut buf = String::new();
        reader.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "abc");

        let err = system.get_data_reader(Path::new("missing.bin")).err().unwrap();
        assert!(matches!(err, PackError::IO(_)));
    }
}
