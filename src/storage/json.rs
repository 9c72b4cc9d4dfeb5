use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::StoreData;
use crate::storage::backend::Storage;

/// Keeps the whole store as one JSON document on disk.
///
/// The file handle stays open until `close`; each write rewrites the file
/// from the start and truncates whatever is left over.
pub struct JsonStorage {
    path: PathBuf,
    handle: Option<File>,
    pretty: bool,
}

impl JsonStorage {
    pub fn open(path: impl AsRef<Path>, create_dirs: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if create_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }

        let handle = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        Ok(JsonStorage {
            path,
            handle: Some(handle),
            pretty: false,
        })
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn handle(&mut self) -> Result<&mut File> {
        self.handle.as_mut().ok_or_else(|| Error::new(
            ErrorKind::InvalidState,
            format!("Storage {} is closed", self.path.display()),
        ))
    }
}

impl Storage for JsonStorage {
    fn read(&mut self) -> Result<Option<StoreData>> {
        let file = self.handle()?;
        if file.metadata()?.len() == 0 {
            return Ok(None);
        }

        file.seek(SeekFrom::Start(0))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn write(&mut self, data: &StoreData) -> Result<()> {
        let serialized = if self.pretty {
            serde_json::to_vec_pretty(data)?
        } else {
            serde_json::to_vec(data)?
        };

        let file = self.handle()?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&serialized)?;
        file.flush()?;
        file.set_len(serialized.len() as u64)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(file) = self.handle.take() {
            file.sync_all()?;
        }
        Ok(())
    }
}
