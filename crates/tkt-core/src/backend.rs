//! Host storage for the snapshot blob
//!
//! A backend stores one text blob and replaces it whole on every write.
//! There is no partial update and no append.

use crate::Result;
use std::cell::RefCell;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Blob storage used by [`crate::TicketStore`]
pub trait Backend {
    /// Read the stored blob, `None` if nothing has been written yet
    fn read(&self) -> Result<Option<String>>;

    /// Replace the stored blob
    fn write(&self, blob: &str) -> Result<()>;

    /// Keep a copy of an unreadable blob before it is overwritten
    fn set_aside(&self, blob: &str) -> Result<()>;

    /// Human-readable location, used in log lines and `tkt info`
    fn location(&self) -> String;
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where [`Backend::set_aside`] puts an unreadable file
    pub fn corrupt_path(&self) -> PathBuf {
        self.sibling(".corrupt")
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

impl Backend for FileBackend {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, blob: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        // Write beside the target and rename over it so readers never see
        // a half-written file
        let tmp = self.temp_path();
        let mut file = fs::File::create(&tmp)?;
        file.write_all(blob.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn set_aside(&self, blob: &str) -> Result<()> {
        fs::write(self.corrupt_path(), blob)?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process blob, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryBackend {
    blob: RefCell<Option<String>>,
    set_aside: RefCell<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing blob, e.g. to simulate corrupt storage
    pub fn with_contents(blob: impl Into<String>) -> Self {
        Self {
            blob: RefCell::new(Some(blob.into())),
            set_aside: RefCell::new(None),
        }
    }

    /// Current raw contents
    pub fn contents(&self) -> Option<String> {
        self.blob.borrow().clone()
    }

    /// Last blob handed to [`Backend::set_aside`]
    pub fn set_aside_contents(&self) -> Option<String> {
        self.set_aside.borrow().clone()
    }
}

impl Backend for MemoryBackend {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.blob.borrow().clone())
    }

    fn write(&self, blob: &str) -> Result<()> {
        *self.blob.borrow_mut() = Some(blob.to_string());
        Ok(())
    }

    fn set_aside(&self, blob: &str) -> Result<()> {
        *self.set_aside.borrow_mut() = Some(blob.to_string());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
