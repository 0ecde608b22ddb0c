use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::Context as _;

use crate::foundation::error::{CardError, CardResult};

/// Destination for exported files.
pub trait SaveSink: Send + Sync {
    /// Store `bytes` under `file_name`; returns where it went.
    fn save(&self, file_name: &str, bytes: &[u8]) -> CardResult<PathBuf>;
}

/// Writes exports into a directory, creating it on demand.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Sink writing under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SaveSink for DirectorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> CardResult<PathBuf> {
        if Path::new(file_name).file_name() != Some(OsStr::new(file_name)) {
            return Err(CardError::capture(format!(
                "'{file_name}' is not a plain file name"
            )));
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create export dir '{}'", self.dir.display()))?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        Ok(path)
    }
}

/// Keeps exports in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved files in save order.
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        match self.files.lock() {
            Ok(files) => files.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl SaveSink for MemorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> CardResult<PathBuf> {
        self.files
            .lock()
            .map_err(|_| CardError::capture("memory sink lock poisoned"))?
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(PathBuf::from(file_name))
    }
}
