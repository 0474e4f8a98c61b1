//! Saving downloaded files on the client side.
//!
//! Downloads are fire-and-forget commands: the browser hands a path to a
//! [`SaveTarget`] and never waits on or reacts to the result.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::info;

use crate::api::StorageClient;
use crate::error::{Result, StoreError};
use crate::path::Location;
use crate::progress::{make_progress_bar, ProgressCallback};

/// Highest `name (N).ext` suffix tried before giving up.
const MAX_NAME_SUFFIX: u32 = 9999;

/// Capability that saves a remote file somewhere the user can reach it.
#[async_trait]
pub trait SaveTarget: Send + Sync {
    /// Fetch and store the file at `path`, returning where it was saved.
    async fn save(&self, path: &Location) -> Result<PathBuf>;
}

/// Saves downloads into a local directory.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    client: StorageClient,
    dir: PathBuf,
    show_progress: bool,
}

impl DirectorySaver {
    /// Save into `dir` using `client` for the transfer.
    pub fn new(client: StorageClient, dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dir: dir.into(),
            show_progress: false,
        }
    }

    /// Draw a progress bar on stderr while downloading.
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }
}

#[async_trait]
impl SaveTarget for DirectorySaver {
    async fn save(&self, path: &Location) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        // Each download gets its own partial file; dropping it on error deletes it.
        let mut partial = tempfile::Builder::new()
            .prefix(".netstore-")
            .suffix(".part")
            .tempfile_in(&self.dir)?;
        let mut progress: Option<ProgressCallback> = self.show_progress.then(make_progress_bar);

        let download = self
            .client
            .download_file(path, partial.as_file_mut(), progress.as_mut())
            .await?;

        let name = sanitize_file_name(&download.file_name)
            .unwrap_or_else(|| path.name().to_string());
        let target = persist_unique(partial, &self.dir, &name)?;

        info!(path = %path, saved = %target.display(), bytes = download.size, "download saved");
        Ok(target)
    }
}

/// Keep only the final component of a server-supplied name.
fn sanitize_file_name(name: &str) -> Option<String> {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && !n.starts_with('.'))
        .map(str::to_string)
}

/// Move `file` to `name`, or `name (1)`, `name (2)`, ... without ever
/// replacing an existing file.
fn persist_unique(mut file: NamedTempFile, dir: &Path, name: &str) -> Result<PathBuf> {
    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    };

    for n in 0..=MAX_NAME_SUFFIX {
        let candidate = if n == 0 {
            dir.join(name)
        } else {
            dir.join(format!("{} ({}){}", stem, n, ext))
        };
        match file.persist_noclobber(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => file = e.file,
            Err(e) => return Err(e.error.into()),
        }
    }
    Err(StoreError::Custom(format!(
        "no free file name for {} in {}",
        name,
        dir.display()
    )))
}
