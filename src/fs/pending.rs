//! Files selected for upload.

use std::fmt;
use std::path::Path;

use crate::error::{Result, StoreError};
use crate::path::validate_name;

/// A file chosen for upload, held in memory until submitted.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingFile {
    /// Leaf name the file is uploaded under
    pub name: String,
    /// File contents
    pub data: Vec<u8>,
}

impl PendingFile {
    /// Create a pending file from raw bytes.
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Read a local file, using its file name as the upload name.
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StoreError::InvalidName(path.display().to_string()))?
            .to_string();
        validate_name(&name)?;

        let data = tokio::fs::read(path).await?;
        Ok(Self { name, data })
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

// Contents are omitted so logs stay readable.
impl fmt::Debug for PendingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingFile")
            .field("name", &self.name)
            .field("size", &self.data.len())
            .finish()
    }
}
