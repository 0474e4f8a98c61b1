//! Locations in the remote tree.
//!
//! A [`Location`] is always absolute and normalized: the root is `/`, every
//! other location starts with `/` and has no trailing separator and no empty
//! segments.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Canonical root location.
pub const ROOT: &str = "/";

/// A normalized absolute path identifying a directory (or file) in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location(String);

impl Location {
    /// The root location.
    pub fn root() -> Self {
        Self(ROOT.to_string())
    }

    /// Normalize a path into a location.
    ///
    /// Collapses repeated separators, strips trailing separators and adds a
    /// missing leading one. `.` and `..` segments are rejected rather than
    /// resolved, since the server treats paths literally.
    pub fn parse(path: &str) -> Result<Self> {
        let mut normalized = String::with_capacity(path.len() + 1);
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." || segment.contains('\0') {
                return Err(StoreError::InvalidPath(path.to_string()));
            }
            normalized.push('/');
            normalized.push_str(segment);
        }
        if normalized.is_empty() {
            return Ok(Self::root());
        }
        Ok(Self(normalized))
    }

    /// Check whether this is the root location.
    pub fn is_root(&self) -> bool {
        self.0 == ROOT
    }

    /// Borrow the location as a path string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final segment of the location; empty for root.
    pub fn name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Parent of this location, `None` for root.
    pub fn parent(&self) -> Option<Location> {
        parent_of(self)
    }

    /// Join a leaf name onto this location.
    pub fn join(&self, name: &str) -> Result<Location> {
        child_path(self, name)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Location {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self> {
        Location::parse(&value)
    }
}

impl From<Location> for String {
    fn from(value: Location) -> Self {
        value.0
    }
}

/// Compute the parent of a location.
///
/// Root has no parent. Otherwise the final `/segment` is stripped, and an
/// empty remainder maps back to root.
pub fn parent_of(location: &Location) -> Option<Location> {
    if location.is_root() {
        return None;
    }
    match location.0.rfind('/') {
        Some(0) | None => Some(Location::root()),
        Some(idx) => Some(Location(location.0[..idx].to_string())),
    }
}

/// Join a validated leaf name onto a location.
pub fn child_path(location: &Location, name: &str) -> Result<Location> {
    validate_name(name)?;
    if location.is_root() {
        Ok(Location(format!("/{}", name)))
    } else {
        Ok(Location(format!("{}/{}", location.0, name)))
    }
}

/// Reject names that would not form a single path segment.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') || name.contains('\0')
    {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}
