//! In-memory storage service for tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{RwLock, RwLockWriteGuard};

use super::client::StorageService;
use super::outcome::Outcome;
use crate::error::{Result, StoreError};
use crate::fs::{Entry, Listing, PendingFile};
use crate::path::Location;

#[derive(Default)]
struct Tree {
    dirs: BTreeSet<Location>,
    files: BTreeMap<Location, Vec<u8>>,
}

impl Tree {
    fn exists(&self, path: &Location) -> bool {
        self.dirs.contains(path) || self.files.contains_key(path)
    }

    fn has_children(&self, path: &Location) -> bool {
        let is_child = |p: &Location| p.parent().as_ref() == Some(path);
        self.dirs.iter().any(is_child) || self.files.keys().any(is_child)
    }
}

/// Store that behaves like the real service: 409 for existing names and
/// non-empty directories, 404-style failures for missing parents.
pub(crate) struct MemoryStore {
    tree: Mutex<Tree>,
    calls: Mutex<Vec<String>>,
    gate: Arc<RwLock<()>>,
    fail_lists: AtomicBool,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        let mut tree = Tree::default();
        tree.dirs.insert(Location::root());
        Self {
            tree: Mutex::new(tree),
            calls: Mutex::new(Vec::new()),
            gate: Arc::new(RwLock::new(())),
            fail_lists: AtomicBool::new(false),
        }
    }

    pub(crate) fn with_dir(self, path: &str) -> Self {
        self.tree
            .lock()
            .unwrap()
            .dirs
            .insert(Location::parse(path).unwrap());
        self
    }

    pub(crate) fn with_file(self, path: &str, data: &[u8]) -> Self {
        self.tree
            .lock()
            .unwrap()
            .files
            .insert(Location::parse(path).unwrap(), data.to_vec());
        self
    }

    /// Block every call until the returned guard is dropped.
    pub(crate) async fn hold(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().await
    }

    pub(crate) fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.tree
            .lock()
            .unwrap()
            .files
            .get(&Location::parse(path).unwrap())
            .cloned()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn missing_parent(path: &Location) -> Outcome {
        Outcome::Failure {
            status: Some(404),
            message: format!("parent of {} not found", path),
        }
    }
}

#[async_trait]
impl StorageService for MemoryStore {
    async fn list(&self, location: &Location) -> Result<Listing> {
        self.record(format!("list {}", location));
        let _open = self.gate.read().await;

        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(StoreError::HttpError(500));
        }
        let tree = self.tree.lock().unwrap();
        if !tree.dirs.contains(location) {
            return Err(StoreError::HttpError(404));
        }

        let is_child = |p: &&Location| p.parent().as_ref() == Some(location);
        Ok(Listing {
            location: location.clone(),
            directories: tree
                .dirs
                .iter()
                .filter(is_child)
                .map(|p| Entry::directory(p.name(), p.clone()))
                .collect(),
            files: tree
                .files
                .keys()
                .filter(is_child)
                .map(|p| Entry::file(p.name(), p.clone()))
                .collect(),
        })
    }

    async fn create_directory(&self, path: &Location) -> Outcome {
        self.record(format!("mkdir {}", path));
        let _open = self.gate.read().await;

        let mut tree = self.tree.lock().unwrap();
        if tree.exists(path) {
            return Outcome::Conflict {
                message: Some("file exists".to_string()),
            };
        }
        match path.parent() {
            Some(parent) if tree.dirs.contains(&parent) => {
                tree.dirs.insert(path.clone());
                Outcome::Success
            }
            _ => Self::missing_parent(path),
        }
    }

    async fn remove_entry(&self, path: &Location) -> Outcome {
        self.record(format!("remove {}", path));
        let _open = self.gate.read().await;

        let mut tree = self.tree.lock().unwrap();
        if tree.files.remove(path).is_some() {
            return Outcome::Success;
        }
        if !tree.dirs.contains(path) || path.is_root() {
            return Outcome::Failure {
                status: Some(404),
                message: format!("{} not found", path),
            };
        }
        if tree.has_children(path) {
            return Outcome::Conflict {
                message: Some("directory not empty".to_string()),
            };
        }
        tree.dirs.remove(path);
        Outcome::Success
    }

    async fn upload_file(&self, path: &Location, file: &PendingFile) -> Outcome {
        self.record(format!("upload {}", path));
        let _open = self.gate.read().await;

        let mut tree = self.tree.lock().unwrap();
        if tree.exists(path) {
            return Outcome::Conflict {
                message: Some("file exists".to_string()),
            };
        }
        match path.parent() {
            Some(parent) if tree.dirs.contains(&parent) => {
                tree.files.insert(path.clone(), file.data.clone());
                Outcome::Success
            }
            _ => Self::missing_parent(path),
        }
    }
}
