//! # netstore
//!
//! Rust client library for a hierarchical network file store.
//!
//! ## Features
//!
//! - **Browsing**: navigate a remote directory tree; the listing of the
//!   current location is always fetched from the server, never cached
//!   across navigation.
//! - **Mutations**:
//!   - Create directories (`mkdir`).
//!   - Upload files (multipart).
//!   - Remove files and empty directories (`rm`).
//!   - Download files to a local directory with progress reporting.
//! - **Consistency**: every mutation is followed by a full refresh of the
//!   current listing; overlapping refreshes are ordered by token so a late
//!   response can never overwrite a newer one.
//! - **Notices**: "already exists", "not empty" and generic failures are
//!   surfaced once per mutation through a [`NoticeSink`].
//!
//! ## Example: Basic Usage
//!
//! ```no_run
//! use netstore::{BrowserHandle, ClientConfig, PendingFile};
//!
//! # async fn example() -> netstore::Result<()> {
//! let browser = BrowserHandle::connect(&ClientConfig::from_env()?)?;
//!
//! // Root is fetched on start
//! let state = browser.settle().await?;
//! for entry in state.listing().entries() {
//!     println!("{} ({:?})", entry.name, entry.kind);
//! }
//!
//! // Create a directory and upload into it
//! browser.mkdir("docs").await?;
//! browser.navigate_to("/docs").await?;
//! browser.upload(PendingFile::from_path("report.pdf").await?).await?;
//! let state = browser.settle().await?;
//! assert_eq!(state.location().as_str(), "/docs");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod browser;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod http;
pub mod notice;
pub mod path;
pub mod progress;

// Re-export commonly used types
pub use api::{Outcome, StorageClient, StorageService};
pub use browser::{BrowserAction, BrowserHandle, BrowserState};
pub use config::ClientConfig;
pub use download::{DirectorySaver, SaveTarget};
pub use error::{Result, StoreError};
pub use fs::{Entry, EntryKind, Listing, PendingFile};
pub use notice::{Notice, NoticeSink, Operation, TracingNotices};
pub use path::Location;
pub use progress::{DownloadProgress, ProgressCallback};
