//! Listing and upload value types.

mod entry;
mod pending;

pub use entry::{Entry, EntryKind, Listing};
pub use pending::PendingFile;
