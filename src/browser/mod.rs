//! Navigation and synchronization state machine.
//!
//! [`BrowserState`] holds the current location, its listing and the pending
//! input of the create-directory and upload controllers. It changes only
//! through [`reduce_browser`], which returns [`BrowserEffect`]s for the
//! runtime to execute. [`BrowserHandle`] runs that loop on a tokio task.

mod actor;
mod reducer;
mod state;

pub use actor::BrowserHandle;
pub use reducer::{reduce_browser, BrowserAction, BrowserEffect, Mutation};
pub use state::{BrowserState, DirectoryDraft, RefreshToken, UploadDraft};
