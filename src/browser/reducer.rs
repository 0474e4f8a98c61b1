//! Browser actions, side-effect intents, and transition logic.

use tracing::{debug, info, warn};

use super::state::{BrowserState, RefreshToken};
use crate::api::Outcome;
use crate::fs::{Entry, EntryKind, Listing, PendingFile};
use crate::notice::{Notice, Operation};
use crate::path::{child_path, Location};

/// Actions accepted by [`reduce_browser`] to change [`BrowserState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserAction {
    /// Make `location` current and fetch its listing.
    NavigateTo(Location),
    /// Move to the parent location; ignored at root.
    NavigateToParent,
    /// Re-fetch the current location.
    Refresh,
    /// A listing fetch finished.
    Refreshed {
        /// Token the fetch was issued with.
        token: RefreshToken,
        /// Location that was fetched.
        location: Location,
        /// New listing, or the reason the fetch failed.
        result: Result<Listing, String>,
    },
    /// Replace the candidate directory name.
    SetDirectoryName(String),
    /// Create a directory named by the candidate name.
    SubmitDirectory,
    /// Select the file to upload.
    SelectFile(PendingFile),
    /// Drop the selected file.
    ClearFile,
    /// Upload the selected file into the current location.
    SubmitUpload,
    /// Remove an entry.
    Remove(Entry),
    /// Save a file entry on the client.
    Download(Entry),
    /// Primary action on an entry: enter a directory, download a file.
    Activate(Entry),
    /// A mutating call finished.
    MutationFinished {
        /// Which mutation.
        mutation: Mutation,
        /// How the service answered.
        outcome: Outcome,
    },
}

/// A mutating call that was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateDirectory { path: Location },
    Upload { path: Location },
    Remove { entry: Entry },
}

/// Side effects requested by the reducer, executed by the runtime in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEffect {
    /// Fetch the listing of `location`, reporting back with `token`.
    FetchListing {
        token: RefreshToken,
        location: Location,
    },
    /// Issue a create-directory call.
    CreateDirectory { path: Location },
    /// Issue an upload call.
    UploadFile { path: Location, file: PendingFile },
    /// Issue a remove call.
    RemoveEntry { entry: Entry },
    /// Hand a file to the save capability.
    SaveFile { path: Location },
    /// Show a notice to the user.
    ShowNotice(Notice),
}

/// Applies a [`BrowserAction`] to the state and collects the resulting side effects.
///
/// Every navigation and every finished mutation produces exactly one
/// [`BrowserEffect::FetchListing`]; listings that arrive with an outdated
/// token are dropped.
pub fn reduce_browser(state: &mut BrowserState, action: BrowserAction) -> Vec<BrowserEffect> {
    let mut effects = Vec::new();
    match action {
        BrowserAction::NavigateTo(location) => {
            info!(location = %location, "navigate");
            state.move_to(location);
            effects.push(fetch_current(state));
        }
        BrowserAction::NavigateToParent => {
            if let Some(parent) = state.parent.clone() {
                return reduce_browser(state, BrowserAction::NavigateTo(parent));
            }
        }
        BrowserAction::Refresh => {
            effects.push(fetch_current(state));
        }
        BrowserAction::Refreshed {
            token,
            location,
            result,
        } => {
            if token != state.latest_token || location != state.location {
                debug!(token, latest = state.latest_token, location = %location, "dropping stale listing");
                return effects;
            }
            match result {
                Ok(listing) => {
                    state.listing = Listing { location, ..listing };
                    state.refresh_error = None;
                }
                Err(reason) => {
                    warn!(location = %location, reason = %reason, "listing failed, keeping previous entries");
                    state.refresh_error = Some(reason);
                }
            }
        }
        BrowserAction::SetDirectoryName(name) => {
            state.directory.name = name;
        }
        BrowserAction::SubmitDirectory => {
            if state.directory.in_flight {
                return effects;
            }
            match child_path(&state.location, &state.directory.name) {
                Ok(path) => {
                    state.directory.in_flight = true;
                    effects.push(BrowserEffect::CreateDirectory { path });
                }
                Err(_) => effects.push(BrowserEffect::ShowNotice(Notice::InvalidName {
                    operation: Operation::CreateDirectory,
                    name: state.directory.name.clone(),
                })),
            }
        }
        BrowserAction::SelectFile(file) => {
            if !state.upload.in_flight {
                state.upload.file = Some(file);
            }
        }
        BrowserAction::ClearFile => {
            if !state.upload.in_flight {
                state.upload.file = None;
            }
        }
        BrowserAction::SubmitUpload => {
            if state.upload.in_flight {
                return effects;
            }
            let Some(file) = state.upload.file.clone() else {
                return effects;
            };
            match child_path(&state.location, &file.name) {
                Ok(path) => {
                    state.upload.in_flight = true;
                    effects.push(BrowserEffect::UploadFile { path, file });
                }
                Err(_) => effects.push(BrowserEffect::ShowNotice(Notice::InvalidName {
                    operation: Operation::Upload,
                    name: file.name,
                })),
            }
        }
        BrowserAction::Remove(entry) => {
            effects.push(BrowserEffect::RemoveEntry { entry });
        }
        BrowserAction::Download(entry) => {
            if entry.is_file() {
                effects.push(BrowserEffect::SaveFile { path: entry.path });
            } else {
                debug!(path = %entry.path, "ignoring download of a directory");
            }
        }
        BrowserAction::Activate(entry) => {
            let next = match entry.kind {
                EntryKind::Directory => BrowserAction::NavigateTo(entry.path),
                EntryKind::File => BrowserAction::Download(entry),
            };
            return reduce_browser(state, next);
        }
        BrowserAction::MutationFinished { mutation, outcome } => {
            if let Some(notice) = finish_mutation(state, &mutation, outcome) {
                effects.push(BrowserEffect::ShowNotice(notice));
            }
            // Refresh regardless of outcome; a redundant fetch after a failure is harmless.
            effects.push(fetch_current(state));
        }
    }
    effects
}

fn fetch_current(state: &mut BrowserState) -> BrowserEffect {
    BrowserEffect::FetchListing {
        token: state.issue_token(),
        location: state.location.clone(),
    }
}

fn finish_mutation(state: &mut BrowserState, mutation: &Mutation, outcome: Outcome) -> Option<Notice> {
    let (operation, path, conflict) = match mutation {
        Mutation::CreateDirectory { path } => {
            state.directory.in_flight = false;
            let conflict = Notice::AlreadyExists {
                kind: EntryKind::Directory,
                path: path.clone(),
            };
            (Operation::CreateDirectory, path, Some(conflict))
        }
        Mutation::Upload { path } => {
            state.upload.in_flight = false;
            let conflict = Notice::AlreadyExists {
                kind: EntryKind::File,
                path: path.clone(),
            };
            (Operation::Upload, path, Some(conflict))
        }
        Mutation::Remove { entry } => {
            // Only directories can be "not empty"; a conflict on a file is a plain failure.
            let conflict = entry
                .is_directory()
                .then(|| Notice::NotEmpty {
                    path: entry.path.clone(),
                });
            (Operation::Remove, &entry.path, conflict)
        }
    };

    match outcome {
        Outcome::Success => {
            debug!(operation = %operation, path = %path, "mutation succeeded");
            None
        }
        Outcome::Conflict { message } => conflict.or_else(|| {
            Some(Notice::Failed {
                operation,
                path: path.clone(),
                reason: message.unwrap_or_else(|| "conflict".to_string()),
            })
        }),
        Outcome::Failure { message, .. } => Some(Notice::Failed {
            operation,
            path: path.clone(),
            reason: message,
        }),
    }
}
