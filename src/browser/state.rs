//! State owned by the browser: where we are, what is there, and what is pending.

use crate::fs::{Listing, PendingFile};
use crate::path::{parent_of, Location};

/// Sequence number of a listing fetch. Only the latest one may land.
pub type RefreshToken = u64;

/// Pending input of the create-directory controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryDraft {
    /// Candidate name, as typed
    pub name: String,
    /// A create call is outstanding
    pub in_flight: bool,
}

/// Pending input of the upload controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadDraft {
    /// Selected file, if any
    pub file: Option<PendingFile>,
    /// An upload call is outstanding
    pub in_flight: bool,
}

/// Complete browser state. Changed only by [`reduce_browser`](super::reduce_browser).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserState {
    pub(crate) location: Location,
    pub(crate) parent: Option<Location>,
    pub(crate) listing: Listing,
    pub(crate) refresh_error: Option<String>,
    pub(crate) latest_token: RefreshToken,
    pub(crate) directory: DirectoryDraft,
    pub(crate) upload: UploadDraft,
}

impl Default for BrowserState {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserState {
    /// Fresh state at the root with nothing fetched yet.
    pub fn new() -> Self {
        let location = Location::root();
        Self {
            parent: parent_of(&location),
            listing: Listing::empty(location.clone()),
            location,
            refresh_error: None,
            latest_token: 0,
            directory: DirectoryDraft::default(),
            upload: UploadDraft::default(),
        }
    }

    /// Current location.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Parent of the current location; `None` at root.
    pub fn parent(&self) -> Option<&Location> {
        self.parent.as_ref()
    }

    /// Entries of the current location.
    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    /// Why the most recent fetch of the current location failed, if it did.
    ///
    /// While set, [`listing`](Self::listing) may be stale.
    pub fn refresh_error(&self) -> Option<&str> {
        self.refresh_error.as_deref()
    }

    /// Token of the most recently issued fetch.
    pub fn latest_token(&self) -> RefreshToken {
        self.latest_token
    }

    /// Create-directory controller input.
    pub fn directory(&self) -> &DirectoryDraft {
        &self.directory
    }

    /// Upload controller input.
    pub fn upload(&self) -> &UploadDraft {
        &self.upload
    }

    /// Whether the create-directory action should be offered.
    pub fn can_create_directory(&self) -> bool {
        !self.directory.in_flight
    }

    /// Whether the upload action (and file selection) should be offered.
    pub fn can_upload(&self) -> bool {
        !self.upload.in_flight
    }

    pub(crate) fn move_to(&mut self, location: Location) {
        self.parent = parent_of(&location);
        self.listing = Listing::empty(location.clone());
        self.location = location;
        self.refresh_error = None;
    }

    pub(crate) fn issue_token(&mut self) -> RefreshToken {
        self.latest_token += 1;
        self.latest_token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = BrowserState::new();
        assert!(state.location().is_root());
        assert!(state.parent().is_none());
        assert!(state.listing().is_empty());
        assert!(state.can_create_directory());
        assert!(state.can_upload());
        assert_eq!(state.latest_token(), 0);
    }

    #[test]
    fn test_move_to_resets_listing_and_parent() {
        let mut state = BrowserState::new();
        state.refresh_error = Some("boom".to_string());

        let docs = Location::parse("/docs").unwrap();
        state.move_to(docs.clone());

        assert_eq!(state.location(), &docs);
        assert_eq!(state.parent(), Some(&Location::root()));
        assert_eq!(state.listing(), &Listing::empty(docs));
        assert!(state.refresh_error().is_none());
    }

    #[test]
    fn test_tokens_increase() {
        let mut state = BrowserState::new();
        let first = state.issue_token();
        let second = state.issue_token();
        assert!(second > first);
        assert_eq!(state.latest_token(), second);
    }
}
