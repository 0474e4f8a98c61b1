//! User-facing notices raised by mutations.

use std::fmt;

use tracing::warn;

use crate::fs::EntryKind;
use crate::path::Location;

/// Mutating operation a notice refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateDirectory,
    Upload,
    Remove,
}

impl Operation {
    fn verb(&self) -> &'static str {
        match self {
            Operation::CreateDirectory => "create directory",
            Operation::Upload => "upload",
            Operation::Remove => "remove",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// A blocking message for the user. Success is silent and has no notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Create or upload hit an existing name.
    AlreadyExists { kind: EntryKind, path: Location },
    /// Remove hit a directory that still has children.
    NotEmpty { path: Location },
    /// Anything else went wrong.
    Failed {
        operation: Operation,
        path: Location,
        reason: String,
    },
    /// A user-supplied name was rejected before any request was sent.
    InvalidName { operation: Operation, name: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::AlreadyExists { kind, path } => {
                write!(f, "{} already exists: {}", kind.noun(), path)
            }
            Notice::NotEmpty { path } => write!(f, "Directory not empty: {}", path),
            Notice::Failed {
                operation,
                path,
                reason,
            } => write!(
                f,
                "Sorry, something went wrong ({} {}): {}",
                operation, path, reason
            ),
            Notice::InvalidName { operation, name } => {
                write!(f, "Cannot {}: invalid name {:?}", operation, name)
            }
        }
    }
}

/// Where notices are shown.
pub trait NoticeSink: Send + Sync {
    /// Present a notice to the user.
    fn notify(&self, notice: &Notice);
}

impl<F> NoticeSink for F
where
    F: Fn(&Notice) + Send + Sync,
{
    fn notify(&self, notice: &Notice) {
        self(notice)
    }
}

/// Sink that only logs notices.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotices;

impl NoticeSink for TracingNotices {
    fn notify(&self, notice: &Notice) {
        warn!(notice = %notice, "notice");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn loc(path: &str) -> Location {
        Location::parse(path).unwrap()
    }

    #[test]
    fn test_messages() {
        let notice = Notice::AlreadyExists {
            kind: EntryKind::Directory,
            path: loc("/docs"),
        };
        assert_eq!(notice.to_string(), "Directory already exists: /docs");

        let notice = Notice::AlreadyExists {
            kind: EntryKind::File,
            path: loc("/a.txt"),
        };
        assert_eq!(notice.to_string(), "File already exists: /a.txt");

        let notice = Notice::NotEmpty { path: loc("/docs") };
        assert_eq!(notice.to_string(), "Directory not empty: /docs");

        let notice = Notice::Failed {
            operation: Operation::Upload,
            path: loc("/a.txt"),
            reason: "HTTP status 500".to_string(),
        };
        assert_eq!(
            notice.to_string(),
            "Sorry, something went wrong (upload /a.txt): HTTP status 500"
        );

        let notice = Notice::InvalidName {
            operation: Operation::CreateDirectory,
            name: "a/b".to_string(),
        };
        assert_eq!(
            notice.to_string(),
            "Cannot create directory: invalid name \"a/b\""
        );
    }

    #[test]
    fn test_closure_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |n: &Notice| seen.lock().unwrap().push(n.clone());
        sink.notify(&Notice::NotEmpty { path: loc("/x") });
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
