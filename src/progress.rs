//! Progress reporting for downloads.

use std::io::{self, Write};

const BAR_WIDTH: usize = 32;

/// Snapshot of a download in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Name the file is being saved as
    pub file_name: String,
    /// Bytes received so far
    pub received: u64,
    /// Size announced by the server via `Content-Length` or `Accept-Length`
    pub expected: Option<u64>,
    /// Set on the last report, after the body has been fully written
    pub finished: bool,
}

impl DownloadProgress {
    /// Progress of a download that is still receiving.
    pub fn new(file_name: impl Into<String>, received: u64, expected: Option<u64>) -> Self {
        Self {
            file_name: file_name.into(),
            received,
            expected,
            finished: false,
        }
    }

    /// Fraction received in `0.0..=1.0`; `None` when no size was announced.
    pub fn fraction(&self) -> Option<f64> {
        let total = self.expected?;
        if total == 0 {
            return Some(1.0);
        }
        Some((self.received as f64 / total as f64).min(1.0))
    }
}

/// Callback invoked after every received chunk and once more when finished.
///
/// Returning `false` aborts the download; the return value of the final
/// report is ignored.
pub type ProgressCallback = Box<dyn FnMut(&DownloadProgress) -> bool + Send>;

/// Create a progress callback that redraws a single line on stderr.
///
/// Downloads without an announced size show a running byte count instead
/// of a bar.
///
/// # Example
/// ```no_run
/// use netstore::progress::make_progress_bar;
///
/// let callback = make_progress_bar();
/// ```
pub fn make_progress_bar() -> ProgressCallback {
    Box::new(|progress: &DownloadProgress| {
        eprint!("\r{}", render_line(progress));
        if progress.finished {
            eprintln!();
        }
        let _ = io::stderr().flush();
        true
    })
}

fn render_line(progress: &DownloadProgress) -> String {
    let received = format_bytes(progress.received);
    match (progress.fraction(), progress.expected) {
        (Some(fraction), Some(total)) => {
            let filled = (fraction * BAR_WIDTH as f64).round() as usize;
            format!(
                "[{}{}] {:>5.1}% {} ({} / {})",
                "=".repeat(filled),
                " ".repeat(BAR_WIDTH - filled),
                fraction * 100.0,
                progress.file_name,
                received,
                format_bytes(total)
            )
        }
        _ if progress.finished => format!("{}: {} done", progress.file_name, received),
        _ => format!("{}: {} received", progress.file_name, received),
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
