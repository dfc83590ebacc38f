//! Progress bar utilities using indicatif for terminal output

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Style template for request progress
const PROGRESS_TEMPLATE: &str =
    "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg} (ETA: {eta})";

/// Progress bar characters for visual effect
const PROGRESS_CHARS: &str = "█▓▒░ ";

/// Create a progress bar for `total` requests.
///
/// The bar draws to stderr, or nowhere when `hidden` is set (JSON mode),
/// so it never interleaves with command output on stdout.
pub fn create_progress_bar(total: u64, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::hidden());
    }

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
        pb.set_style(style.progress_chars(PROGRESS_CHARS));
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Extension trait for ProgressBar with convenience methods
pub trait ProgressBarExt {
    /// Finish with a success message (green checkmark)
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with a warning message (yellow !)
    fn finish_warning(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✓ {}", message.into()));
    }

    fn finish_warning(&self, message: impl Into<String>) {
        self.finish_with_message(format!("! {}", message.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_bar_tracks_position() {
        let pb = create_progress_bar(10, true);
        pb.inc(4);
        assert_eq!(pb.position(), 4);
        assert_eq!(pb.length(), Some(10));
        pb.finish_success("done");
        assert!(pb.is_finished());
    }
}
