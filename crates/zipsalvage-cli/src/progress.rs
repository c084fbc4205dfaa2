//! Progress bars for batch extraction.

use console::Term;
use indicatif::MultiProgress;
use indicatif::ProgressBar;
use indicatif::ProgressDrawTarget;
use indicatif::ProgressStyle;
use std::path::Path;
use zipsalvage_core::ArchiveState;
use zipsalvage_core::ArchiveSummary;
use zipsalvage_core::BatchObserver;
use zipsalvage_core::BatchReport;
use zipsalvage_core::ExtractionError;
use zipsalvage_core::MemberOutcome;

/// Creates the shared progress surface.
///
/// Bars are drawn on stderr only when it is a terminal and output is neither
/// quiet nor JSON; otherwise everything is hidden and log lines pass through
/// unchanged.
pub fn create_display(quiet: bool, json: bool) -> MultiProgress {
    if !quiet && !json && CliProgress::should_show() {
        MultiProgress::new()
    } else {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    }
}

/// CLI progress display implementing `BatchObserver`.
///
/// Shows one bar for archives and one for members of the current archive.
/// Automatically cleans up on drop.
pub struct CliProgress {
    archives: ProgressBar,
    members: ProgressBar,
}

impl CliProgress {
    /// Adds the archive and member bars to `multi`.
    #[must_use]
    pub fn new(multi: &MultiProgress) -> Self {
        let archives = multi.add(ProgressBar::new(0));
        // Template: "Archives [████████░░░░] 3/12 takeout-003.zip (1m02s)"
        archives.set_style(
            ProgressStyle::default_bar()
                .template("Archives [{bar:40.cyan/blue}] {pos}/{len} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );

        let members = multi.add(ProgressBar::new(0));
        // Template: "extracting [██████░░░░░░] 420/1000 IMG_0420.jpg"
        members.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:>10} [{bar:40.green/white}] {pos}/{len} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );

        Self { archives, members }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stderr().is_term()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.members.finish_and_clear();
        self.archives.finish_and_clear();
    }
}

impl BatchObserver for CliProgress {
    fn on_batch_start(&mut self, archives: usize) {
        self.archives.set_length(archives as u64);
        self.archives.set_position(0);
    }

    fn on_archive_start(&mut self, path: &Path, _current: usize, _total: usize) {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        self.archives.set_message(name);
        self.members.set_length(0);
        self.members.set_position(0);
        self.members.set_message("");
    }

    fn on_state_change(&mut self, _path: &Path, state: ArchiveState) {
        self.members.set_prefix(state.to_string());
    }

    fn on_member(&mut self, name: &str, _outcome: MemberOutcome, current: usize, total: usize) {
        self.members.set_length(total as u64);
        self.members.set_position(current as u64);
        self.members.set_message(name.to_string());
    }

    fn on_archive_complete(&mut self, _summary: &ArchiveSummary) {
        self.archives.inc(1);
    }

    fn on_archive_failed(&mut self, _path: &Path, _error: &ExtractionError) {
        self.archives.inc(1);
    }

    fn on_batch_complete(&mut self, _report: &BatchReport) {
        self.members.finish_and_clear();
        self.archives.finish_and_clear();
    }
}
