//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use super::formatter::batch_problem;
use anyhow::Result;
use console::Term;
use console::style;
use std::time::Duration;
use zipsalvage_core::ArchiveListing;
use zipsalvage_core::BatchReport;
use zipsalvage_core::SurveyReport;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn format_duration(duration: Duration) -> String {
        let secs = duration.as_secs();
        if secs >= 3600 {
            format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
        } else if secs >= 60 {
            format!("{}m{}s", secs / 60, secs % 60)
        } else {
            format!("{}.{}s", secs, duration.subsec_millis() / 100)
        }
    }

    fn heading(&self, marker: &str, text: &str, color: console::Color) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {text}", style(marker).fg(color).bold()));
        } else {
            let _ = self.term.write_line(text);
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_batch_report(&self, report: &BatchReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        match batch_problem(report) {
            None => self.heading("✓", "Extraction complete", console::Color::Green),
            Some(problem) => self.heading(
                "✗",
                &format!("Extraction finished: {problem}"),
                console::Color::Red,
            ),
        }

        let stats = &report.stats;
        self.line(&format!(
            "  Archives:         {} processed, {} failed",
            Self::format_number(stats.archives_processed),
            Self::format_number(stats.archives_failed)
        ));
        self.line(&format!(
            "  Files found:      {} ({} unique names)",
            Self::format_number(stats.files_found),
            Self::format_number(stats.unique_count())
        ));
        self.line(&format!(
            "  Extracted:        {}",
            Self::format_number(stats.files_extracted)
        ));
        self.line(&format!(
            "  Recovered:        {}",
            Self::format_number(stats.files_recovered)
        ));
        self.line(&format!(
            "  Still failed:     {}",
            Self::format_number(stats.files_still_failed)
        ));
        self.line(&format!(
            "  Total size:       {} ({} compressed)",
            Self::format_size(stats.total_uncompressed),
            Self::format_size(stats.total_compressed)
        ));

        if self.verbose {
            self.line(&format!(
                "  Duration:         {}",
                Self::format_duration(report.duration)
            ));
            self.line("");
            for summary in &report.archives {
                self.line(&format!(
                    "  {}: {}/{} extracted, {} recovered, {} still failed",
                    summary.path.display(),
                    summary.extraction.extracted.len(),
                    summary.extraction.found,
                    summary.recovery.recovered.len(),
                    summary.recovery.still_failed.len()
                ));
            }
        }

        let still_failed: Vec<_> = report
            .archives
            .iter()
            .flat_map(|s| s.recovery.still_failed.iter().map(move |n| (&s.path, n)))
            .collect();
        if !still_failed.is_empty() {
            self.line("");
            self.heading("⚠", "Members not recovered:", console::Color::Yellow);
            for (archive, name) in still_failed {
                self.line(&format!("  {}: {name}", archive.display()));
            }
        }

        if !report.failures.is_empty() {
            self.line("");
            self.heading("✗", "Failed archives:", console::Color::Red);
            for failure in &report.failures {
                self.line(&format!("  {}: {}", failure.path.display(), failure.error));
            }
        }

        Ok(())
    }

    fn format_survey(&self, report: &SurveyReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.verbose {
            for listing in &report.archives {
                self.line(&format!(
                    "{:>8} members {:>10}  {}",
                    Self::format_number(listing.members.len()),
                    Self::format_size(listing.total_size()),
                    listing.path.display()
                ));
            }
            self.line("");
        }

        let stats = &report.stats;
        self.line(&format!(
            "Found {} files total with {} unique names.",
            stats.files_found,
            stats.unique_count()
        ));
        self.line(&format!(
            "Total compressed size: {:.2} GB, uncompressed: {:.2} GB",
            stats.compressed_gb(),
            stats.uncompressed_gb()
        ));

        for failure in &report.failures {
            self.format_warning(&format!(
                "Unreadable archive {}: {}",
                failure.path.display(),
                failure.error
            ));
        }

        Ok(())
    }

    fn format_listing_short(&self, listing: &ArchiveListing) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for member in &listing.members {
            self.line(&member.name);
        }

        Ok(())
    }

    fn format_listing_long(&self, listing: &ArchiveListing, human_readable: bool) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for member in &listing.members {
            let size_str = if human_readable {
                Self::format_size(member.size)
            } else {
                member.size.to_string()
            };
            let type_char = if member.is_dir { "d" } else { "-" };
            let modified = member
                .modified
                .map_or_else(|| "-".to_string(), |m| m.to_string());

            self.line(&format!(
                "{type_char} {:<12} {:>4} {:<8} {:>19} {:>10}  {}",
                member.host.to_string(),
                member.version_string(),
                member.compression,
                modified,
                size_str,
                member.name
            ));
        }

        self.line("");
        self.line(&format!(
            "Total: {} files, {}",
            Self::format_number(listing.file_count()),
            Self::format_size(listing.total_size())
        ));

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}
