//! Sequential batch driver.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::info_span;

use crate::ArchiveHandle;
use crate::BatchConfig;
use crate::CancellationToken;
use crate::ExtractionError;
use crate::Result;
use crate::CollisionPolicy;
use crate::config::RecoveryLayout;
use crate::control::Pacer;
use crate::extraction::ExtractionEngine;
use crate::extraction::NameRegistry;
use crate::extraction::RecoveryEngine;
use crate::report::AggregateStats;
use crate::report::ArchiveFailure;
use crate::report::ArchiveState;
use crate::report::ArchiveSummary;
use crate::report::BatchObserver;
use crate::report::BatchReport;
use crate::report::RecoveryResult;
use crate::types::DestDir;

use super::discover_archives;

/// Processes every discovered archive: direct extraction, then recovery of
/// the members that failed.
///
/// Archives run one at a time in discovery order. A fatal error aborts only
/// the archive it occurred in; the batch continues with the next one unless
/// it was cancelled.
///
/// # Examples
///
/// ```no_run
/// use zipsalvage_core::BatchConfig;
/// use zipsalvage_core::BatchDriver;
/// use zipsalvage_core::NoopObserver;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BatchConfig::new("/mnt/takeout", "/srv/extracted");
/// let report = BatchDriver::new(config).run(&mut NoopObserver)?;
///
/// println!(
///     "{} files, {} extracted, {} unique names",
///     report.stats.files_found,
///     report.stats.total_extracted(),
///     report.stats.unique_count()
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BatchDriver {
    config: BatchConfig,
    cancel: CancellationToken,
    pacer: Arc<dyn Pacer>,
}

impl BatchDriver {
    /// Creates a driver using the configured pacing.
    #[must_use]
    pub fn new(config: BatchConfig) -> Self {
        let pacer: Arc<dyn Pacer> = Arc::new(config.pacing);
        Self {
            config,
            cancel: CancellationToken::new(),
            pacer,
        }
    }

    /// Uses an externally controlled cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Replaces the configured pacing with a custom pacer.
    #[must_use]
    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// Batch configuration.
    #[must_use]
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Runs the batch.
    ///
    /// # Errors
    ///
    /// Returns an error only if the batch cannot start: discovery fails or
    /// the output root cannot be created. Per-archive failures are collected
    /// in [`BatchReport::failures`].
    pub fn run(&self, observer: &mut dyn BatchObserver) -> Result<BatchReport> {
        let start = Instant::now();
        let archives = discover_archives(&self.config)?;
        let output = self.reserve_recovery_root(DestDir::create(&self.config.output_root)?);

        info!(
            source = %self.config.source_root.display(),
            output = %output.as_path().display(),
            archives = archives.len(),
            "starting batch"
        );
        observer.on_batch_start(archives.len());

        let extraction = ExtractionEngine::new(self.config.path_policy.clone())
            .with_pacer(Arc::clone(&self.pacer))
            .with_cancellation(self.cancel.clone());
        let recovery = RecoveryEngine::new(self.config.collision_policy)
            .with_pacer(Arc::clone(&self.pacer))
            .with_cancellation(self.cancel.clone());

        let mut report = BatchReport::new();
        let mut shared_registry = NameRegistry::new();
        let mut archive_dirs = NameRegistry::new();
        let total = archives.len();

        for (position, path) in archives.iter().enumerate() {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let _span = info_span!("archive", path = %path.display()).entered();
            observer.on_archive_start(path, position + 1, total);

            // Claimed for every archive so names do not depend on which ones fail.
            let stem = BatchConfig::archive_dir_name(path);
            let dir_name = archive_dirs
                .claim(&stem, CollisionPolicy::Suffix)
                .unwrap_or(stem);

            let outcome = self.process_archive(
                path,
                &dir_name,
                &output,
                &extraction,
                &recovery,
                &mut shared_registry,
                &mut report.stats,
                observer,
            );

            match outcome {
                Ok(summary) => {
                    report.stats.archives_processed += 1;
                    observer.on_archive_complete(&summary);
                    report.archives.push(summary);
                }
                Err(err) => {
                    error!(archive = %path.display(), error = %err, "archive failed");
                    let cancelled = matches!(err, ExtractionError::Cancelled);
                    report.stats.archives_failed += 1;
                    observer.on_state_change(path, ArchiveState::Failed);
                    observer.on_archive_failed(path, &err);
                    report.failures.push(ArchiveFailure {
                        path: path.clone(),
                        error: err,
                    });
                    if cancelled {
                        report.cancelled = true;
                        break;
                    }
                }
            }
        }

        report.duration = start.elapsed();
        log_summary(&report.stats);
        observer.on_batch_complete(&report);
        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    fn process_archive(
        &self,
        path: &Path,
        dir_name: &str,
        output: &DestDir,
        extraction: &ExtractionEngine,
        recovery: &RecoveryEngine,
        shared_registry: &mut NameRegistry,
        stats: &mut AggregateStats,
        observer: &mut dyn BatchObserver,
    ) -> Result<ArchiveSummary> {
        observer.on_state_change(path, ArchiveState::Pending);
        let mut archive = ArchiveHandle::open(path)?;
        let members = archive.list_members()?;
        stats.record_listing(&members);

        observer.on_state_change(path, ArchiveState::Extracting);
        let extracted = extraction.extract_members(&mut archive, &members, output, observer)?;
        stats.record_extraction(&extracted);

        let mut recovered = RecoveryResult::new();
        if extracted.has_failures() {
            observer.on_state_change(path, ArchiveState::Recovering);
            let recovery_dir = DestDir::create(self.config.recovery_dir_for(dir_name))?;

            let mut local_registry = NameRegistry::new();
            let registry = match self.config.recovery_layout {
                RecoveryLayout::Flat => shared_registry,
                RecoveryLayout::PerArchive => &mut local_registry,
            };

            recovered = recovery.recover(
                &mut archive,
                &extracted.failed,
                &recovery_dir,
                registry,
                observer,
            )?;
            stats.record_recovery(&recovered);
        }

        observer.on_state_change(path, ArchiveState::Done);
        info!(
            archive = %path.display(),
            found = extracted.found,
            extracted = extracted.extracted.len(),
            recovered = recovered.recovered.len(),
            still_failed = recovered.still_failed.len(),
            "archive done"
        );

        Ok(ArchiveSummary {
            path: path.to_path_buf(),
            state: ArchiveState::Done,
            extraction: extracted,
            recovery: recovered,
        })
    }

    /// Reserves the recovery root inside `output` when it is nested there.
    fn reserve_recovery_root(&self, output: DestDir) -> DestDir {
        let root = &self.config.recovery_root;
        let reserved = match root.strip_prefix(&self.config.output_root) {
            Ok(relative) => output.as_path().join(relative),
            Err(_) => match root.canonicalize() {
                Ok(canonical) => canonical,
                Err(_) => return output,
            },
        };

        if reserved != output.as_path() && reserved.starts_with(output.as_path()) {
            debug!(reserved = %reserved.display(), "recovery root reserved");
            output.with_reserved(reserved)
        } else {
            output
        }
    }
}

impl std::fmt::Debug for BatchDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchDriver")
            .field("config", &self.config)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

fn log_summary(stats: &AggregateStats) {
    info!(
        "Found {} files total with {} unique names",
        stats.files_found,
        stats.unique_count()
    );
    info!(
        "Extracted {} files ({} directly, {} recovered), {} still failed",
        stats.total_extracted(),
        stats.files_extracted,
        stats.files_recovered,
        stats.files_still_failed
    );
    info!(
        "Total size: {:.2} GB compressed, {:.2} GB uncompressed",
        stats.compressed_gb(),
        stats.uncompressed_gb()
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::NoopObserver;
    use crate::report::MemberOutcome;
    use crate::test_utils::ZipFixture;
    use crate::test_utils::write_corrupt_archive;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl BatchObserver for Recorder {
        fn on_batch_start(&mut self, archives: usize) {
            self.events.push(format!("batch:{archives}"));
        }

        fn on_archive_start(&mut self, path: &Path, current: usize, total: usize) {
            let name = path.file_name().unwrap().to_string_lossy();
            self.events.push(format!("archive:{name}:{current}/{total}"));
        }

        fn on_state_change(&mut self, _path: &Path, state: ArchiveState) {
            self.events.push(format!("state:{state}"));
        }

        fn on_member(&mut self, name: &str, outcome: MemberOutcome, _current: usize, _total: usize) {
            self.events.push(format!("member:{name}:{outcome:?}"));
        }

        fn on_archive_complete(&mut self, _summary: &ArchiveSummary) {
            self.events.push("complete".to_string());
        }

        fn on_archive_failed(&mut self, _path: &Path, _error: &ExtractionError) {
            self.events.push("failed".to_string());
        }

        fn on_batch_complete(&mut self, _report: &BatchReport) {
            self.events.push("end".to_string());
        }
    }

    #[test]
    fn test_state_sequence() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        ZipFixture::new()
            .file("ok.txt", b"ok")
            .file("/abs.txt", b"abs")
            .write_to(source.join("a.zip"));

        let mut recorder = Recorder::default();
        let config = BatchConfig::new(&source, temp.path().join("out"));
        BatchDriver::new(config).run(&mut recorder).unwrap();

        assert_eq!(
            recorder.events,
            [
                "batch:1",
                "archive:a.zip:1/1",
                "state:pending",
                "state:extracting",
                "member:ok.txt:Extracted",
                "member:/abs.txt:Failed",
                "state:recovering",
                "member:/abs.txt:Recovered",
                "state:done",
                "complete",
                "end",
            ]
        );
    }

    #[test]
    fn test_no_recovery_dir_without_failures() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        ZipFixture::new()
            .file("ok.txt", b"ok")
            .write_to(source.join("a.zip"));
        let output = temp.path().join("out");

        let report = BatchDriver::new(BatchConfig::new(&source, &output))
            .run(&mut NoopObserver)
            .unwrap();

        assert!(report.is_success());
        assert!(!output.join("_recovered").exists());
    }

    #[test]
    fn test_corrupt_archive_does_not_stop_batch() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        write_corrupt_archive(source.join("a-broken.zip"));
        ZipFixture::new()
            .file("x.txt", b"x")
            .write_to(source.join("b-good.zip"));

        let mut recorder = Recorder::default();
        let report = BatchDriver::new(BatchConfig::new(&source, temp.path().join("out")))
            .run(&mut recorder)
            .unwrap();

        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            ExtractionError::NotAnArchive { .. }
        ));
        assert_eq!(report.archives.len(), 1);
        assert_eq!(report.stats.files_found, 1);
        assert_eq!(report.stats.archives_failed, 1);
        assert!(!report.is_success());
        assert!(recorder.events.contains(&"failed".to_string()));
    }

    #[test]
    fn test_flat_layout_shares_registry() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        ZipFixture::new()
            .file("/x/photo.jpg", b"first")
            .write_to(source.join("a.zip"));
        ZipFixture::new()
            .file("/y/photo.jpg", b"second")
            .write_to(source.join("b.zip"));
        let recovery = temp.path().join("rescued");

        let config = BatchConfig::new(&source, temp.path().join("out"))
            .with_recovery_root(&recovery)
            .with_recovery_layout(RecoveryLayout::Flat);
        let report = BatchDriver::new(config).run(&mut NoopObserver).unwrap();

        assert_eq!(report.stats.files_recovered, 2);
        assert_eq!(fs::read(recovery.join("photo.jpg")).unwrap(), b"first");
        assert_eq!(fs::read(recovery.join("photo (1).jpg")).unwrap(), b"second");
    }

    #[test]
    fn test_per_archive_layout() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        ZipFixture::new()
            .file("/x/photo.jpg", b"first")
            .write_to(source.join("a.zip"));
        ZipFixture::new()
            .file("/y/photo.jpg", b"second")
            .write_to(source.join("b.zip"));
        let recovery = temp.path().join("rescued");

        let config = BatchConfig::new(&source, temp.path().join("out")).with_recovery_root(&recovery);
        BatchDriver::new(config).run(&mut NoopObserver).unwrap();

        assert_eq!(fs::read(recovery.join("a/photo.jpg")).unwrap(), b"first");
        assert_eq!(fs::read(recovery.join("b/photo.jpg")).unwrap(), b"second");
    }

    #[test]
    fn test_per_archive_layout_same_stem_in_subdirectories() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        ZipFixture::new()
            .file("/x/photo.jpg", b"first")
            .write_to(source.join("2019/takeout-001.zip"));
        ZipFixture::new()
            .file("/y/photo.jpg", b"second")
            .write_to(source.join("2020/takeout-001.zip"));
        let output = temp.path().join("out");

        let report = BatchDriver::new(BatchConfig::new(&source, &output))
            .run(&mut NoopObserver)
            .unwrap();

        assert_eq!(report.stats.files_recovered, 2);
        let recovered = output.join("_recovered");
        assert_eq!(
            fs::read(recovered.join("takeout-001/photo.jpg")).unwrap(),
            b"first"
        );
        assert_eq!(
            fs::read(recovered.join("takeout-001 (1)/photo.jpg")).unwrap(),
            b"second"
        );
    }

    #[test]
    fn test_member_under_recovery_root_is_recovered_not_extracted() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        ZipFixture::new()
            .file("_recovered/batch/passwd", b"planted")
            .file("/etc/../passwd", b"root:x:0:0")
            .file("notes.txt", b"notes")
            .write_to(source.join("batch.zip"));
        let output = temp.path().join("out");

        let report = BatchDriver::new(BatchConfig::new(&source, &output))
            .run(&mut NoopObserver)
            .unwrap();

        let summary = &report.archives[0];
        assert_eq!(summary.extraction.extracted, ["notes.txt"]);
        assert_eq!(
            summary.recovery.recovered,
            ["_recovered/batch/passwd", "/etc/../passwd"]
        );
        let recovered = output.join("_recovered/batch");
        assert_eq!(fs::read(recovered.join("passwd")).unwrap(), b"planted");
        assert_eq!(
            fs::read(recovered.join("passwd (1)")).unwrap(),
            b"root:x:0:0"
        );
        assert!(!recovered.join("batch").exists());
    }

    #[test]
    fn test_cancelled_before_start() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        ZipFixture::new()
            .file("x.txt", b"x")
            .write_to(source.join("a.zip"));
        let token = CancellationToken::new();
        token.cancel();

        let report = BatchDriver::new(BatchConfig::new(&source, temp.path().join("out")))
            .with_cancellation(token)
            .run(&mut NoopObserver)
            .unwrap();

        assert!(report.cancelled);
        assert!(report.archives.is_empty());
        assert!(!report.is_success());
    }

    #[test]
    fn test_missing_source_is_error() {
        let temp = TempDir::new().unwrap();
        let config = BatchConfig::new(temp.path().join("missing"), temp.path().join("out"));
        let result = BatchDriver::new(config).run(&mut NoopObserver);
        assert!(matches!(result, Err(ExtractionError::Discovery { .. })));
    }
}
