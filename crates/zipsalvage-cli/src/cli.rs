//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;
use zipsalvage_core::BatchConfig;
use zipsalvage_core::CollisionPolicy;
use zipsalvage_core::Pacing;
use zipsalvage_core::PathPolicy;
use zipsalvage_core::RecoveryLayout;

#[derive(Parser)]
#[command(name = "zipsalvage")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Directory for the detailed log file
    #[arg(long, global = true, value_name = "DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    /// Do not write a log file
    #[arg(long, global = true)]
    pub no_log_file: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract every archive below SOURCE and recover members with bad paths
    Extract(ExtractArgs),
    /// Count members and sizes across archives without extracting
    Survey(SurveyArgs),
    /// List archive contents without extraction
    List(ListArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Directory to search for archives
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Output directory for extracted files
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Directory for recovered members (default: OUTPUT/_recovered)
    #[arg(long, value_name = "DIR")]
    pub recovery_dir: Option<PathBuf>,

    /// Archive file name pattern (case-insensitive glob)
    #[arg(long, default_value = zipsalvage_core::config::DEFAULT_PATTERN)]
    pub pattern: String,

    /// Maximum directory depth to search (1 = SOURCE only)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_depth: Option<u32>,

    /// Pause after each member, in milliseconds
    #[arg(long, value_name = "MS", default_value = "0")]
    pub pace_ms: u64,

    /// What to do when two recovered members share a file name
    #[arg(long, value_enum, default_value_t = CollisionArg::Suffix)]
    pub collision: CollisionArg,

    /// Recover every archive into one shared directory
    #[arg(long)]
    pub flat_recovery: bool,

    /// Extract absolute member paths under OUTPUT instead of recovering them
    #[arg(long)]
    pub allow_absolute_paths: bool,

    /// Maximum number of segments in an extracted path
    #[arg(long, default_value = "64", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_path_depth: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CollisionArg {
    /// Append " (1)", " (2)", ... before the extension
    Suffix,
    /// Replace the earlier file
    Overwrite,
    /// Leave the later member unrecovered
    Reject,
}

impl From<CollisionArg> for CollisionPolicy {
    fn from(arg: CollisionArg) -> Self {
        match arg {
            CollisionArg::Suffix => Self::Suffix,
            CollisionArg::Overwrite => Self::Overwrite,
            CollisionArg::Reject => Self::Reject,
        }
    }
}

impl ExtractArgs {
    /// Builds the batch configuration these arguments describe.
    pub fn to_config(&self) -> BatchConfig {
        let mut config = BatchConfig::new(&self.source, &self.output)
            .with_pattern(self.pattern.clone())
            .with_max_depth(self.max_depth.map(|d| d as usize))
            .with_collision_policy(self.collision.into())
            .with_path_policy(PathPolicy {
                allow_absolute_paths: self.allow_absolute_paths,
                max_path_depth: self.max_path_depth as usize,
                ..PathPolicy::default()
            });

        if let Some(dir) = &self.recovery_dir {
            config = config.with_recovery_root(dir);
        }
        if self.flat_recovery {
            config = config.with_recovery_layout(RecoveryLayout::Flat);
        }
        if self.pace_ms > 0 {
            config = config.with_pacing(Pacing::Fixed(Duration::from_millis(self.pace_ms)));
        }

        config
    }
}

#[derive(clap::Args)]
pub struct SurveyArgs {
    /// Directory to search for archives
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Archive file name pattern (case-insensitive glob)
    #[arg(long, default_value = zipsalvage_core::config::DEFAULT_PATTERN)]
    pub pattern: String,

    /// Maximum directory depth to search (1 = SOURCE only)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_depth: Option<u32>,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Show detailed member information
    #[arg(short, long)]
    pub long: bool,

    /// Show sizes in human-readable format
    #[arg(short = 'H', long)]
    pub human_readable: bool,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
