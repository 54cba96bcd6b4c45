use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages (default)
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "talkdex")]
#[command(about = "talkdex - ingest conference talk transcripts into a searchable embedding store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/talkdex/config.toml)
    #[arg(short = 'C', long, global = true, env = "TALKDEX_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Effective log level: `--log-level`, else `--verbose`, else info
    pub fn level_filter(&self) -> LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.into(),
            (None, true) => LevelFilter::DEBUG,
            (None, false) => LevelFilter::INFO,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest videos from a discovery manifest into the database
    Ingest(IngestArgs),

    /// Run integrity checks on an existing database
    Verify {
        /// Database file
        #[arg(long)]
        db: PathBuf,
    },

    /// Refresh indexes and reclaim space in an existing database
    Optimize {
        /// Database file
        #[arg(long)]
        db: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// Output database file (overrides storage.path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Discovery manifest (JSON array of {video, transcript})
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Only ingest videos from this channel id
    #[arg(long, conflicts_with = "playlist")]
    pub channel: Option<String>,

    /// Only ingest videos from this playlist (URL or id)
    #[arg(long)]
    pub playlist: Option<String>,

    /// Maximum number of videos to ingest
    #[arg(short = 'n', long)]
    pub max_videos: Option<usize>,

    /// Videos per storage commit
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Skip this many discovered videos (resume cursor from a previous run)
    #[arg(long)]
    pub start_at: Option<usize>,

    /// Skip videos whose transcript is unchanged since the last ingest
    #[arg(long)]
    pub skip_unchanged: bool,
}
