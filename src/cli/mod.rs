//! CLI argument definitions.

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Snapshot preview tool - inspect thumbnails, titles and extra-data chunks.
///
/// Robot Mode: Use --robot for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "xsnap", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (text for humans, json for agents/scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "XSNAP_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose output (repeat for more detail)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output (NO_COLOR: any value but 0/false/no/off)
    #[arg(long, global = true, env = "NO_COLOR", value_parser = FalseyValueParser::new())]
    pub no_color: bool,

    /// Path to a TOML store configuration
    #[arg(long, short = 'c', global = true, env = "XSNAP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and agents
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the header of a thumbnail sidecar
    Inspect(InspectArgs),

    /// Convert a thumbnail sidecar to an upright PNG
    Export(ExportArgs),

    /// Print the stored title for a snapshot
    Title(NameArgs),

    /// Decode an extra-data chunk from a state stream
    Chunk(ChunkArgs),

    /// Show where the sidecars for a snapshot live
    Paths(NameArgs),

    /// Show version and build information
    Version,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Path to a .thm file
    #[arg(value_name = "THM")]
    pub file: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Path to a .thm file
    #[arg(value_name = "THM")]
    pub file: PathBuf,

    /// Output PNG path
    #[arg(value_name = "PNG")]
    pub output: PathBuf,
}

#[derive(Parser, Debug)]
pub struct NameArgs {
    /// Snapshot name
    pub name: String,
}

#[derive(Parser, Debug)]
pub struct ChunkArgs {
    /// File holding the state stream
    pub file: PathBuf,

    /// Byte offset where the engine's own state ends
    #[arg(long, short = 'o', default_value = "0")]
    pub offset: u64,
}
