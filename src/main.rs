//! xsnap - inspect snapshot previews produced by the emulator frontend.
//!
//! Provides both human-friendly and agent-friendly (robot mode) interfaces.
#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{self, BufReader, IsTerminal, Seek, SeekFrom};
use std::path::Path;

use clap::Parser;
use colored::Colorize;
use serde::Serialize;

use xsnap::cli::{self, Cli, Commands};
use xsnap::config::StoreConfig;
use xsnap::error::{Result, ResultExt, SnapError};
use xsnap::extra_data::{self, RewindReader};
use xsnap::logging::init_logging;
use xsnap::sidecar::{SidecarPaths, read_thumbnail, read_title};

/// Build information embedded at compile time.
mod build_info {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub fn git_sha() -> &'static str {
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    }

    pub fn git_dirty() -> &'static str {
        option_env!("VERGEN_GIT_DIRTY").unwrap_or("false")
    }

    pub fn build_timestamp() -> &'static str {
        option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown")
    }

    pub fn rustc_semver() -> &'static str {
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown")
    }

    pub fn target() -> &'static str {
        option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown")
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color || !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    init_logging(cli.use_json(), cli.verbose, cli.quiet);

    if let Err(e) = run(&cli) {
        output_error(&cli, &e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        None => {
            print_quick_start(cli);
            Ok(())
        }
        Some(Commands::Inspect(args)) => cmd_inspect(cli, args),
        Some(Commands::Export(args)) => cmd_export(cli, args),
        Some(Commands::Title(args)) => cmd_title(cli, args),
        Some(Commands::Chunk(args)) => cmd_chunk(cli, args),
        Some(Commands::Paths(args)) => cmd_paths(cli, args),
        Some(Commands::Version) => {
            cmd_version(cli);
            Ok(())
        }
    }
}

/// Store configuration from `--config` (if given) plus environment overrides.
fn load_config(cli: &Cli) -> Result<StoreConfig> {
    let config = match &cli.config {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };
    Ok(config.with_env_overrides())
}

// === Quick Start ===

fn print_quick_start(cli: &Cli) {
    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "tool": "xsnap",
                "version": build_info::VERSION,
                "description": "Inspect snapshot preview sidecars and extra-data chunks",
                "commands": {
                    "inspect": "xsnap inspect <FILE.thm> --robot",
                    "export": "xsnap export <FILE.thm> <OUT.png>",
                    "title": "xsnap title <NAME> --robot",
                    "chunk": "xsnap chunk <STATE> --offset <N> --robot",
                    "paths": "xsnap paths <NAME> --robot",
                },
                "output_modes": {
                    "human": "--format=text (default)",
                    "robot": "--robot or --format=json",
                    "compact": "--format=json-compact",
                },
            }),
        );
        return;
    }

    println!(
        "{} {} - snapshot preview tool\n",
        "xsnap".bold().cyan(),
        build_info::VERSION
    );
    println!("{}", "QUICK START".bold().underline());
    println!();
    println!("  {}  Show a thumbnail header", "xsnap inspect slot_1.thm".green());
    println!("  {}  Convert to PNG", "xsnap export slot_1.thm out.png".green());
    println!("  {}  Stored title", "xsnap title slot_1".green());
    println!("  {}  Decode title chunk", "xsnap chunk state.bin -o 4096".green());
    println!("  {}  Sidecar locations", "xsnap paths slot_1".green());
    println!();
    println!("Run {} for full help", "xsnap --help".yellow());
}

// === Command Implementations ===

#[derive(Serialize)]
struct InspectReport {
    file: String,
    version: u16,
    width: u16,
    height: u16,
    channels: u16,
    payload_len: usize,
}

fn cmd_inspect(cli: &Cli, args: &cli::InspectArgs) -> Result<()> {
    let thumb = read_thumbnail(&args.file)?;
    let header = thumb.header;
    let report = InspectReport {
        file: args.file.display().to_string(),
        version: header.version,
        width: header.width,
        height: header.height,
        channels: header.channels,
        payload_len: header.payload_len(),
    };

    if cli.use_json() {
        output_json(cli, &report);
    } else {
        println!("{}: {}", "File".bold(), report.file);
        println!("{}: {}", "Version".bold(), report.version);
        println!(
            "{}: {}x{} px, {} channels",
            "Size".bold(),
            report.width,
            report.height,
            report.channels
        );
        println!("{}: {} bytes", "Payload".bold(), report.payload_len);
    }
    Ok(())
}

fn cmd_export(cli: &Cli, args: &cli::ExportArgs) -> Result<()> {
    read_thumbnail(&args.file)?.export_png(&args.output)?;

    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "input": args.file.display().to_string(),
                "output": args.output.display().to_string(),
                "ok": true,
            }),
        );
    } else if !cli.quiet {
        println!("Exported {}", args.output.display());
    }
    Ok(())
}

fn cmd_title(cli: &Cli, args: &cli::NameArgs) -> Result<()> {
    let paths = sidecar_paths(cli, &args.name)?;
    let title = read_title(&paths.title)?;

    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "name": args.name,
                "path": paths.title.display().to_string(),
                "title": title,
            }),
        );
    } else {
        match title {
            Some(title) => println!("{title}"),
            None => println!("{}", "No title stored".yellow()),
        }
    }
    Ok(())
}

fn cmd_chunk(cli: &Cli, args: &cli::ChunkArgs) -> Result<()> {
    let chunk = decode_chunk_at(&args.file, args.offset)?;

    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "file": args.file.display().to_string(),
                "offset": args.offset,
                "present": chunk.is_some(),
                "chunk": chunk,
            }),
        );
    } else {
        match chunk {
            Some(chunk) => {
                println!("{}: {}", "Version".bold(), chunk.version);
                println!("{}: {} bytes", "Declared".bold(), chunk.declared_len);
                match chunk.title {
                    Some(title) => println!("{}: {}", "Title".bold(), title),
                    None => println!("{}: {}", "Title".bold(), "(not decoded)".dimmed()),
                }
            }
            None => println!("{}", "No extra-data chunk at this offset".yellow()),
        }
    }
    Ok(())
}

fn decode_chunk_at(path: &Path, offset: u64) -> Result<Option<extra_data::ExtraData>> {
    let mut file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    file.seek(SeekFrom::Start(offset))?;
    let mut reader = RewindReader::new(BufReader::new(file));
    extra_data::decode(&mut reader)
}

#[derive(Serialize)]
struct PathsReport {
    name: String,
    title: String,
    title_exists: bool,
    thumbnail: String,
    thumbnail_exists: bool,
}

fn cmd_paths(cli: &Cli, args: &cli::NameArgs) -> Result<()> {
    let paths = sidecar_paths(cli, &args.name)?;
    let report = PathsReport {
        name: args.name.clone(),
        title: paths.title.display().to_string(),
        title_exists: paths.title.exists(),
        thumbnail: paths.thumbnail.display().to_string(),
        thumbnail_exists: paths.thumbnail.exists(),
    };

    if cli.use_json() {
        output_json(cli, &report);
    } else {
        let mark = |exists: bool| if exists { "✓".green() } else { "✗".red() };
        println!("{} {}", mark(report.title_exists), report.title);
        println!("{} {}", mark(report.thumbnail_exists), report.thumbnail);
    }
    Ok(())
}

/// Sidecar paths for `name` without creating the preview directory.
fn sidecar_paths(cli: &Cli, name: &str) -> Result<SidecarPaths> {
    let dir = load_config(cli)?.preview_dir()?;
    Ok(SidecarPaths::new(&dir, name))
}

fn cmd_version(cli: &Cli) {
    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "version": build_info::VERSION,
                "git_sha": build_info::git_sha(),
                "git_dirty": build_info::git_dirty() == "true",
                "build_timestamp": build_info::build_timestamp(),
                "rustc_version": build_info::rustc_semver(),
                "target": build_info::target(),
            }),
        );
    } else {
        println!("xsnap {}", build_info::VERSION);
        println!(
            "git: {}{}",
            build_info::git_sha(),
            if build_info::git_dirty() == "true" {
                " (dirty)"
            } else {
                ""
            }
        );
        println!("built: {}", build_info::build_timestamp());
        println!("rustc: {}", build_info::rustc_semver());
        println!("target: {}", build_info::target());
    }
}

// === Output Helpers ===

fn output_json<T: Serialize>(cli: &Cli, data: &T) {
    let json = if cli.use_compact_json() {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    match json {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("{}: {e}", "Error".red().bold()),
    }
}

fn output_error(cli: &Cli, error: &SnapError) {
    if cli.use_json() {
        let json = serde_json::json!({
            "error": true,
            "message": error.to_string(),
            "suggestion": error.suggestion(),
            "recoverable": error.is_user_recoverable(),
        });
        eprintln!("{json:#}");
    } else {
        eprintln!("{}: {}", "Error".red().bold(), error);
        if let Some(suggestion) = error.suggestion() {
            eprintln!("{}: {}", "Hint".yellow(), suggestion);
        }
    }
}
