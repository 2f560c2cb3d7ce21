//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{Concern, SourceType, Usage};
use crate::render::OutputFormat;
use crate::views::{GalleryLayout, SortOrder};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// WaterWatch - community water quality reports from the terminal
///
/// Submit reports about local water sources, import batches from CSV,
/// browse them as a gallery or table, follow weekly trends per zip code
/// and ask an AI model to summarize what is going on.
///
/// Examples:
///   waterwatch submit --address "12 Elm St" --zipcode 10001 --description "Brown water" --concern discoloration --source-type faucet --used yes
///   waterwatch --journal reports.jsonl import reports.csv
///   waterwatch gallery --zip 10001 --sort oldest --view detailed
///   waterwatch table --output export.csv --importable
///   waterwatch summarize --zip 10001
///   waterwatch init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .waterwatch.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// JSON-lines file that keeps reports between runs
    ///
    /// Without a journal, reports only live for the current run or session.
    #[arg(long, value_name = "FILE", env = "WATERWATCH_JOURNAL", global = true)]
    pub journal: Option<PathBuf>,

    /// Directory where uploaded photos are stored
    #[arg(long, value_name = "DIR", global = true)]
    pub photo_dir: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT", global = true)]
    pub format: Option<OutputFormat>,

    /// Model used for summaries
    #[arg(long, env = "WATERWATCH_MODEL", global = true)]
    pub model: Option<String>,

    /// Summary request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Dashboard operations.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Submit a new report
    Submit(SubmitArgs),

    /// Merge reports from a CSV file
    ///
    /// The file needs a header row with: timestamp, address, zipcode,
    /// description, concerns, type, used, symptoms, alert, photo_path.
    Import {
        /// CSV file to import
        #[arg(value_name = "CSV")]
        path: PathBuf,
    },

    /// Browse reports as a gallery
    Gallery {
        /// Only show reports for this zip code ("all" shows everything)
        #[arg(long, value_name = "ZIP")]
        zip: Option<String>,

        /// Sort by report time
        #[arg(long, value_enum, default_value_t = SortOrder::Newest)]
        sort: SortOrder,

        /// Gallery layout
        #[arg(long, value_enum, default_value_t = GalleryLayout::Grid)]
        view: GalleryLayout,
    },

    /// Show every report as a table, or export it as CSV
    Table {
        /// Write CSV to this file ("-" for stdout) instead of rendering
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Add an empty photo_path column so the export can be imported again
        #[arg(long, requires = "output")]
        importable: bool,
    },

    /// Weekly report counts per zip code
    Trends {
        /// Only show this zip code's series
        #[arg(long, value_name = "ZIP")]
        zip: Option<String>,
    },

    /// Ask the AI model to summarize recent reports for a zip code
    Summarize {
        /// Zip code to summarize
        #[arg(long, value_name = "ZIP")]
        zip: String,
    },

    /// Run several commands against the same reports, one per stdin line
    Session,

    /// Generate a default .waterwatch.toml configuration file
    InitConfig,
}

/// Fields of a new report.
#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct SubmitArgs {
    /// Street address or intersection
    #[arg(long, default_value = "")]
    pub address: String,

    /// Zip code
    #[arg(long)]
    pub zipcode: String,

    /// What you noticed (at most 300 characters are kept)
    #[arg(long, default_value = "")]
    pub description: String,

    /// Observed concern; repeat or separate with commas
    ///
    /// Values: discoloration, foul-smell, foam, bugs, industrial-area, trash-nearby
    #[arg(long = "concern", value_name = "CONCERN", value_delimiter = ',', value_parser = Concern::parse_listed)]
    pub concerns: Vec<Concern>,

    /// Type of water source
    ///
    /// Values: faucet, river-stream, pipe-leak, fountain, rainwater-pool, other
    #[arg(long, value_parser = SourceType::parse_listed)]
    pub source_type: SourceType,

    /// Did you use this water? (yes, no)
    #[arg(long, value_parser = Usage::parse_listed)]
    pub used: Usage,

    /// Symptoms after use, if any
    #[arg(long)]
    pub symptoms: Option<String>,

    /// Request a community alert
    #[arg(long)]
    pub alert: bool,

    /// Photo of the water source
    #[arg(long, value_name = "FILE")]
    pub photo: Option<PathBuf>,
}

/// One line of an interactive session, parsed without a binary name.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
pub struct SessionLine {
    #[command(subcommand)]
    pub command: Command,
}

impl SessionLine {
    /// Split a session line with shell-style quoting and parse it.
    ///
    /// Returns `Ok(None)` for blank lines.
    pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
        let words = shell_words::split(line).map_err(|e| format!("Invalid quoting: {}", e))?;
        if words.is_empty() {
            return Ok(None);
        }

        SessionLine::try_parse_from(words)
            .map(|parsed| Some(parsed.command))
            .map_err(|e| e.to_string())
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        validate_command(&self.command)
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `[general] verbose` setting; `--quiet` wins
    /// over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// Checks that clap cannot express on its own.
pub fn validate_command(command: &Command) -> Result<(), String> {
    match command {
        Command::Submit(submit) => {
            if let Some(ref photo) = submit.photo {
                if !photo.is_file() {
                    return Err(format!("Photo file does not exist: {}", photo.display()));
                }
            }
            Ok(())
        }
        Command::Import { path } => {
            if !path.is_file() {
                return Err(format!("CSV file does not exist: {}", path.display()));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
