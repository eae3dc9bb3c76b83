use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for pagewire
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "pagewire: post-processing for rendered blog pages"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Option<Commands>,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to the configuration file (TOML or JSON). Defaults to
  /// `pagewire.toml` in the working directory when present.
  #[arg(short = 'c', long = "config-file", global = true)]
  pub config_file: Option<PathBuf>,
}

/// All supported subcommands for the pagewire CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new pagewire configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "pagewire.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Process a directory of rendered HTML pages.
  Build {
    /// Directory containing the rendered site.
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Output directory for the processed site.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of threads to use for parallel processing.
    #[arg(short = 'p', long = "jobs")]
    jobs: Option<usize>,

    /// Leave code blocks unhighlighted.
    #[arg(long = "no-highlight")]
    no_highlight: bool,

    /// Do not generate tables of contents.
    #[arg(long = "no-toc")]
    no_toc: bool,

    /// Render highlighted code one element per line.
    #[arg(long = "split-lines")]
    split_lines: bool,
  },

  /// Submit a friend-link request to a running site.
  FriendLink {
    /// Base URL of the site, e.g. `https://blog.example`. Falls back to
    /// `site_url` from the configuration.
    #[arg(short, long)]
    site: Option<String>,

    /// Form field in KEY=VALUE form (can be specified multiple times).
    #[arg(short, long = "field", action = clap::ArgAction::Append, required = true)]
    fields: Vec<String>,
  },
}

impl Cli {
  /// Parse command line arguments
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
