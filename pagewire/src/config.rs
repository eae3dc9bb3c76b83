use std::{
  fs,
  io,
  path::{Path, PathBuf},
};

use pagewire_dom::{PageOptions, friend_link::FriendLinkMessages};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::{Cli, Commands};

/// Error type for configuration handling
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Failed to read {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to parse JSON config: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Failed to parse TOML config: {0}")]
  TomlDe(#[from] toml::de::Error),

  #[error("Failed to serialize TOML config: {0}")]
  TomlSer(#[from] toml::ser::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// File names looked up in the working directory, in order.
pub const CONFIG_FILENAMES: &[&str] = &[
  "pagewire.toml",
  "pagewire.json",
  ".pagewire.toml",
  ".pagewire.json",
];

fn default_input_dir() -> PathBuf {
  PathBuf::from("public")
}

fn default_output_dir() -> PathBuf {
  PathBuf::from("build")
}

fn default_content_selector() -> String {
  "article".to_string()
}

fn default_toc_container_selector() -> String {
  "#toc".to_string()
}

const fn default_true() -> bool {
  true
}

/// Configuration options for pagewire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
  /// Directory containing the rendered site
  #[serde(default = "default_input_dir")]
  pub input_dir: PathBuf,

  /// Output directory for the processed site
  #[serde(default = "default_output_dir")]
  pub output_dir: PathBuf,

  /// Number of threads to use for parallel processing
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub jobs: Option<usize>,

  /// Whether to enable syntax highlighting for code blocks
  #[serde(default = "default_true")]
  pub highlight_code: bool,

  /// Theme to write `highlight.css` for. No stylesheet is written when unset.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub highlight_theme: Option<String>,

  /// Whether highlighted code is rendered one element per line
  #[serde(default)]
  pub split_lines: bool,

  /// Whether absolute http(s) links open in a new tab
  #[serde(default = "default_true")]
  pub rewrite_links: bool,

  /// Whether to number headings and render the table of contents
  #[serde(default = "default_true")]
  pub generate_toc: bool,

  /// Selector of the article content root
  #[serde(default = "default_content_selector")]
  pub content_selector: String,

  /// Selector of the element receiving the table of contents
  #[serde(default = "default_toc_container_selector")]
  pub toc_container_selector: String,

  /// Base URL of the deployed site, used for friend-link requests
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub site_url: Option<String>,

  /// Texts reported for friend-link submissions
  #[serde(default)]
  pub friend_link_messages: FriendLinkMessages,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      input_dir:              default_input_dir(),
      output_dir:             default_output_dir(),
      jobs:                   None,
      highlight_code:         true,
      highlight_theme:        None,
      split_lines:            false,
      rewrite_links:          true,
      generate_toc:           true,
      content_selector:       default_content_selector(),
      toc_container_selector: default_toc_container_selector(),
      site_url:               None,
      friend_link_messages:   FriendLinkMessages::default(),
    }
  }
}

impl Config {
  /// Create a new configuration from a file.
  /// Only TOML and JSON are supported.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read, has an unknown extension or
  /// does not parse.
  pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| {
      ConfigError::Io {
        path: path.to_path_buf(),
        source,
      }
    })?;

    let extension = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase);

    match extension.as_deref() {
      Some("json") => Ok(serde_json::from_str(&content)?),
      Some("toml") => Ok(toml::from_str(&content)?),
      Some(_) => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }

  /// Load config from file and CLI arguments.
  ///
  /// # Errors
  ///
  /// Returns an error if an explicit or discovered config file cannot be
  /// loaded.
  pub fn load(cli: &Cli) -> ConfigResult<Self> {
    let mut config = if let Some(config_path) = &cli.config_file {
      Self::from_file(config_path)?
    } else if let Some(discovered) = Self::find_config_file() {
      log::info!("Using discovered config file: {}", discovered.display());
      Self::from_file(&discovered)?
    } else {
      Self::default()
    };

    config.merge_with_cli(cli);
    Ok(config)
  }

  /// Merge CLI arguments into this config, prioritizing CLI values when
  /// present
  pub fn merge_with_cli(&mut self, cli: &Cli) {
    match &cli.command {
      Some(Commands::Build {
        input_dir,
        output_dir,
        jobs,
        no_highlight,
        no_toc,
        split_lines,
      }) => {
        if let Some(input_dir) = input_dir {
          self.input_dir.clone_from(input_dir);
        }

        if let Some(output_dir) = output_dir {
          self.output_dir.clone_from(output_dir);
        }

        self.jobs = jobs.or(self.jobs);

        // Flags only ever switch a pass off (or line splitting on)
        if *no_highlight {
          self.highlight_code = false;
        }
        if *no_toc {
          self.generate_toc = false;
        }
        if *split_lines {
          self.split_lines = true;
        }
      },
      Some(Commands::FriendLink {
        site: Some(site), ..
      }) => {
        self.site_url = Some(site.clone());
      },
      _ => {},
    }
  }

  /// Search for a config file in the working directory
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    Self::find_config_file_in(&current_dir)
  }

  /// Search for a config file in `dir`
  #[must_use]
  pub fn find_config_file_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
      .iter()
      .map(|filename| dir.join(filename))
      .find(|path| path.is_file())
  }

  /// Check that the input directory exists and is distinct from the output.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::Config`] describing every problem found.
  pub fn validate_paths(&self) -> ConfigResult<()> {
    let mut errors = Vec::new();

    if !self.input_dir.exists() {
      errors.push(format!(
        "Input directory does not exist: {}",
        self.input_dir.display()
      ));
    } else if !self.input_dir.is_dir() {
      errors.push(format!(
        "Input path is not a directory: {}",
        self.input_dir.display()
      ));
    }

    if self.input_dir == self.output_dir {
      errors.push(format!(
        "Input and output directory are the same: {}",
        self.input_dir.display()
      ));
    }

    if errors.is_empty() {
      Ok(())
    } else {
      Err(ConfigError::Config(errors.join("\n")))
    }
  }

  /// Page pipeline options derived from this configuration.
  #[must_use]
  pub fn page_options(&self) -> PageOptions {
    PageOptions {
      enhance_code:           true,
      split_lines:            self.split_lines,
      rewrite_links:          self.rewrite_links,
      generate_toc:           self.generate_toc,
      content_selector:       self.content_selector.clone(),
      toc_container_selector: self.toc_container_selector.clone(),
    }
  }

  /// Render the default configuration in `format` (`toml` or `json`).
  ///
  /// # Errors
  ///
  /// Returns an error for unknown formats or if serialization fails.
  pub fn default_config_content(format: &str) -> ConfigResult<String> {
    let config = Self {
      highlight_theme: Some("Github".to_string()),
      ..Self::default()
    };
    match format {
      "toml" => Ok(toml::to_string_pretty(&config)?),
      "json" => Ok(serde_json::to_string_pretty(&config)?),
      other => {
        Err(ConfigError::Config(format!(
          "Unsupported config format: {other}"
        )))
      },
    }
  }

  /// Write the default configuration to `path`.
  ///
  /// # Errors
  ///
  /// Returns an error if the content cannot be rendered or written.
  pub fn generate_default_config(format: &str, path: &Path) -> ConfigResult<()> {
    let content = Self::default_config_content(format)?;
    fs::write(path, content).map_err(|source| {
      ConfigError::Io {
        path: path.to_path_buf(),
        source,
      }
    })?;
    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}

#[cfg(test)]
#[allow(clippy::expect_used, reason = "Fine in tests")]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_fill_missing_keys() {
    let config: Config =
      toml::from_str("output_dir = \"dist\"\nsplit_lines = true\n")
        .expect("valid toml");
    assert_eq!(config.input_dir, PathBuf::from("public"));
    assert_eq!(config.output_dir, PathBuf::from("dist"));
    assert!(config.split_lines);
    assert!(config.highlight_code);
    assert_eq!(config.toc_container_selector, "#toc");
  }

  #[test]
  fn test_default_config_round_trips_through_both_formats() {
    for format in ["toml", "json"] {
      let content = Config::default_config_content(format).expect("renders");
      let parsed: Config = if format == "toml" {
        toml::from_str(&content).expect("parses")
      } else {
        serde_json::from_str(&content).expect("parses")
      };
      assert_eq!(parsed.highlight_theme.as_deref(), Some("Github"));
      assert_eq!(parsed.content_selector, "article");
    }
    assert!(Config::default_config_content("yaml").is_err());
  }

  #[test]
  fn test_cli_overrides_file_values() {
    let cli = Cli {
      command:     Some(Commands::Build {
        input_dir:    Some(PathBuf::from("site")),
        output_dir:   None,
        jobs:         Some(2),
        no_highlight: true,
        no_toc:       false,
        split_lines:  true,
      }),
      verbose:     false,
      config_file: None,
    };
    let mut config = Config {
      output_dir: PathBuf::from("out"),
      jobs: Some(8),
      ..Config::default()
    };
    config.merge_with_cli(&cli);

    assert_eq!(config.input_dir, PathBuf::from("site"));
    assert_eq!(config.output_dir, PathBuf::from("out"));
    assert_eq!(config.jobs, Some(2));
    assert!(!config.highlight_code);
    assert!(config.generate_toc);
    assert!(config.split_lines);
  }

  #[test]
  fn test_page_options_follow_config() {
    let config = Config {
      rewrite_links: false,
      content_selector: "main".into(),
      ..Config::default()
    };
    let options = config.page_options();
    assert!(!options.rewrite_links);
    assert_eq!(options.content_selector, "main");
  }
}
