use std::fs;

use color_eyre::eyre::{Context, Result, bail};
use log::{LevelFilter, info};
use pagewire::{
  cli::{Cli, Commands},
  config::Config,
  render,
  submit,
};

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  if let Some(Commands::Init {
    output,
    format,
    force,
  }) = &cli.command
  {
    // Check if file already exists and that we're not forcing overwrite
    if output.exists() && !force {
      bail!(
        "Configuration file already exists: {}. Use --force to overwrite.",
        output.display()
      );
    }

    if let Some(parent) = output.parent() {
      if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent).wrap_err_with(|| {
          format!("Failed to create directory: {}", parent.display())
        })?;
        info!("Created directory: {}", parent.display());
      }
    }

    Config::generate_default_config(format, output).wrap_err_with(|| {
      format!(
        "Failed to generate configuration file: {}",
        output.display()
      )
    })?;
    return Ok(());
  }

  let config = Config::load(&cli).wrap_err("Failed to load configuration")?;

  match &cli.command {
    Some(Commands::FriendLink { fields, .. }) => {
      submit::submit_to_site(&config, fields)
        .wrap_err("Friend link request was not accepted")?;
    },
    // Building is the default when no subcommand is given
    _ => {
      info!("Processing site in {}", config.input_dir.display());
      render::build_site(&config).wrap_err_with(|| {
        format!("Failed to process {}", config.input_dir.display())
      })?;
    },
  }

  Ok(())
}
