//! Site processing: every HTML page of the input directory goes through the
//! page pipeline, everything else is copied as is.
use std::{
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{self, Context};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use pagewire_dom::{PageProcessor, ProcessedPage, syntax::SyntaxManager};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::Config;

/// Name of the stylesheet written for the configured highlight theme.
pub const HIGHLIGHT_STYLESHEET: &str = "highlight.css";

/// What a build did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
  pub pages:          usize,
  pub assets:         usize,
  pub code_blocks:    usize,
  pub external_links: usize,
  /// Pages that received a table of contents.
  pub toc_pages:      usize,
  pub stylesheet:     Option<PathBuf>,
}

/// Files found in the input directory, relative to it.
#[derive(Debug, Default)]
struct SiteFiles {
  pages:  Vec<PathBuf>,
  assets: Vec<PathBuf>,
}

fn is_html(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

fn collect_site_files(config: &Config) -> eyre::Result<SiteFiles> {
  let input_dir = &config.input_dir;
  // An output directory nested in the input must not be picked up again.
  let output_dir = config.output_dir.canonicalize().ok();
  let mut files = SiteFiles::default();

  let walker = WalkDir::new(input_dir).follow_links(true).into_iter();
  for entry in walker.filter_entry(|entry| {
    output_dir
      .as_ref()
      .is_none_or(|out| entry.path().canonicalize().ok().as_ref() != Some(out))
  }) {
    let entry = entry.wrap_err_with(|| {
      format!("Failed to walk input directory {}", input_dir.display())
    })?;

    #[allow(
      clippy::filetype_is_file,
      reason = "Only regular files are processed or copied"
    )]
    if !entry.file_type().is_file() {
      continue;
    }

    let relative = entry
      .path()
      .strip_prefix(input_dir)
      .wrap_err("Failed to compute relative path")?
      .to_path_buf();

    if is_html(&relative) {
      files.pages.push(relative);
    } else {
      files.assets.push(relative);
    }
  }

  files.pages.sort();
  files.assets.sort();
  Ok(files)
}

fn write_file(path: &Path, content: &str) -> eyre::Result<()> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory {}", parent.display())
    })?;
  }
  fs::write(path, content)
    .wrap_err_with(|| format!("Failed to write {}", path.display()))
}

fn process_page(
  processor: &PageProcessor<'_>,
  config: &Config,
  relative: &Path,
) -> eyre::Result<ProcessedPage> {
  let source = config.input_dir.join(relative);
  let html = fs::read_to_string(&source)
    .wrap_err_with(|| format!("Failed to read {}", source.display()))?;

  let page = processor.process(&html);
  debug!(
    "{}: {} code blocks, {} external links, {} top-level TOC entries",
    relative.display(),
    page.code_blocks,
    page.external_links,
    page.toc.len()
  );

  write_file(&config.output_dir.join(relative), &page.html)?;
  Ok(page)
}

fn copy_asset(config: &Config, relative: &Path) -> eyre::Result<()> {
  let source = config.input_dir.join(relative);
  let dest = config.output_dir.join(relative);
  if let Some(parent) = dest.parent() {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory {}", parent.display())
    })?;
  }
  fs::copy(&source, &dest).wrap_err_with(|| {
    format!("Failed to copy {} to {}", source.display(), dest.display())
  })?;
  Ok(())
}

fn highlighter(config: &Config) -> Option<SyntaxManager> {
  if !config.highlight_code {
    return None;
  }
  match pagewire_dom::syntax::create_default_manager() {
    Ok(manager) => {
      info!("Using {} for syntax highlighting", manager.highlighter().name());
      Some(manager)
    },
    Err(e) => {
      warn!("Syntax highlighting disabled: {e}");
      None
    },
  }
}

fn write_stylesheet(
  manager: &SyntaxManager,
  theme: &str,
  output_dir: &Path,
) -> eyre::Result<Option<PathBuf>> {
  match manager.stylesheet(theme) {
    Ok(css) => {
      let path = output_dir.join(HIGHLIGHT_STYLESHEET);
      write_file(&path, &css)?;
      info!("Wrote {theme} highlight stylesheet to {}", path.display());
      Ok(Some(path))
    },
    Err(e) => {
      warn!("Not writing a highlight stylesheet: {e}");
      Ok(None)
    },
  }
}

fn progress_bar(len: usize) -> eyre::Result<ProgressBar> {
  let bar = ProgressBar::new(len as u64);
  bar.set_style(
    ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} pages")?
      .progress_chars("=> "),
  );
  Ok(bar)
}

/// Process the site described by `config`.
///
/// # Errors
///
/// Returns an error if the configuration points at unusable paths, or if a
/// page or asset cannot be read or written.
pub fn build_site(config: &Config) -> eyre::Result<BuildSummary> {
  config.validate_paths()?;
  fs::create_dir_all(&config.output_dir).wrap_err_with(|| {
    format!(
      "Failed to create output directory {}",
      config.output_dir.display()
    )
  })?;

  let files = collect_site_files(config)?;
  info!(
    "Found {} pages and {} other files in {}",
    files.pages.len(),
    files.assets.len(),
    config.input_dir.display()
  );

  let manager = highlighter(config);
  let processor = PageProcessor::new(config.page_options(), manager.as_ref());

  let thread_count = config.jobs.unwrap_or_else(num_cpus::get);
  let pool = rayon::ThreadPoolBuilder::new()
    .num_threads(thread_count)
    .build()?;

  let bar = progress_bar(files.pages.len())?;
  let pages = pool.install(|| {
    files
      .pages
      .par_iter()
      .progress_with(bar.clone())
      .map(|relative| process_page(&processor, config, relative))
      .collect::<eyre::Result<Vec<_>>>()
  })?;
  bar.finish_and_clear();

  pool.install(|| {
    files
      .assets
      .par_iter()
      .try_for_each(|relative| copy_asset(config, relative))
  })?;

  let stylesheet = match (&manager, &config.highlight_theme) {
    (Some(manager), Some(theme)) => {
      write_stylesheet(manager, theme, &config.output_dir)?
    },
    _ => None,
  };

  let summary = BuildSummary {
    pages: pages.len(),
    assets: files.assets.len(),
    code_blocks: pages.iter().map(|page| page.code_blocks).sum(),
    external_links: pages.iter().map(|page| page.external_links).sum(),
    toc_pages: pages.iter().filter(|page| !page.toc.is_empty()).count(),
    stylesheet,
  };

  info!(
    "Processed {} pages ({} code blocks, {} external links, {} tables of \
     contents) into {}",
    summary.pages,
    summary.code_blocks,
    summary.external_links,
    summary.toc_pages,
    config.output_dir.display()
  );

  Ok(summary)
}
