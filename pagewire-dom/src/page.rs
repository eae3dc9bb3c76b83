//! Load-time page pipeline.
//!
//! Applies the parts of the page behaviors that only depend on the parsed
//! document (code block structure and highlighting, external link targets,
//! heading anchors and the rendered outline) to a whole HTML page.
use kuchikikiki::NodeRef;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{
  codeblock::CodeBlockEnhancer,
  dom::{parse_document, select_first, serialize},
  links::rewrite_external_links,
  syntax::SyntaxManager,
  toc::{self, TocEntry},
  utils::process_safe,
};

/// Which passes run and where they look.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageOptions {
  pub enhance_code:           bool,
  pub split_lines:            bool,
  pub rewrite_links:          bool,
  pub generate_toc:           bool,
  /// Root of the rendered article content.
  pub content_selector:       String,
  /// Element receiving the generated outline.
  pub toc_container_selector: String,
}

impl Default for PageOptions {
  fn default() -> Self {
    Self {
      enhance_code:           true,
      split_lines:            false,
      rewrite_links:          true,
      generate_toc:           true,
      content_selector:       "article".to_string(),
      toc_container_selector: "#toc".to_string(),
    }
  }
}

/// Result of processing one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedPage {
  pub html:           String,
  pub code_blocks:    usize,
  pub external_links: usize,
  pub toc:            Vec<TocEntry>,
}

/// Runs the enabled passes over HTML pages.
pub struct PageProcessor<'a> {
  options:     PageOptions,
  highlighter: Option<&'a SyntaxManager>,
}

impl<'a> PageProcessor<'a> {
  #[must_use]
  pub const fn new(options: PageOptions, highlighter: Option<&'a SyntaxManager>) -> Self {
    Self {
      options,
      highlighter,
    }
  }

  #[must_use]
  pub const fn options(&self) -> &PageOptions {
    &self.options
  }

  /// Process a complete HTML page.
  ///
  /// A pass that panics leaves the page as it was and reports nothing.
  #[must_use]
  pub fn process(&self, html: &str) -> ProcessedPage {
    run_passes(html, |document, report| self.apply(document, report))
  }

  /// Apply the passes to an already parsed document.
  pub fn apply(&self, document: &NodeRef, report: &mut ProcessedPage) {
    let content = select_first(document, &self.options.content_selector);
    if content.is_none() {
      trace!(
        "No element matches '{}', using the whole document",
        self.options.content_selector
      );
    }
    let content = content.unwrap_or_else(|| document.clone());

    if self.options.enhance_code {
      report.code_blocks = CodeBlockEnhancer::new(self.highlighter)
        .with_line_splitting(self.options.split_lines)
        .enhance(&content)
        .len();
    }

    if self.options.rewrite_links {
      report.external_links = rewrite_external_links(&content);
    }

    if self.options.generate_toc {
      match select_first(document, &self.options.toc_container_selector) {
        Some(container) => {
          if let Some(outline) = toc::generate(&content, &container) {
            report.toc = outline.entries().to_vec();
          }
        },
        None => {
          debug!(
            "No TOC container matches '{}'",
            self.options.toc_container_selector
          );
        },
      }
    }
  }
}

/// Parse `html`, run `passes` over it and serialize the result. Counts are
/// only kept when the passes finish; after a panic the input comes back with
/// an empty report.
fn run_passes<F>(html: &str, passes: F) -> ProcessedPage
where
  F: FnOnce(&NodeRef, &mut ProcessedPage),
{
  let mut finished = None;
  let html = process_safe(html, |html| {
    let document = parse_document(html);
    let mut report = ProcessedPage::default();
    passes(&document, &mut report);
    finished = Some(report);
    serialize(&document)
  });
  ProcessedPage {
    html,
    ..finished.unwrap_or_default()
  }
}
