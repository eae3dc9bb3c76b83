//! Numbered table of contents with scroll-spy highlighting.
//!
//! Generation ([`generate`]) is pure DOM work and runs once per page: it
//! numbers the article headings, gives each a stable anchor id and renders a
//! nested navigation list. [`ScrollSpy`] is the interactive half. It captures
//! heading offsets through a [`Layout`] once, then answers link clicks with a
//! [`Navigation`] and scroll events by moving the `active` class.
use std::sync::OnceLock;

use kuchikikiki::NodeRef;
use log::debug;
use regex::Regex;

use crate::{
  dom::{
    clear_children,
    create_element,
    has_class,
    select_all,
    set_attr,
    set_class,
    set_text,
    tag_name,
    toggle_class,
  },
  utils::never_matching_regex,
};

/// Heading levels taking part in the outline (`h2` through `h6`).
pub const HEADING_SELECTOR: &str = "h2, h3, h4, h5, h6";

/// Number of nesting depths the counter tracks.
pub const MAX_DEPTH: usize = 5;

/// Distance kept between a target heading and the top of the viewport,
/// the sticky header's height plus a small margin.
pub const DEFAULT_HEADER_OFFSET: f64 = 80.0;

pub const ACTIVE_CLASS: &str = "active";

/// Class marking the expanded TOC panel.
pub const PANEL_OPEN_CLASS: &str = "toc-open";

/// Classes hiding the floating toggle control.
pub const TOGGLE_HIDDEN_CLASSES: &[&str] = &["opacity-0", "pointer-events-none"];

/// Hierarchical heading counter, one slot per depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadingCounter {
  counters: [u32; MAX_DEPTH],
}

impl HeadingCounter {
  #[must_use]
  pub const fn new() -> Self {
    Self {
      counters: [0; MAX_DEPTH],
    }
  }

  /// Count a heading at `depth` (1-based, clamped to the supported range)
  /// and reset all deeper counters.
  pub fn advance(&mut self, depth: usize) -> &[u32] {
    let index = depth.clamp(1, MAX_DEPTH) - 1;
    self.counters[index] += 1;
    for counter in &mut self.counters[index + 1..] {
      *counter = 0;
    }
    &self.counters[..=index]
  }
}

/// Dot-joined non-zero counters, e.g. `1.2`.
#[must_use]
pub fn numbering(counters: &[u32]) -> String {
  counters
    .iter()
    .filter(|c| **c != 0)
    .map(u32::to_string)
    .collect::<Vec<_>>()
    .join(".")
}

/// Anchor id for a heading: zero-padded numbering, `_`, then the heading
/// text with whitespace runs collapsed to underscores.
#[must_use]
pub fn anchor_id(counters: &[u32], text: &str) -> String {
  static WHITESPACE: OnceLock<Regex> = OnceLock::new();
  let whitespace = WHITESPACE
    .get_or_init(|| Regex::new(r"\s+").unwrap_or_else(|_| never_matching_regex()));

  let padded = counters
    .iter()
    .filter(|c| **c != 0)
    .map(|c| format!("{c:02}"))
    .collect::<Vec<_>>()
    .join(".");
  format!("{padded}_{}", whitespace.replace_all(text.trim(), "_"))
}

/// One entry of the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
  pub number:   String,
  pub text:     String,
  pub anchor:   String,
  /// Depth relative to the shallowest heading present, starting at 1.
  pub depth:    usize,
  pub children: Vec<TocEntry>,
}

impl TocEntry {
  /// Display label, `"<number> <text>"`.
  #[must_use]
  pub fn label(&self) -> String {
    format!("{} {}", self.number, self.text)
  }

  /// Link target, `#<anchor>`.
  #[must_use]
  pub fn href(&self) -> String {
    format!("#{}", self.anchor)
  }
}

/// A heading that received an anchor, paired with its navigation link.
#[derive(Debug, Clone)]
pub struct TocHeading {
  pub anchor: String,
  pub node:   NodeRef,
  pub link:   NodeRef,
}

/// A generated table of contents.
#[derive(Debug, Clone)]
pub struct TableOfContents {
  entries:  Vec<TocEntry>,
  headings: Vec<TocHeading>,
}

impl TableOfContents {
  /// Top-level outline entries.
  #[must_use]
  pub fn entries(&self) -> &[TocEntry] {
    &self.entries
  }

  /// Headings in document order.
  #[must_use]
  pub fn headings(&self) -> &[TocHeading] {
    &self.headings
  }

  /// All entries flattened in document order.
  #[must_use]
  pub fn flatten(&self) -> Vec<&TocEntry> {
    fn walk<'a>(entries: &'a [TocEntry], out: &mut Vec<&'a TocEntry>) {
      for entry in entries {
        out.push(entry);
        walk(&entry.children, out);
      }
    }
    let mut out = Vec::new();
    walk(&self.entries, &mut out);
    out
  }
}

fn heading_level(node: &NodeRef) -> Option<usize> {
  tag_name(node)?
    .strip_prefix('h')?
    .parse::<usize>()
    .ok()
    .filter(|level| (2..=6).contains(level))
}

/// Attach `entry` at `depth`, nesting under the last entry of each enclosing
/// list.
fn insert_entry(list: &mut Vec<TocEntry>, depth: usize, entry: TocEntry) {
  if depth > 1 {
    if let Some(parent) = list.last_mut() {
      insert_entry(&mut parent.children, depth - 1, entry);
      return;
    }
  }
  list.push(entry);
}

fn render_list(entries: &[TocEntry], links: &mut Vec<NodeRef>) -> NodeRef {
  let list = create_element("ul", &[("class", "toc-list")]);
  for entry in entries {
    let item = create_element("li", &[("class", "toc-item")]);
    let href = entry.href();
    let link = create_element("a", &[("class", "toc-link"), ("href", &href)]);
    set_text(&link, &entry.label());
    item.append(link.clone());
    links.push(link);
    if !entry.children.is_empty() {
      item.append(render_list(&entry.children, links));
    }
    list.append(item);
  }
  list
}

/// Number the headings below `article`, assign their ids and render the
/// outline into `container`, replacing its previous contents.
///
/// Returns `None`, leaving the container untouched, when the article has no
/// `h2`..`h6` headings.
pub fn generate(article: &NodeRef, container: &NodeRef) -> Option<TableOfContents> {
  let nodes: Vec<(NodeRef, usize)> = select_all(article, HEADING_SELECTOR)
    .into_iter()
    .filter_map(|node| heading_level(&node).map(|level| (node, level)))
    .collect();

  let min_level = nodes.iter().map(|(_, level)| *level).min()?;

  let mut counter = HeadingCounter::new();
  let mut entries = Vec::new();
  let mut anchored = Vec::with_capacity(nodes.len());

  let mut previous_depth = 0;
  for (node, level) in nodes {
    // A skipped level nests one step deeper, never more, so no counter slot
    // is left at zero.
    let depth = (level - min_level + 1).min(previous_depth + 1);
    previous_depth = depth;
    let text = node.text_contents().trim().to_string();
    let counters = counter.advance(depth);
    let number = numbering(counters);
    let anchor = anchor_id(counters, &text);

    set_attr(&node, "id", &anchor);
    insert_entry(&mut entries, depth, TocEntry {
      number,
      text,
      anchor: anchor.clone(),
      depth,
      children: Vec::new(),
    });
    anchored.push((anchor, node));
  }

  let mut links = Vec::with_capacity(anchored.len());
  let list = render_list(&entries, &mut links);
  clear_children(container);
  container.append(list);

  let headings = anchored
    .into_iter()
    .zip(links)
    .map(|((anchor, node), link)| TocHeading { anchor, node, link })
    .collect::<Vec<_>>();

  debug!("Generated table of contents with {} heading(s)", headings.len());
  Some(TableOfContents { entries, headings })
}

/// Geometry of the rendered page.
pub trait Layout {
  /// Distance from the top of the document to the top of `node`.
  fn offset_top(&self, node: &NodeRef) -> f64;

  /// Rendered height of `node`.
  fn height(&self, node: &NodeRef) -> f64;
}

/// Where a TOC link click takes the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
  /// Fragment to push onto the history without navigating, `#<anchor>`.
  pub hash:       String,
  /// Scroll position to animate to.
  pub scroll_top: f64,
}

/// Options for [`ScrollSpy::attach`].
#[derive(Debug, Clone)]
pub struct ScrollSpyOptions {
  pub header_offset: f64,
  /// Article body whose end hides the floating toggle.
  pub article:       Option<NodeRef>,
  /// Floating control that expands the TOC panel.
  pub toggle:        Option<NodeRef>,
  /// The TOC panel itself.
  pub panel:         Option<NodeRef>,
}

impl Default for ScrollSpyOptions {
  fn default() -> Self {
    Self {
      header_offset: DEFAULT_HEADER_OFFSET,
      article:       None,
      toggle:        None,
      panel:         None,
    }
  }
}

#[derive(Debug, Clone)]
struct SpyItem {
  anchor: String,
  offset: f64,
  link:   NodeRef,
}

/// Scroll-driven highlighting of the TOC entry in view.
#[derive(Debug, Clone)]
pub struct ScrollSpy {
  items:         Vec<SpyItem>,
  header_offset: f64,
  article_end:   Option<f64>,
  toggle:        Option<NodeRef>,
  panel:         Option<NodeRef>,
  active:        Option<usize>,
  past_article:  bool,
}

impl ScrollSpy {
  /// Capture heading offsets and apply the state for `scroll_y`.
  ///
  /// Offsets are not re-measured afterwards.
  #[must_use]
  pub fn attach(
    toc: &TableOfContents,
    layout: &dyn Layout,
    options: ScrollSpyOptions,
    scroll_y: f64,
  ) -> Self {
    let items = toc
      .headings()
      .iter()
      .map(|heading| SpyItem {
        anchor: heading.anchor.clone(),
        offset: layout.offset_top(&heading.node),
        link:   heading.link.clone(),
      })
      .collect();
    let article_end = options
      .article
      .as_ref()
      .map(|article| layout.offset_top(article) + layout.height(article));

    let mut spy = Self {
      items,
      header_offset: options.header_offset,
      article_end,
      toggle: options.toggle,
      panel: options.panel,
      active: None,
      past_article: false,
    };
    spy.on_scroll(scroll_y);
    spy
  }

  /// Index of the active entry, in document order.
  #[must_use]
  pub const fn active(&self) -> Option<usize> {
    self.active
  }

  #[must_use]
  pub fn active_anchor(&self) -> Option<&str> {
    self
      .active
      .and_then(|index| self.items.get(index))
      .map(|item| item.anchor.as_str())
  }

  /// Handle a scroll event.
  ///
  /// The active entry is the last heading at or above the scroll position
  /// shifted by the header offset. Returns the new active index.
  pub fn on_scroll(&mut self, scroll_y: f64) -> Option<usize> {
    let threshold = scroll_y + self.header_offset;
    self.active = self.items.iter().rposition(|item| item.offset <= threshold);

    for (index, item) in self.items.iter().enumerate() {
      set_class(&item.link, ACTIVE_CLASS, Some(index) == self.active);
    }

    if let Some(end) = self.article_end {
      let past = scroll_y > end;
      if let Some(toggle) = &self.toggle {
        for class in TOGGLE_HIDDEN_CLASSES {
          set_class(toggle, class, past);
        }
      }
      if past && !self.past_article {
        if let Some(panel) = &self.panel {
          set_class(panel, PANEL_OPEN_CLASS, false);
        }
      }
      self.past_article = past;
    }

    self.active
  }

  /// Handle a click on the link to `anchor` (with or without the leading
  /// `#`).
  #[must_use]
  pub fn navigate(&self, anchor: &str) -> Option<Navigation> {
    let anchor = anchor.strip_prefix('#').unwrap_or(anchor);
    let item = self.items.iter().find(|item| item.anchor == anchor)?;
    Some(Navigation {
      hash:       format!("#{anchor}"),
      scroll_top: (item.offset - self.header_offset).max(0.0),
    })
  }

  /// Expand or collapse the TOC panel. Returns whether it is now expanded.
  pub fn toggle_panel(&self) -> bool {
    self
      .panel
      .as_ref()
      .is_some_and(|panel| toggle_class(panel, PANEL_OPEN_CLASS))
  }

  /// Whether the TOC panel is expanded.
  #[must_use]
  pub fn panel_open(&self) -> bool {
    self
      .panel
      .as_ref()
      .is_some_and(|panel| has_class(panel, PANEL_OPEN_CLASS))
  }
}
