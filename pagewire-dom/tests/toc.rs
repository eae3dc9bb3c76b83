//! Integration tests for table of contents generation and scroll-spy.
#![allow(clippy::expect_used, reason = "Fine in tests")]

use std::collections::HashMap;

use kuchikikiki::NodeRef;
use pagewire_dom::{
  Layout,
  ScrollSpy,
  ScrollSpyOptions,
  dom::{attr, find_by_id, has_class, parse_document, select_all, select_first},
  toc::{self, PANEL_OPEN_CLASS},
};

/// Layout answering from a table keyed by element id.
struct TableLayout {
  offsets: HashMap<String, f64>,
  heights: HashMap<String, f64>,
}

impl TableLayout {
  fn new(offsets: &[(&str, f64)], heights: &[(&str, f64)]) -> Self {
    let own = |pairs: &[(&str, f64)]| -> HashMap<String, f64> {
      pairs
        .iter()
        .map(|(id, value)| ((*id).to_string(), *value))
        .collect()
    };
    Self {
      offsets: own(offsets),
      heights: own(heights),
    }
  }
}

impl Layout for TableLayout {
  fn offset_top(&self, node: &NodeRef) -> f64 {
    attr(node, "id")
      .and_then(|id| self.offsets.get(&id).copied())
      .unwrap_or_default()
  }

  fn height(&self, node: &NodeRef) -> f64 {
    attr(node, "id")
      .and_then(|id| self.heights.get(&id).copied())
      .unwrap_or_default()
  }
}

const ARTICLE: &str = r#"<aside id="panel" class="toc-open"><nav id="toc"><p>stale</p></nav></aside>
<button id="toggle"></button>
<article id="post">
  <h1>Title is not part of the outline</h1>
  <h2>Getting started</h2>
  <h3>Install  the tool</h3>
  <h3>First run</h3>
  <h4>Flags</h4>
  <h2>Usage</h2>
  <h3>Config</h3>
</article>"#;

fn numbers(toc: &pagewire_dom::TableOfContents) -> Vec<String> {
  toc.flatten().iter().map(|e| e.number.clone()).collect()
}

#[test]
fn test_numbering_and_anchor_ids() {
  let document = parse_document(ARTICLE);
  let article = find_by_id(&document, "post").expect("article");
  let container = find_by_id(&document, "toc").expect("container");

  let toc = toc::generate(&article, &container).expect("headings present");
  assert_eq!(numbers(&toc), vec!["1", "1.1", "1.2", "1.2.1", "2", "2.1"]);

  let ids: Vec<String> = select_all(&article, "h2, h3, h4")
    .iter()
    .filter_map(|h| attr(h, "id"))
    .collect();
  assert_eq!(ids, vec![
    "01_Getting_started",
    "01.01_Install_the_tool",
    "01.02_First_run",
    "01.02.01_Flags",
    "02_Usage",
    "02.01_Config",
  ]);
}

#[test]
fn test_outline_nesting_and_render() {
  let document = parse_document(ARTICLE);
  let article = find_by_id(&document, "post").expect("article");
  let container = find_by_id(&document, "toc").expect("container");

  let toc = toc::generate(&article, &container).expect("headings present");
  let top = toc.entries();
  assert_eq!(top.len(), 2);
  assert_eq!(top[0].children.len(), 2);
  assert_eq!(top[0].children[1].children[0].label(), "1.2.1 Flags");

  assert!(select_first(&container, "p").is_none(), "stale content replaced");
  let links = select_all(&container, "a.toc-link");
  assert_eq!(links.len(), 6);
  assert_eq!(links[0].text_contents(), "1 Getting started");
  assert_eq!(attr(&links[3], "href").as_deref(), Some("#01.02.01_Flags"));
  assert_eq!(select_all(&container, "ul ul ul").len(), 1);
}

#[test]
fn test_minimum_level_becomes_depth_one() {
  let document = parse_document(
    r#"<nav id="toc"></nav><article><h3>A</h3><h4>B</h4><h3>C</h3></article>"#,
  );
  let article = select_first(&document, "article").expect("article");
  let container = find_by_id(&document, "toc").expect("container");
  let toc = toc::generate(&article, &container).expect("headings present");
  assert_eq!(numbers(&toc), vec!["1", "1.1", "2"]);
}

#[test]
fn test_numbering_strictly_increases() {
  let sequences: &[&[u8]] = &[
    &[2, 3, 3, 4, 4, 3, 2, 3],
    &[2, 2, 2],
    &[2, 3, 4, 5, 6, 5, 4, 3, 2],
    &[3, 4, 3, 4, 4],
    &[2, 4, 3],
    &[2, 4, 2, 4, 3],
    &[2, 6, 5, 4, 3, 2],
  ];
  for levels in sequences {
    let body: String = levels
      .iter()
      .enumerate()
      .map(|(i, level)| format!("<h{level}>Heading {i}</h{level}>"))
      .collect();
    let document =
      parse_document(&format!("<nav id=\"toc\"></nav><article>{body}</article>"));
    let article = select_first(&document, "article").expect("article");
    let container = find_by_id(&document, "toc").expect("container");
    let toc = toc::generate(&article, &container).expect("headings present");

    let keys: Vec<Vec<u32>> = toc
      .flatten()
      .iter()
      .map(|e| {
        e.number
          .split('.')
          .map(|s| s.parse::<u32>().expect("numeric segment"))
          .collect()
      })
      .collect();
    assert!(keys.windows(2).all(|w| w[0] < w[1]), "{levels:?} -> {keys:?}");

    let mut anchors: Vec<&str> =
      toc.headings().iter().map(|h| h.anchor.as_str()).collect();
    let total = anchors.len();
    anchors.sort_unstable();
    anchors.dedup();
    assert_eq!(anchors.len(), total);
  }
}

#[test]
fn test_no_headings_renders_nothing() {
  let document = parse_document(
    r#"<nav id="toc"><p>keep</p></nav><article><h1>Only a title</h1><p>x</p></article>"#,
  );
  let article = select_first(&document, "article").expect("article");
  let container = find_by_id(&document, "toc").expect("container");
  assert!(toc::generate(&article, &container).is_none());
  assert_eq!(container.text_contents(), "keep");
}

fn spy_fixture(header_offset: f64) -> (NodeRef, ScrollSpy) {
  let document = parse_document(
    r#"<nav id="toc"></nav><article id="post"><h2>A</h2><h2>B</h2><h2>C</h2></article>"#,
  );
  let article = find_by_id(&document, "post").expect("article");
  let container = find_by_id(&document, "toc").expect("container");
  let toc = toc::generate(&article, &container).expect("headings present");
  let layout = TableLayout::new(
    &[("01_A", 0.0), ("02_B", 100.0), ("03_C", 250.0)],
    &[],
  );
  let options = ScrollSpyOptions {
    header_offset,
    ..ScrollSpyOptions::default()
  };
  let spy = ScrollSpy::attach(&toc, &layout, options, 0.0);
  (container, spy)
}

#[test]
fn test_scroll_spy_marks_single_active_entry() {
  let (container, mut spy) = spy_fixture(20.0);
  assert_eq!(spy.active(), Some(0), "initial state applied at attach");

  assert_eq!(spy.on_scroll(260.0), Some(2));
  assert_eq!(spy.active_anchor(), Some("03_C"));
  assert_eq!(spy.on_scroll(50.0), Some(0));

  let links = select_all(&container, "a.toc-link");
  let active: Vec<bool> = links.iter().map(|l| has_class(l, "active")).collect();
  assert_eq!(active, vec![true, false, false]);

  // Exactly at the threshold counts as reached.
  assert_eq!(spy.on_scroll(80.0), Some(1));
}

#[test]
fn test_navigate_aligns_below_header() {
  let (_, spy) = spy_fixture(20.0);
  let nav = spy.navigate("#02_B").expect("known anchor");
  assert_eq!(nav.hash, "#02_B");
  assert!((nav.scroll_top - 80.0).abs() < f64::EPSILON);

  let first = spy.navigate("01_A").expect("known anchor");
  assert!(first.scroll_top.abs() < f64::EPSILON, "never negative");

  assert!(spy.navigate("#missing").is_none());
}

#[test]
fn test_passing_article_end_hides_toggle_and_collapses_panel() {
  let document = parse_document(ARTICLE);
  let article = find_by_id(&document, "post").expect("article");
  let container = find_by_id(&document, "toc").expect("container");
  let toggle = find_by_id(&document, "toggle").expect("toggle");
  let panel = find_by_id(&document, "panel").expect("panel");

  let toc = toc::generate(&article, &container).expect("headings present");
  let layout = TableLayout::new(&[("post", 100.0)], &[("post", 900.0)]);
  let mut spy = ScrollSpy::attach(
    &toc,
    &layout,
    ScrollSpyOptions {
      article: Some(article.clone()),
      toggle: Some(toggle.clone()),
      panel: Some(panel.clone()),
      ..ScrollSpyOptions::default()
    },
    0.0,
  );

  assert!(!has_class(&toggle, "opacity-0"));
  assert!(spy.panel_open());

  spy.on_scroll(1200.0);
  assert!(has_class(&toggle, "opacity-0"));
  assert!(has_class(&toggle, "pointer-events-none"));
  assert!(!has_class(&panel, PANEL_OPEN_CLASS));

  spy.on_scroll(400.0);
  assert!(!has_class(&toggle, "opacity-0"));
  assert!(!spy.panel_open(), "scrolling back does not re-expand");

  assert!(spy.toggle_panel());
  assert!(spy.panel_open());
}
