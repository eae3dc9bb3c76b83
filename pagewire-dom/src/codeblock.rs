//! Code block enhancement: wrapper, copy control, highlighting and per-line
//! splitting.
//!
//! [`CodeBlockEnhancer::enhance`] performs the load-time DOM work once per
//! page. The returned [`CopyButton`]s model the click handler of each copy
//! control; the host forwards clicks to [`CopyButton::activate`] and clock
//! ticks to [`CopyButton::tick`].
use std::time::Duration;

use kuchikikiki::NodeRef;
use log::{debug, trace, warn};

use crate::{
  dom::{
    add_class,
    attr,
    clear_children,
    create_element,
    has_class,
    parse_fragment,
    select_all,
    select_first,
    set_text,
    shallow_clone,
    wrap,
  },
  error::PageResult,
  syntax::SyntaxManager,
};

/// Label shown after a successful copy.
pub const COPIED_LABEL: &str = "Copied!";

/// How long the copied acknowledgment stays before the label reverts.
pub const REVERT_DELAY: Duration = Duration::from_millis(2000);

/// Label used when a code element carries no `language-*` class.
pub const FALLBACK_LABEL: &str = "text";

/// Class of the element that replaces every source line.
pub const LINE_CLASS: &str = "code-line";

const NBSP: &str = "\u{00a0}";

/// Platform clipboard.
///
/// The browser's clipboard write may be denied; an `Err` leaves the copy
/// control untouched.
pub trait Clipboard {
  /// Write `text` to the clipboard.
  ///
  /// # Errors
  ///
  /// Returns [`crate::PageError::Clipboard`] when the write is rejected.
  fn write_text(&self, text: &str) -> PageResult<()>;
}

/// Load-time enhancement of every `pre > code` block on a page.
pub struct CodeBlockEnhancer<'a> {
  highlighter: Option<&'a SyntaxManager>,
  split_lines: bool,
}

impl<'a> CodeBlockEnhancer<'a> {
  #[must_use]
  pub const fn new(highlighter: Option<&'a SyntaxManager>) -> Self {
    Self {
      highlighter,
      split_lines: false,
    }
  }

  /// Also split highlighted code into one block element per line.
  #[must_use]
  pub const fn with_line_splitting(mut self, split_lines: bool) -> Self {
    self.split_lines = split_lines;
    self
  }

  /// Enhance all code blocks below `root`.
  ///
  /// Blocks that were already enhanced (their `pre` sits in a
  /// `div.code-group`) are left alone.
  pub fn enhance(&self, root: &NodeRef) -> Vec<CopyButton> {
    let mut buttons = Vec::new();

    for pre in select_all(root, "pre") {
      let Some(code) = select_first(&pre, "code") else {
        continue;
      };
      if pre
        .parent()
        .is_some_and(|parent| has_class(&parent, "code-group"))
      {
        trace!("Skipping already enhanced code block");
        continue;
      }

      let label = language_label(&code);

      // Structure first: highlighting rewrites the code element's children.
      let wrapper = create_element("div", &[("class", "code-group group")]);
      wrap(&pre, &wrapper);

      let button = create_element("button", &[("class", "copy-btn")]);
      set_text(&button, &label);
      pre.append(button.clone());

      if let Some(manager) = self.highlighter {
        highlight_code_element(manager, &code, &label);
      }
      if self.split_lines {
        split_into_lines(&code);
      }

      buttons.push(CopyButton {
        button,
        code,
        label,
        revert_at: None,
      });
    }

    debug!("Enhanced {} code block(s)", buttons.len());
    buttons
  }
}

/// Language name from the first `language-<name>` class of a code element.
#[must_use]
pub fn language_label(code: &NodeRef) -> String {
  attr(code, "class")
    .and_then(|class| {
      class
        .split_whitespace()
        .find_map(|c| c.strip_prefix("language-"))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
    })
    .unwrap_or_else(|| FALLBACK_LABEL.to_string())
}

fn highlight_code_element(manager: &SyntaxManager, code: &NodeRef, language: &str) {
  let source = code.text_contents();
  match manager.highlight_code(&source, language) {
    Ok(markup) => {
      clear_children(code);
      for node in parse_fragment(&markup) {
        code.append(node);
      }
      add_class(code, "highlighted");
    },
    Err(e) => warn!("Leaving {language} block unhighlighted: {e}"),
  }
}

/// Re-render `code` so each source line becomes a `div.code-line`.
///
/// Elements that span a line break (a multi-line comment token, say) are
/// closed at the end of the line and reopened on the next one, so every line
/// carries the classes of the tokens it belongs to. A trailing newline does
/// not produce an empty last line. Empty lines hold a single non-breaking
/// space.
pub fn split_into_lines(code: &NodeRef) {
  if select_first(code, &format!(".{LINE_CLASS}")).is_some() {
    return;
  }

  let mut splitter = LineSplitter::default();
  for child in code.children() {
    splitter.visit(&child);
  }
  let mut lines = splitter.finish();

  if lines.len() > 1
    && lines.last().is_some_and(|line| line.text_contents().is_empty())
  {
    lines.pop();
  }

  clear_children(code);
  for line in lines {
    if line.text_contents().is_empty() {
      clear_children(&line);
      line.append(NodeRef::new_text(NBSP));
    }
    code.append(line);
  }
}

#[derive(Default)]
struct LineSplitter {
  lines:  Vec<NodeRef>,
  /// Elements of the source tree currently open, outermost first.
  open:   Vec<NodeRef>,
  /// Their copies inside the current line.
  cursor: Vec<NodeRef>,
}

impl LineSplitter {
  fn current_parent(&mut self) -> NodeRef {
    if self.lines.is_empty() {
      self.start_line();
    }
    self
      .cursor
      .last()
      .or_else(|| self.lines.last())
      .cloned()
      .unwrap_or_else(|| create_element("div", &[("class", LINE_CLASS)]))
  }

  fn start_line(&mut self) {
    let line = create_element("div", &[("class", LINE_CLASS)]);
    self.cursor.clear();
    let mut parent = line.clone();
    for element in &self.open {
      if let Some(copy) = shallow_clone(element) {
        parent.append(copy.clone());
        self.cursor.push(copy.clone());
        parent = copy;
      }
    }
    self.lines.push(line);
  }

  fn visit(&mut self, node: &NodeRef) {
    if let Some(text) = node.as_text() {
      let text = text.borrow().to_string();
      for (index, segment) in text.split('\n').enumerate() {
        if index > 0 {
          self.start_line();
        }
        if !segment.is_empty() {
          self.current_parent().append(NodeRef::new_text(segment));
        }
      }
    } else if let Some(copy) = shallow_clone(node) {
      self.current_parent().append(copy.clone());
      self.open.push(node.clone());
      self.cursor.push(copy);
      for child in node.children() {
        self.visit(&child);
      }
      self.open.pop();
      self.cursor.pop();
    }
  }

  fn finish(mut self) -> Vec<NodeRef> {
    if self.lines.is_empty() {
      self.start_line();
    }
    self.lines
  }
}

/// Text a reader would select in the block: one line per source line, no
/// placeholder spaces. The result is the same whether or not the block was
/// split into lines, so a trailing newline is dropped either way.
#[must_use]
pub fn rendered_text(code: &NodeRef) -> String {
  let lines = select_all(code, &format!(".{LINE_CLASS}"));
  if lines.is_empty() {
    let text = code.text_contents();
    return text.strip_suffix('\n').unwrap_or(&text).to_string();
  }
  lines
    .iter()
    .map(|line| {
      let text = line.text_contents();
      if text == NBSP { String::new() } else { text }
    })
    .collect::<Vec<_>>()
    .join("\n")
}

/// The copy control of one code block.
#[derive(Debug, Clone)]
pub struct CopyButton {
  button:    NodeRef,
  code:      NodeRef,
  label:     String,
  revert_at: Option<Duration>,
}

impl CopyButton {
  /// The `button` element.
  #[must_use]
  pub const fn node(&self) -> &NodeRef {
    &self.button
  }

  /// The language label the button reverts to.
  #[must_use]
  pub fn language(&self) -> &str {
    &self.label
  }

  /// Text currently displayed on the button.
  #[must_use]
  pub fn label(&self) -> String {
    self.button.text_contents()
  }

  /// Time at which the label reverts, if a copy acknowledgment is showing.
  #[must_use]
  pub const fn revert_at(&self) -> Option<Duration> {
    self.revert_at
  }

  /// Handle a click at time `now`.
  ///
  /// Returns whether the clipboard accepted the text. A rejected write
  /// changes nothing on the page.
  pub fn activate(&mut self, clipboard: &dyn Clipboard, now: Duration) -> bool {
    let text = rendered_text(&self.code);
    match clipboard.write_text(&text) {
      Ok(()) => {
        set_text(&self.button, COPIED_LABEL);
        self.revert_at = Some(now + REVERT_DELAY);
        true
      },
      Err(e) => {
        debug!("Copy of {} block did not complete: {e}", self.label);
        false
      },
    }
  }

  /// Advance the clock; reverts the label once the delay elapsed.
  ///
  /// Returns whether the label was reverted by this call.
  pub fn tick(&mut self, now: Duration) -> bool {
    match self.revert_at {
      Some(deadline) if now >= deadline => {
        set_text(&self.button, &self.label);
        self.revert_at = None;
        true
      },
      _ => false,
    }
  }
}
