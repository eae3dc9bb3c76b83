//! Tag filter popover of the search form.
//!
//! Tag buttons carry their value in `data-tag`. Selection (`active` class)
//! and visibility (`display` style) are independent: a selected tag stays
//! selected while the filter hides it, and still takes part in the search.
use kuchikikiki::NodeRef;
use log::{debug, trace};

use crate::{
  dom::{
    attr,
    create_element,
    find_by_id,
    has_class,
    remove_attr,
    remove_class,
    select_all,
    set_attr,
    set_style_property,
    style_property,
    toggle_class,
  },
  error::{PageError, PageResult},
  form::{control_value, form_entries, set_control_value},
};

pub const ACTIVE_CLASS: &str = "active";

/// Classes that collapse the popover; all present means closed.
pub const POPOVER_HIDDEN_CLASSES: &[&str] = &[
  "scale-50",
  "opacity-0",
  "pointer-events-none",
  "-translate-y-20",
  "translate-x-12",
];

/// Name of the hidden field carrying the selected tags.
pub const TAG_FIELD: &str = "tag";

/// Name of the free-text query field.
pub const QUERY_FIELD: &str = "q";

const SHOWN_DISPLAY: &str = "inline-flex";
const HIDDEN_DISPLAY: &str = "none";

/// The elements the tag filter works on.
#[derive(Debug, Clone)]
pub struct TagFilterElements {
  pub popover:      NodeRef,
  pub toggle:       NodeRef,
  pub buttons:      Vec<NodeRef>,
  pub search_input: NodeRef,
  pub form:         NodeRef,
  pub clear:        NodeRef,
  pub query_input:  NodeRef,
}

impl TagFilterElements {
  /// Find the elements by their conventional ids.
  ///
  /// # Errors
  ///
  /// Returns [`PageError::MissingElement`] naming the first missing id.
  pub fn locate(document: &NodeRef) -> PageResult<Self> {
    let by_id = |id: &str| {
      find_by_id(document, id).ok_or_else(|| PageError::missing(format!("#{id}")))
    };
    let bar = by_id("tagBar")?;
    Ok(Self {
      popover:      by_id("tagPopover")?,
      toggle:       by_id("toggleTagBtn")?,
      buttons:      select_all(&bar, "button"),
      search_input: by_id("tagSearch")?,
      form:         by_id("searchForm")?,
      clear:        by_id("clearBtn")?,
      query_input:  by_id("searchInput")?,
    })
  }
}

/// What happens to a search form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchSubmission {
  /// Submission blocked: no query text and no tags.
  Prevented,
  /// Submission proceeds with these `(name, value)` entries.
  Submitted(Vec<(String, String)>),
}

impl SearchSubmission {
  /// Value of the first entry named `name`.
  #[must_use]
  pub fn value(&self, name: &str) -> Option<&str> {
    match self {
      Self::Prevented => None,
      Self::Submitted(entries) => {
        entries
          .iter()
          .find(|(key, _)| key == name)
          .map(|(_, value)| value.as_str())
      },
    }
  }
}

/// Controller for the tag popover and the search form it feeds.
#[derive(Debug, Clone)]
pub struct TagFilter {
  elements: TagFilterElements,
}

impl TagFilter {
  #[must_use]
  pub const fn new(elements: TagFilterElements) -> Self {
    Self { elements }
  }

  /// Locate the elements in `document` and build the controller.
  ///
  /// # Errors
  ///
  /// See [`TagFilterElements::locate`].
  pub fn attach(document: &NodeRef) -> PageResult<Self> {
    TagFilterElements::locate(document).map(Self::new)
  }

  #[must_use]
  pub const fn elements(&self) -> &TagFilterElements {
    &self.elements
  }

  /// Tag value of every button, in order.
  #[must_use]
  pub fn tags(&self) -> Vec<String> {
    self.elements.buttons.iter().map(tag_of).collect()
  }

  fn index_of(&self, tag: &str) -> Option<usize> {
    self.elements.buttons.iter().position(|b| tag_of(b) == tag)
  }

  /// Flip the popover's presentation classes. Returns whether it is open.
  pub fn toggle_popover(&self) -> bool {
    for class in POPOVER_HIDDEN_CLASSES {
      toggle_class(&self.elements.popover, class);
    }
    self.popover_open()
  }

  #[must_use]
  pub fn popover_open(&self) -> bool {
    !has_class(&self.elements.popover, "opacity-0")
  }

  /// Click on the tag button at `index`. Returns the button's new state.
  pub fn click_tag(&self, index: usize) -> Option<bool> {
    let button = self.elements.buttons.get(index)?;
    let active = toggle_class(button, ACTIVE_CLASS);
    trace!("Tag '{}' active: {active}", tag_of(button));
    Some(active)
  }

  /// Click on the button carrying `tag`.
  pub fn click(&self, tag: &str) -> Option<bool> {
    self.index_of(tag).and_then(|index| self.click_tag(index))
  }

  #[must_use]
  pub fn is_active(&self, tag: &str) -> bool {
    self
      .index_of(tag)
      .and_then(|index| self.elements.buttons.get(index))
      .is_some_and(|button| has_class(button, ACTIVE_CLASS))
  }

  #[must_use]
  pub fn is_visible(&self, tag: &str) -> bool {
    self
      .index_of(tag)
      .and_then(|index| self.elements.buttons.get(index))
      .is_some_and(|button| {
        style_property(button, "display").as_deref() != Some(HIDDEN_DISPLAY)
      })
  }

  /// Tags whose buttons are selected, visible or not.
  #[must_use]
  pub fn active_tags(&self) -> Vec<String> {
    self
      .elements
      .buttons
      .iter()
      .filter(|button| has_class(button, ACTIVE_CLASS))
      .map(tag_of)
      .collect()
  }

  /// An input event on the filter field with the field now holding `query`.
  ///
  /// Buttons whose tag contains the query (case-insensitively) are shown,
  /// the rest hidden.
  pub fn filter(&self, query: &str) {
    set_control_value(&self.elements.search_input, query);
    let needle = query.to_lowercase();
    for button in &self.elements.buttons {
      let shown = tag_of(button).to_lowercase().contains(&needle);
      set_style_property(
        button,
        "display",
        if shown { SHOWN_DISPLAY } else { HIDDEN_DISPLAY },
      );
    }
  }

  /// Deselect every tag. Visibility is untouched.
  pub fn clear(&self) {
    for button in &self.elements.buttons {
      remove_class(button, ACTIVE_CLASS);
    }
  }

  /// Set the free-text query.
  pub fn set_query(&self, query: &str) {
    set_control_value(&self.elements.query_input, query);
  }

  /// Handle a submit event on the search form.
  ///
  /// A blank query is only submitted when tags are selected, and then
  /// without the query field. The field keeps its name for later
  /// submissions.
  pub fn submit(&self) -> SearchSubmission {
    let form = &self.elements.form;
    for stale in select_all(form, &format!("input[name='{TAG_FIELD}']")) {
      stale.detach();
    }

    let selected = self.active_tags();
    if !selected.is_empty() {
      let joined = selected.join(",");
      let hidden = create_element("input", &[
        ("type", "hidden"),
        ("name", TAG_FIELD),
        ("value", &joined),
      ]);
      form.append(hidden);
    }

    let query_input = &self.elements.query_input;
    if attr(query_input, "name").is_none() {
      set_attr(query_input, "name", QUERY_FIELD);
    }

    if control_value(query_input).trim().is_empty() {
      if selected.is_empty() {
        debug!("Blocked empty search without tags");
        return SearchSubmission::Prevented;
      }
      remove_attr(query_input, "name");
      let entries = form_entries(form);
      set_attr(query_input, "name", QUERY_FIELD);
      return SearchSubmission::Submitted(entries);
    }

    SearchSubmission::Submitted(form_entries(form))
  }
}

fn tag_of(button: &NodeRef) -> String {
  attr(button, "data-tag").unwrap_or_default()
}
