//! Form serialization and reset, following the browser's successful-control
//! rules closely enough for the forms these pages carry.
use kuchikikiki::NodeRef;

use crate::dom::{
  attr,
  clear_children,
  has_attr,
  remove_attr,
  select_all,
  select_first,
  tag_name,
};

/// Input types that never contribute an entry.
const SKIPPED_INPUT_TYPES: &[&str] =
  &["submit", "button", "reset", "image", "file"];

/// Input types that keep their value when the form is reset.
const PRESERVED_INPUT_TYPES: &[&str] =
  &["hidden", "submit", "button", "reset", "image", "checkbox", "radio"];

fn input_type(node: &NodeRef) -> String {
  attr(node, "type")
    .map(|t| t.trim().to_ascii_lowercase())
    .unwrap_or_else(|| "text".to_string())
}

/// Current value of a form control.
#[must_use]
pub fn control_value(node: &NodeRef) -> String {
  match tag_name(node).as_deref() {
    Some("textarea") => node.text_contents(),
    Some("select") => {
      let options = select_all(node, "option");
      options
        .iter()
        .find(|option| has_attr(option, "selected"))
        .or_else(|| options.first())
        .map(|option| {
          attr(option, "value").unwrap_or_else(|| option.text_contents())
        })
        .unwrap_or_default()
    },
    _ => attr(node, "value").unwrap_or_default(),
  }
}

/// Set the value of an input or textarea.
pub fn set_control_value(node: &NodeRef, value: &str) {
  if tag_name(node).as_deref() == Some("textarea") {
    crate::dom::set_text(node, value);
  } else {
    crate::dom::set_attr(node, "value", value);
  }
}

/// Collect the `(name, value)` pairs a submission of `form` would carry,
/// in document order.
#[must_use]
pub fn form_entries(form: &NodeRef) -> Vec<(String, String)> {
  select_all(form, "input, textarea, select")
    .into_iter()
    .filter_map(|control| {
      let name = attr(&control, "name").filter(|n| !n.is_empty())?;
      if has_attr(&control, "disabled") {
        return None;
      }
      if tag_name(&control).as_deref() == Some("input") {
        let kind = input_type(&control);
        if SKIPPED_INPUT_TYPES.contains(&kind.as_str()) {
          return None;
        }
        if matches!(kind.as_str(), "checkbox" | "radio") {
          if !has_attr(&control, "checked") {
            return None;
          }
          let value = attr(&control, "value").unwrap_or_else(|| "on".into());
          return Some((name, value));
        }
      }
      Some((name, control_value(&control)))
    })
    .collect()
}

/// Clear user-editable fields, as `HTMLFormElement.reset()` does for forms
/// without default values.
pub fn reset_form(form: &NodeRef) {
  for control in select_all(form, "input, textarea") {
    match tag_name(&control).as_deref() {
      Some("textarea") => clear_children(&control),
      _ => {
        if !PRESERVED_INPUT_TYPES.contains(&input_type(&control).as_str()) {
          remove_attr(&control, "value");
        }
      },
    }
  }
}

/// The form's submit button, if any.
#[must_use]
pub fn submit_button(form: &NodeRef) -> Option<NodeRef> {
  select_first(form, "button[type='submit'], input[type='submit']")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dom::{find_by_id, parse_document};

  const FORM: &str = r#"<form id="f">
    <input name="name" value="Cat Blog">
    <input type="url" name="url" value="https://cat.example">
    <input type="hidden" name="kind" value="friend">
    <input type="checkbox" name="mutual" checked>
    <input type="checkbox" name="rss">
    <input name="ghost" value="x" disabled>
    <input value="anonymous">
    <textarea name="description">meow</textarea>
    <select name="theme"><option value="a">A</option><option value="b" selected>B</option></select>
    <button type="submit">Send</button>
  </form>"#;

  #[test]
  fn test_form_entries_follow_successful_control_rules() {
    let document = parse_document(FORM);
    let form = find_by_id(&document, "f").expect("form exists");

    let entries = form_entries(&form);
    let expected: Vec<(String, String)> = [
      ("name", "Cat Blog"),
      ("url", "https://cat.example"),
      ("kind", "friend"),
      ("mutual", "on"),
      ("description", "meow"),
      ("theme", "b"),
    ]
    .iter()
    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
    .collect();
    assert_eq!(entries, expected);
  }

  #[test]
  fn test_reset_clears_text_fields_only() {
    let document = parse_document(FORM);
    let form = find_by_id(&document, "f").expect("form exists");
    reset_form(&form);

    let entries = form_entries(&form);
    assert!(entries.contains(&("name".to_string(), String::new())));
    assert!(entries.contains(&("description".to_string(), String::new())));
    assert!(entries.contains(&("kind".to_string(), "friend".to_string())));
  }

  #[test]
  fn test_submit_button_lookup() {
    let document = parse_document(FORM);
    let form = find_by_id(&document, "f").expect("form exists");
    let button = submit_button(&form).expect("submit button exists");
    assert_eq!(button.text_contents(), "Send");
  }
}
