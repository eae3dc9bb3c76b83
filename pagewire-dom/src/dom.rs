//! Small helpers over the `kuchikikiki` DOM.
//!
//! The page behaviors in this crate only ever need a handful of element
//! operations (attributes, class lists, inline style properties, text). They
//! live here so that each behavior reads like the event handler it models.
use kuchikikiki::{Attribute, ExpandedName, NodeRef};
use markup5ever::{LocalName, QualName, ns};
use tendril::TendrilSink;

/// Parse a complete HTML document.
#[must_use]
pub fn parse_document(html: &str) -> NodeRef {
  kuchikikiki::parse_html().one(html)
}

/// Parse an HTML fragment and return its top-level nodes, detached.
#[must_use]
pub fn parse_fragment(markup: &str) -> Vec<NodeRef> {
  let document = parse_document(&format!("<div>{markup}</div>"));
  let Some(holder) = select_first(&document, "body > div") else {
    return Vec::new();
  };
  let nodes: Vec<NodeRef> = holder.children().collect();
  for node in &nodes {
    node.detach();
  }
  nodes
}

/// Serialize a node (and its descendants) back to HTML.
#[must_use]
pub fn serialize(node: &NodeRef) -> String {
  let mut out = Vec::new();
  if node.serialize(&mut out).is_err() {
    return String::new();
  }
  String::from_utf8(out).unwrap_or_default()
}

/// Create a detached HTML element with the given attributes.
#[must_use]
pub fn create_element(tag: &str, attributes: &[(&str, &str)]) -> NodeRef {
  NodeRef::new_element(
    QualName::new(None, ns!(html), LocalName::from(tag)),
    attributes.iter().map(|(name, value)| {
      (ExpandedName::new("", *name), Attribute {
        prefix: None,
        value:  (*value).to_string(),
      })
    }),
  )
}

/// Shallow copy of an element: same name and attributes, no children.
#[must_use]
pub fn shallow_clone(node: &NodeRef) -> Option<NodeRef> {
  let element = node.as_element()?;
  let attributes = element.attributes.borrow().map.clone();
  Some(NodeRef::new_element(element.name.clone(), attributes))
}

/// Lowercase local name of an element node.
#[must_use]
pub fn tag_name(node: &NodeRef) -> Option<String> {
  node
    .as_element()
    .map(|element| element.name.local.as_ref().to_ascii_lowercase())
}

/// All elements matching `selector` below `root`, in document order.
///
/// An invalid selector yields no matches.
#[must_use]
pub fn select_all(root: &NodeRef, selector: &str) -> Vec<NodeRef> {
  root.select(selector).map_or_else(
    |()| Vec::new(),
    |matches| matches.map(|m| m.as_node().clone()).collect(),
  )
}

/// First element matching `selector` below `root`.
#[must_use]
pub fn select_first(root: &NodeRef, selector: &str) -> Option<NodeRef> {
  root
    .select_first(selector)
    .ok()
    .map(|m| m.as_node().clone())
}

/// Element with the given `id` attribute.
#[must_use]
pub fn find_by_id(root: &NodeRef, id: &str) -> Option<NodeRef> {
  root
    .inclusive_descendants()
    .find(|node| attr(node, "id").as_deref() == Some(id))
}

#[must_use]
pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
  let element = node.as_element()?;
  element
    .attributes
    .borrow()
    .get(name)
    .map(std::string::ToString::to_string)
}

#[must_use]
pub fn has_attr(node: &NodeRef, name: &str) -> bool {
  node
    .as_element()
    .is_some_and(|element| element.attributes.borrow().contains(name))
}

pub fn set_attr(node: &NodeRef, name: &str, value: &str) {
  if let Some(element) = node.as_element() {
    element
      .attributes
      .borrow_mut()
      .insert(name, value.to_string());
  }
}

/// Remove an attribute, returning whether it was present.
pub fn remove_attr(node: &NodeRef, name: &str) -> bool {
  node.as_element().is_some_and(|element| {
    element.attributes.borrow_mut().remove(name).is_some()
  })
}

fn classes(node: &NodeRef) -> Vec<String> {
  attr(node, "class")
    .map(|class| class.split_whitespace().map(str::to_string).collect())
    .unwrap_or_default()
}

fn write_classes(node: &NodeRef, classes: &[String]) {
  if classes.is_empty() {
    remove_attr(node, "class");
  } else {
    set_attr(node, "class", &classes.join(" "));
  }
}

#[must_use]
pub fn has_class(node: &NodeRef, class: &str) -> bool {
  classes(node).iter().any(|c| c == class)
}

pub fn add_class(node: &NodeRef, class: &str) {
  let mut current = classes(node);
  if !current.iter().any(|c| c == class) {
    current.push(class.to_string());
    write_classes(node, &current);
  }
}

pub fn remove_class(node: &NodeRef, class: &str) {
  let mut current = classes(node);
  let before = current.len();
  current.retain(|c| c != class);
  if current.len() != before {
    write_classes(node, &current);
  }
}

/// Toggle a class and return whether it is present afterwards.
pub fn toggle_class(node: &NodeRef, class: &str) -> bool {
  if has_class(node, class) {
    remove_class(node, class);
    false
  } else {
    add_class(node, class);
    true
  }
}

/// Set or clear a class depending on `on`.
pub fn set_class(node: &NodeRef, class: &str, on: bool) {
  if on {
    add_class(node, class);
  } else {
    remove_class(node, class);
  }
}

fn style_declarations(node: &NodeRef) -> Vec<(String, String)> {
  attr(node, "style")
    .map(|style| {
      style
        .split(';')
        .filter_map(|decl| {
          let (name, value) = decl.split_once(':')?;
          let name = name.trim();
          (!name.is_empty())
            .then(|| (name.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
    })
    .unwrap_or_default()
}

/// Read an inline style property, e.g. `display`.
#[must_use]
pub fn style_property(node: &NodeRef, property: &str) -> Option<String> {
  style_declarations(node)
    .into_iter()
    .find(|(name, _)| name == property)
    .map(|(_, value)| value)
}

/// Set an inline style property, keeping the other declarations.
pub fn set_style_property(node: &NodeRef, property: &str, value: &str) {
  let mut declarations = style_declarations(node);
  if let Some(existing) =
    declarations.iter_mut().find(|(name, _)| name == property)
  {
    existing.1 = value.to_string();
  } else {
    declarations.push((property.to_string(), value.to_string()));
  }
  let style = declarations
    .iter()
    .map(|(name, value)| format!("{name}: {value}"))
    .collect::<Vec<_>>()
    .join("; ");
  set_attr(node, "style", &style);
}

/// Replace all children of `node` with a single text node.
pub fn set_text(node: &NodeRef, text: &str) {
  clear_children(node);
  node.append(NodeRef::new_text(text));
}

pub fn clear_children(node: &NodeRef) {
  let children: Vec<NodeRef> = node.children().collect();
  for child in children {
    child.detach();
  }
}

/// Move `node` into a new parent that takes its place in the tree.
pub fn wrap(node: &NodeRef, wrapper: &NodeRef) {
  node.insert_before(wrapper.clone());
  wrapper.append(node.clone());
}
