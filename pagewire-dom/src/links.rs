//! External link rewriting.
use kuchikikiki::NodeRef;
use log::debug;

use crate::dom::{attr, select_all, set_attr};

/// Whether `href` is an absolute `http(s)` address.
#[must_use]
pub fn is_external(href: &str) -> bool {
  let href = href.trim_start();
  ["http://", "https://"].iter().any(|scheme| {
    href
      .get(..scheme.len())
      .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
  })
}

/// Make every absolute `http(s)` link below `root` open in a new browsing
/// context. Relative and fragment links are left untouched.
///
/// Returns the number of external links found.
pub fn rewrite_external_links(root: &NodeRef) -> usize {
  let mut count = 0;
  for link in select_all(root, "a[href]") {
    if attr(&link, "href").is_some_and(|href| is_external(&href)) {
      set_attr(&link, "target", "_blank");
      count += 1;
    }
  }
  debug!("Rewrote {count} external link(s)");
  count
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dom::{find_by_id, has_attr, parse_document};

  #[test]
  fn test_external_detection() {
    assert!(is_external("https://example.com"));
    assert!(is_external("HTTP://example.com/x"));
    assert!(!is_external("/about"));
    assert!(!is_external("#section"));
    assert!(!is_external("mailto:cat@example.com"));
    assert!(!is_external("//cdn.example.com/lib.js"));
    assert!(!is_external("http"));
  }

  #[test]
  fn test_only_external_links_get_target() {
    let document = parse_document(
      r#"<a id="ext" href="https://example.com">x</a>
         <a id="rel" href="/about">y</a>
         <a id="bare">z</a>"#,
    );
    assert_eq!(rewrite_external_links(&document), 1);

    let ext = find_by_id(&document, "ext").expect("external link");
    assert_eq!(attr(&ext, "target").as_deref(), Some("_blank"));
    let rel = find_by_id(&document, "rel").expect("relative link");
    assert!(!has_attr(&rel, "target"));
  }

  #[test]
  fn test_rewrite_is_idempotent() {
    let document =
      parse_document(r#"<a id="ext" href="http://example.com">x</a>"#);
    rewrite_external_links(&document);
    let once = crate::dom::serialize(&document);
    rewrite_external_links(&document);
    assert_eq!(crate::dom::serialize(&document), once);
  }
}
