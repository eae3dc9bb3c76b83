use log::error;
use regex::Regex;

/// Create a regex that never matches anything.
///
/// Fallback for statically known patterns, so a broken pattern degrades to
/// "no match" instead of a panic.
///
/// # Panics
///
/// Panics if the fallback regex pattern `r"^\b$"` fails to compile, which
/// should never happen.
#[must_use]
pub fn never_matching_regex() -> Regex {
  #[allow(clippy::unwrap_used, reason = "Both patterns are valid literals")]
  Regex::new(r"[^\s\S]").unwrap_or_else(|_| Regex::new(r"^\b$").unwrap())
}

/// Run a DOM pass over `html`, returning `html` unchanged if the pass panics.
///
/// Malformed pages should degrade to "not enhanced" rather than take the
/// whole site build down with them.
pub fn process_safe<F>(html: &str, processor_fn: F) -> String
where
  F: FnOnce(&str) -> String,
{
  if html.is_empty() {
    return String::new();
  }

  let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
    processor_fn(html)
  }));

  match result {
    Ok(processed) => processed,
    Err(e) => {
      if let Some(error_msg) = e.downcast_ref::<String>() {
        error!("Error processing page: {error_msg}");
      } else if let Some(error_msg) = e.downcast_ref::<&str>() {
        error!("Error processing page: {error_msg}");
      } else {
        error!("Unknown error occurred while processing page");
      }
      html.to_string()
    },
  }
}
