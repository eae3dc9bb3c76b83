//! Trait-based syntax highlighting, so the code block enhancer does not care
//! which engine tokenizes the code.
//!
//! The bundled backend is **Syntect** with two-face syntax definitions.

pub mod error;
pub mod types;

pub use error::{SyntaxError, SyntaxResult};
pub use types::{SyntaxConfig, SyntaxHighlighter, SyntaxManager};

#[cfg(feature = "syntect")] mod syntect;
#[cfg(feature = "syntect")] pub use syntect::*;

/// Create the default syntax manager based on available features.
///
/// # Errors
///
/// Returns [`SyntaxError::NoBackendAvailable`] when built without the
/// `syntect` feature.
pub fn create_default_manager() -> SyntaxResult<SyntaxManager> {
  #[cfg(feature = "syntect")]
  {
    Ok(create_syntect_manager())
  }

  #[cfg(not(feature = "syntect"))]
  {
    Err(SyntaxError::NoBackendAvailable)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_syntax_config_default() {
    let config = SyntaxConfig::default();
    assert!(config.fallback_to_plain);
    assert_eq!(config.language_aliases["js"], "javascript");
  }

  #[cfg(feature = "syntect")]
  #[test]
  fn test_syntect_highlight_emits_classes() {
    let manager =
      create_default_manager().expect("Failed to create syntax manager");
    let html = manager
      .highlight_code("fn main() {}\n", "rust")
      .expect("Failed to highlight code");
    assert!(html.contains("main"));
    assert!(html.contains("class=\""));
    assert!(!html.contains("<pre"));
  }

  #[cfg(feature = "syntect")]
  #[test]
  fn test_language_resolution() {
    let manager =
      create_default_manager().expect("Failed to create syntax manager");
    assert_eq!(manager.resolve_language("JS"), "javascript");
    assert_eq!(manager.resolve_language("py"), "python");
    assert_eq!(manager.resolve_language("rust"), "rust");
  }

  #[cfg(feature = "syntect")]
  #[test]
  fn test_unknown_language_falls_back_to_plain_text() {
    let manager =
      create_default_manager().expect("Failed to create syntax manager");
    let html = manager
      .highlight_code("just words\n", "no-such-language")
      .expect("plain text fallback");
    assert!(html.contains("just words"));
  }

  #[cfg(feature = "syntect")]
  #[test]
  fn test_stylesheet_for_known_and_unknown_theme() {
    let manager =
      create_default_manager().expect("Failed to create syntax manager");
    let css = manager.stylesheet("Nord").expect("Nord is embedded");
    assert!(css.contains('{'));

    assert!(matches!(
      manager.stylesheet("definitely-not-a-theme"),
      Err(SyntaxError::ThemeNotFound(_))
    ));
  }
}
