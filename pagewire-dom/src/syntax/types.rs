//! Core types and traits for syntax highlighting.

use std::collections::HashMap;

use super::error::{SyntaxError, SyntaxResult};

/// Trait for syntax highlighting backends.
///
/// A backend turns source text into inner markup for a `code` element: text
/// wrapped in `span`s carrying token classes. Colors come from a stylesheet
/// generated separately for a theme, so the markup itself is theme-agnostic.
pub trait SyntaxHighlighter: Send + Sync {
  /// Get the name of this highlighter backend
  fn name(&self) -> &'static str;

  /// Get a list of supported languages
  fn supported_languages(&self) -> Vec<String>;

  /// Get a list of available themes
  fn available_themes(&self) -> Vec<String>;

  /// Check if a language is supported
  fn supports_language(&self, language: &str) -> bool {
    self
      .supported_languages()
      .iter()
      .any(|lang| lang.eq_ignore_ascii_case(language))
  }

  /// Highlight code in the given language.
  ///
  /// # Returns
  ///
  /// Inner HTML for the `code` element. Newlines of the input are kept as
  /// newlines in the text content.
  fn highlight(&self, code: &str, language: &str) -> SyntaxResult<String>;

  /// CSS rules coloring the classes emitted by [`Self::highlight`].
  fn stylesheet(&self, theme: &str) -> SyntaxResult<String>;
}

/// Configuration for syntax highlighting
#[derive(Debug, Clone)]
pub struct SyntaxConfig {
  /// Language aliases for mapping common names to supported languages
  pub language_aliases: HashMap<String, String>,

  /// Whether to fall back to plain text for unsupported languages
  pub fallback_to_plain: bool,
}

/// Short names found in `language-*` classes of blog posts, and what they
/// highlight as.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
  ("js", "javascript"),
  ("jsx", "javascript"),
  ("ts", "typescript"),
  ("py", "python"),
  ("rb", "ruby"),
  ("sh", "bash"),
  ("shell", "bash"),
  ("zsh", "bash"),
  ("console", "bash"),
  ("yml", "yaml"),
  ("rs", "rust"),
  ("md", "markdown"),
  ("golang", "go"),
  ("c++", "cpp"),
  ("plaintext", "text"),
  ("txt", "text"),
];

impl Default for SyntaxConfig {
  fn default() -> Self {
    Self {
      language_aliases:  DEFAULT_ALIASES
        .iter()
        .map(|(alias, language)| ((*alias).to_string(), (*language).to_string()))
        .collect(),
      fallback_to_plain: true,
    }
  }
}

/// High-level syntax highlighting manager.
///
/// Wraps a backend with alias resolution and plain-text fallback.
pub struct SyntaxManager {
  highlighter: Box<dyn SyntaxHighlighter>,
  config:      SyntaxConfig,
}

impl SyntaxManager {
  #[must_use]
  pub fn new(
    highlighter: Box<dyn SyntaxHighlighter>,
    config: SyntaxConfig,
  ) -> Self {
    Self {
      highlighter,
      config,
    }
  }

  /// Create a new syntax manager with the default configuration
  #[must_use]
  pub fn with_highlighter(highlighter: Box<dyn SyntaxHighlighter>) -> Self {
    Self::new(highlighter, SyntaxConfig::default())
  }

  #[must_use]
  pub fn highlighter(&self) -> &dyn SyntaxHighlighter {
    self.highlighter.as_ref()
  }

  /// Resolve a language name using aliases
  #[must_use]
  pub fn resolve_language(&self, language: &str) -> String {
    let lowered = language.to_ascii_lowercase();
    self
      .config
      .language_aliases
      .get(&lowered)
      .cloned()
      .unwrap_or(lowered)
  }

  /// Highlight code with alias resolution and plain-text fallback.
  ///
  /// # Errors
  ///
  /// Returns [`SyntaxError::UnsupportedLanguage`] when the language is
  /// unknown and fallback is disabled, or the backend's error.
  pub fn highlight_code(
    &self,
    code: &str,
    language: &str,
  ) -> SyntaxResult<String> {
    let resolved_language = self.resolve_language(language);

    if self.highlighter.supports_language(&resolved_language) {
      return self.highlighter.highlight(code, &resolved_language);
    }

    if self.config.fallback_to_plain {
      if self.highlighter.supports_language("text") {
        return self.highlighter.highlight(code, "text");
      }
      if self.highlighter.supports_language("plain text") {
        return self.highlighter.highlight(code, "plain text");
      }
    }

    Err(SyntaxError::UnsupportedLanguage(resolved_language))
  }

  /// Stylesheet for a theme.
  ///
  /// # Errors
  ///
  /// Returns [`SyntaxError::ThemeNotFound`] for unknown themes.
  pub fn stylesheet(&self, theme: &str) -> SyntaxResult<String> {
    self.highlighter.stylesheet(theme)
  }
}
