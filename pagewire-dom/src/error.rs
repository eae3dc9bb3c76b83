//! Error types shared by the page behaviors.

use thiserror::Error;

/// Result type for page behavior operations.
pub type PageResult<T> = Result<T, PageError>;

/// Errors raised while attaching to or driving a page.
#[derive(Debug, Error)]
pub enum PageError {
  #[error("Missing element: {0}")]
  MissingElement(String),

  #[error("Clipboard write rejected: {0}")]
  Clipboard(String),

  #[error("Transport error: {0}")]
  Transport(String),

  #[error("Serde error: {0}")]
  Serde(#[from] serde_json::Error),
}

impl PageError {
  /// Shorthand for [`PageError::MissingElement`].
  pub fn missing(what: impl Into<String>) -> Self {
    Self::MissingElement(what.into())
  }
}
