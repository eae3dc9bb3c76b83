//! # pagewire-dom
//!
//! Page behaviors for blog-style article pages, written against the
//! `kuchikikiki` DOM:
//!
//! - **Code blocks**: wrapper, copy-to-clipboard control, syntax
//!   highlighting and per-line rendering ([`codeblock`])
//! - **External links** open in a new browsing context ([`links`])
//! - **Table of contents** with hierarchical numbering, stable anchors and
//!   scroll-spy ([`toc`])
//! - **Tag filter** popover for the search form ([`tags`])
//! - **Friend-link** request modal ([`friend_link`])
//!
//! Each interactive behavior is a controller holding explicit references to
//! the DOM nodes it owns. Platform capabilities (clipboard, layout, alerts,
//! network) are traits, and time is passed in, so the controllers run the
//! same way in a browser host, a build tool or a test.
//!
//! ## Quick Start
//!
//! ```rust
//! use pagewire_dom::{PageOptions, PageProcessor};
//!
//! let processor = PageProcessor::new(PageOptions::default(), None);
//! let page = processor.process(
//!   "<nav id=\"toc\"></nav><article><h2>Intro</h2><a href=\"https://example.com\">x</a></article>",
//! );
//!
//! assert_eq!(page.toc[0].label(), "1 Intro");
//! assert!(page.html.contains("target=\"_blank\""));
//! ```

pub mod codeblock;
pub mod dom;
pub mod error;
pub mod form;
pub mod friend_link;
pub mod links;
pub mod page;
pub mod syntax;
pub mod tags;
pub mod toc;
pub mod utils;

pub use crate::{
  codeblock::{Clipboard, CodeBlockEnhancer, CopyButton},
  error::{PageError, PageResult},
  friend_link::{
    FriendLinkClient,
    FriendLinkModal,
    FriendLinkResponse,
    ModalState,
    Notifier,
    SubmissionOutcome,
  },
  page::{PageOptions, PageProcessor, ProcessedPage},
  tags::{SearchSubmission, TagFilter},
  toc::{Layout, Navigation, ScrollSpy, ScrollSpyOptions, TableOfContents, TocEntry},
};
