//! Friend-link request modal.
//!
//! The modal opens from a trigger button, closes from its close and cancel
//! controls, the Escape key, or a successful submission. Submitting posts
//! the form fields as a flat JSON object to `/api/friend-link`; the result
//! is reported through a [`Notifier`] (a blocking alert in the browser).
use kuchikikiki::NodeRef;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  dom::{
    add_class,
    find_by_id,
    remove_attr,
    remove_class,
    select_first,
    set_attr,
    set_style_property,
    set_text,
  },
  error::{PageError, PageResult},
  form::{form_entries, reset_form, submit_button},
};

/// Endpoint path the request is posted to.
pub const FRIEND_LINK_ENDPOINT: &str = "/api/friend-link";

const OVERLAY_HIDDEN_CLASSES: &[&str] = &["opacity-0", "pointer-events-none"];
const OVERLAY_SHOWN_CLASS: &str = "opacity-100";

/// The response of the friend-link endpoint, reduced to what the modal
/// inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendLinkResponse {
  pub status:       u16,
  pub content_type: Option<String>,
  pub body:         String,
}

impl FriendLinkResponse {
  #[must_use]
  pub const fn is_success(&self) -> bool {
    self.status >= 200 && self.status < 300
  }

  /// Whether the body is a plain-text message (`text/plain`, parameters such
  /// as `charset` ignored).
  #[must_use]
  pub fn is_plain_text(&self) -> bool {
    self.content_type.as_deref().is_some_and(|content_type| {
      content_type
        .split(';')
        .next()
        .is_some_and(|media| media.trim().eq_ignore_ascii_case("text/plain"))
    })
  }
}

/// Network collaborator sending the request.
pub trait FriendLinkClient {
  /// Post `payload` as `application/json`.
  ///
  /// Any HTTP status is a response; only transport-level failures are
  /// errors.
  ///
  /// # Errors
  ///
  /// Returns [`PageError::Transport`] when no response was received.
  fn submit(&self, payload: &Map<String, Value>) -> PageResult<FriendLinkResponse>;
}

/// Surface for user-facing messages.
pub trait Notifier {
  fn alert(&self, message: &str);
}

/// User-facing texts of the modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FriendLinkMessages {
  /// Label of the submit button while the request is in flight.
  pub submitting:      String,
  pub success:         String,
  /// Shown for a plain-text server error; `{detail}` is replaced with the
  /// response body.
  pub server_failure:  String,
  /// Shown for every other failure.
  pub generic_failure: String,
}

impl Default for FriendLinkMessages {
  fn default() -> Self {
    Self {
      submitting:      "Submitting...".to_string(),
      success:         "Friend link request submitted, I will take a look \
                        soon (probably)"
        .to_string(),
      server_failure:  "Submission failed: {detail}\nPlease contact me by \
                        email"
        .to_string(),
      generic_failure: "Submission failed, please try again later or \
                        contact me by email"
        .to_string(),
    }
  }
}

/// How a submission attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
  /// Accepted; the modal closed and was cleared.
  Accepted,
  /// Rejected with a plain-text explanation from the server.
  Rejected(String),
  /// Any other failure, including transport errors.
  Failed,
}

/// Classify a response (or transport failure) the way the modal reports it.
#[must_use]
pub fn classify(result: &PageResult<FriendLinkResponse>) -> SubmissionOutcome {
  match result {
    Ok(response) if response.is_success() => SubmissionOutcome::Accepted,
    Ok(response) if response.status == 500 && response.is_plain_text() => {
      SubmissionOutcome::Rejected(response.body.clone())
    },
    Ok(response) => {
      warn!("Friend link request failed with status {}", response.status);
      SubmissionOutcome::Failed
    },
    Err(e) => {
      warn!("Friend link request did not complete: {e}");
      SubmissionOutcome::Failed
    },
  }
}

/// Turn form entries into the flat JSON payload. Later duplicates win.
#[must_use]
pub fn payload_from_entries(entries: Vec<(String, String)>) -> Map<String, Value> {
  entries
    .into_iter()
    .map(|(name, value)| (name, Value::String(value)))
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
  #[default]
  Closed,
  Open,
}

/// The elements the modal works on.
#[derive(Debug, Clone)]
pub struct FriendLinkElements {
  pub trigger: NodeRef,
  pub overlay: NodeRef,
  pub close:   NodeRef,
  pub cancel:  NodeRef,
  pub form:    NodeRef,
  pub body:    NodeRef,
}

impl FriendLinkElements {
  /// Find the elements by their conventional ids.
  ///
  /// # Errors
  ///
  /// Returns [`PageError::MissingElement`] naming the first missing piece.
  pub fn locate(document: &NodeRef) -> PageResult<Self> {
    let by_id = |id: &str| {
      find_by_id(document, id).ok_or_else(|| PageError::missing(format!("#{id}")))
    };
    Ok(Self {
      trigger: by_id("toggleFormBtn")?,
      overlay: by_id("modalOverlay")?,
      close:   by_id("closeModalBtn")?,
      cancel:  by_id("cancelFormBtn")?,
      form:    by_id("friendLinkSubmitForm")?,
      body:    select_first(document, "body")
        .ok_or_else(|| PageError::missing("body"))?,
    })
  }
}

/// Controller of the friend-link modal.
pub struct FriendLinkModal<C, N> {
  elements: FriendLinkElements,
  client:   C,
  notifier: N,
  messages: FriendLinkMessages,
  state:    ModalState,
}

impl<C: FriendLinkClient, N: Notifier> FriendLinkModal<C, N> {
  #[must_use]
  pub fn new(elements: FriendLinkElements, client: C, notifier: N) -> Self {
    Self {
      elements,
      client,
      notifier,
      messages: FriendLinkMessages::default(),
      state: ModalState::Closed,
    }
  }

  /// Locate the elements in `document` and build the controller.
  ///
  /// # Errors
  ///
  /// See [`FriendLinkElements::locate`].
  pub fn attach(document: &NodeRef, client: C, notifier: N) -> PageResult<Self> {
    FriendLinkElements::locate(document)
      .map(|elements| Self::new(elements, client, notifier))
  }

  #[must_use]
  pub fn with_messages(mut self, messages: FriendLinkMessages) -> Self {
    self.messages = messages;
    self
  }

  #[must_use]
  pub const fn state(&self) -> ModalState {
    self.state
  }

  #[must_use]
  pub const fn elements(&self) -> &FriendLinkElements {
    &self.elements
  }

  /// Show the overlay and lock background scrolling.
  pub fn open(&mut self) {
    let overlay = &self.elements.overlay;
    for class in OVERLAY_HIDDEN_CLASSES {
      remove_class(overlay, class);
    }
    add_class(overlay, OVERLAY_SHOWN_CLASS);
    set_style_property(&self.elements.body, "overflow", "hidden");
    self.state = ModalState::Open;
    debug!("Friend link modal opened");
  }

  /// Hide the overlay, restore scrolling and clear the form.
  pub fn close(&mut self) {
    let overlay = &self.elements.overlay;
    remove_class(overlay, OVERLAY_SHOWN_CLASS);
    remove_class(overlay, "h-screen");
    for class in OVERLAY_HIDDEN_CLASSES {
      add_class(overlay, class);
    }
    set_style_property(&self.elements.body, "overflow", "auto");
    reset_form(&self.elements.form);
    self.state = ModalState::Closed;
    debug!("Friend link modal closed");
  }

  /// A keydown anywhere on the page. Escape closes the open modal.
  ///
  /// Returns whether the key was handled.
  pub fn handle_key(&mut self, key: &str) -> bool {
    if key == "Escape" && self.state == ModalState::Open {
      self.close();
      true
    } else {
      false
    }
  }

  /// Submit the form.
  ///
  /// The submit button is disabled and relabelled while the request is in
  /// flight, and restored once it settles, whatever the outcome.
  pub fn submit(&mut self) -> SubmissionOutcome {
    let payload = payload_from_entries(form_entries(&self.elements.form));
    let button = submit_button(&self.elements.form);
    let original_label = button.as_ref().map(NodeRef::text_contents);

    if let Some(button) = &button {
      set_text(button, &self.messages.submitting);
      set_attr(button, "disabled", "");
    }

    let result = self.client.submit(&payload);

    if let (Some(button), Some(label)) = (&button, &original_label) {
      set_text(button, label);
      remove_attr(button, "disabled");
    }

    let outcome = classify(&result);
    match &outcome {
      SubmissionOutcome::Accepted => {
        info!("Friend link request accepted");
        self.notifier.alert(&self.messages.success);
        self.close();
      },
      SubmissionOutcome::Rejected(detail) => {
        self
          .notifier
          .alert(&self.messages.server_failure.replace("{detail}", detail));
      },
      SubmissionOutcome::Failed => {
        self.notifier.alert(&self.messages.generic_failure);
      },
    }
    outcome
  }
}

/// Blocking HTTP client posting to `<site>/api/friend-link`.
#[cfg(feature = "http")]
pub struct HttpFriendLinkClient {
  endpoint: String,
  client:   reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpFriendLinkClient {
  /// Build a client for the site at `site_url`.
  ///
  /// # Errors
  ///
  /// Returns [`PageError::Transport`] if the HTTP client cannot be built.
  pub fn new(site_url: &str) -> PageResult<Self> {
    let client = reqwest::blocking::Client::builder()
      .timeout(std::time::Duration::from_secs(10))
      .user_agent(concat!("pagewire/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| PageError::Transport(format!("client build error: {e}")))?;
    Ok(Self {
      endpoint: format!(
        "{}{FRIEND_LINK_ENDPOINT}",
        site_url.trim_end_matches('/')
      ),
      client,
    })
  }

  #[must_use]
  pub fn endpoint(&self) -> &str {
    &self.endpoint
  }
}

#[cfg(feature = "http")]
impl FriendLinkClient for HttpFriendLinkClient {
  fn submit(&self, payload: &Map<String, Value>) -> PageResult<FriendLinkResponse> {
    let body = serde_json::to_string(payload)?;
    let response = self
      .client
      .post(&self.endpoint)
      .header(reqwest::header::CONTENT_TYPE, "application/json")
      .body(body)
      .send()
      .map_err(|e| PageError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let content_type = response
      .headers()
      .get(reqwest::header::CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .map(str::to_string);
    let body = response
      .text()
      .map_err(|e| PageError::Transport(e.to_string()))?;

    Ok(FriendLinkResponse {
      status,
      content_type,
      body,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn response(status: u16, content_type: Option<&str>, body: &str) -> PageResult<FriendLinkResponse> {
    Ok(FriendLinkResponse {
      status,
      content_type: content_type.map(str::to_string),
      body: body.to_string(),
    })
  }

  #[test]
  fn test_classify_responses() {
    assert_eq!(classify(&response(201, None, "")), SubmissionOutcome::Accepted);
    assert_eq!(
      classify(&response(500, Some("text/plain; charset=utf-8"), "duplicate entry")),
      SubmissionOutcome::Rejected("duplicate entry".into())
    );
    assert_eq!(
      classify(&response(500, Some("application/json"), "{}")),
      SubmissionOutcome::Failed
    );
    assert_eq!(
      classify(&response(400, Some("text/plain"), "bad")),
      SubmissionOutcome::Failed
    );
    assert_eq!(
      classify(&Err(PageError::Transport("connection refused".into()))),
      SubmissionOutcome::Failed
    );
  }

  #[test]
  fn test_payload_is_flat_string_map() {
    let payload = payload_from_entries(vec![
      ("name".into(), "Cat".into()),
      ("url".into(), "https://cat.example".into()),
    ]);
    assert_eq!(
      serde_json::to_string(&payload).expect("serializable"),
      r#"{"name":"Cat","url":"https://cat.example"}"#
    );
  }

  #[cfg(feature = "http")]
  #[test]
  fn test_http_client_endpoint() {
    let client = HttpFriendLinkClient::new("https://blog.example/")
      .expect("client builds");
    assert_eq!(client.endpoint(), "https://blog.example/api/friend-link");
  }
}
