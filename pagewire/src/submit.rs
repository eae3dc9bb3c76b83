//! Friend-link requests from the terminal, judged by the same rules as the
//! modal on the page.
use log::{error, info};
use pagewire_dom::{
  FriendLinkClient,
  PageError,
  SubmissionOutcome,
  friend_link::{FriendLinkMessages, HttpFriendLinkClient, classify, payload_from_entries},
};
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum SubmitError {
  #[error("Invalid field '{0}', expected KEY=VALUE")]
  InvalidField(String),

  #[error("No site URL given; pass --site or set site_url in the config")]
  MissingSite,

  #[error("Could not set up the request: {0}")]
  Client(#[from] PageError),

  #[error("Request rejected by the site: {0}")]
  Rejected(String),

  #[error("Request failed, see the log for details")]
  Failed,
}

/// Split a `KEY=VALUE` argument. The value may contain further `=`.
///
/// # Errors
///
/// Returns [`SubmitError::InvalidField`] when there is no `=` or the key is
/// empty.
pub fn parse_field(field: &str) -> Result<(String, String), SubmitError> {
  match field.split_once('=') {
    Some((key, value)) if !key.trim().is_empty() => {
      Ok((key.trim().to_string(), value.to_string()))
    },
    _ => Err(SubmitError::InvalidField(field.to_string())),
  }
}

/// Submit `fields` through `client` and report the outcome.
///
/// # Errors
///
/// Returns an error for malformed fields, a plain-text rejection from the
/// site, or any other failure.
pub fn submit_friend_link<C: FriendLinkClient>(
  client: &C,
  fields: &[String],
  messages: &FriendLinkMessages,
) -> Result<(), SubmitError> {
  let entries = fields
    .iter()
    .map(|field| parse_field(field))
    .collect::<Result<Vec<_>, _>>()?;
  let payload = payload_from_entries(entries);

  info!("{}", messages.submitting);
  match classify(&client.submit(&payload)) {
    SubmissionOutcome::Accepted => {
      info!("{}", messages.success);
      Ok(())
    },
    SubmissionOutcome::Rejected(detail) => {
      error!("{}", messages.server_failure.replace("{detail}", &detail));
      Err(SubmitError::Rejected(detail))
    },
    SubmissionOutcome::Failed => {
      error!("{}", messages.generic_failure);
      Err(SubmitError::Failed)
    },
  }
}

/// Submit `fields` over HTTP to the site configured in `config`.
///
/// # Errors
///
/// See [`submit_friend_link`]; also fails without a site URL.
pub fn submit_to_site(config: &Config, fields: &[String]) -> Result<(), SubmitError> {
  let site_url = config.site_url.as_deref().ok_or(SubmitError::MissingSite)?;
  let client = HttpFriendLinkClient::new(site_url)?;
  info!("Posting friend link request to {}", client.endpoint());
  submit_friend_link(&client, fields, &config.friend_link_messages)
}
