//! Feed fetching
//!
//! Retrieves the CSV feed over HTTP with explicit connect/read timeouts.
//! Redirects are handled by a bounded loop rather than the client's built-in
//! policy so the depth limit and the failure mode are under our control: a
//! misconfigured or malicious redirect chain terminates with
//! [`IngestError::TooManyRedirects`] instead of recursing.

use reqwest::{header::LOCATION, redirect::Policy, Client, Response};
use std::time::Duration;
use tracing::debug;

use crate::config::FeedConfig;
use crate::error::{IngestError, Result};

/// Fetch the feed, following up to `config.max_redirects` redirects.
///
/// Returns the terminal 2xx response; the body has not been read yet, so the
/// caller can stream it. Any transport error, non-2xx terminal status, or
/// redirect without a usable `Location` is fatal.
pub async fn fetch_feed(config: &FeedConfig) -> Result<Response> {
    let client = Client::builder()
        .redirect(Policy::none())
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.read_timeout_secs))
        .build()
        .map_err(|e| IngestError::fetch(&config.url, e))?;

    let mut url = config.url.clone();

    for _ in 0..=config.max_redirects {
        debug!(url = %url, "Requesting feed");
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| IngestError::fetch(&url, e))?;
        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or_else(|| {
                    IngestError::fetch(&url, format!("redirect {status} without a Location header"))
                })?;

            // Location may be relative; resolve it against the current URL.
            let next = response.url().join(location).map_err(|e| {
                IngestError::fetch(&url, format!("invalid redirect target '{location}': {e}"))
            })?;

            debug!(from = %url, to = %next, "Following redirect");
            url = next.to_string();
            continue;
        }

        if !status.is_success() {
            return Err(IngestError::fetch(&url, format!("HTTP status {status}")));
        }

        return Ok(response);
    }

    Err(IngestError::TooManyRedirects {
        url: config.url.clone(),
        limit: config.max_redirects,
    })
}
