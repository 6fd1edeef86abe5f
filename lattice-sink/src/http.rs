//! Shared HTTP plumbing for the remote destinations.

use crate::error::SinkError;
use std::time::Duration;
use ureq::Agent;

/// Outcome of an idempotent create request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    Existing,
}

/// Builds a blocking agent with a per-request timeout.
pub(crate) fn agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

/// Normalizes a destination address: adds `http://` when no scheme is
/// given and strips trailing slashes.
pub fn base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

/// Appends `port` to a normalized base URL whose authority has none.
pub(crate) fn with_default_port(base: &str, port: u16) -> String {
    let (scheme, rest) = base.split_once("://").unwrap_or(("http", base));
    let (authority, path) = match rest.find('/') {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    // `[::1]` splits into "[:" and "1]", which is not a port.
    let has_port = authority.rsplit_once(':').is_some_and(|(host, port)| {
        !host.is_empty() && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())
    });
    if has_port {
        base.to_string()
    } else {
        format!("{}://{}:{}{}", scheme, authority, port, path)
    }
}

/// Maps the result of a create request: 409 Conflict means the object
/// already exists, which is as good as creating it.
pub(crate) fn created_or_existing<T>(
    result: Result<T, ureq::Error>,
) -> Result<Provisioned, SinkError> {
    match result {
        Ok(_) => Ok(Provisioned::Created),
        Err(ureq::Error::StatusCode(409)) => Ok(Provisioned::Existing),
        Err(e) => Err(e.into()),
    }
}
