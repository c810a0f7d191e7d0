//! Shared blocking HTTP plumbing for collaborator clients.

use crate::error::{MonitorError, MonitorResult};
use std::time::Duration;

pub fn make_agent(timeout: Duration) -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // status codes are mapped to MonitorError::Http below
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

pub fn bearer(api_key: &str) -> String {
    format!("Bearer {api_key}")
}

/// Turns a non-2xx response into `MonitorError::Http`.
pub fn ensure_success(
    response: ureq::http::Response<ureq::Body>,
    endpoint: &str,
) -> MonitorResult<ureq::http::Response<ureq::Body>> {
    let status = response.status().as_u16();
    if (200..300).contains(&status) {
        Ok(response)
    } else {
        log::warn!("http: {endpoint} returned {status}");
        Err(MonitorError::Http { status, endpoint: endpoint.to_string() })
    }
}

pub fn require_key(key: &str, name: &'static str) -> MonitorResult<()> {
    if key.trim().is_empty() {
        Err(MonitorError::MissingCredential { name })
    } else {
        Ok(())
    }
}
