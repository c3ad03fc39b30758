//! Classification of upstream failures
//!
//! Transport outcomes map onto the crate error taxonomy as follows:
//! connect failures become ServiceUnavailable, elapsed timeouts become
//! Timeout, and any non-2xx status becomes UpstreamError carrying the
//! upstream status and body text.

use super::Service;
use crate::error::Error;
use reqwest::Response;

/// Longest upstream body kept in an error detail
const MAX_BODY_CHARS: usize = 2048;

/// Classify a failure to obtain a response at all
pub(crate) fn from_request_error(service: Service, error: reqwest::Error) -> Error {
    // Checked first: a connect attempt that times out reports both flags.
    if error.is_timeout() {
        Error::Timeout { service }
    } else if error.is_connect() {
        Error::ServiceUnavailable {
            service,
            message: "could not connect".to_string(),
        }
    } else if error.is_builder() {
        Error::internal(format!("invalid request to {} service: {}", service, error))
    } else {
        Error::ServiceUnavailable {
            service,
            message: error.without_url().to_string(),
        }
    }
}

/// Classify a response with a non-success status
pub(crate) async fn from_response(service: Service, response: Response) -> Error {
    let status = response.status().as_u16();
    let body = match response.text().await {
        Ok(body) => truncate(body),
        Err(e) => format!("<unreadable body: {}>", e.without_url()),
    };
    Error::UpstreamError {
        service,
        status,
        body,
    }
}

/// A 2xx response whose body is not the JSON the proxy promises
pub(crate) fn unreadable_body(service: Service, status: u16, reason: impl std::fmt::Display) -> Error {
    Error::UpstreamError {
        service,
        status,
        body: format!("response is not valid JSON: {}", reason),
    }
}

fn truncate(mut body: String) -> String {
    if let Some((index, _)) = body.char_indices().nth(MAX_BODY_CHARS) {
        body.truncate(index);
        body.push_str("...");
    }
    body
}
