use thiserror::Error;

/// Top-level error type for the `firelink-api` crate.
///
/// Covers both backend surfaces. `firelink-core` wraps these when a
/// read-mode handoff fails partway through.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Endpoint status codes ───────────────────────────────────────
    /// HTTP 403 — bad auth cookie (cloud) or rejected signature (local).
    #[error("Not authorized (bad credentials or auth cookie)")]
    NotAuthorized,

    /// HTTP 404 — the serial is unknown to the cloud, or the module has
    /// no such endpoint.
    #[error("Fireplace not found (bad serial number)")]
    FireplaceNotFound,

    /// HTTP 422 or a client-side range check: the command or its value
    /// is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unexpected status from the module's embedded server.
    #[error("Local API error (HTTP {status}): {message}")]
    LocalApi { status: u16, message: String },

    /// Unexpected status from the vendor cloud.
    #[error("Cloud API error (HTTP {status}): {message}")]
    CloudApi { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::LocalApi { status, .. } | Self::CloudApi { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// First 200 bytes of an error body, cut on a char boundary so
/// multibyte bodies cannot panic the slice.
pub(crate) fn body_snippet(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_owned();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_owned()
}
