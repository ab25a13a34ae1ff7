//! Shared error primitives used across Ignis crates.

use core::fmt;
use std::io;

/// Result alias used across the workspace.
pub type BrowserResult<T> = Result<T, BrowserError>;

/// Stable error codes shared by every crate.
///
/// Callers match on these instead of parsing messages.
pub mod codes {
    /// The scheme token is not one of `http`, `https`, `file` or `data`.
    pub const INVALID_PROTOCOL: &str = "net.url.invalid_protocol";
    /// The status line did not split into version, code and reason.
    pub const MALFORMED_RESPONSE: &str = "net.http.malformed_response";
    /// A transfer or content encoding was not negotiated through `accept-encoding`.
    pub const UNSUPPORTED_ENCODING: &str = "net.http.unsupported_encoding";
    /// The negotiated encoding could not be decoded.
    pub const DECODE_FAILED: &str = "net.http.decode_failed";
    pub const HEADER_NAME_INVALID: &str = "net.http.header_name_invalid";
    pub const HEADER_VALUE_INVALID: &str = "net.http.header_value_invalid";
    pub const WRITE_FAILED: &str = "net.http.write_failed";
    pub const READ_FAILED: &str = "net.http.read_failed";
    pub const DNS_RESOLVE_FAILED: &str = "net.dns.resolve_failed";
    pub const DNS_NO_RESULTS: &str = "net.dns.no_results";
    pub const CONNECT_FAILED: &str = "net.transport.connect_failed";
    pub const PORT_INVALID: &str = "net.transport.port_invalid";
    pub const REPLAY_EXHAUSTED: &str = "net.replay.exhausted";
    pub const FILE_READ_FAILED: &str = "net.file.read_failed";
    pub const TLS_HANDSHAKE_FAILED: &str = "net.tls.handshake_failed";
    /// A redirect chain did not settle within the hop budget.
    pub const TOO_MANY_REDIRECTS: &str = "browser.load.too_many_redirects";
    /// A `301` response came without a usable `location` header.
    pub const MISSING_LOCATION: &str = "browser.load.missing_location";
    /// A redirect pointed somewhere other than `http` or `https`.
    pub const REDIRECT_SCHEME_INVALID: &str = "browser.load.redirect_scheme_invalid";
    pub const MAX_AGE_INVALID: &str = "storage.cache.max_age_invalid";
}

/// Top-level error type carried through the resolver/loader pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserError {
    pub code: &'static str,
    pub message: String,
    /// Kind of the underlying I/O failure, when there was one.
    pub io_kind: Option<io::ErrorKind>,
}

impl BrowserError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            io_kind: None,
        }
    }

    /// Wraps an I/O failure, keeping its text and kind untouched.
    pub fn io(code: &'static str, context: impl fmt::Display, error: &io::Error) -> Self {
        Self {
            code,
            message: format!("{context}: {error}"),
            io_kind: Some(error.kind()),
        }
    }

    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for BrowserError {}
