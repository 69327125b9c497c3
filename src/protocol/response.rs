//! Response definitions
//!
//! Parses the status line the server sends for every command, and the
//! challenge token carried by the connection greeting.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{CgpError, Result};
use super::status;

/// Line terminator that ends every server response
pub const TERMINATOR: &[u8] = b"\r\n";

fn status_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\A(\d+)(?:\s(.*))?\z").expect("valid status line pattern"))
}

fn challenge_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(<.*@*>)").expect("valid challenge pattern"))
}

/// One parsed server response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// Status code
    pub code: u16,

    /// Human-readable message, right-trimmed. `"OK"` for inline responses.
    pub message: String,

    /// Inline payload (code 201 only)
    pub payload: Option<String>,
}

impl StatusLine {
    /// Parse the accumulated response text, terminator included
    ///
    /// Text that does not look like `<code> <message>` is a format error
    /// carrying the trimmed raw text and code 500.
    pub fn parse(raw: &str) -> Result<Self> {
        let body = raw.strip_suffix("\r\n").unwrap_or(raw);

        let caps = status_line_re()
            .captures(body)
            .ok_or_else(|| CgpError::format(raw.trim()))?;

        let code: u16 = caps[1].parse().map_err(|_| CgpError::format(raw.trim()))?;
        let text = caps.get(2).map_or("", |m| m.as_str());

        if code == status::SUCCESS {
            return Ok(Self {
                code,
                message: "OK".to_string(),
                payload: Some(text.to_string()),
            });
        }

        Ok(Self {
            code,
            message: text.trim_end().to_string(),
            payload: None,
        })
    }

    /// True for 200 and 201
    pub fn is_success(&self) -> bool {
        status::is_success(self.code)
    }

    /// Text to hand to the decoder: empty for 200, the inline text for 201
    pub fn payload_text(&self) -> &str {
        self.payload.as_deref().unwrap_or("")
    }
}

/// Extract the `<...>` challenge token from the server greeting
pub fn parse_challenge(greeting: &str) -> Option<&str> {
    challenge_re()
        .captures(greeting)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Check whether the accumulated bytes end with the terminator
pub fn is_complete(buffer: &[u8]) -> bool {
    buffer.ends_with(TERMINATOR)
}
