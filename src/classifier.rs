//! Error Classifier
//!
//! Maps a failed status line onto a typed rejection. The server does not
//! use distinct codes for "already exists" and "not found" reliably, so
//! the message text decides the kind and the code is forced to match.

use crate::error::{RejectionKind, ServerError};
use crate::protocol::status;

/// Messages the server uses when the referenced object is missing
const NOT_FOUND_MESSAGES: &[&str] = &[
    "unknown secondary domain name",
    "unknown user account",
    "forwarder is not found",
    "group is not found",
    "Unknown Mailing List",
];

/// Classify a rejection from its message and code.
///
/// `last_command` and `last_response` are snapshotted into the returned
/// error as-is.
pub fn classify(
    message: &str,
    code: u16,
    last_command: Option<&str>,
    last_response: Option<&str>,
) -> ServerError {
    let last_command = last_command.map(str::to_string);
    let last_response = last_response.map(str::to_string);

    if message.contains("already exists") {
        return ServerError {
            kind: RejectionKind::AlreadyExists,
            message: message.to_string(),
            code: status::ALREADY_EXISTS,
            last_command,
            last_response,
        };
    }

    if NOT_FOUND_MESSAGES.contains(&message) {
        return ServerError {
            kind: RejectionKind::NotFound,
            message: message.to_string(),
            code: status::UNKNOWN,
            last_command,
            last_response,
        };
    }

    ServerError::new(message, code, last_command, last_response)
}
