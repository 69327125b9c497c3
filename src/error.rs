//! Error types for the CLI client
//!
//! Provides a unified error type for all operations, plus the server
//! rejection type produced by the classifier.

use std::fmt;

use thiserror::Error;

use crate::protocol::status;

/// Result type alias using CgpError
pub type Result<T> = std::result::Result<T, CgpError>;

/// Unified error type for client operations
#[derive(Debug, Error)]
pub enum CgpError {
    // -------------------------------------------------------------------------
    // Connectivity Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Can't connect to host {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Precondition Errors
    // -------------------------------------------------------------------------
    #[error("No valid {0} provided")]
    MissingCredential(&'static str),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Format error ({code}): {message}")]
    Format {
        message: String,
        code: u16,
        last_command: Option<String>,
        last_response: Option<String>,
    },

    #[error(transparent)]
    Rejected(#[from] ServerError),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CgpError {
    /// Build a format error with the server-error code and no diagnostics
    pub fn format(message: impl Into<String>) -> Self {
        CgpError::Format {
            message: message.into(),
            code: status::SERVER_ERROR,
            last_command: None,
            last_response: None,
        }
    }

    /// Attach the last command and raw response to a format error that
    /// does not carry them yet. Other variants pass through untouched.
    pub fn with_context(self, command: Option<&str>, response: Option<&str>) -> Self {
        match self {
            CgpError::Format {
                message,
                code,
                last_command,
                last_response,
            } => CgpError::Format {
                message,
                code,
                last_command: last_command.or_else(|| command.map(str::to_string)),
                last_response: last_response.or_else(|| response.map(str::to_string)),
            },
            other => other,
        }
    }

    /// Numeric status carried by protocol-level errors
    pub fn code(&self) -> Option<u16> {
        match self {
            CgpError::Format { code, .. } => Some(*code),
            CgpError::Rejected(err) => Some(err.code),
            _ => None,
        }
    }

    /// True for socket open/read/write failures
    pub fn is_connectivity(&self) -> bool {
        matches!(self, CgpError::Io(_) | CgpError::Connect { .. })
    }

    /// The classified rejection, if the server refused the command
    pub fn as_rejection(&self) -> Option<&ServerError> {
        match self {
            CgpError::Rejected(err) => Some(err),
            _ => None,
        }
    }
}

/// Classification of a server-side rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// The object the command tried to create is already there
    AlreadyExists,
    /// The object the command refers to does not exist
    NotFound,
    /// Any other rejection
    Generic,
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RejectionKind::AlreadyExists => "already exists",
            RejectionKind::NotFound => "not found",
            RejectionKind::Generic => "rejected",
        };
        f.write_str(name)
    }
}

/// A command the server refused, with the diagnostics captured at the time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Server {kind} ({code}): {message}")]
pub struct ServerError {
    pub kind: RejectionKind,
    pub message: String,
    pub code: u16,
    pub last_command: Option<String>,
    pub last_response: Option<String>,
}

impl ServerError {
    /// Build a generic rejection.
    ///
    /// A couple of domain messages carry fixed codes regardless of what the
    /// caller passed, so this constructor pins them.
    pub fn new(
        message: impl Into<String>,
        code: u16,
        last_command: Option<String>,
        last_response: Option<String>,
    ) -> Self {
        let message = message.into();
        let code = match message.as_str() {
            "domain with this name already exists" => status::DOMAIN_EXISTS,
            "unknown secondary domain name" => status::DOMAIN_UNKNOWN,
            _ => code,
        };

        Self {
            kind: RejectionKind::Generic,
            message,
            code,
            last_command,
            last_response,
        }
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind == RejectionKind::AlreadyExists
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == RejectionKind::NotFound
    }
}
