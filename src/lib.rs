//! # cgpro
//!
//! Client for the CommuniGate Pro CLI/PWD administrative protocol:
//! - Line-oriented command/response exchange over a raw TCP socket
//! - APOP-style challenge authentication with transparent re-login
//! - Dictionary-format codec for structured parameters and payloads
//! - Typed errors classified from the server's status messages
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Cli facade                            │
//! │              (shared handle, one lock per call)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                         Session                              │
//! │        (login, send line, read until CRLF, status)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Dictionary  │          │    Error    │
//!   │    Codec    │          │ Classifier  │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod classifier;
pub mod network;
pub mod cli;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CgpError, RejectionKind, Result, ServerError};
pub use config::Config;
pub use cli::Cli;
pub use network::{Adapter, Session};
pub use protocol::{DictionaryCodec, WireValue};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
