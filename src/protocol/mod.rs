//! Protocol Module
//!
//! Defines the text protocol spoken on the CLI/PWD port.
//!
//! ## Request Format
//! One ASCII command per line, terminated by `\n`:
//! ```text
//! <COMMAND> <param> <param> ...\n
//! ```
//! Structured parameters are written in dictionary format.
//!
//! ## Response Format
//! One status line terminated by CRLF:
//! ```text
//! <code> <message>\r\n
//! ```
//!
//! ### Status Codes
//! - 200: OK, no payload
//! - 201: OK, `<message>` is the payload in dictionary format
//! - anything else: rejected, `<message>` is the reason
//!
//! ## Authentication
//! The greeting carries a `<...>` challenge. The client answers with
//! `APOP <user> <md5(challenge + password)>` and then `INLINE`.

mod codec;
mod command;
mod response;
mod value;

pub mod status;

pub use codec::{decode, encode, DictionaryCodec, Serializer, DEFAULT_MAX_DEPTH};
pub use command::{build_command, builder_key, BuilderFn, CommandBuilders};
pub use response::{is_complete, parse_challenge, StatusLine, TERMINATOR};
pub use value::WireValue;
