//! Status codes used by the server

/// Command accepted, nothing to return
pub const OK: u16 = 200;

/// Command accepted, the rest of the status line is the payload
pub const SUCCESS: u16 = 201;

/// Referenced object is unknown
pub const UNKNOWN: u16 = 404;

/// Object to create is already there
pub const ALREADY_EXISTS: u16 = 412;

pub const DOMAIN_UNKNOWN: u16 = 404;
pub const DOMAIN_EXISTS: u16 = 412;

/// Malformed response or payload
pub const SERVER_ERROR: u16 = 500;

/// True for the two codes the server uses to accept a command
pub fn is_success(code: u16) -> bool {
    code == OK || code == SUCCESS
}
