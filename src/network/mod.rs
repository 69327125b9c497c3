//! Network Module
//!
//! Client-side connection handling.
//!
//! ## Architecture
//! - `Connector` opens a blocking byte stream (TCP by default)
//! - `Session` owns that stream and runs one command at a time over it
//! - A session with no stream logs in again on the next command

mod connector;
mod session;

pub use connector::{Connector, TcpConnector};
pub use session::{Adapter, DebugSink, Session, SessionState, TracingSink};
