//! Connector
//!
//! Opens the byte stream a session talks over.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;

/// Opens a fresh stream to the server described by a config
pub trait Connector: Send {
    type Stream: Read + Write + Send;

    fn connect(&self, config: &Config) -> io::Result<Self::Stream>;
}

/// Plain blocking TCP
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&self, config: &Config) -> io::Result<TcpStream> {
        let stream = if config.connect_timeout_ms > 0 {
            connect_with_timeout(config, Duration::from_millis(config.connect_timeout_ms))?
        } else {
            TcpStream::connect((config.host.as_str(), config.port))?
        };

        // Disable Nagle's algorithm, every command is a single small line
        stream.set_nodelay(true)?;

        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        Ok(stream)
    }
}

/// Try every resolved address in turn, returning the last failure
fn connect_with_timeout(config: &Config, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in (config.host.as_str(), config.port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{} did not resolve to any address", config.addr()),
        )
    }))
}
