//! Session
//!
//! Owns the connection to the server: authentication, command framing and
//! response reading. Payloads go to the serializer, failures to the
//! classifier.
//!
//! ## States
//! ```text
//! Disconnected → Connecting → Authenticating → Ready ⇄ InFlight
//!                                                 │
//!                                  I/O failure → Faulted (socket dropped)
//! ```
//! A session without a socket logs in again on the next send.

use std::io::{self, BufRead, BufReader, Read, Write};

use md5::{Digest, Md5};

use crate::classifier;
use crate::config::Config;
use crate::error::{CgpError, Result, ServerError};
use crate::protocol::{
    build_command, is_complete, parse_challenge, status, CommandBuilders, Serializer,
    StatusLine, WireValue,
};

use super::connector::{Connector, TcpConnector};

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No socket
    Disconnected,
    /// Opening the socket
    Connecting,
    /// Socket open, APOP/INLINE exchange running
    Authenticating,
    /// Authenticated, no command outstanding
    Ready,
    /// Command written, response not read yet
    InFlight,
    /// Socket dropped after an I/O failure
    Faulted,
}

/// Receives diagnostic wire lines
pub trait DebugSink: Send {
    fn debug(&self, line: &str);
}

/// Debug sink that forwards to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn debug(&self, line: &str) {
        tracing::debug!(target: "cgpro::wire", "{}", line.trim_end());
    }
}

/// The capability a facade needs from a backend
pub trait Adapter {
    /// Turn a command name and parameters into the line to send
    fn build_command(&self, name: &str, parameters: &[WireValue]) -> Result<String>;

    /// Send a prepared line and decode the response payload
    fn send_command(&mut self, command: &str) -> Result<WireValue>;

    /// Whether the last response was a success
    fn is_success(&self) -> bool;

    fn set_serializer(&mut self, serializer: Box<dyn Serializer>);

    /// Toggle wire tracing through `tracing`
    fn set_debug(&mut self, debug: bool);

    fn set_debug_sink(&mut self, sink: Option<Box<dyn DebugSink>>);

    /// Build, send and return the decoded payload
    fn get_response(&mut self, name: &str, parameters: &[WireValue]) -> Result<WireValue> {
        let command = self.build_command(name, parameters)?;
        self.send_command(&command)
    }

    /// Build, send and report success, discarding the payload
    fn execute_command(&mut self, name: &str, parameters: &[WireValue]) -> Result<bool> {
        let command = self.build_command(name, parameters)?;
        self.send_command(&command)?;
        Ok(self.is_success())
    }
}

/// A single authenticated conversation with the server
///
/// One command is in flight at a time. The session does no locking; share
/// it between threads only behind a lock held across send and read.
pub struct Session<C: Connector = TcpConnector> {
    config: Config,
    connector: C,
    stream: Option<BufReader<C::Stream>>,
    state: SessionState,
    serializer: Box<dyn Serializer>,
    debug_sink: Option<Box<dyn DebugSink>>,
    builders: CommandBuilders,
    last_command: Option<String>,
    last_response: Option<String>,
    last_code: u16,
    last_message: String,
}

impl Session<TcpConnector> {
    /// Create a session that connects over TCP
    pub fn new(config: Config) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> Session<C> {
    /// Create a session that opens its stream through `connector`
    pub fn with_connector(config: Config, connector: C) -> Self {
        let serializer = Box::new(config.codec());
        Self {
            config,
            connector,
            stream: None,
            state: SessionState::Disconnected,
            serializer,
            debug_sink: None,
            builders: CommandBuilders::new(),
            last_command: None,
            last_response: None,
            last_code: 0,
            last_message: String::new(),
        }
    }

    pub fn with_serializer(mut self, serializer: Box<dyn Serializer>) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn with_debug_sink(mut self, sink: Box<dyn DebugSink>) -> Self {
        self.debug_sink = Some(sink);
        self
    }

    pub fn set_serializer(&mut self, serializer: Box<dyn Serializer>) {
        self.serializer = serializer;
    }

    pub fn set_debug_sink(&mut self, sink: Option<Box<dyn DebugSink>>) {
        self.debug_sink = sink;
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    /// Register a type-specific builder for a command name
    pub fn register_builder<F>(&mut self, name: &str, builder: F)
    where
        F: Fn(&[WireValue]) -> Result<String> + Send + 'static,
    {
        self.builders.register(name, builder);
    }

    // =========================================================================
    // Connect / Authenticate
    // =========================================================================

    /// Connect and authenticate with the configured parameters
    pub fn login(&mut self) -> Result<()> {
        self.login_to(None, None, None, None)
    }

    /// Connect and authenticate, overriding configured parameters.
    ///
    /// Overrides are kept in the session config so a later transparent
    /// re-login goes to the same place with the same credentials.
    pub fn login_to(
        &mut self,
        host: Option<&str>,
        port: Option<u16>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<()> {
        if let Some(host) = host.filter(|h| !h.is_empty()) {
            self.config.host = host.to_string();
        }
        if let Some(port) = port.filter(|p| *p != 0) {
            self.config.port = port;
        }
        if let Some(username) = username.filter(|u| !u.is_empty()) {
            self.config.username = Some(username.to_string());
        }
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            self.config.password = Some(password.to_string());
        }

        let username = match self.config.username.as_deref() {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => return Err(CgpError::MissingCredential("username")),
        };
        let password = match self.config.password.as_deref() {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => return Err(CgpError::MissingCredential("password")),
        };

        self.stream = None;
        self.state = SessionState::Connecting;

        let addr = self.config.addr();
        tracing::debug!("Connecting to {}", addr);

        let stream = match self.connector.connect(&self.config) {
            Ok(stream) => stream,
            Err(source) => {
                self.state = SessionState::Disconnected;
                return Err(CgpError::Connect { addr, source });
            }
        };

        self.stream = Some(BufReader::new(stream));
        self.state = SessionState::Authenticating;

        if let Err(e) = self.authenticate(&username, &password) {
            self.stream = None;
            if self.state != SessionState::Faulted {
                self.state = SessionState::Disconnected;
            }
            return Err(e);
        }

        self.state = SessionState::Ready;
        tracing::debug!("Logged in to {} as {}", addr, username);
        Ok(())
    }

    fn authenticate(&mut self, username: &str, password: &str) -> Result<()> {
        let greeting = self.read_greeting()?;
        self.debug(&greeting);

        let challenge = parse_challenge(&greeting)
            .ok_or_else(|| {
                CgpError::format(format!("greeting carries no challenge: {}", greeting.trim()))
            })?
            .to_string();

        let digest = hex::encode(Md5::digest(format!("{}{}", challenge, password).as_bytes()));

        self.send_command(&format!("APOP {} {}", username, digest))?;
        self.send_command("INLINE")?;
        Ok(())
    }

    /// Block until the first non-empty line arrives
    fn read_greeting(&mut self) -> Result<String> {
        let limit = self.config.max_response_size;
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = match self.stream.as_mut() {
                Some(reader) => read_bounded(reader, &mut line, limit),
                None => return Err(not_connected()),
            };

            match read {
                Ok(0) => {
                    let err = io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed before greeting",
                    );
                    self.fault(&err);
                    return Err(err.into());
                }
                Ok(_) if line.len() > limit => {
                    self.stream = None;
                    self.state = SessionState::Faulted;
                    return Err(CgpError::format(format!("greeting exceeds {} bytes", limit)));
                }
                Ok(_) => {
                    let text = String::from_utf8_lossy(&line);
                    if !text.trim().is_empty() {
                        return Ok(text.into_owned());
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.fault(&e);
                    return Err(e.into());
                }
            }
        }
    }

    /// Drop the socket. The next command logs in again.
    pub fn logout(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("Closing connection to {}", self.config.addr());
        }
        self.state = SessionState::Disconnected;
    }

    // =========================================================================
    // Send / Receive
    // =========================================================================

    /// Write one command line, logging in first if there is no socket
    pub fn send(&mut self, command: &str) -> Result<()> {
        if self.stream.is_none() {
            self.login()?;
        }

        self.last_command = Some(command.to_string());
        self.last_response = None;
        self.last_code = 0;
        self.last_message.clear();

        self.debug(&format!("SENT: {}", command));

        let line = format!("{}\n", command);
        let written = match self.stream.as_mut() {
            Some(reader) => {
                let writer = reader.get_mut();
                writer.write_all(line.as_bytes()).and_then(|_| writer.flush())
            }
            None => return Err(not_connected()),
        };

        if let Err(e) = written {
            self.fault(&e);
            return Err(e.into());
        }

        if self.state == SessionState::Ready {
            self.state = SessionState::InFlight;
        }
        Ok(())
    }

    /// Read one response, accumulating until it ends with CRLF
    ///
    /// Rejections come back as classified errors.
    pub fn read_response(&mut self) -> Result<StatusLine> {
        let raw = self.read_raw_response()?;
        self.debug(&raw);

        let trimmed = raw.strip_suffix("\r\n").unwrap_or(&raw).to_string();
        self.last_response = Some(trimmed);

        let line = match StatusLine::parse(&raw) {
            Ok(line) => line,
            Err(e) => {
                self.last_code = status::SERVER_ERROR;
                self.last_message = raw.trim().to_string();
                return Err(e.with_context(
                    self.last_command.as_deref(),
                    self.last_response.as_deref(),
                ));
            }
        };

        self.last_code = line.code;
        self.last_message = line.message.clone();

        if !line.is_success() {
            return Err(CgpError::Rejected(self.create_error(None, None)));
        }

        Ok(line)
    }

    fn read_raw_response(&mut self) -> Result<String> {
        let limit = self.config.max_response_size;
        let mut buffer = Vec::new();

        loop {
            let read = match self.stream.as_mut() {
                Some(reader) => read_bounded(reader, &mut buffer, limit),
                None => return Err(not_connected()),
            };

            match read {
                Ok(0) => {
                    let err = io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed by server",
                    );
                    self.fault(&err);
                    return Err(err.into());
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.fault(&e);
                    return Err(e.into());
                }
            }

            if buffer.len() > limit {
                // Framing is lost once part of a response is discarded
                self.stream = None;
                self.state = SessionState::Faulted;
                return Err(CgpError::format(format!("response exceeds {} bytes", limit))
                    .with_context(self.last_command.as_deref(), None));
            }

            if is_complete(&buffer) {
                break;
            }
        }

        if self.state == SessionState::InFlight {
            self.state = SessionState::Ready;
        }

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Send a prepared line and decode the payload of the response
    pub fn send_command(&mut self, command: &str) -> Result<WireValue> {
        self.send(command)?;
        let line = self.read_response()?;

        self.serializer
            .deserialize(line.payload_text())
            .map_err(|e| e.with_context(self.last_command.as_deref(), self.last_response.as_deref()))
    }

    /// Classify a rejection. Missing message or code fall back to the last
    /// recorded ones.
    pub fn create_error(&self, message: Option<&str>, code: Option<u16>) -> ServerError {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or(self.last_message.as_str());
        let code = code.filter(|c| *c != 0).unwrap_or(self.last_code);

        classifier::classify(
            message,
            code,
            self.last_command.as_deref(),
            self.last_response.as_deref(),
        )
    }

    // =========================================================================
    // Serializer Pass-through
    // =========================================================================

    pub fn serialize(&self, value: Option<&WireValue>) -> String {
        self.serializer.serialize(value)
    }

    pub fn deserialize(&self, text: &str) -> Result<WireValue> {
        self.serializer.deserialize(text)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn last_command(&self) -> Option<&str> {
        self.last_command.as_deref()
    }

    /// Raw text of the last response, terminator stripped
    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    /// Status code of the last response, 0 before any response
    pub fn last_code(&self) -> u16 {
        self.last_code
    }

    pub fn last_message(&self) -> &str {
        &self.last_message
    }

    pub fn is_success(&self) -> bool {
        status::is_success(self.last_code)
    }

    fn fault(&mut self, err: &io::Error) {
        tracing::warn!("Connection to {} faulted: {}", self.config.addr(), err);
        self.stream = None;
        self.state = SessionState::Faulted;
    }

    fn debug(&self, line: &str) {
        match &self.debug_sink {
            Some(sink) => sink.debug(line),
            None if self.config.debug => {
                tracing::debug!(target: "cgpro::wire", "{}", line.trim_end())
            }
            None => tracing::trace!("{}", line.trim_end()),
        }
    }
}

impl<C: Connector> Adapter for Session<C> {
    fn build_command(&self, name: &str, parameters: &[WireValue]) -> Result<String> {
        build_command(name, parameters, &self.builders, self.serializer.as_ref())
    }

    fn send_command(&mut self, command: &str) -> Result<WireValue> {
        Session::send_command(self, command)
    }

    fn is_success(&self) -> bool {
        Session::is_success(self)
    }

    fn set_serializer(&mut self, serializer: Box<dyn Serializer>) {
        Session::set_serializer(self, serializer);
    }

    fn set_debug(&mut self, debug: bool) {
        Session::set_debug(self, debug);
    }

    fn set_debug_sink(&mut self, sink: Option<Box<dyn DebugSink>>) {
        Session::set_debug_sink(self, sink);
    }
}

/// `read_until` that never grows `buffer` past `limit + 1` bytes
fn read_bounded<R: BufRead>(reader: &mut R, buffer: &mut Vec<u8>, limit: usize) -> io::Result<usize> {
    let room = limit.saturating_add(1).saturating_sub(buffer.len()) as u64;
    reader.by_ref().take(room).read_until(b'\n', buffer)
}

fn not_connected() -> CgpError {
    CgpError::Io(io::Error::new(io::ErrorKind::NotConnected, "no live connection"))
}
