//! Configuration for the CLI client
//!
//! Centralized configuration with sensible defaults.

use crate::error::{CgpError, Result};
use crate::protocol::{DictionaryCodec, DEFAULT_MAX_DEPTH};

/// Main configuration for a session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Connection Configuration
    // -------------------------------------------------------------------------
    /// Server host name or address
    pub host: String,

    /// CLI/PWD port
    pub port: u16,

    /// Connect timeout (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// Socket read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Credentials
    // -------------------------------------------------------------------------
    pub username: Option<String>,

    pub password: Option<String>,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Trace wire lines through `tracing` when no debug sink is attached
    pub debug: bool,

    /// Dictionary codec translation mode
    pub translate_strings: bool,

    /// Max `{`/`(` nesting accepted when decoding
    pub max_depth: usize,

    /// Max bytes accumulated for one response
    pub max_response_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 106,
            connect_timeout_ms: 0,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            username: None,
            password: None,
            debug: false,
            translate_strings: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_response_size: 16 * 1024 * 1024, // 16 MB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Build a config from loose key/value options
    ///
    /// Unknown, empty and numeric keys are skipped.
    pub fn from_options<I, K, V>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Config::default();
        config.apply_options(options)?;
        Ok(config)
    }

    /// Apply loose key/value options on top of this config
    pub fn apply_options<I, K, V>(&mut self, options: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in options {
            let key = key.as_ref();
            let value = value.as_ref();

            if key.is_empty() || key.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }

            match key {
                "host" | "server" => self.host = value.to_string(),
                "port" => self.port = parse_number(key, value)?,
                "username" | "login" => self.username = Some(value.to_string()),
                "password" => self.password = Some(value.to_string()),
                "debug" => self.debug = parse_flag(key, value)?,
                "translate_strings" => self.translate_strings = parse_flag(key, value)?,
                "max_depth" => self.max_depth = parse_number(key, value)?,
                "max_response_size" => self.max_response_size = parse_number(key, value)?,
                "connect_timeout_ms" => self.connect_timeout_ms = parse_number(key, value)?,
                "read_timeout_ms" => self.read_timeout_ms = parse_number(key, value)?,
                "write_timeout_ms" => self.write_timeout_ms = parse_number(key, value)?,
                other => tracing::debug!("Ignoring unknown option '{}'", other),
            }
        }
        Ok(())
    }

    /// `host:port` as passed to the connector
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The codec matching this config's protocol settings
    pub fn codec(&self) -> DictionaryCodec {
        DictionaryCodec::new()
            .with_translation(self.translate_strings)
            .with_max_depth(self.max_depth)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CgpError::Config(format!("'{}' is not a valid value for {}", value, key)))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "1" | "true" => Ok(true),
        "0" | "false" | "" => Ok(false),
        other => Err(CgpError::Config(format!(
            "Not a valid value for {} expected 0,1 got: {}",
            key, other
        ))),
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the login name
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self
    }

    /// Set the login secret
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = Some(password.into());
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Enable or disable codec string translation
    pub fn translate_strings(mut self, translate: bool) -> Self {
        self.config.translate_strings = translate;
        self
    }

    /// Set the decode nesting limit
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set the response size limit (in bytes)
    pub fn max_response_size(mut self, size: usize) -> Self {
        self.config.max_response_size = size;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
