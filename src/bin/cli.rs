//! cgpro CLI Client
//!
//! Sends one administrative command to a CommuniGate Pro server and prints
//! the decoded result in dictionary format.

use clap::Parser;
use cgpro::{Adapter, Config, Session, WireValue};
use tracing_subscriber::{fmt, EnvFilter};

/// cgpro CLI
#[derive(Parser, Debug)]
#[command(name = "cgpro-cli")]
#[command(about = "Run a CommuniGate Pro CLI command")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// CLI/PWD port
    #[arg(short, long, default_value = "106")]
    port: u16,

    /// Administrator account
    #[arg(short, long, env = "CGPRO_USER")]
    user: String,

    /// Administrator password
    #[arg(long, env = "CGPRO_PASSWORD", hide_env_values = true)]
    password: String,

    /// Trace every line sent and received
    #[arg(short, long)]
    debug: bool,

    /// Translate \" and \\ escapes in strings
    #[arg(short, long)]
    translate: bool,

    /// Socket read/write timeout in milliseconds (0 = none)
    #[arg(long, default_value = "0")]
    timeout_ms: u64,

    /// Command name, e.g. GETACCOUNTSETTINGS
    command: String,

    /// Parameters; values starting with '{' or '(' are parsed as dictionary text
    params: Vec<String>,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.debug { "warn,cgpro=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .username(&args.user)
        .password(&args.password)
        .debug(args.debug)
        .translate_strings(args.translate)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .build();

    let codec = config.codec();
    let mut params = Vec::with_capacity(args.params.len());
    for raw in &args.params {
        if raw.starts_with('{') || raw.starts_with('(') {
            match codec.decode(raw) {
                Ok(value) => params.push(value),
                Err(e) => {
                    tracing::error!("Invalid parameter '{}': {}", raw, e);
                    std::process::exit(1);
                }
            }
        } else {
            params.push(WireValue::Scalar(raw.clone()));
        }
    }

    let mut session = Session::new(config);
    match session.get_response(&args.command, &params) {
        Ok(value) => {
            let text = codec.encode(&value);
            if text.is_empty() || text == "\"\"" {
                println!("{} {}", session.last_code(), session.last_message());
            } else {
                println!("{}", text);
            }
        }
        Err(e) => {
            tracing::error!("{} failed: {}", args.command, e);
            std::process::exit(1);
        }
    }

    session.logout();
}
