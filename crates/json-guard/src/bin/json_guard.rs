//! `json-guard` - apply a JSON Patch under field-level access rules, or
//! filter read-protected fields.
//!
//! Usage:
//!   json-guard patch <schema.json> '<patch-array-json>'
//!   json-guard filter <schema.json> [extra-path...]
//!
//! The document is read from stdin. `JSON_GUARD_CONFIG` may name a TOML
//! access config. Log verbosity follows `RUST_LOG` (default `warn`).

use std::io::{self, Read, Write};

use json_guard::json_cli::{load_config, Command, CONFIG_ENV};
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::WARN.as_str())),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = Command::parse(&args).unwrap_or_else(|e| fail(e));
    let config = load_config(std::env::var(CONFIG_ENV).ok().as_deref()).unwrap_or_else(|e| fail(e));

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        fail(e);
    }

    match command.run(buf.trim(), &config) {
        Ok(result) => {
            let mut out = io::stdout();
            if let Err(e) = out.write_all(result.as_bytes()).and_then(|_| out.write_all(b"\n")) {
                fail(e);
            }
        }
        Err(e) => fail(e),
    }
}
