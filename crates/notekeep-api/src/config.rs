//! Server configuration.
//!
//! Resolution order for every setting: command-line argument, then
//! environment variable, then the default from [`notekeep_core::defaults`].
//!
//! Environment variables:
//!   HOST             - bind address (default: "0.0.0.0")
//!   PORT             - listen port (default: 5000)
//!   DATA_DIR         - data directory (default: "data")
//!   TOKENS_FILE      - token map, relative to DATA_DIR (default: "tokens.json")
//!   CONSOLE_ENABLED  - "true"/"false" run the operator console (default: true)

use std::path::PathBuf;

use clap::Parser;

use notekeep_core::{defaults, Error, Result};

#[derive(Parser, Debug, Default)]
#[command(name = "notekeep")]
#[command(author, version, about = "Personal notes server with an operator console")]
pub struct CliArgs {
    /// Port to listen on (overrides PORT)
    pub port: Option<u16>,

    /// Directory holding tokens and per-user notes (overrides DATA_DIR)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Run without the interactive operator console
    #[arg(long)]
    pub no_console: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Relative to `data_dir`.
    pub tokens_file: String,
    pub console_enabled: bool,
}

impl Config {
    /// Resolve from the process environment.
    pub fn from_env(cli: CliArgs) -> Result<Self> {
        Self::from_lookup(cli, |key| std::env::var(key).ok())
    }

    /// Resolve using `lookup` in place of the environment.
    pub fn from_lookup<F>(cli: CliArgs, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| defaults::HOST.to_string());

        let port = match cli.port {
            Some(port) => port,
            None => match var("PORT") {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    Error::Config(format!("PORT must be a port number, got {raw:?}"))
                })?,
                None => defaults::PORT,
            },
        };

        let data_dir = cli
            .data_dir
            .or_else(|| var("DATA_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(defaults::DATA_DIR));

        let tokens_file = var("TOKENS_FILE").unwrap_or_else(|| defaults::TOKENS_FILE.to_string());

        let console_enabled = if cli.no_console {
            false
        } else {
            match var("CONSOLE_ENABLED") {
                Some(raw) => parse_bool("CONSOLE_ENABLED", &raw)?,
                None => true,
            }
        };

        Ok(Self {
            host,
            port,
            data_dir,
            tokens_file,
            console_enabled,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{key} must be true or false, got {raw:?}"))),
    }
}
