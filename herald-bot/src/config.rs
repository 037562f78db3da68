/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Bot configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `HERALD_*` environment variables, then command-line flags. The token has
//! no default and must come from the file or the environment.

use anyhow::{Context, Result, bail};
use clap::Parser;
use herald::core::{Intents, SessionError};
use herald::engine::{DEFAULT_API_BASE, DEFAULT_REPLY};
use herald::session::{SessionConfig, SessionConfigBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the bot token.
pub const ENV_TOKEN: &str = "HERALD_TOKEN";
/// Environment variable overriding the REST API base URL.
pub const ENV_API_BASE: &str = "HERALD_API_BASE";
/// Environment variable overriding the command prefix.
pub const ENV_PREFIX: &str = "HERALD_PREFIX";
/// Environment variable overriding the reply text.
pub const ENV_REPLY: &str = "HERALD_REPLY";

/// Command-line flags.
#[derive(Parser, Debug)]
#[command(name = "herald-bot", version, about = "Gateway bot that answers prefixed commands")]
pub struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, env = "HERALD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Gateway endpoint override, `host[:port]` or a full ws:// URL.
    #[arg(long)]
    pub addr: Option<String>,
}

/// Resolved bot configuration.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Bot token.
    pub token: String,
    /// REST API base URL.
    pub api_base: String,
    /// Gateway protocol version.
    pub gateway_version: u8,
    /// Gateway address override.
    pub address: Option<String>,
    /// Command prefixes.
    pub prefixes: Vec<String>,
    /// Reply text posted for each command.
    pub reply: String,
    /// Intents bitfield.
    pub intents: Option<u64>,
    /// Close acknowledgement timeout in milliseconds.
    pub close_timeout_ms: u64,
    /// Grace period for in-flight replies at shutdown, in milliseconds.
    pub command_drain_timeout_ms: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            gateway_version: 10,
            address: None,
            prefixes: vec!["go ".to_string()],
            reply: DEFAULT_REPLY.to_string(),
            intents: None,
            close_timeout_ms: 1000,
            command_drain_timeout_ms: 5000,
        }
    }
}

impl BotConfig {
    /// Loads the configuration from every layer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if no token
    /// is configured.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        if let Some(addr) = &cli.addr {
            config.address = Some(addr.clone());
        }

        if config.token.trim().is_empty() {
            bail!("no token configured; set {ENV_TOKEN} or `token` in the config file");
        }
        Ok(config)
    }

    /// Reads a TOML configuration file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parses a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns `toml::de::Error` for malformed input.
    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Applies `HERALD_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(ENV_TOKEN) {
            self.token = token;
        }
        if let Some(api_base) = lookup(ENV_API_BASE) {
            self.api_base = api_base;
        }
        if let Some(prefix) = lookup(ENV_PREFIX) {
            self.prefixes = vec![prefix];
        }
        if let Some(reply) = lookup(ENV_REPLY) {
            self.reply = reply;
        }
    }

    /// Builds the session configuration.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` if the values are invalid.
    pub fn session_config(&self) -> Result<SessionConfig, SessionError> {
        let mut builder = SessionConfigBuilder::new()
            .token(self.token.trim())
            .close_timeout(Duration::from_millis(self.close_timeout_ms))
            .command_drain_timeout(Duration::from_millis(self.command_drain_timeout_ms));
        for prefix in &self.prefixes {
            builder = builder.command_prefix(prefix.clone());
        }
        if let Some(bits) = self.intents {
            builder = builder.intents(Intents::from_bits(bits));
        }
        builder.build()
    }
}
