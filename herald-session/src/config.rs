/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Session configuration.
//!
//! This module provides configuration options for gateway sessions.

use herald_core::error::SessionError;
use herald_core::payload::ConnectionProperties;
use herald_core::types::Intents;
use herald_protocol::decoder::DEFAULT_MAX_FRAME_SIZE;
use std::fmt;
use std::time::Duration;

/// Default command prefix.
pub const DEFAULT_COMMAND_PREFIX: &str = "go ";

/// Default wait for the server to acknowledge a close frame.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Default wait for in-flight command handlers once the session has closed.
pub const DEFAULT_COMMAND_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Opaque authentication token.
///
/// Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials(String);

impl Credentials {
    /// Wraps a token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if the token is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Returns the value of an `Authorization` header for bot tokens.
    #[must_use]
    pub fn bot_authorization(&self) -> String {
        format!("Bot {}", self.0)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(<redacted>)")
    }
}

/// Configuration for a gateway session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Authentication token sent with Identify.
    pub credentials: Credentials,
    /// Client properties sent with Identify.
    pub properties: ConnectionProperties,
    /// Intents requested with Identify.
    pub intents: Intents,
    /// Message prefixes recognized as commands.
    pub command_prefixes: Vec<String>,
    /// Wait for close acknowledgement before forcing closure.
    pub close_timeout: Duration,
    /// Wait for in-flight command handlers before aborting them.
    pub command_drain_timeout: Duration,
    /// Maximum inbound frame size in bytes.
    pub max_frame_size: usize,
}

impl SessionConfig {
    /// Creates a new session configuration with default options.
    ///
    /// # Arguments
    /// * `credentials` - The authentication token
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            properties: ConnectionProperties::default(),
            intents: Intents::default(),
            command_prefixes: vec![DEFAULT_COMMAND_PREFIX.to_string()],
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
            command_drain_timeout: DEFAULT_COMMAND_DRAIN_TIMEOUT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Sets the connection properties.
    #[must_use]
    pub fn with_properties(mut self, properties: ConnectionProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Sets the intents.
    #[must_use]
    pub const fn with_intents(mut self, intents: Intents) -> Self {
        self.intents = intents;
        self
    }

    /// Replaces the recognized command prefixes.
    #[must_use]
    pub fn with_command_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the close acknowledgement timeout.
    #[must_use]
    pub const fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }

    /// Sets how long in-flight command handlers may run after close.
    #[must_use]
    pub const fn with_command_drain_timeout(mut self, timeout: Duration) -> Self {
        self.command_drain_timeout = timeout;
        self
    }

    /// Sets the maximum inbound frame size.
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` for a blank token, an empty
    /// prefix, or a zero close timeout.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.credentials.is_blank() {
            return Err(SessionError::Configuration("token is required".to_string()));
        }
        if self.command_prefixes.iter().any(String::is_empty) {
            return Err(SessionError::Configuration(
                "command prefixes must not be empty".to_string(),
            ));
        }
        if self.close_timeout.is_zero() {
            return Err(SessionError::Configuration(
                "close timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for session configuration.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    credentials: Option<Credentials>,
    properties: Option<ConnectionProperties>,
    intents: Option<Intents>,
    command_prefixes: Option<Vec<String>>,
    close_timeout: Option<Duration>,
    command_drain_timeout: Option<Duration>,
}

impl SessionConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the token.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(token));
        self
    }

    /// Sets the connection properties.
    #[must_use]
    pub fn properties(mut self, properties: ConnectionProperties) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Sets the intents.
    #[must_use]
    pub const fn intents(mut self, intents: Intents) -> Self {
        self.intents = Some(intents);
        self
    }

    /// Adds a recognized command prefix.
    #[must_use]
    pub fn command_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.command_prefixes
            .get_or_insert_with(Vec::new)
            .push(prefix.into());
        self
    }

    /// Sets the close acknowledgement timeout.
    #[must_use]
    pub const fn close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = Some(timeout);
        self
    }

    /// Sets how long in-flight command handlers may run after close.
    #[must_use]
    pub const fn command_drain_timeout(mut self, timeout: Duration) -> Self {
        self.command_drain_timeout = Some(timeout);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` if the token is missing or the
    /// resulting configuration is invalid.
    pub fn build(self) -> Result<SessionConfig, SessionError> {
        let credentials = self
            .credentials
            .ok_or_else(|| SessionError::Configuration("token is required".to_string()))?;

        let mut config = SessionConfig::new(credentials);
        if let Some(properties) = self.properties {
            config.properties = properties;
        }
        if let Some(intents) = self.intents {
            config.intents = intents;
        }
        if let Some(prefixes) = self.command_prefixes {
            config.command_prefixes = prefixes;
        }
        if let Some(timeout) = self.close_timeout {
            config.close_timeout = timeout;
        }
        if let Some(timeout) = self.command_drain_timeout {
            config.command_drain_timeout = timeout;
        }

        config.validate()?;
        Ok(config)
    }
}
