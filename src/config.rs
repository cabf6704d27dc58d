//! Server configuration module
//!
//! Parses and manages server configuration from YAML files.
//! Every optional field has a default function so a minimal file only
//! needs the listen address.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Lowest bcrypt cost the `bcrypt` crate accepts.
pub const MIN_BCRYPT_COST: u32 = 4;

/// Highest bcrypt cost the `bcrypt` crate accepts.
pub const MAX_BCRYPT_COST: u32 = 31;

/// Main server configuration
///
/// This struct is automatically parsed from YAML by serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    // ============================================
    // Listener
    // ============================================
    /// Address the listener binds to
    pub bind_ip: String,

    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// First line written to every new connection
    #[serde(default = "default_banner")]
    pub banner: String,

    // ============================================
    // Database
    // ============================================
    /// SQLite database holding the world graph and credentials
    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    // ============================================
    // World
    // ============================================
    /// Room id every player enters at and recalls to
    #[serde(default = "default_start_room")]
    pub start_room: i64,

    /// Capacity of the coordinator's event queue
    #[serde(default = "default_event_queue")]
    pub event_queue: usize,

    // ============================================
    // Authentication policy
    // ============================================
    /// Wrong passwords allowed before the connection is dropped (0 = unbounded)
    #[serde(default)]
    pub max_auth_attempts: u32,

    /// Seconds allowed for the whole login handshake (0 = no limit)
    #[serde(default)]
    pub auth_timeout_secs: u64,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

// ============================================
// Default value functions
// These are called by serde when a field is missing
// ============================================

fn default_bind_port() -> u16 {
    8080
}

fn default_banner() -> String {
    "Welcome to MUD!".to_string()
}

fn default_database() -> String {
    "world.db".to_string()
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_start_room() -> i64 {
    3001
}

fn default_event_queue() -> usize {
    1024
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl ServerConfig {
    /// Load configuration from a YAML file
    ///
    /// # Example
    /// ```no_run
    /// use warren::config::ServerConfig;
    ///
    /// let config = ServerConfig::from_file("conf/server.yaml")
    ///     .expect("Failed to load config");
    /// println!("Database: {}", config.database);
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ServerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML in {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from a YAML string
    ///
    /// Useful for testing
    pub fn from_str(contents: &str) -> Result<Self> {
        let config: ServerConfig = serde_yaml::from_str(contents)
            .context("Failed to parse YAML")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.bind_ip.is_empty(), "bind_ip cannot be empty");
        anyhow::ensure!(!self.database.is_empty(), "database cannot be empty");
        anyhow::ensure!(self.db_max_connections > 0, "db_max_connections must be at least 1");
        anyhow::ensure!(self.event_queue > 0, "event_queue must be at least 1");

        anyhow::ensure!(
            (MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost),
            "bcrypt_cost out of range: {} (allowed {}..={})",
            self.bcrypt_cost,
            MIN_BCRYPT_COST,
            MAX_BCRYPT_COST
        );

        Ok(())
    }

    /// `host:port` string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_ip, self.bind_port)
    }

    /// Handshake deadline, if one is configured
    pub fn auth_timeout(&self) -> Option<Duration> {
        (self.auth_timeout_secs > 0).then(|| Duration::from_secs(self.auth_timeout_secs))
    }

    /// Wrong-password limit, if one is configured
    pub fn auth_attempt_limit(&self) -> Option<u32> {
        (self.max_auth_attempts > 0).then_some(self.max_auth_attempts)
    }

    /// Save configuration to a YAML file
    ///
    /// Useful for generating config templates
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(&self)
            .context("Failed to serialize config to YAML")?;

        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config to {}", path.as_ref().display()))?;

        Ok(())
    }
}
