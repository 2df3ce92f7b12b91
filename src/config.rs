//! Configuration file management for the exporter.
//!
//! This module handles loading and validating the YAML configuration file.
//! The configuration is read once at startup and is immutable afterward.
//!
//! # Example Configuration File
//!
//! ```yaml
//! port: 2112
//! products:
//!   - ubuntu:
//!       host: localhost
//!       version: "22.04"
//!   - nodejs:
//!       host: localhost
//!       version: "16"
//! ```
//!
//! Each `products` entry is a single-key mapping: the key is the product
//! identifier used by the endoflife.date API, the value describes where that
//! product runs. Sequence order is the order products are registered in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Main configuration structure for the exporter.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Port the `/metrics` endpoint listens on; required and nonzero
    pub port: u16,
    /// Products to fetch EOL data for, in registration order
    #[serde(default)]
    pub products: Vec<BTreeMap<String, Product>>,
}

/// Deployment details recorded as metric labels for one product.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Product {
    /// Host the product runs on
    pub host: String,
    /// Deployed version of the product
    pub version: String,
}

impl Config {
    /// Loads and validates configuration from a YAML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully parsed and validated configuration
    /// * `Err(ConfigError::Io)` - File could not be read
    /// * `Err(ConfigError::Parse)` - File contains invalid YAML
    /// * `Err(ConfigError::Validation)` - Port is zero or no products listed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Validation(
                "port must be specified and nonzero".to_string(),
            ));
        }
        if self.products.is_empty() {
            return Err(ConfigError::Validation(
                "at least one product must be specified".to_string(),
            ));
        }
        Ok(())
    }

    /// Generates an example configuration file in YAML format.
    ///
    /// Printed as guidance when the configuration file is missing; also
    /// useful for bootstrapping a new deployment.
    pub fn example_yaml() -> String {
        let mut ubuntu = BTreeMap::new();
        ubuntu.insert(
            "ubuntu".to_string(),
            Product {
                host: "localhost".to_string(),
                version: "22.04".to_string(),
            },
        );
        let mut nodejs = BTreeMap::new();
        nodejs.insert(
            "nodejs".to_string(),
            Product {
                host: "localhost".to_string(),
                version: "16".to_string(),
            },
        );

        let example = Config {
            port: 2112,
            products: vec![ubuntu, nodejs],
        };

        serde_yaml::to_string(&example)
            .unwrap_or_else(|_| "# Error generating example".to_string())
    }
}

/// Errors that can occur during configuration loading and parsing.
///
/// All of these are fatal: the process terminates before any network
/// activity happens.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error (file not found, permission denied, etc.)
    Io(String),
    /// YAML parsing error (invalid syntax, type mismatch, etc.)
    Parse(String),
    /// Validation error (missing port, empty product list, etc.)
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO Error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse Error: {}", msg),
            ConfigError::Validation(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
