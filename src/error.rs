//! Error types for the DigiCam configuration loader.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition that aborts loading a configuration. Each variant
//! names the offending file, and the key when one is involved.

use thiserror::Error;

/// The main error type for configuration loading.
///
/// All loader operations return this error type. None of these errors are
/// recovered locally: they are surfaced to the caller before any analysis
/// starts.
///
/// # Example
///
/// ```
/// use digicam_config::error::ConfigError;
///
/// let error = ConfigError::MissingKey {
///     path: "mpe_mc.yaml".to_string(),
///     key: "scan_level".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Missing required key 'scan_level' in mpe_mc.yaml"
/// );
/// ```
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file or directory was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// The document is not valid YAML, or is not a mapping at its root.
    #[error("Failed to parse configuration file '{path}': {message}")]
    Parse {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A key required by the configuration theme is absent or null.
    #[error("Missing required key '{key}' in {path}")]
    MissingKey {
        /// The path to the offending file.
        path: String,
        /// The missing key.
        key: String,
    },

    /// A value could not be coerced to the type declared for its key.
    #[error("Type mismatch for key '{key}' in {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The path to the offending file.
        path: String,
        /// The key holding the bad value.
        key: String,
        /// The declared type.
        expected: String,
        /// What the document actually contained.
        found: String,
    },

    /// A path template contains an unsupported placeholder.
    #[error("Invalid template for key '{key}' in {path}: {message}")]
    InvalidTemplate {
        /// The path to the offending file.
        path: String,
        /// The key holding the template.
        key: String,
        /// A description of the problem.
        message: String,
    },

    /// A cross-field invariant does not hold.
    #[error("Invariant violated in {path}: {message}")]
    InvariantViolation {
        /// The path to the offending file.
        path: String,
        /// A description of the violated invariant.
        message: String,
    },

    /// No configuration with this name was loaded.
    #[error("Configuration not loaded: {name}")]
    UnknownConfig {
        /// The requested configuration name.
        name: String,
    },
}

/// A type alias for Results that return ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
