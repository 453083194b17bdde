//! Configuration loading for DigiCam calibration analyses.
//!
//! This module loads analysis configurations from YAML files: it checks the
//! keys required by the configuration theme, coerces values to their
//! declared types, applies defaults, and returns an immutable
//! [`LoadedConfig`].
//!
//! # Example
//!
//! ```no_run
//! use digicam_config::config::ConfigLoader;
//!
//! let loaded = ConfigLoader::load_file("./config/samples/trigger_full.yaml").unwrap();
//! println!("Analysis module: {}", loaded.config().analysis_module);
//! ```

mod loader;
pub mod schema;
mod types;

pub use loader::{ConfigLoader, LoadOptions};
pub use types::{
    AnalysisConfig, ConfigTheme, HISTO_FILENAME_KEY, HISTO_FILENAME_SUFFIX, LoadedConfig,
};
