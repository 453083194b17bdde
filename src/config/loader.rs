//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading calibration
//! analysis configurations from YAML files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, info, warn};

use crate::analysis::{Severity, check_consistency};
use crate::error::{ConfigError, ConfigResult};
use crate::models::PathTemplate;

use super::schema;
use super::types::{AnalysisConfig, ConfigTheme, LoadedConfig};

/// Options controlling how a configuration is validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Validate against this theme instead of inferring it from
    /// `analysis_module`.
    pub theme: Option<ConfigTheme>,
    /// Reject configurations whose consistency report contains errors.
    pub strict: bool,
}

impl LoadOptions {
    /// Options that reject inconsistent configurations.
    pub fn strict() -> Self {
        Self {
            theme: None,
            strict: true,
        }
    }

    /// Forces the theme used for required-key checks.
    pub fn with_theme(mut self, theme: ConfigTheme) -> Self {
        self.theme = Some(theme);
        self
    }
}

/// Loads and provides access to analysis configurations.
///
/// Single files are loaded with [`ConfigLoader::load_file`]. A directory of
/// configuration files is loaded into a catalog keyed by file stem with
/// [`ConfigLoader::load_dir`].
///
/// # Directory Structure
///
/// ```text
/// config/samples/
/// ├── mpe_mc.yaml        # MPE fit on Monte Carlo
/// └── trigger_full.yaml  # Trigger rate scan
/// ```
///
/// # Example
///
/// ```no_run
/// use digicam_config::config::ConfigLoader;
///
/// let catalog = ConfigLoader::load_dir("./config/samples").unwrap();
///
/// let mpe = catalog.get("mpe_mc").unwrap();
/// println!("{} scan levels", mpe.config().scan_level.len());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    directory: String,
    configs: BTreeMap<String, LoadedConfig>,
}

impl ConfigLoader {
    /// Loads a single configuration file, inferring its theme.
    ///
    /// # Returns
    ///
    /// Returns the validated configuration, or an error if:
    /// - The file cannot be read (`ConfigNotFound`)
    /// - The file is not a valid YAML mapping (`Parse`)
    /// - A required key is missing (`MissingKey`)
    /// - A value has the wrong type (`TypeMismatch`)
    /// - `file_basename` is not a valid template (`InvalidTemplate`)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use digicam_config::config::ConfigLoader;
    ///
    /// let loaded = ConfigLoader::load_file("./config/samples/mpe_mc.yaml")?;
    /// assert!(loaded.config().is_mc());
    /// # Ok::<(), digicam_config::error::ConfigError>(())
    /// ```
    pub fn load_file<P: AsRef<Path>>(path: P) -> ConfigResult<LoadedConfig> {
        Self::load_file_with(path, LoadOptions::default())
    }

    /// Loads a single configuration file with explicit options.
    pub fn load_file_with<P: AsRef<Path>>(
        path: P,
        options: LoadOptions,
    ) -> ConfigResult<LoadedConfig> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| ConfigError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path_str.clone());

        debug!(path = %path_str, "Read configuration file");
        Self::parse_str(&name, &path_str, &content, options)
    }

    /// Parses and validates a YAML document.
    ///
    /// `name` identifies the configuration and `path` labels it in error
    /// messages.
    ///
    /// # Example
    ///
    /// ```
    /// use digicam_config::config::{ConfigLoader, LoadOptions};
    ///
    /// let yaml = r#"
    /// analysis_module: analyse_synchro
    /// file_basename: 'run_%d.fits.fz'
    /// directory: '/data/'
    /// output_directory: '/data/out/'
    /// file_list: [1]
    /// scan_level: [0]
    /// histo_filename: 'peaks.npz'
    /// "#;
    /// let loaded = ConfigLoader::parse_str("synchro", "<inline>", yaml, LoadOptions::default())?;
    /// assert!(!loaded.config().is_mc());
    /// # Ok::<(), digicam_config::error::ConfigError>(())
    /// ```
    pub fn parse_str(
        name: &str,
        path: &str,
        source: &str,
        options: LoadOptions,
    ) -> ConfigResult<LoadedConfig> {
        let document: Value = serde_yaml::from_str(source).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let mapping = schema::into_mapping(path, document)?;

        let theme = match options.theme {
            Some(theme) => theme,
            None => ConfigTheme::infer(schema::analysis_module(path, &mapping)?),
        };
        debug!(path = %path, theme = %theme, "Validating configuration");

        let mapping = schema::check_document(path, mapping, theme)?;
        let config: AnalysisConfig =
            serde_yaml::from_value(Value::Mapping(mapping)).map_err(|e| ConfigError::Parse {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        PathTemplate::parse(&config.file_basename).map_err(|e| ConfigError::InvalidTemplate {
            path: path.to_string(),
            key: "file_basename".to_string(),
            message: e.to_string(),
        })?;

        let loaded = LoadedConfig::new(name, path, theme, config);
        let report = check_consistency(&loaded);
        for finding in report.findings.iter().filter(|f| f.severity >= Severity::Warning) {
            warn!(
                path = %path,
                code = %finding.code,
                severity = ?finding.severity,
                "{}",
                finding.message
            );
        }

        if options.strict && !report.is_valid() {
            let message = report
                .errors()
                .map(|f| f.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ConfigError::InvariantViolation {
                path: path.to_string(),
                message,
            });
        }

        info!(
            name = %name,
            theme = %theme,
            analysis_module = %loaded.config().analysis_module,
            "Loaded configuration"
        );
        Ok(loaded)
    }

    /// Loads every `*.yaml` and `*.yml` file of a directory.
    ///
    /// Fails on the first invalid file, or if the directory does not exist
    /// or holds no configuration file.
    pub fn load_dir<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        Self::load_dir_with(path, LoadOptions::default())
    }

    /// Loads every configuration file of a directory with explicit options.
    pub fn load_dir_with<P: AsRef<Path>>(path: P, options: LoadOptions) -> ConfigResult<Self> {
        let dir = path.as_ref();
        let dir_str = dir.display().to_string();

        if !dir.is_dir() {
            return Err(ConfigError::ConfigNotFound { path: dir_str });
        }

        let entries = fs::read_dir(dir).map_err(|_| ConfigError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| ConfigError::ConfigNotFound {
                path: dir_str.clone(),
            })?;
            let file = entry.path();
            if file.is_file()
                && file
                    .extension()
                    .is_some_and(|ext| ext == "yaml" || ext == "yml")
            {
                files.push(file);
            }
        }
        files.sort();

        let mut configs = BTreeMap::new();
        for file in &files {
            let loaded = Self::load_file_with(file, options)?;
            if configs.contains_key(loaded.name()) {
                warn!(
                    path = %file.display(),
                    name = %loaded.name(),
                    "Skipping configuration with duplicate name"
                );
                continue;
            }
            configs.insert(loaded.name().to_string(), loaded);
        }

        if configs.is_empty() {
            return Err(ConfigError::ConfigNotFound {
                path: format!("{} (no configuration files found)", dir_str),
            });
        }

        info!(directory = %dir_str, count = configs.len(), "Loaded configuration directory");
        Ok(Self {
            directory: dir_str,
            configs,
        })
    }

    /// The directory the catalog was loaded from.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Gets a configuration by name.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use digicam_config::config::ConfigLoader;
    ///
    /// let catalog = ConfigLoader::load_dir("./config/samples")?;
    /// let trigger = catalog.get("trigger_full")?;
    /// println!("{} NSB levels", trigger.config().nsb_rate().len());
    /// # Ok::<(), digicam_config::error::ConfigError>(())
    /// ```
    pub fn get(&self, name: &str) -> ConfigResult<&LoadedConfig> {
        self.configs
            .get(name)
            .ok_or_else(|| ConfigError::UnknownConfig {
                name: name.to_string(),
            })
    }

    /// All loaded configurations, ordered by name.
    pub fn configs(&self) -> impl Iterator<Item = &LoadedConfig> {
        self.configs.values()
    }

    /// Number of loaded configurations.
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Returns true when no configuration is loaded.
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
