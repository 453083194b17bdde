//! Cross-field consistency checks.
//!
//! The schema only checks that each key holds a value of the right type.
//! This module checks relationships between keys that a file can violate
//! while still being well typed, and reports them as findings.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigTheme, LoadedConfig};
use crate::models::{PathTemplate, PixelSelection};

use super::modules::find_module;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Noteworthy, never a problem.
    Info,
    /// Probably a mistake, the analysis can still run.
    Warning,
    /// The analysis would read or produce wrong data.
    Error,
}

/// A single consistency finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// A code identifying the kind of finding.
    pub code: String,
    /// A human-readable description.
    pub message: String,
    /// How serious the finding is.
    pub severity: Severity,
    /// The key the finding is about, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl Finding {
    fn new(code: &str, severity: Severity, key: Option<&str>, message: String) -> Self {
        Self {
            code: code.to_string(),
            message,
            severity,
            key: key.map(str::to_string),
        }
    }
}

/// The findings for one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Name of the checked configuration.
    pub config: String,
    /// Theme the configuration was validated against.
    pub theme: ConfigTheme,
    /// All findings, in check order.
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    /// Returns true when no finding has error severity.
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Error-severity findings.
    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
    }

    /// Warning-severity findings.
    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }

    /// Returns true when a finding with this code was reported.
    pub fn has(&self, code: &str) -> bool {
        self.findings.iter().any(|f| f.code == code)
    }
}

/// Checks the cross-field invariants of a configuration.
///
/// # Example
///
/// ```no_run
/// use digicam_config::analysis::check_consistency;
/// use digicam_config::config::ConfigLoader;
///
/// let loaded = ConfigLoader::load_file("./config/samples/mpe_mc.yaml").unwrap();
/// let report = check_consistency(&loaded);
/// assert!(report.is_valid());
/// ```
pub fn check_consistency(loaded: &LoadedConfig) -> ValidationReport {
    let config = loaded.config();
    let mut findings = Vec::new();

    if let (Some(per_level), Some(evt_max)) = (config.events_per_level, config.evt_max) {
        let levels = config.scan_level.len() as u64;
        let expected = per_level.checked_mul(levels);
        if expected != Some(evt_max) {
            findings.push(Finding::new(
                "EVT_MAX_MISMATCH",
                Severity::Error,
                Some("evt_max"),
                format!(
                    "evt_max is {} but events_per_level ({}) x len(scan_level) ({}) is {}",
                    evt_max,
                    per_level,
                    levels,
                    expected.map_or_else(|| "out of range".to_string(), |e| e.to_string())
                ),
            ));
        }
    }

    if !config.nsb_aligned() {
        findings.push(Finding::new(
            "NSB_LENGTH_MISMATCH",
            Severity::Warning,
            Some("nsb_rate"),
            format!(
                "nsb_rate has {} entries but scan_level has {}",
                config.nsb_rate().len(),
                config.scan_level.len()
            ),
        ));
    }

    if let Some(window) = config.event_window() {
        if window.min > window.max {
            findings.push(Finding::new(
                "EVENT_RANGE_INVERTED",
                Severity::Error,
                Some("evt_min"),
                format!(
                    "evt_min ({}) is greater than evt_max ({})",
                    window.min, window.max
                ),
            ));
        }
    }

    if let (Some(min), Some(max), Some(width)) =
        (config.adcs_min, config.adcs_max, config.adcs_binwidth)
    {
        if config.adc_axis().is_none() {
            findings.push(Finding::new(
                "ADC_AXIS_INVALID",
                Severity::Error,
                Some("adcs_binwidth"),
                format!(
                    "ADC axis needs adcs_min < adcs_max and a positive bin width, got min {} max {} width {}",
                    min, max, width
                ),
            ));
        }
    }

    if config.n_evt_per_batch == Some(0) {
        findings.push(Finding::new(
            "BATCH_SIZE_ZERO",
            Severity::Error,
            Some("n_evt_per_batch"),
            "n_evt_per_batch must be positive".to_string(),
        ));
    }

    if !strictly_increasing(&config.scan_level) {
        findings.push(Finding::new(
            "SCAN_LEVEL_UNORDERED",
            Severity::Warning,
            Some("scan_level"),
            "scan_level is not strictly increasing".to_string(),
        ));
    }

    if !strictly_increasing(&config.threshold()) {
        findings.push(Finding::new(
            "THRESHOLD_UNORDERED",
            Severity::Warning,
            Some("threshold"),
            "threshold is not strictly increasing".to_string(),
        ));
    }

    if let PixelSelection::List(ids) = config.pixel_list() {
        if let Some(n_pixels) = config.n_pixels {
            if let Some(bad) = ids.iter().find(|&&id| id >= n_pixels) {
                findings.push(Finding::new(
                    "PIXEL_OUT_OF_RANGE",
                    Severity::Error,
                    Some("pixel_list"),
                    format!("pixel {} is outside a camera of {} pixels", bad, n_pixels),
                ));
            }
        }
        let mut seen = HashSet::new();
        if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
            findings.push(Finding::new(
                "PIXEL_DUPLICATE",
                Severity::Warning,
                Some("pixel_list"),
                format!("pixel {} is listed more than once", dup),
            ));
        }
    }

    if config.file_list.is_empty() {
        findings.push(Finding::new(
            "EMPTY_FILE_LIST",
            Severity::Warning,
            Some("file_list"),
            "file_list is empty, no input file will be read".to_string(),
        ));
    }

    if let Ok(template) = PathTemplate::parse(&config.file_basename) {
        if !template.has_placeholder() && config.file_list.len() > 1 {
            findings.push(Finding::new(
                "TEMPLATE_NOT_PARAMETERISED",
                Severity::Error,
                Some("file_basename"),
                format!(
                    "file_basename '{}' has no placeholder but file_list has {} entries",
                    template, config.file_list.len()
                ),
            ));
        }
    }

    if find_module(&config.analysis_module).is_none() {
        findings.push(Finding::new(
            "UNKNOWN_MODULE",
            Severity::Info,
            Some("analysis_module"),
            format!("analysis module '{}' is not registered", config.analysis_module),
        ));
    }

    if !(config.creates_histo() || config.performs_analysis() || config.displays_results()) {
        findings.push(Finding::new(
            "NO_STEPS_ENABLED",
            Severity::Info,
            None,
            "create_histo, perform_analysis and display_results are all disabled".to_string(),
        ));
    }

    ValidationReport {
        config: loaded.name().to_string(),
        theme: loaded.theme(),
        findings,
    }
}

fn strictly_increasing<T: PartialOrd>(values: &[T]) -> bool {
    values.windows(2).all(|pair| pair[0] < pair[1])
}
