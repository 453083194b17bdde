//! Configuration types for calibration analyses.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files once the schema has
//! checked and coerced the raw document.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_yaml::Number;

use crate::models::{AdcAxis, EventWindow, PixelSelection, ScanPoint};

/// Suffix shared by every output histogram filename key.
pub const HISTO_FILENAME_SUFFIX: &str = "_histo_filename";

/// The primary output histogram filename key.
pub const HISTO_FILENAME_KEY: &str = "histo_filename";

/// The family of analysis a configuration file drives.
///
/// The theme decides which keys are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigTheme {
    /// Multi photo-electron spectrum fitting.
    Mpe,
    /// Trigger rate scan over night sky background levels.
    Trigger,
    /// Any other analysis; only the common keys are required.
    Generic,
}

impl ConfigTheme {
    /// Infers the theme from an analysis module name.
    ///
    /// Registered modules use their registered theme. Other names fall back
    /// to a substring match on `trigger` and `mpe`.
    pub fn infer(analysis_module: &str) -> Self {
        if let Some(module) = crate::analysis::find_module(analysis_module) {
            return module.theme;
        }
        let name = analysis_module.to_ascii_lowercase();
        if name.contains("trigger") {
            ConfigTheme::Trigger
        } else if name.contains("mpe") {
            ConfigTheme::Mpe
        } else {
            ConfigTheme::Generic
        }
    }

    /// Returns the snake_case name of the theme.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigTheme::Mpe => "mpe",
            ConfigTheme::Trigger => "trigger",
            ConfigTheme::Generic => "generic",
        }
    }
}

impl fmt::Display for ConfigTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calibration analysis configuration.
///
/// Optional keys stay `None` when absent so that serializing the structure
/// reproduces the keys of the original document. Use the accessor methods
/// to read toggles and other values with their defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Name of the analysis routine to invoke.
    pub analysis_module: String,

    /// Verbose logging toggle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    /// Whether the inputs are Monte Carlo rather than camera data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mc: Option<bool>,
    /// Run the histogram creation step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_histo: Option<bool>,
    /// Run the analysis step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perform_analysis: Option<bool>,
    /// Run the display step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_results: Option<bool>,
    /// Hide results while the analysis is tuned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blinding: Option<bool>,

    /// Prefix for log file names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_basename: Option<String>,

    /// Input file name template.
    pub file_basename: String,
    /// Directory holding the input files.
    pub directory: String,
    /// Directory of the camera test setup files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cts_directory: Option<String>,
    /// Directory receiving output artifacts.
    pub output_directory: String,

    /// Run or seed identifiers substituted into `file_basename`.
    pub file_list: Vec<i64>,
    /// Ordered scan points.
    pub scan_level: Vec<i64>,
    /// Night sky background rates aligned with `scan_level`.
    ///
    /// Kept as written (integer or float) so the document serializes back
    /// unchanged; the `nsb_rate()` accessor reads them as floats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nsb_rate: Option<Vec<Number>>,
    /// Trigger thresholds of the sweep, in ADC counts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Vec<Number>>,

    /// Events recorded per scan level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_per_level: Option<u64>,
    /// Events read per fill batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_evt_per_batch: Option<u64>,
    /// Event number processing stops at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evt_max: Option<u64>,
    /// First event processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evt_min: Option<u64>,
    /// Integration window width, in samples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_width: Option<u64>,
    /// Baseline estimation window width, in samples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_window_width: Option<u64>,
    /// Trigger cluster size, in patches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_size: Option<u64>,
    /// Compression factor applied to patch sums.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_factor: Option<u64>,
    /// Clipping value for patch sums.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipping_patch: Option<u64>,
    /// Number of camera pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_pixels: Option<u32>,

    /// Primary output histogram filename.
    pub histo_filename: String,

    /// Lowest ADC bin center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adcs_min: Option<i64>,
    /// Highest ADC bin center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adcs_max: Option<i64>,
    /// ADC bin width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adcs_binwidth: Option<u64>,

    /// Pixels the analysis runs on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_list: Option<PixelSelection>,

    /// Keys not listed above, including `*_histo_filename` siblings.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl AnalysisConfig {
    /// Verbose logging, false by default.
    pub fn is_verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }

    /// Monte Carlo input, false by default.
    pub fn is_mc(&self) -> bool {
        self.mc.unwrap_or(false)
    }

    /// Histogram creation step, false by default.
    pub fn creates_histo(&self) -> bool {
        self.create_histo.unwrap_or(false)
    }

    /// Analysis step, false by default.
    pub fn performs_analysis(&self) -> bool {
        self.perform_analysis.unwrap_or(false)
    }

    /// Display step, false by default.
    pub fn displays_results(&self) -> bool {
        self.display_results.unwrap_or(false)
    }

    /// Blinding, false by default.
    pub fn is_blinded(&self) -> bool {
        self.blinding.unwrap_or(false)
    }

    /// First event processed, 0 by default.
    pub fn evt_min(&self) -> u64 {
        self.evt_min.unwrap_or(0)
    }

    /// Pixel selection, every pixel by default.
    pub fn pixel_list(&self) -> PixelSelection {
        self.pixel_list.clone().unwrap_or_default()
    }

    /// Night sky background rates, empty when not configured.
    pub fn nsb_rate(&self) -> Vec<f64> {
        as_floats(self.nsb_rate.as_deref())
    }

    /// Trigger thresholds, empty when not configured.
    pub fn threshold(&self) -> Vec<f64> {
        as_floats(self.threshold.as_deref())
    }

    /// The event window, when `evt_max` is configured.
    pub fn event_window(&self) -> Option<EventWindow> {
        self.evt_max.map(|max| EventWindow {
            min: self.evt_min(),
            max,
        })
    }

    /// The ADC histogram axis, when all three axis keys are configured and
    /// describe a non-empty axis.
    pub fn adc_axis(&self) -> Option<AdcAxis> {
        AdcAxis::new(self.adcs_min?, self.adcs_max?, self.adcs_binwidth?)
    }

    /// Output histogram filenames keyed by their configuration key:
    /// `histo_filename` plus every string-valued `*_histo_filename` key.
    pub fn histo_filenames(&self) -> BTreeMap<&str, &str> {
        let mut names = BTreeMap::new();
        names.insert(HISTO_FILENAME_KEY, self.histo_filename.as_str());
        for (key, value) in &self.extra {
            if key.ends_with(HISTO_FILENAME_SUFFIX) {
                if let Some(name) = value.as_str() {
                    names.insert(key.as_str(), name);
                }
            }
        }
        names
    }

    /// Returns true when `nsb_rate` can be zipped with `scan_level`: either
    /// it is empty or it has one entry per scan level.
    pub fn nsb_aligned(&self) -> bool {
        let nsb = self.nsb_rate.as_deref().unwrap_or(&[]);
        nsb.is_empty() || nsb.len() == self.scan_level.len()
    }

    /// Zips `scan_level` with `nsb_rate` and the per-level event ranges.
    ///
    /// Returns `None` when a non-empty `nsb_rate` does not have exactly one
    /// entry per scan level, or when an event range overflows `u64`.
    pub fn scan_points(&self) -> Option<Vec<ScanPoint>> {
        if !self.nsb_aligned() {
            return None;
        }
        let nsb = self.nsb_rate();
        self.scan_level
            .iter()
            .enumerate()
            .map(|(index, &level)| {
                ScanPoint::new(
                    index,
                    level,
                    nsb.get(index).copied(),
                    self.events_per_level,
                )
            })
            .collect()
    }
}

fn as_floats(numbers: Option<&[Number]>) -> Vec<f64> {
    numbers
        .unwrap_or(&[])
        .iter()
        .filter_map(Number::as_f64)
        .collect()
}

/// A configuration together with where it came from.
///
/// This is the immutable object handed to the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedConfig {
    name: String,
    path: String,
    theme: ConfigTheme,
    config: AnalysisConfig,
}

impl LoadedConfig {
    /// Creates a loaded configuration.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        theme: ConfigTheme,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            theme,
            config,
        }
    }

    /// Name of the configuration, the file stem for files on disk.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path (or source label) the configuration was read from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Theme the configuration was validated against.
    pub fn theme(&self) -> ConfigTheme {
        self.theme
    }

    /// The validated configuration values.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }
}
