//! Run plan: what a configuration asks the pipeline to read and write.
//!
//! The plan resolves path templates and defaults into the concrete inputs,
//! outputs and steps of one pipeline run, without performing any of them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ConfigTheme, LoadedConfig};
use crate::error::{ConfigError, ConfigResult};
use crate::models::{AdcAxis, EventWindow, PathTemplate, PixelSelection, ScanPoint};

/// Where the events of a run come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Camera data files.
    Camera,
    /// Monte Carlo simulation files.
    MonteCarlo,
}

/// A step of the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    /// Fill and save the histograms.
    CreateHisto,
    /// Fit or otherwise analyse the saved histograms.
    PerformAnalysis,
    /// Show the analysis results.
    DisplayResults,
}

impl PipelineStep {
    /// All steps, in execution order.
    pub const ALL: [PipelineStep; 3] = [
        PipelineStep::CreateHisto,
        PipelineStep::PerformAnalysis,
        PipelineStep::DisplayResults,
    ];

    /// The toggle key enabling this step.
    pub fn toggle_key(&self) -> &'static str {
        match self {
            PipelineStep::CreateHisto => "create_histo",
            PipelineStep::PerformAnalysis => "perform_analysis",
            PipelineStep::DisplayResults => "display_results",
        }
    }
}

/// Resolved inputs, outputs and steps of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunPlan {
    /// Name of the configuration the plan was built from.
    pub config: String,
    /// The analysis routine to invoke.
    pub analysis_module: String,
    /// Theme of the configuration.
    pub theme: ConfigTheme,
    /// Where the events come from.
    pub data_source: DataSource,
    /// Verbose logging.
    pub verbose: bool,
    /// Whether results are blinded.
    pub blinded: bool,
    /// Enabled steps, in execution order.
    pub steps: Vec<PipelineStep>,
    /// Input files, one per `file_list` entry.
    pub input_files: Vec<PathBuf>,
    /// Output histogram files keyed by their configuration key.
    pub artifacts: BTreeMap<String, PathBuf>,
    /// Log file, when `log_file_basename` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// The event window, when `evt_max` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_window: Option<EventWindow>,
    /// Number of fill batches, when the window and batch size are set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batches: Option<u64>,
    /// Pixel ids, when they can be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixels: Option<Vec<u32>>,
    /// ADC histogram axis, when configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adc_axis: Option<AdcAxis>,
    /// The parameter sweep.
    pub scan_points: Vec<ScanPoint>,
}

impl RunPlan {
    /// Builds the plan for a loaded configuration.
    ///
    /// Fails with `InvalidTemplate` when `file_basename` cannot be parsed,
    /// and with `InvariantViolation` when `nsb_rate` cannot be aligned with
    /// `scan_level`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use digicam_config::analysis::RunPlan;
    /// use digicam_config::config::ConfigLoader;
    ///
    /// let loaded = ConfigLoader::load_file("./config/samples/trigger_full.yaml")?;
    /// let plan = RunPlan::build(&loaded)?;
    /// for file in &plan.input_files {
    ///     println!("{}", file.display());
    /// }
    /// # Ok::<(), digicam_config::error::ConfigError>(())
    /// ```
    pub fn build(loaded: &LoadedConfig) -> ConfigResult<Self> {
        let config = loaded.config();

        let template =
            PathTemplate::parse(&config.file_basename).map_err(|e| ConfigError::InvalidTemplate {
                path: loaded.path().to_string(),
                key: "file_basename".to_string(),
                message: e.to_string(),
            })?;

        let scan_points = config.scan_points().ok_or_else(|| {
            let message = if config.nsb_aligned() {
                format!(
                    "events_per_level ({}) x len(scan_level) ({}) does not fit in an event number",
                    config.events_per_level.unwrap_or(0),
                    config.scan_level.len()
                )
            } else {
                format!(
                    "nsb_rate has {} entries but scan_level has {}",
                    config.nsb_rate().len(),
                    config.scan_level.len()
                )
            };
            ConfigError::InvariantViolation {
                path: loaded.path().to_string(),
                message,
            }
        })?;

        let input_dir = Path::new(&config.directory);
        let input_files = config
            .file_list
            .iter()
            .map(|&id| input_dir.join(template.expand(id)))
            .collect();

        let output_dir = Path::new(&config.output_directory);
        let artifacts = config
            .histo_filenames()
            .into_iter()
            .map(|(key, name)| (key.to_string(), output_dir.join(name)))
            .collect();
        let log_file = config
            .log_file_basename
            .as_ref()
            .map(|base| output_dir.join(format!("{}.log", base)));

        let steps = PipelineStep::ALL
            .into_iter()
            .filter(|step| match step {
                PipelineStep::CreateHisto => config.creates_histo(),
                PipelineStep::PerformAnalysis => config.performs_analysis(),
                PipelineStep::DisplayResults => config.displays_results(),
            })
            .collect();

        let event_window = config.event_window();
        let batches = match (event_window, config.n_evt_per_batch) {
            (Some(window), Some(size)) => window.batches(size),
            _ => None,
        };

        let pixels = match config.pixel_list() {
            PixelSelection::List(ids) => Some(ids),
            all => config.n_pixels.map(|n| all.resolve(n)),
        };

        let data_source = if config.is_mc() {
            DataSource::MonteCarlo
        } else {
            DataSource::Camera
        };

        debug!(
            config = %loaded.name(),
            data_source = ?data_source,
            inputs = config.file_list.len(),
            "Built run plan"
        );

        Ok(Self {
            config: loaded.name().to_string(),
            analysis_module: config.analysis_module.clone(),
            theme: loaded.theme(),
            data_source,
            verbose: config.is_verbose(),
            blinded: config.is_blinded(),
            steps,
            input_files,
            artifacts,
            log_file,
            event_window,
            batches,
            pixels,
            adc_axis: config.adc_axis(),
            scan_points,
        })
    }
}
