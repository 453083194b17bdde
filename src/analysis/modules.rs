//! Registry of the analysis routines configurations may name.

use crate::config::ConfigTheme;

/// An analysis routine of the calibration pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisModule {
    /// The value of `analysis_module` selecting this routine.
    pub name: &'static str,
    /// The configuration theme the routine consumes.
    pub theme: ConfigTheme,
    /// What the routine does.
    pub description: &'static str,
}

/// Every registered analysis routine.
pub const MODULES: &[AnalysisModule] = &[
    AnalysisModule {
        name: "analyse_mpe",
        theme: ConfigTheme::Mpe,
        description: "Multi photo-electron spectrum fit (gain, crosstalk, baseline)",
    },
    AnalysisModule {
        name: "analyse_trigger_efficiency",
        theme: ConfigTheme::Trigger,
        description: "Trigger rate versus threshold for each NSB level",
    },
    AnalysisModule {
        name: "analyse_trigger_time",
        theme: ConfigTheme::Trigger,
        description: "Exponential fit of trigger time intervals",
    },
    AnalysisModule {
        name: "analyse_synchro",
        theme: ConfigTheme::Generic,
        description: "Position of the signal peak in the readout window",
    },
    AnalysisModule {
        name: "analyse_dark",
        theme: ConfigTheme::Generic,
        description: "ADC histograms of dark runs",
    },
];

/// Finds a registered analysis routine by name.
pub fn find_module(name: &str) -> Option<&'static AnalysisModule> {
    MODULES.iter().find(|m| m.name == name)
}
