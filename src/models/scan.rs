//! Event selection and scan points.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// The `[evt_min, evt_max)` slice of the event stream an analysis reads.
///
/// # Example
///
/// ```
/// use digicam_config::models::EventWindow;
///
/// let window = EventWindow { min: 0, max: 210_000 };
/// assert_eq!(window.len(), 210_000);
/// assert_eq!(window.batches(1000), Some(210));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWindow {
    /// First event processed.
    pub min: u64,
    /// Event number processing stops at.
    pub max: u64,
}

impl EventWindow {
    /// Number of events in the window; zero when inverted.
    pub fn len(&self) -> u64 {
        self.max.saturating_sub(self.min)
    }

    /// Returns true when the window selects no events.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of fill batches of `batch_size` events needed to cover the
    /// window, or `None` for a zero batch size.
    pub fn batches(&self, batch_size: u64) -> Option<u64> {
        if batch_size == 0 {
            return None;
        }
        Some(self.len().div_ceil(batch_size))
    }
}

/// One point of a parameter sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanPoint {
    /// Position of the point in `scan_level`.
    pub index: usize,
    /// The scan level value (e.g. a DAC or NSB step).
    pub level: i64,
    /// Night sky background rate aligned with this level, if configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsb_rate: Option<f64>,
    /// Events belonging to this level, when `events_per_level` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Range<u64>>,
}

impl ScanPoint {
    /// Creates a scan point, computing its event range from the number of
    /// events recorded per level.
    ///
    /// Returns `None` when the event range does not fit in `u64`.
    pub fn new(
        index: usize,
        level: i64,
        nsb_rate: Option<f64>,
        events_per_level: Option<u64>,
    ) -> Option<Self> {
        let events = match events_per_level {
            Some(per_level) => {
                let start = u64::try_from(index).ok()?.checked_mul(per_level)?;
                Some(start..start.checked_add(per_level)?)
            }
            None => None,
        };
        Some(Self {
            index,
            level,
            nsb_rate,
            events,
        })
    }
}
