//! ADC histogram axis.
//!
//! Built from the `adcs_min`, `adcs_max` and `adcs_binwidth` keys. Bin
//! centers run from `min` to `max` inclusive in steps of the bin width,
//! and each center sits halfway between two bin edges.

use serde::{Deserialize, Serialize};

/// Binning of an ADC histogram.
///
/// # Example
///
/// ```
/// use digicam_config::models::AdcAxis;
///
/// let axis = AdcAxis::new(0, 4095, 1).unwrap();
/// assert_eq!(axis.n_bins(), 4096);
/// assert_eq!(axis.bin_edges().len(), 4097);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdcAxis {
    /// Center of the first bin.
    pub min: i64,
    /// Upper bound for the center of the last bin.
    pub max: i64,
    /// Width of every bin, in ADC counts.
    pub bin_width: u64,
}

impl AdcAxis {
    /// Creates an axis, or `None` if `min >= max` or the bin width is zero.
    pub fn new(min: i64, max: i64, bin_width: u64) -> Option<Self> {
        if min >= max || bin_width == 0 {
            return None;
        }
        Some(Self {
            min,
            max,
            bin_width,
        })
    }

    /// Number of bins on the axis.
    pub fn n_bins(&self) -> usize {
        let span = self.max.abs_diff(self.min);
        (span / self.bin_width) as usize + 1
    }

    /// Centers of every bin, in increasing order.
    pub fn bin_centers(&self) -> Vec<i64> {
        let width = self.bin_width as i64;
        (0..self.n_bins() as i64)
            .map(|i| self.min + i * width)
            .collect()
    }

    /// Edges of every bin: one more than the number of bins.
    pub fn bin_edges(&self) -> Vec<f64> {
        let half = self.bin_width as f64 / 2.0;
        let centers = self.bin_centers();
        let mut edges: Vec<f64> = centers.iter().map(|&c| c as f64 - half).collect();
        if let Some(&last) = centers.last() {
            edges.push(last as f64 + half);
        }
        edges
    }
}
