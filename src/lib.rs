//! Configuration loader for DigiCam camera calibration analyses
//!
//! This crate loads the YAML configuration files driving the calibration
//! pipeline of a Cherenkov telescope camera (multi photo-electron fits and
//! trigger rate scans), validates them against a per-theme schema, and
//! resolves them into run plans.

#![warn(missing_docs)]

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
