//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the model families available for fitting (`ModelFamily`)
//! - fit outputs (`FitResult`, `FittedModel`, `FitQuality`)
//! - curve grids and the curve JSON schema (`CurveGrid`, `CurveFile`)
//! - run configuration for the single- and dual-axis analyses

pub mod types;

pub use types::*;
