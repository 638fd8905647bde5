//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - derive shape windows per model family
//! - evaluate each candidate shape tuple (parallel)
//! - zoom the window around the winner for a bounded number of rounds

pub mod fitter;

pub use fitter::*;
