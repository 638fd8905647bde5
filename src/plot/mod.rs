//! PNG rendering.
//!
//! - `annotate`: derive vertical marker positions from fitted curves
//! - `png`: draw single/dual-axis charts with Plotters' bitmap backend

pub mod annotate;
pub mod png;

pub use annotate::*;
pub use png::*;
