// Page layout: font metrics for measuring stamped text and the fixed
// coordinates the stamper and finalizer place it at.

pub mod font_metrics;
pub mod geometry;

pub use font_metrics::{standard_metrics, FontMetricTable, StandardFont};
pub use geometry::{default_geometry, Geometry, Rgb};
