//! Heatmap rendering from weighted 2D points.
//!
//! The pipeline per draw pass:
//! - Stamp a blurred influence circle per point onto a scratch alpha plane
//! - Accumulate the plane into persistent intensity-sum and pass-count buffers
//! - Colorize the per-pixel running average through a 256-entry gradient table
//! - PNG export of the colorized surface

pub mod buffer_pool;
pub mod engine;
pub mod gradient;
pub mod png;
pub mod stamp;
pub mod surface;

pub use engine::HeatmapRenderer;
pub use gradient::GradientTable;
pub use stamp::Stamp;
pub use surface::{SoftwareSurface, Surface};
