//! Weighted input samples.

use serde::{Deserialize, Serialize};

/// A weighted sample at a surface position.
///
/// `x`/`y` are pixel coordinates on the bound surface; positions outside the
/// surface are legal and simply render nothing visible. `weight` is unbounded
/// and gets normalized against the engine's configured maximum at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct DataPoint {
    pub x: f32,
    pub y: f32,
    pub weight: f32,
}

impl DataPoint {
    pub fn new(x: f32, y: f32, weight: f32) -> Self {
        Self { x, y, weight }
    }
}
