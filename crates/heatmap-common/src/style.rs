//! Gradient configuration, loadable from JSON.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{HeatmapError, HeatmapResult};

/// Color stop for a heat gradient
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColorStop {
    /// Fractional position in [0, 1].
    pub position: f32,
    /// CSS color keyword or hex string.
    pub color: String,
}

/// A sparse set of color stops describing a heat gradient.
///
/// Stop order is irrelevant; positions are sorted when the dense lookup
/// table is built. Duplicate positions are a caller contract violation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GradientConfig {
    pub stops: Vec<ColorStop>,
}

impl GradientConfig {
    pub fn new(stops: Vec<ColorStop>) -> Self {
        Self { stops }
    }

    /// Add a stop, builder-style.
    pub fn stop(mut self, position: f32, color: &str) -> Self {
        self.stops.push(ColorStop {
            position,
            color: color.to_string(),
        });
        self
    }

    /// The classic heat ramp: blue, cyan, lime, yellow, red.
    pub fn heat() -> Self {
        Self { stops: Vec::new() }
            .stop(0.4, "blue")
            .stop(0.6, "cyan")
            .stop(0.7, "lime")
            .stop(0.8, "yellow")
            .stop(1.0, "red")
    }

    /// Load gradient configuration from JSON string
    pub fn from_json(json_str: &str) -> HeatmapResult<Self> {
        let config: Self = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load gradient configuration from file
    pub fn from_file(path: &str) -> HeatmapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Check that the stop set can produce a lookup table.
    pub fn validate(&self) -> HeatmapResult<()> {
        if self.stops.is_empty() {
            return Err(HeatmapError::InvalidGradient(
                "at least one color stop is required".to_string(),
            ));
        }
        for stop in &self.stops {
            if !(0.0..=1.0).contains(&stop.position) || stop.position.is_nan() {
                return Err(HeatmapError::InvalidGradient(format!(
                    "stop position {} outside [0, 1]",
                    stop.position
                )));
            }
            Color::parse(&stop.color)?;
        }
        Ok(())
    }

    /// Resolve color strings and sort stops by position.
    pub fn resolve(&self) -> HeatmapResult<Vec<(f32, Color)>> {
        self.validate()?;
        let mut resolved: Vec<(f32, Color)> = Vec::with_capacity(self.stops.len());
        for stop in &self.stops {
            resolved.push((stop.position, Color::parse(&stop.color)?));
        }
        resolved.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(resolved)
    }
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self::heat()
    }
}
