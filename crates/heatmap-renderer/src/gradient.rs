//! Dense gradient lookup table mapping averaged intensity to display color.

use heatmap_common::{interpolate_color, Color, GradientConfig, HeatmapResult};

/// Number of entries in the lookup table.
pub const TABLE_SIZE: usize = 256;

/// 256-entry RGBA lookup built from a sparse set of color stops.
///
/// Entry 0 corresponds to intensity 0.0, entry 255 to intensity 1.0, with
/// linear RGBA interpolation between stops. Positions below the lowest stop
/// take that stop's color; likewise above the highest.
#[derive(Clone)]
pub struct GradientTable {
    entries: [[u8; 4]; TABLE_SIZE],
}

impl GradientTable {
    /// Build the table from a gradient configuration.
    pub fn build(config: &GradientConfig) -> HeatmapResult<Self> {
        let stops = config.resolve()?;
        Ok(Self::from_resolved(&stops))
    }

    /// The classic heat ramp (blue, cyan, lime, yellow, red).
    pub fn heat() -> Self {
        // Resolved form of GradientConfig::heat(); constants, so no parsing
        // and no failure path.
        let stops = [
            (0.4, Color::opaque(0, 0, 255)),
            (0.6, Color::opaque(0, 255, 255)),
            (0.7, Color::opaque(0, 255, 0)),
            (0.8, Color::opaque(255, 255, 0)),
            (1.0, Color::opaque(255, 0, 0)),
        ];
        Self::from_resolved(&stops)
    }

    /// Build from already-resolved, position-sorted stops.
    pub fn from_resolved(stops: &[(f32, Color)]) -> Self {
        let mut entries = [[0u8; 4]; TABLE_SIZE];
        for (i, entry) in entries.iter_mut().enumerate() {
            let position = i as f32 / (TABLE_SIZE - 1) as f32;
            let color = sample_stops(stops, position);
            *entry = [color.r, color.g, color.b, color.a];
        }
        Self { entries }
    }

    /// Look up the color for an averaged intensity.
    ///
    /// The index is clamped to the table range: accumulated floating-point
    /// error can push an average slightly past 1.0.
    #[inline]
    pub fn lookup(&self, avg: f32) -> [u8; 4] {
        let index = ((avg * 255.0) as i32).clamp(0, (TABLE_SIZE - 1) as i32) as usize;
        self.entries[index]
    }

    pub fn entries(&self) -> &[[u8; 4]; TABLE_SIZE] {
        &self.entries
    }
}

impl Default for GradientTable {
    fn default() -> Self {
        Self::heat()
    }
}

/// Sample the piecewise-linear gradient defined by sorted stops.
fn sample_stops(stops: &[(f32, Color)], position: f32) -> Color {
    let Some(&(first_pos, first_color)) = stops.first() else {
        return Color::transparent();
    };
    let &(last_pos, last_color) = stops.last().unwrap_or(&(first_pos, first_color));

    if position <= first_pos {
        return first_color;
    }
    if position >= last_pos {
        return last_color;
    }

    for window in stops.windows(2) {
        let (p0, c0) = window[0];
        let (p1, c1) = window[1];
        if position >= p0 && position <= p1 {
            let span = p1 - p0;
            let t = if span.abs() < f32::EPSILON {
                0.0
            } else {
                (position - p0) / span
            };
            return interpolate_color(c0, c1, t);
        }
    }

    last_color
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_clamps_index() {
        let table = GradientTable::heat();
        // Slightly past 1.0 must hit the last entry, not panic
        assert_eq!(table.lookup(1.0001), *table.entries().last().unwrap());
        assert_eq!(table.lookup(-0.5), table.entries()[0]);
    }

    #[test]
    fn test_positions_below_first_stop_take_first_color() {
        let table = GradientTable::heat();
        // Heat ramp starts at 0.4 blue; everything below is blue
        assert_eq!(table.entries()[0], [0, 0, 255, 255]);
        assert_eq!(table.lookup(0.2), [0, 0, 255, 255]);
    }
}
