//! The heatmap engine: point rendering, accumulation, colorization.
//!
//! Each draw call is atomic from the caller's perspective: every configured
//! point is stamped onto a scratch alpha plane, the plane is accumulated into
//! persistent intensity-sum and pass-count buffers, the per-pixel running
//! average is colorized onto the bound surface, and both buffers are zeroed.
//! Repeating a draw call with the same points therefore reproduces the same
//! output: each pass contributes the same sum and the same count.

use heatmap_common::{DataPoint, GradientConfig, HeatmapResult};

use crate::buffer_pool::with_alpha_buffer;
use crate::gradient::GradientTable;
use crate::png;
use crate::stamp::{Stamp, DEFAULT_BLUR, DEFAULT_RADIUS};
use crate::surface::Surface;

/// Default opacity floor applied to normalized point weights.
pub const DEFAULT_MIN_OPACITY: f32 = 0.05;

/// Accumulating heatmap renderer bound to an output surface.
///
/// Configuration methods mutate and return `&mut Self` for chaining:
///
/// ```
/// use heatmap_common::DataPoint;
/// use heatmap_renderer::{HeatmapRenderer, SoftwareSurface};
///
/// let mut engine = HeatmapRenderer::new(SoftwareSurface::new(64, 64));
/// engine
///     .set_max(10.0)
///     .add_point(DataPoint::new(32.0, 32.0, 10.0))
///     .draw();
/// ```
pub struct HeatmapRenderer<S: Surface> {
    surface: S,
    width: usize,
    height: usize,

    points: Vec<DataPoint>,
    max: f32,

    stamp_radius: u32,
    stamp_blur: u32,
    stamp: Option<Stamp>,
    gradient: Option<GradientTable>,

    // Persistent accumulation state. Sized width * height; both reset to
    // zero at the end of every draw call.
    intensity: Vec<f32>,
    counts: Vec<u16>,
}

impl<S: Surface> HeatmapRenderer<S> {
    /// Bind a new engine to `surface`. Buffers are sized to the surface.
    pub fn new(surface: S) -> Self {
        let width = surface.width();
        let height = surface.height();
        Self {
            surface,
            width,
            height,
            points: Vec::new(),
            max: 1.0,
            stamp_radius: DEFAULT_RADIUS,
            stamp_blur: DEFAULT_BLUR,
            stamp: None,
            gradient: None,
            intensity: vec![0.0; width * height],
            counts: vec![0; width * height],
        }
    }

    /// Replace the point sequence. Insertion order is render order.
    pub fn set_points(&mut self, points: Vec<DataPoint>) -> &mut Self {
        self.points = points;
        self
    }

    /// Append one point.
    pub fn add_point(&mut self, point: DataPoint) -> &mut Self {
        self.points.push(point);
        self
    }

    pub fn clear_points(&mut self) -> &mut Self {
        self.points.clear();
        self
    }

    /// Set the weight normalization maximum (default 1).
    pub fn set_max(&mut self, max: f32) -> &mut Self {
        self.max = max;
        self
    }

    /// Rebuild the point stamp with the given radius and blur.
    pub fn configure_stamp(&mut self, radius: u32, blur: u32) -> &mut Self {
        self.stamp_radius = radius;
        self.stamp_blur = blur;
        tracing::debug!(radius, blur, "rebuilding point stamp");
        self.stamp = Some(Stamp::build(radius, blur));
        self
    }

    /// Rebuild the gradient table from `config`.
    ///
    /// An unresolvable config (unknown color, stop out of range) keeps the
    /// previous table and logs a warning; gradient validity is checked at
    /// the JSON boundary, not here.
    pub fn configure_gradient(&mut self, config: &GradientConfig) -> &mut Self {
        match GradientTable::build(config) {
            Ok(table) => self.gradient = Some(table),
            Err(err) => {
                tracing::warn!(error = %err, "invalid gradient config, keeping previous table");
            }
        }
        self
    }

    /// Re-read the bound surface's dimensions and re-allocate both
    /// persistent buffers, zeroed. Must be called after the surface is
    /// resized; buffer and surface sizes have to agree before the next draw.
    pub fn resize_to_surface(&mut self) -> &mut Self {
        self.width = self.surface.width();
        self.height = self.surface.height();
        self.intensity = vec![0.0; self.width * self.height];
        self.counts = vec![0; self.width * self.height];
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    /// Read-only view of the persistent per-pixel intensity sums.
    ///
    /// All zeros between draw calls; only mid-draw state differs.
    pub fn intensity_buffer(&self) -> &[f32] {
        &self.intensity
    }

    /// Read-only view of the persistent per-pixel pass counts.
    pub fn count_buffer(&self) -> &[u16] {
        &self.counts
    }

    /// Run one draw pass with the default opacity floor.
    pub fn draw(&mut self) -> &mut Self {
        self.draw_with_opacity_floor(DEFAULT_MIN_OPACITY)
    }

    /// Run one draw pass: render points, accumulate, colorize, reset.
    ///
    /// `min_opacity` is the floor applied to each point's normalized weight
    /// (`weight / max`), so zero-weight points still leave a faint mark
    /// unless the floor itself is zero.
    pub fn draw_with_opacity_floor(&mut self, min_opacity: f32) -> &mut Self {
        if self.stamp.is_none() {
            self.stamp = Some(Stamp::build(self.stamp_radius, self.stamp_blur));
        }
        if self.gradient.is_none() {
            self.gradient = Some(GradientTable::heat());
        }

        let width = self.width;
        let height = self.height;

        with_alpha_buffer(width, height, |scratch| {
            // Render every point onto the scratch plane
            if let Some(stamp) = &self.stamp {
                for point in &self.points {
                    let opacity = (point.weight / self.max).max(min_opacity).min(1.0);
                    composite_stamp(scratch, width, height, stamp, point.x, point.y, opacity);
                }
            }

            // Accumulate the whole plane: every pixel gets a sum contribution
            // and a count tick, covered by a stamp or not. That keeps
            // count == completed passes for the entire raster.
            for (i, &alpha) in scratch.iter().enumerate() {
                self.intensity[i] += alpha as f32 / 255.0;
                self.counts[i] = self.counts[i].wrapping_add(1);
            }
        });

        // Colorize the running average onto the surface
        self.surface.clear();
        if let Some(gradient) = &self.gradient {
            colorize(
                self.surface.pixel_data_mut(),
                gradient,
                &self.intensity,
                &self.counts,
            );
        }

        tracing::debug!(
            points = self.points.len(),
            width,
            height,
            "draw pass complete"
        );

        // Reset: the next pass accumulates from zero
        self.intensity.fill(0.0);
        self.counts.fill(0);

        self
    }

    /// Encode the bound surface as a PNG (indexed when the colorized output
    /// fits a 256-color palette, which a gradient-table heatmap usually does).
    pub fn to_png(&self) -> HeatmapResult<Vec<u8>> {
        png::create_png_auto(self.surface.pixel_data(), self.width, self.height)
    }
}

/// Composite `stamp` onto the scratch alpha plane at point position (x, y),
/// scaled by `opacity`, with source-over semantics.
///
/// The stamp's top-left corner lands at `(x - extent, y - extent)` so the
/// footprint is centered on the point. Off-plane regions are clipped.
/// Source-over saturates: overlapping stamps within one pass approach full
/// opacity, they never sum past it.
fn composite_stamp(
    scratch: &mut [u8],
    width: usize,
    height: usize,
    stamp: &Stamp,
    x: f32,
    y: f32,
    opacity: f32,
) {
    let extent = stamp.extent() as i32;
    let left = x.round() as i32 - extent;
    let top = y.round() as i32 - extent;
    let side = stamp.side() as i32;

    for sy in 0..side {
        let py = top + sy;
        if py < 0 || py >= height as i32 {
            continue;
        }
        for sx in 0..side {
            let px = left + sx;
            if px < 0 || px >= width as i32 {
                continue;
            }

            let src = stamp.alpha_at(sx as usize, sy as usize) as f32 / 255.0 * opacity;
            if src <= 0.0 {
                continue;
            }

            let idx = py as usize * width + px as usize;
            let dst = scratch[idx] as f32 / 255.0;
            let out = src + dst * (1.0 - src);
            scratch[idx] = (out * 255.0).round() as u8;
        }
    }
}

/// Write gradient colors for every pixel a pass has touched.
///
/// Pixels with a zero pass count are left as-is (the caller pre-clears the
/// surface to transparent). Touched pixels get the gradient color for their
/// running average at full opacity: visibility is decided by the count,
/// intensity is expressed through hue alone.
pub fn colorize(pixels: &mut [u8], gradient: &GradientTable, intensity: &[f32], counts: &[u16]) {
    for (i, (&sum, &count)) in intensity.iter().zip(counts.iter()).enumerate() {
        if count == 0 {
            continue;
        }
        let avg = sum / count as f32;
        let [r, g, b, _] = gradient.lookup(avg);

        let offset = i * 4;
        pixels[offset] = r;
        pixels[offset + 1] = g;
        pixels[offset + 2] = b;
        pixels[offset + 3] = 255;
    }
}
