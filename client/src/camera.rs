use crate::game::PlayerBlob;
use macroquad::math::{vec2, Vec2};

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 10.0;

/// Upper bound on grid lines per axis, whatever the viewport and zoom.
const MAX_GRID_LINES: usize = 1024;

/// Parses a `--zoom` argument, accepting only finite values in
/// `MIN_ZOOM..=MAX_ZOOM`.
pub fn parse_zoom(arg: &str) -> Result<f32, String> {
    let zoom: f32 = arg
        .parse()
        .map_err(|e| format!("`{}` is not a number: {}", arg, e))?;

    if zoom.is_finite() && (MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
        Ok(zoom)
    } else {
        Err(format!("zoom must be between {} and {}", MIN_ZOOM, MAX_ZOOM))
    }
}

/// World-to-screen transform that keeps the local player centred.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: Vec2,
    pub zoom: f32,
    pub viewport: Vec2,
}

impl Camera {
    /// Out-of-range zoom is clamped; a non-finite one falls back to 1.0.
    pub fn new(width: f32, height: f32, zoom: f32) -> Self {
        let zoom = if zoom.is_finite() {
            zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            1.0
        };

        Self {
            center: Vec2::ZERO,
            zoom,
            viewport: vec2(width, height),
        }
    }

    /// Recentres on a live player. A dead or missing player leaves the camera
    /// where it last was.
    pub fn follow(&mut self, me: Option<&PlayerBlob>) {
        if let Some(me) = me.filter(|me| me.alive) {
            self.center = vec2(me.x, me.y);
        }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.center) * self.zoom + self.viewport / 2.0
    }

    pub fn scale(&self, length: f32) -> f32 {
        length * self.zoom
    }

    /// Top-left and bottom-right corners of the visible world rectangle.
    pub fn visible_world(&self) -> (Vec2, Vec2) {
        let half = self.viewport / (2.0 * self.zoom);
        (self.center - half, self.center + half)
    }

    /// World coordinates of the grid lines crossing the viewport.
    pub fn grid_lines(&self, spacing: f32) -> (Vec<f32>, Vec<f32>) {
        let (min, max) = self.visible_world();
        (
            multiples_between(min.x, max.x, spacing),
            multiples_between(min.y, max.y, spacing),
        )
    }
}

fn multiples_between(min: f32, max: f32, spacing: f32) -> Vec<f32> {
    if !(min.is_finite() && max.is_finite() && spacing.is_finite() && spacing > 0.0) {
        return Vec::new();
    }

    let first = (min / spacing).ceil() as i64;
    let last = (max / spacing).floor() as i64;
    (first..=last)
        .take(MAX_GRID_LINES)
        .map(|i| i as f32 * spacing)
        .collect()
}
