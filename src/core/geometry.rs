//! Projection between original-image pixels and display pixels.
//!
//! All functions are pure; the caller keeps `(original, display, scale)`
//! around as a [`Viewport`].

use crate::errors::{AppError, AppResult};

/// Result of fitting an image into a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub display_w: u32,
    pub display_h: u32,
    pub scale: f64,
}

/// Scale an image of `original_w × original_h` to fit the canvas while
/// preserving aspect ratio.
pub fn fit(original_w: u32, original_h: u32, canvas_w: u32, canvas_h: u32) -> AppResult<Fit> {
    if original_w == 0 || original_h == 0 {
        return Err(AppError::Validation(format!(
            "image size must be positive, got {original_w}x{original_h}"
        )));
    }
    if canvas_w == 0 || canvas_h == 0 {
        return Err(AppError::Validation(format!(
            "canvas size must be positive, got {canvas_w}x{canvas_h}"
        )));
    }

    let scale = (canvas_w as f64 / original_w as f64).min(canvas_h as f64 / original_h as f64);

    Ok(Fit {
        display_w: (original_w as f64 * scale).floor() as u32,
        display_h: (original_h as f64 * scale).floor() as u32,
        scale,
    })
}

pub fn display_to_original(dx: f64, dy: f64, scale: f64) -> (i64, i64) {
    ((dx / scale).floor() as i64, (dy / scale).floor() as i64)
}

/// `floor(v * scale)`. When `scale >= 1` the result is moved forward to the
/// first display pixel that projects back onto `v`, so that
/// `display_to_original(original_to_display(p)) == p` holds for magnified views.
pub fn original_to_display(x: i64, y: i64, scale: f64) -> (i64, i64) {
    (axis_to_display(x, scale), axis_to_display(y, scale))
}

fn axis_to_display(v: i64, scale: f64) -> i64 {
    let mut d = (v as f64 * scale).floor() as i64;
    if scale >= 1.0 && scale.is_finite() {
        while d < i64::MAX && ((d as f64) / scale).floor() < v as f64 {
            d += 1;
        }
    }
    d
}

/// Caller-side projection state for the image currently on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub original_w: u32,
    pub original_h: u32,
    pub display_w: u32,
    pub display_h: u32,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::with_scale(1.0)
    }
}

impl Viewport {
    pub fn fit(original_w: u32, original_h: u32, canvas_w: u32, canvas_h: u32) -> AppResult<Self> {
        let f = fit(original_w, original_h, canvas_w, canvas_h)?;
        Ok(Self {
            original_w,
            original_h,
            display_w: f.display_w,
            display_h: f.display_h,
            scale: f.scale,
        })
    }

    /// Viewport with a known scale but no image bounds.
    pub fn with_scale(scale: f64) -> Self {
        Self {
            original_w: 0,
            original_h: 0,
            display_w: 0,
            display_h: 0,
            scale,
        }
    }

    pub fn has_bounds(&self) -> bool {
        self.original_w > 0 && self.original_h > 0
    }

    /// Original pixel under a display position, or `None` outside the image.
    pub fn to_original(&self, dx: f64, dy: f64) -> Option<(u32, u32)> {
        let (x, y) = display_to_original(dx, dy, self.scale);
        if x < 0 || y < 0 {
            return None;
        }
        if self.has_bounds() && (x >= self.original_w as i64 || y >= self.original_h as i64) {
            return None;
        }
        Some((u32::try_from(x).ok()?, u32::try_from(y).ok()?))
    }

    pub fn to_display(&self, x: u32, y: u32) -> (i64, i64) {
        original_to_display(x as i64, y as i64, self.scale)
    }
}
