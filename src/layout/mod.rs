//! Layout solvers.
//!
//! Each solver is a pure function from a window list and a screen area to a
//! target rectangle per window. Callers sort the list by window id first so
//! equal input always yields equal output, and partition by screen so each
//! call sees one area.

pub mod grid;
pub mod kompose;
pub mod natural;

use std::collections::BTreeMap;

pub use crate::config::LayoutMode;
use crate::geometry::Rect;
use crate::host::WindowId;

/// Gap kept between a window and its grid cell or the screen border.
pub const LAYOUT_INSET: i32 = 10;
/// Windows with an original dimension beyond this are never upscaled.
pub const NO_UPSCALE_LIMIT: i32 = 300;
/// Hard ceiling on upscaling for small windows.
pub const MAX_SCALE: f64 = 2.0;

/// Tunables the natural solver needs; the grid solvers ignore them.
#[derive(Debug, Clone, Copy)]
pub struct LayoutOptions {
    /// Relaxation step in pixels.
    pub accuracy: i32,
    /// Grow windows into leftover space after decluttering.
    pub fill_gaps: bool,
}

pub fn arrange(
    mode: LayoutMode,
    windows: &[(WindowId, Rect)],
    area: Rect,
    options: LayoutOptions,
) -> BTreeMap<WindowId, Rect> {
    match mode {
        LayoutMode::RegularGrid => grid::arrange(windows, area),
        LayoutMode::FlexibleGrid => kompose::arrange(windows, area),
        LayoutMode::Natural => natural::arrange(windows, area, options),
    }
}

/// Clamps `scale` so small windows never exceed [`MAX_SCALE`] and large ones
/// never grow past their original size.
pub(crate) fn capped_scale(scale: f64, original: Rect) -> f64 {
    let large = original.width > NO_UPSCALE_LIMIT || original.height > NO_UPSCALE_LIMIT;
    if scale > MAX_SCALE || (scale > 1.0 && large) {
        if large { 1.0 } else { MAX_SCALE }
    } else {
        scale
    }
}

/// Aspect-fits `original` into `cell`, applies the scale cap, and centers the
/// result on the cell's center.
pub(crate) fn fit_in_cell(original: Rect, cell: Rect) -> Rect {
    let mut scale = cell.width as f64 / original.width.max(1) as f64;
    if original.height as f64 * scale > cell.height as f64 {
        scale = cell.height as f64 / original.height.max(1) as f64;
    }
    scale = capped_scale(scale, original);
    let width = (original.width as f64 * scale).round() as i32;
    let height = (original.height as f64 * scale).round() as i32;
    let center = cell.center();
    Rect::new(center.x - width / 2, center.y - height / 2, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_windows_cap_at_double_size() {
        let original = Rect::new(0, 0, 100, 100);
        let cell = Rect::new(0, 0, 800, 800);
        let fitted = fit_in_cell(original, cell);
        assert_eq!(fitted.width, 200);
        assert_eq!(fitted.height, 200);
    }

    #[test]
    fn large_windows_never_upscale() {
        let original = Rect::new(0, 0, 640, 480);
        let cell = Rect::new(0, 0, 1920, 1080);
        let fitted = fit_in_cell(original, cell);
        assert_eq!((fitted.width, fitted.height), (640, 480));
    }

    #[test]
    fn downscale_preserves_aspect() {
        let original = Rect::new(0, 0, 1600, 900);
        let cell = Rect::new(0, 0, 400, 400);
        let fitted = fit_in_cell(original, cell);
        assert_eq!(fitted.width, 400);
        assert_eq!(fitted.height, 225);
    }
}
