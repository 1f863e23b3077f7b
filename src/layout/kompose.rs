//! Flexible aspect-driven grid.
//!
//! Windows fill a grid whose orientation follows the screen aspect. Every
//! window keeps its own aspect inside its cell, cells lend spare width to a
//! portrait right neighbor, the last window may span two columns, and rows
//! that outgrow the nominal row height push later rows down.

use std::collections::BTreeMap;

use crate::geometry::Rect;
use crate::host::WindowId;

use super::{LAYOUT_INSET, NO_UPSCALE_LIMIT};

pub fn arrange(windows: &[(WindowId, Rect)], area: Rect) -> BTreeMap<WindowId, Rect> {
    let mut targets = BTreeMap::new();
    let count = windows.len();
    if count == 0 {
        return targets;
    }

    let spacing = LAYOUT_INSET;
    let parent_ratio = area.width as f64 / area.height.max(1) as f64;
    // more columns than rows on a wide screen, flipped on a tall one
    let (columns, rows) = if parent_ratio > 1.0 {
        let columns = (count as f64).sqrt().ceil() as usize;
        (columns, count.div_ceil(columns))
    } else {
        let rows = (count as f64).sqrt().ceil() as usize;
        (count.div_ceil(rows), rows)
    };
    let w = (area.width - (columns as i32 + 1) * spacing) / columns as i32;
    let h = (area.height - (rows as i32 + 1) * spacing) / rows as i32;

    let mut geometry_rects = Vec::with_capacity(count);
    let mut max_row_heights = Vec::with_capacity(rows);
    for i in 0..rows {
        let mut x_offset_from_last_col = 0;
        let mut max_height_in_row = 0;
        for j in 0..columns {
            let pos = i * columns + j;
            if pos >= count {
                break;
            }
            let original = windows[pos].1;
            let ratio = original.aspect_ratio();
            let mut usable_w = w;
            let usable_h = h;

            // the last window may span two cells when no right neighbor exists
            if pos == count - 1 && j != columns - 1 {
                usable_w = 2 * w;
            }
            // a portrait right neighbor will not use its full cell width;
            // borrow the spare
            if j + 1 < columns && pos + 1 < count {
                let neighbor = windows[pos + 1].1;
                if neighbor.aspect_ratio() < 1.0 {
                    let add_w = w - neighbor.width_for_height(h);
                    if add_w > 0 {
                        usable_w = w + add_w;
                    }
                }
            }

            let height_by_width = original.height_for_width(usable_w);
            let width_by_height = original.width_for_height(usable_h);
            let (mut widget_w, mut widget_h) = if (ratio >= 1.0 && height_by_width <= usable_h)
                || (ratio < 1.0 && width_by_height > usable_w)
            {
                (usable_w, height_by_width)
            } else {
                (width_by_height, usable_h)
            };
            if widget_w > original.width
                && (original.width > NO_UPSCALE_LIMIT || original.height > NO_UPSCALE_LIMIT)
            {
                widget_w = original.width;
                widget_h = original.height;
            }

            // first row bottom-aligns, first column right-aligns, so the
            // arrangement hugs the grid's inner edges
            let mut alignment_x = 0;
            let mut alignment_y = 0;
            if i == 0 && h > widget_h {
                alignment_y = h - widget_h;
            }
            if j == 0 && w > widget_w {
                alignment_x = w - widget_w;
            }
            geometry_rects.push(Rect::new(
                area.x + j as i32 * (w + spacing) + spacing + alignment_x + x_offset_from_last_col,
                area.y + i as i32 * (h + spacing) + spacing + alignment_y,
                widget_w,
                widget_h,
            ));

            if alignment_x == 0 {
                x_offset_from_last_col += widget_w - w;
            }
            max_height_in_row = max_height_in_row.max(widget_h);
        }
        max_row_heights.push(max_height_in_row);
    }

    // rows taller than nominal push every following row down
    let mut top_offset = 0;
    for i in 0..rows {
        for j in 0..columns {
            let pos = i * columns + j;
            if pos >= count {
                break;
            }
            let id = windows[pos].0;
            let mut target = geometry_rects[pos];
            target.y += top_offset;
            targets.insert(id, target);
        }
        if max_row_heights[i] > h {
            top_offset += max_row_heights[i] - h;
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_screen_prefers_columns() {
        let area = Rect::new(0, 0, 1600, 900);
        let windows: Vec<_> = (0..3)
            .map(|i| (WindowId(i), Rect::new(100 * i as i32, 0, 400, 300)))
            .collect();
        let targets = arrange(&windows, area);
        assert_eq!(targets.len(), 3);
        // 2 columns of spacing-separated cells, so the first two windows
        // share the top row
        assert_eq!(targets[&WindowId(0)].y, targets[&WindowId(1)].y);
    }

    #[test]
    fn aspect_is_preserved() {
        let area = Rect::new(0, 0, 1280, 1024);
        let original = Rect::new(0, 0, 800, 400);
        let targets = arrange(&[(WindowId(1), original)], area);
        let t = targets[&WindowId(1)];
        let ratio = t.width as f64 / t.height as f64;
        assert!((ratio - 2.0).abs() < 0.05, "ratio drifted to {ratio}");
    }

    #[test]
    fn large_windows_are_not_upscaled() {
        let area = Rect::new(0, 0, 1920, 1080);
        let original = Rect::new(500, 500, 640, 480);
        let targets = arrange(&[(WindowId(1), original)], area);
        let t = targets[&WindowId(1)];
        assert_eq!((t.width, t.height), (640, 480));
    }

    #[test]
    fn deterministic_for_equal_input() {
        let area = Rect::new(0, 0, 1600, 900);
        let windows: Vec<_> = (0..6)
            .map(|i| (WindowId(i), Rect::new(37 * i as i32, 53 * i as i32, 500, 350)))
            .collect();
        assert_eq!(arrange(&windows, area), arrange(&windows, area));
    }
}
