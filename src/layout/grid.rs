//! Closest-slot regular grid.
//!
//! The screen is divided into a near-square grid of slots and every window
//! takes the free slot nearest its current center. A window may evict a
//! sitting occupier when it is closer to the slot; the occupier rejoins the
//! pool and looks again.

use std::collections::{BTreeMap, VecDeque};

use crate::geometry::{Point, Rect};
use crate::host::WindowId;

use super::{LAYOUT_INSET, fit_in_cell};

/// Grid dimensions for `count` windows: as many columns as the square root
/// rounds up to, and as many rows as needed after that.
pub fn grid_size(count: usize) -> (usize, usize) {
    if count == 0 {
        return (0, 0);
    }
    let columns = (count as f64).sqrt().ceil() as usize;
    let rows = count.div_ceil(columns);
    (columns, rows)
}

fn squared_distance(a: Point, b: Point) -> i64 {
    let dx = (a.x - b.x) as i64;
    let dy = (a.y - b.y) as i64;
    dx * dx + dy * dy
}

pub fn arrange(windows: &[(WindowId, Rect)], area: Rect) -> BTreeMap<WindowId, Rect> {
    let mut targets = BTreeMap::new();
    if windows.is_empty() {
        return targets;
    }

    let (columns, rows) = grid_size(windows.len());
    let slot_width = area.width / columns as i32;
    let slot_height = area.height / rows as i32;
    let slot_rect = |slot: usize| {
        Rect::new(
            area.x + (slot % columns) as i32 * slot_width,
            area.y + (slot / columns) as i32 * slot_height,
            slot_width,
            slot_height,
        )
    };

    let original: BTreeMap<WindowId, Rect> = windows.iter().copied().collect();
    let mut taken: Vec<Option<WindowId>> = vec![None; columns * rows];
    let mut pool: VecDeque<WindowId> = windows.iter().map(|(id, _)| *id).collect();

    while let Some(id) = pool.pop_front() {
        let pos = original[&id].center();
        let mut candidate = None;
        let mut candidate_distance = i64::MAX;
        for (slot, occupant) in taken.iter().enumerate() {
            let dist = squared_distance(pos, slot_rect(slot).center());
            if dist < candidate_distance {
                // take a free slot, or evict an occupier sitting further away
                let beats_occupant = match occupant {
                    None => true,
                    Some(other) => {
                        dist < squared_distance(original[other].center(), slot_rect(slot).center())
                    }
                };
                if beats_occupant {
                    candidate = Some(slot);
                    candidate_distance = dist;
                }
            }
        }
        // a free slot always exists, so a candidate was found
        if let Some(slot) = candidate {
            if let Some(evicted) = taken[slot] {
                pool.push_back(evicted);
            }
            taken[slot] = Some(id);
        }
    }

    for (slot, occupant) in taken.iter().enumerate() {
        if let Some(id) = occupant {
            let cell = slot_rect(slot).adjusted(
                LAYOUT_INSET,
                LAYOUT_INSET,
                -LAYOUT_INSET,
                -LAYOUT_INSET,
            );
            targets.insert(*id, fit_in_cell(original[id], cell));
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scatter(count: u64) -> Vec<(WindowId, Rect)> {
        (0..count)
            .map(|i| {
                (
                    WindowId(i),
                    Rect::new(50 * i as i32, 30 * i as i32, 400, 300),
                )
            })
            .collect()
    }

    #[test]
    fn grid_size_is_near_square() {
        assert_eq!(grid_size(1), (1, 1));
        assert_eq!(grid_size(4), (2, 2));
        assert_eq!(grid_size(5), (3, 2));
        assert_eq!(grid_size(10), (4, 3));
    }

    #[test]
    fn every_window_gets_a_distinct_slot() {
        let area = Rect::new(0, 0, 1600, 900);
        let targets = arrange(&scatter(7), area);
        assert_eq!(targets.len(), 7);
        let rects: Vec<Rect> = targets.values().copied().collect();
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(!a.intersects(*b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn targets_stay_inside_the_area() {
        let area = Rect::new(100, 50, 1600, 900);
        for (_, target) in arrange(&scatter(9), area) {
            assert!(area.contains_rect(target), "{target:?} escapes {area:?}");
        }
    }

    #[test]
    fn window_near_a_slot_keeps_it() {
        let area = Rect::new(0, 0, 1200, 800);
        // 4 windows, 2x2 grid; one window sits dead center of the
        // bottom-right slot and must not be evicted from it
        let windows = vec![
            (WindowId(1), Rect::new(0, 0, 200, 150)),
            (WindowId(2), Rect::new(700, 100, 200, 150)),
            (WindowId(3), Rect::new(100, 500, 200, 150)),
            (WindowId(4), Rect::new(800, 500, 200, 150)),
        ];
        let targets = arrange(&windows, area);
        let bottom_right_cell = Rect::new(600, 400, 600, 400);
        assert!(bottom_right_cell.contains_rect(targets[&WindowId(4)]));
    }

    #[test]
    fn deterministic_for_equal_input() {
        let area = Rect::new(0, 0, 1920, 1080);
        assert_eq!(arrange(&scatter(12), area), arrange(&scatter(12), area));
    }
}
