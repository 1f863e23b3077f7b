//! Window motion manager.
//!
//! Keeps a current and a target rectangle per managed window and moves the
//! current one toward the target on each `calculate` tick. The approach is
//! exponential in elapsed time with a snap epsilon, so every animation
//! settles in a bounded number of ticks and a fixed tick sequence always
//! produces the same frames.

use std::collections::BTreeMap;

use crate::geometry::{Rect, RectF};
use crate::host::WindowId;

/// Time constant of the exponential approach, in milliseconds.
const MOTION_TAU_MS: f64 = 60.0;
/// Once every edge is within this many pixels of the target, snap.
const SNAP_EPSILON: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    pub current: RectF,
    pub target: RectF,
}

impl MotionState {
    fn at_rest(&self) -> bool {
        self.current == self.target
    }
}

#[derive(Debug, Default)]
pub struct WindowMotionManager {
    windows: BTreeMap<WindowId, MotionState>,
}

impl WindowMotionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `id` at `geometry`, at rest. Managing an already
    /// managed window re-anchors it.
    pub fn manage(&mut self, id: WindowId, geometry: Rect) {
        let rect = RectF::from(geometry);
        self.windows.insert(
            id,
            MotionState {
                current: rect,
                target: rect,
            },
        );
        tracing::debug!(%id, "motion: manage");
    }

    pub fn unmanage(&mut self, id: WindowId) {
        if self.windows.remove(&id).is_some() {
            tracing::debug!(%id, "motion: unmanage");
        }
    }

    pub fn unmanage_all(&mut self) {
        self.windows.clear();
    }

    /// Retargets `id`. No-op for unmanaged handles.
    pub fn move_window(&mut self, id: WindowId, target: RectF) {
        if let Some(state) = self.windows.get_mut(&id) {
            state.target = target;
        }
    }

    /// Stops any motion for `id` and pins it at `geometry`.
    pub fn reset(&mut self, id: WindowId, geometry: Rect) {
        if let Some(state) = self.windows.get_mut(&id) {
            let rect = RectF::from(geometry);
            state.current = rect;
            state.target = rect;
        }
    }

    pub fn is_managing(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn managed_windows(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    pub fn managing_count(&self) -> usize {
        self.windows.len()
    }

    pub fn are_windows_moving(&self) -> bool {
        self.windows.values().any(|s| !s.at_rest())
    }

    /// Where `id` is painted this frame.
    pub fn transformed_geometry(&self, id: WindowId) -> Option<RectF> {
        self.windows.get(&id).map(|s| s.current)
    }

    /// Where `id` is headed.
    pub fn target_geometry(&self, id: WindowId) -> Option<RectF> {
        self.windows.get(&id).map(|s| s.target)
    }

    /// Advances every managed window by `elapsed_ms`. Returns true while any
    /// window is still moving afterwards.
    pub fn calculate(&mut self, elapsed_ms: u64) -> bool {
        let step = 1.0 - (-(elapsed_ms as f64) / MOTION_TAU_MS).exp();
        let mut moving = false;
        for state in self.windows.values_mut() {
            if state.at_rest() {
                continue;
            }
            let c = &mut state.current;
            let t = state.target;
            c.x += (t.x - c.x) * step;
            c.y += (t.y - c.y) * step;
            c.width += (t.width - c.width) * step;
            c.height += (t.height - c.height) * step;
            let settled = (t.x - c.x).abs() < SNAP_EPSILON
                && (t.y - c.y).abs() < SNAP_EPSILON
                && (t.width - c.width).abs() < SNAP_EPSILON
                && (t.height - c.height).abs() < SNAP_EPSILON;
            if settled {
                *c = t;
            } else {
                moving = true;
            }
        }
        moving
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> WindowId {
        WindowId(n)
    }

    #[test]
    fn unmanaged_queries_return_none() {
        let mut mgr = WindowMotionManager::new();
        assert!(mgr.transformed_geometry(id(1)).is_none());
        assert!(mgr.target_geometry(id(1)).is_none());
        // retargeting an unmanaged window must not create an entry
        mgr.move_window(id(1), RectF::new(0.0, 0.0, 10.0, 10.0));
        assert!(!mgr.is_managing(id(1)));
    }

    #[test]
    fn motion_converges_and_snaps() {
        let mut mgr = WindowMotionManager::new();
        mgr.manage(id(1), Rect::new(0, 0, 100, 100));
        mgr.move_window(id(1), RectF::new(500.0, 300.0, 200.0, 150.0));
        assert!(mgr.are_windows_moving());

        let mut ticks = 0;
        while mgr.calculate(16) {
            ticks += 1;
            assert!(ticks < 200, "motion did not settle");
        }
        assert_eq!(
            mgr.transformed_geometry(id(1)),
            Some(RectF::new(500.0, 300.0, 200.0, 150.0))
        );
        assert!(!mgr.are_windows_moving());
    }

    #[test]
    fn motion_moves_toward_target_monotonically() {
        let mut mgr = WindowMotionManager::new();
        mgr.manage(id(1), Rect::new(0, 0, 100, 100));
        mgr.move_window(id(1), RectF::new(400.0, 0.0, 100.0, 100.0));
        let mut last_x = 0.0;
        for _ in 0..10 {
            mgr.calculate(16);
            let x = mgr.transformed_geometry(id(1)).unwrap().x;
            assert!(x > last_x);
            assert!(x <= 400.0);
            last_x = x;
        }
    }

    #[test]
    fn reset_pins_in_place() {
        let mut mgr = WindowMotionManager::new();
        mgr.manage(id(1), Rect::new(0, 0, 100, 100));
        mgr.move_window(id(1), RectF::new(500.0, 500.0, 50.0, 50.0));
        mgr.calculate(16);
        mgr.reset(id(1), Rect::new(0, 0, 100, 100));
        assert!(!mgr.are_windows_moving());
        assert_eq!(
            mgr.transformed_geometry(id(1)),
            Some(RectF::from(Rect::new(0, 0, 100, 100)))
        );
    }

    #[test]
    fn identical_tick_sequences_produce_identical_frames() {
        let run = || {
            let mut mgr = WindowMotionManager::new();
            mgr.manage(id(1), Rect::new(10, 20, 300, 200));
            mgr.move_window(id(1), RectF::new(640.0, 360.0, 150.0, 100.0));
            let mut frames = Vec::new();
            for _ in 0..30 {
                mgr.calculate(16);
                frames.push(mgr.transformed_geometry(id(1)).unwrap());
            }
            frames
        };
        assert_eq!(run(), run());
    }
}
