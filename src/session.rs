//! Per-window session state.
//!
//! While the effect is up every known window owns a session entry carrying
//! its fade levels and overlay payload. Closed windows stay around, fading,
//! until their opacity reaches zero; only then may the host drop them.

use std::collections::BTreeMap;

use crate::host::WindowId;

#[derive(Debug, Clone)]
pub struct WindowSessionData {
    /// Painted at all this session.
    pub visible: bool,
    /// The window was closed but is still fading out.
    pub deleted: bool,
    /// A keep-alive reference on the host window is held.
    pub referenced: bool,
    pub opacity: f64,
    pub highlight: f64,
    pub caption: String,
    pub icon: String,
    /// Desktop background windows get a dim resting highlight.
    pub desktop_background: bool,
}

/// Inputs the per-tick fade laws depend on.
#[derive(Debug, Clone, Copy, Default)]
pub struct FadeContext {
    pub highlighted: Option<WindowId>,
    /// Window currently armed for drag-to-close.
    pub close_target: Option<WindowId>,
    /// The effect is winding down; everything un-dims.
    pub deactivating: bool,
    pub windows_moving: bool,
}

#[derive(Debug, Default)]
pub struct SessionState {
    windows: BTreeMap<WindowId, WindowSessionData>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: WindowId, data: WindowSessionData) {
        self.windows.insert(id, data);
    }

    /// Marks `id` closed; it keeps fading until transparent. Returns false
    /// for unknown windows.
    pub fn window_closed(&mut self, id: WindowId) -> bool {
        if let Some(data) = self.windows.get_mut(&id) {
            data.deleted = true;
            data.referenced = true;
            true
        } else {
            false
        }
    }

    pub fn remove(&mut self, id: WindowId) -> Option<WindowSessionData> {
        self.windows.remove(&id)
    }

    pub fn clear(&mut self) {
        self.windows.clear();
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn get(&self, id: WindowId) -> Option<&WindowSessionData> {
        self.windows.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut WindowSessionData> {
        self.windows.get_mut(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.windows.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WindowId, &WindowSessionData)> {
        self.windows.iter().map(|(id, data)| (*id, data))
    }

    /// Advances every fade by `elapsed_ms`. Returns true while any level is
    /// still changing.
    pub fn tick(&mut self, elapsed_ms: u64, fade_duration_ms: u64, ctx: FadeContext) -> bool {
        let step = elapsed_ms as f64 / fade_duration_ms.max(1) as f64;
        let mut animating = false;
        for (id, data) in self.windows.iter_mut() {
            let opacity_target = if data.visible && !data.deleted { 1.0 } else { 0.0 };
            let highlight_target = if ctx.highlighted == Some(*id)
                || ctx.close_target == Some(*id)
                || ctx.deactivating
            {
                1.0
            } else if !ctx.windows_moving && data.desktop_background {
                0.3
            } else {
                0.0
            };
            animating |= approach(&mut data.opacity, opacity_target, step);
            animating |= approach(&mut data.highlight, highlight_target, step);
        }
        animating
    }

    /// Drains windows that finished fading out while holding a keep-alive
    /// reference. Callers release the reference and may drop the entry.
    pub fn take_faded_out(&mut self) -> Vec<WindowId> {
        let mut done = Vec::new();
        for (id, data) in self.windows.iter_mut() {
            if data.deleted && data.referenced && data.opacity <= 0.0 {
                data.referenced = false;
                done.push(*id);
            }
        }
        done
    }
}

/// Moves `value` toward `target` by at most `step`, clamped to [0, 1].
/// Returns true if it moved.
fn approach(value: &mut f64, target: f64, step: f64) -> bool {
    if *value == target {
        return false;
    }
    if *value < target {
        *value = (*value + step).min(target);
    } else {
        *value = (*value - step).max(target);
    }
    *value = value.clamp(0.0, 1.0);
    true
}
