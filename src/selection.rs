//! Window eligibility and keyboard navigation.
//!
//! Decides which windows participate in the overview for a given activation
//! mode, matches the incremental text filter, and walks the presented layout
//! directionally for arrow-key navigation.

use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::{Rect, RectF};
use crate::host::{WindowId, WindowInfo};

/// How the effect was summoned; fixes the candidate window set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationMode {
    CurrentDesktop,
    AllDesktops,
    SelectedDesktop(i32),
    WindowGroup(BTreeSet<WindowId>),
    WindowClass(String),
}

impl ActivationMode {
    fn accepts(&self, info: &WindowInfo, current_desktop: i32) -> bool {
        match self {
            ActivationMode::CurrentDesktop => info.desktop.matches(current_desktop),
            ActivationMode::AllDesktops => true,
            ActivationMode::SelectedDesktop(d) => info.desktop.matches(*d),
            ActivationMode::WindowGroup(ids) => ids.contains(&info.id),
            ActivationMode::WindowClass(class) => info.window_class == *class,
        }
    }
}

/// Whether `info` may be presented and selected under `mode`.
pub fn is_selectable(
    info: &WindowInfo,
    mode: &ActivationMode,
    current_desktop: i32,
    ignore_minimized: bool,
) -> bool {
    if !info.on_current_activity
        || info.special_window
        || info.utility
        || info.desktop_background
        || info.dock
        || !info.accepts_focus
        || info.skip_switcher
    {
        return false;
    }
    if ignore_minimized && info.minimized {
        return false;
    }
    mode.accepts(info, current_desktop)
}

/// Case-insensitive substring match over caption, class, and role. An empty
/// filter matches everything.
pub fn matches_filter(info: &WindowInfo, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }
    let needle = filter.to_lowercase();
    info.caption.to_lowercase().contains(&needle)
        || info.window_class.to_lowercase().contains(&needle)
        || info.window_role.to_lowercase().contains(&needle)
}

/// Scans the windows in order and keeps the one nearest the top-left; a
/// window beats the current best when either coordinate is smaller, so
/// later windows can win on one axis alone.
pub fn find_first_window<I>(windows: I) -> Option<WindowId>
where
    I: IntoIterator<Item = (WindowId, Rect)>,
{
    let mut best: Option<(WindowId, Rect)> = None;
    for (id, geometry) in windows {
        match best {
            None => best = Some((id, geometry)),
            Some((_, b)) => {
                if geometry.x < b.x || geometry.y < b.y {
                    best = Some((id, geometry));
                }
            }
        }
    }
    best.map(|(id, _)| id)
}

/// Walks `dx` windows horizontally and `dy` vertically from `current`
/// through the presented layout. A step moves to the nearest window whose
/// geometry overlaps a full-width (or full-height) strip through the current
/// one. With `wrap`, walking off an edge continues from the opposite side.
pub fn relative_window(
    presented: &BTreeMap<WindowId, RectF>,
    current: WindowId,
    dx: i32,
    dy: i32,
    wrap: bool,
    area: Rect,
) -> WindowId {
    let mut w = current;
    if !presented.contains_key(&w) {
        return w;
    }

    if dx != 0 {
        for _ in 0..dx.unsigned_abs() {
            let w_area = presented[&w];
            let strip = RectF::new(
                area.x as f64,
                w_area.y,
                area.width as f64,
                w_area.height,
            );
            let mut next: Option<(WindowId, RectF)> = None;
            for (&e, &e_area) in presented {
                if e == w || !e_area.intersects(strip) {
                    continue;
                }
                let candidate = if dx > 0 {
                    e_area.x > w_area.x && next.is_none_or(|(_, n)| e_area.x < n.x)
                } else {
                    e_area.right() < w_area.right()
                        && next.is_none_or(|(_, n)| e_area.right() > n.right())
                };
                if candidate {
                    next = Some((e, e_area));
                }
            }
            match next {
                Some((e, _)) => w = e,
                None => {
                    if wrap {
                        // walk all the way back to the opposite edge
                        let back = if dx > 0 { -1000 } else { 1000 };
                        return relative_window(presented, w, back, 0, false, area);
                    }
                    break;
                }
            }
        }
        return w;
    }

    if dy != 0 {
        for _ in 0..dy.unsigned_abs() {
            let w_area = presented[&w];
            let strip = RectF::new(
                w_area.x,
                area.y as f64,
                w_area.width,
                area.height as f64,
            );
            let mut next: Option<(WindowId, RectF)> = None;
            for (&e, &e_area) in presented {
                if e == w || !e_area.intersects(strip) {
                    continue;
                }
                let candidate = if dy > 0 {
                    e_area.y > w_area.y && next.is_none_or(|(_, n)| e_area.y < n.y)
                } else {
                    e_area.bottom() < w_area.bottom()
                        && next.is_none_or(|(_, n)| e_area.bottom() > n.bottom())
                };
                if candidate {
                    next = Some((e, e_area));
                }
            }
            match next {
                Some((e, _)) => w = e,
                None => {
                    if wrap {
                        let back = if dy > 0 { -1000 } else { 1000 };
                        return relative_window(presented, w, 0, back, false, area);
                    }
                    break;
                }
            }
        }
    }
    w
}
