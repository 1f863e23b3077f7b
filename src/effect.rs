//! Effect lifecycle controller and interaction machine.
//!
//! [`OverviewEffect`] owns everything while the overview is up: the window
//! snapshot, motion manager, session fades, highlight, text filter and drag
//! state. The host feeds it [`HostEvent`]s and elapsed-time ticks, drains
//! the [`HostCommand`] queue after each call, and asks for per-window render
//! attributes every frame.

use std::collections::BTreeMap;

use crate::config::{DesktopMouseAction, EffectConfig, LayoutMode, WindowMouseAction};
use crate::geometry::{Point, Rect, RectF};
use crate::host::{
    HostCommand, HostEvent, Key, MouseButton, Overlay, PropertyKind, RenderElement, Screen,
    WindowId, WindowInfo,
};
use crate::ipc::{self, DesktopRequest};
use crate::layout::{self, LayoutOptions};
use crate::motion::WindowMotionManager;
use crate::selection::{self, ActivationMode};
use crate::session::{FadeContext, SessionState, WindowSessionData};
use crate::timers::{TimerId, TimerQueue};

/// Pointer travel before a press turns into a drag.
const DRAG_THRESHOLD: i32 = 10;
/// Close affordance ignores clicks for this long after appearing.
const CLOSE_ARM_DELAY_MS: u64 = 300;
/// Edge of the close affordance square.
const CLOSE_BUTTON_SIZE: i32 = 32;
/// Edge of the drag-to-close drop target square.
const DROP_TARGET_SIZE: i32 = 80;
/// Resting highlight zoom is at least this factor.
const MIN_HIGHLIGHT_ZOOM: f64 = 1.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectState {
    Inactive,
    Activating,
    Active,
    Deactivating,
}

/// Cached grid dimensions per screen; re-layout is skipped while the
/// filtered window count still fits the cached grid exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridSize {
    pub columns: usize,
    pub rows: usize,
}

pub struct OverviewEffect {
    config: EffectConfig,
    screens: Vec<Screen>,
    desktop_count: i32,
    current_desktop: i32,

    windows: BTreeMap<WindowId, WindowInfo>,
    stacking: Vec<WindowId>,
    active_window: Option<WindowId>,

    state: EffectState,
    mode: ActivationMode,
    motion: WindowMotionManager,
    session: SessionState,
    timers: TimerQueue,
    commands: Vec<HostCommand>,

    filter: String,
    highlighted: Option<WindowId>,
    pointer: Point,
    pressed_window: Option<WindowId>,
    drag_window: Option<WindowId>,
    drag_start: Point,
    drag_in_progress: bool,
    close_button_armed: bool,

    /// Overlay captions and icons fade with this, independently of windows.
    decal_opacity: f64,
    grid_sizes: Vec<GridSize>,
    foreign_effect_active: bool,
    /// External window whose property writes control the effect.
    manager_window: Option<WindowId>,
}

impl OverviewEffect {
    pub fn new(config: EffectConfig, screens: Vec<Screen>, desktop_count: i32) -> Self {
        let grid_sizes = vec![GridSize::default(); screens.len()];
        Self {
            config,
            screens,
            desktop_count,
            current_desktop: 1,
            windows: BTreeMap::new(),
            stacking: Vec::new(),
            active_window: None,
            state: EffectState::Inactive,
            mode: ActivationMode::CurrentDesktop,
            motion: WindowMotionManager::new(),
            session: SessionState::new(),
            timers: TimerQueue::new(),
            commands: Vec::new(),
            filter: String::new(),
            highlighted: None,
            pointer: Point::default(),
            pressed_window: None,
            drag_window: None,
            drag_start: Point::default(),
            drag_in_progress: false,
            close_button_armed: false,
            decal_opacity: 0.0,
            grid_sizes,
            foreign_effect_active: false,
            manager_window: None,
        }
    }

    pub fn state(&self) -> EffectState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != EffectState::Inactive
    }

    pub fn highlighted_window(&self) -> Option<WindowId> {
        self.highlighted
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn activation_mode(&self) -> &ActivationMode {
        &self.mode
    }

    /// Queued commands since the last drain, oldest first.
    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    // ---- entry points -----------------------------------------------------

    /// Hotkey entry: starts the overview in `mode`, or winds it down when it
    /// is already up.
    pub fn toggle(&mut self, mode: ActivationMode) {
        match self.state {
            EffectState::Inactive | EffectState::Deactivating => self.activate(mode),
            EffectState::Activating | EffectState::Active => self.deactivate(),
        }
    }

    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::WindowAdded(info) => self.window_added(info),
            HostEvent::WindowClosed(id) => self.window_closed(id),
            HostEvent::WindowDestroyed(id) => self.window_destroyed(id),
            HostEvent::WindowGeometryChanged { window, geometry } => {
                if let Some(info) = self.windows.get_mut(&window) {
                    info.geometry = geometry;
                }
            }
            HostEvent::WindowActivated(id) => self.active_window = id,
            HostEvent::DesktopChanged(desktop) => self.current_desktop = desktop,
            HostEvent::PropertyChanged {
                window,
                property,
                data,
            } => self.property_changed(window, property, &data),
            HostEvent::PointerMoved(position) => self.pointer_moved(position),
            HostEvent::ButtonPressed { button, position } => self.button_pressed(button, position),
            HostEvent::ButtonReleased { button, position } => {
                self.button_released(button, position)
            }
            HostEvent::KeyPressed { key, auto_repeat } => self.key_pressed(key, auto_repeat),
            HostEvent::BorderActivated(edge) => {
                if self.config.border_activate.contains(&edge) {
                    self.toggle(ActivationMode::CurrentDesktop);
                } else if self.config.border_activate_all.contains(&edge) {
                    self.toggle(ActivationMode::AllDesktops);
                } else if self.config.border_activate_class.contains(&edge) {
                    let class = self
                        .active_window
                        .and_then(|id| self.windows.get(&id))
                        .map(|info| info.window_class.clone());
                    if let Some(class) = class {
                        self.toggle(ActivationMode::WindowClass(class));
                    }
                }
            }
            HostEvent::ForeignEffectActive(active) => self.foreign_effect_active = active,
        }
    }

    /// Advances motion, fades, and timers by `elapsed_ms`.
    pub fn advance(&mut self, elapsed_ms: u64) {
        if self.state == EffectState::Inactive {
            return;
        }
        for timer in self.timers.advance(elapsed_ms) {
            if timer == TimerId::CloseButtonArm {
                self.close_button_armed = true;
            }
        }

        let moving = self.motion.calculate(elapsed_ms);
        let ctx = FadeContext {
            highlighted: self.highlighted,
            close_target: if self.drag_in_progress {
                self.drag_window
            } else {
                None
            },
            deactivating: self.state == EffectState::Deactivating,
            windows_moving: moving,
        };
        let fading = self
            .session
            .tick(elapsed_ms, self.config.fade_duration_ms, ctx);

        let decal_target = if self.state == EffectState::Deactivating {
            0.0
        } else {
            1.0
        };
        let decal_step = elapsed_ms as f64 / self.config.fade_duration_ms.max(1) as f64;
        if self.decal_opacity < decal_target {
            self.decal_opacity = (self.decal_opacity + decal_step).min(decal_target);
        } else if self.decal_opacity > decal_target {
            self.decal_opacity = (self.decal_opacity - decal_step).max(decal_target);
        }

        // release windows that finished their fade-out
        for id in self.session.take_faded_out() {
            self.commands.push(HostCommand::UnrefWindow(id));
            self.session.remove(id);
            self.motion.unmanage(id);
            self.windows.remove(&id);
            self.stacking.retain(|w| *w != id);
        }

        if self.state == EffectState::Activating && self.decal_opacity >= 1.0 {
            self.state = EffectState::Active;
            tracing::debug!("overview active");
        }
        if self.state == EffectState::Deactivating
            && !moving
            && !fading
            && self.decal_opacity <= 0.0
        {
            self.finish_deactivation();
        }

        if moving || fading {
            self.commands.push(HostCommand::RepaintFull);
        }
    }

    // ---- activation lifecycle ---------------------------------------------

    fn activate(&mut self, mode: ActivationMode) {
        if self.foreign_effect_active {
            tracing::debug!("activation ignored, another full-screen effect is up");
            return;
        }
        let resuming = self.state == EffectState::Deactivating;
        let eligible = self.selectable_ids_in(&mode);
        if eligible.is_empty() {
            return;
        }
        if eligible.len() == 1
            && let Some(info) = self.windows.get(&eligible[0])
            && info.desktop.matches(self.current_desktop)
            && (self.config.ignore_minimized || !info.minimized)
        {
            // a lone window already where the user can see it
            return;
        }
        self.mode = mode;

        tracing::debug!(windows = eligible.len(), "overview activating");
        self.state = EffectState::Activating;
        self.decal_opacity = 0.0;
        self.filter.clear();
        self.grid_sizes = vec![GridSize::default(); self.screens.len()];

        if !resuming {
            // snapshot the stacking order into session state
            for &id in &self.stacking {
                let Some(info) = self.windows.get(&id) else {
                    continue;
                };
                let opacity = if info.desktop.matches(self.current_desktop) && !info.minimized {
                    1.0
                } else {
                    0.0
                };
                self.session.add(
                    id,
                    WindowSessionData {
                        visible: self.window_visible(info),
                        deleted: false,
                        referenced: false,
                        opacity,
                        highlight: 0.0,
                        caption: info.caption.clone(),
                        icon: info.icon.clone(),
                        desktop_background: info.desktop_background,
                    },
                );
            }
            for &id in &eligible {
                if let Some(info) = self.windows.get(&id) {
                    let geometry = info.geometry;
                    self.motion.manage(id, geometry);
                }
            }
            self.commands.push(HostCommand::SetFullScreenEffect(true));
        }
        // a resumed activation re-grabs what deactivation released
        self.commands.push(HostCommand::CreateInputCapture);
        self.commands.push(HostCommand::GrabKeyboard);

        self.rearrange();
        let start = self
            .active_window
            .filter(|id| eligible.contains(id))
            .or_else(|| self.first_presented_window());
        self.set_highlighted(start);
        self.commands.push(HostCommand::RepaintFull);
    }

    fn deactivate(&mut self) {
        if matches!(self.state, EffectState::Inactive | EffectState::Deactivating) {
            return;
        }
        tracing::debug!("overview deactivating");
        self.state = EffectState::Deactivating;
        self.filter.clear();
        self.set_highlighted(None);
        self.pressed_window = None;
        self.drag_window = None;
        self.drag_in_progress = false;
        self.timers.clear();
        self.close_button_armed = false;

        // everything glides back to where it really lives
        for id in self.motion.managed_windows() {
            if let Some(info) = self.windows.get(&id) {
                let target = RectF::from(info.geometry);
                self.motion.move_window(id, target);
            }
        }
        for id in self.session.ids().collect::<Vec<_>>() {
            if let Some(data) = self.session.get_mut(id) {
                data.visible = !data.deleted;
            }
        }

        self.commands.push(HostCommand::DestroyInputCapture);
        self.commands.push(HostCommand::ReleaseKeyboard);
        if let Some(manager) = self.manager_window.take() {
            self.commands.push(HostCommand::DeleteProperty {
                window: manager,
                property: PropertyKind::DesktopTarget,
            });
            self.commands.push(HostCommand::DeleteProperty {
                window: manager,
                property: PropertyKind::WindowGroup,
            });
        }
        self.commands.push(HostCommand::RepaintFull);
    }

    fn finish_deactivation(&mut self) {
        for id in self.session.ids().collect::<Vec<_>>() {
            if let Some(data) = self.session.get(id)
                && data.referenced
            {
                self.commands.push(HostCommand::UnrefWindow(id));
            }
        }
        self.session.clear();
        self.motion.unmanage_all();
        self.commands.push(HostCommand::SetFullScreenEffect(false));
        self.state = EffectState::Inactive;
        tracing::debug!("overview inactive");
    }

    // ---- window bookkeeping -----------------------------------------------

    fn window_added(&mut self, info: WindowInfo) {
        let id = info.id;
        self.stacking.push(id);
        let selectable = selection::is_selectable(
            &info,
            &self.mode,
            self.current_desktop,
            self.config.ignore_minimized,
        );
        let visible = self.window_visible(&info);
        let desktop_background = info.desktop_background;
        let caption = info.caption.clone();
        let icon = info.icon.clone();
        let geometry = info.geometry;
        self.windows.insert(id, info);

        if !self.is_active() || self.state == EffectState::Deactivating {
            return;
        }
        self.session.add(
            id,
            WindowSessionData {
                visible,
                deleted: false,
                referenced: false,
                opacity: 0.0,
                highlight: 0.0,
                caption,
                icon,
                desktop_background,
            },
        );
        if selectable {
            self.motion.manage(id, geometry);
            self.rearrange();
        }
        self.commands.push(HostCommand::RepaintFull);
    }

    fn window_closed(&mut self, id: WindowId) {
        if !self.is_active() {
            return;
        }
        if self.session.window_closed(id) {
            self.commands.push(HostCommand::RefWindow(id));
        }
        if self.manager_window == Some(id) {
            self.manager_window = None;
        }
        if self.drag_window == Some(id) {
            self.drag_window = None;
            self.drag_in_progress = false;
        }
        if self.pressed_window == Some(id) {
            self.pressed_window = None;
        }
        if self.highlighted == Some(id) {
            let next = self.first_presented_window();
            self.set_highlighted(next);
        }

        if self.state != EffectState::Deactivating && self.selectable_ids().is_empty() {
            // nothing left to present
            self.deactivate();
            return;
        }
        self.rearrange();
        self.commands.push(HostCommand::RepaintFull);
    }

    fn window_destroyed(&mut self, id: WindowId) {
        if let Some(data) = self.session.get(id)
            && data.referenced
        {
            self.commands.push(HostCommand::UnrefWindow(id));
        }
        self.session.remove(id);
        self.motion.unmanage(id);
        self.windows.remove(&id);
        self.stacking.retain(|w| *w != id);
        if self.highlighted == Some(id) {
            let next = self.first_presented_window();
            self.set_highlighted(next);
        }
    }

    /// Selectable, not-yet-closed windows under `mode`, ignoring the text
    /// filter.
    fn selectable_ids_in(&self, mode: &ActivationMode) -> Vec<WindowId> {
        self.windows
            .values()
            .filter(|info| {
                !self.session.get(info.id).is_some_and(|d| d.deleted)
                    && selection::is_selectable(
                        info,
                        mode,
                        self.current_desktop,
                        self.config.ignore_minimized,
                    )
            })
            .map(|info| info.id)
            .collect()
    }

    fn selectable_ids(&self) -> Vec<WindowId> {
        self.selectable_ids_in(&self.mode)
    }

    /// Selectable windows that also pass the text filter.
    fn presented_ids(&self) -> Vec<WindowId> {
        self.selectable_ids()
            .into_iter()
            .filter(|id| {
                self.windows
                    .get(id)
                    .is_some_and(|info| selection::matches_filter(info, &self.filter))
            })
            .collect()
    }

    fn window_visible(&self, info: &WindowInfo) -> bool {
        info.desktop_background
            || info.dock
            || (selection::is_selectable(
                info,
                &self.mode,
                self.current_desktop,
                self.config.ignore_minimized,
            ) && selection::matches_filter(info, &self.filter))
    }

    fn first_presented_window(&self) -> Option<WindowId> {
        selection::find_first_window(
            self.presented_ids()
                .into_iter()
                .filter_map(|id| self.windows.get(&id).map(|info| (id, info.geometry))),
        )
    }

    fn last_presented_window(&self) -> Option<WindowId> {
        let mut best: Option<(WindowId, Rect)> = None;
        for id in self.presented_ids() {
            let Some(info) = self.windows.get(&id) else {
                continue;
            };
            match best {
                None => best = Some((id, info.geometry)),
                Some((_, b)) => {
                    if info.geometry.x > b.x || info.geometry.y > b.y {
                        best = Some((id, info.geometry));
                    }
                }
            }
        }
        best.map(|(id, _)| id)
    }

    // ---- layout ------------------------------------------------------------

    /// Recomputes targets for every presented window, per screen.
    fn rearrange(&mut self) {
        let presented = self.presented_ids();

        // refresh visibility so filtered-out windows fade away
        for id in self.session.ids().collect::<Vec<_>>() {
            let visible = self
                .windows
                .get(&id)
                .map(|info| self.window_visible(info))
                .unwrap_or(false);
            if let Some(data) = self.session.get_mut(id) {
                if !data.deleted {
                    data.visible = visible;
                }
            }
        }

        if presented.is_empty() {
            self.set_highlighted(None);
            return;
        }
        if let Some(current) = self.highlighted
            && !presented.contains(&current)
        {
            let next = self.first_presented_window();
            self.set_highlighted(next);
        }

        for screen_index in 0..self.screens.len() {
            let screen = self.screens[screen_index];
            let area = if self.config.show_panel {
                screen.usable_area
            } else {
                screen.area
            };
            let mut on_screen: Vec<(WindowId, Rect)> = presented
                .iter()
                .filter_map(|id| self.windows.get(id))
                .filter(|info| info.screen.min(self.screens.len() - 1) == screen_index)
                .map(|info| (info.id, info.geometry))
                .collect();
            if on_screen.is_empty() {
                continue;
            }
            on_screen.sort_by_key(|(id, _)| *id);

            if self.config.layout_mode == LayoutMode::RegularGrid {
                let cached = self.grid_sizes[screen_index];
                let count = on_screen.len();
                let fits = count < cached.columns * cached.rows
                    && count > cached.columns.saturating_sub(1) * cached.rows
                    && count > cached.columns * cached.rows.saturating_sub(1);
                if fits {
                    // the count only shrank within the same grid, keep
                    // everything where it is
                    continue;
                }
                let (columns, rows) = layout::grid::grid_size(count);
                self.grid_sizes[screen_index] = GridSize { columns, rows };
            }

            let targets = layout::arrange(
                self.config.layout_mode,
                &on_screen,
                area,
                LayoutOptions {
                    accuracy: self.config.accuracy,
                    fill_gaps: self.config.fill_gaps,
                },
            );
            for (id, target) in targets {
                if !self.motion.is_managing(id)
                    && let Some(info) = self.windows.get(&id)
                {
                    let geometry = info.geometry;
                    self.motion.manage(id, geometry);
                }
                self.motion.move_window(id, RectF::from(target));
            }
        }
    }

    // ---- IPC ---------------------------------------------------------------

    fn property_changed(&mut self, window: WindowId, property: PropertyKind, data: &[u8]) {
        if data.is_empty() {
            // property removed
            if self.is_active() && self.manager_window.is_none_or(|m| m == window) {
                self.deactivate();
            }
            return;
        }
        match property {
            PropertyKind::DesktopTarget => {
                match ipc::parse_desktop_request(data, self.desktop_count) {
                    Ok(DesktopRequest::Deactivate) => {
                        if self.is_active() {
                            self.deactivate();
                        }
                    }
                    Ok(request) => {
                        if self.is_active() {
                            return;
                        }
                        self.manager_window = Some(window);
                        match request {
                            DesktopRequest::AllDesktops => {
                                self.activate(ActivationMode::AllDesktops)
                            }
                            DesktopRequest::Desktop(d) => {
                                self.activate(ActivationMode::SelectedDesktop(d))
                            }
                            DesktopRequest::Deactivate => unreachable!(),
                        }
                    }
                    Err(err) => {
                        tracing::warn!(%window, %err, "rejected desktop property");
                    }
                }
            }
            PropertyKind::WindowGroup => match ipc::parse_window_group(data) {
                Ok(ids) => {
                    if ids.is_empty() {
                        if self.is_active() {
                            self.deactivate();
                        }
                        return;
                    }
                    if self.is_active() {
                        return;
                    }
                    let mut group = std::collections::BTreeSet::new();
                    for id in ids {
                        if self.windows.contains_key(&id) {
                            group.insert(id);
                        } else {
                            tracing::warn!(%id, "skipping unknown window in group property");
                        }
                    }
                    if group.is_empty() {
                        return;
                    }
                    self.manager_window = Some(window);
                    self.activate(ActivationMode::WindowGroup(group));
                }
                Err(err) => {
                    tracing::warn!(%window, %err, "rejected window group property");
                }
            },
        }
    }

    // ---- pointer and keyboard ---------------------------------------------

    fn pointer_moved(&mut self, position: Point) {
        self.pointer = position;
        if self.state != EffectState::Active && self.state != EffectState::Activating {
            return;
        }
        if let Some(window) = self.drag_window {
            if !self.drag_in_progress
                && (position - self.drag_start).manhattan_length() > DRAG_THRESHOLD
            {
                self.drag_in_progress = true;
                self.commands.push(HostCommand::ElevateWindow {
                    window,
                    elevated: true,
                });
            }
            self.commands.push(HostCommand::RepaintFull);
            return;
        }
        let hovered = self.window_at(position);
        if hovered != self.highlighted && hovered.is_some() {
            self.set_highlighted(hovered);
        }
    }

    fn button_pressed(&mut self, button: MouseButton, position: Point) {
        if self.state != EffectState::Active && self.state != EffectState::Activating {
            return;
        }
        let target = self.window_at(position);
        self.pressed_window = target;
        if button == MouseButton::Left
            && self.config.drag_to_close
            && let Some(window) = target
        {
            self.drag_window = Some(window);
            self.drag_start = position;
            self.drag_in_progress = false;
        }
    }

    fn button_released(&mut self, button: MouseButton, position: Point) {
        if self.state != EffectState::Active && self.state != EffectState::Activating {
            return;
        }
        if self.drag_in_progress {
            let window = self.drag_window.take();
            self.drag_in_progress = false;
            self.pressed_window = None;
            if let Some(window) = window {
                self.commands.push(HostCommand::ElevateWindow {
                    window,
                    elevated: false,
                });
                let dropped = self
                    .drop_target_rects()
                    .iter()
                    .any(|rect| rect.contains_point(position));
                if dropped {
                    self.commands.push(HostCommand::CloseWindow(window));
                } else if let Some(info) = self.windows.get(&window) {
                    // snap back into the layout
                    tracing::debug!(window = %info.id, "drag cancelled");
                }
                self.commands.push(HostCommand::RepaintFull);
            }
            return;
        }
        self.drag_window = None;

        // click on the close affordance of the highlighted window
        if button == MouseButton::Left
            && self.close_button_armed
            && let Some(rect) = self.close_button_rect()
            && rect.contains_point(position)
        {
            if let Some(window) = self.highlighted {
                self.commands.push(HostCommand::CloseWindow(window));
            }
            self.pressed_window = None;
            return;
        }

        let target = self.window_at(position);
        let pressed = self.pressed_window.take();
        if let Some(window) = target {
            if pressed == Some(window) {
                let action = match button {
                    MouseButton::Left => self.config.left_button_window,
                    MouseButton::Middle => self.config.middle_button_window,
                    MouseButton::Right => self.config.right_button_window,
                };
                self.apply_window_action(window, action);
            }
        } else {
            let action = match button {
                MouseButton::Left => self.config.left_button_desktop,
                MouseButton::Middle => self.config.middle_button_desktop,
                MouseButton::Right => self.config.right_button_desktop,
            };
            self.apply_desktop_action(action);
        }
    }

    fn apply_window_action(&mut self, window: WindowId, action: WindowMouseAction) {
        match action {
            WindowMouseAction::Activate => {
                self.commands.push(HostCommand::ActivateWindow(window));
                self.deactivate();
            }
            WindowMouseAction::Exit => self.deactivate(),
            WindowMouseAction::ToCurrentDesktop => {
                self.commands.push(HostCommand::SendToDesktop {
                    window,
                    desktop: crate::host::DesktopAssignment::Desktop(self.current_desktop),
                });
            }
            WindowMouseAction::ToAllDesktops => {
                self.commands.push(HostCommand::SendToDesktop {
                    window,
                    desktop: crate::host::DesktopAssignment::All,
                });
            }
            WindowMouseAction::Minimize => {
                let minimized = self
                    .windows
                    .get(&window)
                    .map(|info| info.minimized)
                    .unwrap_or(false);
                if minimized {
                    self.commands.push(HostCommand::UnminimizeWindow(window));
                } else {
                    self.commands.push(HostCommand::MinimizeWindow(window));
                }
            }
            WindowMouseAction::Close => {
                self.commands.push(HostCommand::CloseWindow(window));
            }
            WindowMouseAction::NoAction => {}
        }
    }

    fn apply_desktop_action(&mut self, action: DesktopMouseAction) {
        match action {
            DesktopMouseAction::Exit => self.deactivate(),
            DesktopMouseAction::ShowDesktop => {
                self.commands.push(HostCommand::ShowDesktop);
                self.deactivate();
            }
            DesktopMouseAction::NoAction => {}
        }
    }

    fn key_pressed(&mut self, key: Key, auto_repeat: bool) {
        if self.state != EffectState::Active && self.state != EffectState::Activating {
            return;
        }
        match key {
            Key::Escape => self.deactivate(),
            Key::Return => {
                if auto_repeat {
                    return;
                }
                if let Some(window) = self.highlighted {
                    self.commands.push(HostCommand::ActivateWindow(window));
                    self.deactivate();
                }
            }
            Key::Left => self.step_highlight(-1, 0),
            Key::Right | Key::Tab => self.step_highlight(1, 0),
            Key::Up => self.step_highlight(0, -1),
            Key::Down => self.step_highlight(0, 1),
            Key::Home => {
                let first = self.first_presented_window();
                self.set_highlighted(first);
            }
            Key::End => {
                let last = self.last_presented_window();
                self.set_highlighted(last);
            }
            Key::Backspace => {
                if self.filter.pop().is_some() {
                    self.rearrange();
                    self.commands.push(HostCommand::RepaintFull);
                }
            }
            Key::Delete => {
                if !self.filter.is_empty() {
                    self.filter.clear();
                    self.rearrange();
                    self.commands.push(HostCommand::RepaintFull);
                }
            }
            Key::Char(c) => {
                if !c.is_control() {
                    self.filter.push(c);
                    self.rearrange();
                    self.commands.push(HostCommand::RepaintFull);
                }
            }
            Key::PageUp | Key::PageDown => {}
        }
    }

    fn step_highlight(&mut self, dx: i32, dy: i32) {
        let Some(current) = self.highlighted.or_else(|| self.first_presented_window()) else {
            return;
        };
        let presented: BTreeMap<WindowId, RectF> = self
            .presented_ids()
            .into_iter()
            .filter_map(|id| self.motion.target_geometry(id).map(|rect| (id, rect)))
            .collect();
        let area = self.full_area();
        let next = selection::relative_window(&presented, current, dx, dy, true, area);
        self.set_highlighted(Some(next));
    }

    // ---- highlight, hit testing, render -----------------------------------

    fn set_highlighted(&mut self, window: Option<WindowId>) {
        if window == self.highlighted {
            return;
        }
        if let Some(old) = self.highlighted {
            self.commands.push(HostCommand::ElevateWindow {
                window: old,
                elevated: false,
            });
        }
        self.highlighted = window;
        self.timers.cancel(TimerId::CloseButtonArm);
        self.close_button_armed = false;
        if let Some(new) = window {
            self.commands.push(HostCommand::ElevateWindow {
                window: new,
                elevated: true,
            });
            if self.config.allow_closing {
                self.timers.schedule(TimerId::CloseButtonArm, CLOSE_ARM_DELAY_MS);
            }
        }
        self.commands.push(HostCommand::RepaintFull);
    }

    /// Topmost presented window under `position`, by painted geometry.
    /// Desktop backgrounds and docks never count; a click on them is a
    /// desktop click.
    fn window_at(&self, position: Point) -> Option<WindowId> {
        for &id in self.stacking.iter().rev() {
            if !self.motion.is_managing(id) {
                continue;
            }
            let Some(data) = self.session.get(id) else {
                continue;
            };
            if !data.visible || data.deleted {
                continue;
            }
            let Some(rect) = self.motion.transformed_geometry(id) else {
                continue;
            };
            if rect.contains_point(position) {
                return Some(id);
            }
        }
        None
    }

    /// Close affordance rectangle on the highlighted window; hidden while
    /// the window is painted too small to miss-click safely.
    pub fn close_button_rect(&self) -> Option<Rect> {
        if !self.config.allow_closing {
            return None;
        }
        let window = self.highlighted?;
        let rect = self.motion.transformed_geometry(window)?.to_rect();
        if rect.width < 2 * CLOSE_BUTTON_SIZE || rect.height < 2 * CLOSE_BUTTON_SIZE {
            return None;
        }
        Some(Rect::new(
            rect.right() - CLOSE_BUTTON_SIZE,
            rect.y,
            CLOSE_BUTTON_SIZE,
            CLOSE_BUTTON_SIZE,
        ))
    }

    /// Drop target rectangles, one per screen, at the top center.
    pub fn drop_target_rects(&self) -> Vec<Rect> {
        if !self.config.drag_to_close || !self.is_active() {
            return Vec::new();
        }
        self.screens
            .iter()
            .map(|screen| {
                let center = screen.area.center();
                Rect::new(
                    center.x - DROP_TARGET_SIZE / 2,
                    screen.area.y + DROP_TARGET_SIZE / 2,
                    DROP_TARGET_SIZE,
                    DROP_TARGET_SIZE,
                )
            })
            .collect()
    }

    fn full_area(&self) -> Rect {
        let mut area = self
            .screens
            .first()
            .map(|s| s.area)
            .unwrap_or(Rect::new(0, 0, 0, 0));
        for screen in &self.screens[1.min(self.screens.len())..] {
            area = area.united(screen.area);
        }
        area
    }

    fn screen_area_for(&self, info: &WindowInfo) -> Rect {
        self.screens
            .get(info.screen)
            .or_else(|| self.screens.first())
            .map(|s| s.area)
            .unwrap_or(Rect::new(0, 0, 0, 0))
    }

    /// Grows `rect` toward the highlight zoom size, clamped into `area`.
    fn zoomed_rect(&self, rect: RectF, area: Rect, highlight: f64) -> RectF {
        if rect.width <= 0.0 || rect.height <= 0.0 || highlight <= 0.0 {
            return rect;
        }
        let mut zoom = ((area.width as f64 * area.height as f64)
            / (16.0 * rect.width * rect.height))
            .sqrt()
            .max(MIN_HIGHLIGHT_ZOOM);
        zoom = zoom
            .min(area.width as f64 / rect.width)
            .min(area.height as f64 / rect.height);
        let scale = 1.0 + (zoom - 1.0) * highlight;
        let (cx, cy) = rect.center();
        let width = rect.width * scale;
        let height = rect.height * scale;
        let mut zoomed = RectF::new(cx - width / 2.0, cy - height / 2.0, width, height);
        if zoomed.x < area.x as f64 {
            zoomed.x = area.x as f64;
        }
        if zoomed.right() > area.right() as f64 {
            zoomed.x = area.right() as f64 - zoomed.width;
        }
        if zoomed.y < area.y as f64 {
            zoomed.y = area.y as f64;
        }
        if zoomed.bottom() > area.bottom() as f64 {
            zoomed.y = area.bottom() as f64 - zoomed.height;
        }
        zoomed
    }

    /// Per-window paint attributes for this frame, bottom to top.
    pub fn render_elements(&self) -> Vec<RenderElement> {
        let mut elements = Vec::new();
        if self.state == EffectState::Inactive {
            return elements;
        }
        for &id in &self.stacking {
            let Some(data) = self.session.get(id) else {
                continue;
            };
            if data.opacity <= 0.0 && !data.visible {
                continue;
            }
            let Some(info) = self.windows.get(&id) else {
                continue;
            };
            let mut rect = self
                .motion
                .transformed_geometry(id)
                .unwrap_or_else(|| RectF::from(info.geometry));
            if self.drag_in_progress && self.drag_window == Some(id) {
                let offset = self.pointer - self.drag_start;
                rect.x += offset.x as f64;
                rect.y += offset.y as f64;
            } else if self.highlighted == Some(id) && data.highlight > 0.0 {
                rect = self.zoomed_rect(rect, self.screen_area_for(info), data.highlight);
            }

            let brightness = 0.40 + (1.0 - 0.40) * data.highlight;
            let decals = self.motion.is_managing(id) && !data.deleted;
            let overlay_opacity = self.decal_opacity * data.opacity;
            let caption = (decals && self.config.show_captions && !data.caption.is_empty()).then(
                || {
                    let center = rect.to_rect().center();
                    Overlay {
                        position: center,
                        content: data.caption.clone(),
                        opacity: overlay_opacity,
                    }
                },
            );
            let icon = (decals && self.config.show_icons && !data.icon.is_empty()).then(|| {
                let r = rect.to_rect();
                Overlay {
                    // pinned just inside the bottom-right corner
                    position: Point::new(
                        r.x + (r.width as f64 * 0.95) as i32,
                        r.y + (r.height as f64 * 0.95) as i32,
                    ),
                    content: data.icon.clone(),
                    opacity: overlay_opacity,
                }
            });

            elements.push(RenderElement {
                window: id,
                rect: rect.to_rect(),
                opacity: data.opacity,
                brightness,
                elevated: self.highlighted == Some(id)
                    || (self.drag_in_progress && self.drag_window == Some(id)),
                caption,
                icon,
            });
        }
        elements
    }
}
