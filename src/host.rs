//! The host-compositor collaborator surface.
//!
//! The effect never talks to a real compositor. The host delivers discrete
//! [`HostEvent`]s into the controller's single entry point and drains
//! [`HostCommand`]s back out; per-frame render state is queried as a list of
//! [`RenderElement`]s. Everything the effect knows about a window lives in
//! the [`WindowInfo`] snapshot the host keeps current through events.

use std::fmt;

use crate::geometry::{Point, Rect};

/// Opaque handle for a host-managed window. The host owns the window; this
/// crate only keys maps with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

/// Which desktop(s) a window occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopAssignment {
    All,
    Desktop(i32),
}

impl DesktopAssignment {
    pub fn matches(self, desktop: i32) -> bool {
        match self {
            DesktopAssignment::All => true,
            DesktopAssignment::Desktop(d) => d == desktop,
        }
    }
}

/// Host-side window snapshot. Flags mirror what a compositor knows about a
/// client; the effect only reads them through the eligibility predicates.
#[derive(Debug, Clone)]
pub struct WindowInfo {
    pub id: WindowId,
    pub geometry: Rect,
    pub caption: String,
    pub window_class: String,
    pub window_role: String,
    pub icon: String,
    pub desktop: DesktopAssignment,
    pub screen: usize,
    pub minimized: bool,
    pub special_window: bool,
    pub utility: bool,
    pub accepts_focus: bool,
    pub skip_switcher: bool,
    pub desktop_background: bool,
    pub dock: bool,
    pub on_current_activity: bool,
}

impl WindowInfo {
    /// A plain, focusable client window; tests and the demo driver start
    /// from this and override individual fields.
    pub fn client(id: WindowId, geometry: Rect) -> Self {
        Self {
            id,
            geometry,
            caption: String::new(),
            window_class: String::new(),
            window_role: String::new(),
            icon: String::new(),
            desktop: DesktopAssignment::Desktop(1),
            screen: 0,
            minimized: false,
            special_window: false,
            utility: false,
            accepts_focus: true,
            skip_switcher: false,
            desktop_background: false,
            dock: false,
            on_current_activity: true,
        }
    }
}

/// One logical output. `usable_area` excludes space reserved for panels;
/// solvers lay windows out inside it when the panel is kept visible.
#[derive(Debug, Clone, Copy)]
pub struct Screen {
    pub area: Rect,
    pub usable_area: Rect,
}

impl Screen {
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            usable_area: area,
        }
    }

    pub fn with_panel(area: Rect, usable_area: Rect) -> Self {
        Self { area, usable_area }
    }
}

/// The two window properties used as the external control protocol. The
/// payloads are decoded in [`crate::ipc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Carries a single target desktop number.
    DesktopTarget,
    /// Carries a list of window identifiers.
    WindowGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Keys the grabbed-keyboard handler distinguishes. Printable input arrives
/// as `Char` and feeds the window filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Backspace,
    Delete,
    Escape,
    Return,
    Tab,
    Char(char),
}

/// Screen edges that can be reserved as activation zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenEdge {
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    TopLeft,
}

/// Everything the host can tell the effect, delivered through
/// [`crate::effect::OverviewEffect::handle_event`]. No observer graph; one
/// entry point.
#[derive(Debug, Clone)]
pub enum HostEvent {
    WindowAdded(WindowInfo),
    /// The window is going away; it may still be painted while fading.
    WindowClosed(WindowId),
    /// The window is gone for good.
    WindowDestroyed(WindowId),
    WindowGeometryChanged {
        window: WindowId,
        geometry: Rect,
    },
    WindowActivated(Option<WindowId>),
    DesktopChanged(i32),
    /// A control property on some window changed. Empty `data` means the
    /// property was removed.
    PropertyChanged {
        window: WindowId,
        property: PropertyKind,
        data: Vec<u8>,
    },
    PointerMoved(Point),
    ButtonPressed {
        button: MouseButton,
        position: Point,
    },
    ButtonReleased {
        button: MouseButton,
        position: Point,
    },
    KeyPressed {
        key: Key,
        auto_repeat: bool,
    },
    BorderActivated(ScreenEdge),
    /// Another full-screen effect took or released the stage. Activation is
    /// exclusive across the host's effect registry.
    ForeignEffectActive(bool),
}

/// Commands the effect issues back to the host. The host drains these via
/// [`crate::effect::OverviewEffect::drain_commands`] after each call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    ActivateWindow(WindowId),
    CloseWindow(WindowId),
    MinimizeWindow(WindowId),
    UnminimizeWindow(WindowId),
    SendToDesktop {
        window: WindowId,
        desktop: DesktopAssignment,
    },
    ShowDesktop,
    GrabKeyboard,
    ReleaseKeyboard,
    CreateInputCapture,
    DestroyInputCapture,
    SetFullScreenEffect(bool),
    RepaintFull,
    Repaint(Rect),
    /// Keep the window's pixmap alive while its fade-out runs.
    RefWindow(WindowId),
    UnrefWindow(WindowId),
    ElevateWindow {
        window: WindowId,
        elevated: bool,
    },
    DeleteProperty {
        window: WindowId,
        property: PropertyKind,
    },
}

/// Overlay text or icon anchored somewhere on a presented window.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub position: Point,
    pub content: String,
    pub opacity: f64,
}

/// Per-window render attributes for one frame, in stacking order.
#[derive(Debug, Clone)]
pub struct RenderElement {
    pub window: WindowId,
    pub rect: Rect,
    pub opacity: f64,
    pub brightness: f64,
    pub elevated: bool,
    pub caption: Option<Overlay>,
    pub icon: Option<Overlay>,
}
