//! Effect configuration.
//!
//! An [`EffectConfig`] is built once (from defaults, or deserialized from a
//! JSON document by the demo driver) and handed to the controller at
//! construction. Defaults follow the classic overview-effect settings.

use serde::Deserialize;

use crate::host::ScreenEdge;

/// Which solver arranges the windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    /// Closest-slot regular grid.
    RegularGrid,
    /// Aspect-driven flexible grid with width borrowing.
    FlexibleGrid,
    /// Force-directed declutter starting from current positions.
    #[default]
    Natural,
}

/// What a mouse button does when released over a presented window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowMouseAction {
    /// Activate the window and end the effect.
    #[default]
    Activate,
    /// End the effect without changing activation.
    Exit,
    ToCurrentDesktop,
    ToAllDesktops,
    Minimize,
    Close,
    #[serde(rename = "none")]
    NoAction,
}

/// What a mouse button does when released over empty desktop space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DesktopMouseAction {
    #[default]
    Exit,
    ShowDesktop,
    #[serde(rename = "none")]
    NoAction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EffectConfig {
    pub layout_mode: LayoutMode,
    /// Show window captions over the presented windows.
    pub show_captions: bool,
    /// Show window icons over the presented windows.
    pub show_icons: bool,
    /// Offer a close affordance on the highlighted window.
    pub allow_closing: bool,
    /// Exclude minimized windows from the overview.
    pub ignore_minimized: bool,
    /// Relaxation step for the natural solver, in pixels.
    pub accuracy: i32,
    /// Grow windows into leftover space after the natural solver settles.
    pub fill_gaps: bool,
    /// Fade and motion ramp duration in milliseconds.
    pub fade_duration_ms: u64,
    /// Keep panel-reserved screen area free when arranging.
    pub show_panel: bool,
    pub left_button_window: WindowMouseAction,
    pub middle_button_window: WindowMouseAction,
    pub right_button_window: WindowMouseAction,
    pub left_button_desktop: DesktopMouseAction,
    pub middle_button_desktop: DesktopMouseAction,
    pub right_button_desktop: DesktopMouseAction,
    /// Arm a drop target so windows can be dragged onto it to close them.
    pub drag_to_close: bool,
    /// Screen edges that toggle current-desktop mode.
    pub border_activate: Vec<ScreenEdge>,
    /// Screen edges that toggle all-desktops mode.
    pub border_activate_all: Vec<ScreenEdge>,
    /// Screen edges that toggle window-class mode.
    pub border_activate_class: Vec<ScreenEdge>,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            layout_mode: LayoutMode::Natural,
            show_captions: true,
            show_icons: true,
            allow_closing: true,
            ignore_minimized: false,
            // stored as a 1..=5 slider upstream, scaled by 20 to pixels
            accuracy: 20,
            fill_gaps: true,
            fade_duration_ms: 150,
            show_panel: true,
            left_button_window: WindowMouseAction::Activate,
            middle_button_window: WindowMouseAction::NoAction,
            right_button_window: WindowMouseAction::Exit,
            left_button_desktop: DesktopMouseAction::Exit,
            middle_button_desktop: DesktopMouseAction::NoAction,
            right_button_desktop: DesktopMouseAction::NoAction,
            drag_to_close: false,
            border_activate: Vec::new(),
            border_activate_all: Vec::new(),
            border_activate_class: Vec::new(),
        }
    }
}
