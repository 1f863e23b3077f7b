//! Themed decoration buttons.
//!
//! A button tracks its interaction flags and resolves which element prefix
//! of a multi-state theme to paint with. Themes are capability lookups; a
//! missing state falls back toward the plain element so sparse themes still
//! render.

use std::collections::BTreeSet;

use crate::timers::{TimerId, TimerQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Menu,
    ApplicationMenu,
    Minimize,
    Maximize,
    Restore,
    Close,
    AllDesktops,
    KeepAbove,
    KeepBelow,
    Shade,
    Help,
}

impl ButtonKind {
    pub fn base_prefix(self) -> &'static str {
        match self {
            ButtonKind::Menu => "menu",
            ButtonKind::ApplicationMenu => "appmenu",
            ButtonKind::Minimize => "minimize",
            ButtonKind::Maximize => "maximize",
            ButtonKind::Restore => "restore",
            ButtonKind::Close => "close",
            ButtonKind::AllDesktops => "alldesktops",
            ButtonKind::KeepAbove => "keepabove",
            ButtonKind::KeepBelow => "keepbelow",
            ButtonKind::Shade => "shade",
            ButtonKind::Help => "help",
        }
    }

    /// Buttons that latch a window state rather than fire an action.
    pub fn is_checkable(self) -> bool {
        matches!(
            self,
            ButtonKind::AllDesktops
                | ButtonKind::KeepAbove
                | ButtonKind::KeepBelow
                | ButtonKind::Shade
        )
    }
}

/// The set of element prefixes a theme actually ships.
#[derive(Debug, Default, Clone)]
pub struct ButtonTheme {
    prefixes: BTreeSet<String>,
}

impl ButtonTheme {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_element_prefix(&self, prefix: &str) -> bool {
        self.prefixes.contains(prefix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Clicked(ButtonKind),
}

#[derive(Debug, Clone)]
pub struct DecorationButton {
    kind: ButtonKind,
    hovered: bool,
    pressed: bool,
    checked: bool,
    enabled: bool,
    /// Whether the owning decoration is the active window's.
    decoration_active: bool,
    /// Maximize buttons flip to the restore face while maximized.
    maximized: bool,
}

impl DecorationButton {
    pub fn new(kind: ButtonKind) -> Self {
        Self {
            kind,
            hovered: false,
            pressed: false,
            checked: false,
            enabled: true,
            decoration_active: true,
            maximized: false,
        }
    }

    pub fn kind(&self) -> ButtonKind {
        self.kind
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
        if !hovered {
            // leaving mid-press cancels the click
            self.pressed = false;
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.pressed = false;
            self.hovered = false;
        }
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub fn set_decoration_active(&mut self, active: bool) {
        self.decoration_active = active;
    }

    pub fn set_maximized(&mut self, maximized: bool) {
        self.maximized = maximized;
    }

    pub fn press(&mut self) {
        if self.enabled {
            self.pressed = true;
        }
    }

    /// Ends a press. A release inside the button emits the click and
    /// toggles checkable buttons.
    pub fn release(&mut self, inside: bool, theme: &ButtonTheme) -> Option<ButtonEvent> {
        let was_pressed = self.pressed;
        self.pressed = false;
        if !(was_pressed && inside && self.enabled) {
            return None;
        }
        if self.kind.is_checkable() {
            self.checked = !self.checked;
        }
        Some(ButtonEvent::Clicked(self.effective_kind(theme)))
    }

    /// The kind as painted: a maximize button on a maximized window shows
    /// the restore face when the theme ships one.
    pub fn effective_kind(&self, theme: &ButtonTheme) -> ButtonKind {
        if self.kind == ButtonKind::Maximize
            && self.maximized
            && theme.has_element_prefix(ButtonKind::Restore.base_prefix())
        {
            ButtonKind::Restore
        } else {
            self.kind
        }
    }

    /// Resolves the element prefix to paint. Pressed and checked share the
    /// pressed face, hover comes next, disabled buttons grey out, and every
    /// state prefers its `-inactive` variant on an inactive decoration when
    /// the theme has it.
    pub fn element_prefix(&self, theme: &ButtonTheme) -> String {
        let base = self.effective_kind(theme).base_prefix();
        let state = if self.pressed || self.checked {
            Some("pressed")
        } else if self.hovered {
            Some("hover")
        } else if !self.enabled {
            Some("deactivated")
        } else {
            None
        };
        let name = match state {
            Some(s) => format!("{base}-{s}"),
            None => base.to_string(),
        };
        if !self.decoration_active {
            let inactive = format!("{name}-inactive");
            if theme.has_element_prefix(&inactive) {
                return inactive;
            }
        }
        if theme.has_element_prefix(&name) {
            return name;
        }
        base.to_string()
    }
}

/// What a menu button resolved a click sequence to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ShowMenu,
    /// Double click on the menu button closes the window.
    CloseWindow,
}

/// Menu button with double-click coalescing: a first click arms a timer for
/// the double-click interval and only counts as a plain click when it runs
/// out without a second click.
#[derive(Debug)]
pub struct MenuButton {
    pub button: DecorationButton,
    timers: TimerQueue,
    double_click_interval_ms: u64,
}

impl MenuButton {
    pub fn new(double_click_interval_ms: u64) -> Self {
        Self {
            button: DecorationButton::new(ButtonKind::Menu),
            timers: TimerQueue::new(),
            double_click_interval_ms,
        }
    }

    pub fn clicked(&mut self) -> Option<MenuAction> {
        if self.timers.is_armed(TimerId::MenuSingleClick) {
            self.timers.cancel(TimerId::MenuSingleClick);
            Some(MenuAction::CloseWindow)
        } else {
            self.timers
                .schedule(TimerId::MenuSingleClick, self.double_click_interval_ms);
            None
        }
    }

    pub fn advance(&mut self, elapsed_ms: u64) -> Option<MenuAction> {
        if self.timers.advance(elapsed_ms).contains(&TimerId::MenuSingleClick) {
            Some(MenuAction::ShowMenu)
        } else {
            None
        }
    }
}
