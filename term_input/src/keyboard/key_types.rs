// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Value types produced by the [`KeyDecoder`].
//!
//! A [`KeyEvent`] is immutable once produced. Ownership moves into the decoder's output
//! queue and from there to whoever drains it.
//!
//! [`KeyDecoder`]: crate::KeyDecoder

use std::fmt::{Display, Formatter, Result as FmtResult};

use strum_macros::{AsRefStr, Display as StrumDisplay};

use crate::{MODIFIER_ALT_MASK, MODIFIER_CTRL_MASK, MODIFIER_PARAMETERS, MODIFIER_SHIFT_MASK};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyState {
    Pressed,
    #[default]
    NotPressed,
}

impl KeyState {
    #[must_use]
    pub fn is_pressed(self) -> bool { self == KeyState::Pressed }
}

impl From<bool> for KeyState {
    fn from(pressed: bool) -> Self {
        if pressed {
            KeyState::Pressed
        } else {
            KeyState::NotPressed
        }
    }
}

/// Modifier keys held while a key was pressed or a mouse report was generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyModifiers {
    pub shift: KeyState,
    pub alt: KeyState,
    pub ctrl: KeyState,
}

impl KeyModifiers {
    pub const NONE: Self = Self {
        shift: KeyState::NotPressed,
        alt: KeyState::NotPressed,
        ctrl: KeyState::NotPressed,
    };

    pub const SHIFT: Self = Self {
        shift: KeyState::Pressed,
        ..Self::NONE
    };

    pub const ALT: Self = Self {
        alt: KeyState::Pressed,
        ..Self::NONE
    };

    pub const CTRL: Self = Self {
        ctrl: KeyState::Pressed,
        ..Self::NONE
    };

    /// Decode the xterm modifier parameter `m` (as in `CSI 1 ; m A`), which is
    /// `1 + mask`. Returns `None` for values outside `2..=8`.
    #[must_use]
    pub fn from_xterm_parameter(param: u8) -> Option<Self> {
        if !MODIFIER_PARAMETERS.contains(&param) {
            return None;
        }
        let mask = param - 1;
        Some(Self {
            shift: (mask & MODIFIER_SHIFT_MASK != 0).into(),
            alt: (mask & MODIFIER_ALT_MASK != 0).into(),
            ctrl: (mask & MODIFIER_CTRL_MASK != 0).into(),
        })
    }

    #[must_use]
    pub fn with_alt(mut self) -> Self {
        self.alt = KeyState::Pressed;
        self
    }

    #[must_use]
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = KeyState::Pressed;
        self
    }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.shift = KeyState::Pressed;
        self
    }

    #[must_use]
    pub fn is_empty(self) -> bool { self == Self::NONE }
}

/// Writes `Ctrl+Alt+Shift+` style prefixes (nothing when no modifier is held).
impl Display for KeyModifiers {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.ctrl.is_pressed() {
            f.write_str("Ctrl+")?;
        }
        if self.alt.is_pressed() {
            f.write_str("Alt+")?;
        }
        if self.shift.is_pressed() {
            f.write_str("Shift+")?;
        }
        Ok(())
    }
}

/// Logical key identifier. Either a Unicode scalar value or a named key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    /// `F1` is `Function(1)`.
    Function(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Insert,
    Delete,
    PageUp,
    PageDown,
    /// Keypad center key.
    Begin,
    Enter,
    Tab,
    /// Shift+Tab.
    BackTab,
    Backspace,
    Escape,
    /// Placeholder code for [`KeyEventKind::Mouse`] events.
    Mouse,
}

impl KeyCode {
    /// Human readable key name, eg: `Up`, `F5`, `Space`, `a`.
    #[must_use]
    pub fn name(&self) -> String { self.to_string() }
}

impl Display for KeyCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(ch) => write!(f, "{ch}"),
            KeyCode::Function(n) => write!(f, "F{n}"),
            KeyCode::Up => f.write_str("Up"),
            KeyCode::Down => f.write_str("Down"),
            KeyCode::Left => f.write_str("Left"),
            KeyCode::Right => f.write_str("Right"),
            KeyCode::Home => f.write_str("Home"),
            KeyCode::End => f.write_str("End"),
            KeyCode::Insert => f.write_str("Insert"),
            KeyCode::Delete => f.write_str("Delete"),
            KeyCode::PageUp => f.write_str("PageUp"),
            KeyCode::PageDown => f.write_str("PageDown"),
            KeyCode::Begin => f.write_str("Begin"),
            KeyCode::Enter => f.write_str("Enter"),
            KeyCode::Tab => f.write_str("Tab"),
            KeyCode::BackTab => f.write_str("BackTab"),
            KeyCode::Backspace => f.write_str("Backspace"),
            KeyCode::Escape => f.write_str("Escape"),
            KeyCode::Mouse => f.write_str("Mouse"),
        }
    }
}

/// What a [`KeyMap`] entry maps its byte sequence to.
///
/// [`KeyMap`]: crate::KeyMap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogicalKey {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl LogicalKey {
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[must_use]
    pub const fn with_modifiers(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }
}

impl From<KeyCode> for LogicalKey {
    fn from(code: KeyCode) -> Self { Self::new(code) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, AsRefStr)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    /// Motion without a held button, X11 / URXVT releases, and wheel events.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, AsRefStr)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAction {
    Press,
    Release,
    /// Motion with a button held.
    Drag,
    /// Motion with no button held.
    Motion,
    Scroll(ScrollDirection),
}

impl Display for MouseAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MouseAction::Press => f.write_str("Press"),
            MouseAction::Release => f.write_str("Release"),
            MouseAction::Drag => f.write_str("Drag"),
            MouseAction::Motion => f.write_str("Motion"),
            MouseAction::Scroll(direction) => write!(f, "Scroll{direction}"),
        }
    }
}

/// Which wire encoding a mouse report arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, AsRefStr)]
pub enum MouseProtocol {
    X11,
    Sgr,
    Urxvt,
}

/// 1-based terminal cell coordinates, as the terminal reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MousePosition {
    pub col: u16,
    pub row: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub button: MouseButton,
    pub action: MouseAction,
    pub pos: MousePosition,
    pub protocol: MouseProtocol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    Press,
    Mouse(MouseEvent),
}

/// One decoded input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    #[must_use]
    pub const fn press(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self {
            code,
            modifiers,
            kind: KeyEventKind::Press,
        }
    }

    #[must_use]
    pub const fn char(ch: char) -> Self { Self::press(KeyCode::Char(ch), KeyModifiers::NONE) }

    #[must_use]
    pub const fn mouse(mouse_event: MouseEvent, modifiers: KeyModifiers) -> Self {
        Self {
            code: KeyCode::Mouse,
            modifiers,
            kind: KeyEventKind::Mouse(mouse_event),
        }
    }

    #[must_use]
    pub fn as_mouse(&self) -> Option<&MouseEvent> {
        match &self.kind {
            KeyEventKind::Mouse(it) => Some(it),
            KeyEventKind::Press => None,
        }
    }

    #[must_use]
    pub fn is_mouse(&self) -> bool { self.as_mouse().is_some() }
}

impl From<LogicalKey> for KeyEvent {
    fn from(key: LogicalKey) -> Self { Self::press(key.code, key.modifiers) }
}

/// Eg: `Ctrl+Alt+Up`, `Shift+F5`, `Mouse(Left Press @ 10,4 via Sgr)`.
impl Display for KeyEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.modifiers)?;
        match &self.kind {
            KeyEventKind::Press => write!(f, "{}", self.code),
            KeyEventKind::Mouse(it) => write!(
                f,
                "Mouse({} {} @ {},{} via {})",
                it.button, it.action, it.pos.col, it.pos.row, it.protocol
            ),
        }
    }
}
