//! Input - crossterm events to display clicks.
//!
//! # Mapping
//!
//! - left / right / middle press → `Left` / `Right` / `Middle`, shifted
//!   variants when Shift is held
//! - press off the grid → an outside click
//! - `1`..`9` over a cell → `NumberKey` with hotbar button 0..8
//! - `q` over a cell → `Drop` (`ControlDrop` with Ctrl), `f` → `SwapOffhand`
//! - `Esc` / `e` → close request

use std::io::{self, stdout};
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode, KeyEvent,
    KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind, poll, read,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

use super::Frame;
use crate::types::{ClickEvent, ClickKind, ViewerId};

// =============================================================================
// EVENTS
// =============================================================================

/// What a terminal event means for the shown display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    Click(ClickEvent),
    /// The viewer asked to close the window.
    Close,
    Resize(u16, u16),
    None,
}

/// Stateful converter: remembers which cell the pointer hovers for key
/// clicks.
#[derive(Debug, Clone)]
pub struct EventTranslator {
    viewer: ViewerId,
    frame: Frame,
    hovered: Option<usize>,
}

impl EventTranslator {
    pub fn new(viewer: ViewerId, frame: Frame) -> Self {
        Self {
            viewer,
            frame,
            hovered: None,
        }
    }

    /// Replace the grid geometry (after the display was recreated).
    pub fn set_frame(&mut self, frame: Frame) {
        if self.frame != frame {
            self.frame = frame;
            self.hovered = None;
        }
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn translate(&mut self, event: CrosstermEvent) -> TerminalEvent {
        match event {
            CrosstermEvent::Mouse(mouse) => self.convert_mouse_event(mouse),
            CrosstermEvent::Key(key) => self.convert_key_event(key),
            CrosstermEvent::Resize(w, h) => TerminalEvent::Resize(w, h),
            _ => TerminalEvent::None,
        }
    }

    fn convert_mouse_event(&mut self, event: MouseEvent) -> TerminalEvent {
        let slot = self.frame.slot_at(event.column, event.row);
        match event.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.hovered = slot;
                TerminalEvent::None
            }
            MouseEventKind::Down(button) => {
                self.hovered = slot;
                let kind = convert_mouse_button(button, event.modifiers);
                let click = match slot {
                    Some(slot) => ClickEvent::top(self.viewer, kind, slot),
                    None => ClickEvent::outside(self.viewer, kind),
                };
                TerminalEvent::Click(click)
            }
            _ => TerminalEvent::None,
        }
    }

    fn convert_key_event(&self, event: KeyEvent) -> TerminalEvent {
        if event.kind != KeyEventKind::Press {
            return TerminalEvent::None;
        }
        let on_hovered = |kind: ClickKind| {
            self.hovered
                .map(|slot| ClickEvent::top(self.viewer, kind, slot))
                .map_or(TerminalEvent::None, TerminalEvent::Click)
        };
        match event.code {
            KeyCode::Esc | KeyCode::Char('e') => TerminalEvent::Close,
            KeyCode::Char(c @ '1'..='9') => {
                let button = c as u8 - b'1';
                self.hovered
                    .map(|slot| {
                        ClickEvent::top(self.viewer, ClickKind::NumberKey, slot).with_hotbar_button(button)
                    })
                    .map_or(TerminalEvent::None, TerminalEvent::Click)
            }
            KeyCode::Char('q') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                on_hovered(ClickKind::ControlDrop)
            }
            KeyCode::Char('q') => on_hovered(ClickKind::Drop),
            KeyCode::Char('f') => on_hovered(ClickKind::SwapOffhand),
            _ => TerminalEvent::None,
        }
    }
}

fn convert_mouse_button(button: MouseButton, modifiers: KeyModifiers) -> ClickKind {
    let shift = modifiers.contains(KeyModifiers::SHIFT);
    match button {
        MouseButton::Left if shift => ClickKind::ShiftLeft,
        MouseButton::Left => ClickKind::Left,
        MouseButton::Right if shift => ClickKind::ShiftRight,
        MouseButton::Right => ClickKind::Right,
        MouseButton::Middle => ClickKind::Middle,
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll for an event with timeout. Returns `None` if nothing arrived.
pub fn poll_event(timeout: Duration) -> io::Result<Option<CrosstermEvent>> {
    if poll(timeout)? {
        Ok(Some(read()?))
    } else {
        Ok(None)
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Raw mode, alternate screen and mouse capture for as long as it lives.
pub struct TerminalSession {
    _private: (),
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, EnableMouseCapture, Hide)?;
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let restored = execute!(stdout(), Show, DisableMouseCapture, LeaveAlternateScreen)
            .and_then(|()| disable_raw_mode());
        if let Err(err) = restored {
            tracing::error!(error = %err, "failed to restore terminal");
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
