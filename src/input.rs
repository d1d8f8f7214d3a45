// Copyright (c) 2026 rezky_nightky

use crossterm::event::{Event, MouseEvent, MouseEventKind};
use glam::Vec2;
use tracing::debug;

/// Pointer position in canvas pixels. Absent pointers sit at [`Pointer::FAR`],
/// which is outside any repel radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
}

impl Pointer {
    pub const FAR: Pointer = Pointer {
        x: -9999.0,
        y: -9999.0,
    };

    pub fn at(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn pos(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn is_far(self) -> bool {
        self == Self::FAR
    }

    pub fn from_cell(col: u16, row: u16) -> Self {
        Self::at(col as f32 + 0.5, row as f32 * 2.0 + 1.0)
    }
}

impl Default for Pointer {
    fn default() -> Self {
        Self::FAR
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    Consumed,
    Ignored,
}

#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
    pointer: Pointer,
    dragging: bool,
}

impl PointerTracker {
    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn reset(&mut self) {
        if !self.pointer.is_far() {
            debug!("pointer released");
        }
        self.pointer = Pointer::FAR;
        self.dragging = false;
    }

    pub fn handle(&mut self, ev: &Event) -> Disposition {
        match ev {
            Event::Mouse(m) => self.handle_mouse(m),
            Event::FocusLost => {
                self.reset();
                Disposition::Consumed
            }
            _ => Disposition::Ignored,
        }
    }

    fn handle_mouse(&mut self, m: &MouseEvent) -> Disposition {
        match m.kind {
            MouseEventKind::Moved => {
                self.pointer = Pointer::from_cell(m.column, m.row);
            }
            MouseEventKind::Drag(_) => {
                self.dragging = true;
                self.pointer = Pointer::from_cell(m.column, m.row);
            }
            MouseEventKind::Up(_) if self.dragging => self.reset(),
            MouseEventKind::Down(_) => {
                self.pointer = Pointer::from_cell(m.column, m.row);
            }
            // Wheel input is swallowed while dragging so it cannot scroll.
            MouseEventKind::ScrollUp
            | MouseEventKind::ScrollDown
            | MouseEventKind::ScrollLeft
            | MouseEventKind::ScrollRight
                if self.dragging => {}
            _ => return Disposition::Ignored,
        }
        Disposition::Consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseButton};

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn starts_far_away() {
        let t = PointerTracker::default();
        assert!(t.pointer().is_far());
    }

    #[test]
    fn move_maps_cell_to_canvas_pixels_and_focus_loss_resets() {
        let mut t = PointerTracker::default();
        assert_eq!(
            t.handle(&mouse(MouseEventKind::Moved, 10, 4)),
            Disposition::Consumed
        );
        assert_eq!(t.pointer(), Pointer::at(10.5, 9.0));

        t.handle(&Event::FocusLost);
        assert!(t.pointer().is_far());
    }

    #[test]
    fn drag_release_acts_like_touch_end() {
        let mut t = PointerTracker::default();
        t.handle(&mouse(MouseEventKind::Drag(MouseButton::Left), 3, 3));
        assert!(t.is_dragging());
        assert_eq!(
            t.handle(&mouse(MouseEventKind::ScrollDown, 3, 3)),
            Disposition::Consumed
        );
        t.handle(&mouse(MouseEventKind::Up(MouseButton::Left), 3, 3));
        assert!(t.pointer().is_far());
        assert!(!t.is_dragging());
    }

    #[test]
    fn plain_click_release_keeps_hover_position() {
        let mut t = PointerTracker::default();
        t.handle(&mouse(MouseEventKind::Down(MouseButton::Left), 1, 1));
        t.handle(&mouse(MouseEventKind::Up(MouseButton::Left), 1, 1));
        assert_eq!(t.pointer(), Pointer::from_cell(1, 1));
        assert_eq!(
            t.handle(&mouse(MouseEventKind::ScrollUp, 1, 1)),
            Disposition::Ignored
        );
    }
}
