//! Pointer and keyboard events, and the input state tracked between them.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };
}

/// Pointer event in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
}

/// Keyboard event. Key names follow the DOM `KeyboardEvent.key` values
/// (`"Delete"`, `"Escape"`, `"Enter"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Two presses closer than this in time may form a double click.
pub const DOUBLE_CLICK_TIME: Duration = Duration::from_millis(500);
/// Two presses closer than this in distance may form a double click.
pub const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Input tracked across events: where the pointer is, which modifiers
/// are held, and whether the latest left press completed a double click.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Last known pointer position.
    pub pointer_position: Point,
    pub modifiers: Modifiers,
    last_click: Option<(Instant, Point)>,
    double_click_detected: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer event at the current time.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        self.handle_pointer_event_at(event, Instant::now());
    }

    /// Process a pointer event that happened at `now`.
    pub fn handle_pointer_event_at(&mut self, event: PointerEvent, now: Instant) {
        match event {
            PointerEvent::Down { position, button } => {
                self.pointer_position = position;
                self.double_click_detected = false;
                if button == MouseButton::Left {
                    self.detect_double_click(position, now);
                }
            }
            PointerEvent::Up { position, .. } | PointerEvent::Move { position } => {
                self.pointer_position = position;
            }
        }
    }

    fn detect_double_click(&mut self, position: Point, now: Instant) {
        match self.last_click {
            Some((time, last))
                if now.saturating_duration_since(time) < DOUBLE_CLICK_TIME
                    && position.distance(last) < DOUBLE_CLICK_DISTANCE =>
            {
                self.double_click_detected = true;
                // A third click starts a new pair.
                self.last_click = None;
            }
            _ => self.last_click = Some((now, position)),
        }
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Whether the latest press completed a double click.
    pub fn is_double_click(&self) -> bool {
        self.double_click_detected
    }

}
