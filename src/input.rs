use std::collections::HashSet;

use egui::{Event, PointerButton, Pos2, Rect, TouchPhase};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Identifies one active touch or contact.
///
/// Ids are unique among pointers that are down at the same time and may be
/// reused once the previous pointer with that id has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointerId(pub u64);

impl PointerId {
    /// Id used for the primary mouse button, outside the range touch backends hand out
    pub const MOUSE: PointerId = PointerId(u64::MAX);
}

impl std::fmt::Display for PointerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == Self::MOUSE {
            write!(f, "pointer#mouse")
        } else {
            write!(f, "pointer#{}", self.0)
        }
    }
}

/// Lifecycle stage of a single contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerPhase {
    Began,
    Moved,
    Stationary,
    Ended,
    Canceled,
}

impl PointerPhase {
    /// Decodes a platform touch-phase code.
    ///
    /// Codes: 1 began, 2 moved, 3 ended, 4 canceled, 5 stationary.
    /// 0 ("none") and anything else are rejected.
    pub fn from_code(code: i32) -> Result<Self, ValidationError> {
        match code {
            1 => Ok(Self::Began),
            2 => Ok(Self::Moved),
            3 => Ok(Self::Ended),
            4 => Ok(Self::Canceled),
            5 => Ok(Self::Stationary),
            other => Err(ValidationError::UnknownPhase(other)),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Began => 1,
            Self::Moved => 2,
            Self::Ended => 3,
            Self::Canceled => 4,
            Self::Stationary => 5,
        }
    }
}

impl From<TouchPhase> for PointerPhase {
    fn from(phase: TouchPhase) -> Self {
        match phase {
            TouchPhase::Start => Self::Began,
            TouchPhase::Move => Self::Moved,
            TouchPhase::End => Self::Ended,
            TouchPhase::Cancel => Self::Canceled,
        }
    }
}

/// One pointer update as seen by the stroke tracker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub id: PointerId,
    pub phase: PointerPhase,
    /// Position in screen coordinates
    pub screen_position: Pos2,
}

impl PointerEvent {
    pub fn new(id: PointerId, phase: PointerPhase, screen_position: Pos2) -> Self {
        Self {
            id,
            phase,
            screen_position,
        }
    }

    pub fn began(id: u64, x: f32, y: f32) -> Self {
        Self::new(PointerId(id), PointerPhase::Began, Pos2::new(x, y))
    }

    pub fn moved(id: u64, x: f32, y: f32) -> Self {
        Self::new(PointerId(id), PointerPhase::Moved, Pos2::new(x, y))
    }

    pub fn stationary(id: u64, x: f32, y: f32) -> Self {
        Self::new(PointerId(id), PointerPhase::Stationary, Pos2::new(x, y))
    }

    pub fn ended(id: u64, x: f32, y: f32) -> Self {
        Self::new(PointerId(id), PointerPhase::Ended, Pos2::new(x, y))
    }

    pub fn canceled(id: u64, x: f32, y: f32) -> Self {
        Self::new(PointerId(id), PointerPhase::Canceled, Pos2::new(x, y))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.screen_position.is_finite() {
            Ok(())
        } else {
            Err(ValidationError::NonFinitePosition {
                x: self.screen_position.x,
                y: self.screen_position.y,
            })
        }
    }
}

/// Pointer update as delivered by a platform bridge, before validation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPointerEvent {
    pub id: u64,
    pub phase: i32,
    pub x: f32,
    pub y: f32,
}

impl TryFrom<RawPointerEvent> for PointerEvent {
    type Error = ValidationError;

    fn try_from(raw: RawPointerEvent) -> Result<Self, Self::Error> {
        let phase = PointerPhase::from_code(raw.phase)?;
        let event = PointerEvent::new(PointerId(raw.id), phase, Pos2::new(raw.x, raw.y));
        event.validate()?;
        Ok(event)
    }
}

/// Converts egui input into [`PointerEvent`]s.
///
/// Touches are reported per finger. The primary mouse button is reported as
/// [`PointerId::MOUSE`] while no finger is down, so the pointer egui
/// synthesizes from the first touch is not drawn twice. A mouse stroke that
/// started before the first finger still ends on release.
#[derive(Debug)]
pub struct InputHandler {
    canvas_rect: Rect,
    active_touches: HashSet<u64>,
    mouse_down: bool,
    last_mouse_pos: Option<Pos2>,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(Rect::NOTHING)
    }
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            canvas_rect,
            active_touches: HashSet::new(),
            mouse_down: false,
            last_mouse_pos: None,
        }
    }

    /// Update the canvas rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    pub fn canvas_rect(&self) -> Rect {
        self.canvas_rect
    }

    /// Number of fingers currently down
    pub fn active_touch_count(&self) -> usize {
        self.active_touches.len()
    }

    /// Process this frame's egui input
    pub fn process_input(&mut self, ctx: &egui::Context) -> Vec<PointerEvent> {
        let events = ctx.input(|input| input.events.clone());
        self.process_events(&events)
    }

    /// Process a batch of raw egui events in arrival order
    pub fn process_events(&mut self, events: &[Event]) -> Vec<PointerEvent> {
        let touch_in_batch = events.iter().any(|e| matches!(e, Event::Touch { .. }));
        let mut out = Vec::new();

        for event in events {
            match event {
                Event::Touch { id, phase, pos, .. } => {
                    self.handle_touch(id.0, (*phase).into(), *pos, &mut out);
                }
                // A mouse stroke already in progress still gets its release
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed: false,
                    ..
                } if self.mouse_down => self.handle_mouse_button(*pos, false, &mut out),
                _ if touch_in_batch || !self.active_touches.is_empty() => {}
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed,
                    ..
                } => self.handle_mouse_button(*pos, *pressed, &mut out),
                Event::PointerMoved(pos) => {
                    if self.mouse_down && self.last_mouse_pos != Some(*pos) {
                        out.push(PointerEvent::new(PointerId::MOUSE, PointerPhase::Moved, *pos));
                    }
                    self.last_mouse_pos = Some(*pos);
                }
                Event::PointerGone => {
                    if self.mouse_down {
                        let pos = self.last_mouse_pos.unwrap_or(self.canvas_rect.center());
                        out.push(PointerEvent::new(PointerId::MOUSE, PointerPhase::Canceled, pos));
                    }
                    self.mouse_down = false;
                    self.last_mouse_pos = None;
                }
                _ => {}
            }
        }

        out
    }

    fn handle_touch(&mut self, id: u64, phase: PointerPhase, pos: Pos2, out: &mut Vec<PointerEvent>) {
        match phase {
            PointerPhase::Began => {
                // Touches landing outside the canvas never start a stroke
                if !self.canvas_rect.contains(pos) {
                    return;
                }
                self.active_touches.insert(id);
            }
            PointerPhase::Ended | PointerPhase::Canceled => {
                if !self.active_touches.remove(&id) {
                    return;
                }
            }
            PointerPhase::Moved | PointerPhase::Stationary => {
                if !self.active_touches.contains(&id) {
                    return;
                }
            }
        }
        out.push(PointerEvent::new(PointerId(id), phase, pos));
    }

    fn handle_mouse_button(&mut self, pos: Pos2, pressed: bool, out: &mut Vec<PointerEvent>) {
        if pressed {
            if self.canvas_rect.contains(pos) && !self.mouse_down {
                self.mouse_down = true;
                out.push(PointerEvent::new(PointerId::MOUSE, PointerPhase::Began, pos));
            }
        } else if self.mouse_down {
            self.mouse_down = false;
            out.push(PointerEvent::new(PointerId::MOUSE, PointerPhase::Ended, pos));
        }
        self.last_mouse_pos = Some(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Modifiers, TouchDeviceId, TouchId, pos2, vec2};

    fn handler() -> InputHandler {
        InputHandler::new(Rect::from_min_size(Pos2::ZERO, vec2(100.0, 100.0)))
    }

    fn touch(id: u64, phase: TouchPhase, x: f32, y: f32) -> Event {
        Event::Touch {
            device_id: TouchDeviceId(0),
            id: TouchId(id),
            phase,
            pos: pos2(x, y),
            force: None,
        }
    }

    fn button(pressed: bool, x: f32, y: f32) -> Event {
        Event::PointerButton {
            pos: pos2(x, y),
            button: PointerButton::Primary,
            pressed,
            modifiers: Modifiers::default(),
        }
    }

    #[test]
    fn test_phase_codes() {
        assert_eq!(PointerPhase::from_code(1), Ok(PointerPhase::Began));
        assert_eq!(PointerPhase::from_code(5), Ok(PointerPhase::Stationary));
        assert_eq!(PointerPhase::from_code(0), Err(ValidationError::UnknownPhase(0)));
        assert_eq!(PointerPhase::from_code(42), Err(ValidationError::UnknownPhase(42)));

        for phase in [
            PointerPhase::Began,
            PointerPhase::Moved,
            PointerPhase::Stationary,
            PointerPhase::Ended,
            PointerPhase::Canceled,
        ] {
            assert_eq!(PointerPhase::from_code(phase.code()), Ok(phase));
        }
    }

    #[test]
    fn test_raw_event_validation() {
        let ok = RawPointerEvent { id: 3, phase: 2, x: 1.0, y: 2.0 };
        assert_eq!(PointerEvent::try_from(ok), Ok(PointerEvent::moved(3, 1.0, 2.0)));

        let nan = RawPointerEvent { id: 3, phase: 2, x: f32::NAN, y: 2.0 };
        assert!(matches!(
            PointerEvent::try_from(nan),
            Err(ValidationError::NonFinitePosition { .. })
        ));
    }

    #[test]
    fn test_touches_map_to_pointer_events() {
        let mut input = handler();
        let events = input.process_events(&[
            touch(1, TouchPhase::Start, 10.0, 10.0),
            touch(2, TouchPhase::Start, 50.0, 50.0),
            touch(1, TouchPhase::Move, 12.0, 10.0),
            touch(2, TouchPhase::End, 50.0, 50.0),
        ]);

        assert_eq!(
            events,
            vec![
                PointerEvent::began(1, 10.0, 10.0),
                PointerEvent::began(2, 50.0, 50.0),
                PointerEvent::moved(1, 12.0, 10.0),
                PointerEvent::ended(2, 50.0, 50.0),
            ]
        );
        assert_eq!(input.active_touch_count(), 1);
    }

    #[test]
    fn test_touch_outside_canvas_is_dropped() {
        let mut input = handler();
        let events = input.process_events(&[
            touch(1, TouchPhase::Start, 150.0, 10.0),
            touch(1, TouchPhase::Move, 50.0, 10.0),
            touch(1, TouchPhase::End, 50.0, 10.0),
        ]);

        assert!(events.is_empty());
    }

    #[test]
    fn test_mouse_drag() {
        let mut input = handler();
        let events = input.process_events(&[
            Event::PointerMoved(pos2(5.0, 5.0)),
            button(true, 5.0, 5.0),
            Event::PointerMoved(pos2(6.0, 5.0)),
            Event::PointerMoved(pos2(6.0, 5.0)),
            button(false, 6.0, 5.0),
            Event::PointerMoved(pos2(7.0, 5.0)),
        ]);

        assert_eq!(
            events,
            vec![
                PointerEvent::new(PointerId::MOUSE, PointerPhase::Began, pos2(5.0, 5.0)),
                PointerEvent::new(PointerId::MOUSE, PointerPhase::Moved, pos2(6.0, 5.0)),
                PointerEvent::new(PointerId::MOUSE, PointerPhase::Ended, pos2(6.0, 5.0)),
            ]
        );
    }

    #[test]
    fn test_mouse_leaving_window_cancels() {
        let mut input = handler();
        let events = input.process_events(&[button(true, 5.0, 5.0), Event::PointerGone]);

        assert_eq!(events.last().map(|e| e.phase), Some(PointerPhase::Canceled));
    }

    #[test]
    fn test_synthesized_mouse_ignored_while_touching() {
        let mut input = handler();
        let events = input.process_events(&[
            touch(9, TouchPhase::Start, 10.0, 10.0),
            button(true, 10.0, 10.0),
        ]);
        assert_eq!(events, vec![PointerEvent::began(9, 10.0, 10.0)]);

        // Next frame: finger still down, only the synthesized pointer moves
        let events = input.process_events(&[Event::PointerMoved(pos2(11.0, 10.0))]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_mouse_release_ends_stroke_while_touching() {
        let mut input = handler();
        input.process_events(&[button(true, 5.0, 5.0)]);

        let events = input.process_events(&[
            touch(2, TouchPhase::Start, 50.0, 50.0),
            button(false, 6.0, 5.0),
        ]);
        assert_eq!(
            events,
            vec![
                PointerEvent::began(2, 50.0, 50.0),
                PointerEvent::new(PointerId::MOUSE, PointerPhase::Ended, pos2(6.0, 5.0)),
            ]
        );

        // Presses stay suppressed while the finger is down
        let events = input.process_events(&[button(true, 7.0, 5.0)]);
        assert!(events.is_empty());
    }
}
