use std::collections::HashMap;

use log::{debug, info, warn};

use crate::anchor::{AnchorHandle, AnchorProvider};
use crate::error::{StrokeResult, ValidationError};
use crate::gate::DrawGateSource;
use crate::input::{PointerEvent, PointerId, PointerPhase, RawPointerEvent};
use crate::projection::{ScreenToWorldProjector, WorldPoint};
use crate::stroke::{ActiveStroke, Generation, Stroke};

/// What a pointer event did to the set of active strokes.
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeAction {
    /// Event ignored, nothing changed
    NoOp,
    Started {
        id: PointerId,
        anchor: AnchorHandle,
        point: WorldPoint,
        generation: Generation,
    },
    PointAdded {
        id: PointerId,
        point: WorldPoint,
    },
    /// The pointer lifted; the stroke is complete and handed to the caller
    Ended {
        id: PointerId,
        stroke: Stroke,
    },
    /// The platform canceled the pointer; the partial stroke is handed back
    Canceled {
        id: PointerId,
        stroke: Stroke,
    },
    /// A second Began arrived for a pointer that already has a stroke
    DuplicateBeganIgnored {
        id: PointerId,
    },
    /// Event stamped with a generation that no longer owns the pointer
    StaleEvent {
        id: PointerId,
    },
}

impl StrokeAction {
    pub fn is_noop(&self) -> bool {
        matches!(self, StrokeAction::NoOp)
    }
}

/// Tracks one in-progress stroke per pointer.
///
/// Strokes start on an accepted Began while the draw gate is open, grow on
/// Moved/Stationary and leave the tracker on Ended, Canceled or [`reset`].
/// Completed strokes are returned to the caller and not retained.
///
/// [`reset`]: StrokeTracker::reset
#[derive(Debug, Default)]
pub struct StrokeTracker {
    active: HashMap<PointerId, ActiveStroke>,
    drawing_enabled: bool,
    next_generation: u64,
}

impl StrokeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow or forbid starting new strokes. Strokes already in progress
    /// are unaffected.
    pub fn set_draw_gate(&mut self, enabled: bool) {
        if self.drawing_enabled != enabled {
            info!("Draw gate {}", if enabled { "opened" } else { "closed" });
        }
        self.drawing_enabled = enabled;
    }

    /// Sync the gate with a surface-detection source. Returns the new gate state.
    pub fn poll_draw_gate<S: DrawGateSource + ?Sized>(&mut self, source: &S) -> bool {
        self.set_draw_gate(source.surface_detected());
        self.drawing_enabled
    }

    pub fn is_drawing_enabled(&self) -> bool {
        self.drawing_enabled
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, id: PointerId) -> bool {
        self.active.contains_key(&id)
    }

    pub fn active_stroke(&self, id: PointerId) -> Option<&ActiveStroke> {
        self.active.get(&id)
    }

    pub fn active_strokes(&self) -> impl Iterator<Item = (PointerId, &ActiveStroke)> {
        self.active.iter().map(|(id, stroke)| (*id, stroke))
    }

    /// Apply one pointer event.
    ///
    /// Errors leave the tracker exactly as it was.
    pub fn on_pointer_event<P, A>(
        &mut self,
        event: &PointerEvent,
        projector: &P,
        anchors: &mut A,
    ) -> StrokeResult<StrokeAction>
    where
        P: ScreenToWorldProjector + ?Sized,
        A: AnchorProvider + ?Sized,
    {
        event.validate()?;

        match event.phase {
            PointerPhase::Began => self.begin(event, projector, anchors),
            PointerPhase::Moved | PointerPhase::Stationary => self.extend(event, projector),
            PointerPhase::Ended => Ok(self.finish(event.id, false)),
            PointerPhase::Canceled => Ok(self.finish(event.id, true)),
        }
    }

    /// Validate and apply an event straight from a platform bridge
    pub fn on_raw_pointer_event<P, A>(
        &mut self,
        raw: RawPointerEvent,
        projector: &P,
        anchors: &mut A,
    ) -> StrokeResult<StrokeAction>
    where
        P: ScreenToWorldProjector + ?Sized,
        A: AnchorProvider + ?Sized,
    {
        let event = PointerEvent::try_from(raw)?;
        self.on_pointer_event(&event, projector, anchors)
    }

    /// Apply an event only if `generation` still owns the pointer's stroke.
    ///
    /// Began events carry no stroke yet and are applied as usual. Malformed
    /// events are rejected whatever their stamp.
    pub fn on_stamped_event<P, A>(
        &mut self,
        event: &PointerEvent,
        generation: Generation,
        projector: &P,
        anchors: &mut A,
    ) -> StrokeResult<StrokeAction>
    where
        P: ScreenToWorldProjector + ?Sized,
        A: AnchorProvider + ?Sized,
    {
        event.validate()?;
        if event.phase != PointerPhase::Began {
            if let Some(stroke) = self.active.get(&event.id) {
                if stroke.generation() != generation {
                    warn!(
                        "Discarding stale {:?} for {}: stamped {:?}, active {:?}",
                        event.phase,
                        event.id,
                        generation,
                        stroke.generation()
                    );
                    return Ok(StrokeAction::StaleEvent { id: event.id });
                }
            }
        }
        self.on_pointer_event(event, projector, anchors)
    }

    /// Drop every active stroke, returning them ordered by pointer id
    pub fn reset(&mut self) -> Vec<(PointerId, Stroke)> {
        let mut drained: Vec<_> = self
            .active
            .drain()
            .map(|(id, stroke)| (id, stroke.finish()))
            .collect();
        drained.sort_by_key(|(id, _)| *id);
        if !drained.is_empty() {
            info!("Reset dropped {} active strokes", drained.len());
        }
        drained
    }

    fn begin<P, A>(
        &mut self,
        event: &PointerEvent,
        projector: &P,
        anchors: &mut A,
    ) -> StrokeResult<StrokeAction>
    where
        P: ScreenToWorldProjector + ?Sized,
        A: AnchorProvider + ?Sized,
    {
        if !self.drawing_enabled {
            debug!("Ignoring Began for {}: draw gate closed", event.id);
            return Ok(StrokeAction::NoOp);
        }
        if self.active.contains_key(&event.id) {
            warn!("Ignoring duplicate Began for {}", event.id);
            return Ok(StrokeAction::DuplicateBeganIgnored { id: event.id });
        }

        let point = project(projector, event)?;
        let anchor = anchors.create_anchor(point).inspect_err(|err| {
            warn!("No stroke for {}: {}", event.id, err);
        })?;

        let generation = Generation(self.next_generation);
        self.next_generation += 1;
        self.active
            .insert(event.id, ActiveStroke::new(anchor, point, generation));

        debug!("Stroke started for {} on {} at {:?}", event.id, anchor, point);
        Ok(StrokeAction::Started {
            id: event.id,
            anchor,
            point,
            generation,
        })
    }

    fn extend<P>(&mut self, event: &PointerEvent, projector: &P) -> StrokeResult<StrokeAction>
    where
        P: ScreenToWorldProjector + ?Sized,
    {
        let Some(stroke) = self.active.get_mut(&event.id) else {
            return Ok(StrokeAction::NoOp);
        };

        let point = project(projector, event)?;
        stroke.add_point(point);
        Ok(StrokeAction::PointAdded { id: event.id, point })
    }

    fn finish(&mut self, id: PointerId, canceled: bool) -> StrokeAction {
        let Some(stroke) = self.active.remove(&id) else {
            return StrokeAction::NoOp;
        };

        let stroke = stroke.finish();
        if canceled {
            debug!("Stroke canceled for {} after {} points", id, stroke.len());
            StrokeAction::Canceled { id, stroke }
        } else {
            debug!("Stroke ended for {} with {} points", id, stroke.len());
            StrokeAction::Ended { id, stroke }
        }
    }
}

fn project<P>(projector: &P, event: &PointerEvent) -> Result<WorldPoint, ValidationError>
where
    P: ScreenToWorldProjector + ?Sized,
{
    let point = projector.project(event.screen_position);
    if point.is_finite() {
        Ok(point)
    } else {
        Err(ValidationError::NonFiniteProjection {
            x: event.screen_position.x,
            y: event.screen_position.y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::AnchorUnavailable;
    use crate::error::StrokeError;
    use egui::Pos2;
    use glam::Vec3;

    fn flat(screen: Pos2) -> WorldPoint {
        Vec3::new(screen.x, screen.y, 1.0)
    }

    struct CountingAnchors {
        created: u128,
    }

    impl AnchorProvider for CountingAnchors {
        fn create_anchor(&mut self, _at: WorldPoint) -> Result<AnchorHandle, AnchorUnavailable> {
            self.created += 1;
            Ok(AnchorHandle::from_u128(self.created))
        }
    }

    fn open_tracker() -> StrokeTracker {
        let mut tracker = StrokeTracker::new();
        tracker.set_draw_gate(true);
        tracker
    }

    #[test]
    fn test_gate_closed_by_default() {
        let mut tracker = StrokeTracker::new();
        let mut anchors = CountingAnchors { created: 0 };

        let action = tracker
            .on_pointer_event(&PointerEvent::began(1, 0.0, 0.0), &flat, &mut anchors)
            .unwrap();

        assert_eq!(action, StrokeAction::NoOp);
        assert_eq!(anchors.created, 0);
    }

    #[test]
    fn test_duplicate_began_requests_no_anchor() {
        let mut tracker = open_tracker();
        let mut anchors = CountingAnchors { created: 0 };

        tracker
            .on_pointer_event(&PointerEvent::began(1, 0.0, 0.0), &flat, &mut anchors)
            .unwrap();
        let action = tracker
            .on_pointer_event(&PointerEvent::began(1, 5.0, 5.0), &flat, &mut anchors)
            .unwrap();

        assert_eq!(action, StrokeAction::DuplicateBeganIgnored { id: PointerId(1) });
        assert_eq!(anchors.created, 1);
        assert_eq!(tracker.active_stroke(PointerId(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_stationary_appends_point() {
        let mut tracker = open_tracker();
        let mut anchors = CountingAnchors { created: 0 };

        tracker
            .on_pointer_event(&PointerEvent::began(1, 0.0, 0.0), &flat, &mut anchors)
            .unwrap();
        let action = tracker
            .on_pointer_event(&PointerEvent::stationary(1, 0.0, 0.0), &flat, &mut anchors)
            .unwrap();

        assert_eq!(
            action,
            StrokeAction::PointAdded { id: PointerId(1), point: Vec3::new(0.0, 0.0, 1.0) }
        );
        assert_eq!(tracker.active_stroke(PointerId(1)).unwrap().len(), 2);
    }

    #[test]
    fn test_closing_gate_keeps_strokes_in_progress() {
        let mut tracker = open_tracker();
        let mut anchors = CountingAnchors { created: 0 };

        tracker
            .on_pointer_event(&PointerEvent::began(1, 0.0, 0.0), &flat, &mut anchors)
            .unwrap();
        tracker.set_draw_gate(false);

        let action = tracker
            .on_pointer_event(&PointerEvent::moved(1, 1.0, 0.0), &flat, &mut anchors)
            .unwrap();
        assert!(matches!(action, StrokeAction::PointAdded { .. }));

        let action = tracker
            .on_pointer_event(&PointerEvent::began(2, 1.0, 0.0), &flat, &mut anchors)
            .unwrap();
        assert!(action.is_noop());
    }

    #[test]
    fn test_non_finite_projection_is_rejected() {
        let mut tracker = open_tracker();
        let mut anchors = CountingAnchors { created: 0 };
        let broken = |_: Pos2| Vec3::new(f32::NAN, 0.0, 0.0);

        let err = tracker
            .on_pointer_event(&PointerEvent::began(1, 0.0, 0.0), &broken, &mut anchors)
            .unwrap_err();

        assert!(matches!(
            err,
            StrokeError::Validation(ValidationError::NonFiniteProjection { .. })
        ));
        assert_eq!(tracker.active_count(), 0);
        assert_eq!(anchors.created, 0);
    }

    #[test]
    fn test_generations_increase() {
        let mut tracker = open_tracker();
        let mut anchors = CountingAnchors { created: 0 };

        let first = tracker
            .on_pointer_event(&PointerEvent::began(1, 0.0, 0.0), &flat, &mut anchors)
            .unwrap();
        tracker
            .on_pointer_event(&PointerEvent::ended(1, 0.0, 0.0), &flat, &mut anchors)
            .unwrap();
        let second = tracker
            .on_pointer_event(&PointerEvent::began(1, 0.0, 0.0), &flat, &mut anchors)
            .unwrap();

        match (first, second) {
            (
                StrokeAction::Started { generation: a, .. },
                StrokeAction::Started { generation: b, .. },
            ) => assert!(b > a),
            other => panic!("expected two starts, got {other:?}"),
        }
    }

    #[test]
    fn test_stale_malformed_event_is_validation_error() {
        let mut tracker = open_tracker();
        let mut anchors = CountingAnchors { created: 0 };
        tracker
            .on_pointer_event(&PointerEvent::began(1, 0.0, 0.0), &flat, &mut anchors)
            .unwrap();
        let current = tracker.active_stroke(PointerId(1)).unwrap().generation();
        let stale = Generation(current.0 + 1);

        let err = tracker
            .on_stamped_event(&PointerEvent::moved(1, f32::NAN, 0.0), stale, &flat, &mut anchors)
            .unwrap_err();
        assert!(matches!(
            err,
            StrokeError::Validation(ValidationError::NonFinitePosition { .. })
        ));

        // Well-formed events with that stamp are still discarded as stale
        let action = tracker
            .on_stamped_event(&PointerEvent::moved(1, 1.0, 0.0), stale, &flat, &mut anchors)
            .unwrap();
        assert_eq!(action, StrokeAction::StaleEvent { id: PointerId(1) });
        assert_eq!(tracker.active_stroke(PointerId(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_poll_draw_gate() {
        let mut tracker = StrokeTracker::new();
        assert!(tracker.poll_draw_gate(&true));
        assert!(!tracker.poll_draw_gate(&false));
    }
}
