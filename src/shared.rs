use std::sync::Arc;

use parking_lot::Mutex;

use crate::anchor::AnchorProvider;
use crate::error::StrokeResult;
use crate::input::{PointerEvent, PointerId};
use crate::projection::ScreenToWorldProjector;
use crate::stroke::{Generation, Stroke};
use crate::tracker::{StrokeAction, StrokeTracker};

/// Cloneable handle to a tracker shared between input threads.
///
/// Every table mutation runs under one mutex. Threads that keep working on
/// a stroke after handing off its Began should use [`on_stamped_event`] with
/// the generation they were given, so events for a stroke that another
/// thread already ended are discarded instead of landing on a newer stroke
/// that reuses the pointer id.
///
/// [`on_stamped_event`]: SharedStrokeTracker::on_stamped_event
#[derive(Debug, Clone, Default)]
pub struct SharedStrokeTracker {
    inner: Arc<Mutex<StrokeTracker>>,
}

impl SharedStrokeTracker {
    pub fn new(tracker: StrokeTracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    pub fn set_draw_gate(&self, enabled: bool) {
        self.inner.lock().set_draw_gate(enabled);
    }

    pub fn is_drawing_enabled(&self) -> bool {
        self.inner.lock().is_drawing_enabled()
    }

    pub fn on_pointer_event<P, A>(
        &self,
        event: &PointerEvent,
        projector: &P,
        anchors: &mut A,
    ) -> StrokeResult<StrokeAction>
    where
        P: ScreenToWorldProjector + ?Sized,
        A: AnchorProvider + ?Sized,
    {
        self.inner.lock().on_pointer_event(event, projector, anchors)
    }

    pub fn on_stamped_event<P, A>(
        &self,
        event: &PointerEvent,
        generation: Generation,
        projector: &P,
        anchors: &mut A,
    ) -> StrokeResult<StrokeAction>
    where
        P: ScreenToWorldProjector + ?Sized,
        A: AnchorProvider + ?Sized,
    {
        self.inner
            .lock()
            .on_stamped_event(event, generation, projector, anchors)
    }

    /// Generation of the stroke currently owned by `id`
    pub fn generation_of(&self, id: PointerId) -> Option<Generation> {
        self.inner.lock().active_stroke(id).map(|s| s.generation())
    }

    pub fn active_count(&self) -> usize {
        self.inner.lock().active_count()
    }

    pub fn reset(&self) -> Vec<(PointerId, Stroke)> {
        self.inner.lock().reset()
    }
}
