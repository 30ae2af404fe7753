use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::anchor::AnchorHandle;
use crate::projection::WorldPoint;

/// Monotonic stamp given to each stroke a tracker starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Generation(pub u64);

// Completed stroke, never mutated again
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    anchor: AnchorHandle,
    points: Vec<WorldPoint>,
    generation: Generation,
}

// Shared handle for completed strokes
pub type StrokeRef = Arc<Stroke>;

impl Stroke {
    pub fn anchor(&self) -> AnchorHandle {
        self.anchor
    }

    pub fn points(&self) -> &[WorldPoint] {
        &self.points
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total polyline length in world units
    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

// Stroke still being drawn by a pointer
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveStroke {
    anchor: AnchorHandle,
    points: Vec<WorldPoint>,
    generation: Generation,
}

impl ActiveStroke {
    /// A stroke always starts with the point its anchor was created at.
    pub fn new(anchor: AnchorHandle, first_point: WorldPoint, generation: Generation) -> Self {
        Self {
            anchor,
            points: vec![first_point],
            generation,
        }
    }

    pub fn add_point(&mut self, point: WorldPoint) {
        self.points.push(point);
    }

    pub fn anchor(&self) -> AnchorHandle {
        self.anchor
    }

    pub fn points(&self) -> &[WorldPoint] {
        &self.points
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_point(&self) -> WorldPoint {
        // Never empty: constructed with one point, append-only
        self.points[self.points.len() - 1]
    }

    pub fn finish(self) -> Stroke {
        Stroke {
            anchor: self.anchor,
            points: self.points,
            generation: self.generation,
        }
    }
}
