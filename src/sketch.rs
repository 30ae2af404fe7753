use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::anchor::AnchorHandle;
use crate::error::SketchError;
use crate::stroke::{Stroke, StrokeRef};

/// Completed strokes kept by the host for rendering and saving.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sketch {
    strokes: Vec<StrokeRef>,
}

impl Sketch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stroke(&mut self, stroke: StrokeRef) {
        self.strokes.push(stroke);
    }

    pub fn strokes(&self) -> &[StrokeRef] {
        &self.strokes
    }

    pub fn remove_last_stroke(&mut self) -> Option<StrokeRef> {
        self.strokes.pop()
    }

    pub fn clear(&mut self) -> Vec<StrokeRef> {
        std::mem::take(&mut self.strokes)
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(|s| s.len()).sum()
    }

    /// Strokes that hang off the given anchor
    pub fn strokes_on(&self, anchor: AnchorHandle) -> impl Iterator<Item = &Stroke> {
        self.strokes
            .iter()
            .filter(move |s| s.anchor() == anchor)
            .map(|s| &**s)
    }

    pub fn to_json(&self) -> Result<String, SketchError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, SketchError> {
        let sketch: Self = serde_json::from_str(text)?;
        sketch.validate()?;
        Ok(sketch)
    }

    /// Every stroke must keep at least the point it was anchored at
    pub fn validate(&self) -> Result<(), SketchError> {
        match self.strokes.iter().position(|s| s.is_empty()) {
            Some(index) => Err(SketchError::EmptyStroke { index }),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), SketchError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        log::info!("Saved {} strokes to {}", self.len(), path.display());
        Ok(())
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SketchError> {
        let path = path.as_ref();
        let sketch = Self::from_json(&fs::read_to_string(path)?)?;
        log::info!("Loaded {} strokes from {}", sketch.len(), path.display());
        Ok(sketch)
    }
}
