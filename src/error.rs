use thiserror::Error;

use crate::anchor::AnchorUnavailable;

/// A pointer event that cannot be applied to the tracker.
///
/// Validation happens before any state is touched, so a rejected event
/// never leaves a partially updated stroke behind.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ValidationError {
    #[error("screen position ({x}, {y}) is not finite")]
    NonFinitePosition { x: f32, y: f32 },

    #[error("unknown touch phase code {0}")]
    UnknownPhase(i32),

    #[error("screen position ({x}, {y}) projects to a non-finite world point")]
    NonFiniteProjection { x: f32, y: f32 },
}

/// Errors returned by [`crate::StrokeTracker::on_pointer_event`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrokeError {
    #[error("invalid pointer event: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    AnchorUnavailable(#[from] AnchorUnavailable),
}

/// Result type for tracker operations
pub type StrokeResult<T> = Result<T, StrokeError>;

/// Errors that can occur while saving or loading a sketch
#[derive(Debug, Error)]
pub enum SketchError {
    #[error("Failed to serialize sketch: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to access sketch file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stroke {index} has no points")]
    EmptyStroke { index: usize },
}

/// Errors that can occur while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid setting `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Errors from the undo/redo history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,
}
