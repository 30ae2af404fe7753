#![warn(clippy::all, rust_2018_idioms)]

pub mod anchor;
pub mod app;
pub mod command;
pub mod error;
pub mod gate;
pub mod input;
pub mod panels;
pub mod projection;
pub mod renderer;
pub mod settings;
pub mod shared;
pub mod sketch;
pub mod stroke;
pub mod tracker;

pub use anchor::{AnchorHandle, AnchorProvider, AnchorUnavailable, SessionAnchors};
pub use app::PaintApp;
pub use command::{Command, CommandHistory};
pub use error::{StrokeError, ValidationError};
pub use gate::{DrawGateSource, GatePolicy, PlaneDetector};
pub use input::{InputHandler, PointerEvent, PointerId, PointerPhase, RawPointerEvent};
pub use projection::{CameraProjector, ScreenToWorldProjector, WorldPoint};
pub use renderer::Renderer;
pub use settings::PaintSettings;
pub use shared::SharedStrokeTracker;
pub use sketch::Sketch;
pub use stroke::{ActiveStroke, Generation, Stroke, StrokeRef};
pub use tracker::{StrokeAction, StrokeTracker};
