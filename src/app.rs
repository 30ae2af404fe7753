use std::path::PathBuf;
use std::sync::Arc;

use egui::Rect;
use glam::{Quat, Vec3};

use crate::anchor::SessionAnchors;
use crate::command::{Command, CommandHistory};
use crate::gate::PlaneDetector;
use crate::input::{InputHandler, PointerEvent};
use crate::panels::{central_panel, tools_panel};
use crate::projection::CameraProjector;
use crate::renderer::Renderer;
use crate::settings::PaintSettings;
use crate::sketch::Sketch;
use crate::tracker::{StrokeAction, StrokeTracker};

/// Desktop host for the stroke tracker.
///
/// Stands in for the AR runtime: mouse and touch become pointer events, a
/// button simulates plane detection and a yaw slider turns the camera so the
/// strokes can be seen from another angle.
///
/// We derive Deserialize/Serialize so we can persist app state on shutdown.
#[derive(serde::Deserialize, serde::Serialize, Debug)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct PaintApp {
    settings: PaintSettings,
    sketch: Sketch,
    camera_yaw_degrees: f32,
    sketch_path: PathBuf,

    #[serde(skip)]
    tracker: StrokeTracker,
    #[serde(skip)]
    anchors: SessionAnchors,
    #[serde(skip)]
    planes: PlaneDetector,
    #[serde(skip)]
    history: CommandHistory,
    #[serde(skip)]
    input: InputHandler,
    #[serde(skip)]
    renderer: Renderer,
    #[serde(skip)]
    status: Option<String>,
}

impl Default for PaintApp {
    fn default() -> Self {
        let settings = PaintSettings::default();
        Self {
            planes: PlaneDetector::new(settings.gate_policy),
            settings,
            sketch: Sketch::new(),
            camera_yaw_degrees: 0.0,
            sketch_path: PathBuf::from("sketch.json"),
            tracker: StrokeTracker::new(),
            anchors: SessionAnchors::new(),
            history: CommandHistory::new(),
            input: InputHandler::default(),
            renderer: Renderer::new(),
            status: None,
        }
    }
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Option<PaintSettings>) -> Self {
        let mut app: Self = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        if let Some(settings) = settings {
            app.settings = settings;
        }
        if let Err(err) = app.sketch.validate() {
            log::warn!("Discarding restored sketch: {}", err);
            app.sketch = Sketch::new();
        }
        app.apply_settings();
        app.sync_anchors();
        log::info!("Restored {} strokes", app.sketch.len());
        app
    }

    pub fn with_settings(settings: PaintSettings) -> Self {
        let mut app = Self {
            settings,
            ..Self::default()
        };
        app.apply_settings();
        app
    }

    /// Push settings into the runtime parts
    pub fn apply_settings(&mut self) {
        self.planes.set_policy(self.settings.gate_policy);
        self.anchors.set_capacity_limit(self.settings.max_anchors);
    }

    pub fn settings(&self) -> &PaintSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut PaintSettings {
        &mut self.settings
    }

    pub fn sketch(&self) -> &Sketch {
        &self.sketch
    }

    pub fn tracker(&self) -> &StrokeTracker {
        &self.tracker
    }

    pub fn anchors(&self) -> &SessionAnchors {
        &self.anchors
    }

    pub fn planes(&self) -> &PlaneDetector {
        &self.planes
    }

    pub fn command_history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn camera_yaw_degrees_mut(&mut self) -> &mut f32 {
        &mut self.camera_yaw_degrees
    }

    pub fn sketch_path_mut(&mut self) -> &mut PathBuf {
        &mut self.sketch_path
    }

    pub fn camera(&self, viewport: Rect) -> CameraProjector {
        let rotation = Quat::from_rotation_y(self.camera_yaw_degrees.to_radians());
        self.settings
            .camera(viewport)
            .with_pose(Vec3::ZERO, rotation)
    }

    /// Feed one simulated planes-changed notification
    pub fn simulate_plane(&mut self, added: usize, removed: usize) {
        self.planes.planes_changed(added, 0, removed);
    }

    /// Release anchors no stroke hangs off and pin the ones strokes came back with
    fn sync_anchors(&mut self) {
        let finished = self.sketch.strokes().iter().map(|s| (s.anchor(), s.points()));
        let active = self
            .tracker
            .active_strokes()
            .map(|(_, s)| (s.anchor(), s.points()));
        let live = finished
            .chain(active)
            .filter_map(|(anchor, points)| points.first().map(|at| (anchor, *at)));
        self.anchors.sync_live(live);
    }

    /// Start a new session: active strokes are dropped along with every anchor
    /// the sketch no longer needs, and the gate closes
    pub fn reset_session(&mut self) {
        self.tracker.reset();
        self.sync_anchors();
        self.planes.reset();
        self.tracker.set_draw_gate(false);
        self.status = Some("Session reset".to_owned());
    }

    /// Drain this frame's input into the tracker
    pub fn handle_input(&mut self, ctx: &egui::Context, canvas_rect: Rect) {
        self.input.set_canvas_rect(canvas_rect);
        let events = self.input.process_input(ctx);
        self.handle_events(events, canvas_rect);
    }

    /// Apply pointer events against the camera for `canvas_rect`
    pub fn handle_events(
        &mut self,
        events: impl IntoIterator<Item = PointerEvent>,
        canvas_rect: Rect,
    ) {
        self.tracker.poll_draw_gate(&self.planes);

        let camera = self.camera(canvas_rect);
        for event in events {
            match self.tracker.on_pointer_event(&event, &camera, &mut self.anchors) {
                Ok(StrokeAction::Ended { stroke, .. }) => {
                    self.history
                        .execute(Command::AddStroke(Arc::new(stroke)), &mut self.sketch);
                }
                Ok(StrokeAction::Canceled { stroke, .. }) => {
                    self.anchors.release(stroke.anchor());
                }
                Ok(_) => {}
                Err(err) => {
                    log::warn!("Pointer event rejected: {}", err);
                    self.status = Some(err.to_string());
                }
            }
        }
    }

    pub fn render(&self, painter: &egui::Painter, canvas_rect: Rect) {
        self.renderer.render(
            painter,
            &self.camera(canvas_rect),
            &self.settings,
            &self.sketch,
            self.tracker.active_strokes().map(|(_, stroke)| stroke),
            self.tracker.is_drawing_enabled(),
        );
    }

    pub fn undo(&mut self) {
        match self.history.undo(&mut self.sketch) {
            Ok(()) => self.sync_anchors(),
            Err(err) => log::debug!("Undo: {}", err),
        }
    }

    pub fn redo(&mut self) {
        match self.history.redo(&mut self.sketch) {
            Ok(()) => self.sync_anchors(),
            Err(err) => log::debug!("Redo: {}", err),
        }
    }

    pub fn clear_sketch(&mut self) {
        self.history
            .execute(Command::Clear { removed: Vec::new() }, &mut self.sketch);
        self.sync_anchors();
    }

    pub fn save_sketch(&mut self) {
        self.status = Some(match self.sketch.save_to(&self.sketch_path) {
            Ok(()) => format!("Saved {} strokes", self.sketch.len()),
            Err(err) => {
                log::error!("Save failed: {}", err);
                err.to_string()
            }
        });
    }

    pub fn load_sketch(&mut self) {
        self.status = Some(match Sketch::load_from(&self.sketch_path) {
            Ok(sketch) => {
                self.sketch = sketch;
                self.history.clear();
                self.sync_anchors();
                format!("Loaded {} strokes", self.sketch.len())
            }
            Err(err) => {
                log::error!("Load failed: {}", err);
                err.to_string()
            }
        });
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        tools_panel(self, ctx);
        central_panel(self, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{PointerId, PointerPhase};
    use egui::{pos2, vec2};

    fn canvas() -> Rect {
        Rect::from_min_size(egui::Pos2::ZERO, vec2(200.0, 200.0))
    }

    fn capped_app(max_anchors: usize) -> PaintApp {
        let mut app = PaintApp::with_settings(PaintSettings {
            max_anchors: Some(max_anchors),
            ..PaintSettings::default()
        });
        app.simulate_plane(1, 0);
        app
    }

    // One mouse stroke from (x, 50) to (x + 20, 60)
    fn draw(app: &mut PaintApp, x: f32) {
        let mouse = |phase, pos| PointerEvent::new(PointerId::MOUSE, phase, pos);
        app.handle_events(
            [
                mouse(PointerPhase::Began, pos2(x, 50.0)),
                mouse(PointerPhase::Moved, pos2(x + 20.0, 60.0)),
                mouse(PointerPhase::Ended, pos2(x + 20.0, 60.0)),
            ],
            canvas(),
        );
    }

    #[test]
    fn test_anchor_limit_frees_up_after_clear() {
        let mut app = capped_app(2);
        draw(&mut app, 10.0);
        draw(&mut app, 40.0);
        assert_eq!(app.sketch().len(), 2);

        draw(&mut app, 70.0);
        assert_eq!(app.sketch().len(), 2);
        assert!(app.status().is_some_and(|s| s.contains("limit")));

        app.clear_sketch();
        assert!(app.anchors().is_empty());

        draw(&mut app, 70.0);
        assert_eq!(app.sketch().len(), 1);
        assert_eq!(app.anchors().len(), 1);
    }

    #[test]
    fn test_undo_and_reset_release_anchors() {
        let mut app = capped_app(2);
        draw(&mut app, 10.0);
        draw(&mut app, 40.0);

        app.undo();
        assert_eq!(app.anchors().len(), 1);
        app.redo();
        assert_eq!(app.anchors().len(), 2);
        let last = app.sketch().strokes()[1].clone();
        assert_eq!(app.anchors().position_of(last.anchor()), Some(last.points()[0]));

        app.undo();
        app.clear_sketch();
        app.reset_session();
        app.simulate_plane(1, 0);

        draw(&mut app, 70.0);
        assert_eq!(app.sketch().len(), 1);
        assert_eq!(app.anchors().len(), 1);
    }

    #[test]
    fn test_undoing_clear_restores_anchors() {
        let mut app = capped_app(2);
        draw(&mut app, 10.0);
        draw(&mut app, 40.0);

        app.clear_sketch();
        app.undo();

        assert_eq!(app.sketch().len(), 2);
        for stroke in app.sketch().strokes() {
            assert!(app.anchors().position_of(stroke.anchor()).is_some());
        }
        draw(&mut app, 70.0);
        assert_eq!(app.sketch().len(), 2);
    }

    #[test]
    fn test_loading_sketch_swaps_anchor_set() {
        let mut app = capped_app(2);
        draw(&mut app, 10.0);
        let saved = app.sketch().strokes()[0].clone();
        let path = std::env::temp_dir().join(format!("ar_paint_app_{}.json", std::process::id()));
        *app.sketch_path_mut() = path.clone();
        app.save_sketch();

        app.clear_sketch();
        draw(&mut app, 40.0);
        draw(&mut app, 70.0);
        app.load_sketch();
        let _ = std::fs::remove_file(&path);

        assert_eq!(app.sketch().len(), 1);
        assert_eq!(app.anchors().len(), 1);
        assert!(app.anchors().position_of(saved.anchor()).is_some());
    }

    #[test]
    fn test_reset_session_closes_gate() {
        let mut app = PaintApp::default();
        app.simulate_plane(1, 0);
        app.tracker.poll_draw_gate(&app.planes);
        assert!(app.tracker().is_drawing_enabled());

        app.reset_session();
        assert!(!app.tracker().is_drawing_enabled());
        assert!(!app.tracker.poll_draw_gate(&app.planes));
    }

    #[test]
    fn test_settings_apply_anchor_limit() {
        let app = PaintApp::with_settings(PaintSettings {
            max_anchors: Some(0),
            ..PaintSettings::default()
        });

        let mut anchors = app.anchors;
        assert!(crate::AnchorProvider::create_anchor(&mut anchors, Vec3::ZERO).is_err());
    }

    #[test]
    fn test_persisted_state_round_trip() {
        let mut app = PaintApp::default();
        *app.camera_yaw_degrees_mut() = 30.0;

        let json = serde_json::to_string(&app).unwrap();
        let restored: PaintApp = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.camera_yaw_degrees, 30.0);
        assert!(restored.sketch().is_empty());
    }
}
