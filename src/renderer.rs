use egui::{Align2, Color32, FontId, Painter, Pos2, Shape, Stroke as LineStyle};

use crate::projection::{CameraProjector, WorldPoint};
use crate::settings::PaintSettings;
use crate::sketch::Sketch;
use crate::stroke::ActiveStroke;

const BACKGROUND: Color32 = Color32::from_rgb(24, 26, 30);
const ACTIVE_COLOR: Color32 = Color32::from_rgb(255, 196, 0);
const ANCHOR_COLOR: Color32 = Color32::from_rgb(0, 180, 255);

/// Draws world-space strokes through the current camera.
#[derive(Debug, Clone)]
pub struct Renderer {
    show_anchors: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self { show_anchors: true }
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_anchors(&self) -> bool {
        self.show_anchors
    }

    pub fn set_show_anchors(&mut self, show: bool) {
        self.show_anchors = show;
    }

    /// Renders completed strokes, then the ones still being drawn on top.
    pub fn render<'a>(
        &self,
        painter: &Painter,
        camera: &CameraProjector,
        settings: &PaintSettings,
        sketch: &Sketch,
        active: impl Iterator<Item = &'a ActiveStroke>,
        drawing_enabled: bool,
    ) {
        let rect = painter.clip_rect();
        painter.rect_filled(rect, 0.0, BACKGROUND);

        let completed = LineStyle::new(settings.line_width, settings.line_color);
        for stroke in sketch.strokes() {
            self.draw_polyline(painter, camera, stroke.points(), completed);
        }

        let in_progress = LineStyle::new(settings.line_width, ACTIVE_COLOR);
        for stroke in active {
            self.draw_polyline(painter, camera, stroke.points(), in_progress);
        }

        if !drawing_enabled {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Looking for surfaces...",
                FontId::proportional(18.0),
                Color32::GRAY,
            );
        }
    }

    fn draw_polyline(
        &self,
        painter: &Painter,
        camera: &CameraProjector,
        points: &[WorldPoint],
        style: LineStyle,
    ) {
        for run in screen_runs(camera, points) {
            if run.len() == 1 {
                painter.circle_filled(run[0], style.width * 0.5, style.color);
            } else {
                painter.add(Shape::line(run, style));
            }
        }

        if self.show_anchors {
            if let Some(first) = points.first().and_then(|p| camera.world_to_screen(*p)) {
                painter.circle_stroke(first, style.width + 2.0, LineStyle::new(1.5, ANCHOR_COLOR));
            }
        }
    }
}

/// Splits a world polyline into the screen-space runs visible to `camera`.
///
/// Points behind the camera break the line.
pub fn screen_runs(camera: &CameraProjector, points: &[WorldPoint]) -> Vec<Vec<Pos2>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();

    for point in points {
        match camera.world_to_screen(*point) {
            Some(screen) => current.push(screen),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}
