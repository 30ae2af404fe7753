use egui::{Pos2, Rect, pos2};
use glam::{Quat, Vec3};

/// A point in scene world space.
pub type WorldPoint = Vec3;

/// Maps a screen position to a world point for the current frame.
///
/// Implementations must be pure for a given frame: the same screen position
/// always yields the same world point until the camera moves.
pub trait ScreenToWorldProjector {
    fn project(&self, screen: Pos2) -> WorldPoint;
}

impl<F> ScreenToWorldProjector for F
where
    F: Fn(Pos2) -> WorldPoint,
{
    fn project(&self, screen: Pos2) -> WorldPoint {
        self(screen)
    }
}

/// Pinhole camera that unprojects screen positions at a fixed depth in front
/// of the lens.
///
/// Screen space follows egui: origin at the top-left of `viewport`, y down.
/// The camera looks along its local -Z axis with +Y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraProjector {
    pub viewport: Rect,
    /// Vertical field of view in radians
    pub vertical_fov: f32,
    pub position: Vec3,
    pub rotation: Quat,
    /// Depth at which touches are placed, in world units
    pub distance_from_camera: f32,
}

impl CameraProjector {
    pub fn new(viewport: Rect, vertical_fov: f32, distance_from_camera: f32) -> Self {
        Self {
            viewport,
            vertical_fov,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            distance_from_camera,
        }
    }

    pub fn with_pose(mut self, position: Vec3, rotation: Quat) -> Self {
        self.position = position;
        self.rotation = rotation;
        self
    }

    fn aspect(&self) -> f32 {
        self.viewport.width() / self.viewport.height()
    }

    fn half_extent_at(&self, depth: f32) -> (f32, f32) {
        let half_height = (self.vertical_fov * 0.5).tan() * depth;
        (half_height * self.aspect(), half_height)
    }

    /// Projects a world point back onto the screen.
    ///
    /// Returns `None` for points on or behind the camera plane.
    pub fn world_to_screen(&self, point: WorldPoint) -> Option<Pos2> {
        let local = self.rotation.inverse() * (point - self.position);
        let depth = -local.z;
        if depth <= f32::EPSILON {
            return None;
        }

        let (half_width, half_height) = self.half_extent_at(depth);
        let ndc_x = local.x / half_width;
        let ndc_y = local.y / half_height;

        let screen = pos2(
            self.viewport.min.x + (ndc_x + 1.0) * 0.5 * self.viewport.width(),
            self.viewport.min.y + (1.0 - ndc_y) * 0.5 * self.viewport.height(),
        );
        screen.is_finite().then_some(screen)
    }
}

impl ScreenToWorldProjector for CameraProjector {
    fn project(&self, screen: Pos2) -> WorldPoint {
        let ndc_x = 2.0 * (screen.x - self.viewport.min.x) / self.viewport.width() - 1.0;
        let ndc_y = 1.0 - 2.0 * (screen.y - self.viewport.min.y) / self.viewport.height();

        let depth = self.distance_from_camera;
        let (half_width, half_height) = self.half_extent_at(depth);
        let local = Vec3::new(ndc_x * half_width, ndc_y * half_height, -depth);

        self.position + self.rotation * local
    }
}
