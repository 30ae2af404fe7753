use log::info;
use serde::{Deserialize, Serialize};

/// Something the host can poll for "a surface has been found".
pub trait DrawGateSource {
    fn surface_detected(&self) -> bool;
}

impl DrawGateSource for bool {
    fn surface_detected(&self) -> bool {
        *self
    }
}

/// How plane notifications open the draw gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GatePolicy {
    /// Any planes-changed notification opens the gate for good
    #[default]
    Latch,
    /// Open while at least one plane is tracked
    TrackPlanes,
}

/// Turns plane-detection notifications into a draw gate.
#[derive(Debug, Clone, Default)]
pub struct PlaneDetector {
    policy: GatePolicy,
    tracked_planes: usize,
    latched: bool,
}

impl PlaneDetector {
    pub fn new(policy: GatePolicy) -> Self {
        Self {
            policy,
            tracked_planes: 0,
            latched: false,
        }
    }

    pub fn policy(&self) -> GatePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: GatePolicy) {
        self.policy = policy;
    }

    pub fn tracked_planes(&self) -> usize {
        self.tracked_planes
    }

    /// Record one planes-changed notification
    pub fn planes_changed(&mut self, added: usize, updated: usize, removed: usize) {
        self.tracked_planes = (self.tracked_planes + added).saturating_sub(removed);
        if !self.latched && added + updated + removed > 0 {
            info!(
                "First plane notification: {} added, {} updated, {} removed",
                added, updated, removed
            );
            self.latched = true;
        }
    }

    /// Back to the state of a fresh session
    pub fn reset(&mut self) {
        self.tracked_planes = 0;
        self.latched = false;
    }
}

impl DrawGateSource for PlaneDetector {
    fn surface_detected(&self) -> bool {
        match self.policy {
            GatePolicy::Latch => self.latched,
            GatePolicy::TrackPlanes => self.tracked_planes > 0,
        }
    }
}
