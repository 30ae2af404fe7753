use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::projection::WorldPoint;

/// Opaque reference to a spatial anchor owned by the tracking subsystem.
///
/// A stroke only remembers which anchor it was started on. Creating,
/// releasing and updating the anchor itself is the provider's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorHandle(Uuid);

impl AnchorHandle {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Handle with a fixed value, handy for hosts that number anchors themselves
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for AnchorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "anchor:{}", self.0)
    }
}

/// The tracking subsystem refused to create an anchor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("anchor unavailable: {reason}")]
pub struct AnchorUnavailable {
    pub reason: String,
}

impl AnchorUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Creates anchors for new strokes.
pub trait AnchorProvider {
    fn create_anchor(&mut self, at: WorldPoint) -> Result<AnchorHandle, AnchorUnavailable>;
}

impl<F> AnchorProvider for F
where
    F: FnMut(WorldPoint) -> Result<AnchorHandle, AnchorUnavailable>,
{
    fn create_anchor(&mut self, at: WorldPoint) -> Result<AnchorHandle, AnchorUnavailable> {
        self(at)
    }
}

/// Anchor provider for hosts without a real tracking backend.
///
/// Anchors are pinned at the world position they were requested at and
/// live until released. An optional capacity mimics a platform that runs
/// out of trackable anchors.
#[derive(Debug, Default)]
pub struct SessionAnchors {
    anchors: HashMap<AnchorHandle, WorldPoint>,
    capacity: Option<usize>,
}

impl SessionAnchors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            anchors: HashMap::new(),
            capacity: Some(capacity),
        }
    }

    pub fn set_capacity_limit(&mut self, capacity: Option<usize>) {
        self.capacity = capacity;
    }

    pub fn position_of(&self, handle: AnchorHandle) -> Option<WorldPoint> {
        self.anchors.get(&handle).copied()
    }

    /// Forget an anchor. Returns false if it was not known.
    pub fn release(&mut self, handle: AnchorHandle) -> bool {
        self.anchors.remove(&handle).is_some()
    }

    /// Keep exactly the anchors some stroke still hangs off.
    ///
    /// Anchors missing from `live` are released. Live handles this provider
    /// does not know yet are pinned at the given position, past the capacity
    /// limit if need be, since their strokes already exist. Returns how many
    /// anchors were released.
    pub fn sync_live<I>(&mut self, live: I) -> usize
    where
        I: IntoIterator<Item = (AnchorHandle, WorldPoint)>,
    {
        let live: HashMap<AnchorHandle, WorldPoint> = live.into_iter().collect();
        let before = self.anchors.len();
        self.anchors.retain(|handle, _| live.contains_key(handle));
        let released = before - self.anchors.len();

        for (handle, at) in live {
            self.anchors.entry(handle).or_insert(at);
        }
        if released > 0 {
            debug!("Released {} unreferenced anchors", released);
        }
        released
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn clear(&mut self) {
        self.anchors.clear();
    }
}

impl AnchorProvider for SessionAnchors {
    fn create_anchor(&mut self, at: WorldPoint) -> Result<AnchorHandle, AnchorUnavailable> {
        if !at.is_finite() {
            return Err(AnchorUnavailable::new("anchor position is not finite"));
        }
        if let Some(capacity) = self.capacity {
            if self.anchors.len() >= capacity {
                warn!("Anchor limit of {} reached", capacity);
                return Err(AnchorUnavailable::new(format!(
                    "anchor limit of {capacity} reached"
                )));
            }
        }

        let handle = AnchorHandle::new(Uuid::new_v4());
        self.anchors.insert(handle, at);
        debug!("Created {} at {:?}", handle, at);
        Ok(handle)
    }
}
