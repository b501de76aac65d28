/// Immutable map from track type to handler

use crate::error::{Result, TrackError};
use crate::format::{SectorGeometry, TrackHandler, TrackType};
use std::collections::HashMap;

/// Handler lookup by track type, built once and never modified
pub struct Registry {
    handlers: HashMap<TrackType, &'static dyn TrackHandler>,
}

impl Registry {
    /// Build the registry of every handler in the crate
    pub fn new() -> Self {
        let mut handlers: HashMap<TrackType, &'static dyn TrackHandler> = HashMap::new();
        for handler in crate::protection::handlers().chain(crate::rtype::handlers()) {
            let previous = handlers.insert(handler.track_type(), handler);
            debug_assert!(previous.is_none(), "duplicate handler for {}", handler.track_type());
        }
        Self { handlers }
    }

    /// Get the handler for a track type
    pub fn get(&self, track_type: TrackType) -> Option<&'static dyn TrackHandler> {
        self.handlers.get(&track_type).copied()
    }

    /// Get the handler for a track type, failing for unregistered types
    pub fn handler(&self, track_type: TrackType) -> Result<&'static dyn TrackHandler> {
        self.get(track_type)
            .ok_or_else(|| TrackError::UnknownTrackType(track_type.name().to_string()))
    }

    /// Sector geometry of a track type; unregistered types have none
    pub fn geometry(&self, track_type: TrackType) -> SectorGeometry {
        self.get(track_type)
            .map(|h| h.geometry())
            .unwrap_or(SectorGeometry::RAW)
    }

    /// Registered track types in identifier order
    pub fn track_types(&self) -> Vec<TrackType> {
        let mut types: Vec<TrackType> = self.handlers.keys().copied().collect();
        types.sort();
        types
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if no handlers are registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
