//! Result types produced by a map-generation run.
//!
//! A run partitions the board's pins into two sets: every pin becomes
//! exactly one [`ResolvedMarker`] (geocoding succeeded) or one
//! [`UnresolvedPin`] (geocoding failed), never both, never neither.
//! [`MapOutput`] carries both sets plus run statistics and is handed to
//! the renderer unchanged — nothing mutates it after the per-pin loop
//! finishes.

use crate::error::GeocodeError;
use serde::{Deserialize, Serialize};

/// One raw entry extracted from the board page, before geocoding.
///
/// Produced by [`crate::pipeline::extract::extract_pins`] in document
/// order and consumed exactly once by the orchestrator. Empty fields are
/// passed through unchanged; an unusable description simply fails to
/// geocode downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPinEntry {
    /// Free-text description of the pin (geocoding input).
    pub description: String,
    /// Source URL of the pin's image, shown in the marker's info window.
    pub image_url: String,
}

/// A coordinate pair returned by the geocoding provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// A pin successfully mapped to coordinates, eligible for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMarker {
    /// The pin's position in extraction order (0..N-1 over *all* pins,
    /// resolved or not). The generated script correlates each marker
    /// statement with its click binding by this index, so it must be
    /// stable and unique.
    pub index: usize,
    pub description: String,
    pub image_url: String,
    pub location: GeoLocation,
}

/// A pin whose description could not be geocoded.
///
/// Retained only for the end-of-run advisory; never rendered on the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnresolvedPin {
    pub description: String,
    /// Why the pin was demoted. All failure kinds are treated identically
    /// by the pipeline; the reason is kept for operator visibility.
    pub reason: GeocodeError,
}

/// Statistics for one map-generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Pins found on the board page.
    pub total_pins: usize,
    /// Pins that geocoded successfully.
    pub resolved_pins: usize,
    /// Pins demoted to the unresolved list.
    pub unresolved_pins: usize,
    /// Wall-clock time spent fetching the board page.
    pub fetch_duration_ms: u64,
    /// Wall-clock time spent in the geocoding loop (includes throttling).
    pub geocode_duration_ms: u64,
    /// Total run time.
    pub total_duration_ms: u64,
}

/// Complete result of a map-generation run.
///
/// Returned by [`crate::generate`] even when some (or all) pins failed to
/// geocode — rendering proceeds with whatever resolved markers exist,
/// even zero. Check `stats.unresolved_pins` or call [`Self::into_result`]
/// to treat partial failure as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapOutput {
    /// Resolved markers in extraction order.
    pub markers: Vec<ResolvedMarker>,
    /// Pins that could not be located, in extraction order.
    pub unresolved: Vec<UnresolvedPin>,
    pub stats: RunStats,
}

impl MapOutput {
    /// Strict view: `Err` if any pin failed to geocode.
    ///
    /// The pipeline itself never aborts on per-pin failures; this is for
    /// callers that want an all-or-nothing contract.
    pub fn into_result(self) -> Result<Self, crate::error::MapinterestError> {
        if self.unresolved.is_empty() {
            Ok(self)
        } else {
            Err(crate::error::MapinterestError::PartialFailure {
                unresolved: self.stats.unresolved_pins,
                total: self.stats.total_pins,
            })
        }
    }
}
