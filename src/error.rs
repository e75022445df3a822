//! Error types for the mapinterest library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`MapinterestError`] — **Fatal**: the run cannot proceed at all
//!   (board not found, fetch failed, template missing or corrupt).
//!   Returned as `Err(MapinterestError)` from the top-level `generate*`
//!   functions. No output artifact is written on a fatal error.
//!
//! * [`GeocodeError`] — **Non-fatal**: a single pin's description could not
//!   be resolved to coordinates (provider unreachable, zero results,
//!   unparseable response). Stored inside [`crate::output::UnresolvedPin`]
//!   so callers can inspect partial success rather than losing the whole
//!   map to one bad pin.
//!
//! The separation keeps the per-pin recovery contract explicit: geocoding
//! failures are contained and reported in the post-run advisory, while
//! fetch-phase and render-phase failures abort before anything is written.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the mapinterest library.
///
/// Per-pin geocoding failures use [`GeocodeError`] and are stored in
/// [`crate::output::UnresolvedPin`] rather than propagated here.
#[derive(Debug, Error)]
pub enum MapinterestError {
    // ── Fetch errors ──────────────────────────────────────────────────────
    /// The board page returned a not-found response.
    #[error("Board '{username}/{board}' could not be found\nCheck the username and board name.")]
    BoardNotFound { username: String, board: String },

    /// The board page could not be fetched for any other reason.
    #[error("Failed to fetch '{url}': {reason}\nCheck your internet connection.")]
    FetchFailed { url: String, reason: String },

    /// Fetching the board page exceeded the configured timeout.
    #[error("Fetch timed out after {secs}s for '{url}'\nIncrease --fetch-timeout.")]
    FetchTimeout { url: String, secs: u64 },

    // ── Template errors ───────────────────────────────────────────────────
    /// The map template file does not exist. This is an installation or
    /// packaging error, not a runtime data error.
    #[error("Map template not found: '{path}'\nThe template ships alongside the executable; pass --template to use another file.")]
    TemplateMissing { path: PathBuf },

    /// The template exists but has no usable placeholder element.
    #[error("Map template '{path}' is corrupt: {detail}")]
    TemplateCorrupt { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output HTML file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed or a configured selector is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Strict-mode errors ────────────────────────────────────────────────
    /// Some pins could not be geocoded. Only returned by
    /// [`crate::output::MapOutput::into_result`]; the pipeline itself
    /// treats per-pin failures as recoverable.
    #[error("{unresolved}/{total} pins could not be located")]
    PartialFailure { unresolved: usize, total: usize },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single pin.
///
/// Stored alongside the pin's description in
/// [`crate::output::UnresolvedPin`] when geocoding fails. The run
/// continues regardless of how many pins fail; the orchestrator surfaces
/// the full list in the end-of-run advisory.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum GeocodeError {
    /// The geocoding provider was unreachable or answered with an error status.
    #[error("geocoding provider unreachable: {detail}")]
    Transport { detail: String },

    /// The provider answered but returned zero results for the text.
    #[error("no geocoding results for '{query}'")]
    NoResults { query: String },

    /// The response could not be parsed into exactly one coordinate pair.
    #[error("unparseable geocoding response: {detail}")]
    Malformed { detail: String },
}
