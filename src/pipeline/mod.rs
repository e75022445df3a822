//! Pipeline stages for board-to-map generation.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. point the fetch or geocode stage at a mock
//! server) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ extract ──▶ [throttle ──▶ geocode]* ──▶ render
//! (board)   (scraper)    (per pin, sequential)      (template + script)
//! ```
//!
//! 1. [`fetch`]    — retrieve the board page body; distinguishes not-found
//!    from other transport failures
//! 2. [`extract`]  — parse the page and materialise the full pin list
//!    (the count must be known before iteration for progress percentages)
//! 3. [`throttle`] — enforce the minimum delay between geocoding calls
//! 4. [`geocode`]  — resolve one description to coordinates; the only
//!    per-pin network stage, and the only recoverable one
//! 5. [`render`]   — inject the generated marker script into the template
//!    and write the artifact, exactly once, after the loop completes

pub mod extract;
pub mod fetch;
pub mod geocode;
pub mod render;
pub mod throttle;
