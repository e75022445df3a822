//! # mapinterest
//!
//! Plot a Pinterest-style board on a Google map.
//!
//! ## Why this crate?
//!
//! Boards full of travel pins are lists, not maps. This crate scrapes a
//! board page, geocodes each pin's free-text description, and emits a
//! single self-contained HTML document with one map marker per located
//! pin — clicking a marker shows the pin's image. Pins that cannot be
//! geocoded are collected and reported, never silently dropped.
//!
//! ## Pipeline Overview
//!
//! ```text
//! board URL
//!  │
//!  ├─ 1. Fetch     retrieve {site}/{username}/{board}/
//!  ├─ 2. Extract   parse pins (description + image) via CSS selectors
//!  ├─ 3. Geocode   one call per pin, throttled (default 2 s spacing)
//!  ├─ 4. Bucket    resolved markers vs. unresolved pins
//!  └─ 5. Render    inject marker script into the template, write HTML
//! ```
//!
//! The geocoding loop is deliberately sequential: free geocoding tiers
//! rate-limit aggressively, and the throttle presumes single-flight use.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mapinterest::{generate_to_file, MapConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MapConfig::default();
//!     let output = generate_to_file("alice", "places", "output.html", &config).await?;
//!     eprintln!(
//!         "{}/{} pins located",
//!         output.stats.resolved_pins, output.stats.total_pins
//!     );
//!     for pin in &output.unresolved {
//!         eprintln!("could not locate: {}", pin.description);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mapinterest` binary (clap + anyhow + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! mapinterest = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{MapConfig, MapConfigBuilder, PinSelectors};
pub use error::{GeocodeError, MapinterestError};
pub use generate::{generate, generate_sync, generate_to_file};
pub use output::{GeoLocation, MapOutput, RawPinEntry, ResolvedMarker, RunStats, UnresolvedPin};
pub use pipeline::fetch::{BoardFetcher, HttpBoardFetcher};
pub use pipeline::geocode::{Geocoder, JsonGeocoder};
pub use pipeline::render::marker_script;
pub use pipeline::throttle::RateLimiter;
pub use progress::{NoopProgressSink, ProgressHandle, ProgressSink};
