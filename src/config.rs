//! Configuration types for map generation.
//!
//! All run behaviour is controlled through [`MapConfig`], built via its
//! [`MapConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs, log them, and diff two runs to understand why their
//! outputs differ.
//!
//! # Design choice: builder over constructor
//! The builder lets callers set only what they care about — usually
//! nothing, or a progress sink — and rely on documented defaults for the
//! rest. The collaborator slots (`fetcher`, `geocoder`) exist so tests and
//! embedders can swap the network edges for fakes without the library
//! knowing.

use crate::error::MapinterestError;
use crate::pipeline::fetch::BoardFetcher;
use crate::pipeline::geocode::Geocoder;
use crate::progress::ProgressHandle;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// CSS selectors used to pull pin entries out of the board page.
///
/// The defaults match the classic board markup (`.pin` containers with a
/// `p.description` and an `img.PinImageImg`); override them when scraping
/// a mirror with different class names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinSelectors {
    /// Selector matching one pin container element.
    pub pin: String,
    /// Selector for the description node inside a pin (first match wins).
    pub description: String,
    /// Selector for the image node inside a pin (its `src` attribute is read).
    pub image: String,
}

impl Default for PinSelectors {
    fn default() -> Self {
        Self {
            pin: ".pin".to_string(),
            description: "p.description".to_string(),
            image: "img.PinImageImg".to_string(),
        }
    }
}

impl PinSelectors {
    /// Check that all three selectors parse. Called by
    /// [`MapConfigBuilder::build`] so a typo fails the run up front
    /// instead of mid-extraction.
    pub(crate) fn validate(&self) -> Result<(), MapinterestError> {
        for (name, sel) in [
            ("pin", &self.pin),
            ("description", &self.description),
            ("image", &self.image),
        ] {
            Selector::parse(sel).map_err(|e| {
                MapinterestError::InvalidConfig(format!("invalid {name} selector '{sel}': {e}"))
            })?;
        }
        Ok(())
    }
}

/// Configuration for one map-generation run.
///
/// Built via [`MapConfig::builder()`] or [`MapConfig::default()`].
///
/// # Example
/// ```rust
/// use mapinterest::MapConfig;
///
/// let config = MapConfig::builder()
///     .throttle_ms(2000)
///     .template_path("custom.html")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct MapConfig {
    /// Base URL of the board site. Default: `https://pinterest.com`.
    ///
    /// The board page is fetched from `{source_base_url}/{username}/{board}/`.
    pub source_base_url: String,

    /// Base URL of the geocoding provider. Default: `https://maps.googleapis.com`.
    ///
    /// Pointing this at a local mock server is how the integration tests
    /// exercise the full pipeline without touching the real provider.
    pub geocode_base_url: String,

    /// Minimum delay between successive geocoding calls, in milliseconds.
    /// Default: 2000.
    ///
    /// A courtesy delay, not a token bucket: free geocoding tiers apply
    /// abuse protection well below one request per second, and a single
    /// "time of last call" suffices because the pipeline is single-flight.
    /// The first call never waits.
    pub throttle_ms: u64,

    /// Timeout for fetching the board page, in seconds. Default: 30.
    pub fetch_timeout_secs: u64,

    /// Per-call timeout for the geocoding provider, in seconds. Default: 10.
    ///
    /// A timed-out call is a transport failure for that pin only; the run
    /// continues with the next pin.
    pub geocode_timeout_secs: u64,

    /// Path to the map template. If `None`, `default.html` next to the
    /// executable is used.
    pub template_path: Option<PathBuf>,

    /// CSS selectors for pin extraction.
    pub selectors: PinSelectors,

    /// Progress sink receiving per-pin events. Default: none (silent).
    pub progress_sink: Option<ProgressHandle>,

    /// Pre-constructed board fetcher. If `None`, an HTTP fetcher against
    /// `source_base_url` is built per run.
    pub fetcher: Option<Arc<dyn BoardFetcher>>,

    /// Pre-constructed geocoder. If `None`, the JSON geocoding client
    /// against `geocode_base_url` is built per run.
    pub geocoder: Option<Arc<dyn Geocoder>>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            source_base_url: "https://pinterest.com".to_string(),
            geocode_base_url: "https://maps.googleapis.com".to_string(),
            throttle_ms: 2000,
            fetch_timeout_secs: 30,
            geocode_timeout_secs: 10,
            template_path: None,
            selectors: PinSelectors::default(),
            progress_sink: None,
            fetcher: None,
            geocoder: None,
        }
    }
}

impl fmt::Debug for MapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapConfig")
            .field("source_base_url", &self.source_base_url)
            .field("geocode_base_url", &self.geocode_base_url)
            .field("throttle_ms", &self.throttle_ms)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("geocode_timeout_secs", &self.geocode_timeout_secs)
            .field("template_path", &self.template_path)
            .field("selectors", &self.selectors)
            .field("progress_sink", &self.progress_sink.as_ref().map(|_| "<dyn ProgressSink>"))
            .field("fetcher", &self.fetcher.as_ref().map(|_| "<dyn BoardFetcher>"))
            .field("geocoder", &self.geocoder.as_ref().map(|_| "<dyn Geocoder>"))
            .finish()
    }
}

impl MapConfig {
    /// Create a new builder for `MapConfig`.
    pub fn builder() -> MapConfigBuilder {
        MapConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`MapConfig`].
pub struct MapConfigBuilder {
    config: MapConfig,
}

impl MapConfigBuilder {
    pub fn source_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.source_base_url = url.into();
        self
    }

    pub fn geocode_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.geocode_base_url = url.into();
        self
    }

    pub fn throttle_ms(mut self, ms: u64) -> Self {
        self.config.throttle_ms = ms;
        self
    }

    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs.max(1);
        self
    }

    pub fn geocode_timeout_secs(mut self, secs: u64) -> Self {
        self.config.geocode_timeout_secs = secs.max(1);
        self
    }

    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.template_path = Some(path.into());
        self
    }

    pub fn selectors(mut self, selectors: PinSelectors) -> Self {
        self.config.selectors = selectors;
        self
    }

    pub fn progress_sink(mut self, sink: ProgressHandle) -> Self {
        self.config.progress_sink = Some(sink);
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn BoardFetcher>) -> Self {
        self.config.fetcher = Some(fetcher);
        self
    }

    pub fn geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.config.geocoder = Some(geocoder);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<MapConfig, MapinterestError> {
        let c = &self.config;
        if c.source_base_url.is_empty() {
            return Err(MapinterestError::InvalidConfig(
                "source_base_url must not be empty".into(),
            ));
        }
        if c.geocode_base_url.is_empty() {
            return Err(MapinterestError::InvalidConfig(
                "geocode_base_url must not be empty".into(),
            ));
        }
        c.selectors.validate()?;
        Ok(self.config)
    }
}
