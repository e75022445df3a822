//! Map-generation entry points.
//!
//! This is the orchestrator: it drives fetch → extract → the sequential
//! geocoding loop → render, buckets every pin into exactly one of the two
//! result sets, and emits progress events along the way. The loop is
//! strictly sequential in extraction order — the rate limiter presumes
//! exclusive, single-flight access to the geocoding provider, so there is
//! never more than one geocoding call in flight.
//!
//! Per-pin geocoding failures are fully contained here: the pin is
//! demoted to the unresolved list and the loop continues. Only the fetch
//! phase and the render phase can abort a run, and an aborted run writes
//! nothing.

use crate::config::MapConfig;
use crate::error::MapinterestError;
use crate::output::{MapOutput, ResolvedMarker, RunStats, UnresolvedPin};
use crate::pipeline::fetch::{BoardFetcher, HttpBoardFetcher};
use crate::pipeline::geocode::{Geocoder, JsonGeocoder};
use crate::pipeline::throttle::RateLimiter;
use crate::pipeline::{extract, render};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Run the pipeline up to (but not including) rendering.
///
/// Fetches the board page, extracts its pins, geocodes each description
/// in extraction order with the configured throttle, and returns the
/// accumulated result set. Every extracted pin appears in exactly one of
/// `output.markers` / `output.unresolved`.
///
/// # Errors
/// Returns `Err(MapinterestError)` only for fatal errors: the board could
/// not be found or fetched. Geocoding failures never abort the run.
pub async fn generate(
    username: &str,
    board: &str,
    config: &MapConfig,
) -> Result<MapOutput, MapinterestError> {
    let total_start = Instant::now();
    info!("Starting map generation for {}/{}", username, board);

    // ── Step 1: Fetch the board page ─────────────────────────────────────
    let fetch_start = Instant::now();
    let fetcher = resolve_fetcher(config)?;
    let body = fetcher.fetch(username, board).await?;
    let fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;

    // ── Step 2: Extract pins ─────────────────────────────────────────────
    let pins = extract::extract_pins(&body, &config.selectors)?;
    let count = pins.len();
    info!("{} pins found on {}/{}", count, username, board);

    if let Some(ref sink) = config.progress_sink {
        sink.on_run_start(count);
    }

    // ── Step 3: Geocode, one pin at a time ───────────────────────────────
    let geocode_start = Instant::now();
    let geocoder = resolve_geocoder(config)?;
    let mut limiter = RateLimiter::new(Duration::from_millis(config.throttle_ms));

    let mut markers: Vec<ResolvedMarker> = Vec::new();
    let mut unresolved: Vec<UnresolvedPin> = Vec::new();

    for (i, pin) in pins.into_iter().enumerate() {
        limiter.throttle().await;

        match geocoder.resolve(&pin.description).await {
            Ok(location) => {
                debug!("Pin {}: '{}' resolved", i, pin.description);
                markers.push(ResolvedMarker {
                    index: i,
                    description: pin.description,
                    image_url: pin.image_url,
                    location,
                });
            }
            Err(reason) => {
                warn!("Pin {}: '{}' not located — {}", i, pin.description, reason);
                unresolved.push(UnresolvedPin {
                    description: pin.description,
                    reason,
                });
            }
        }

        if let Some(ref sink) = config.progress_sink {
            let percentage = ((i + 1) * 100 / count) as u8;
            let message = format!("{} of {} done ({}%)", i + 1, count, percentage);
            sink.on_progress(percentage, &message);
        }
    }
    let geocode_duration_ms = geocode_start.elapsed().as_millis() as u64;

    // ── Step 4: End-of-run advisory ──────────────────────────────────────
    if !unresolved.is_empty() {
        if let Some(ref sink) = config.progress_sink {
            let descriptions: Vec<String> =
                unresolved.iter().map(|p| p.description.clone()).collect();
            sink.on_unresolved_summary(&descriptions);
        }
    }
    if let Some(ref sink) = config.progress_sink {
        sink.on_run_complete(count, markers.len());
    }

    let stats = RunStats {
        total_pins: count,
        resolved_pins: markers.len(),
        unresolved_pins: unresolved.len(),
        fetch_duration_ms,
        geocode_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Geocoding complete: {}/{} pins located, {}ms total",
        stats.resolved_pins, stats.total_pins, stats.total_duration_ms
    );

    Ok(MapOutput {
        markers,
        unresolved,
        stats,
    })
}

/// Run the full pipeline and write the map artifact to `output_path`.
///
/// The artifact is produced only after every pin has been processed — no
/// partial or streaming writes — and rendering proceeds with whatever
/// resolved markers exist, even zero.
pub async fn generate_to_file(
    username: &str,
    board: &str,
    output_path: impl AsRef<Path>,
    config: &MapConfig,
) -> Result<MapOutput, MapinterestError> {
    let output = generate(username, board, config).await?;

    let template_path = resolve_template_path(config)?;
    render::render_map(&output.markers, &template_path, output_path.as_ref()).await?;

    Ok(output)
}

/// Synchronous wrapper around [`generate_to_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    username: &str,
    board: &str,
    output_path: impl AsRef<Path>,
    config: &MapConfig,
) -> Result<MapOutput, MapinterestError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| MapinterestError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(generate_to_file(username, board, output_path, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Use the injected fetcher when present, otherwise build the HTTP
/// fetcher against the configured base URL. Injection exists for tests
/// and embedders that source board markup elsewhere.
fn resolve_fetcher(config: &MapConfig) -> Result<Arc<dyn BoardFetcher>, MapinterestError> {
    if let Some(ref fetcher) = config.fetcher {
        return Ok(Arc::clone(fetcher));
    }
    Ok(Arc::new(HttpBoardFetcher::new(
        config.source_base_url.clone(),
        config.fetch_timeout_secs,
    )?))
}

fn resolve_geocoder(config: &MapConfig) -> Result<Arc<dyn Geocoder>, MapinterestError> {
    if let Some(ref geocoder) = config.geocoder {
        return Ok(Arc::clone(geocoder));
    }
    let geocoder = JsonGeocoder::new(config.geocode_base_url.clone(), config.geocode_timeout_secs)
        .map_err(|e| MapinterestError::Internal(format!("geocoding client: {e}")))?;
    Ok(Arc::new(geocoder))
}

/// The template ships alongside the executable unless overridden.
fn resolve_template_path(config: &MapConfig) -> Result<PathBuf, MapinterestError> {
    if let Some(ref path) = config.template_path {
        return Ok(path.clone());
    }
    let exe = std::env::current_exe()
        .map_err(|e| MapinterestError::Internal(format!("cannot locate executable: {e}")))?;
    let dir = exe
        .parent()
        .ok_or_else(|| MapinterestError::Internal("executable has no parent directory".into()))?;
    Ok(dir.join("default.html"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeocodeError;
    use crate::output::GeoLocation;
    use async_trait::async_trait;

    /// Serves a fixed page body for any board.
    struct StaticFetcher(String);

    #[async_trait]
    impl BoardFetcher for StaticFetcher {
        async fn fetch(&self, _username: &str, _board: &str) -> Result<String, MapinterestError> {
            Ok(self.0.clone())
        }
    }

    /// Resolves descriptions from a fixed table; everything else fails
    /// with NoResults.
    struct TableGeocoder(Vec<(&'static str, GeoLocation)>);

    #[async_trait]
    impl Geocoder for TableGeocoder {
        async fn resolve(&self, free_text: &str) -> Result<GeoLocation, GeocodeError> {
            self.0
                .iter()
                .find(|(known, _)| *known == free_text)
                .map(|(_, loc)| *loc)
                .ok_or_else(|| GeocodeError::NoResults {
                    query: free_text.to_string(),
                })
        }
    }

    fn board_page(descriptions: &[&str]) -> String {
        let mut html = String::from("<html><body>");
        for desc in descriptions {
            html.push_str(&format!(
                "<div class=\"pin\"><p class=\"description\">{desc}</p>\
                 <img class=\"PinImageImg\" src=\"https://img.example/{desc}.jpg\"></div>"
            ));
        }
        html.push_str("</body></html>");
        html
    }

    fn config_with(
        page: String,
        geocoder: TableGeocoder,
    ) -> MapConfig {
        MapConfig::builder()
            .throttle_ms(0)
            .fetcher(Arc::new(StaticFetcher(page)))
            .geocoder(Arc::new(geocoder))
            .build()
            .unwrap()
    }

    const AMS: GeoLocation = GeoLocation {
        latitude: 52.370216,
        longitude: 4.895168,
    };

    #[tokio::test]
    async fn every_pin_lands_in_exactly_one_bucket() {
        let config = config_with(
            board_page(&["Amsterdam", "???", "Paris"]),
            TableGeocoder(vec![
                ("Amsterdam", AMS),
                ("Paris", GeoLocation { latitude: 48.8566, longitude: 2.3522 }),
            ]),
        );

        let output = generate("alice", "places", &config).await.unwrap();
        assert_eq!(output.stats.total_pins, 3);
        assert_eq!(output.markers.len() + output.unresolved.len(), 3);
        assert_eq!(output.markers.len(), 2);
        assert_eq!(output.unresolved.len(), 1);
        assert_eq!(output.unresolved[0].description, "???");
    }

    #[tokio::test]
    async fn marker_index_is_the_extraction_position() {
        // The middle pin fails; the survivors keep positions 0 and 2.
        let config = config_with(
            board_page(&["Amsterdam", "???", "Paris"]),
            TableGeocoder(vec![
                ("Amsterdam", AMS),
                ("Paris", GeoLocation { latitude: 48.8566, longitude: 2.3522 }),
            ]),
        );

        let output = generate("alice", "places", &config).await.unwrap();
        let indices: Vec<usize> = output.markers.iter().map(|m| m.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(output.markers[0].description, "Amsterdam");
        assert_eq!(output.markers[1].description, "Paris");
    }

    #[tokio::test]
    async fn empty_board_makes_no_geocode_calls() {
        struct PanickingGeocoder;

        #[async_trait]
        impl Geocoder for PanickingGeocoder {
            async fn resolve(&self, _free_text: &str) -> Result<GeoLocation, GeocodeError> {
                panic!("geocoder must not be called for an empty board");
            }
        }

        let config = MapConfig::builder()
            .throttle_ms(0)
            .fetcher(Arc::new(StaticFetcher(board_page(&[]))))
            .geocoder(Arc::new(PanickingGeocoder))
            .build()
            .unwrap();

        let output = generate("alice", "empty", &config).await.unwrap();
        assert_eq!(output.stats.total_pins, 0);
        assert!(output.markers.is_empty());
        assert!(output.unresolved.is_empty());
    }

    #[tokio::test]
    async fn progress_events_carry_floored_percentages() {
        use crate::progress::ProgressSink;
        use std::sync::Mutex;

        #[derive(Default)]
        struct Recorder {
            started: Mutex<Option<usize>>,
            events: Mutex<Vec<(u8, String)>>,
            summary: Mutex<Vec<String>>,
            completed: Mutex<Option<(usize, usize)>>,
        }

        impl ProgressSink for Recorder {
            fn on_run_start(&self, total_pins: usize) {
                *self.started.lock().unwrap() = Some(total_pins);
            }
            fn on_progress(&self, percentage: u8, message: &str) {
                self.events
                    .lock()
                    .unwrap()
                    .push((percentage, message.to_string()));
            }
            fn on_unresolved_summary(&self, descriptions: &[String]) {
                *self.summary.lock().unwrap() = descriptions.to_vec();
            }
            fn on_run_complete(&self, total_pins: usize, resolved: usize) {
                *self.completed.lock().unwrap() = Some((total_pins, resolved));
            }
        }

        let recorder = Arc::new(Recorder::default());
        let config = MapConfig::builder()
            .throttle_ms(0)
            .fetcher(Arc::new(StaticFetcher(board_page(&[
                "Amsterdam",
                "???",
                "Paris",
            ]))))
            .geocoder(Arc::new(TableGeocoder(vec![
                ("Amsterdam", AMS),
                ("Paris", GeoLocation { latitude: 48.8566, longitude: 2.3522 }),
            ])))
            .progress_sink(Arc::clone(&recorder) as Arc<dyn ProgressSink>)
            .build()
            .unwrap();

        generate("alice", "places", &config).await.unwrap();

        assert_eq!(*recorder.started.lock().unwrap(), Some(3));
        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                (33, "1 of 3 done (33%)".to_string()),
                (66, "2 of 3 done (66%)".to_string()),
                (100, "3 of 3 done (100%)".to_string()),
            ]
        );
        assert_eq!(*recorder.summary.lock().unwrap(), vec!["???".to_string()]);
        assert_eq!(*recorder.completed.lock().unwrap(), Some((3, 2)));
    }

    #[tokio::test]
    async fn all_failures_still_produce_an_output_set() {
        let config = config_with(
            board_page(&["???", "!!!"]),
            TableGeocoder(vec![]),
        );

        let output = generate("alice", "places", &config).await.unwrap();
        assert!(output.markers.is_empty());
        assert_eq!(output.unresolved.len(), 2);
        assert_eq!(output.stats.resolved_pins, 0);
    }
}
