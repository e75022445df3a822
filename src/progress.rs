//! Progress-sink trait for per-pin run events.
//!
//! Inject an [`Arc<dyn ProgressSink>`] via
//! [`crate::config::MapConfigBuilder::progress_sink`] to receive events as
//! the pipeline works through the board's pins.
//!
//! The sink approach keeps console plumbing out of the library: the CLI
//! forwards events to an indicatif progress bar, while embedders can push
//! them to a channel, a websocket, or nothing at all. All methods have
//! default no-op implementations so callers only override what they care
//! about. The pipeline is strictly sequential, so events always arrive in
//! order, but the trait is `Send + Sync` because configs are shareable
//! across tasks.

use std::sync::Arc;

/// Called by the pipeline as it processes each pin.
pub trait ProgressSink: Send + Sync {
    /// Called once after extraction, before any geocoding.
    ///
    /// # Arguments
    /// * `total_pins` — number of pins that will be processed
    fn on_run_start(&self, total_pins: usize) {
        let _ = total_pins;
    }

    /// Called after each pin has been bucketed (resolved or not).
    ///
    /// # Arguments
    /// * `percentage` — floor((i+1)/total × 100), 0–100
    /// * `message`    — human-readable "i+1 of total done" text
    fn on_progress(&self, percentage: u8, message: &str) {
        let _ = (percentage, message);
    }

    /// Called once after the loop when at least one pin failed to geocode.
    ///
    /// Advisory only — rendering proceeds regardless.
    fn on_unresolved_summary(&self, descriptions: &[String]) {
        let _ = descriptions;
    }

    /// Called once after all pins have been attempted.
    fn on_run_complete(&self, total_pins: usize, resolved: usize) {
        let _ = (total_pins, resolved);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no sink is configured.
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {}

/// Convenience alias matching the type stored in [`crate::config::MapConfig`].
pub type ProgressHandle = Arc<dyn ProgressSink>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct TrackingSink {
        started_total: AtomicUsize,
        events: Mutex<Vec<(u8, String)>>,
        summaries: Mutex<Vec<Vec<String>>>,
        completed_resolved: AtomicUsize,
    }

    impl ProgressSink for TrackingSink {
        fn on_run_start(&self, total_pins: usize) {
            self.started_total.store(total_pins, Ordering::SeqCst);
        }

        fn on_progress(&self, percentage: u8, message: &str) {
            self.events
                .lock()
                .unwrap()
                .push((percentage, message.to_string()));
        }

        fn on_unresolved_summary(&self, descriptions: &[String]) {
            self.summaries.lock().unwrap().push(descriptions.to_vec());
        }

        fn on_run_complete(&self, _total_pins: usize, resolved: usize) {
            self.completed_resolved.store(resolved, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_sink_does_not_panic() {
        let sink = NoopProgressSink;
        sink.on_run_start(3);
        sink.on_progress(33, "1 of 3 done (33%)");
        sink.on_unresolved_summary(&["somewhere vague".to_string()]);
        sink.on_run_complete(3, 2);
    }

    #[test]
    fn tracking_sink_receives_events_in_order() {
        let sink = TrackingSink {
            started_total: AtomicUsize::new(0),
            events: Mutex::new(vec![]),
            summaries: Mutex::new(vec![]),
            completed_resolved: AtomicUsize::new(0),
        };

        sink.on_run_start(2);
        sink.on_progress(50, "1 of 2 done (50%)");
        sink.on_progress(100, "2 of 2 done (100%)");
        sink.on_run_complete(2, 2);

        assert_eq!(sink.started_total.load(Ordering::SeqCst), 2);
        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, 50);
        assert_eq!(events[1].0, 100);
        assert_eq!(sink.completed_resolved.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_sink_works() {
        let sink: Arc<dyn ProgressSink> = Arc::new(NoopProgressSink);
        sink.on_run_start(10);
        sink.on_progress(10, "1 of 10 done (10%)");
    }
}
