//! CLI binary for mapinterest.
//!
//! A thin shim over the library crate that maps CLI flags to `MapConfig`,
//! renders progress with indicatif, and prints results.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use mapinterest::{generate_to_file, MapConfig, MapinterestError, ProgressHandle, ProgressSink};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress sink using indicatif ────────────────────────────────────────

/// Terminal progress sink: renders a live bar driven by the pipeline's
/// percentage events and prints the unresolved advisory above it.
struct CliProgressSink {
    /// The single progress bar anchored at the bottom of the terminal,
    /// scaled 0–100 to match the pipeline's percentage events.
    bar: ProgressBar,
}

impl CliProgressSink {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(100);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Fetching");
        bar.set_message("Getting pins…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl ProgressSink for CliProgressSink {
    fn on_run_start(&self, total_pins: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_style(progress_style);
        self.bar.set_prefix("Geocoding");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "{total_pins} pins found, getting positions… (this can take a while)"
            ))
        ));
    }

    fn on_progress(&self, percentage: u8, message: &str) {
        self.bar.set_position(percentage as u64);
        self.bar.set_message(message.to_string());
    }

    fn on_unresolved_summary(&self, descriptions: &[String]) {
        self.bar.println(format!(
            "{} The following pins could not be located on a map:",
            cyan("⚠")
        ));
        for description in descriptions {
            self.bar.println(format!("- {description}"));
        }
    }

    fn on_run_complete(&self, total_pins: usize, resolved: usize) {
        self.bar.finish_and_clear();
        let failed = total_pins.saturating_sub(resolved);
        if failed == 0 {
            eprintln!(
                "{} {} pins located",
                green("✔"),
                bold(&resolved.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pins located  ({} unresolved)",
                if resolved == 0 { red("✘") } else { cyan("⚠") },
                bold(&resolved.to_string()),
                total_pins,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Map a board to output.html
  mapinterest alice places

  # Custom output file
  mapinterest alice places trip-map.html

  # Faster geocoding against a self-hosted provider
  mapinterest --geocode-url http://localhost:8080 --delay-ms 100 alice places

  # Structured JSON result on stdout (map is still written)
  mapinterest --json alice places > result.json

NOTES:
  Geocoding calls are spaced 2 seconds apart by default to stay under the
  provider's abuse protection; a 50-pin board takes a little under two
  minutes. Pins whose descriptions cannot be geocoded are listed at the
  end of the run and left off the map.

  The map template (default.html) ships alongside the executable and must
  contain a <script id="points"> placeholder element.
"#;

/// Plot a board's pins on a Google map.
#[derive(Parser, Debug)]
#[command(
    name = "mapinterest",
    version,
    about = "Plot a Pinterest-style board on a Google map",
    long_about = "Fetches a board page, geocodes each pin's description, and writes a \
self-contained HTML map with one clickable marker per located pin.",
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Username owning the board.
    username: Option<String>,

    /// Board name.
    board: Option<String>,

    /// Output HTML file (overwritten silently).
    #[arg(default_value = "output.html")]
    output: PathBuf,

    /// Base URL of the board site.
    #[arg(long, env = "MAPINTEREST_SITE", default_value = "https://pinterest.com")]
    site: String,

    /// Base URL of the geocoding provider.
    #[arg(
        long,
        env = "MAPINTEREST_GEOCODE_URL",
        default_value = "https://maps.googleapis.com"
    )]
    geocode_url: String,

    /// Minimum delay between geocoding calls, in milliseconds.
    #[arg(long, env = "MAPINTEREST_DELAY_MS", default_value_t = 2000)]
    delay_ms: u64,

    /// Board fetch timeout in seconds.
    #[arg(long, env = "MAPINTEREST_FETCH_TIMEOUT", default_value_t = 30)]
    fetch_timeout: u64,

    /// Per-call geocoding timeout in seconds.
    #[arg(long, env = "MAPINTEREST_GEOCODE_TIMEOUT", default_value_t = 10)]
    geocode_timeout: u64,

    /// Map template file. Defaults to default.html next to the executable.
    #[arg(long, env = "MAPINTEREST_TEMPLATE")]
    template: Option<PathBuf>,

    /// Print the run result as JSON on stdout (the map is still written).
    #[arg(long, env = "MAPINTEREST_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "MAPINTEREST_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MAPINTEREST_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MAPINTEREST_QUIET")]
    quiet: bool,
}


#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── Required arguments ───────────────────────────────────────────────
    // Missing identifiers are not an error: print usage and exit cleanly,
    // exactly like running with --help. No network call is made.
    let (username, board) = match (&cli.username, &cli.board) {
        (Some(u), Some(b)) => (u.clone(), b.clone()),
        _ => {
            eprintln!("Please enter a username and board\n");
            Cli::command().print_help().ok();
            return Ok(());
        }
    };

    // ── Build config ─────────────────────────────────────────────────────
    let progress: Option<ProgressHandle> = if show_progress {
        Some(CliProgressSink::new() as Arc<dyn ProgressSink>)
    } else {
        None
    };

    let mut builder = MapConfig::builder()
        .source_base_url(&cli.site)
        .geocode_base_url(&cli.geocode_url)
        .throttle_ms(cli.delay_ms)
        .fetch_timeout_secs(cli.fetch_timeout)
        .geocode_timeout_secs(cli.geocode_timeout);
    if let Some(ref template) = cli.template {
        builder = builder.template_path(template);
    }
    if let Some(sink) = progress {
        builder = builder.progress_sink(sink);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run the pipeline ─────────────────────────────────────────────────
    let output = match generate_to_file(&username, &board, &cli.output, &config).await {
        Ok(output) => output,
        Err(MapinterestError::BoardNotFound { .. }) => {
            // Matches the documented contract: a diagnostic and a clean
            // exit, with no output file written or modified.
            eprintln!("User or board could not be found");
            return Ok(());
        }
        Err(e) => return Err(e).context("Map generation failed"),
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    }

    if !cli.quiet {
        eprintln!(
            "{} Done, results written to {} {}",
            green("✔"),
            bold(&cli.output.display().to_string()),
            dim(&format!(
                "({} markers, {}ms)",
                output.stats.resolved_pins, output.stats.total_duration_ms
            )),
        );
        // Without the bar, the advisory has not been printed yet.
        if !show_progress && !output.unresolved.is_empty() {
            eprintln!("The following pins could not be located on a map:");
            for pin in &output.unresolved {
                eprintln!("- {}", pin.description);
            }
        }
    }

    Ok(())
}
