//! Command-line front end for the predai forecasting pipeline.
//!
//! The binary wires the Home Assistant connector, the SQLite dedup store and
//! the augurs forecaster into a [`predai::Predai`] and runs one pass every
//! `update_every` minutes, reloading the configuration file before each pass.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use chrono_tz::Tz;
use clap::Parser;
use predai::{Predai, PredaiConfig, PredaiError, RunReport, WaitOutcome};
use predai_augurs::AugursForecaster;
use predai_hass::HassClient;
use predai_store::SqliteStore;
use tracing_subscriber::EnvFilter;

/// CLI arguments for the predai runner.
#[derive(Parser, Debug, Clone)]
#[command(version, about = "Forecast Home Assistant sensors and publish the predictions", long_about = None)]
pub struct Args {
    /// Path to the TOML configuration file; a missing or empty file means no work.
    #[arg(short, long, default_value = "/config/predai.toml")]
    pub config: PathBuf,

    /// Path to the SQLite database holding resampled history.
    #[arg(long, default_value = "/config/predai.db")]
    pub database: PathBuf,

    /// Base URL of the Home Assistant core API.
    #[arg(long, env = "HA_URL", default_value = predai_hass::DEFAULT_BASE_URL)]
    pub ha_url: String,

    /// Bearer token for the Home Assistant API.
    #[arg(long, env = "SUPERVISOR_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Timeout in seconds for each call to Home Assistant, the store and the forecaster.
    #[arg(long, default_value = "240")]
    pub timeout_secs: u64,

    /// Run a single pass and exit.
    #[arg(long)]
    pub once: bool,

    /// Log filter directive (e.g. `info`, `predai=debug`).
    #[arg(long, env = "PREDAI_LOG", default_value = "info")]
    pub log: String,
}

/// Install the global `fmt` subscriber writing to stderr.
///
/// An unparseable filter falls back to `info`.
pub fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Read the configuration file.
///
/// Returns `Ok(None)` when the file is missing or holds only whitespace and
/// comments.
///
/// # Errors
/// Returns `Config` when the file cannot be read or is not valid TOML for
/// [`PredaiConfig`].
pub fn load_config(path: &Path) -> Result<Option<PredaiConfig>, PredaiError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(PredaiError::Config(format!(
                "cannot read {}: {e}",
                path.display()
            )));
        }
    };
    let table: toml::Table = toml::from_str(&text)
        .map_err(|e| PredaiError::Config(format!("invalid config {}: {e}", path.display())))?;
    if table.is_empty() {
        return Ok(None);
    }
    let config: PredaiConfig = toml::Value::Table(table)
        .try_into()
        .map_err(|e| PredaiError::Config(format!("invalid config {}: {e}", path.display())))?;
    Ok(Some(config))
}

/// Resolve the configured IANA timezone; `None` means UTC.
///
/// # Errors
/// Returns `Config` for an unknown timezone name.
pub fn parse_timezone(name: Option<&str>) -> Result<Tz, PredaiError> {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        None => Ok(Tz::UTC),
        Some(n) => n
            .parse::<Tz>()
            .map_err(|_| PredaiError::Config(format!("unknown timezone: {n}"))),
    }
}

/// Long-lived collaborators shared by every pass.
pub struct Runner {
    args: Args,
    hass: Arc<HassClient>,
    store: Arc<SqliteStore>,
    forecaster: Arc<AugursForecaster>,
}

impl Runner {
    /// Build the Home Assistant client and open the database.
    ///
    /// # Errors
    /// Returns `Config` for a bad URL and `Store` when the database cannot be opened.
    pub async fn connect(args: Args) -> Result<Self, PredaiError> {
        let timeout = Duration::from_secs(args.timeout_secs);
        let mut builder = HassClient::builder().base_url(&args.ha_url).timeout(timeout);
        if let Some(token) = &args.token {
            builder = builder.token(token);
        }
        let hass = Arc::new(builder.build()?);
        let store = Arc::new(SqliteStore::connect(&args.database).await?);
        Ok(Self {
            args,
            hass,
            store,
            forecaster: Arc::new(AugursForecaster::new()),
        })
    }

    fn predai(&self, timezone: Tz) -> Result<Predai, PredaiError> {
        Predai::builder()
            .with_hass(Arc::clone(&self.hass))
            .with_forecaster(self.forecaster.clone())
            .with_store(self.store.clone())
            .provider_timeout(Duration::from_secs(self.args.timeout_secs))
            .timezone(timezone)
            .build()
    }

    /// One pass: load the config, forecast every sensor, then publish the heartbeat.
    ///
    /// Returns the `update_every` interval to wait before the next pass.
    ///
    /// # Errors
    /// Returns configuration errors and a failed heartbeat publish. Per-sensor
    /// failures are only logged.
    pub async fn pass(&self) -> Result<(Predai, u64), PredaiError> {
        let config = load_config(&self.args.config)?;
        let (config, timezone) = match config {
            Some(config) => {
                let tz = parse_timezone(config.timezone.as_deref())?;
                tracing::info!(sensors = config.sensors.len(), %tz, "configuration loaded");
                (config, tz)
            }
            None => {
                tracing::warn!(path = %self.args.config.display(), "configuration missing; no work to do");
                (PredaiConfig::default(), Tz::UTC)
            }
        };
        let predai = self.predai(timezone)?;

        let report = predai.run_once(&config, Utc::now()).await;
        log_report(&report);

        predai.mark_run(Utc::now()).await?;
        Ok((predai, config.update_every))
    }

    /// Run passes until interrupted, or a single pass with `--once`.
    ///
    /// In continuous mode a failed pass is logged and retried after the
    /// default interval.
    ///
    /// # Errors
    /// With `--once`, returns the error of the single pass.
    pub async fn run(&self) -> Result<(), PredaiError> {
        loop {
            let outcome = self.pass().await;
            if self.args.once {
                return outcome.map(|_| ());
            }
            match outcome {
                Ok((predai, update_every)) => {
                    tracing::info!(minutes = update_every, "waiting for next pass");
                    if predai.wait_for_next_run(update_every).await == WaitOutcome::Restart {
                        tracing::info!("heartbeat removed; starting a new pass");
                    }
                }
                Err(e) => {
                    let minutes = PredaiConfig::default().update_every;
                    tracing::error!(error = %e, minutes, "pass failed; retrying later");
                    tokio::time::sleep(Duration::from_secs(minutes * 60)).await;
                }
            }
        }
    }

    /// Close the database pool.
    pub async fn close(&self) {
        self.store.close().await;
    }
}

fn log_report(report: &RunReport) {
    for failure in &report.failed {
        tracing::error!(sensor = %failure.sensor, error = %failure.error, "sensor failed");
    }
    tracing::info!(
        published = report.published.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "pass complete"
    );
}
