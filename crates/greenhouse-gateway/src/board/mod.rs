//! Board poller: fetch the latest reading on a fixed interval and render it.
//!
//! The loop always has an exit: `max_iterations`, the stop signal, or both.
//! Fetch failures are logged and counted; they never end the loop.

pub mod source;

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use greenhouse_core::SensorReading;

use crate::config::BoardSection;

pub use source::{HttpLatestSource, LatestSource};

pub const NO_DATA_LINE: &str = "no sensor data available";

/// Outcome of one poller run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub iterations: u64,
    pub rendered: u64,
    pub empty: u64,
    pub errors: u64,
}

pub struct Poller<S> {
    source: S,
    interval: Duration,
    max_iterations: Option<u64>,
}

impl<S: LatestSource> Poller<S> {
    pub fn new(source: S, interval: Duration, max_iterations: Option<u64>) -> Self {
        Self { source, interval, max_iterations }
    }

    pub fn from_config(source: S, cfg: &BoardSection) -> Self {
        Self::new(source, Duration::from_millis(cfg.interval_ms), cfg.max_iterations)
    }

    /// Poll until stopped, rendering each result through tracing.
    pub async fn run(&self, stop: watch::Receiver<bool>) -> PollReport {
        self.run_with(stop, |line| tracing::info!(target: "board", "{line}")).await
    }

    /// Poll until stopped, handing each rendered line to `on_line`.
    ///
    /// Stops before the next fetch once `stop` holds `true` or the iteration
    /// budget is spent. A dropped stop sender only disables the signal.
    pub async fn run_with<F>(&self, mut stop: watch::Receiver<bool>, mut on_line: F) -> PollReport
    where
        F: FnMut(String),
    {
        let mut report = PollReport::default();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stop_open = true;

        loop {
            if *stop.borrow() {
                break;
            }
            if self.max_iterations.is_some_and(|max| report.iterations >= max) {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                changed = stop.changed(), if stop_open => {
                    if changed.is_err() {
                        stop_open = false;
                    }
                    continue;
                }
            }

            report.iterations += 1;
            match self.source.fetch_latest().await {
                Ok(Some(reading)) => {
                    report.rendered += 1;
                    on_line(render_line(&reading));
                }
                Ok(None) => {
                    report.empty += 1;
                    on_line(NO_DATA_LINE.to_string());
                }
                Err(e) => {
                    report.errors += 1;
                    tracing::warn!(error = %e, iteration = report.iterations, "latest reading fetch failed");
                }
            }
        }

        tracing::info!(?report, "board poller stopped");
        report
    }
}

/// One-line text rendering of a reading. Times stay in UTC epoch millis.
pub fn render_line(r: &SensorReading) -> String {
    fn metric(v: Option<f64>, unit: &str) -> String {
        v.map(|x| format!("{x:.1}{unit}")).unwrap_or_else(|| "-".to_string())
    }

    format!(
        "sensor={} at_ms={} temperature={} humidity={} soil_moisture={} water_level={}",
        r.sensor_id,
        r.recorded_at_ms,
        metric(r.temperature, "C"),
        metric(r.humidity, "%"),
        metric(r.soil_moisture, "%"),
        metric(r.water_level, "%"),
    )
}
