//! Structured logging routed to stderr.
//!
//! Stdout carries only the JSON report, so every subscriber installed here
//! writes to stderr.
//!
//! TODO: Offer tracing-subscriber's JSON formatter behind a flag for runs whose
//! stderr is collected by a log shipper.

use std::time::Instant;

use tracing_subscriber::EnvFilter;

use super::error::ScoreCode;

/// Install the global subscriber. An unparsable filter falls back to `off`.
pub fn init(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("off"));
    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

/// Emit a stage outcome with its code and elapsed time.
pub fn log_stage(module: &str, event: &str, code: ScoreCode, started: Instant) {
    let dur_ms = started.elapsed().as_millis() as u64;
    if code == ScoreCode::Ok {
        tracing::info!(module, ev = event, code = code.as_str(), dur_ms, "stage finished");
    } else {
        tracing::warn!(module, ev = event, code = code.as_str(), dur_ms, "stage failed");
    }
}
