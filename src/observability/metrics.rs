//! Metrics for `leaflet-embed`.
//!
//! Counters for directive outcomes at build time and map setup outcomes at
//! runtime. The recorder renders Prometheus text on demand; no HTTP
//! endpoint is started.

use std::sync::OnceLock;

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::EmbedError;

/// Handle of the installed recorder, shared by repeated initializations.
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Directive outcome labels.
const DIRECTIVE_OUTCOMES: [&str; 3] = ["rendered", "missing_image", "parse_failed"];

/// Map setup state labels.
const MAP_STATES: [&str; 4] = ["done", "error", "abandoned", "skipped"];

/// Initializes the global metrics recorder.
///
/// Returns the handle used to render the collected metrics. Calling this
/// again returns the already installed handle.
///
/// # Errors
///
/// Returns `EmbedError::Io` if the recorder cannot be installed (another
/// recorder already owns the global slot).
pub fn init_metrics() -> Result<PrometheusHandle, EmbedError> {
    if let Some(handle) = HANDLE.get() {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| EmbedError::Io(std::io::Error::other(e.to_string())))?;
    describe_metrics();
    Ok(HANDLE.get_or_init(|| handle).clone())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!(
        "leaflet_embed_directives_total",
        "Map directives processed, by outcome"
    );
    describe_counter!(
        "leaflet_embed_maps_total",
        "Map placeholders that reached a terminal setup state"
    );
}

/// Records the outcome of one map directive.
pub fn record_directive(outcome: &str) {
    counter!(
        "leaflet_embed_directives_total",
        "outcome" => sanitize_label(outcome, &DIRECTIVE_OUTCOMES)
    )
    .increment(1);
}

/// Records a map placeholder reaching a terminal setup state.
pub fn record_map(state: &str) {
    counter!(
        "leaflet_embed_maps_total",
        "state" => sanitize_label(state, &MAP_STATES)
    )
    .increment(1);
}

fn sanitize_label(value: &str, known: &[&'static str]) -> &'static str {
    known
        .iter()
        .find(|k| **k == value)
        .copied()
        .unwrap_or("__unknown__")
}
