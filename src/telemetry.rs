//! Telemetry side channel
//!
//! Sanity-check events emitted per successful calculation. Observational
//! only: nothing here ever feeds back into the returned value.

use std::sync::Mutex;

use serde::Serialize;
use tracing::warn;

/// Lower bound of the acceptable self-consistency ratio
pub const RATIO_LOWER_BOUND: f64 = 0.95;

/// Upper bound of the acceptable self-consistency ratio
pub const RATIO_UPPER_BOUND: f64 = 1.05;

/// Whether a ratio falls outside the acceptance band
pub fn ratio_out_of_bounds(ratio: f64) -> bool {
    !(RATIO_LOWER_BOUND..=RATIO_UPPER_BOUND).contains(&ratio)
}

/// Sanity-check events for the telemetry sink
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum TelemetryEvent {
    /// The reconstructed ratio fell outside `[0.95, 1.05]`.
    ///
    /// Only emitted when the raw passive value is not anomalous; an
    /// anomalous raw value makes the ratio check meaningless. A sub-minute
    /// exercise session reporting near-zero active energy can trigger this
    /// even though nothing is wrong; that is an expected signal, not a
    /// defect to suppress.
    RatioOutOfBounds { ratio: f64 },

    /// The raw passive value exceeded the plausibility ceiling
    HighPassive {
        raw_passive_kcal: f64,
        plausible_max_kcal: f64,
    },
}

/// Sink for sanity-check events
pub trait TelemetryReporter: Send + Sync {
    fn emit(&self, event: TelemetryEvent);
}

impl<T: TelemetryReporter> TelemetryReporter for std::sync::Arc<T> {
    fn emit(&self, event: TelemetryEvent) {
        (**self).emit(event);
    }
}

/// Reporter that logs events as structured tracing warnings
#[derive(Debug, Default)]
pub struct TracingTelemetryReporter;

impl TelemetryReporter for TracingTelemetryReporter {
    fn emit(&self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::RatioOutOfBounds { ratio } => {
                warn!(ratio, "energy balance ratio out of bounds");
            }
            TelemetryEvent::HighPassive {
                raw_passive_kcal,
                plausible_max_kcal,
            } => {
                warn!(
                    raw_passive_kcal,
                    plausible_max_kcal, "implausibly high passive energy"
                );
            }
        }
    }
}

/// Reporter that drops all events
#[derive(Debug, Default)]
pub struct NullTelemetryReporter;

impl TelemetryReporter for NullTelemetryReporter {
    fn emit(&self, _event: TelemetryEvent) {}
}

/// Reporter that records events in memory, for tests
#[derive(Debug, Default)]
pub struct RecordingTelemetryReporter {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingTelemetryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl TelemetryReporter for RecordingTelemetryReporter {
    fn emit(&self, event: TelemetryEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}
