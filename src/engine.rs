//! Energy balance engine
//!
//! Orchestrates one on-demand calculation: resolve the pinned day window,
//! read the two energy streams from the port concurrently, run the pure
//! passive-energy derivation, emit telemetry, and classify the outcome.

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{info, warn};

use crate::day_window::{DayBoundaryTracker, WindowStore};
use crate::models::{EnergyAggregate, UserProfile};
use crate::outcome::EnergyBalanceOutcome;
use crate::passive::PassiveEnergyCalculator;
use crate::port::EnergyDataPort;
use crate::telemetry::{ratio_out_of_bounds, TelemetryEvent, TelemetryReporter};

pub struct EnergyBalanceEngine<S, P, T>
where
    S: WindowStore,
    P: EnergyDataPort,
    T: TelemetryReporter,
{
    tracker: DayBoundaryTracker<S>,
    port: P,
    telemetry: T,
}

impl<S, P, T> EnergyBalanceEngine<S, P, T>
where
    S: WindowStore,
    P: EnergyDataPort,
    T: TelemetryReporter,
{
    pub fn new(tracker: DayBoundaryTracker<S>, port: P, telemetry: T) -> Self {
        EnergyBalanceEngine {
            tracker,
            port,
            telemetry,
        }
    }

    /// Run one calculation for `now` under the device's current UTC offset.
    ///
    /// The two port reads are issued concurrently; the first failure aborts
    /// the pipeline with its classification and the calculator never runs on
    /// partial data. Dropping the returned future cancels both in-flight
    /// reads and emits nothing. The anomaly and ratio checks go to the
    /// telemetry sink only and never alter the returned value.
    pub async fn calculate(
        &mut self,
        profile: &UserProfile,
        now: DateTime<Utc>,
        tz_offset: FixedOffset,
    ) -> EnergyBalanceOutcome {
        let window = match self.tracker.current_window(now, tz_offset) {
            Ok(window) => window,
            Err(e) => {
                // Window persistence trouble is recoverable on a later
                // invocation; surface it as transient rather than failing
                // in a way the UI cannot express.
                warn!(error = %e, "day window resolution failed");
                return EnergyBalanceOutcome::TransientFailure;
            }
        };

        let fetched = tokio::try_join!(
            self.port.fetch_total_energy_kcal(window.start_instant, now),
            self.port.fetch_exercise_sessions(window.start_instant, now),
        );

        let (total_kcal, sessions) = match fetched {
            Ok(values) => values,
            Err(err) => {
                warn!(error = %err, "energy data fetch failed");
                return EnergyBalanceOutcome::from(err);
            }
        };

        let aggregate = EnergyAggregate::from_sessions(total_kcal, &sessions);
        let result = PassiveEnergyCalculator::compute(profile, &window, now, &aggregate);

        if result.is_high_passive_anomaly {
            self.telemetry.emit(TelemetryEvent::HighPassive {
                raw_passive_kcal: result.raw_passive_kcal,
                plausible_max_kcal: result.plausible_max_kcal,
            });
        } else if let Some(ratio) = result.ratio {
            if ratio_out_of_bounds(ratio) {
                self.telemetry
                    .emit(TelemetryEvent::RatioOutOfBounds { ratio });
            }
        }

        info!(
            calendar_date = %window.calendar_date,
            passive_kcal = result.passive_kcal,
            active_kcal = result.active_kcal,
            bmr_elapsed_kcal = result.bmr_elapsed_kcal,
            total_kcal = aggregate.total_kcal,
            session_count = aggregate.session_count,
            high_passive_anomaly = result.is_high_passive_anomaly,
            "energy balance calculated"
        );

        EnergyBalanceOutcome::Success(result)
    }

    /// The currently pinned day window, if one exists
    pub fn pinned_window(&mut self) -> Option<crate::models::DayWindow> {
        self.tracker.pinned()
    }
}
