use chrono::{DateTime, Utc};

use crate::bmr::BmrCalculator;
use crate::models::{DayWindow, EnergyAggregate, PassiveEnergyResult, UserProfile};

/// Multiplier on daily BMR for the plausibility ceiling
pub const PLAUSIBLE_MAX_BMR_MULTIPLIER: f64 = 3.0;

/// Core passive-energy (NEAT) calculator
///
/// Pure, deterministic, side-effect-free function over its inputs. The only
/// mutable state in the system lives in the day boundary tracker; by the time
/// this runs, the window and the aggregate are fixed values.
pub struct PassiveEnergyCalculator;

impl PassiveEnergyCalculator {
    /// Derive the day's passive energy from profile, window, and aggregate.
    ///
    /// `raw = total - bmr_elapsed - active`, clamped below at zero. A raw
    /// value above `daily_bmr x 3` is flagged as an anomaly but returned
    /// unmodified: a genuinely high-NEAT day (all-day manual labor) is a
    /// valid result, not an error.
    pub fn compute(
        profile: &UserProfile,
        window: &DayWindow,
        now: DateTime<Utc>,
        aggregate: &EnergyAggregate,
    ) -> PassiveEnergyResult {
        let daily_bmr = BmrCalculator::daily_bmr(profile, window.calendar_date);
        Self::compute_with_bmr(daily_bmr, window, now, aggregate)
    }

    /// Same derivation from an already-computed daily BMR
    pub fn compute_with_bmr(
        daily_bmr: f64,
        window: &DayWindow,
        now: DateTime<Utc>,
        aggregate: &EnergyAggregate,
    ) -> PassiveEnergyResult {
        let bmr_per_minute = BmrCalculator::bmr_per_minute(daily_bmr);
        let bmr_elapsed = BmrCalculator::bmr_elapsed(bmr_per_minute, window, now);

        let raw_passive = aggregate.total_kcal - bmr_elapsed - aggregate.active_kcal;
        let passive = raw_passive.max(0.0);

        let plausible_max = daily_bmr * PLAUSIBLE_MAX_BMR_MULTIPLIER;
        let is_high_passive_anomaly = raw_passive > plausible_max;

        let ratio = if aggregate.total_kcal > 0.0 {
            Some((passive + aggregate.active_kcal + bmr_elapsed) / aggregate.total_kcal)
        } else {
            None
        };

        PassiveEnergyResult {
            raw_passive_kcal: raw_passive,
            passive_kcal: passive,
            plausible_max_kcal: plausible_max,
            is_high_passive_anomaly,
            ratio,
            bmr_elapsed_kcal: bmr_elapsed,
            active_kcal: aggregate.active_kcal,
            daily_bmr_kcal: daily_bmr,
        }
    }
}
