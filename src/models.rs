use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Biological sex, used only for the Mifflin-St Jeor BMR constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiologicalSex {
    Male,
    Female,
}

/// User profile for BMR derivation
///
/// Immutable per calculation; owned by the caller and passed by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Biological sex
    pub sex: BiologicalSex,

    /// Date of birth
    pub birth_date: NaiveDate,

    /// Body weight in kilograms
    pub weight_kg: f64,

    /// Height in centimeters
    pub height_cm: f64,
}

impl UserProfile {
    /// Completed years of age on the given date
    pub fn age_years(&self, on: NaiveDate) -> u32 {
        let mut age = on.year() - self.birth_date.year();
        if (on.month(), on.day()) < (self.birth_date.month(), self.birth_date.day()) {
            age -= 1;
        }
        age.max(0) as u32
    }
}

/// The pinned window for one local calendar day
///
/// Created once per local day at first need and persisted. Once created for a
/// calendar date, `start_instant` and `zone_offset_at_start` are never
/// recomputed mid-day, even if the device's reported zone offset changes
/// (travel). Elapsed time is always measured from `start_instant` on the
/// absolute timeline, never by wall-clock subtraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    /// Absolute instant of local midnight for `calendar_date`
    pub start_instant: DateTime<Utc>,

    /// UTC offset in effect at that midnight
    pub zone_offset_at_start: FixedOffset,

    /// The local date this window represents
    pub calendar_date: NaiveDate,
}

impl DayWindow {
    /// Build the window for the local calendar date of `now` in `offset`.
    ///
    /// `start_instant` is the absolute instant of that date's local midnight.
    pub fn for_instant(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let calendar_date = local_date_for(now, offset);
        let midnight_local = NaiveDateTime::new(calendar_date, NaiveTime::MIN);
        let naive_utc = midnight_local - Duration::seconds(i64::from(offset.local_minus_utc()));
        DayWindow {
            start_instant: Utc.from_utc_datetime(&naive_utc),
            zone_offset_at_start: offset,
            calendar_date,
        }
    }

    /// Minutes elapsed from the window start to `now`, on absolute instants.
    ///
    /// Never negative: a `now` before the window start (clock adjustment)
    /// reads as zero elapsed time.
    pub fn minutes_elapsed(&self, now: DateTime<Utc>) -> f64 {
        let seconds = (now - self.start_instant).num_seconds().max(0);
        seconds as f64 / 60.0
    }
}

/// Local calendar date of `now` under the given UTC offset
pub fn local_date_for(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// One explicit, user-initiated exercise session record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSession {
    /// Active calories attributed to this session
    pub active_kcal: f64,

    /// Recording device or app identifier, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_origin: Option<String>,
}

/// Energy figures fetched for one day window
///
/// Supplied fresh per calculation and never cached across windows.
/// `active_kcal` is the sum over explicit exercise-session records only; it
/// must never be sourced from a NEAT-inclusive aggregate, which would
/// double-count NEAT into the active bucket and silently zero the passive
/// figure.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyAggregate {
    /// Total calories burned in the window (BMR + NEAT + exercise)
    pub total_kcal: f64,

    /// Sum of `active_kcal` across explicit exercise sessions
    pub active_kcal: f64,

    /// Number of exercise sessions in the window
    pub session_count: usize,

    /// Number of distinct recording origins across sessions (diagnostic only)
    pub distinct_data_origin_count: usize,
}

impl EnergyAggregate {
    /// Build an aggregate from a total-energy figure and session records
    pub fn from_sessions(total_kcal: f64, sessions: &[ExerciseSession]) -> Self {
        let active_kcal = sessions.iter().map(|s| s.active_kcal).sum();
        let mut origins: Vec<&str> = sessions
            .iter()
            .filter_map(|s| s.data_origin.as_deref())
            .collect();
        origins.sort_unstable();
        origins.dedup();

        EnergyAggregate {
            total_kcal,
            active_kcal,
            session_count: sessions.len(),
            distinct_data_origin_count: origins.len(),
        }
    }
}

/// Result of one passive-energy calculation
///
/// Produced once per invocation and never persisted; the day's underlying
/// energy data is always re-aggregated fresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassiveEnergyResult {
    /// Unclamped passive figure; may be negative or implausibly large
    pub raw_passive_kcal: f64,

    /// `max(raw_passive_kcal, 0)`; lower-bound clamp only, never truncated above
    pub passive_kcal: f64,

    /// Heuristic ceiling (`daily_bmr x 3.0`), used to flag, never to truncate
    pub plausible_max_kcal: f64,

    /// Whether `raw_passive_kcal` exceeded the plausible ceiling
    pub is_high_passive_anomaly: bool,

    /// Self-consistency ratio `(passive + active + bmr_elapsed) / total`;
    /// `None` when the total is zero
    pub ratio: Option<f64>,

    /// BMR energy attributed to the elapsed portion of the window
    pub bmr_elapsed_kcal: f64,

    /// Active energy from explicit exercise sessions
    pub active_kcal: f64,

    /// Daily BMR used for this calculation
    pub daily_bmr_kcal: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_age_years() {
        let profile = UserProfile {
            sex: BiologicalSex::Male,
            birth_date: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
            weight_kg: 70.0,
            height_cm: 175.0,
        };

        let before_birthday = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        let on_birthday = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(profile.age_years(before_birthday), 34);
        assert_eq!(profile.age_years(on_birthday), 35);
    }

    #[test]
    fn test_window_for_instant_negative_offset() {
        // 2025-03-15 10:00 in UTC-5 is 15:00Z; local midnight is 05:00Z
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = utc(2025, 3, 15, 15, 0);
        let window = DayWindow::for_instant(now, offset);

        assert_eq!(
            window.calendar_date,
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
        assert_eq!(window.start_instant, utc(2025, 3, 15, 5, 0));
        assert_eq!(window.zone_offset_at_start, offset);
    }

    #[test]
    fn test_window_for_instant_crosses_utc_date() {
        // 2025-03-15 23:00 in UTC+10 is 13:00Z on the 15th; local midnight
        // of the 15th is 14:00Z on the 14th
        let offset = FixedOffset::east_opt(10 * 3600).unwrap();
        let now = utc(2025, 3, 15, 13, 0);
        let window = DayWindow::for_instant(now, offset);

        assert_eq!(
            window.calendar_date,
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
        assert_eq!(window.start_instant, utc(2025, 3, 14, 14, 0));
    }

    #[test]
    fn test_minutes_elapsed_clamps_at_zero() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let window = DayWindow::for_instant(utc(2025, 3, 15, 15, 0), offset);

        // An instant before the window start reads as zero elapsed
        assert_eq!(window.minutes_elapsed(utc(2025, 3, 15, 4, 0)), 0.0);
        assert_eq!(window.minutes_elapsed(utc(2025, 3, 15, 5, 30)), 30.0);
    }

    #[test]
    fn test_aggregate_from_sessions() {
        let sessions = vec![
            ExerciseSession {
                active_kcal: 120.0,
                data_origin: Some("watch".to_string()),
            },
            ExerciseSession {
                active_kcal: 180.0,
                data_origin: Some("watch".to_string()),
            },
            ExerciseSession {
                active_kcal: 45.5,
                data_origin: Some("phone".to_string()),
            },
        ];

        let aggregate = EnergyAggregate::from_sessions(2400.0, &sessions);
        assert_eq!(aggregate.total_kcal, 2400.0);
        assert_eq!(aggregate.active_kcal, 345.5);
        assert_eq!(aggregate.session_count, 3);
        assert_eq!(aggregate.distinct_data_origin_count, 2);
    }

    #[test]
    fn test_aggregate_empty_sessions() {
        let aggregate = EnergyAggregate::from_sessions(1500.0, &[]);
        assert_eq!(aggregate.active_kcal, 0.0);
        assert_eq!(aggregate.session_count, 0);
        assert_eq!(aggregate.distinct_data_origin_count, 0);
    }
}
