use chrono::{DateTime, Utc};

use crate::models::{BiologicalSex, DayWindow, UserProfile};

/// Minutes in a nominal day, the divisor for the per-minute BMR rate
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Mifflin-St Jeor sex constant for males (kcal/day)
const MALE_SEX_CONSTANT: f64 = 5.0;

/// Mifflin-St Jeor sex constant for females (kcal/day)
const FEMALE_SEX_CONSTANT: f64 = -161.0;

/// Basal metabolic rate calculator
///
/// Pure functions of the profile and elapsed time; no error conditions.
pub struct BmrCalculator;

impl BmrCalculator {
    /// Daily BMR via the Mifflin-St Jeor equation
    ///
    /// `BMR = 10 x weight_kg + 6.25 x height_cm - 5 x age_years + s`
    /// with `s = +5` for males and `-161` for females.
    pub fn daily_bmr(profile: &UserProfile, on: chrono::NaiveDate) -> f64 {
        let age = f64::from(profile.age_years(on));
        let sex_constant = match profile.sex {
            BiologicalSex::Male => MALE_SEX_CONSTANT,
            BiologicalSex::Female => FEMALE_SEX_CONSTANT,
        };

        10.0 * profile.weight_kg + 6.25 * profile.height_cm - 5.0 * age + sex_constant
    }

    /// Per-minute BMR rate from a daily figure
    pub fn bmr_per_minute(daily_bmr: f64) -> f64 {
        daily_bmr / MINUTES_PER_DAY
    }

    /// BMR energy for the elapsed portion of the window, on absolute instants.
    ///
    /// The per-minute rate is constant across the day, so on a DST transition
    /// day the elapsed figure diverges from a wall-clock reading by up to
    /// ~4%. That tolerance is an accepted property of the constant-rate
    /// model; do not replace this with wall-clock-day-fraction math.
    pub fn bmr_elapsed(bmr_per_minute: f64, window: &DayWindow, now: DateTime<Utc>) -> f64 {
        bmr_per_minute * window.minutes_elapsed(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, TimeZone};

    fn male_profile() -> UserProfile {
        UserProfile {
            sex: BiologicalSex::Male,
            birth_date: NaiveDate::from_ymd_opt(1995, 1, 1).unwrap(),
            weight_kg: 70.0,
            height_cm: 175.0,
        }
    }

    #[test]
    fn test_daily_bmr_male() {
        // Age 30 on 2025-06-01: 700 + 1093.75 - 150 + 5 = 1648.75
        let on = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let bmr = BmrCalculator::daily_bmr(&male_profile(), on);
        assert!((bmr - 1648.75).abs() < 1e-9);
    }

    #[test]
    fn test_daily_bmr_female() {
        let profile = UserProfile {
            sex: BiologicalSex::Female,
            birth_date: NaiveDate::from_ymd_opt(2000, 6, 1).unwrap(),
            weight_kg: 60.0,
            height_cm: 165.0,
        };

        // Age 25: 600 + 1031.25 - 125 - 161 = 1345.25
        let on = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let bmr = BmrCalculator::daily_bmr(&profile, on);
        assert!((bmr - 1345.25).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_per_minute() {
        assert!((BmrCalculator::bmr_per_minute(1800.0) - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_bmr_elapsed_half_day() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let midnight = Utc.with_ymd_and_hms(2025, 3, 15, 5, 0, 0).unwrap();
        let window = DayWindow::for_instant(midnight, offset);
        let noon = Utc.with_ymd_and_hms(2025, 3, 15, 17, 0, 0).unwrap();

        let elapsed = BmrCalculator::bmr_elapsed(1.25, &window, noon);
        assert!((elapsed - 900.0).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_elapsed_at_midnight_is_zero() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let midnight = Utc.with_ymd_and_hms(2025, 3, 15, 5, 0, 0).unwrap();
        let window = DayWindow::for_instant(midnight, offset);

        assert_eq!(BmrCalculator::bmr_elapsed(1.25, &window, midnight), 0.0);
    }
}
