//! Calendar and lunar helpers for date-derived features.

use chrono::{Datelike, NaiveDate};
use std::f64::consts::PI;

/// Synodic month length in days.
const MOON_CYCLE_DAYS: f64 = 29.530_588_67;

/// New-moon anchor the phase is measured from.
fn moon_anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 6).expect("valid anchor date")
}

/// Lunar phase in [0, 1): 0.0 new moon, 0.5 full moon.
pub fn moon_phase(date: NaiveDate) -> f64 {
    let days = (date - moon_anchor()).num_days() as f64;
    days.rem_euclid(MOON_CYCLE_DAYS) / MOON_CYCLE_DAYS
}

pub fn moon_phase_sin(date: NaiveDate) -> f64 {
    (2.0 * PI * moon_phase(date)).sin()
}

pub fn moon_phase_cos(date: NaiveDate) -> f64 {
    (2.0 * PI * moon_phase(date)).cos()
}

/// 1.0 within the full-moon band (phase in (0.4, 0.6)), else 0.0.
pub fn is_full_moon(date: NaiveDate) -> f64 {
    let phase = moon_phase(date);
    if phase > 0.4 && phase < 0.6 { 1.0 } else { 0.0 }
}

/// 1.0 within the new-moon band (phase < 0.1 or > 0.9), else 0.0.
pub fn is_new_moon(date: NaiveDate) -> f64 {
    let phase = moon_phase(date);
    if phase < 0.1 || phase > 0.9 { 1.0 } else { 0.0 }
}

pub fn day_of_year(date: NaiveDate) -> f64 {
    f64::from(date.ordinal())
}

/// Meteorological season index: 0 winter, 1 spring, 2 summer, 3 autumn.
pub fn season(date: NaiveDate) -> f64 {
    match date.month() {
        12 | 1 | 2 => 0.0,
        3..=5 => 1.0,
        6..=8 => 2.0,
        _ => 3.0,
    }
}

pub fn is_weekend(date: NaiveDate) -> f64 {
    if date.weekday().num_days_from_monday() >= 5 {
        1.0
    } else {
        0.0
    }
}

pub fn month_sin(date: NaiveDate) -> f64 {
    (2.0 * PI * f64::from(date.month()) / 12.0).sin()
}

pub fn month_cos(date: NaiveDate) -> f64 {
    (2.0 * PI * f64::from(date.month()) / 12.0).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_moon_phase_at_anchor_is_new() {
        assert!(moon_phase(d("2000-01-06")) < 1e-12);
    }

    #[test]
    fn test_moon_phase_full_mid_cycle() {
        // ~14.77 days after the anchor the phase should sit near 0.5.
        let phase = moon_phase(d("2000-01-21"));
        assert!((phase - 0.5).abs() < 0.02, "phase was {phase}");
    }

    #[test]
    fn test_moon_phase_defined_before_anchor() {
        let phase = moon_phase(d("1999-12-20"));
        assert!((0.0..1.0).contains(&phase));
    }

    #[test]
    fn test_lunar_flags_track_the_phase_bands() {
        // Anchor day is a new moon; half a cycle later is full.
        assert_eq!(is_new_moon(d("2000-01-06")), 1.0);
        assert_eq!(is_full_moon(d("2000-01-06")), 0.0);
        assert_eq!(is_full_moon(d("2000-01-21")), 1.0);
        assert_eq!(is_new_moon(d("2000-01-21")), 0.0);
        // First-quarter day sits in neither band.
        assert_eq!(is_full_moon(d("2000-01-13")), 0.0);
        assert_eq!(is_new_moon(d("2000-01-13")), 0.0);
    }

    #[test]
    fn test_day_of_year_leap_year() {
        assert_eq!(day_of_year(d("2024-12-31")), 366.0);
        assert_eq!(day_of_year(d("2025-12-31")), 365.0);
        assert_eq!(day_of_year(d("2024-02-29")), 60.0);
    }

    #[test]
    fn test_season_boundaries() {
        assert_eq!(season(d("2025-02-28")), 0.0);
        assert_eq!(season(d("2025-03-01")), 1.0);
        assert_eq!(season(d("2025-08-31")), 2.0);
        assert_eq!(season(d("2025-09-01")), 3.0);
        assert_eq!(season(d("2025-12-01")), 0.0);
    }

    #[test]
    fn test_weekend_flag() {
        assert_eq!(is_weekend(d("2025-06-07")), 1.0); // Saturday
        assert_eq!(is_weekend(d("2025-06-09")), 0.0); // Monday
    }
}
