//! Pure astronomy helpers: no I/O, fully deterministic given their inputs.

mod facts;
mod kp;
mod moon;

use chrono::{Days, NaiveDate};
use rand::Rng;

pub use facts::{ASTRONOMY_FACTS, random_fact};
pub use kp::{GScale, KpClass, KpSeverity, classify_kp, round_kp};
pub use moon::{MoonPhase, SYNODIC_MONTH_DAYS, moon_phase};

/// First day with an Astronomy Picture of the Day.
#[must_use]
pub fn apod_first_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1995, 6, 16).unwrap_or_default()
}

/// Whether APOD has an entry for `date` as of `today`.
#[must_use]
pub fn is_valid_apod_date(date: NaiveDate, today: NaiveDate) -> bool {
    date >= apod_first_date() && date <= today
}

/// Picks a uniformly random APOD date in `[1995-06-16, today)`.
pub fn random_apod_date<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> NaiveDate {
    let first = apod_first_date();
    let span = (today - first).num_days();
    if span <= 0 {
        return first;
    }
    #[allow(clippy::cast_sign_loss)]
    let offset = rng.gen_range(0..span) as u64;
    first.checked_add_days(Days::new(offset)).unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_random_apod_date_in_range() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let date = random_apod_date(today, &mut rng);
            assert!(date >= apod_first_date());
            assert!(date < today);
        }
    }

    #[test]
    fn test_random_apod_date_degenerate_today() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(random_apod_date(apod_first_date(), &mut rng), apod_first_date());
    }

    #[test]
    fn test_is_valid_apod_date() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(is_valid_apod_date(apod_first_date(), today));
        assert!(is_valid_apod_date(today, today));
        assert!(!is_valid_apod_date(NaiveDate::from_ymd_opt(1995, 6, 15).unwrap(), today));
        assert!(!is_valid_apod_date(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(), today));
    }
}
