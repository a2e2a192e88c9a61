//! Moon phase from a calendar date.

use std::fmt;

use chrono::NaiveDate;

/// Mean length of the synodic month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.530_588;

/// The eight named lunar phases, in synodic order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    /// All phases, indexed by [`MoonPhase::index`].
    pub const ALL: [Self; 8] = [
        Self::NewMoon,
        Self::WaxingCrescent,
        Self::FirstQuarter,
        Self::WaxingGibbous,
        Self::FullMoon,
        Self::WaningGibbous,
        Self::LastQuarter,
        Self::WaningCrescent,
    ];

    /// Position in the cycle, 0 (new) to 7 (waning crescent).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NewMoon => "🌑 New Moon",
            Self::WaxingCrescent => "🌒 Waxing Crescent",
            Self::FirstQuarter => "🌓 First Quarter",
            Self::WaxingGibbous => "🌔 Waxing Gibbous",
            Self::FullMoon => "🌕 Full Moon",
            Self::WaningGibbous => "🌖 Waning Gibbous",
            Self::LastQuarter => "🌗 Last Quarter",
            Self::WaningCrescent => "🌘 Waning Crescent",
        }
    }
}

impl fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A known new moon used as the epoch of the cycle.
fn reference_new_moon() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 6).unwrap_or_default()
}

/// Computes the phase of the moon on `date`.
#[must_use]
pub fn moon_phase(date: NaiveDate) -> MoonPhase {
    #[allow(clippy::cast_precision_loss)]
    let elapsed = (date - reference_new_moon()).num_days() as f64;
    let age = elapsed.rem_euclid(SYNODIC_MONTH_DAYS);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = ((age / SYNODIC_MONTH_DAYS) * 8.0 + 0.5).floor() as usize % 8;

    MoonPhase::ALL[index]
}
