//! Kp index classification on the NOAA G-scale.

use std::fmt;

/// NOAA geomagnetic storm scale tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GScale {
    G0,
    G1,
    G2,
    G3,
    G4,
    G5,
}

impl fmt::Display for GScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tier = match self {
            Self::G0 => "G0",
            Self::G1 => "G1",
            Self::G2 => "G2",
            Self::G3 => "G3",
            Self::G4 => "G4",
            Self::G5 => "G5",
        };
        f.write_str(tier)
    }
}

/// Severity of the geomagnetic activity, ordered from calm to extreme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KpSeverity {
    Quiet,
    Unsettled,
    MinorStorm,
    ModerateStorm,
    StrongStorm,
    SevereStorm,
    ExtremeStorm,
}

impl KpSeverity {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Quiet => "✅ Quiet",
            Self::Unsettled => "⚠️ Unsettled",
            Self::MinorStorm => "🔶 Minor Storm",
            Self::ModerateStorm => "🟠 Moderate Storm",
            Self::StrongStorm => "🔴 Strong Storm",
            Self::SevereStorm => "🟣 Severe Storm",
            Self::ExtremeStorm => "🟪 Extreme Storm",
        }
    }
}

/// Classification of a single Kp value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KpClass {
    pub severity: KpSeverity,
    pub scale: GScale,
}

/// Classifies an integer Kp index (0-9).
///
/// Returns `None` outside the scale.
#[must_use]
pub const fn classify_kp(kp: u8) -> Option<KpClass> {
    let (severity, scale) = match kp {
        0..=3 => (KpSeverity::Quiet, GScale::G0),
        4 => (KpSeverity::Unsettled, GScale::G0),
        5 => (KpSeverity::MinorStorm, GScale::G1),
        6 => (KpSeverity::ModerateStorm, GScale::G2),
        7 => (KpSeverity::StrongStorm, GScale::G3),
        8 => (KpSeverity::SevereStorm, GScale::G4),
        9 => (KpSeverity::ExtremeStorm, GScale::G5),
        _ => return None,
    };
    Some(KpClass { severity, scale })
}

/// Rounds a reported Kp value (DONKI publishes thirds, e.g. 5.67) to the
/// integer index used for classification.
#[must_use]
pub fn round_kp(value: f64) -> Option<u8> {
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round();
    if (0.0..=9.0).contains(&rounded) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let kp = rounded as u8;
        Some(kp)
    } else {
        None
    }
}
