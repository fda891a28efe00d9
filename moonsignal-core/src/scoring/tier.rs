//! Seven-tier discretization of the composite score.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "STRONG SHORT")]
    StrongShort,
    #[serde(rename = "SHORT")]
    Short,
    #[serde(rename = "LEAN SHORT")]
    LeanShort,
    #[serde(rename = "NEUTRAL")]
    Neutral,
    #[serde(rename = "LEAN LONG")]
    LeanLong,
    #[serde(rename = "LONG")]
    Long,
    #[serde(rename = "STRONG LONG")]
    StrongLong,
}

impl Tier {
    /// Ascending, from -3 to +3.
    pub const ALL: [Tier; 7] = [
        Tier::StrongShort,
        Tier::Short,
        Tier::LeanShort,
        Tier::Neutral,
        Tier::LeanLong,
        Tier::Long,
        Tier::StrongLong,
    ];

    pub fn score(&self) -> i8 {
        match self {
            Tier::StrongShort => -3,
            Tier::Short => -2,
            Tier::LeanShort => -1,
            Tier::Neutral => 0,
            Tier::LeanLong => 1,
            Tier::Long => 2,
            Tier::StrongLong => 3,
        }
    }

    pub fn from_score(score: i8) -> Option<Self> {
        Tier::ALL.iter().copied().find(|t| t.score() == score)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::StrongShort => "STRONG SHORT",
            Tier::Short => "SHORT",
            Tier::LeanShort => "LEAN SHORT",
            Tier::Neutral => "NEUTRAL",
            Tier::LeanLong => "LEAN LONG",
            Tier::Long => "LONG",
            Tier::StrongLong => "STRONG LONG",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive lower bounds of the six upper tiers; anything below `short`
/// is STRONG SHORT. Must be strictly descending.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub strong_long: f64,
    pub long: f64,
    pub lean_long: f64,
    pub neutral: f64,
    pub lean_short: f64,
    pub short: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            strong_long: 0.55,
            long: 0.35,
            lean_long: 0.15,
            neutral: -0.15,
            lean_short: -0.35,
            short: -0.55,
        }
    }
}

impl TierThresholds {
    fn cutoffs(&self) -> [(&'static str, f64, Tier); 6] {
        [
            ("strong_long", self.strong_long, Tier::StrongLong),
            ("long", self.long, Tier::Long),
            ("lean_long", self.lean_long, Tier::LeanLong),
            ("neutral", self.neutral, Tier::Neutral),
            ("lean_short", self.lean_short, Tier::LeanShort),
            ("short", self.short, Tier::Short),
        ]
    }

    pub fn classify(&self, composite: f64) -> Tier {
        self.cutoffs()
            .iter()
            .find(|(_, cutoff, _)| composite >= *cutoff)
            .map_or(Tier::StrongShort, |(_, _, tier)| *tier)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cutoffs = self.cutoffs();
        for (name, value, _) in cutoffs {
            if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        for pair in cutoffs.windows(2) {
            if pair[0].1 <= pair[1].1 {
                return Err(ConfigError::ThresholdsNotDescending {
                    upper: pair[0].0,
                    lower: pair[1].0,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cutoffs() {
        let t = TierThresholds::default();
        assert_eq!(t.classify(0.8), Tier::StrongLong);
        assert_eq!(t.classify(0.55), Tier::StrongLong);
        assert_eq!(t.classify(0.4), Tier::Long);
        assert_eq!(t.classify(0.15), Tier::LeanLong);
        assert_eq!(t.classify(0.0), Tier::Neutral);
        assert_eq!(t.classify(-0.15), Tier::Neutral);
        assert_eq!(t.classify(-0.2), Tier::LeanShort);
        assert_eq!(t.classify(-0.5), Tier::Short);
        assert_eq!(t.classify(-0.55), Tier::Short);
        assert_eq!(t.classify(-0.56), Tier::StrongShort);
    }

    #[test]
    fn custom_cutoffs() {
        let t = TierThresholds {
            strong_long: 0.9,
            long: 0.6,
            lean_long: 0.3,
            neutral: -0.1,
            lean_short: -0.2,
            short: -0.9,
        };
        t.validate().unwrap();
        assert_eq!(t.classify(0.5), Tier::LeanLong);
        assert_eq!(t.classify(-0.5), Tier::Short);
    }

    #[test]
    fn rejects_non_monotone() {
        let t = TierThresholds {
            long: 0.6,
            ..TierThresholds::default()
        };
        assert!(matches!(
            t.validate(),
            Err(ConfigError::ThresholdsNotDescending {
                upper: "strong_long",
                lower: "long"
            })
        ));
    }

    #[test]
    fn rejects_out_of_range() {
        let t = TierThresholds {
            strong_long: 1.5,
            ..TierThresholds::default()
        };
        assert!(matches!(
            t.validate(),
            Err(ConfigError::ThresholdOutOfRange { name: "strong_long", .. })
        ));

        let t = TierThresholds {
            short: f64::NAN,
            ..TierThresholds::default()
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn scores_and_labels() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_score(tier.score()), Some(tier));
        }
        assert_eq!(Tier::from_score(4), None);
        assert_eq!(Tier::LeanLong.to_string(), "LEAN LONG");
        assert_eq!(
            serde_json::to_string(&Tier::StrongShort).unwrap(),
            "\"STRONG SHORT\""
        );
    }
}
