//! ADX non-linearity: the composite multiplier and the confidence bonus.
//!
//! Both are band tables keyed by the lower ADX bound of each band. Moderate
//! trends confirm a signal; extreme ADX is read as exhaustion and favors the
//! counter-trend side.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::indicators::TrendStrength;

/// Composite multiplier for ADX at or above `min_adx`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxBand {
    pub min_adx: f64,
    /// Multiplier when the DI direction agrees with the base score's sign.
    pub aligned: f64,
    /// Multiplier otherwise.
    pub opposed: f64,
}

impl AdxBand {
    pub fn default_table() -> Vec<AdxBand> {
        [
            (0.0, 0.85, 0.85),
            (20.0, 1.05, 0.9),
            (30.0, 1.15, 0.9),
            (40.0, 1.1, 0.85),
            (50.0, 0.9, 1.0),
            (60.0, 0.8, 1.1),
        ]
        .into_iter()
        .map(|(min_adx, aligned, opposed)| AdxBand {
            min_adx,
            aligned,
            opposed,
        })
        .collect()
    }

    pub fn validate_table(table: &[AdxBand]) -> Result<(), ConfigError> {
        let bounds: Vec<f64> = table.iter().map(|b| b.min_adx).collect();
        validate_bounds("adx_modifier", &bounds)?;
        for band in table {
            for factor in [band.aligned, band.opposed] {
                if !factor.is_finite() || factor < 0.0 {
                    return Err(ConfigError::InvalidAdxTable {
                        table: "adx_modifier",
                        reason: format!(
                            "multiplier {factor} at min_adx {} must be finite and non-negative",
                            band.min_adx
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Confidence bonus for ADX at or above `min_adx`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxConfidenceBand {
    pub min_adx: f64,
    pub bonus: f64,
}

impl AdxConfidenceBand {
    pub fn default_table() -> Vec<AdxConfidenceBand> {
        [(0.0, 0.05), (20.0, 0.15), (40.0, 0.10), (50.0, 0.05)]
            .into_iter()
            .map(|(min_adx, bonus)| AdxConfidenceBand { min_adx, bonus })
            .collect()
    }

    pub fn validate_table(table: &[AdxConfidenceBand]) -> Result<(), ConfigError> {
        let bounds: Vec<f64> = table.iter().map(|b| b.min_adx).collect();
        validate_bounds("adx_confidence", &bounds)?;
        if let Some(band) = table.iter().find(|b| !b.bonus.is_finite() || b.bonus < 0.0) {
            return Err(ConfigError::InvalidAdxTable {
                table: "adx_confidence",
                reason: format!(
                    "bonus {} at min_adx {} must be finite and non-negative",
                    band.bonus, band.min_adx
                ),
            });
        }
        Ok(())
    }
}

fn validate_bounds(table: &'static str, bounds: &[f64]) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidAdxTable {
        table,
        reason: reason.to_string(),
    };
    match bounds.first() {
        None => return Err(invalid("table is empty")),
        Some(&first) if first != 0.0 => return Err(invalid("first band must start at 0")),
        _ => {}
    }
    if bounds.iter().any(|b| !b.is_finite()) {
        return Err(invalid("band bounds must be finite"));
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(invalid("band bounds must be strictly ascending"));
    }
    Ok(())
}

/// Multiplier applied to the base score. No ADX reading means no adjustment.
pub fn adx_multiplier(table: &[AdxBand], trend: Option<&TrendStrength>, base: f64) -> f64 {
    let Some(trend) = trend else {
        return 1.0;
    };
    match table.iter().rev().find(|b| trend.adx >= b.min_adx) {
        Some(band) if trend.aligned_with(base) => band.aligned,
        Some(band) => band.opposed,
        None => 1.0,
    }
}

/// Confidence bonus from ADX. No ADX reading adds nothing.
pub fn adx_confidence_bonus(table: &[AdxConfidenceBand], trend: Option<&TrendStrength>) -> f64 {
    trend
        .and_then(|t| table.iter().rev().find(|b| t.adx >= b.min_adx))
        .map_or(0.0, |b| b.bonus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;

    fn trend(adx: f64, direction: Direction) -> TrendStrength {
        TrendStrength {
            adx,
            plus_di: 0.0,
            minus_di: 0.0,
            direction,
            trending: adx >= 20.0,
            strong_trend: adx >= 40.0,
        }
    }

    #[test]
    fn multiplier_bands() {
        let table = AdxBand::default_table();
        let cases = [
            (10.0, 0.85, 0.85),
            (20.0, 1.05, 0.9),
            (35.0, 1.15, 0.9),
            (45.0, 1.1, 0.85),
            (55.0, 0.9, 1.0),
            (75.0, 0.8, 1.1),
        ];
        for (adx, aligned, opposed) in cases {
            let t = trend(adx, Direction::Bullish);
            assert_eq!(adx_multiplier(&table, Some(&t), 0.3), aligned, "adx {adx}");
            assert_eq!(adx_multiplier(&table, Some(&t), -0.3), opposed, "adx {adx}");
        }
    }

    #[test]
    fn neutral_base_is_never_aligned() {
        let table = AdxBand::default_table();
        let t = trend(35.0, Direction::Bullish);
        assert_eq!(adx_multiplier(&table, Some(&t), 0.0), 0.9);
    }

    #[test]
    fn missing_adx_is_identity() {
        assert_eq!(adx_multiplier(&AdxBand::default_table(), None, 0.5), 1.0);
        assert_eq!(
            adx_confidence_bonus(&AdxConfidenceBand::default_table(), None),
            0.0
        );
    }

    #[test]
    fn confidence_bonus_peaks_at_moderate_trend() {
        let table = AdxConfidenceBand::default_table();
        let bonus = |adx| adx_confidence_bonus(&table, Some(&trend(adx, Direction::Bullish)));
        assert_eq!(bonus(0.0), 0.05);
        assert_eq!(bonus(25.0), 0.15);
        assert_eq!(bonus(39.9), 0.15);
        assert_eq!(bonus(45.0), 0.10);
        assert_eq!(bonus(80.0), 0.05);
    }

    #[test]
    fn tables_validate() {
        AdxBand::validate_table(&AdxBand::default_table()).unwrap();
        AdxConfidenceBand::validate_table(&AdxConfidenceBand::default_table()).unwrap();

        assert!(AdxBand::validate_table(&[]).is_err());

        let mut unordered = AdxBand::default_table();
        unordered.swap(1, 2);
        assert!(AdxBand::validate_table(&unordered).is_err());

        let mut late_start = AdxConfidenceBand::default_table();
        late_start[0].min_adx = 5.0;
        assert!(AdxConfidenceBand::validate_table(&late_start).is_err());

        let mut negative = AdxBand::default_table();
        negative[3].opposed = -1.0;
        assert!(AdxBand::validate_table(&negative).is_err());
    }
}
