use serde::{Deserialize, Serialize};

/// One row of the score-to-limit table. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditTier {
    pub min_score: u8,
    pub max_score: u8,
    pub limit_cents: i64,
}

/// Tunable parameters for the scoring pipeline.
///
/// Monetary fields are cents unless the name says otherwise; the balance
/// thresholds are whole currency units because they are compared against the
/// averaged daily balance. Loaded once at startup, validated eagerly, and
/// passed by reference into every evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Minimum transaction count for standard scoring.
    pub min_transactions: usize,
    /// Minimum distinct transaction days for standard scoring.
    pub min_history_days: usize,
    /// Limit granted to approved thin-file borrowers.
    pub thin_file_limit_cents: i64,

    pub weight_balance: f64,
    pub weight_ratio: f64,
    pub weight_nsf: f64,

    /// Income consistency below this marks the income as irregular.
    pub gig_consistency_threshold: f64,
    /// Minimum income/spend ratio to qualify for the irregular-income boost.
    pub gig_ratio_threshold: f64,
    /// Points added to the ratio sub-score for qualifying borrowers.
    pub gig_ratio_boost: u8,

    /// Ordered, gap-free score ranges covering 0-100.
    pub tiers: Vec<CreditTier>,

    /// Averaged balance at or below this scores 0.
    pub balance_negative_floor: f64,
    pub balance_low_threshold: f64,
    pub balance_moderate_threshold: f64,
    pub balance_good_threshold: f64,

    pub ratio_critical_threshold: f64,
    pub ratio_breakeven_threshold: f64,
    pub ratio_sustainable_threshold: f64,
    pub ratio_healthy_threshold: f64,

    pub nsf_forgivable_count: u32,
    pub nsf_concerning_count: u32,
    pub nsf_high_risk_count: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_transactions: 10,
            min_history_days: 30,
            thin_file_limit_cents: 10_000,

            weight_balance: 0.30,
            weight_ratio: 0.35,
            weight_nsf: 0.35,

            gig_consistency_threshold: 0.5,
            gig_ratio_threshold: 1.2,
            gig_ratio_boost: 10,

            tiers: vec![
                CreditTier { min_score: 0, max_score: 29, limit_cents: 0 },
                CreditTier { min_score: 30, max_score: 44, limit_cents: 10_000 },
                CreditTier { min_score: 45, max_score: 59, limit_cents: 20_000 },
                CreditTier { min_score: 60, max_score: 74, limit_cents: 30_000 },
                CreditTier { min_score: 75, max_score: 84, limit_cents: 40_000 },
                CreditTier { min_score: 85, max_score: 94, limit_cents: 50_000 },
                CreditTier { min_score: 95, max_score: 100, limit_cents: 60_000 },
            ],

            balance_negative_floor: -200.0,
            balance_low_threshold: 100.0,
            balance_moderate_threshold: 500.0,
            balance_good_threshold: 1500.0,

            ratio_critical_threshold: 0.8,
            ratio_breakeven_threshold: 1.0,
            ratio_sustainable_threshold: 1.3,
            ratio_healthy_threshold: 2.0,

            nsf_forgivable_count: 1,
            nsf_concerning_count: 2,
            nsf_high_risk_count: 4,
        }
    }
}

impl ScoringConfig {
    /// Check every structural invariant the scoring pipeline relies on.
    ///
    /// Runs once at engine construction so that request-time code can scan
    /// the tier table without a fallback branch.
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        if self.tiers.is_empty() {
            return Err(ScoringConfigError::EmptyTiers);
        }

        for (index, tier) in self.tiers.iter().enumerate() {
            if tier.min_score > tier.max_score {
                return Err(ScoringConfigError::InvertedTier {
                    index,
                    min: tier.min_score,
                    max: tier.max_score,
                });
            }
            if tier.limit_cents < 0 {
                return Err(ScoringConfigError::NegativeLimit { index });
            }
        }

        let first = self.tiers[0];
        if first.min_score != 0 {
            return Err(ScoringConfigError::UncoveredLowScores {
                found: first.min_score,
            });
        }

        let last = self.tiers[self.tiers.len() - 1];
        if last.max_score != 100 {
            return Err(ScoringConfigError::UncoveredHighScores {
                found: last.max_score,
            });
        }

        for pair in self.tiers.windows(2) {
            if u16::from(pair[1].min_score) != u16::from(pair[0].max_score) + 1 {
                return Err(ScoringConfigError::BrokenTierChain {
                    prev_max: pair[0].max_score,
                    next_min: pair[1].min_score,
                });
            }
        }

        for (name, value) in [
            ("weight_balance", self.weight_balance),
            ("weight_ratio", self.weight_ratio),
            ("weight_nsf", self.weight_nsf),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ScoringConfigError::WeightOutOfRange { name, value });
            }
        }

        if !(self.balance_negative_floor < 0.0
            && 0.0 < self.balance_low_threshold
            && self.balance_low_threshold < self.balance_moderate_threshold
            && self.balance_moderate_threshold < self.balance_good_threshold)
        {
            return Err(ScoringConfigError::BalanceThresholdOrder);
        }

        if !(0.0 < self.ratio_critical_threshold
            && self.ratio_critical_threshold < self.ratio_breakeven_threshold
            && self.ratio_breakeven_threshold < self.ratio_sustainable_threshold
            && self.ratio_sustainable_threshold < self.ratio_healthy_threshold)
        {
            return Err(ScoringConfigError::RatioThresholdOrder);
        }

        if !(self.nsf_forgivable_count <= self.nsf_concerning_count
            && self.nsf_concerning_count <= self.nsf_high_risk_count)
        {
            return Err(ScoringConfigError::NsfBandOrder);
        }

        Ok(())
    }

    /// Largest limit the tier table can grant.
    pub fn max_limit_cents(&self) -> i64 {
        self.tiers.iter().map(|tier| tier.limit_cents).max().unwrap_or(0)
    }
}

/// Structural problems in a [`ScoringConfig`], rejected at startup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("tier table is empty")]
    EmptyTiers,
    #[error("tier {index} has min score {min} above max score {max}")]
    InvertedTier { index: usize, min: u8, max: u8 },
    #[error("tier {index} has a negative limit")]
    NegativeLimit { index: usize },
    #[error("tier table must start at score 0 (starts at {found})")]
    UncoveredLowScores { found: u8 },
    #[error("tier table must end at score 100 (ends at {found})")]
    UncoveredHighScores { found: u8 },
    #[error("tier ending at {prev_max} is not followed by {next_min}; ranges must be gap-free and non-overlapping")]
    BrokenTierChain { prev_max: u8, next_min: u8 },
    #[error("{name} = {value} is outside 0.0..=1.0")]
    WeightOutOfRange { name: &'static str, value: f64 },
    #[error("balance thresholds must satisfy floor < 0 < low < moderate < good")]
    BalanceThresholdOrder,
    #[error("ratio thresholds must satisfy 0 < critical < breakeven < sustainable < healthy")]
    RatioThresholdOrder,
    #[error("nsf bands must satisfy forgivable <= concerning <= high risk")]
    NsfBandOrder,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ScoringConfig::default().validate().expect("defaults validate");
    }

    #[test]
    fn rejects_tier_gap() {
        let mut config = ScoringConfig::default();
        config.tiers[1].min_score = 31;

        assert_eq!(
            config.validate(),
            Err(ScoringConfigError::BrokenTierChain {
                prev_max: 29,
                next_min: 31,
            })
        );
    }

    #[test]
    fn rejects_tier_overlap() {
        let mut config = ScoringConfig::default();
        config.tiers[1].min_score = 29;

        assert_eq!(
            config.validate(),
            Err(ScoringConfigError::BrokenTierChain {
                prev_max: 29,
                next_min: 29,
            })
        );
    }

    #[test]
    fn rejects_table_not_reaching_100() {
        let mut config = ScoringConfig::default();
        config.tiers.last_mut().expect("tiers present").max_score = 99;

        assert_eq!(
            config.validate(),
            Err(ScoringConfigError::UncoveredHighScores { found: 99 })
        );
    }

    #[test]
    fn rejects_weight_above_one() {
        let config = ScoringConfig {
            weight_ratio: 1.2,
            ..ScoringConfig::default()
        };

        assert_eq!(
            config.validate(),
            Err(ScoringConfigError::WeightOutOfRange {
                name: "weight_ratio",
                value: 1.2,
            })
        );
    }

    #[test]
    fn rejects_disordered_ratio_thresholds() {
        let config = ScoringConfig {
            ratio_sustainable_threshold: 0.9,
            ..ScoringConfig::default()
        };

        assert_eq!(config.validate(), Err(ScoringConfigError::RatioThresholdOrder));
    }

    #[test]
    fn max_limit_reads_the_top_tier() {
        assert_eq!(ScoringConfig::default().max_limit_cents(), 60_000);
    }
}
