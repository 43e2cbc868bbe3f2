use super::config::ScoringConfig;

/// Resolve a composite score to the configured credit limit.
///
/// The score is clamped into 0-100 first; the validated tier table covers
/// that range exactly once, so the scan always finds one row.
pub(crate) fn limit_for_score(score: u8, config: &ScoringConfig) -> i64 {
    let clamped = score.min(100);
    config
        .tiers
        .iter()
        .find(|tier| tier.min_score <= clamped && clamped <= tier.max_score)
        .map(|tier| tier.limit_cents)
        .unwrap_or(0)
}

/// Bucket label for a granted limit, used as a metrics dimension.
pub fn limit_bucket(limit_cents: i64) -> &'static str {
    match limit_cents {
        i64::MIN..=0 => "0",
        1..=10_000 => "100",
        10_001..=20_000 => "100-200",
        20_001..=30_000 => "200-300",
        30_001..=40_000 => "300-400",
        40_001..=50_000 => "400-500",
        _ => "500-600",
    }
}
