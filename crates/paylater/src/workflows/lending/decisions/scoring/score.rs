use super::super::domain::Ratio;
use super::config::ScoringConfig;
use super::factors::RiskSignals;

/// Normalize the averaged daily balance into 0-100.
///
/// Negative balances fall linearly from 20 toward 0 at the configured floor;
/// positive balances climb through the low/moderate/good breakpoints
/// (20-40, 40-70, 70-90) and then step toward 100 per $500 above the good
/// threshold.
pub(crate) fn balance_score(adb: f64, config: &ScoringConfig) -> u8 {
    if adb < 0.0 {
        let span = config.balance_negative_floor.abs();
        let scaled = 20.0 + (adb / span) * 20.0;
        scaled.max(0.0) as u8
    } else if adb < config.balance_low_threshold {
        20 + ((adb / config.balance_low_threshold) * 20.0) as u8
    } else if adb < config.balance_moderate_threshold {
        let span = config.balance_moderate_threshold - config.balance_low_threshold;
        40 + (((adb - config.balance_low_threshold) / span) * 30.0) as u8
    } else if adb < config.balance_good_threshold {
        let span = config.balance_good_threshold - config.balance_moderate_threshold;
        70 + (((adb - config.balance_moderate_threshold) / span) * 20.0) as u8
    } else {
        let steps = ((adb - config.balance_good_threshold) / 500.0) as i64;
        (90 + steps * 10).min(100) as u8
    }
}

/// Normalize the income/spend ratio into 0-100.
///
/// Unbounded scores 100 outright; finite values climb through the
/// critical/breakeven/sustainable/healthy breakpoints (0-25, 25-50, 50-75,
/// 75-90) and saturate above healthy.
pub(crate) fn ratio_score(ratio: Ratio, config: &ScoringConfig) -> u8 {
    let value = match ratio {
        Ratio::Unbounded => return 100,
        Ratio::Finite(value) => value,
    };

    if value < config.ratio_critical_threshold {
        ((value / config.ratio_critical_threshold) * 25.0) as u8
    } else if value < config.ratio_breakeven_threshold {
        let span = config.ratio_breakeven_threshold - config.ratio_critical_threshold;
        25 + (((value - config.ratio_critical_threshold) / span) * 25.0) as u8
    } else if value < config.ratio_sustainable_threshold {
        let span = config.ratio_sustainable_threshold - config.ratio_breakeven_threshold;
        50 + (((value - config.ratio_breakeven_threshold) / span) * 25.0) as u8
    } else if value < config.ratio_healthy_threshold {
        let span = config.ratio_healthy_threshold - config.ratio_sustainable_threshold;
        75 + (((value - config.ratio_sustainable_threshold) / span) * 15.0) as u8
    } else {
        let scaled = 90.0 + (value - config.ratio_healthy_threshold) * 10.0;
        scaled.min(100.0) as u8
    }
}

/// Discrete NSF bands: fewer events is better, zero is perfect.
pub(crate) fn nsf_score(nsf_count: u32, config: &ScoringConfig) -> u8 {
    if nsf_count == 0 {
        100
    } else if nsf_count <= config.nsf_forgivable_count {
        75
    } else if nsf_count <= config.nsf_concerning_count {
        50
    } else if nsf_count <= config.nsf_high_risk_count {
        25
    } else {
        0
    }
}

/// Weighted blend of the three sub-scores, floored to an integer.
///
/// Irregular-but-sufficient income (consistency below the gig threshold with
/// a ratio above the gig minimum) earns a flat boost to the ratio sub-score,
/// capped at 100, so variable-income borrowers are not penalized purely for
/// timing variance.
pub(crate) fn composite_score(signals: &RiskSignals, config: &ScoringConfig) -> u8 {
    let balance = balance_score(signals.avg_daily_balance, config);
    let mut ratio = ratio_score(signals.income_ratio, config);
    let nsf = nsf_score(signals.nsf_count, config);

    if signals.income_consistency < config.gig_consistency_threshold
        && signals.income_ratio.exceeds(config.gig_ratio_threshold)
    {
        ratio = ratio.saturating_add(config.gig_ratio_boost).min(100);
    }

    let weighted = f64::from(balance) * config.weight_balance
        + f64::from(ratio) * config.weight_ratio
        + f64::from(nsf) * config.weight_nsf;

    weighted as u8
}
