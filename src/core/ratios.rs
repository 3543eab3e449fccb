use super::error::{MetricsError, Result, ensure_finite, ensure_finite_result, ensure_non_negative};
use super::growth::round_currency;
use super::types::{BeatRate, EarningsRecord, PegRating, ReturnProfile, TerminalComparison};

pub const UNDERVALUED_PEG_MAX: f64 = 1.0;
pub const FAIR_PEG_MAX: f64 = 1.5;

/// P/E over growth; non-positive growth yields 0 rather than an error.
pub fn peg_ratio(pe: f64, growth_rate_percent: f64) -> f64 {
    if growth_rate_percent > 0.0 {
        pe / growth_rate_percent
    } else {
        0.0
    }
}

pub fn peg_rating(peg: f64) -> PegRating {
    if peg <= UNDERVALUED_PEG_MAX {
        PegRating::PotentiallyUndervalued
    } else if peg <= FAIR_PEG_MAX {
        PegRating::FairlyValued
    } else {
        PegRating::PotentiallyOvervalued
    }
}

pub fn is_beat(record: &EarningsRecord) -> bool {
    record.actual > record.expected
}

pub fn beat_rate(records: &[EarningsRecord]) -> Result<BeatRate> {
    if records.is_empty() {
        return Err(MetricsError::EmptySeries("earnings records"));
    }
    for record in records {
        ensure_finite("expected earnings", record.expected)?;
        ensure_finite("actual earnings", record.actual)?;
    }

    let beat_count = records.iter().filter(|r| is_beat(r)).count();
    let total = records.len();
    Ok(BeatRate {
        beat_count,
        total,
        rate_percent: beat_count as f64 / total as f64 * 100.0,
    })
}

/// How far actual earnings landed from the estimate, in percent of the estimate.
pub fn surprise_percent(record: &EarningsRecord) -> f64 {
    if record.expected == 0.0 {
        return 0.0;
    }
    (record.actual - record.expected) / record.expected * 100.0
}

/// Rounded value of `principal` after `profile.return_percent` over the
/// horizon, plus `dividend_yield` per year when dividends are reinvested.
pub fn terminal_value(
    principal: f64,
    profile: &ReturnProfile,
    horizon_years: f64,
    reinvest_dividends: bool,
) -> Result<f64> {
    let principal = ensure_non_negative("principal", principal)?;
    let horizon_years = ensure_non_negative("horizon years", horizon_years)?;
    let mut total_return = ensure_finite("return percent", profile.return_percent)?;
    let dividend_yield = ensure_finite("dividend yield", profile.dividend_yield)?;

    if reinvest_dividends && dividend_yield != 0.0 {
        total_return += dividend_yield * horizon_years;
    }
    let value = ensure_finite_result("terminal value", principal * (1.0 + total_return / 100.0))?;
    Ok(round_currency(value))
}

pub fn compare_terminal_values(
    principal: f64,
    subject: &ReturnProfile,
    benchmark: &ReturnProfile,
    horizon_years: f64,
    reinvest_dividends: bool,
) -> Result<TerminalComparison> {
    let subject_value = terminal_value(principal, subject, horizon_years, reinvest_dividends)?;
    let benchmark_value = terminal_value(principal, benchmark, horizon_years, reinvest_dividends)?;
    Ok(TerminalComparison {
        subject_value,
        benchmark_value,
        difference: subject_value - benchmark_value,
    })
}
