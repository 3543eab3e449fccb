use tracing::debug;

use super::error::{
    MetricsError, Result, ensure_finite, ensure_finite_result, ensure_non_negative,
    ensure_projection_years,
};
use super::types::{ScenarioCase, ScenarioInstrument, ScenarioSeries, YearRecord};

pub const MONTHS_PER_YEAR: u64 = 12;

pub fn months_in(years: u32) -> u64 {
    u64::from(years) * MONTHS_PER_YEAR
}

fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 100.0 / MONTHS_PER_YEAR as f64
}

/// Future value of an ordinary annuity with monthly contributions, at full
/// precision. Callers round for display with [`round_currency`].
pub fn project_annuity(monthly_contribution: f64, years: u32, annual_rate_percent: f64) -> Result<f64> {
    let contribution = ensure_non_negative("monthly contribution", monthly_contribution)?;
    let annual_rate_percent = ensure_finite("annual rate", annual_rate_percent)?;
    let years = ensure_projection_years("years", years)?;

    let months = months_in(years) as f64;
    let rate = monthly_rate(annual_rate_percent);
    if rate == 0.0 {
        return Ok(contribution * months);
    }

    let future_value = contribution * ((1.0 + rate).powf(months) - 1.0) / rate;
    ensure_finite_result("future value", future_value)
}

/// Nearest whole unit, with halves rounded toward positive infinity.
pub fn round_currency(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Share of `target` reached by `future_value`, capped at 100.
pub fn goal_progress(future_value: f64, target: f64) -> Result<f64> {
    if !(target.is_finite() && target > 0.0) {
        return Err(MetricsError::NonPositiveTarget);
    }
    let future_value = ensure_finite("future value", future_value)?;
    Ok((future_value / target * 100.0).min(100.0))
}

/// Year-by-year dividend reinvestment with a compounding yield.
///
/// Each year the previous dividend is folded into the position value, and the
/// next dividend is re-based on that new value *and* scaled by
/// `(1 + growth)^year`, where `year` is the year just recorded. Both factors
/// compound, so growth is counted twice; reference outputs depend on it.
pub fn project_dividend_reinvestment(
    initial_investment: f64,
    current_yield_percent: f64,
    growth_rate_percent: f64,
    years: u32,
) -> Result<Vec<YearRecord>> {
    let initial = ensure_non_negative("initial investment", initial_investment)?;
    let current_yield = ensure_non_negative("current yield", current_yield_percent)?;
    let growth_rate = ensure_finite("dividend growth rate", growth_rate_percent)?;
    let years = ensure_projection_years("years", years)?;

    let total_invested = initial;
    let growth_factor = 1.0 + growth_rate / 100.0;
    let mut value = initial;
    let mut dividend = value * current_yield / 100.0;
    let mut records = Vec::with_capacity(years as usize + 1);

    for year in 0..=years {
        records.push(YearRecord {
            year,
            value: ensure_finite_result("position value", value)?,
            dividend: ensure_finite_result("dividend", dividend)?,
            total_invested,
            yield_on_cost: yield_on_cost(dividend, total_invested),
        });
        if year == years {
            break;
        }

        value += dividend;
        dividend = value * current_yield * growth_factor.powf(f64::from(year)) / 100.0;
    }

    Ok(records)
}

fn yield_on_cost(dividend: f64, total_invested: f64) -> f64 {
    if total_invested > 0.0 {
        dividend / total_invested * 100.0
    } else {
        0.0
    }
}

/// Growth of the final record's value over the original principal, in percent.
pub fn total_return_percent(records: &[YearRecord]) -> f64 {
    match records.last() {
        Some(last) if last.total_invested > 0.0 => {
            (last.value - last.total_invested) / last.total_invested * 100.0
        }
        _ => 0.0,
    }
}

/// Monthly bear/base/bull paths for every instrument, flattened in input order.
pub fn project_scenarios(
    instruments: &[ScenarioInstrument],
    invested_amount: f64,
    time_range_years: u32,
) -> Result<Vec<ScenarioSeries>> {
    let invested = ensure_non_negative("invested amount", invested_amount)?;
    let months = months_in(ensure_projection_years("time range", time_range_years)?);

    let mut series = Vec::with_capacity(instruments.len() * ScenarioCase::ALL.len());
    for instrument in instruments {
        for case in ScenarioCase::ALL {
            let annual_rate = ensure_finite("scenario rate", case.rate(&instrument.scenario))?;
            let growth = 1.0 + monthly_rate(annual_rate);
            let values = (0..=months)
                .map(|month| {
                    ensure_finite_result("scenario value", invested * growth.powf(month as f64))
                })
                .collect::<Result<Vec<f64>>>()?;
            series.push(ScenarioSeries {
                label: format!("{} {}", instrument.label, case.title()),
                instrument: instrument.label.clone(),
                case,
                values,
            });
        }
    }

    debug!(
        instruments = instruments.len(),
        months, "projected scenario paths"
    );
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::MAX_PROJECTION_YEARS;
    use crate::core::types::ScenarioTriple;
    use proptest::prelude::{prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn annuity_matches_reference_projection() {
        let fv = project_annuity(500.0, 20, 7.0).expect("valid inputs");
        assert_eq!(round_currency(fv), 260_463.0);
        assert!(fv > 260_463.0 && fv < 260_464.0);
    }

    #[test]
    fn annuity_with_zero_years_is_zero() {
        assert_approx(project_annuity(500.0, 0, 7.0).unwrap(), 0.0);
        assert_approx(project_annuity(500.0, 0, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn annuity_rejects_negative_contribution() {
        let err = project_annuity(-1.0, 10, 5.0).expect_err("must reject");
        assert!(matches!(err, MetricsError::InvalidParameter { .. }));
    }

    #[test]
    fn annuity_rejects_non_finite_rate() {
        assert!(project_annuity(100.0, 10, f64::NAN).is_err());
        assert!(project_annuity(100.0, 10, f64::INFINITY).is_err());
    }

    #[test]
    fn annuity_overflow_is_an_error() {
        assert_eq!(
            project_annuity(500.0, 100, 100_000.0).unwrap_err(),
            MetricsError::NonFiniteResult("future value")
        );
    }

    #[test]
    fn horizons_beyond_the_limit_are_rejected_before_projecting() {
        let years = MAX_PROJECTION_YEARS + 1;
        let expected = MetricsError::InvalidParameter {
            name: "years",
            value: f64::from(years),
        };
        assert_eq!(project_annuity(500.0, years, 7.0).unwrap_err(), expected);
        assert_eq!(
            project_dividend_reinvestment(10_000.0, 3.0, 5.0, u32::MAX).unwrap_err(),
            MetricsError::InvalidParameter {
                name: "years",
                value: f64::from(u32::MAX),
            }
        );
        assert!(matches!(
            project_scenarios(&[], 1_000.0, u32::MAX).unwrap_err(),
            MetricsError::InvalidParameter { name: "time range", .. }
        ));

        assert_eq!(
            project_dividend_reinvestment(10_000.0, 3.0, 5.0, MAX_PROJECTION_YEARS)
                .unwrap()
                .len(),
            MAX_PROJECTION_YEARS as usize + 1
        );
    }

    #[test]
    fn round_currency_sends_halves_up() {
        assert_eq!(round_currency(2.5), 3.0);
        assert_eq!(round_currency(-2.5), -2.0);
        assert_eq!(round_currency(-2.6), -3.0);
        assert_eq!(round_currency(260_463.33), 260_463.0);
    }

    #[test]
    fn goal_progress_is_capped_at_one_hundred() {
        assert_approx(goal_progress(250_000.0, 1_000_000.0).unwrap(), 25.0);
        assert_approx(goal_progress(2_000_000.0, 1_000_000.0).unwrap(), 100.0);
        assert_eq!(
            goal_progress(1.0, 0.0).unwrap_err(),
            MetricsError::NonPositiveTarget
        );
    }

    #[test]
    fn dividend_trajectory_applies_both_growth_factors() {
        let records = project_dividend_reinvestment(10_000.0, 3.2, 6.0, 2).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].year, 0);
        assert_approx(records[0].value, 10_000.0);
        assert_approx(records[0].dividend, 320.0);
        assert_approx(records[0].yield_on_cost, 3.2);

        assert_approx(records[1].value, 10_320.0);
        assert_approx(records[1].dividend, 330.24);

        assert_approx(records[2].value, 10_650.24);
        assert_approx(records[2].dividend, 361.256_140_8);
        assert_approx(records[2].yield_on_cost, 3.612_561_408);

        for record in &records {
            assert_approx(record.total_invested, 10_000.0);
        }
        assert_approx(total_return_percent(&records), 6.5024);
    }

    #[test]
    fn dividend_trajectory_with_zero_years_has_single_record() {
        let records = project_dividend_reinvestment(5_000.0, 3.0, 5.0, 0).unwrap();
        assert_eq!(records.len(), 1);
        assert_approx(records[0].dividend, 150.0);
        assert_approx(total_return_percent(&records), 0.0);
    }

    #[test]
    fn dividend_trajectory_with_zero_principal_has_zero_yield_on_cost() {
        let records = project_dividend_reinvestment(0.0, 3.0, 5.0, 3).unwrap();
        assert!(records.iter().all(|r| r.value == 0.0 && r.yield_on_cost == 0.0));
    }

    #[test]
    fn scenarios_are_flattened_in_instrument_then_case_order() {
        let instruments = vec![
            ScenarioInstrument {
                label: "AAA".to_string(),
                scenario: ScenarioTriple {
                    bear: -10.0,
                    base: 5.0,
                    bull: 20.0,
                },
            },
            ScenarioInstrument {
                label: "BBB".to_string(),
                scenario: ScenarioTriple {
                    bear: 0.0,
                    base: 0.0,
                    bull: 0.0,
                },
            },
        ];

        let series = project_scenarios(&instruments, 1_000.0, 1).unwrap();
        let labels: Vec<&str> = series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            ["AAA Bear", "AAA Base", "AAA Bull", "BBB Bear", "BBB Base", "BBB Bull"]
        );

        for s in &series {
            assert_eq!(s.values.len(), 13);
            assert_approx(s.values[0], 1_000.0);
        }
        assert_approx(series[0].values[12], 904.458_374_149_839_8);
        assert_approx(series[1].values[12], 1_051.161_897_881_733);
        assert_approx(series[4].values[12], 1_000.0);
    }

    #[test]
    fn dividend_overflow_is_an_error() {
        assert_eq!(
            project_dividend_reinvestment(10_000.0, 0.0, 1e300, 3).unwrap_err(),
            MetricsError::NonFiniteResult("dividend")
        );
    }

    #[test]
    fn scenario_overflow_is_an_error() {
        let instruments = vec![ScenarioInstrument {
            label: "HOT".to_string(),
            scenario: ScenarioTriple {
                bear: 0.0,
                base: 5.0,
                bull: 1e12,
            },
        }];
        assert_eq!(
            project_scenarios(&instruments, 1_000.0, 10).unwrap_err(),
            MetricsError::NonFiniteResult("scenario value")
        );
    }

    #[test]
    fn scenarios_with_no_instruments_are_empty() {
        assert!(project_scenarios(&[], 1_000.0, 5).unwrap().is_empty());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_zero_rate_annuity_is_plain_sum(
            contribution in 0u32..10_000,
            years in 0u32..60
        ) {
            let m = f64::from(contribution);
            let fv = project_annuity(m, years, 0.0).unwrap();
            prop_assert_eq!(fv, m * f64::from(years * 12));
        }
    }
}
