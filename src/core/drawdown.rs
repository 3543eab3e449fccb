use tracing::debug;

use super::error::{MetricsError, Result};
use super::types::{DrawdownResult, PricePoint, RecoveryOutlook, VolatilityLevel};

pub const HIGH_VOLATILITY_ABOVE: f64 = 30.0;
pub const MEDIUM_VOLATILITY_ABOVE: f64 = 15.0;
pub const EXTENDED_RECOVERY_ABOVE: f64 = 20.0;

/// Largest peak-to-trough decline over `series`, in percent of the peak.
///
/// `start` is attributed by walking back from the trough to the nearest point
/// whose price equals the running peak, so a repeated peak price resolves to
/// its latest occurrence.
pub fn compute_max_drawdown(series: &[PricePoint]) -> Result<DrawdownResult> {
    let first = series.first().ok_or(MetricsError::EmptySeries("price series"))?;
    if let Some(bad) = series
        .iter()
        .find(|p| !(p.price.is_finite() && p.price > 0.0))
    {
        return Err(MetricsError::InvalidPrice {
            timestamp: bad.timestamp.clone(),
            price: bad.price,
        });
    }

    let mut peak = first.price;
    let mut max_drawdown = 0.0;
    let mut start = None;
    let mut end = None;

    for (i, point) in series.iter().enumerate() {
        if point.price > peak {
            peak = point.price;
        }

        let drawdown = (peak - point.price) / peak * 100.0;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
            end = Some(point.timestamp.clone());
            start = series[..=i]
                .iter()
                .rev()
                .find(|p| p.price == peak)
                .map(|p| p.timestamp.clone());
        }
    }

    debug!(
        points = series.len(),
        max_drawdown,
        start = start.as_deref().unwrap_or("-"),
        end = end.as_deref().unwrap_or("-"),
        "computed max drawdown"
    );

    let current_price = series.last().map_or(first.price, |p| p.price);
    Ok(DrawdownResult {
        max_drawdown,
        start,
        end,
        current_price,
    })
}

pub fn volatility_level(max_drawdown: f64) -> VolatilityLevel {
    if max_drawdown > HIGH_VOLATILITY_ABOVE {
        VolatilityLevel::High
    } else if max_drawdown > MEDIUM_VOLATILITY_ABOVE {
        VolatilityLevel::Medium
    } else {
        VolatilityLevel::Low
    }
}

pub fn recovery_outlook(max_drawdown: f64) -> RecoveryOutlook {
    if max_drawdown > EXTENDED_RECOVERY_ABOVE {
        RecoveryOutlook::Extended
    } else {
        RecoveryOutlook::Moderate
    }
}
