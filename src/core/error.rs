use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("{0} must contain at least one entry")]
    EmptySeries(&'static str),

    #[error("price at {timestamp} must be a positive finite number, got {price}")]
    InvalidPrice { timestamp: String, price: f64 },

    #[error("{name} is out of range: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("unknown asset `{0}`")]
    UnknownAsset(String),

    #[error("asset `{0}` appears more than once")]
    DuplicateAsset(String),

    #[error("no metric supplied for asset `{0}`")]
    MissingMetric(String),

    #[error("allocations must sum to {expected}, got {actual}")]
    OffTotal { expected: f64, actual: f64 },

    #[error("{0} overflowed to a non-finite value")]
    NonFiniteResult(&'static str),

    #[error("goal target must be > 0")]
    NonPositiveTarget,
}

pub type Result<T> = std::result::Result<T, MetricsError>;

/// Longest horizon any projection accepts; bounds the series a single call
/// can allocate.
pub const MAX_PROJECTION_YEARS: u32 = 100;

pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(MetricsError::InvalidParameter { name, value })
    }
}

pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MetricsError::InvalidParameter { name, value })
    }
}

pub(crate) fn ensure_finite_result(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MetricsError::NonFiniteResult(name))
    }
}

pub(crate) fn ensure_projection_years(name: &'static str, years: u32) -> Result<u32> {
    if years <= MAX_PROJECTION_YEARS {
        Ok(years)
    } else {
        Err(MetricsError::InvalidParameter {
            name,
            value: f64::from(years),
        })
    }
}
