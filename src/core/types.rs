use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const ALLOCATION_TOTAL: f64 = 100.0;
pub const ALLOCATION_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub timestamp: String,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: impl Into<String>, price: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTriple {
    pub bear: f64,
    pub base: f64,
    pub bull: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInstrument {
    pub label: String,
    pub scenario: ScenarioTriple,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioCase {
    Bear,
    Base,
    Bull,
}

impl ScenarioCase {
    pub const ALL: [ScenarioCase; 3] = [ScenarioCase::Bear, ScenarioCase::Base, ScenarioCase::Bull];

    pub fn rate(self, triple: &ScenarioTriple) -> f64 {
        match self {
            ScenarioCase::Bear => triple.bear,
            ScenarioCase::Base => triple.base,
            ScenarioCase::Bull => triple.bull,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ScenarioCase::Bear => "Bear",
            ScenarioCase::Base => "Base",
            ScenarioCase::Bull => "Bull",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSeries {
    pub label: String,
    pub instrument: String,
    pub case: ScenarioCase,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRecord {
    pub year: u32,
    pub value: f64,
    pub dividend: f64,
    pub total_invested: f64,
    pub yield_on_cost: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum RecoveryOutlook {
    Moderate,
    Extended,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownResult {
    pub max_drawdown: f64,
    pub start: Option<String>,
    pub end: Option<String>,
    pub current_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub id: String,
    pub percent: f64,
}

/// Percentages keyed by asset id, kept in caller order.
///
/// Only `AllocationSet::new` and the rebalancer produce values of this type, so
/// a set observed by callers has unique ids and finite percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AllocationSet {
    pub(crate) entries: Vec<Allocation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsRecord {
    pub expected: f64,
    pub actual: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeatRate {
    pub beat_count: usize,
    pub total: usize,
    pub rate_percent: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum PegRating {
    #[serde(rename = "Potentially Undervalued")]
    PotentiallyUndervalued,
    #[serde(rename = "Fairly Valued")]
    FairlyValued,
    #[serde(rename = "Potentially Overvalued")]
    PotentiallyOvervalued,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnProfile {
    pub return_percent: f64,
    #[serde(default)]
    pub dividend_yield: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalComparison {
    pub subject_value: f64,
    pub benchmark_value: f64,
    pub difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub ticker: String,
    pub name: String,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub key: String,
    #[serde(default)]
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScreenQuery {
    pub search: Option<String>,
    pub minimums: BTreeMap<String, f64>,
    pub sort: Option<SortSpec>,
}
