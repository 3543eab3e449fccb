mod allocation;
mod drawdown;
mod error;
mod growth;
mod ratios;
mod screener;
mod types;

pub use allocation::{
    RebalanceBranch, Rebalanced, SharedAllocations, rebalance, weighted_aggregate,
};
pub use drawdown::{compute_max_drawdown, recovery_outlook, volatility_level};
pub use error::{MAX_PROJECTION_YEARS, MetricsError, Result};
pub use growth::{
    goal_progress, months_in, project_annuity, project_dividend_reinvestment, project_scenarios,
    round_currency, total_return_percent,
};
pub use ratios::{
    beat_rate, compare_terminal_values, is_beat, peg_rating, peg_ratio, surprise_percent,
    terminal_value,
};
pub use screener::screen;
pub use types::{
    ALLOCATION_TOLERANCE, ALLOCATION_TOTAL, Allocation, AllocationSet, BeatRate, DrawdownResult,
    EarningsRecord, Listing, PegRating, PricePoint, RecoveryOutlook, ReturnProfile, ScenarioCase,
    ScenarioInstrument, ScenarioSeries, ScenarioTriple, ScreenQuery, SortDirection, SortSpec,
    TerminalComparison, VolatilityLevel, YearRecord,
};
