use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    Allocation, AllocationSet, BeatRate, DrawdownResult, EarningsRecord, Listing, MetricsError,
    PegRating, PricePoint, RecoveryOutlook, ReturnProfile, ScenarioInstrument,
    ScenarioSeries, ScreenQuery, SharedAllocations, TerminalComparison, VolatilityLevel,
    YearRecord, beat_rate, compare_terminal_values, compute_max_drawdown, goal_progress, months_in,
    peg_rating, peg_ratio, project_annuity, project_dividend_reinvestment, project_scenarios,
    recovery_outlook, round_currency, screen, surprise_percent, total_return_percent,
    volatility_level, weighted_aggregate,
};

mod cli;

pub use cli::{Cli, Command, parse_allocation, run_command};

pub const DEFAULT_GOAL_TARGET: f64 = 1_000_000.0;
const DEFAULT_PRINCIPAL: f64 = 1_000.0;
const DEFAULT_HORIZON_YEARS: f64 = 5.0;

#[derive(Clone, Debug)]
pub struct AppState {
    allocations: Arc<SharedAllocations>,
}

impl AppState {
    pub fn new(allocations: AllocationSet) -> Self {
        Self {
            allocations: Arc::new(SharedAllocations::new(allocations)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnuityPayload {
    pub monthly_contribution: f64,
    pub years: u32,
    pub annual_rate: f64,
    pub target: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnuityResponse {
    pub future_value: f64,
    pub rounded_future_value: f64,
    pub months: u64,
    pub goal_target: f64,
    pub goal_progress_percent: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendPayload {
    pub initial_investment: f64,
    pub current_yield: f64,
    pub growth_rate: f64,
    pub years: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendResponse {
    pub records: Vec<YearRecord>,
    pub total_return_percent: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioPayload {
    #[serde(default)]
    instruments: Vec<ScenarioInstrument>,
    invested_amount: f64,
    time_range_years: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioResponse {
    months: u64,
    series: Vec<ScenarioSeries>,
}

#[derive(Debug, Deserialize)]
struct DrawdownPayload {
    prices: Vec<PricePoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DrawdownResponse {
    #[serde(flatten)]
    result: DrawdownResult,
    volatility: VolatilityLevel,
    recovery: RecoveryOutlook,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PegPayload {
    pub pe: f64,
    pub growth_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct PegResponse {
    pub peg: f64,
    pub rating: PegRating,
}

#[derive(Debug, Deserialize)]
struct EarningsPayload {
    records: Vec<EarningsRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EarningsResponse {
    #[serde(flatten)]
    beat_rate: BeatRate,
    surprise_percent: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComparePayload {
    principal: Option<f64>,
    subject: ReturnProfile,
    benchmark: ReturnProfile,
    horizon_years: Option<f64>,
    reinvest_dividends: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct AllocationUpdate {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct AggregatePayload {
    metrics: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize)]
struct AggregateResponse {
    aggregate: f64,
    allocations: AllocationSet,
}

#[derive(Debug, Deserialize)]
struct ScreenPayload {
    listings: Vec<Listing>,
    #[serde(default)]
    query: ScreenQuery,
}

#[derive(Debug, Serialize)]
struct ScreenResponse {
    listings: Vec<Listing>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/annuity",
            get(annuity_get_handler).post(annuity_post_handler),
        )
        .route("/api/dividends", post(dividends_handler))
        .route("/api/scenarios", post(scenarios_handler))
        .route("/api/drawdown", post(drawdown_handler))
        .route("/api/peg", get(peg_get_handler).post(peg_post_handler))
        .route("/api/earnings", post(earnings_handler))
        .route("/api/compare", post(compare_handler))
        .route(
            "/api/allocations",
            get(allocations_get_handler).put(allocations_put_handler),
        )
        .route("/api/allocations/:id", post(set_allocation_handler))
        .route("/api/aggregate", post(aggregate_handler))
        .route("/api/screen", post(screen_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(host: IpAddr, port: u16, state: AppState) -> std::io::Result<()> {
    let addr = SocketAddr::new(host, port);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "finsight HTTP API listening");

    axum::serve(listener, router(state)).await
}

pub fn annuity_response(payload: &AnnuityPayload) -> Result<AnnuityResponse, MetricsError> {
    let future_value = project_annuity(
        payload.monthly_contribution,
        payload.years,
        payload.annual_rate,
    )?;
    let goal_target = payload.target.unwrap_or(DEFAULT_GOAL_TARGET);
    let rounded_future_value = round_currency(future_value);
    Ok(AnnuityResponse {
        future_value,
        rounded_future_value,
        months: months_in(payload.years),
        goal_target,
        goal_progress_percent: goal_progress(rounded_future_value, goal_target)?,
    })
}

pub fn dividend_response(payload: &DividendPayload) -> Result<DividendResponse, MetricsError> {
    let records = project_dividend_reinvestment(
        payload.initial_investment,
        payload.current_yield,
        payload.growth_rate,
        payload.years,
    )?;
    let total_return_percent = total_return_percent(&records);
    Ok(DividendResponse {
        records,
        total_return_percent,
    })
}

pub fn peg_response(payload: &PegPayload) -> PegResponse {
    let peg = peg_ratio(payload.pe, payload.growth_rate);
    PegResponse {
        peg,
        rating: peg_rating(peg),
    }
}

fn scenario_response(payload: &ScenarioPayload) -> Result<ScenarioResponse, MetricsError> {
    let series = project_scenarios(
        &payload.instruments,
        payload.invested_amount,
        payload.time_range_years,
    )?;
    Ok(ScenarioResponse {
        months: months_in(payload.time_range_years),
        series,
    })
}

fn drawdown_response(payload: &DrawdownPayload) -> Result<DrawdownResponse, MetricsError> {
    let result = compute_max_drawdown(&payload.prices)?;
    Ok(DrawdownResponse {
        volatility: volatility_level(result.max_drawdown),
        recovery: recovery_outlook(result.max_drawdown),
        result,
    })
}

fn earnings_response(payload: &EarningsPayload) -> Result<EarningsResponse, MetricsError> {
    let beat_rate = beat_rate(&payload.records)?;
    Ok(EarningsResponse {
        beat_rate,
        surprise_percent: payload.records.iter().map(surprise_percent).collect(),
    })
}

fn compare_response(payload: &ComparePayload) -> Result<TerminalComparison, MetricsError> {
    compare_terminal_values(
        payload.principal.unwrap_or(DEFAULT_PRINCIPAL),
        &payload.subject,
        &payload.benchmark,
        payload.horizon_years.unwrap_or(DEFAULT_HORIZON_YEARS),
        payload.reinvest_dividends.unwrap_or(true),
    )
}

async fn annuity_get_handler(Query(payload): Query<AnnuityPayload>) -> Response {
    respond(annuity_response(&payload))
}

async fn annuity_post_handler(Json(payload): Json<AnnuityPayload>) -> Response {
    respond(annuity_response(&payload))
}

async fn dividends_handler(Json(payload): Json<DividendPayload>) -> Response {
    respond(dividend_response(&payload))
}

async fn scenarios_handler(Json(payload): Json<ScenarioPayload>) -> Response {
    respond(scenario_response(&payload))
}

async fn drawdown_handler(Json(payload): Json<DrawdownPayload>) -> Response {
    respond(drawdown_response(&payload))
}

async fn peg_get_handler(Query(payload): Query<PegPayload>) -> Response {
    json_response(StatusCode::OK, peg_response(&payload))
}

async fn peg_post_handler(Json(payload): Json<PegPayload>) -> Response {
    json_response(StatusCode::OK, peg_response(&payload))
}

async fn earnings_handler(Json(payload): Json<EarningsPayload>) -> Response {
    respond(earnings_response(&payload))
}

async fn compare_handler(Json(payload): Json<ComparePayload>) -> Response {
    respond(compare_response(&payload))
}

async fn allocations_get_handler(State(state): State<AppState>) -> Response {
    json_response(StatusCode::OK, state.allocations.snapshot())
}

async fn allocations_put_handler(
    State(state): State<AppState>,
    Json(entries): Json<Vec<Allocation>>,
) -> Response {
    respond(AllocationSet::new(entries).map(|set| {
        state.allocations.replace(set.clone());
        set
    }))
}

async fn set_allocation_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<AllocationUpdate>,
) -> Response {
    respond(state.allocations.set_allocation(&id, update.value))
}

async fn aggregate_handler(
    State(state): State<AppState>,
    Json(payload): Json<AggregatePayload>,
) -> Response {
    let allocations = state.allocations.snapshot();
    respond(
        weighted_aggregate(&allocations, &payload.metrics).map(|aggregate| {
            AggregateResponse {
                aggregate,
                allocations,
            }
        }),
    )
}

async fn screen_handler(Json(payload): Json<ScreenPayload>) -> Response {
    json_response(
        StatusCode::OK,
        ScreenResponse {
            listings: screen(&payload.listings, &payload.query),
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn respond<T: Serialize>(result: Result<T, MetricsError>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(e) => {
            warn!(error = %e, "rejected request");
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
