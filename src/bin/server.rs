//! DCA simulation server - serves the dashboard's data and simulation API
//!
//! Loads the static JSON dataset once at startup and runs every simulation
//! in-process; the frontend only supplies parameters and renders the result.
//!
//! Run: DATA_DIR=public/data cargo run --release --bin server

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use dca_backtest::data::{load_dataset, Dataset, Meta, PricePoint, SentimentPoint};
use dca_backtest::sim::{run_simulation, SimulationParams, SimulationResult};

// ============================================================================
// State & Config
// ============================================================================

struct AppState {
    dataset: Dataset,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
struct PointsQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
struct PricesResponse {
    points: Vec<PricePoint>,
    count: usize,
}

#[derive(Serialize)]
struct SentimentResponse {
    points: Vec<SentimentPoint>,
    count: usize,
}

/// Request to run a simulation
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulateRequest {
    params: SimulationParams,
    /// Current price from the frontend's real-time feed; defaults to the
    /// dataset's last close when absent
    live_price: Option<f64>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_meta(State(state): State<Arc<AppState>>) -> Json<Meta> {
    Json(state.dataset.meta.clone())
}

async fn get_prices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PointsQuery>,
) -> Json<PricesResponse> {
    let all = &state.dataset.price_points;
    let limit = query.limit.unwrap_or(usize::MAX);
    let start = all.len().saturating_sub(limit);
    let points = all[start..].to_vec();
    let count = points.len();
    Json(PricesResponse { points, count })
}

async fn get_sentiment(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PointsQuery>,
) -> Json<SentimentResponse> {
    let all = &state.dataset.sentiment_points;
    let limit = query.limit.unwrap_or(usize::MAX);
    let start = all.len().saturating_sub(limit);
    let points = all[start..].to_vec();
    let count = points.len();
    Json(SentimentResponse { points, count })
}

async fn simulate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SimulateRequest>,
) -> Result<Json<SimulationResult>, (StatusCode, String)> {
    let start = Instant::now();

    let live_price = req
        .live_price
        .or_else(|| state.dataset.prices.last_close())
        .ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "No live price and no historical closes to fall back on".to_string(),
            )
        })?;

    let result = run_simulation(
        &req.params,
        &state.dataset.prices,
        Some(&state.dataset.sentiment),
        live_price,
    );

    match result {
        Ok(response) => {
            let elapsed = start.elapsed().as_secs_f64() * 1000.0;
            eprintln!(
                "Simulation completed in {:.2}ms ({} buys, {} skips)",
                elapsed,
                response.purchase_count,
                response.skip_counts.total()
            );
            Ok(Json(response))
        }
        Err(e) => {
            eprintln!("Simulation error: {}", e);
            Err((StatusCode::BAD_REQUEST, e))
        }
    }
}

#[tokio::main]
async fn main() {
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "public/data".to_string());

    eprintln!("Data dir: {}", data_dir);

    let dataset = match load_dataset(&PathBuf::from(&data_dir)) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to load dataset: {}", e);
            std::process::exit(1);
        }
    };

    eprintln!(
        "[DATA] {} closes ({} to {}), {} sentiment readings",
        dataset.prices.len(),
        dataset.meta.start,
        dataset.meta.end,
        dataset.sentiment.len()
    );

    let state = Arc::new(AppState { dataset });

    let app = Router::new()
        .route("/meta", get(get_meta))
        .route("/prices", get(get_prices))
        .route("/sentiment", get(get_sentiment))
        .route("/api/simulate", post(simulate))
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3030));
    println!("DCA simulation server on http://{}", addr);
    println!("  GET  /meta           - dataset metadata");
    println!("  GET  /prices         - daily closes (?limit=)");
    println!("  GET  /sentiment      - fear/greed readings (?limit=)");
    println!("  POST /api/simulate   - run a simulation");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
