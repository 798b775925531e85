//! Seismic simulator HTTP server

use axum::{
    extract::Json,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use log::{info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

use seismic_response::ground_motion;
use seismic_response::prelude::*;

const DEFAULT_PORT: u16 = 8087;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct GroundMotionRequest {
    #[serde(default)]
    params: SimulationParameters,
    #[serde(default)]
    config: Option<SimulationConfig>,
    /// Overrides `config.seed`
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SimulateRequest {
    #[serde(default)]
    params: SimulationParameters,
    #[serde(default)]
    config: Option<SimulationConfig>,
    #[serde(default)]
    frame_dt: Option<f64>,
    #[serde(default)]
    speed: Option<f64>,
    /// Attach an SVG data URL of the final frame
    #[serde(default)]
    screenshot: bool,
}

#[derive(Debug, Serialize)]
struct SimulationResults {
    summary: RunSummary,
    calculated: CalculatedValues,
    #[serde(skip_serializing_if = "Option::is_none")]
    screenshot: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<T>,
}

fn respond<T: Serialize>(result: Result<T, String>) -> (StatusCode, Json<ApiResponse<T>>) {
    match result {
        Ok(results) => (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                error: None,
                results: Some(results),
            }),
        ),
        Err(e) => {
            warn!("request failed: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse {
                    success: false,
                    error: Some(e),
                    results: None,
                }),
            )
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn ground_motion_handler(Json(request): Json<GroundMotionRequest>) -> impl IntoResponse {
    let result = tokio::task::spawn_blocking(move || run_ground_motion(request))
        .await
        .map_err(|e| format!("worker failed: {}", e))
        .and_then(|r| r.map_err(|e| e.to_string()));
    respond(result)
}

async fn simulate_handler(Json(request): Json<SimulateRequest>) -> impl IntoResponse {
    let result = tokio::task::spawn_blocking(move || run_simulation(request))
        .await
        .map_err(|e| format!("worker failed: {}", e))
        .and_then(|r| r.map_err(|e| e.to_string()));
    respond(result)
}

fn run_ground_motion(request: GroundMotionRequest) -> SeismicResult<TimeHistory> {
    request.params.validate()?;
    let config = request.config.unwrap_or_default().sanitized();
    let seed = request.seed.unwrap_or(config.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Ok(ground_motion::generate(&request.params, &config, &mut rng))
}

fn run_simulation(request: SimulateRequest) -> SeismicResult<SimulationResults> {
    request.params.validate()?;
    let config = request.config.unwrap_or_default();
    let frame_dt = request.frame_dt.unwrap_or(config.frame_dt);

    let mut driver = AnimationDriver::new(request.params, config);
    if let Some(speed) = request.speed {
        driver.set_speed(speed);
    }
    let summary = driver.run_to_completion(frame_dt);
    info!(
        "simulated M{:.1} {} km {}: collapsed={} frames={}",
        summary.params.magnitude,
        summary.params.distance_km,
        summary.params.material,
        summary.collapsed,
        summary.frames
    );

    let screenshot = if request.screenshot {
        Some(driver.screenshot()?)
    } else {
        None
    };
    Ok(SimulationResults {
        summary,
        calculated: driver.calculated_values(),
        screenshot,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/v1/ground-motion", post(ground_motion_handler))
        .route("/api/v1/simulate", post(simulate_handler))
        .layer(cors);

    let port = std::env::var("SEISMIC_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("Seismic Simulator Server listening on http://{}", addr);
    println!("  Health check:  GET  /health");
    println!("  Ground motion: POST /api/v1/ground-motion");
    println!("  Simulation:    POST /api/v1/simulate");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
