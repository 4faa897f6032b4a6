use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{NaiveDateTime, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use stylecast::services::community::DEGRADED_REASONING;
use stylecast::utils::metrics::FeedbackSummary;
use stylecast::utils::validation::validate_recommendation_request;
use stylecast::{init_tracing, AppState, Config};
use stylecast::{FeedbackInput, Recommendation, RecommendationContext, ScoredOutfit, Season, Weather, WeatherCondition};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

const DEFAULT_COMMUNITY_LIMIT: usize = 10;
const DEFAULT_SUMMARY_LIMIT: usize = 50;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct RecommendationBody {
    weather: Weather,
    time: Option<NaiveDateTime>,
    season: Option<Season>,
    region: Option<String>,
}

impl RecommendationBody {
    fn into_context(self) -> RecommendationContext {
        let mut context = RecommendationContext::new(self.weather, self.time.unwrap_or_else(|| Utc::now().naive_utc()));
        context.season = self.season;
        if let Some(region) = self.region {
            context.region = region;
        }
        context
    }
}

#[derive(Debug, Deserialize)]
struct ConditionQuery {
    temperature: f64,
    weather: WeatherCondition,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: String,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message,
        }
    }
}

async fn health_check() -> Json<ApiResponse<HashMap<String, String>>> {
    let mut status = HashMap::new();
    status.insert("status".to_string(), "healthy".to_string());
    status.insert("service".to_string(), "stylecast-recommendation".to_string());
    status.insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());

    Json(ApiResponse::success(status))
}

async fn create_recommendation(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<RecommendationBody>,
) -> (StatusCode, Json<ApiResponse<Recommendation>>) {
    let context = body.into_context();
    if let Err(e) = validate_recommendation_request(&user_id, &context) {
        tracing::warn!("Rejected recommendation request for {}: {}", user_id, e);
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(ApiResponse::error(e.to_string())));
    }

    let recommendation = state
        .recommendation_service
        .generate_recommendation(&user_id, &context)
        .await;

    (StatusCode::OK, Json(ApiResponse::success(recommendation)))
}

async fn submit_feedback(
    State(state): State<AppState>,
    Path((user_id, recommendation_id)): Path<(String, Uuid)>,
    Json(input): Json<FeedbackInput>,
) -> (StatusCode, Json<ApiResponse<bool>>) {
    if state
        .feedback_service
        .process_feedback(&user_id, recommendation_id, input)
        .await
    {
        (StatusCode::OK, Json(ApiResponse::success(true)))
    } else {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error("Feedback was not recorded".to_string())),
        )
    }
}

async fn feedback_summary(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<ApiResponse<FeedbackSummary>>, StatusCode> {
    let limit = params.limit.unwrap_or(DEFAULT_SUMMARY_LIMIT);
    match state.feedback_service.summarize_feedback(&user_id, limit).await {
        Ok(summary) => Ok(Json(ApiResponse::success(summary))),
        Err(e) => {
            tracing::error!("Failed to summarize feedback for {}: {}", user_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn community_response(
    result: stylecast::error::StoreResult<Vec<ScoredOutfit>>,
) -> (StatusCode, Json<ApiResponse<Vec<ScoredOutfit>>>) {
    match result {
        Ok(outfits) => (StatusCode::OK, Json(ApiResponse::success(outfits))),
        Err(e) => {
            tracing::error!("Community query failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::error(DEGRADED_REASONING.to_string())),
            )
        }
    }
}

async fn popular_outfits(
    State(state): State<AppState>,
    Query(params): Query<ConditionQuery>,
) -> (StatusCode, Json<ApiResponse<Vec<ScoredOutfit>>>) {
    let limit = params.limit.unwrap_or(DEFAULT_COMMUNITY_LIMIT);
    community_response(
        state
            .community
            .popular_by_condition(params.temperature, params.weather, limit)
            .await,
    )
}

async fn trending_outfits(
    State(state): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> (StatusCode, Json<ApiResponse<Vec<ScoredOutfit>>>) {
    let limit = params.limit.unwrap_or(DEFAULT_COMMUNITY_LIMIT);
    community_response(state.community.trending(limit).await)
}

async fn similar_user_outfits(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<ConditionQuery>,
) -> (StatusCode, Json<ApiResponse<Vec<ScoredOutfit>>>) {
    let limit = params.limit.unwrap_or(DEFAULT_COMMUNITY_LIMIT);
    community_response(
        state
            .community
            .liked_by_similar_users(&user_id, params.temperature, params.weather, limit)
            .await,
    )
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/recommendations/:user_id", post(create_recommendation))
        .route("/feedback/:user_id/:recommendation_id", post(submit_feedback))
        .route("/users/:user_id/feedback-summary", get(feedback_summary))
        .route("/community/popular", get(popular_outfits))
        .route("/community/trending", get(trending_outfits))
        .route("/community/similar/:user_id", get(similar_user_outfits))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let config = Config::load_or_default(&args.config)?;
    info!("Starting StyleCast recommendation server with config: {:?}", config.server);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers.max(1))
        .enable_all()
        .build()?;

    runtime.block_on(serve(config))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.server.socket_addr()?;
    let state = AppState::new(config).await?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
