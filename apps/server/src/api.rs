use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Local;
use oneul_core::{format_summary, DayHistory, PostOutcome};
use oneul_translation::translate_history_cached;
use serde::Deserialize;
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn readyz() -> &'static str {
    "ok"
}

#[derive(Deserialize)]
struct TodayQuery {
    translate: Option<bool>,
}

async fn get_today(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TodayQuery>,
) -> ApiResult<Json<DayHistory>> {
    let history = state.fetcher.fetch_today().await?;

    // Live translation is left to the refresher; requests only read the cache.
    if query.translate.unwrap_or(false) {
        return Ok(Json(translate_history_cached(&state.translator, &history)));
    }
    Ok(Json(history))
}

fn check_cron_secret(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let Some(secret) = &state.cron_secret else {
        return Ok(());
    };
    let expected = format!("Bearer {}", secret);
    let provided = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if provided == Some(expected.as_str()) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized("Unauthorized".to_string()))
    }
}

async fn post_daily_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    check_cron_secret(&state, &headers)?;

    let today = Local::now().date_naive();
    let history = match state.fetcher.fetch_today().await {
        Ok(history) => history,
        Err(e) => {
            tracing::error!("Daily post aborted: {}", e);
            let body = json!({ "success": false, "error": e.to_string() });
            return Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response());
        }
    };

    let content = format_summary(&history, today);
    let outcome: PostOutcome = state.publisher.publish(&content).await;
    tracing::info!("Daily post finished (success: {})", outcome.success);
    Ok(Json(outcome).into_response())
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/history/today", get(get_today))
        .route(
            "/social/post",
            get(post_daily_summary).post(post_daily_summary),
        );

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
