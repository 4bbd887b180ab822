use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use stockview_core::chart::{error_chart, render};
use stockview_market_data::{Market, Period};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Deserialize)]
struct ChartRequest {
    #[serde(default)]
    symbols: String,
    period: Option<String>,
    market: Option<String>,
}

/// Run one batch and answer with its chart.
///
/// A blank symbol list is 204 so the caller keeps whatever it showed before.
/// A run that outlasts the chart budget answers with an error chart.
async fn create_chart(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChartRequest>,
) -> ApiResult<Response> {
    let period = match request.period.as_deref() {
        None => Period::default(),
        Some(code) => code
            .parse::<Period>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
    };
    let market = request
        .market
        .as_deref()
        .map(Market::from_code)
        .unwrap_or_default();

    let run = state.orchestrator.run(&request.symbols, period, market);
    let outcome = match tokio::time::timeout(state.chart_timeout, run).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(
                "Chart run for {:?} exceeded {:?}",
                request.symbols,
                state.chart_timeout
            );
            let message = format!("Timed out after {:?} fetching market data", state.chart_timeout);
            return Ok(Json(error_chart(&message)).into_response());
        }
    };

    Ok(match render(&outcome) {
        Some(chart) => Json(chart).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/charts", post(create_chart))
}
