use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use stockview_core::chart::{stored_chart, ChartSpec};
use stockview_core::series::SeriesRecord;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Deserialize)]
struct RangeQuery {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

async fn list_series(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<String>>> {
    let symbols = state.series_store.list_symbols()?;
    Ok(Json(symbols))
}

async fn get_series(
    Path(symbol): Path<String>,
    Query(range): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<SeriesRecord>>> {
    let symbol = symbol.trim().to_uppercase();
    let records = state
        .series_store
        .load_series(&symbol, range.start, range.end)?;
    Ok(Json(records))
}

/// Chart of everything stored for one key, e.g. `AAPL` or `RELIANCE.NS`.
async fn get_series_chart(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ChartSpec>> {
    let symbol = symbol.trim().to_uppercase();
    let records = state.series_store.load_series(&symbol, None, None)?;
    if records.is_empty() {
        return Err(ApiError::NotFound(format!("No stored data for {}", symbol)));
    }
    Ok(Json(stored_chart(&symbol, &records)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/series", get(list_series))
        .route("/series/{symbol}", get(get_series))
        .route("/series/{symbol}/chart", get(get_series_chart))
}
