use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde::Serialize;
use stockview_market_data::{Market, Period};

use crate::main_lib::AppState;

#[derive(Serialize)]
struct OptionItem {
    value: &'static str,
    label: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OptionsResponse {
    markets: Vec<OptionItem>,
    periods: Vec<OptionItem>,
    default_market: Market,
    default_period: Period,
}

/// Selectable markets and periods for the chart form.
async fn get_options() -> Json<OptionsResponse> {
    Json(OptionsResponse {
        markets: Market::ALL
            .iter()
            .map(|m| OptionItem {
                value: m.code(),
                label: m.label(),
            })
            .collect(),
        periods: Period::ALL
            .iter()
            .map(|p| OptionItem {
                value: p.as_range(),
                label: p.label(),
            })
            .collect(),
        default_market: Market::default(),
        default_period: Period::default(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/options", get(get_options))
}
