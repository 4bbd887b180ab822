//! Presentation: batch results to chart specifications.

mod model;

pub use model::{Axis, ChartLayout, ChartMeta, ChartSpec, LineTrace, Title};

use stockview_market_data::PricePoint;

use crate::batch::{presentation_labels, BatchResult, RunOutcome};
use crate::series::SeriesRecord;
use model::{HOVER_MODE, TEMPLATE};

fn axis(text: impl Into<String>) -> Option<Axis> {
    Some(Axis {
        title: Title { text: text.into() },
    })
}

fn close_trace<'a>(name: String, points: impl Iterator<Item = &'a PricePoint>) -> LineTrace {
    let (x, y) = points
        .map(|p| (p.calendar_date().to_string(), p.close))
        .unzip();
    LineTrace::new(name, x, y)
}

/// One close-price line per stored symbol, labelled for the batch's market.
pub fn build_chart(result: &BatchResult) -> ChartSpec {
    let market = result.market;
    let labels = presentation_labels(market);

    let data: Vec<LineTrace> = result
        .plotted()
        .map(|(entry, points)| {
            close_trace(format!("{} ({})", entry.symbol, market), points.iter())
        })
        .collect();

    let mut warnings = result.failures();
    if data.is_empty() {
        warnings.push("No data available for the requested symbols".to_string());
    }

    ChartSpec {
        data,
        layout: ChartLayout {
            title: Title {
                text: format!("{} Over Time", market.chart_heading()),
            },
            xaxis: axis("Date"),
            yaxis: axis(format!("Price ({})", labels.currency)),
            hovermode: Some(HOVER_MODE),
            template: TEMPLATE,
        },
        meta: ChartMeta {
            error: false,
            warnings,
        },
    }
}

/// Chart with no traces whose title carries `message`.
pub fn error_chart(message: &str) -> ChartSpec {
    ChartSpec {
        data: Vec::new(),
        layout: ChartLayout {
            title: Title {
                text: format!("Error: {}", message),
            },
            xaxis: None,
            yaxis: None,
            hovermode: None,
            template: TEMPLATE,
        },
        meta: ChartMeta {
            error: true,
            warnings: Vec::new(),
        },
    }
}

/// Close prices of previously stored records for one symbol.
pub fn stored_chart(symbol: &str, records: &[SeriesRecord]) -> ChartSpec {
    ChartSpec {
        data: vec![close_trace(
            "Close Price".to_string(),
            records.iter().map(|r| &r.data),
        )],
        layout: ChartLayout {
            title: Title {
                text: format!("{} Stock Price Over Time", symbol),
            },
            xaxis: axis("Date"),
            yaxis: axis("Price"),
            hovermode: Some(HOVER_MODE),
            template: TEMPLATE,
        },
        meta: ChartMeta::default(),
    }
}

/// Chart for a trigger. `None` means keep the previous chart.
pub fn render(outcome: &RunOutcome) -> Option<ChartSpec> {
    match outcome {
        RunOutcome::NothingToDo => None,
        RunOutcome::Completed(result) => Some(build_chart(result)),
        RunOutcome::Failed { message } => Some(error_chart(message)),
    }
}
