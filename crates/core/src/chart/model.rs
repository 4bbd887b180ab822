use rust_decimal::Decimal;
use serde::Serialize;

pub const TEMPLATE: &str = "plotly_white";
pub const HOVER_MODE: &str = "x unified";

/// Line-chart figure: traces plus layout, in the shape chart front-ends expect.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSpec {
    pub data: Vec<LineTrace>,
    pub layout: ChartLayout,
    #[serde(skip_serializing_if = "ChartMeta::is_empty")]
    pub meta: ChartMeta,
}

impl ChartSpec {
    pub fn is_error(&self) -> bool {
        self.meta.error
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineTrace {
    #[serde(rename = "type")]
    pub trace_type: &'static str,
    pub mode: &'static str,
    pub name: String,
    /// Trade dates, `YYYY-MM-DD`.
    pub x: Vec<String>,
    /// Close prices.
    pub y: Vec<Decimal>,
}

impl LineTrace {
    pub fn new(name: impl Into<String>, x: Vec<String>, y: Vec<Decimal>) -> Self {
        Self {
            trace_type: "scatter",
            mode: "lines+markers",
            name: name.into(),
            x,
            y,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartLayout {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovermode: Option<&'static str>,
    pub template: &'static str,
}

/// Extra information that is not drawn, e.g. symbols that failed.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChartMeta {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ChartMeta {
    pub fn is_empty(&self) -> bool {
        !self.error && self.warnings.is_empty()
    }
}
