//! Plotly figure payloads.

use foundation::Year;
use panel::Panel;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{ChartError, ChartResult};

/// A `{data, layout}` pair handed to `Plotly.react` unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
}

impl Figure {
    pub fn new(data: Vec<Value>, layout: Value) -> Self {
        Self { data, layout }
    }

    pub fn title(&self) -> Option<&str> {
        self.layout.get("title")?.as_str()
    }
}

/// Empty figure carrying `message` in place of the chart.
pub fn error_figure(message: &str) -> Figure {
    let hidden = json!({ "visible": false });
    Figure::new(
        Vec::new(),
        json!({
            "title": "Chart unavailable",
            "xaxis": hidden,
            "yaxis": hidden,
            "annotations": [{
                "text": message,
                "xref": "paper",
                "yref": "paper",
                "x": 0.5,
                "y": 0.5,
                "showarrow": false,
                "font": { "size": 16 },
            }],
        }),
    )
}

pub(crate) fn axis_titles(x: &str, y: &str) -> (Value, Value) {
    (json!({ "title": x }), json!({ "title": y }))
}

pub(crate) fn state_names(panel: &Panel) -> Vec<&str> {
    panel.states().iter().map(|s| s.name.as_str()).collect()
}

pub(crate) fn require<T>(value: Option<T>, year: Year) -> ChartResult<T> {
    value.ok_or(ChartError::MissingYear(year))
}
