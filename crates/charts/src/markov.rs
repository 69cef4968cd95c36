//! Pooled and lag-conditioned Markov transition heatmaps of PCR classes.

use compute::{Matrix, MobilityIndices, SpatialMarkov};
use panel::{Panel, Variable};
use runtime::Resolved;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::ChartResult;
use crate::figure::Figure;

pub const SUBPLOT_COLUMNS: usize = 3;
const SUBPLOT_GAP: f64 = 0.08;

fn chain(panel: &Panel, inputs: &Resolved) -> ChartResult<SpatialMarkov> {
    let wide = panel.wide(Variable::Pcr);
    Ok(SpatialMarkov::new(
        &wide,
        panel.weights(),
        inputs.markov_classes,
        inputs.markov_lag_classes,
    )?)
}

/// `a, b, c, ...` for the destination axis.
fn lower_labels(k: usize) -> Vec<String> {
    (b'a'..=b'z').take(k).map(|c| (c as char).to_string()).collect()
}

/// `..., C, B, A` for the origin axis, top row first.
fn upper_labels_reversed(k: usize) -> Vec<String> {
    let mut labels: Vec<String> = (b'A'..=b'Z').take(k).map(|c| (c as char).to_string()).collect();
    labels.reverse();
    labels
}

fn reversed_rows(p: &Matrix) -> Matrix {
    p.iter().rev().cloned().collect()
}

fn format_index(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "n/a".to_string(),
    }
}

pub fn markov_pooled(panel: &Panel, inputs: &Resolved) -> ChartResult<Figure> {
    let sm = chain(panel, inputs)?;
    let indices = match MobilityIndices::of(&sm.p) {
        Ok(indices) => Some(indices),
        Err(err) => {
            debug!(%err, k = sm.k, "mobility indices undefined");
            None
        }
    };

    let data = vec![json!({
        "type": "heatmap",
        "x": lower_labels(sm.k),
        "y": upper_labels_reversed(sm.k),
        "z": reversed_rows(&sm.p),
    })];
    let title = format!(
        "<b>Pooled Markov transition probability matrix</b> <br>Shorrock 1's: {}, Shorrock 2's: {}, Sommers and Conlisk's: {}</br>",
        format_index(indices.map(|m| m.shorrock_p)),
        format_index(indices.map(|m| m.shorrock_d)),
        format_index(indices.map(|m| m.sommers_conlisk)),
    );
    let layout = json!({
        "title": title,
        "titlefont": { "size": 24, "family": "Arial" },
    });
    Ok(Figure::new(data, layout))
}

/// `(start, end)` of cell `i` when `[0, 1]` is split into `n` cells with a
/// fixed gap between neighbours.
fn domain(i: usize, n: usize) -> (f64, f64) {
    let n = n.max(1) as f64;
    let width = (1.0 - SUBPLOT_GAP * (n - 1.0)) / n;
    let start = i as f64 * (width + SUBPLOT_GAP);
    (start, start + width)
}

fn axis_suffix(i: usize) -> String {
    if i == 0 { String::new() } else { (i + 1).to_string() }
}

pub fn markov_spatial(panel: &Panel, inputs: &Resolved) -> ChartResult<Figure> {
    let sm = chain(panel, inputs)?;
    let rows = sm.m.div_ceil(SUBPLOT_COLUMNS);

    let mut data = Vec::with_capacity(sm.m);
    let mut layout = Map::new();
    let mut annotations = Vec::with_capacity(sm.m);
    for (i, p) in sm.conditional.iter().enumerate() {
        let (row, col) = (i / SUBPLOT_COLUMNS, i % SUBPLOT_COLUMNS);
        let suffix = axis_suffix(i);
        let x_domain = domain(col, SUBPLOT_COLUMNS);
        // Rows are laid out top to bottom.
        let (y0, y1) = domain(rows - 1 - row, rows);

        data.push(json!({
            "type": "heatmap",
            "name": format!("Spatial Lag {i}"),
            "x": lower_labels(sm.k),
            "y": upper_labels_reversed(sm.k),
            "z": reversed_rows(p),
            "zmin": 0.0,
            "zmax": 1.0,
            "showscale": i == 0,
            "xaxis": format!("x{suffix}"),
            "yaxis": format!("y{suffix}"),
        }));
        layout.insert(
            format!("xaxis{suffix}"),
            json!({ "domain": [x_domain.0, x_domain.1], "anchor": format!("y{suffix}") }),
        );
        layout.insert(
            format!("yaxis{suffix}"),
            json!({ "domain": [y0, y1], "anchor": format!("x{suffix}") }),
        );
        annotations.push(json!({
            "text": format!("Spatial Lag {i}"),
            "x": (x_domain.0 + x_domain.1) / 2.0,
            "y": y1,
            "xref": "paper",
            "yref": "paper",
            "xanchor": "center",
            "yanchor": "bottom",
            "showarrow": false,
        }));
    }
    layout.insert("annotations".to_string(), Value::Array(annotations));
    layout.insert("title".to_string(), json!("<b>Spatial Lags Subplots</b>"));
    layout.insert(
        "titlefont".to_string(),
        json!({ "size": 18, "family": "Arial" }),
    );
    Ok(Figure::new(data, Value::Object(layout)))
}
