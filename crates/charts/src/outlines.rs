//! State outlines drawn as filled scatter traces on a plain x/y plane.

use panel::{Outline, StateRecord};
use serde_json::{Value, json};

use crate::error::{ChartError, ChartResult};
use crate::symbology::{MAP_BACKGROUND, OutlineStyle};

pub(crate) fn outline_of(state: &StateRecord) -> ChartResult<Outline<'_>> {
    state
        .outline()
        .ok_or_else(|| ChartError::MissingOutline(state.name.clone()))
}

/// Exterior ring of the largest part as a closed, filled polygon.
pub fn outline_trace(outline: &Outline<'_>, style: &OutlineStyle, text: Option<String>) -> Value {
    let xs: Vec<f64> = outline.exterior.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = outline.exterior.iter().map(|p| p.y).collect();
    let mut trace = json!({
        "type": "scatter",
        "showlegend": false,
        "legendgroup": "shapes",
        "line": { "color": style.line_color, "width": style.line_width },
        "x": xs,
        "y": ys,
        // Hides the vertex markers.
        "marker": { "size": 0.01 },
        "fill": "toself",
        "fillcolor": style.fill,
        "hoverinfo": "none",
    });
    if let Some(text) = text {
        trace["hoverinfo"] = json!("text");
        trace["text"] = json!(text);
    }
    trace
}

pub fn centroid_trace(name: &str, outline: &Outline<'_>) -> Value {
    json!({
        "type": "scatter",
        "showlegend": false,
        "legendgroup": "centroids",
        "name": name,
        "marker": { "size": 4, "color": "black" },
        "x": [outline.centroid.x],
        "y": [outline.centroid.y],
        "hoverinfo": "none",
    })
}

/// Layout shared by the outline maps: fixed axes, no grid, box select.
pub fn map_layout(title: String) -> Value {
    let axis = json!({
        "autorange": true,
        "showgrid": false,
        "zeroline": false,
        "fixedrange": true,
    });
    json!({
        "title": title,
        "titlefont": { "size": 24, "family": "Courier New" },
        "hovermode": "closest",
        "paper_bgcolor": MAP_BACKGROUND,
        "plot_bgcolor": MAP_BACKGROUND,
        "xaxis": axis,
        "yaxis": axis,
        "width": 1100,
        "height": 650,
        "dragmode": "select",
    })
}

#[cfg(test)]
mod tests {
    use super::{outline_of, outline_trace};
    use crate::symbology::{OutlineStyle, Rgb};
    use panel::fixtures;

    #[test]
    fn outline_trace_is_closed_and_filled() {
        let panel = fixtures::sample_panel().unwrap();
        let outline = outline_of(&panel.states()[0]).unwrap();
        let trace = outline_trace(
            &outline,
            &OutlineStyle::filled(Rgb([0xfb, 0x6a, 0x4a])),
            Some("LIMA: 0.500".to_string()),
        );
        let xs = trace["x"].as_array().unwrap();
        assert_eq!(xs.len(), 5);
        assert_eq!(xs.first(), xs.last());
        assert_eq!(trace["fillcolor"], "#fb6a4a");
        assert_eq!(trace["hoverinfo"], "text");
    }
}
