//! Rank and direction of movement between two years: the neighbor-set LIMA
//! map and the rose diagram.

use compute::{LocalNeighborTau, Rose, SpatialTau, WeightsTransform};
use foundation::Year;
use panel::{Panel, Variable};
use runtime::Resolved;
use serde_json::json;

use crate::error::ChartResult;
use crate::figure::{Figure, require};
use crate::outlines::{map_layout, outline_of, outline_trace};
use crate::symbology::{OutlineStyle, Palette};
use crate::ChartOptions;

fn pcr_pair(panel: &Panel, (a, b): (Year, Year)) -> ChartResult<(Vec<f64>, Vec<f64>)> {
    Ok((
        require(panel.column(Variable::Pcr, a), a)?,
        require(panel.column(Variable::Pcr, b), b)?,
    ))
}

fn lima_text(tau: f64, p: Option<f64>) -> String {
    let mut text = if tau.is_nan() {
        "LIMA: n/a".to_string()
    } else {
        format!("LIMA: {tau:.3}")
    };
    if let Some(p) = p.filter(|p| p.is_finite()) {
        text.push_str(&format!("<br>p = {p:.3}"));
    }
    text
}

pub fn lima(panel: &Panel, inputs: &Resolved, options: &ChartOptions) -> ChartResult<Figure> {
    let (a, b) = inputs.lima_years;
    let (x, y) = pcr_pair(panel, (a, b))?;
    let binary = panel.weights().transformed(WeightsTransform::Binary);
    let global = SpatialTau::new(&x, &y, &binary, options.permutations, options.seed)?;
    let local = LocalNeighborTau::new(&x, &y, &binary, options.permutations, options.seed)?;

    let reds = Palette::reds();
    let mut data = Vec::with_capacity(panel.n_states());
    for (i, state) in panel.states().iter().enumerate() {
        let outline = outline_of(state)?;
        let tau = local.tau_ln[i];
        let style = OutlineStyle::filled(reds.sample(tau));
        let text = lima_text(tau, local.p_sim.get(i).copied());
        data.push(outline_trace(&outline, &style, Some(text)));
    }

    let title = format!(
        "<b>Neighbor set LIMA between {a} and {b} (Spatial Kendall's Tau: {:.2})</b>",
        global.tau_spatial
    );
    Ok(Figure::new(data, map_layout(title)))
}

pub fn rose(panel: &Panel, inputs: &Resolved) -> ChartResult<Figure> {
    let (a, b) = inputs.rose_years;
    let k = inputs.rose_k;
    let (initial, last) = pcr_pair(panel, (a, b))?;
    let rose = Rose::new(&initial, &last, panel.weights(), k)?;

    let data = vec![
        json!({
            "type": "scatterpolargl",
            "r": rose.r,
            "theta": rose.theta_degrees(),
            "mode": "markers",
            "marker": { "color": "peru" },
            "subplot": "polar",
        }),
        json!({
            "type": "barpolar",
            "r": rose.counts,
            "theta": rose.sector_centres_degrees(),
            "width": 360.0 / k as f64,
            "marker": { "color": "peru" },
            "subplot": "polar2",
        }),
    ];
    let layout = json!({
        "title": format!("<b>Rose for {a} and {b} (k = {k})</b>"),
        "showlegend": false,
        "polar": { "domain": { "x": [0.0, 0.46] } },
        "polar2": { "domain": { "x": [0.54, 1.0] } },
    });
    Ok(Figure::new(data, layout))
}

#[cfg(test)]
mod tests {
    use super::{lima, lima_text, rose};
    use crate::ChartOptions;
    use foundation::Year;
    use panel::fixtures;
    use pretty_assertions::assert_eq;
    use runtime::{ControlState, Interactions, Resolved};

    fn options() -> ChartOptions {
        ChartOptions {
            permutations: 19,
            ..ChartOptions::default()
        }
    }

    #[test]
    fn lima_text_formats() {
        assert_eq!(lima_text(0.5, None), "LIMA: 0.500");
        assert_eq!(lima_text(0.5, Some(0.05)), "LIMA: 0.500<br>p = 0.050");
        assert_eq!(lima_text(f64::NAN, Some(f64::NAN)), "LIMA: n/a");
    }

    #[test]
    fn lima_fills_every_state() {
        let panel = fixtures::sample_panel().unwrap();
        let controls = ControlState::initial(panel.span());
        let r = Resolved::new(&panel, &controls, &Interactions::default());
        let fig = lima(&panel, &r, &options()).unwrap();
        assert_eq!(fig.data.len(), 48);
        for trace in &fig.data {
            let fill = trace["fillcolor"].as_str().unwrap();
            assert!(fill.starts_with('#') && fill.len() == 7, "{fill}");
            assert!(trace["text"].as_str().unwrap().starts_with("LIMA: "));
        }
        assert!(
            fig.title()
                .unwrap()
                .starts_with("<b>Neighbor set LIMA between 1929 and 1948")
        );
    }

    #[test]
    fn lima_is_deterministic() {
        let panel = fixtures::sample_panel().unwrap();
        let controls = ControlState::initial(panel.span());
        let r = Resolved::new(&panel, &controls, &Interactions::default());
        assert_eq!(
            lima(&panel, &r, &options()).unwrap(),
            lima(&panel, &r, &options()).unwrap()
        );
    }

    #[test]
    fn rose_counts_cover_every_state() {
        let panel = fixtures::sample_panel().unwrap();
        let mut controls = ControlState::initial(panel.span());
        controls.rose_years = (Year(1930), Year(1940));
        controls.rose_k = 8;
        let r = Resolved::new(&panel, &controls, &Interactions::default());
        let fig = rose(&panel, &r).unwrap();
        assert_eq!(fig.data[0]["r"].as_array().unwrap().len(), 48);
        let counts = fig.data[1]["r"].as_array().unwrap();
        assert_eq!(counts.len(), 8);
        let total: u64 = counts.iter().map(|c| c.as_u64().unwrap()).sum();
        assert_eq!(total, 48);
        assert_eq!(fig.title(), Some("<b>Rose for 1930 and 1940 (k = 8)</b>"));
    }
}
