//! Exploratory charts of a single cross-section or a single state's series:
//! choropleth, Moran scatter, Moran's I time series, box plot, time path and
//! paired densities.

use compute::{ComputeError, GaussianKde, LinearFit, Statistics, density_grid};
use foundation::Year;
use panel::Panel;
use runtime::{Resolved, ordinal_label};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{ChartError, ChartResult};
use crate::figure::{Figure, axis_titles, require, state_names};
use crate::symbology::{
    BLUES_SCALE, DENSITY_FINAL, DENSITY_INITIAL, FOCUS, GLOBAL_FIT, HIGHLIGHT_SCALE, OTHER,
    SUBSET_EXTENT_FIT, SUBSET_FIT,
};

pub fn choropleth(panel: &Panel, inputs: &Resolved) -> ChartResult<Figure> {
    let year = inputs.year;
    let values = require(panel.column(inputs.variable, year), year)?;
    let ranks = require(panel.rank_column(year), year)?;
    let abbrs: Vec<&str> = panel.states().iter().map(|s| s.abbr.as_str()).collect();
    let names = state_names(panel);

    let mut title = format!("Income of US by State in {year}");
    let mut data = vec![json!({
        "type": "choropleth",
        "colorscale": BLUES_SCALE,
        "autocolorscale": false,
        "locations": abbrs,
        "z": values,
        "locationmode": "USA-states",
        "text": names,
        "marker": { "line": { "color": "rgb(255,255,255)", "width": 1 } },
        "colorbar": {
            "thickness": 10,
            "title": format!("({})", inputs.variable.label()),
        },
    })];

    if let Some(rank) = inputs.spatial_rank {
        if let Some(holder) = ranks.iter().position(|&r| r == rank) {
            title.push_str(&format!(
                "<br>({} {}: {:.2})",
                ordinal_label(rank),
                names[holder],
                values[holder]
            ));
        }
        let highlight: Vec<u8> = ranks.iter().map(|&r| u8::from(r == rank)).collect();
        data.push(json!({
            "type": "choropleth",
            "colorscale": HIGHLIGHT_SCALE,
            "autocolorscale": false,
            "locations": abbrs,
            "z": highlight,
            "showscale": false,
            "locationmode": "USA-states",
            "text": names,
            "marker": {
                "opacity": 0.5,
                "line": { "color": "rgb(255,255,255)", "width": 0 },
            },
        }));
    }

    let layout = json!({
        "title": title,
        "geo": {
            "scope": "usa",
            "projection": { "type": "albers usa" },
            "showlakes": true,
            "lakecolor": "rgb(255, 255, 255)",
        },
    });
    Ok(Figure::new(data, layout))
}

/// Pairs where both coordinates are finite; islands have no lag.
fn finite_pairs(x: &[f64], y: &[f64], subset: impl Iterator<Item = usize>) -> (Vec<f64>, Vec<f64>) {
    subset
        .filter(|&i| x[i].is_finite() && y[i].is_finite())
        .map(|i| (x[i], y[i]))
        .unzip()
}

fn extent(values: &[f64]) -> ChartResult<(f64, f64)> {
    Statistics::min_max(values).ok_or(ChartError::Compute(ComputeError::TooFewObservations {
        required: 1,
        actual: 0,
    }))
}

/// Shrinks `[x0, x1]` so the fitted line stays inside `[y_min, y_max]`.
fn clip_to_range(fit: &LinearFit, (x0, x1): (f64, f64), (y_min, y_max): (f64, f64)) -> (f64, f64) {
    let clip = |x: f64| {
        let y = fit.eval(x);
        let bound = if y > y_max {
            y_max
        } else if y < y_min {
            y_min
        } else {
            return x;
        };
        fit.solve_x(bound).unwrap_or(x)
    };
    (clip(x0), clip(x1))
}

fn line_trace((x0, x1): (f64, f64), fit: &LinearFit, color: &str) -> Value {
    json!({
        "x": [x0, x1],
        "y": [fit.eval(x0), fit.eval(x1)],
        "mode": "lines",
        "line": { "color": color },
        "name": "Reg",
    })
}

pub fn scatter(panel: &Panel, inputs: &Resolved) -> ChartResult<Figure> {
    let year = inputs.year;
    let var = require(panel.column(inputs.variable, year), year)?;
    let lag = require(panel.lag_column(inputs.variable, year), year)?;
    let colors: Vec<&str> = (0..var.len())
        .map(|i| {
            if inputs.focus.states.contains(&i) {
                FOCUS
            } else {
                OTHER
            }
        })
        .collect();

    let (fx, fy) = finite_pairs(&var, &lag, 0..var.len());
    let global = LinearFit::fit(&fx, &fy)?;
    let x_extent = extent(&fx)?;
    let y_extent = extent(&fy)?;

    let mut data = vec![
        json!({
            "x": var,
            "y": lag,
            "mode": "markers",
            "marker": { "size": 10, "color": colors },
            "name": year.label(),
            "text": state_names(panel),
        }),
        line_trace(x_extent, &global, GLOBAL_FIT),
    ];

    if let Some(subset) = &inputs.regression_subset {
        let (sx, sy) = finite_pairs(&var, &lag, subset.iter().copied());
        match LinearFit::fit(&sx, &sy) {
            Ok(fit) => {
                let clipped = clip_to_range(&fit, x_extent, y_extent);
                data.push(line_trace(clipped, &fit, SUBSET_FIT));
                data.push(line_trace(extent(&sx)?, &fit, SUBSET_EXTENT_FIT));
            }
            Err(err) => debug!(%err, states = subset.len(), "no regression for selection"),
        }
    }

    let (xaxis, yaxis) = axis_titles("Original Variable", "Lagged Variable");
    let layout = json!({
        "xaxis": xaxis,
        "yaxis": yaxis,
        "showlegend": false,
        "title": format!("Scatterplot for {year} <br>{} highlighted", inputs.focus.title),
    });
    Ok(Figure::new(data, layout))
}

pub fn timeseries(panel: &Panel, inputs: &Resolved) -> ChartResult<Figure> {
    let years: Vec<i32> = panel.span().iter().map(|y| y.0).collect();
    let moran = require(panel.moran_at(inputs.year), inputs.year)?;
    let data = vec![
        json!({
            "x": years,
            "y": panel.morans(),
            "mode": "lines",
            "name": "Moran's I",
        }),
        json!({
            "x": [inputs.year.0],
            "y": [moran],
            "mode": "markers",
            "marker": { "size": 10 },
            "name": "Moran's I",
            "showlegend": false,
            "hoverinfo": "none",
        }),
    ];
    let (xaxis, yaxis) = axis_titles("Years", "Moran's I");
    Ok(Figure::new(data, json!({ "xaxis": xaxis, "yaxis": yaxis })))
}

pub fn boxplot(panel: &Panel, inputs: &Resolved) -> ChartResult<Figure> {
    let year = inputs.year;
    let values = require(panel.column(inputs.variable, year), year)?;
    let data = vec![json!({
        "type": "box",
        "y": values,
        "name": "Boxplot of the variable",
        "boxpoints": "all",
        "jitter": 0.15,
        "pointpos": 0,
        "line": { "color": "#444" },
        "selected": { "marker": { "color": FOCUS } },
        "unselected": { "marker": { "color": OTHER, "opacity": 1.0 } },
        "selectedpoints": inputs.box_selection,
    })];
    Ok(Figure::new(
        data,
        json!({ "title": format!("Boxplot of the year {year}") }),
    ))
}

pub fn timepath(panel: &Panel, inputs: &Resolved) -> ChartResult<Figure> {
    let state = inputs.clicked;
    let year = inputs.year;
    let t = require(panel.span().index_of(year), year)?;
    let var = panel.series(inputs.variable, state);
    let lag = panel.lag_series(inputs.variable, state);
    let name = &panel.states()[state].name;

    let data = vec![
        json!({
            "x": [var[t]],
            "y": [lag[t]],
            "mode": "markers",
            "marker": { "size": 12 },
            "name": "",
            "text": year.label(),
        }),
        json!({
            "x": var,
            "y": lag,
            "mode": "lines",
            "name": "Path",
            "hoverinfo": "none",
        }),
    ];
    let (xaxis, yaxis) = axis_titles("Original Variable", "Lagged Variable");
    let layout = json!({
        "xaxis": xaxis,
        "yaxis": yaxis,
        "showlegend": false,
        "title": format!("Time-path for {name}<br> Highlighted {year}"),
    });
    Ok(Figure::new(data, layout))
}

/// State whose position the density chart marks: the holder, in the initial
/// year, of the cycling rank or of the clicked state's own rank.
pub fn tracked_state(panel: &Panel, inputs: &Resolved) -> ChartResult<usize> {
    let initial = inputs.density_years.0;
    let rank = match inputs.spatial_rank {
        Some(rank) => rank,
        None => require(panel.observation(inputs.clicked, initial), initial)?.rank,
    };
    panel
        .holder_of_rank(initial, rank)
        .ok_or(ChartError::NoRankHolder {
            rank,
            year: initial,
        })
}

pub fn density(panel: &Panel, inputs: &Resolved, grid_points: usize) -> ChartResult<Figure> {
    let (initial, last) = inputs.density_years;
    let xa = require(panel.column(inputs.variable, initial), initial)?;
    let xb = require(panel.column(inputs.variable, last), last)?;
    let tracked = tracked_state(panel, inputs)?;

    let kde_a = GaussianKde::silverman(&xa)?;
    let kde_b = GaussianKde::silverman(&xb)?;
    let grid = density_grid(&xa, &xb, grid_points).ok_or(ChartError::Compute(
        ComputeError::TooFewObservations {
            required: 1,
            actual: 0,
        },
    ))?;

    let curve = |kde: &GaussianKde, year: Year, color: &str| {
        json!({
            "x": grid,
            "y": kde.evaluate_many(&grid),
            "mode": "lines",
            "fill": "tozeroy",
            "name": year.label(),
            "text": format!("Year of {year}"),
            "line": { "color": color, "width": 3 },
        })
    };
    let marker = |kde: &GaussianKde, value: f64, color: &str| {
        json!({
            "x": [value, value],
            "y": [0.0, kde.evaluate(value)],
            "mode": "lines",
            "showlegend": false,
            "line": { "color": color, "width": 3 },
        })
    };

    let data = vec![
        curve(&kde_a, initial, DENSITY_INITIAL),
        curve(&kde_b, last, DENSITY_FINAL),
        marker(&kde_a, xa[tracked], DENSITY_INITIAL),
        marker(&kde_b, xb[tracked], DENSITY_FINAL),
    ];
    let (xaxis, yaxis) = axis_titles("Original Variable", "Density Estimation");
    let layout = json!({
        "xaxis": xaxis,
        "yaxis": yaxis,
        "title": format!(
            "<b>{}</b> locations in densities for {initial} and {last}",
            panel.states()[tracked].name
        ),
    });
    Ok(Figure::new(data, layout))
}

#[cfg(test)]
mod tests {
    use super::{boxplot, choropleth, clip_to_range, density, scatter, timepath, timeseries, tracked_state};
    use compute::LinearFit;
    use foundation::Year;
    use panel::{Panel, Variable, fixtures};
    use pretty_assertions::assert_eq;
    use runtime::{ControlState, Interactions, Resolved};
    use serde_json::json;

    fn resolved(panel: &Panel, edit: impl FnOnce(&mut ControlState), interactions: Interactions) -> Resolved {
        let mut controls = ControlState::initial(panel.span());
        edit(&mut controls);
        Resolved::new(panel, &controls, &interactions)
    }

    #[test]
    fn raw_choropleth_shows_each_states_income() {
        let panel = fixtures::sample_panel().unwrap();
        let r = resolved(&panel, |c| c.variable = Variable::Raw, Interactions::default());
        let fig = choropleth(&panel, &r).unwrap();
        assert_eq!(fig.data.len(), 1);
        let (table, _) = fixtures::sample_inputs().unwrap();
        let z = fig.data[0]["z"].as_array().unwrap();
        for (state, value) in panel.states().iter().zip(z) {
            assert_eq!(value.as_f64(), table.value(state.fips, Year(1929)));
        }
        assert_eq!(fig.data[0]["locations"][3], "CA");
        assert_eq!(fig.data[0]["colorbar"]["title"], "(Raw)");
        assert_eq!(fig.title(), Some("Income of US by State in 1929"));
    }

    #[test]
    fn spatial_travel_highlights_one_state() {
        let panel = fixtures::sample_panel().unwrap();
        let r = resolved(
            &panel,
            |c| {
                c.spatial_travel = true;
                c.spatial_ticks = 1;
            },
            Interactions::default(),
        );
        assert_eq!(r.spatial_rank, Some(2));
        let fig = choropleth(&panel, &r).unwrap();
        assert_eq!(fig.data.len(), 2);
        let z = fig.data[1]["z"].as_array().unwrap();
        assert_eq!(z.iter().filter(|v| **v == json!(1)).count(), 1);

        let holder = panel.holder_of_rank(Year(1929), 2).unwrap();
        let name = &panel.states()[holder].name;
        let title = fig.title().unwrap();
        assert!(title.contains(&format!("(2nd {name}: ")), "{title}");
    }

    #[test]
    fn scatter_colors_focus_and_adds_subset_lines() {
        let panel = fixtures::sample_panel().unwrap();
        let r = resolved(&panel, |_| {}, Interactions::default());
        let fig = scatter(&panel, &r).unwrap();
        assert_eq!(fig.data.len(), 2);
        let colors = fig.data[0]["marker"]["color"].as_array().unwrap();
        assert_eq!(colors.iter().filter(|c| **c == json!("#FF0066")).count(), 1);
        assert_eq!(colors[3], "#FF0066");
        assert_eq!(fig.title(), Some("Scatterplot for 1929 <br>California highlighted"));

        let selection = Interactions {
            map_selection: Some(vec![0, 1, 8, 9]),
            ..Interactions::default()
        };
        let r = resolved(&panel, |_| {}, selection);
        let fig = scatter(&panel, &r).unwrap();
        assert_eq!(fig.data.len(), 4);
        assert_eq!(fig.data[2]["line"]["color"], "#FF6600");
        assert_eq!(fig.data[3]["line"]["color"], "#FF0000");
        assert!(fig.title().unwrap().ends_with("Multiple States highlighted"));
    }

    #[test]
    fn click_and_single_selection_draw_the_same_scatter() {
        let panel = fixtures::sample_panel().unwrap();
        let click = Interactions {
            map_click: Some(10),
            ..Interactions::default()
        };
        let select = Interactions {
            map_selection: Some(vec![10]),
            ..Interactions::default()
        };
        let a = scatter(&panel, &resolved(&panel, |_| {}, click)).unwrap();
        let b = scatter(&panel, &resolved(&panel, |_| {}, select)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn subset_line_is_clipped_to_lag_range() {
        let fit = LinearFit {
            slope: 2.0,
            intercept: 0.0,
        };
        assert_eq!(clip_to_range(&fit, (0.0, 10.0), (0.0, 10.0)), (0.0, 5.0));
        assert_eq!(clip_to_range(&fit, (-1.0, 1.0), (0.0, 10.0)), (0.0, 1.0));
    }

    #[test]
    fn timeseries_marks_hovered_year() {
        let panel = fixtures::sample_panel().unwrap();
        let hover = Interactions {
            moran_hover: Some(Year(1940)),
            ..Interactions::default()
        };
        let fig = timeseries(&panel, &resolved(&panel, |_| {}, hover)).unwrap();
        assert_eq!(fig.data[0]["x"].as_array().unwrap().len(), panel.span().len());
        assert_eq!(fig.data[1]["x"], json!([1940]));
    }

    #[test]
    fn boxplot_selects_scatter_points() {
        let panel = fixtures::sample_panel().unwrap();
        let selection = Interactions {
            map_selection: Some(vec![1, 2]),
            scatter_selection: Some(vec![5]),
            ..Interactions::default()
        };
        let fig = boxplot(&panel, &resolved(&panel, |_| {}, selection)).unwrap();
        assert_eq!(fig.data[0]["selectedpoints"], json!([5]));
        assert_eq!(fig.title(), Some("Boxplot of the year 1929"));
    }

    #[test]
    fn timepath_follows_clicked_state() {
        let panel = fixtures::sample_panel().unwrap();
        let click = Interactions {
            map_click: Some(0),
            ..Interactions::default()
        };
        let fig = timepath(&panel, &resolved(&panel, |c| c.year = Year(1931), click)).unwrap();
        assert_eq!(fig.data[1]["x"].as_array().unwrap().len(), panel.span().len());
        assert_eq!(fig.data[0]["x"][0], fig.data[1]["x"][2]);
        assert_eq!(fig.title(), Some("Time-path for Alabama<br> Highlighted 1931"));
    }

    #[test]
    fn density_tracks_clicked_state_or_cycling_rank() {
        let panel = fixtures::sample_panel().unwrap();
        let r = resolved(&panel, |_| {}, Interactions::default());
        assert_eq!(tracked_state(&panel, &r).unwrap(), 3);

        let r = resolved(
            &panel,
            |c| {
                c.spatial_travel = true;
                c.spatial_ticks = 0;
            },
            Interactions::default(),
        );
        let lowest = panel.holder_of_rank(Year(1929), 1).unwrap();
        assert_eq!(tracked_state(&panel, &r).unwrap(), lowest);
    }

    #[test]
    fn density_curves_share_a_grid() {
        let panel = fixtures::sample_panel().unwrap();
        let r = resolved(&panel, |_| {}, Interactions::default());
        let fig = density(&panel, &r, 200).unwrap();
        assert_eq!(fig.data.len(), 4);
        assert_eq!(fig.data[0]["x"], fig.data[1]["x"]);
        assert_eq!(fig.data[0]["x"].as_array().unwrap().len(), 200);
        assert_eq!(fig.data[2]["y"][0], json!(0.0));
        assert!(fig.data[2]["y"][1].as_f64().unwrap() > 0.0);
        assert_eq!(
            fig.title(),
            Some("<b>California</b> locations in densities for 1929 and 1948")
        );
    }
}
