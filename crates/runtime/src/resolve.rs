//! Precedence rules that turn controls plus chart interactions into the
//! concrete inputs of each chart.
//!
//! Rules, highest priority first:
//! - year: Moran's I hover (when inside the span), then the clamped slider;
//! - focus states: a non-empty map selection, then a map click, then
//!   `California`;
//! - time path / density state: a map click, then `California`;
//! - regression subset: a scatter selection of two or more points, then a map
//!   selection of two or more points;
//! - box plot highlight: a non-empty scatter selection, then the map
//!   selection.

use foundation::{Year, YearSpan};
use panel::{Panel, Variable};

use crate::animation::spatial_rank;
use crate::controls::{ControlState, Interactions};

pub const DEFAULT_STATE: &str = "California";
pub const MULTIPLE_STATES: &str = "Multiple States";

pub fn resolve_year(span: YearSpan, slider: Year, hover: Option<Year>) -> Year {
    match hover {
        Some(year) if span.contains(year) => year,
        _ => span.clamp(slider),
    }
}

/// Index of the default state, or the first state when it is absent.
pub fn default_state(panel: &Panel) -> usize {
    panel.state_index(DEFAULT_STATE).unwrap_or(0)
}

/// In-range indices without repeats, in their original order.
fn valid_indices(indices: &[usize], n: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(indices.len());
    for &i in indices {
        if i < n && !out.contains(&i) {
            out.push(i);
        }
    }
    out
}

fn non_empty(selection: Option<&[usize]>, n: usize) -> Option<Vec<usize>> {
    selection
        .map(|s| valid_indices(s, n))
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Focus {
    pub states: Vec<usize>,
    pub title: String,
}

pub fn resolve_clicked(panel: &Panel, click: Option<usize>) -> usize {
    click
        .filter(|&i| i < panel.n_states())
        .unwrap_or_else(|| default_state(panel))
}

pub fn resolve_focus(panel: &Panel, click: Option<usize>, selection: Option<&[usize]>) -> Focus {
    let states = non_empty(selection, panel.n_states())
        .unwrap_or_else(|| vec![resolve_clicked(panel, click)]);
    let title = match states.as_slice() {
        [only] => panel.states()[*only].name.clone(),
        _ => MULTIPLE_STATES.to_string(),
    };
    Focus { states, title }
}

pub fn resolve_regression_subset(
    n: usize,
    map_selection: Option<&[usize]>,
    scatter_selection: Option<&[usize]>,
) -> Option<Vec<usize>> {
    let at_least_two = |s: Option<&[usize]>| {
        s.map(|s| valid_indices(s, n))
            .filter(|s| s.len() >= 2)
    };
    at_least_two(scatter_selection).or_else(|| at_least_two(map_selection))
}

pub fn resolve_box_selection(
    n: usize,
    map_selection: Option<&[usize]>,
    scatter_selection: Option<&[usize]>,
) -> Vec<usize> {
    non_empty(scatter_selection, n)
        .or_else(|| non_empty(map_selection, n))
        .unwrap_or_default()
}

/// Inputs of every chart after precedence and clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub year: Year,
    pub variable: Variable,
    pub focus: Focus,
    /// State followed by the time path and density charts.
    pub clicked: usize,
    pub regression_subset: Option<Vec<usize>>,
    pub box_selection: Vec<usize>,
    /// Cycling rank while spatial travelling is on.
    pub spatial_rank: Option<u32>,
    pub density_years: (Year, Year),
    pub rank_path_rank: u32,
    pub rank_path_year: Year,
    pub markov_classes: usize,
    pub markov_lag_classes: usize,
    pub rose_years: (Year, Year),
    pub rose_k: usize,
    pub lima_years: (Year, Year),
}

impl Resolved {
    pub fn new(panel: &Panel, controls: &ControlState, interactions: &Interactions) -> Self {
        let span = panel.span();
        let n = panel.n_states();
        let c = controls.sanitized(span, n);
        let map_selection = interactions.map_selection.as_deref();
        let scatter_selection = interactions.scatter_selection.as_deref();

        Self {
            year: resolve_year(span, c.year, interactions.moran_hover),
            variable: c.variable,
            focus: resolve_focus(panel, interactions.map_click, map_selection),
            clicked: resolve_clicked(panel, interactions.map_click),
            regression_subset: resolve_regression_subset(n, map_selection, scatter_selection),
            box_selection: resolve_box_selection(n, map_selection, scatter_selection),
            spatial_rank: if c.spatial_travel {
                spatial_rank(c.spatial_ticks, n)
            } else {
                None
            },
            density_years: (c.density_initial, c.density_final),
            rank_path_rank: c.rank_path_rank,
            rank_path_year: c.rank_path_year,
            markov_classes: c.markov_classes,
            markov_lag_classes: c.markov_lag_classes,
            rose_years: c.rose_years,
            rose_k: c.rose_k,
            lima_years: c.lima_years,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        MULTIPLE_STATES, Resolved, resolve_box_selection, resolve_focus, resolve_regression_subset,
        resolve_year,
    };
    use crate::controls::{ControlState, Interactions};
    use foundation::{Year, YearSpan};
    use panel::fixtures;
    use pretty_assertions::assert_eq;

    fn span() -> YearSpan {
        YearSpan::new(Year(1929), Year(2009)).unwrap()
    }

    #[test]
    fn hover_overrides_slider_unless_stale() {
        assert_eq!(resolve_year(span(), Year(1950), Some(Year(1960))), Year(1960));
        assert_eq!(resolve_year(span(), Year(1950), None), Year(1950));
        assert_eq!(resolve_year(span(), Year(1950), Some(Year(2100))), Year(1950));
        assert_eq!(resolve_year(span(), Year(1800), None), Year(1929));
    }

    #[test]
    fn focus_defaults_to_california() {
        let panel = fixtures::sample_panel().unwrap();
        let ca = panel.state_index("California").unwrap();
        let focus = resolve_focus(&panel, None, None);
        assert_eq!(focus.states, vec![ca]);
        assert_eq!(focus.title, "California");
        // An empty selection falls back the same way.
        assert_eq!(resolve_focus(&panel, None, Some(&[])), focus);
    }

    #[test]
    fn one_point_selection_equals_click() {
        let panel = fixtures::sample_panel().unwrap();
        let clicked = resolve_focus(&panel, Some(7), None);
        let selected = resolve_focus(&panel, None, Some(&[7]));
        assert_eq!(clicked, selected);
        assert_eq!(clicked.title, panel.states()[7].name);
        assert_eq!(resolve_regression_subset(48, Some(&[7]), None), None);
    }

    #[test]
    fn selection_overrides_click() {
        let panel = fixtures::sample_panel().unwrap();
        let focus = resolve_focus(&panel, Some(1), Some(&[2, 3, 99]));
        assert_eq!(focus.states, vec![2, 3]);
        assert_eq!(focus.title, MULTIPLE_STATES);
        // Empty selection falls back to the click.
        assert_eq!(resolve_focus(&panel, Some(1), Some(&[])).states, vec![1]);
    }

    #[test]
    fn scatter_selection_wins_regression_and_box() {
        assert_eq!(
            resolve_regression_subset(48, Some(&[1, 2]), Some(&[5, 6, 7])),
            Some(vec![5, 6, 7])
        );
        assert_eq!(
            resolve_regression_subset(48, Some(&[1, 2]), Some(&[5])),
            Some(vec![1, 2])
        );
        assert_eq!(resolve_box_selection(48, Some(&[1, 2]), Some(&[5])), vec![5]);
        assert_eq!(resolve_box_selection(48, Some(&[1, 2]), Some(&[])), vec![1, 2]);
        assert_eq!(resolve_box_selection(48, None, None), Vec::<usize>::new());
    }

    #[test]
    fn resolved_spatial_rank_only_while_travelling() {
        let panel = fixtures::sample_panel().unwrap();
        let mut controls = ControlState::initial(panel.span());
        controls.spatial_ticks = 50;
        let off = Resolved::new(&panel, &controls, &Interactions::default());
        assert_eq!(off.spatial_rank, None);
        controls.spatial_travel = true;
        let on = Resolved::new(&panel, &controls, &Interactions::default());
        assert_eq!(on.spatial_rank, Some(3));
    }

    #[test]
    fn resolved_timepath_ignores_selection() {
        let panel = fixtures::sample_panel().unwrap();
        let controls = ControlState::initial(panel.span());
        let interactions = Interactions {
            map_selection: Some(vec![4, 5]),
            ..Interactions::default()
        };
        let r = Resolved::new(&panel, &controls, &interactions);
        assert_eq!(r.clicked, panel.state_index("California").unwrap());
        assert_eq!(r.focus.states, vec![4, 5]);
    }
}
