//! Values of every control on the page, and the chart interactions that feed
//! back into other charts.

use std::ops::RangeInclusive;

use foundation::{Year, YearSpan};
use panel::Variable;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::animation::{INACTIVE_INTERVAL_MS, SPATIAL_TRAVEL_LABEL, interval_for};
use crate::graph::Node;

pub const SLIDER_MARK_STEP: usize = 5;
pub const MARKOV_CLASS_OPTIONS: RangeInclusive<usize> = 1..=9;
pub const DEFAULT_MARKOV_CLASSES: usize = 5;
pub const LAG_CLASS_OPTIONS: [usize; 3] = [3, 6, 9];
pub const DEFAULT_LAG_CLASSES: usize = 3;
pub const ROSE_K_OPTIONS: RangeInclusive<usize> = 1..=50;
pub const DEFAULT_ROSE_K: usize = 30;

/// Snapshot of every control value, round-tripped through the page on each
/// dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    pub year: Year,
    pub variable: Variable,
    /// Time travelling.
    pub auto: bool,
    pub interval_ms: u64,
    pub interval_ticks: u64,
    pub spatial_travel: bool,
    /// Whether the spatial-travel checkbox offers its option.
    pub spatial_travel_available: bool,
    pub spatial_ticks: u64,
    pub spatial_interval_ms: u64,
    pub density_initial: Year,
    pub density_final: Year,
    pub rank_path_rank: u32,
    pub rank_path_year: Year,
    pub markov_classes: usize,
    pub markov_lag_classes: usize,
    pub rose_years: (Year, Year),
    pub rose_k: usize,
    pub lima_years: (Year, Year),
}

impl ControlState {
    pub fn initial(span: YearSpan) -> Self {
        Self {
            year: span.first,
            variable: Variable::Pcr,
            auto: false,
            interval_ms: INACTIVE_INTERVAL_MS,
            interval_ticks: 0,
            spatial_travel: false,
            spatial_travel_available: true,
            spatial_ticks: 0,
            spatial_interval_ms: INACTIVE_INTERVAL_MS,
            density_initial: span.first,
            density_final: span.last,
            rank_path_rank: 1,
            rank_path_year: span.first,
            markov_classes: DEFAULT_MARKOV_CLASSES,
            markov_lag_classes: DEFAULT_LAG_CLASSES,
            rose_years: (span.first, span.last),
            rose_k: DEFAULT_ROSE_K,
            lima_years: (span.first, span.last),
        }
    }

    /// Clamps every value into its valid range so nothing out of range is
    /// ever used as an index.
    pub fn sanitized(&self, span: YearSpan, n_states: usize) -> Self {
        let max_rank = n_states.max(1) as u32;
        Self {
            year: span.clamp(self.year),
            density_initial: span.clamp(self.density_initial),
            density_final: span.clamp(self.density_final),
            rank_path_rank: self.rank_path_rank.clamp(1, max_rank),
            rank_path_year: span.clamp(self.rank_path_year),
            markov_classes: clamp_range(self.markov_classes, &MARKOV_CLASS_OPTIONS),
            markov_lag_classes: nearest_option(self.markov_lag_classes, &LAG_CLASS_OPTIONS),
            rose_years: span.clamp_pair(self.rose_years.0, self.rose_years.1),
            rose_k: clamp_range(self.rose_k, &ROSE_K_OPTIONS),
            lima_years: span.clamp_pair(self.lima_years.0, self.lima_years.1),
            interval_ms: interval_for(self.auto),
            spatial_interval_ms: interval_for(self.spatial_travel),
            ..self.clone()
        }
    }

    /// Current value of a control property, shaped the way the page expects.
    /// `None` for figure nodes and chart interactions.
    pub fn property(&self, node: Node) -> Option<Value> {
        let checklist = |on: bool| if on { json!(["auto"]) } else { json!([]) };
        let value = match node {
            Node::YearsSlider => json!(self.year),
            Node::IntervalTicks => json!(self.interval_ticks),
            Node::IntervalMs => json!(self.interval_ms),
            Node::AutoCheck => checklist(self.auto),
            Node::SpatialTravelCheck => checklist(self.spatial_travel),
            Node::SpatialTravelOptions => {
                if self.spatial_travel_available {
                    json!([{ "label": SPATIAL_TRAVEL_LABEL, "value": "auto" }])
                } else {
                    json!([])
                }
            }
            Node::SpatialTicks => json!(self.spatial_ticks),
            Node::SpatialIntervalMs => json!(self.spatial_interval_ms),
            Node::VariableSelector => json!(self.variable),
            Node::DensityInitialYear => json!(self.density_initial),
            Node::DensityFinalYear => json!(self.density_final),
            Node::RankPathRank => json!(self.rank_path_rank),
            Node::RankPathYear => json!(self.rank_path_year),
            Node::MarkovClasses => json!(self.markov_classes),
            Node::MarkovLagClasses => json!(self.markov_lag_classes),
            Node::RoseYears => json!([self.rose_years.0, self.rose_years.1]),
            Node::RoseK => json!(self.rose_k),
            Node::LimaYears => json!([self.lima_years.0, self.lima_years.1]),
            _ => return None,
        };
        Some(value)
    }
}

/// The option closest to `v`; ties go to the smaller option.
fn nearest_option(v: usize, options: &[usize]) -> usize {
    options
        .iter()
        .copied()
        .min_by_key(|&o| o.abs_diff(v))
        .unwrap_or(v)
}

fn clamp_range(v: usize, range: &RangeInclusive<usize>) -> usize {
    v.clamp(*range.start(), *range.end())
}

/// Hover, click and selection state of the charts, as indices into the
/// panel's state order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interactions {
    /// Year under the cursor on the Moran's I time series.
    pub moran_hover: Option<Year>,
    pub map_click: Option<usize>,
    pub map_selection: Option<Vec<usize>>,
    pub scatter_selection: Option<Vec<usize>>,
}

/// `1st`, `2nd`, `3rd`, `4th`, ..., `11th`, `12th`, `13th`, `21st`, ...
pub fn ordinal_label(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::{ControlState, Interactions, ordinal_label};
    use crate::animation::{ACTIVE_INTERVAL_MS, INACTIVE_INTERVAL_MS};
    use crate::graph::Node;
    use foundation::{Year, YearSpan};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn span() -> YearSpan {
        YearSpan::new(Year(1929), Year(2009)).unwrap()
    }

    #[test]
    fn initial_values() {
        let c = ControlState::initial(span());
        assert_eq!(c.year, Year(1929));
        assert_eq!(c.density_initial, Year(1929));
        assert_eq!(c.density_final, Year(2009));
        assert_eq!(c.rose_years, (Year(1929), Year(2009)));
        assert_eq!(c.rose_k, 30);
        assert_eq!(c.markov_classes, 5);
        assert_eq!(c.markov_lag_classes, 3);
        assert_eq!(c.interval_ms, INACTIVE_INTERVAL_MS);
    }

    #[test]
    fn sanitized_clamps_out_of_range_values() {
        let mut c = ControlState::initial(span());
        c.year = Year(2050);
        c.rank_path_rank = 99;
        c.markov_classes = 0;
        c.rose_k = 500;
        c.lima_years = (Year(2020), Year(1900));
        c.auto = true;
        let s = c.sanitized(span(), 48);
        assert_eq!(s.year, Year(2009));
        assert_eq!(s.rank_path_rank, 48);
        assert_eq!(s.markov_classes, 1);
        assert_eq!(s.rose_k, 50);
        assert_eq!(s.lima_years, (Year(1929), Year(2009)));
        assert_eq!(s.interval_ms, ACTIVE_INTERVAL_MS);
    }

    #[test]
    fn lag_classes_snap_to_offered_options() {
        let mut c = ControlState::initial(span());
        for (given, expected) in [(0, 3), (4, 3), (5, 6), (7, 6), (8, 9), (6, 6), (40, 9)] {
            c.markov_lag_classes = given;
            assert_eq!(c.sanitized(span(), 48).markov_lag_classes, expected, "{given}");
        }
    }

    #[test]
    fn properties_use_page_shapes() {
        let mut c = ControlState::initial(span());
        c.auto = true;
        assert_eq!(c.property(Node::AutoCheck), Some(json!(["auto"])));
        assert_eq!(c.property(Node::SpatialTravelCheck), Some(json!([])));
        assert_eq!(c.property(Node::RoseYears), Some(json!([1929, 2009])));
        assert_eq!(c.property(Node::VariableSelector), Some(json!("pcr")));
        assert_eq!(c.property(Node::ChoroplethFigure), None);
        c.spatial_travel_available = false;
        assert_eq!(c.property(Node::SpatialTravelOptions), Some(json!([])));
    }

    #[test]
    fn interactions_default_when_missing() {
        let i: Interactions = serde_json::from_str(r#"{"map_click": 3}"#).unwrap();
        assert_eq!(i.map_click, Some(3));
        assert_eq!(i.moran_hover, None);
        assert_eq!(i.map_selection, None);
    }

    #[test]
    fn ordinal_labels() {
        let labels: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 48]
            .into_iter()
            .map(ordinal_label)
            .collect();
        assert_eq!(
            labels,
            vec!["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "23rd", "48th"]
        );
    }
}
