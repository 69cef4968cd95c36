//! Static control metadata the page needs to build its widgets.

use foundation::Year;
use panel::Panel;
use runtime::{
    ordinal_label, ControlState, ACTIVE_INTERVAL_MS, INACTIVE_INTERVAL_MS, LAG_CLASS_OPTIONS,
    MARKOV_CLASS_OPTIONS, ROSE_K_OPTIONS, SLIDER_MARK_STEP, SPATIAL_TRAVEL_LABEL,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice<T> {
    pub label: String,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateInfo {
    pub name: String,
    pub abbr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutInfo {
    pub first_year: Year,
    pub last_year: Year,
    pub years: Vec<Year>,
    pub slider_marks: Vec<Year>,
    pub ranks: Vec<Choice<u32>>,
    pub markov_classes: Vec<usize>,
    pub lag_classes: Vec<usize>,
    pub rose_k: Vec<usize>,
    /// In the panel's state order; chart interactions index into it.
    pub states: Vec<StateInfo>,
    pub spatial_travel_label: &'static str,
    pub active_interval_ms: u64,
    pub inactive_interval_ms: u64,
    pub initial: ControlState,
}

impl LayoutInfo {
    pub fn new(panel: &Panel) -> Self {
        let span = panel.span();
        Self {
            first_year: span.first,
            last_year: span.last,
            years: span.iter().collect(),
            slider_marks: span.marks(SLIDER_MARK_STEP),
            ranks: panel
                .ranks()
                .into_iter()
                .map(|rank| Choice {
                    label: ordinal_label(rank),
                    value: rank,
                })
                .collect(),
            markov_classes: MARKOV_CLASS_OPTIONS.collect(),
            lag_classes: LAG_CLASS_OPTIONS.to_vec(),
            rose_k: ROSE_K_OPTIONS.collect(),
            states: panel
                .states()
                .iter()
                .map(|s| StateInfo {
                    name: s.name.clone(),
                    abbr: s.abbr.clone(),
                })
                .collect(),
            spatial_travel_label: SPATIAL_TRAVEL_LABEL,
            active_interval_ms: ACTIVE_INTERVAL_MS,
            inactive_interval_ms: INACTIVE_INTERVAL_MS,
            initial: ControlState::initial(span),
        }
    }
}
