pub mod error;
pub mod esda;
pub mod figure;
pub mod markov;
pub mod mobility;
pub mod outlines;
pub mod rank_path;
pub mod symbology;

pub use error::*;
pub use figure::*;

use compute::DEFAULT_SEED;
use panel::Panel;
use runtime::{CallbackId, Resolved};
use tracing::warn;

pub const DEFAULT_PERMUTATIONS: usize = 999;
pub const DEFAULT_DENSITY_GRID: usize = 10_000;

/// Tunables of the heavier chart computations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChartOptions {
    /// Random permutations behind the LIMA and spatial tau p-values.
    pub permutations: usize,
    /// Points on the shared density grid.
    pub density_grid: usize,
    pub seed: u64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            permutations: DEFAULT_PERMUTATIONS,
            density_grid: DEFAULT_DENSITY_GRID,
            seed: DEFAULT_SEED,
        }
    }
}

/// Builds the figure written by a chart callback, or `None` for callbacks
/// that only touch controls. A failing builder yields an error figure so the
/// rest of the page still renders.
pub fn build(
    id: CallbackId,
    panel: &Panel,
    inputs: &Resolved,
    options: &ChartOptions,
) -> Option<Figure> {
    let result = match id {
        CallbackId::Choropleth => esda::choropleth(panel, inputs),
        CallbackId::Scatter => esda::scatter(panel, inputs),
        CallbackId::Timeseries => esda::timeseries(panel, inputs),
        CallbackId::Boxplot => esda::boxplot(panel, inputs),
        CallbackId::Timepath => esda::timepath(panel, inputs),
        CallbackId::Density => esda::density(panel, inputs, options.density_grid),
        CallbackId::RankPath => rank_path::rank_path(panel, inputs),
        CallbackId::MarkovPooled => markov::markov_pooled(panel, inputs),
        CallbackId::MarkovSpatial => markov::markov_spatial(panel, inputs),
        CallbackId::Lima => mobility::lima(panel, inputs, options),
        CallbackId::Rose => mobility::rose(panel, inputs),
        CallbackId::ChangeAuto
        | CallbackId::AdvanceSlider
        | CallbackId::ToggleSpatialOptions
        | CallbackId::ClearSpatialTravel
        | CallbackId::ResetSpatialTicks
        | CallbackId::ChangeSpatialInterval => return None,
    };
    Some(result.unwrap_or_else(|err| {
        warn!(chart = ?id, %err, "chart failed");
        error_figure(&err.to_string())
    }))
}

#[cfg(test)]
mod tests {
    use super::{ChartOptions, build};
    use panel::fixtures;
    use runtime::{CallbackId, ControlState, DependencyGraph, Interactions, Resolved};

    #[test]
    fn every_chart_callback_builds_a_figure() {
        let panel = fixtures::sample_panel().unwrap();
        let controls = ControlState::initial(panel.span());
        let inputs = Resolved::new(&panel, &controls, &Interactions::default());
        let options = ChartOptions {
            permutations: 9,
            density_grid: 64,
            ..ChartOptions::default()
        };
        let graph = DependencyGraph::dashboard().unwrap();
        let mut built = 0;
        for cb in graph.callbacks() {
            let figure = build(cb.id, &panel, &inputs, &options);
            let is_chart = cb.outputs.iter().any(|node| node.is_figure());
            assert_eq!(figure.is_some(), is_chart, "{:?}", cb.id);
            if let Some(figure) = figure {
                assert!(!figure.data.is_empty(), "{:?} drew nothing", cb.id);
                built += 1;
            }
        }
        assert_eq!(built, 11);
    }

    #[test]
    fn control_callbacks_build_nothing() {
        let panel = fixtures::sample_panel().unwrap();
        let controls = ControlState::initial(panel.span());
        let inputs = Resolved::new(&panel, &controls, &Interactions::default());
        assert!(build(CallbackId::AdvanceSlider, &panel, &inputs, &ChartOptions::default()).is_none());
    }
}
