//! Named input → output dependency graph between controls and charts.
//!
//! Every callback reads a fixed set of nodes and writes a fixed set of nodes.
//! A node written by one callback may be read by others (the animation tick
//! writes the year slider, which feeds every year-dependent chart), so a
//! single change propagates in topological order.
//!
//! Ordering contract:
//! - `DependencyGraph::affected` returns callbacks in a fixed topological
//!   order; ties keep declaration order.
//! - Each callback runs at most once per propagation, after every callback
//!   that writes one of its inputs.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

/// A `component.property` pair in the page.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Node {
    #[serde(rename = "years-slider.value")]
    YearsSlider,
    #[serde(rename = "interval-event.n_intervals")]
    IntervalTicks,
    #[serde(rename = "interval-event.interval")]
    IntervalMs,
    #[serde(rename = "auto-check.value")]
    AutoCheck,
    #[serde(rename = "spatial_travel-check.value")]
    SpatialTravelCheck,
    #[serde(rename = "spatial_travel-check.options")]
    SpatialTravelOptions,
    #[serde(rename = "spatial_interval-event.n_intervals")]
    SpatialTicks,
    #[serde(rename = "spatial_interval-event.interval")]
    SpatialIntervalMs,
    #[serde(rename = "type_data_selector.value")]
    VariableSelector,
    #[serde(rename = "timeseries-graph.hoverData")]
    MoranHover,
    #[serde(rename = "choropleth-graph.clickData")]
    MapClick,
    #[serde(rename = "choropleth-graph.selectedData")]
    MapSelection,
    #[serde(rename = "scatter-graph.selectedData")]
    ScatterSelection,
    #[serde(rename = "initial_years_dropdown.value")]
    DensityInitialYear,
    #[serde(rename = "final_years_dropdown.value")]
    DensityFinalYear,
    #[serde(rename = "rankpath_dropdown.value")]
    RankPathRank,
    #[serde(rename = "years-slider-rank-path.value")]
    RankPathYear,
    #[serde(rename = "markov-pooled-classes-dropdown.value")]
    MarkovClasses,
    #[serde(rename = "markov-pooled-spatial-dropdown.value")]
    MarkovLagClasses,
    #[serde(rename = "rose-range-slider.value")]
    RoseYears,
    #[serde(rename = "rose-k.value")]
    RoseK,
    #[serde(rename = "rank-range-slider.value")]
    LimaYears,
    #[serde(rename = "choropleth-graph.figure")]
    ChoroplethFigure,
    #[serde(rename = "scatter-graph.figure")]
    ScatterFigure,
    #[serde(rename = "timeseries-graph.figure")]
    TimeseriesFigure,
    #[serde(rename = "boxplot-graph.figure")]
    BoxplotFigure,
    #[serde(rename = "timepath-graph.figure")]
    TimepathFigure,
    #[serde(rename = "density-graph.figure")]
    DensityFigure,
    #[serde(rename = "rank-path-graph.figure")]
    RankPathFigure,
    #[serde(rename = "markov-pooled-graph.figure")]
    MarkovPooledFigure,
    #[serde(rename = "markov-spatial-graph.figure")]
    MarkovSpatialFigure,
    #[serde(rename = "lima-neighborhood-graph.figure")]
    LimaFigure,
    #[serde(rename = "rose-graph.figure")]
    RoseFigure,
}

impl Node {
    pub fn is_figure(self) -> bool {
        matches!(
            self,
            Node::ChoroplethFigure
                | Node::ScatterFigure
                | Node::TimeseriesFigure
                | Node::BoxplotFigure
                | Node::TimepathFigure
                | Node::DensityFigure
                | Node::RankPathFigure
                | Node::MarkovPooledFigure
                | Node::MarkovSpatialFigure
                | Node::LimaFigure
                | Node::RoseFigure
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackId {
    ChangeAuto,
    AdvanceSlider,
    ToggleSpatialOptions,
    ClearSpatialTravel,
    ResetSpatialTicks,
    ChangeSpatialInterval,
    Choropleth,
    Scatter,
    Timeseries,
    Boxplot,
    Timepath,
    Density,
    RankPath,
    MarkovPooled,
    MarkovSpatial,
    Lima,
    Rose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback {
    pub id: CallbackId,
    pub inputs: Vec<Node>,
    pub outputs: Vec<Node>,
}

impl Callback {
    pub fn new(id: CallbackId, inputs: &[Node], outputs: &[Node]) -> Self {
        Self {
            id,
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("{node:?} is written by both {first:?} and {second:?}")]
    DuplicateOutput {
        node: Node,
        first: CallbackId,
        second: CallbackId,
    },

    #[error("dependency cycle through {0:?}")]
    Cycle(CallbackId),
}

#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Callbacks in topological order.
    callbacks: Vec<Callback>,
}

impl DependencyGraph {
    pub fn new(callbacks: Vec<Callback>) -> Result<Self, GraphError> {
        let mut writer: HashMap<Node, usize> = HashMap::new();
        for (idx, cb) in callbacks.iter().enumerate() {
            for &node in &cb.outputs {
                if let Some(&prev) = writer.get(&node) {
                    return Err(GraphError::DuplicateOutput {
                        node,
                        first: callbacks[prev].id,
                        second: cb.id,
                    });
                }
                writer.insert(node, idx);
            }
        }

        // Kahn's algorithm; the ready set is ordered by declaration index.
        let n = callbacks.len();
        let mut indegree = vec![0usize; n];
        let mut downstream: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
        for (idx, cb) in callbacks.iter().enumerate() {
            let upstream: BTreeSet<usize> = cb
                .inputs
                .iter()
                .filter_map(|node| writer.get(node).copied())
                .collect();
            for up in upstream {
                if downstream[up].insert(idx) {
                    indegree[idx] += 1;
                }
            }
        }
        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(idx) = ready.pop_first() {
            order.push(idx);
            for &next in &downstream[idx] {
                indegree[next] -= 1;
                if indegree[next] == 0 {
                    ready.insert(next);
                }
            }
        }
        if let Some(stuck) = (0..n).find(|i| !order.contains(i)) {
            return Err(GraphError::Cycle(callbacks[stuck].id));
        }

        let mut slots: Vec<Option<Callback>> = callbacks.into_iter().map(Some).collect();
        let callbacks = order.into_iter().filter_map(|i| slots[i].take()).collect();
        Ok(Self { callbacks })
    }

    /// The dashboard's wiring.
    pub fn dashboard() -> Result<Self, GraphError> {
        use CallbackId as C;
        use Node as N;

        // Every year-dependent chart reads the slider and the Moran's I hover.
        Self::new(vec![
            Callback::new(C::ChangeAuto, &[N::AutoCheck], &[N::IntervalMs]),
            Callback::new(C::AdvanceSlider, &[N::IntervalTicks], &[N::YearsSlider]),
            Callback::new(
                C::ToggleSpatialOptions,
                &[N::AutoCheck],
                &[N::SpatialTravelOptions],
            ),
            Callback::new(C::ClearSpatialTravel, &[N::AutoCheck], &[N::SpatialTravelCheck]),
            Callback::new(
                C::ResetSpatialTicks,
                &[N::AutoCheck, N::YearsSlider],
                &[N::SpatialTicks],
            ),
            Callback::new(
                C::ChangeSpatialInterval,
                &[N::SpatialTravelCheck],
                &[N::SpatialIntervalMs],
            ),
            Callback::new(
                C::Choropleth,
                &[N::VariableSelector, N::MoranHover, N::YearsSlider, N::SpatialTicks],
                &[N::ChoroplethFigure],
            ),
            Callback::new(
                C::Scatter,
                &[
                    N::VariableSelector,
                    N::MoranHover,
                    N::YearsSlider,
                    N::MapSelection,
                    N::ScatterSelection,
                    N::MapClick,
                ],
                &[N::ScatterFigure],
            ),
            Callback::new(
                C::Timeseries,
                &[N::MoranHover, N::YearsSlider],
                &[N::TimeseriesFigure],
            ),
            Callback::new(
                C::Boxplot,
                &[
                    N::VariableSelector,
                    N::MoranHover,
                    N::MapSelection,
                    N::ScatterSelection,
                    N::YearsSlider,
                ],
                &[N::BoxplotFigure],
            ),
            Callback::new(
                C::Timepath,
                &[N::VariableSelector, N::MapClick, N::MoranHover, N::YearsSlider],
                &[N::TimepathFigure],
            ),
            Callback::new(
                C::Density,
                &[
                    N::VariableSelector,
                    N::DensityInitialYear,
                    N::DensityFinalYear,
                    N::MapClick,
                    N::SpatialTicks,
                ],
                &[N::DensityFigure],
            ),
            Callback::new(
                C::RankPath,
                &[N::RankPathRank, N::RankPathYear],
                &[N::RankPathFigure],
            ),
            Callback::new(
                C::MarkovPooled,
                &[N::MarkovClasses, N::MarkovLagClasses],
                &[N::MarkovPooledFigure],
            ),
            Callback::new(
                C::MarkovSpatial,
                &[N::MarkovClasses, N::MarkovLagClasses],
                &[N::MarkovSpatialFigure],
            ),
            Callback::new(C::Lima, &[N::LimaYears], &[N::LimaFigure]),
            Callback::new(C::Rose, &[N::RoseYears, N::RoseK], &[N::RoseFigure]),
        ])
    }

    pub fn callbacks(&self) -> &[Callback] {
        &self.callbacks
    }

    /// Callbacks to run after `changed`, in execution order.
    pub fn affected(&self, changed: &[Node]) -> Vec<&Callback> {
        let mut dirty: BTreeSet<Node> = changed.iter().copied().collect();
        let mut out = Vec::new();
        for cb in &self.callbacks {
            if cb.inputs.iter().any(|n| dirty.contains(n)) {
                dirty.extend(cb.outputs.iter().copied());
                out.push(cb);
            }
        }
        trace!(?changed, callbacks = out.len(), "propagated change");
        out
    }

    /// Every callback, for the initial page render.
    pub fn all(&self) -> Vec<&Callback> {
        self.callbacks.iter().collect()
    }

    /// Nodes written by any callback.
    pub fn outputs(&self) -> BTreeSet<Node> {
        self.callbacks
            .iter()
            .flat_map(|cb| cb.outputs.iter().copied())
            .collect()
    }
}
