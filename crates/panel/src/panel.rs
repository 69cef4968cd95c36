//! The assembled long-form dataset and its pivoted views.
//!
//! Rows are stored state-major (states ordered by name, then years in order),
//! so a state's series is a contiguous slice and a year's cross-section is a
//! strided walk. Both pivots are cheap enough to recompute per request.

use compute::SpatialWeights;
use foundation::math::{Rings, Vec2, largest_part, ring_centroid};
use foundation::{Year, YearSpan};
use serde::{Deserialize, Serialize};

/// Which income measure a chart displays.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    /// Per-capita ratio: income over the cross-sectional mean of its year.
    #[default]
    Pcr,
    Raw,
}

impl Variable {
    pub fn label(self) -> &'static str {
        match self {
            Variable::Pcr => "PCR",
            Variable::Raw => "Raw",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateRecord {
    pub name: String,
    pub fips: u32,
    pub abbr: String,
    pub parts: Vec<Rings>,
}

/// Exterior ring and centroid of a state's largest polygon part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline<'a> {
    pub exterior: &'a [Vec2],
    pub centroid: Vec2,
}

impl StateRecord {
    pub fn outline(&self) -> Option<Outline<'_>> {
        let part = &self.parts[largest_part(&self.parts)?];
        let exterior = part.first()?;
        let centroid = ring_centroid(exterior)?;
        Some(Outline {
            exterior: exterior.as_slice(),
            centroid,
        })
    }
}

/// One (state, year) row of the joined table.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Observation {
    /// Index into [`Panel::states`].
    pub state: usize,
    pub year: Year,
    pub income: f64,
    pub pcr: f64,
    /// Same-year ordinal rank, 1 = lowest income.
    pub rank: u32,
    pub income_lag: f64,
    pub pcr_lag: f64,
}

impl Observation {
    pub fn value(&self, variable: Variable) -> f64 {
        match variable {
            Variable::Pcr => self.pcr,
            Variable::Raw => self.income,
        }
    }

    pub fn lag(&self, variable: Variable) -> f64 {
        match variable {
            Variable::Pcr => self.pcr_lag,
            Variable::Raw => self.income_lag,
        }
    }
}

/// Immutable process-wide dataset.
#[derive(Debug, Clone)]
pub struct Panel {
    span: YearSpan,
    states: Vec<StateRecord>,
    weights: SpatialWeights,
    rows: Vec<Observation>,
    morans: Vec<f64>,
}

impl Panel {
    pub(crate) fn from_parts(
        span: YearSpan,
        states: Vec<StateRecord>,
        weights: SpatialWeights,
        rows: Vec<Observation>,
        morans: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(rows.len(), states.len() * span.len());
        debug_assert_eq!(morans.len(), span.len());
        Self {
            span,
            states,
            weights,
            rows,
            morans,
        }
    }

    pub fn span(&self) -> YearSpan {
        self.span
    }

    pub fn states(&self) -> &[StateRecord] {
        &self.states
    }

    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    /// Row-standardised queen contiguity aligned with [`Panel::states`].
    pub fn weights(&self) -> &SpatialWeights {
        &self.weights
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    /// Global Moran's I of income per year; `NaN` where undefined.
    pub fn morans(&self) -> &[f64] {
        &self.morans
    }

    pub fn moran_at(&self, year: Year) -> Option<f64> {
        self.span.index_of(year).map(|i| self.morans[i])
    }

    pub fn state_index(&self, name: &str) -> Option<usize> {
        self.states.iter().position(|s| s.name == name)
    }

    pub fn state_rows(&self, state: usize) -> &[Observation] {
        let len = self.span.len();
        &self.rows[state * len..(state + 1) * len]
    }

    pub fn observation(&self, state: usize, year: Year) -> Option<&Observation> {
        let t = self.span.index_of(year)?;
        (state < self.states.len()).then(|| &self.rows[state * self.span.len() + t])
    }

    /// Observations of every state in `year`, in state order.
    pub fn cross_section(&self, year: Year) -> Option<impl Iterator<Item = &Observation> + '_> {
        let t = self.span.index_of(year)?;
        Some(self.rows.iter().skip(t).step_by(self.span.len()))
    }

    pub fn column(&self, variable: Variable, year: Year) -> Option<Vec<f64>> {
        Some(self.cross_section(year)?.map(|o| o.value(variable)).collect())
    }

    pub fn lag_column(&self, variable: Variable, year: Year) -> Option<Vec<f64>> {
        Some(self.cross_section(year)?.map(|o| o.lag(variable)).collect())
    }

    pub fn rank_column(&self, year: Year) -> Option<Vec<u32>> {
        Some(self.cross_section(year)?.map(|o| o.rank).collect())
    }

    pub fn series(&self, variable: Variable, state: usize) -> Vec<f64> {
        self.state_rows(state).iter().map(|o| o.value(variable)).collect()
    }

    pub fn lag_series(&self, variable: Variable, state: usize) -> Vec<f64> {
        self.state_rows(state).iter().map(|o| o.lag(variable)).collect()
    }

    /// State × year matrix of `variable`.
    pub fn wide(&self, variable: Variable) -> Vec<Vec<f64>> {
        (0..self.states.len())
            .map(|s| self.series(variable, s))
            .collect()
    }

    /// State holding `rank` in `year`.
    pub fn holder_of_rank(&self, year: Year, rank: u32) -> Option<usize> {
        self.cross_section(year)?
            .find(|o| o.rank == rank)
            .map(|o| o.state)
    }

    /// Every rank that occurs in the table, ascending.
    pub fn ranks(&self) -> Vec<u32> {
        (1..=self.states.len() as u32).collect()
    }
}
