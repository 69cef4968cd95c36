//! Builds the [`Panel`] from the raw income table and state polygons.

use std::collections::HashSet;
use std::path::Path;

use compute::{SpatialWeights, Statistics, WeightsTransform, morans_i};
use formats::{IncomeTable, StateShapes};
use foundation::Year;
use tracing::{info, warn};

use crate::error::{AssemblyError, AssemblyResult};
use crate::panel::{Observation, Panel, StateRecord};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct AssemblyOptions {
    /// Fail instead of warning when a state has no contiguous neighbor.
    pub strict_contiguity: bool,
}

impl Panel {
    /// Reads both inputs from disk and assembles them.
    pub fn load(
        income_csv: impl AsRef<Path>,
        states_geojson: impl AsRef<Path>,
        options: AssemblyOptions,
    ) -> AssemblyResult<Self> {
        let table = IncomeTable::load(income_csv)?;
        let shapes = StateShapes::load(states_geojson)?;
        assemble(&table, &shapes, options)
    }
}

/// Joins income rows and shapes on FIPS, reshapes to long form and derives
/// the per-year columns.
pub fn assemble(
    table: &IncomeTable,
    shapes: &StateShapes,
    options: AssemblyOptions,
) -> AssemblyResult<Panel> {
    if table.rows().is_empty() {
        return Err(AssemblyError::Empty);
    }
    check_unique(table.rows().iter().map(|r| r.fips), "income table")?;
    check_unique(shapes.shapes.iter().map(|s| s.fips), "state geometry")?;

    let mut joined = Vec::with_capacity(table.rows().len());
    for row in table.rows() {
        let shape = shapes
            .by_fips(row.fips)
            .ok_or_else(|| AssemblyError::MissingGeometry {
                fips: row.fips,
                name: row.name.clone(),
            })?;
        joined.push((
            StateRecord {
                name: row.name.clone(),
                fips: row.fips,
                abbr: shape.abbr.clone(),
                parts: shape.parts.clone(),
            },
            row.values.as_slice(),
        ));
    }
    if let Some(extra) = shapes
        .shapes
        .iter()
        .find(|s| !table.rows().iter().any(|r| r.fips == s.fips))
    {
        return Err(AssemblyError::MissingIncome {
            fips: extra.fips,
            abbr: extra.abbr.clone(),
        });
    }

    joined.sort_by(|a, b| a.0.name.cmp(&b.0.name));
    let (states, values): (Vec<StateRecord>, Vec<&[f64]>) = joined.into_iter().unzip();

    let parts: Vec<_> = states.iter().map(|s| s.parts.clone()).collect();
    let weights = SpatialWeights::queen(&parts).transformed(WeightsTransform::RowStandardized);
    let islands = weights.islands();
    if !islands.is_empty() {
        let names = islands
            .iter()
            .map(|&i| states[i].name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        if options.strict_contiguity {
            return Err(AssemblyError::Islands { names });
        }
        warn!(%names, "states without neighbors get undefined spatial lags");
    }

    let span = table.span();
    let n = states.len();
    let mut rows = vec![None; n * span.len()];
    let mut morans = Vec::with_capacity(span.len());

    for (t, year) in span.iter().enumerate() {
        let income: Vec<f64> = values.iter().map(|v| v[t]).collect();
        let mean = Statistics::mean(&income).ok_or(AssemblyError::Empty)?;
        if mean == 0.0 {
            return Err(AssemblyError::ZeroMean { year });
        }
        let pcr = Statistics::ratio_to_mean(&income).ok_or(AssemblyError::Empty)?;
        let rank = Statistics::ordinal_rank(&income);
        let income_lag = weights.lag(&income)?;
        let pcr_lag = weights.lag(&pcr)?;
        morans.push(moran_or_nan(&weights, &income, year));

        for s in 0..n {
            rows[s * span.len() + t] = Some(Observation {
                state: s,
                year,
                income: income[s],
                pcr: pcr[s],
                rank: rank[s],
                income_lag: income_lag[s],
                pcr_lag: pcr_lag[s],
            });
        }
    }
    let rows: Vec<Observation> = rows.into_iter().flatten().collect();

    info!(
        states = n,
        first = span.first.0,
        last = span.last.0,
        rows = rows.len(),
        islands = islands.len(),
        "assembled panel"
    );
    Ok(Panel::from_parts(span, states, weights, rows, morans))
}

fn check_unique(fips: impl Iterator<Item = u32>, side: &'static str) -> AssemblyResult<()> {
    let mut seen = HashSet::new();
    for f in fips {
        if !seen.insert(f) {
            return Err(AssemblyError::DuplicateFips { fips: f, side });
        }
    }
    Ok(())
}

fn moran_or_nan(weights: &SpatialWeights, income: &[f64], year: Year) -> f64 {
    match morans_i(weights, income) {
        Ok(i) => i,
        Err(err) => {
            warn!(%year, %err, "Moran's I undefined");
            f64::NAN
        }
    }
}
