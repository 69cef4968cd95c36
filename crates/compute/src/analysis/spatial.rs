use std::collections::{BTreeSet, HashMap};

use foundation::math::{Rings, Vec2};
use tracing::debug;

use crate::error::{ComputeError, ComputeResult};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WeightsTransform {
    /// Every neighbor link has weight 1.
    Binary,
    /// Each non-empty row sums to 1.
    RowStandardized,
}

/// Sparse spatial weights over `n` regions.
///
/// Ordering contract:
/// - `neighbors(i)` is sorted ascending and never contains `i`.
/// - Regions without neighbors ("islands") have empty rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialWeights {
    neighbors: Vec<Vec<usize>>,
    weights: Vec<Vec<f64>>,
    transform: WeightsTransform,
}

impl SpatialWeights {
    /// Builds binary weights from neighbor lists. Links are symmetrised.
    pub fn from_neighbors(neighbors: Vec<Vec<usize>>) -> ComputeResult<Self> {
        let n = neighbors.len();
        let mut sets: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
        for (i, row) in neighbors.iter().enumerate() {
            for &j in row {
                if j >= n {
                    return Err(ComputeError::NeighborOutOfRange { index: j, n });
                }
                if j != i {
                    sets[i].insert(j);
                    sets[j].insert(i);
                }
            }
        }
        let neighbors: Vec<Vec<usize>> = sets.into_iter().map(|s| s.into_iter().collect()).collect();
        let weights = neighbors.iter().map(|row| vec![1.0; row.len()]).collect();
        Ok(Self {
            neighbors,
            weights,
            transform: WeightsTransform::Binary,
        })
    }

    /// Queen contiguity: two regions are neighbors when their boundaries share
    /// at least one vertex. Each region is given as a list of polygon parts.
    pub fn queen(regions: &[Vec<Rings>]) -> Self {
        let mut by_vertex: HashMap<(u64, u64), Vec<usize>> = HashMap::new();
        for (region, parts) in regions.iter().enumerate() {
            for ring in parts.iter().flatten() {
                for p in ring {
                    let owners = by_vertex.entry(vertex_key(*p)).or_default();
                    if owners.last() != Some(&region) {
                        owners.push(region);
                    }
                }
            }
        }

        let mut sets: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); regions.len()];
        for owners in by_vertex.values() {
            for &a in owners {
                for &b in owners {
                    if a != b {
                        sets[a].insert(b);
                    }
                }
            }
        }

        let neighbors: Vec<Vec<usize>> = sets.into_iter().map(|s| s.into_iter().collect()).collect();
        let weights = neighbors.iter().map(|row| vec![1.0; row.len()]).collect();
        debug!(
            regions = regions.len(),
            links = neighbors.iter().map(Vec::len).sum::<usize>(),
            "built queen contiguity"
        );
        Self {
            neighbors,
            weights,
            transform: WeightsTransform::Binary,
        }
    }

    pub fn transformed(&self, transform: WeightsTransform) -> Self {
        let weights = self
            .neighbors
            .iter()
            .map(|row| match transform {
                WeightsTransform::Binary => vec![1.0; row.len()],
                WeightsTransform::RowStandardized => {
                    let w = 1.0 / row.len() as f64;
                    vec![w; row.len()]
                }
            })
            .collect();
        Self {
            neighbors: self.neighbors.clone(),
            weights,
            transform,
        }
    }

    pub fn transform(&self) -> WeightsTransform {
        self.transform
    }

    pub fn n(&self) -> usize {
        self.neighbors.len()
    }

    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.neighbors[i]
    }

    pub fn cardinality(&self, i: usize) -> usize {
        self.neighbors[i].len()
    }

    pub fn islands(&self) -> Vec<usize> {
        (0..self.n()).filter(|&i| self.neighbors[i].is_empty()).collect()
    }

    /// Sum of all weights.
    pub fn s0(&self) -> f64 {
        self.weights.iter().flatten().sum()
    }

    /// Spatial lag `Wx`. Islands get `NaN`.
    pub fn lag(&self, values: &[f64]) -> ComputeResult<Vec<f64>> {
        self.check_len(values.len())?;
        let out = self
            .neighbors
            .iter()
            .zip(&self.weights)
            .map(|(row, w)| {
                if row.is_empty() {
                    return f64::NAN;
                }
                row.iter().zip(w).map(|(&j, wij)| wij * values[j]).sum()
            })
            .collect();
        Ok(out)
    }

    /// Visits every directed link `(i, j, w_ij)`.
    pub fn for_each_link(&self, mut f: impl FnMut(usize, usize, f64)) {
        for (i, (row, w)) in self.neighbors.iter().zip(&self.weights).enumerate() {
            for (&j, &wij) in row.iter().zip(w) {
                f(i, j, wij);
            }
        }
    }

    pub(crate) fn check_len(&self, len: usize) -> ComputeResult<()> {
        if len != self.n() {
            return Err(ComputeError::LengthMismatch {
                expected: self.n(),
                actual: len,
            });
        }
        Ok(())
    }
}

fn vertex_key(p: Vec2) -> (u64, u64) {
    // -0.0 and 0.0 must hash alike.
    let norm = |v: f64| if v == 0.0 { 0.0f64 } else { v };
    (norm(p.x).to_bits(), norm(p.y).to_bits())
}

/// Global Moran's I of `values` under `w`.
pub fn morans_i(w: &SpatialWeights, values: &[f64]) -> ComputeResult<f64> {
    w.check_len(values.len())?;
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ComputeError::NonFinite);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let z: Vec<f64> = values.iter().map(|v| v - mean).collect();
    let zz: f64 = z.iter().map(|v| v * v).sum();
    if zz == 0.0 {
        return Err(ComputeError::ZeroVariance { what: "Moran's I input" });
    }
    let s0 = w.s0();
    if s0 == 0.0 {
        return Err(ComputeError::TooFewObservations {
            required: 1,
            actual: 0,
        });
    }
    let mut cross = 0.0;
    w.for_each_link(|i, j, wij| cross += wij * z[i] * z[j]);
    Ok((n / s0) * cross / zz)
}
