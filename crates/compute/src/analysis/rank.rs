//! Rank concordance between two periods: global and spatial Kendall's tau
//! and the neighbor-set local indicator of mobility association (LIMA).
//!
//! Permutation inference draws from a seeded `Pcg64Mcg`, so repeated runs over
//! the same inputs give the same pseudo p-values.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg64Mcg;
use serde::Serialize;

use crate::analysis::spatial::SpatialWeights;
use crate::error::{ComputeError, ComputeResult};

pub const DEFAULT_SEED: u64 = 12345;

fn check_pair(x: &[f64], y: &[f64]) -> ComputeResult<()> {
    if x.len() != y.len() {
        return Err(ComputeError::LengthMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(ComputeError::NonFinite);
    }
    Ok(())
}

/// `+1` concordant, `-1` discordant, `0` when either pair is tied.
fn concordance(x: &[f64], y: &[f64], i: usize, j: usize) -> f64 {
    let dx = (x[i] - x[j]).partial_cmp(&0.0);
    let dy = (y[i] - y[j]).partial_cmp(&0.0);
    match (dx, dy) {
        (Some(a), Some(b)) if a.is_eq() || b.is_eq() => 0.0,
        (Some(a), Some(b)) if a == b => 1.0,
        (Some(_), Some(_)) => -1.0,
        _ => 0.0,
    }
}

/// Folded pseudo p-value: the smaller tail of `sims` around `observed`.
fn pseudo_p(sims: &[f64], observed: f64) -> f64 {
    let permutations = sims.len();
    let mut larger = sims.iter().filter(|&&s| s >= observed).count();
    if permutations - larger < larger {
        larger = permutations - larger;
    }
    (larger + 1) as f64 / (permutations + 1) as f64
}

/// Kendall's tau-b between `x` and `y`.
pub fn kendall_tau(x: &[f64], y: &[f64]) -> ComputeResult<f64> {
    check_pair(x, y)?;
    let n = x.len();
    if n < 2 {
        return Err(ComputeError::TooFewObservations {
            required: 2,
            actual: n,
        });
    }
    let mut concordant = 0.0_f64;
    let mut discordant = 0.0_f64;
    let mut tied_x = 0.0_f64;
    let mut tied_y = 0.0_f64;
    for i in 0..n {
        for j in (i + 1)..n {
            let ex = x[i] == x[j];
            let ey = y[i] == y[j];
            match (ex, ey) {
                (true, true) => {}
                (true, false) => tied_x += 1.0,
                (false, true) => tied_y += 1.0,
                (false, false) => {
                    if concordance(x, y, i, j) > 0.0 {
                        concordant += 1.0;
                    } else {
                        discordant += 1.0;
                    }
                }
            }
        }
    }
    let denom = ((concordant + discordant + tied_x) * (concordant + discordant + tied_y)).sqrt();
    if denom == 0.0 {
        return Err(ComputeError::ZeroVariance { what: "rank pairs" });
    }
    Ok((concordant - discordant) / denom)
}

/// Kendall's tau restricted to pairs of neighboring regions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialTau {
    pub tau: f64,
    pub tau_spatial: f64,
    pub concordant: usize,
    pub discordant: usize,
    /// Pseudo p-value of `tau_spatial`; `None` without permutations.
    pub p_sim: Option<f64>,
}

impl SpatialTau {
    pub fn new(
        x: &[f64],
        y: &[f64],
        w: &SpatialWeights,
        permutations: usize,
        seed: u64,
    ) -> ComputeResult<Self> {
        check_pair(x, y)?;
        w.check_len(x.len())?;
        let tau = kendall_tau(x, y)?;
        let (concordant, discordant) = neighbor_concordance(x, y, w);
        let tau_spatial = spatial_ratio(concordant, discordant)?;

        let p_sim = (permutations > 0).then(|| {
            let mut rng = Pcg64Mcg::seed_from_u64(seed);
            let mut ids: Vec<usize> = (0..x.len()).collect();
            let mut xs = vec![0.0; x.len()];
            let mut ys = vec![0.0; y.len()];
            let mut sims = Vec::with_capacity(permutations);
            for _ in 0..permutations {
                ids.shuffle(&mut rng);
                for (slot, &id) in ids.iter().enumerate() {
                    xs[slot] = x[id];
                    ys[slot] = y[id];
                }
                let (c, d) = neighbor_concordance(&xs, &ys, w);
                // A draw with only ties carries no information.
                sims.push(spatial_ratio(c, d).unwrap_or(0.0));
            }
            pseudo_p(&sims, tau_spatial)
        });

        Ok(Self {
            tau,
            tau_spatial,
            concordant,
            discordant,
            p_sim,
        })
    }
}

fn neighbor_concordance(x: &[f64], y: &[f64], w: &SpatialWeights) -> (usize, usize) {
    let mut concordant = 0;
    let mut discordant = 0;
    w.for_each_link(|i, j, _| {
        // Links are symmetric; count each pair once.
        if i < j {
            match concordance(x, y, i, j) {
                c if c > 0.0 => concordant += 1,
                c if c < 0.0 => discordant += 1,
                _ => {}
            }
        }
    });
    (concordant, discordant)
}

fn spatial_ratio(concordant: usize, discordant: usize) -> ComputeResult<f64> {
    let total = concordant + discordant;
    if total == 0 {
        return Err(ComputeError::ZeroVariance {
            what: "neighbor rank pairs",
        });
    }
    Ok((concordant as f64 - discordant as f64) / total as f64)
}

/// Neighbor-set LIMA: for each region, the mean concordance of its change
/// with that of each neighbor. Islands get `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalNeighborTau {
    pub tau_ln: Vec<f64>,
    /// Conditional-permutation pseudo p-values; empty without permutations.
    pub p_sim: Vec<f64>,
}

impl LocalNeighborTau {
    pub fn new(
        x: &[f64],
        y: &[f64],
        w: &SpatialWeights,
        permutations: usize,
        seed: u64,
    ) -> ComputeResult<Self> {
        check_pair(x, y)?;
        w.check_len(x.len())?;
        let n = x.len();
        let tau_ln: Vec<f64> = (0..n)
            .map(|i| local_tau(x, y, i, w.neighbors(i)))
            .collect();

        let mut p_sim = Vec::new();
        if permutations > 0 && n > 1 {
            let mut rng = Pcg64Mcg::seed_from_u64(seed);
            p_sim.reserve(n);
            for (i, &observed) in tau_ln.iter().enumerate() {
                let k = w.cardinality(i);
                if k == 0 {
                    p_sim.push(f64::NAN);
                    continue;
                }
                // Hold region i fixed and draw k random others as neighbors.
                let mut others: Vec<usize> = (0..n).filter(|&j| j != i).collect();
                let mut sims = Vec::with_capacity(permutations);
                for _ in 0..permutations {
                    let (drawn, _) = others.partial_shuffle(&mut rng, k);
                    sims.push(local_tau(x, y, i, drawn));
                }
                p_sim.push(pseudo_p(&sims, observed));
            }
        }

        Ok(Self { tau_ln, p_sim })
    }
}

fn local_tau(x: &[f64], y: &[f64], i: usize, neighbors: &[usize]) -> f64 {
    if neighbors.is_empty() {
        return f64::NAN;
    }
    let sum: f64 = neighbors.iter().map(|&j| concordance(x, y, i, j)).sum();
    sum / neighbors.len() as f64
}
