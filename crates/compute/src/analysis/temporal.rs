//! Discrete Markov chains over quantile classes, including the spatially
//! conditioned variant, and summary mobility indices.

use nalgebra::DMatrix;
use serde::Serialize;

use crate::analysis::spatial::SpatialWeights;
use crate::analysis::statistics::{classify, quantile_bins};
use crate::error::{ComputeError, ComputeResult};

/// Row-major square matrix.
pub type Matrix = Vec<Vec<f64>>;

/// Counts transitions between consecutive periods of each class sequence and
/// normalises rows. Rows with no observations stay all-zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkovChain {
    pub transitions: Matrix,
    pub p: Matrix,
}

impl MarkovChain {
    pub fn from_sequences(sequences: &[Vec<usize>], k: usize) -> Self {
        let mut transitions = vec![vec![0.0; k]; k];
        for seq in sequences {
            for pair in seq.windows(2) {
                transitions[pair[0]][pair[1]] += 1.0;
            }
        }
        let p = row_normalise(&transitions);
        Self { transitions, p }
    }
}

fn row_normalise(counts: &Matrix) -> Matrix {
    counts
        .iter()
        .map(|row| {
            let total: f64 = row.iter().sum();
            if total == 0.0 {
                vec![0.0; row.len()]
            } else {
                row.iter().map(|c| c / total).collect()
            }
        })
        .collect()
}

/// Markov chain whose transitions are conditioned on the class of each
/// region's spatial lag at the start of the transition.
///
/// Classes are pooled quantiles over all regions and periods (`k` classes
/// for the variable, `m` for its lag).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialMarkov {
    pub k: usize,
    pub m: usize,
    /// Pooled transition probabilities, `k x k`.
    pub p: Matrix,
    /// One `k x k` matrix per lag class.
    pub conditional: Vec<Matrix>,
    pub class_ids: Vec<Vec<usize>>,
    pub lag_class_ids: Vec<Vec<usize>>,
}

impl SpatialMarkov {
    /// `series[i][t]` is region `i`'s value in period `t`; `w` should be
    /// row-standardised.
    pub fn new(series: &[Vec<f64>], w: &SpatialWeights, k: usize, m: usize) -> ComputeResult<Self> {
        if k == 0 || m == 0 {
            return Err(ComputeError::TooFewClasses {
                required: 1,
                actual: k.min(m),
            });
        }
        w.check_len(series.len())?;
        let periods = series.first().map(Vec::len).unwrap_or(0);
        if periods < 2 {
            return Err(ComputeError::TooFewObservations {
                required: 2,
                actual: periods,
            });
        }
        if let Some(bad) = series.iter().find(|s| s.len() != periods) {
            return Err(ComputeError::LengthMismatch {
                expected: periods,
                actual: bad.len(),
            });
        }

        // Lag per period, then transposed back to region-major.
        let mut lags = vec![vec![0.0; periods]; series.len()];
        for t in 0..periods {
            let column: Vec<f64> = series.iter().map(|s| s[t]).collect();
            for (i, v) in w.lag(&column)?.into_iter().enumerate() {
                lags[i][t] = v;
            }
        }

        let pooled: Vec<f64> = series.iter().flatten().copied().collect();
        let pooled_lag: Vec<f64> = lags.iter().flatten().copied().collect();
        let bins = quantile_bins(&pooled, k)?;
        let lag_bins = quantile_bins(&pooled_lag, m)?;

        let class_ids: Vec<Vec<usize>> = series
            .iter()
            .map(|s| s.iter().map(|&v| classify(v, &bins)).collect())
            .collect();
        let lag_class_ids: Vec<Vec<usize>> = lags
            .iter()
            .map(|s| s.iter().map(|&v| classify(v, &lag_bins)).collect())
            .collect();

        let pooled_chain = MarkovChain::from_sequences(&class_ids, k);

        let mut counts = vec![vec![vec![0.0; k]; k]; m];
        for (i, classes) in class_ids.iter().enumerate() {
            for t in 0..periods - 1 {
                // Islands have no lag class and do not contribute.
                if lags[i][t].is_nan() {
                    continue;
                }
                let l = lag_class_ids[i][t];
                counts[l][classes[t]][classes[t + 1]] += 1.0;
            }
        }
        let conditional = counts.iter().map(row_normalise).collect();

        Ok(Self {
            k,
            m,
            p: pooled_chain.p,
            conditional,
            class_ids,
            lag_class_ids,
        })
    }
}

/// Summary mobility indices of a transition matrix.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct MobilityIndices {
    /// Shorrock's trace-based index `(k - tr P) / (k - 1)`.
    pub shorrock_p: f64,
    /// Shorrock's determinant-based index `1 - |det P|`.
    pub shorrock_d: f64,
    /// Sommers and Conlisk's `1 - |lambda_2|`.
    pub sommers_conlisk: f64,
}

impl MobilityIndices {
    pub fn of(p: &Matrix) -> ComputeResult<Self> {
        let k = p.len();
        if k < 2 {
            return Err(ComputeError::TooFewClasses {
                required: 2,
                actual: k,
            });
        }
        if let Some(bad) = p.iter().find(|row| row.len() != k) {
            return Err(ComputeError::LengthMismatch {
                expected: k,
                actual: bad.len(),
            });
        }
        let m = DMatrix::from_fn(k, k, |r, c| p[r][c]);
        let trace = m.trace();
        let det = m.determinant();
        let mut moduli: Vec<f64> = m
            .complex_eigenvalues()
            .iter()
            .map(|ev| ev.norm())
            .collect();
        moduli.sort_by(|a, b| b.total_cmp(a));

        Ok(Self {
            shorrock_p: (k as f64 - trace) / (k as f64 - 1.0),
            shorrock_d: 1.0 - det.abs(),
            sommers_conlisk: 1.0 - moduli[1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{MarkovChain, MobilityIndices, SpatialMarkov};
    use crate::analysis::spatial::{SpatialWeights, WeightsTransform};
    use pretty_assertions::assert_eq;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn chain_counts_and_normalises() {
        let chain = MarkovChain::from_sequences(&[vec![0, 0, 1], vec![1, 0, 2]], 3);
        assert_eq!(chain.transitions[0], vec![1.0, 1.0, 1.0]);
        assert_eq!(chain.transitions[1], vec![1.0, 0.0, 0.0]);
        assert_eq!(chain.p[2], vec![0.0, 0.0, 0.0]);
        assert_close(chain.p[0][2], 1.0 / 3.0, 1e-12);
    }

    #[test]
    fn identity_has_no_mobility() {
        let p = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ];
        let idx = MobilityIndices::of(&p).unwrap();
        assert_close(idx.shorrock_p, 0.0, 1e-12);
        assert_close(idx.shorrock_d, 0.0, 1e-12);
        assert_close(idx.sommers_conlisk, 0.0, 1e-9);
    }

    #[test]
    fn uniform_matrix_is_fully_mobile() {
        let p = vec![vec![0.5, 0.5], vec![0.5, 0.5]];
        let idx = MobilityIndices::of(&p).unwrap();
        assert_close(idx.shorrock_p, 1.0, 1e-12);
        assert_close(idx.shorrock_d, 1.0, 1e-12);
        assert_close(idx.sommers_conlisk, 1.0, 1e-9);
    }

    #[test]
    fn single_class_has_no_indices() {
        assert!(MobilityIndices::of(&vec![vec![1.0]]).is_err());
    }

    #[test]
    fn spatial_markov_rows_are_stochastic() {
        let w = SpatialWeights::from_neighbors(vec![vec![1], vec![2], vec![3], vec![0]])
            .unwrap()
            .transformed(WeightsTransform::RowStandardized);
        let series = vec![
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![2.0, 2.5, 2.0, 3.5, 4.0],
            vec![5.0, 4.0, 3.0, 2.0, 1.0],
            vec![3.0, 3.0, 3.5, 1.0, 2.0],
        ];
        let sm = SpatialMarkov::new(&series, &w, 3, 3).unwrap();
        assert_eq!(sm.p.len(), 3);
        assert_eq!(sm.conditional.len(), 3);
        for row in sm.p.iter().chain(sm.conditional.iter().flatten()) {
            let total: f64 = row.iter().sum();
            assert!(total == 0.0 || (total - 1.0).abs() < 1e-12, "row sums to {total}");
        }
        assert_eq!(sm.class_ids.len(), 4);
        assert_eq!(sm.lag_class_ids[0].len(), 5);
    }

    #[test]
    fn spatial_markov_rejects_single_period() {
        let w = SpatialWeights::from_neighbors(vec![vec![1], vec![0]]).unwrap();
        assert!(SpatialMarkov::new(&[vec![1.0], vec![2.0]], &w, 2, 2).is_err());
    }
}
