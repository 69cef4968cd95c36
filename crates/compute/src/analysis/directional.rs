//! Directional analysis of co-movement between a variable and its spatial lag.

use std::f64::consts::TAU;

use serde::Serialize;

use crate::analysis::spatial::SpatialWeights;
use crate::error::{ComputeError, ComputeResult};

/// Rose diagram of change vectors `(dx, dy)` where `dx` is the change of a
/// region's value between two periods and `dy` the change of its spatial lag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rose {
    pub k: usize,
    /// Angle of each change vector in `[0, 2pi)`.
    pub theta: Vec<f64>,
    /// Length of each change vector.
    pub r: Vec<f64>,
    /// Sector boundaries, `k + 1` values from 0 to 2pi.
    pub cuts: Vec<f64>,
    /// Vectors per sector; islands are excluded.
    pub counts: Vec<usize>,
}

impl Rose {
    pub fn new(initial: &[f64], last: &[f64], w: &SpatialWeights, k: usize) -> ComputeResult<Self> {
        if k == 0 {
            return Err(ComputeError::TooFewClasses {
                required: 1,
                actual: 0,
            });
        }
        if initial.len() != last.len() {
            return Err(ComputeError::LengthMismatch {
                expected: initial.len(),
                actual: last.len(),
            });
        }
        let lag0 = w.lag(initial)?;
        let lag1 = w.lag(last)?;

        let width = TAU / k as f64;
        let cuts = (0..=k).map(|i| width * i as f64).collect();
        let mut counts = vec![0usize; k];
        let mut theta = Vec::with_capacity(initial.len());
        let mut r = Vec::with_capacity(initial.len());

        for i in 0..initial.len() {
            let dx = last[i] - initial[i];
            let dy = lag1[i] - lag0[i];
            let mut angle = dy.atan2(dx);
            if angle < 0.0 {
                angle += TAU;
            }
            // atan2 of a tiny negative dy can round up to exactly 2pi.
            if angle >= TAU {
                angle = 0.0;
            }
            theta.push(angle);
            r.push(dx.hypot(dy));
            if angle.is_finite() {
                let sector = ((angle / width) as usize).min(k - 1);
                counts[sector] += 1;
            }
        }

        Ok(Self {
            k,
            theta,
            r,
            cuts,
            counts,
        })
    }

    /// Angles in degrees, for polar plots.
    pub fn theta_degrees(&self) -> Vec<f64> {
        self.theta.iter().map(|t| t.to_degrees()).collect()
    }

    /// Sector midpoints in degrees.
    pub fn sector_centres_degrees(&self) -> Vec<f64> {
        self.cuts
            .windows(2)
            .map(|c| ((c[0] + c[1]) / 2.0).to_degrees())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Rose;
    use crate::analysis::spatial::{SpatialWeights, WeightsTransform};
    use pretty_assertions::assert_eq;
    use std::f64::consts::PI;

    fn pair() -> SpatialWeights {
        SpatialWeights::from_neighbors(vec![vec![1], vec![0]])
            .unwrap()
            .transformed(WeightsTransform::RowStandardized)
    }

    #[test]
    fn angles_follow_quadrants() {
        // Region 0 rises while its neighbor falls, and vice versa.
        let rose = Rose::new(&[1.0, 1.0], &[2.0, 0.0], &pair(), 4).unwrap();
        assert!((rose.theta[0] - 1.75 * PI).abs() < 1e-12);
        assert!((rose.theta[1] - 0.75 * PI).abs() < 1e-12);
        assert!((rose.r[0] - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(rose.counts, vec![0, 1, 0, 1]);
    }

    #[test]
    fn counts_sum_to_region_count() {
        let w = SpatialWeights::from_neighbors(vec![vec![1, 2], vec![3], vec![3], vec![4], vec![0]])
            .unwrap()
            .transformed(WeightsTransform::RowStandardized);
        let a = [1.0, 0.8, 1.3, 0.9, 1.1];
        let b = [1.1, 0.7, 1.2, 1.0, 0.95];
        for k in [1, 3, 8, 30, 50] {
            let rose = Rose::new(&a, &b, &w, k).unwrap();
            assert_eq!(rose.counts.iter().sum::<usize>(), 5);
            assert_eq!(rose.cuts.len(), k + 1);
        }
    }

    #[test]
    fn rejects_zero_sectors() {
        assert!(Rose::new(&[1.0, 2.0], &[1.0, 2.0], &pair(), 0).is_err());
    }

    #[test]
    fn sector_centres() {
        let rose = Rose::new(&[1.0, 1.0], &[1.0, 1.0], &pair(), 4).unwrap();
        let centres = rose.sector_centres_degrees();
        for (got, want) in centres.iter().zip([45.0, 135.0, 225.0, 315.0]) {
            assert!((got - want).abs() < 1e-9, "{got} vs {want}");
        }
    }
}
