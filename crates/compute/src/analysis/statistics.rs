use crate::error::{ComputeError, ComputeResult};

pub struct Statistics;

impl Statistics {
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        for &v in values {
            sum += v;
        }
        Some(sum / values.len() as f64)
    }

    pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
        let first = *values.first()?;
        let mut min = first;
        let mut max = first;
        for &v in values.iter().skip(1) {
            min = min.min(v);
            max = max.max(v);
        }
        Some((min, max))
    }

    /// Variance with `ddof` delta degrees of freedom.
    pub fn variance(values: &[f64], ddof: usize) -> Option<f64> {
        if values.len() <= ddof {
            return None;
        }
        let mean = Self::mean(values)?;
        let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        Some(ss / (values.len() - ddof) as f64)
    }

    /// Ordinal ranks starting at 1; ties are broken by position, so the
    /// result is always a permutation of `1..=n`.
    pub fn ordinal_rank(values: &[f64]) -> Vec<u32> {
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));
        let mut ranks = vec![0u32; values.len()];
        for (rank, idx) in order.into_iter().enumerate() {
            ranks[idx] = rank as u32 + 1;
        }
        ranks
    }

    /// Each value divided by the mean of all values.
    pub fn ratio_to_mean(values: &[f64]) -> Option<Vec<f64>> {
        let mean = Self::mean(values)?;
        Some(values.iter().map(|v| v / mean).collect())
    }

    /// Percentile with linear interpolation between closest ranks, `q` in [0, 100].
    pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
        let last = sorted.len().checked_sub(1)?;
        let pos = (q.clamp(0.0, 100.0) / 100.0) * last as f64;
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        let frac = pos - lo as f64;
        Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
    }

    /// `n` evenly spaced samples over `[start, stop]`, both ends included.
    pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (stop - start) / (n - 1) as f64;
                (0..n).map(|i| start + step * i as f64).collect()
            }
        }
    }
}

/// Least-squares line `y = intercept + slope * x`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn fit(x: &[f64], y: &[f64]) -> ComputeResult<Self> {
        if x.len() != y.len() {
            return Err(ComputeError::LengthMismatch {
                expected: x.len(),
                actual: y.len(),
            });
        }
        if x.len() < 2 {
            return Err(ComputeError::TooFewObservations {
                required: 2,
                actual: x.len(),
            });
        }
        if x.iter().chain(y).any(|v| !v.is_finite()) {
            return Err(ComputeError::NonFinite);
        }
        let n = x.len() as f64;
        let mx = x.iter().sum::<f64>() / n;
        let my = y.iter().sum::<f64>() / n;
        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (xi, yi) in x.iter().zip(y) {
            sxy += (xi - mx) * (yi - my);
            sxx += (xi - mx) * (xi - mx);
        }
        if sxx == 0.0 {
            return Err(ComputeError::ZeroVariance { what: "regressor" });
        }
        let slope = sxy / sxx;
        Ok(Self {
            slope,
            intercept: my - slope * mx,
        })
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Inverse of `eval`; `None` for a flat line.
    pub fn solve_x(&self, y: f64) -> Option<f64> {
        (self.slope != 0.0).then(|| (y - self.intercept) / self.slope)
    }
}

/// One-dimensional Gaussian kernel density estimate with Silverman's rule.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKde {
    data: Vec<f64>,
    bandwidth: f64,
}

impl GaussianKde {
    pub fn silverman(data: &[f64]) -> ComputeResult<Self> {
        if data.len() < 2 {
            return Err(ComputeError::TooFewObservations {
                required: 2,
                actual: data.len(),
            });
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(ComputeError::NonFinite);
        }
        let n = data.len() as f64;
        // Silverman factor for one dimension: (n * (d + 2) / 4)^(-1 / (d + 4)).
        let factor = (n * 3.0 / 4.0).powf(-1.0 / 5.0);
        let std = Statistics::variance(data, 1).map(f64::sqrt).unwrap_or(0.0);
        if std == 0.0 {
            return Err(ComputeError::ZeroVariance { what: "density sample" });
        }
        Ok(Self {
            data: data.to_vec(),
            bandwidth: std * factor,
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let norm = 1.0 / (self.data.len() as f64 * h * (2.0 * std::f64::consts::PI).sqrt());
        let sum: f64 = self
            .data
            .iter()
            .map(|xi| {
                let u = (x - xi) / h;
                (-0.5 * u * u).exp()
            })
            .sum();
        sum * norm
    }

    pub fn evaluate_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }
}

/// Shared evaluation grid for comparing two samples:
/// `[min - 0.1 |max|, max + 0.1 |max|]` over both.
pub fn density_grid(a: &[f64], b: &[f64], points: usize) -> Option<Vec<f64>> {
    let joined: Vec<f64> = a.iter().chain(b).copied().collect();
    let (min, max) = Statistics::min_max(&joined)?;
    let pad = 0.1 * max.abs();
    Some(Statistics::linspace(min - pad, max + pad, points))
}

/// Quantile class breaks: the upper bound of each of `k` classes.
pub fn quantile_bins(values: &[f64], k: usize) -> ComputeResult<Vec<f64>> {
    if k == 0 {
        return Err(ComputeError::TooFewClasses {
            required: 1,
            actual: 0,
        });
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Err(ComputeError::TooFewObservations {
            required: 1,
            actual: 0,
        });
    }
    sorted.sort_by(f64::total_cmp);
    let bins = (1..=k)
        .filter_map(|i| Statistics::percentile(&sorted, 100.0 * i as f64 / k as f64))
        .collect();
    Ok(bins)
}

/// Class of `value`: the first bin whose upper bound is `>= value`.
/// Values past the last bound fall into the last class.
pub fn classify(value: f64, bins: &[f64]) -> usize {
    bins.iter()
        .position(|&b| value <= b)
        .unwrap_or(bins.len().saturating_sub(1))
}
