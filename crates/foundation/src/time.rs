use serde::{Deserialize, Serialize};

/// Calendar year of an observation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Year(pub i32);

impl Year {
    pub fn label(self) -> String {
        self.0.to_string()
    }
}

impl std::fmt::Display for Year {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive, contiguous range of years covered by a dataset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSpan {
    pub first: Year,
    pub last: Year,
}

impl YearSpan {
    /// Returns `None` when `last` precedes `first`.
    pub fn new(first: Year, last: Year) -> Option<Self> {
        (first <= last).then_some(Self { first, last })
    }

    pub fn len(&self) -> usize {
        (self.last.0 - self.first.0) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, year: Year) -> bool {
        year >= self.first && year <= self.last
    }

    pub fn clamp(&self, year: Year) -> Year {
        Year(year.0.clamp(self.first.0, self.last.0))
    }

    /// Position of `year` within the span, if covered.
    pub fn index_of(&self, year: Year) -> Option<usize> {
        self.contains(year)
            .then(|| (year.0 - self.first.0) as usize)
    }

    pub fn year_at(&self, index: usize) -> Option<Year> {
        (index < self.len()).then(|| Year(self.first.0 + index as i32))
    }

    pub fn iter(&self) -> impl Iterator<Item = Year> + '_ {
        (self.first.0..=self.last.0).map(Year)
    }

    /// Every `step`-th year starting from the first one; used for slider marks.
    pub fn marks(&self, step: usize) -> Vec<Year> {
        self.iter().step_by(step.max(1)).collect()
    }

    /// Next year, wrapping back to the first one past the end.
    pub fn next_wrapping(&self, year: Year) -> Year {
        let next = Year(year.0 + 1);
        if next > self.last || next < self.first {
            self.first
        } else {
            next
        }
    }

    /// Orders and clamps an arbitrary pair of years into this span.
    pub fn clamp_pair(&self, a: Year, b: Year) -> (Year, Year) {
        let a = self.clamp(a);
        let b = self.clamp(b);
        if a <= b { (a, b) } else { (b, a) }
    }
}
