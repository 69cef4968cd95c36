//! Wide per-state income table: `Name,STATE_FIPS,<year>,<year>,...`.

use std::io::Read;
use std::path::Path;

use foundation::{Year, YearSpan};
use tracing::debug;

use crate::error::{FormatError, FormatResult};

pub const NAME_COLUMN: &str = "Name";
pub const FIPS_COLUMN: &str = "STATE_FIPS";

#[derive(Debug, Clone, PartialEq)]
pub struct IncomeRow {
    pub name: String,
    pub fips: u32,
    /// One value per year of the table's span, in year order.
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncomeTable {
    span: YearSpan,
    rows: Vec<IncomeRow>,
}

impl IncomeTable {
    pub fn load(path: impl AsRef<Path>) -> FormatResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| FormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader(reader: impl Read) -> FormatResult<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv.headers()?.clone();
        let name_idx = column_index(&headers, NAME_COLUMN)?;
        let fips_idx = column_index(&headers, FIPS_COLUMN)?;

        let mut year_columns: Vec<(usize, Year)> = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            if idx == name_idx || idx == fips_idx {
                continue;
            }
            let year = header
                .parse::<i32>()
                .map_err(|_| FormatError::InvalidYearColumn {
                    header: header.to_string(),
                })?;
            year_columns.push((idx, Year(year)));
        }
        year_columns.sort_by_key(|(_, y)| *y);

        let span = year_span(&year_columns)?;

        let mut rows = Vec::new();
        for (row_idx, record) in csv.records().enumerate() {
            let record = record?;
            // Row numbers are 1-based and count the header line.
            let row = row_idx + 2;
            let name = record
                .get(name_idx)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| FormatError::InvalidRow {
                    row,
                    reason: "missing state name".to_string(),
                })?
                .to_string();
            let fips = record
                .get(fips_idx)
                .and_then(parse_fips)
                .ok_or_else(|| FormatError::InvalidRow {
                    row,
                    reason: format!("invalid {FIPS_COLUMN} for {name}"),
                })?;

            let mut values = Vec::with_capacity(year_columns.len());
            for (col, year) in &year_columns {
                let raw = record.get(*col).unwrap_or("");
                let value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| FormatError::InvalidRow {
                        row,
                        reason: format!("{name} has non-numeric value '{raw}' for {year}"),
                    })?;
                values.push(value);
            }

            rows.push(IncomeRow { name, fips, values });
        }

        debug!(
            states = rows.len(),
            first = span.first.0,
            last = span.last.0,
            "parsed income table"
        );
        Ok(Self { span, rows })
    }

    pub fn span(&self) -> YearSpan {
        self.span
    }

    pub fn rows(&self) -> &[IncomeRow] {
        &self.rows
    }

    pub fn value(&self, fips: u32, year: Year) -> Option<f64> {
        let idx = self.span.index_of(year)?;
        self.rows
            .iter()
            .find(|r| r.fips == fips)
            .and_then(|r| r.values.get(idx).copied())
    }
}

/// Accepts `6`, `06` and `6.0` as FIPS code 6.
pub fn parse_fips(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<u32>() {
        return Some(v);
    }
    let f = raw.parse::<f64>().ok()?;
    (f >= 0.0 && f.fract() == 0.0).then_some(f as u32)
}

fn column_index(headers: &csv::StringRecord, column: &'static str) -> FormatResult<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or(FormatError::MissingColumn { column })
}

fn year_span(year_columns: &[(usize, Year)]) -> FormatResult<YearSpan> {
    let (Some((_, first)), Some((_, last))) = (year_columns.first(), year_columns.last()) else {
        return Err(FormatError::NoYears);
    };
    for pair in year_columns.windows(2) {
        let (a, b) = (pair[0].1, pair[1].1);
        if b.0 != a.0 + 1 {
            return Err(FormatError::NonContiguousYears {
                after: a.0,
                found: b.0,
            });
        }
    }
    YearSpan::new(*first, *last).ok_or(FormatError::NoYears)
}
