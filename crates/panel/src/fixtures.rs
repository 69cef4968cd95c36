//! Synthetic dataset: the 48 contiguous states laid out as unit squares on an
//! 8 × 6 grid, with deterministic incomes whose ranks drift over time.
//!
//! Michigan carries a second, smaller detached part so multi-part handling is
//! exercised.

use formats::{IncomeTable, StateShapes};
use foundation::Year;

use crate::assemble::{AssemblyOptions, assemble};
use crate::error::AssemblyResult;
use crate::panel::Panel;

pub const COLUMNS: usize = 8;
pub const CELL: f64 = 2.0;
pub const ORIGIN: (f64, f64) = (-124.0, 25.0);
pub const SAMPLE_FIRST_YEAR: Year = Year(1929);
pub const SAMPLE_YEARS: usize = 20;

/// `(name, STATE_FIPS, STATE_ABBR)` in grid order.
pub const STATES: [(&str, u32, &str); 48] = [
    ("Alabama", 1, "AL"),
    ("Arizona", 4, "AZ"),
    ("Arkansas", 5, "AR"),
    ("California", 6, "CA"),
    ("Colorado", 8, "CO"),
    ("Connecticut", 9, "CT"),
    ("Delaware", 10, "DE"),
    ("Florida", 12, "FL"),
    ("Georgia", 13, "GA"),
    ("Idaho", 16, "ID"),
    ("Illinois", 17, "IL"),
    ("Indiana", 18, "IN"),
    ("Iowa", 19, "IA"),
    ("Kansas", 20, "KS"),
    ("Kentucky", 21, "KY"),
    ("Louisiana", 22, "LA"),
    ("Maine", 23, "ME"),
    ("Maryland", 24, "MD"),
    ("Massachusetts", 25, "MA"),
    ("Michigan", 26, "MI"),
    ("Minnesota", 27, "MN"),
    ("Mississippi", 28, "MS"),
    ("Missouri", 29, "MO"),
    ("Montana", 30, "MT"),
    ("Nebraska", 31, "NE"),
    ("Nevada", 32, "NV"),
    ("New Hampshire", 33, "NH"),
    ("New Jersey", 34, "NJ"),
    ("New Mexico", 35, "NM"),
    ("New York", 36, "NY"),
    ("North Carolina", 37, "NC"),
    ("North Dakota", 38, "ND"),
    ("Ohio", 39, "OH"),
    ("Oklahoma", 40, "OK"),
    ("Oregon", 41, "OR"),
    ("Pennsylvania", 42, "PA"),
    ("Rhode Island", 44, "RI"),
    ("South Carolina", 45, "SC"),
    ("South Dakota", 46, "SD"),
    ("Tennessee", 47, "TN"),
    ("Texas", 48, "TX"),
    ("Utah", 49, "UT"),
    ("Vermont", 50, "VT"),
    ("Virginia", 51, "VA"),
    ("Washington", 53, "WA"),
    ("West Virginia", 54, "WV"),
    ("Wisconsin", 55, "WI"),
    ("Wyoming", 56, "WY"),
];

/// Income of the state at grid position `i` in period `t`.
pub fn income(i: usize, t: usize) -> f64 {
    // 37 is coprime with 48, so starting levels are all distinct.
    let base = 300.0 + ((i * 37) % 48) as f64 * 15.0;
    let growth = 1.03 + ((i * 11) % 48) as f64 * 0.0005;
    (base * growth.powi(t as i32) * 10.0).round() / 10.0
}

pub fn income_csv(first: Year, years: usize) -> String {
    let mut out = String::from("Name,STATE_FIPS");
    for t in 0..years {
        out.push_str(&format!(",{}", first.0 + t as i32));
    }
    out.push('\n');
    for (i, (name, fips, _)) in STATES.iter().enumerate() {
        out.push_str(&format!("{name},{fips}"));
        for t in 0..years {
            out.push_str(&format!(",{}", income(i, t)));
        }
        out.push('\n');
    }
    out
}

fn square(x: f64, y: f64, size: f64) -> String {
    format!(
        "[[[{x},{y}],[{},{y}],[{},{}],[{x},{}],[{x},{y}]]]",
        x + size,
        x + size,
        y + size,
        y + size
    )
}

pub fn geojson() -> String {
    let features: Vec<String> = STATES
        .iter()
        .enumerate()
        .map(|(i, (_, fips, abbr))| {
            let x = ORIGIN.0 + (i % COLUMNS) as f64 * CELL;
            let y = ORIGIN.1 + (i / COLUMNS) as f64 * CELL;
            let geometry = if *abbr == "MI" {
                let islet = square(ORIGIN.0 + (COLUMNS as f64 + 1.0) * CELL, y, CELL / 4.0);
                format!(
                    r#"{{"type":"MultiPolygon","coordinates":[{},{}]}}"#,
                    square(x, y, CELL),
                    islet
                )
            } else {
                format!(
                    r#"{{"type":"Polygon","coordinates":{}}}"#,
                    square(x, y, CELL)
                )
            };
            format!(
                r#"{{"type":"Feature","properties":{{"STATE_FIPS":{fips},"STATE_ABBR":"{abbr}"}},"geometry":{geometry}}}"#
            )
        })
        .collect();
    format!(
        r#"{{"type":"FeatureCollection","features":[{}]}}"#,
        features.join(",")
    )
}

pub fn sample_inputs() -> AssemblyResult<(IncomeTable, StateShapes)> {
    let table = IncomeTable::from_reader(income_csv(SAMPLE_FIRST_YEAR, SAMPLE_YEARS).as_bytes())?;
    let shapes = StateShapes::from_geojson_str(&geojson())?;
    Ok((table, shapes))
}

pub fn sample_panel() -> AssemblyResult<Panel> {
    let (table, shapes) = sample_inputs()?;
    assemble(&table, &shapes, AssemblyOptions::default())
}
