//! State polygons from a GeoJSON FeatureCollection.
//!
//! Each feature carries `STATE_FIPS` (number or string) and `STATE_ABBR`
//! properties and a `Polygon` or `MultiPolygon` geometry. Both geometry kinds
//! are normalised to a list of parts, each part a list of rings.

use std::path::Path;

use foundation::math::{Rings, Vec2};
use serde_json::Value;

use crate::error::{FormatError, FormatResult};
use crate::income_table::parse_fips;

pub const ABBR_PROPERTY: &str = "STATE_ABBR";

#[derive(Debug, Clone, PartialEq)]
pub struct StateShape {
    pub fips: u32,
    pub abbr: String,
    pub parts: Vec<Rings>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateShapes {
    pub shapes: Vec<StateShape>,
}

impl StateShapes {
    pub fn load(path: impl AsRef<Path>) -> FormatResult<Self> {
        let path = path.as_ref();
        let payload = std::fs::read_to_string(path).map_err(|source| FormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_geojson_str(&payload)
    }

    pub fn from_geojson_str(payload: &str) -> FormatResult<Self> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> FormatResult<Self> {
        let obj = value.as_object().ok_or(FormatError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(FormatError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(FormatError::NotAFeatureCollection);
        }

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(FormatError::NotAFeatureCollection)?;

        let mut shapes = Vec::with_capacity(features_val.len());
        for (index, feat_val) in features_val.iter().enumerate() {
            let shape = parse_feature(feat_val)
                .map_err(|reason| FormatError::InvalidFeature { index, reason })?;
            shapes.push(shape);
        }

        Ok(Self { shapes })
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn by_fips(&self, fips: u32) -> Option<&StateShape> {
        self.shapes.iter().find(|s| s.fips == fips)
    }
}

fn parse_feature(value: &Value) -> Result<StateShape, String> {
    let feat = value
        .as_object()
        .ok_or("feature must be an object".to_string())?;
    let feat_type = feat
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("feature missing type".to_string())?;
    if feat_type != "Feature" {
        return Err(format!("unexpected feature type: {feat_type}"));
    }

    let props = feat
        .get("properties")
        .and_then(|v| v.as_object())
        .ok_or("feature missing properties".to_string())?;
    let fips = match props.get(crate::income_table::FIPS_COLUMN) {
        Some(Value::Number(n)) => n.as_f64().and_then(|f| parse_fips(&f.to_string())),
        Some(Value::String(s)) => parse_fips(s),
        _ => None,
    }
    .ok_or("feature missing numeric STATE_FIPS".to_string())?;
    let abbr = props
        .get(ABBR_PROPERTY)
        .and_then(|v| v.as_str())
        .ok_or("feature missing STATE_ABBR".to_string())?
        .to_string();

    let geometry = feat
        .get("geometry")
        .ok_or("feature missing geometry".to_string())?;
    let parts = parse_geometry(geometry)?;
    if parts.is_empty() {
        return Err(format!("{abbr} has an empty geometry"));
    }

    Ok(StateShape { fips, abbr, parts })
}

fn parse_geometry(value: &Value) -> Result<Vec<Rings>, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;
    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Polygon" => Ok(vec![parse_polygon(coords)?]),
        "MultiPolygon" => parse_multi_polygon(coords),
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_point(coords: &Value) -> Result<Vec2, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [x, y]".to_string());
    }
    let x = arr[0].as_f64().ok_or("x must be a number".to_string())?;
    let y = arr[1].as_f64().ok_or("y must be a number".to_string())?;
    Ok(Vec2::new(x, y))
}

fn parse_ring(coords: &Value) -> Result<Vec<Vec2>, String> {
    let arr = coords
        .as_array()
        .ok_or("ring must be an array".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(parse_point(item)?);
    }
    Ok(out)
}

fn parse_polygon(coords: &Value) -> Result<Rings, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    let mut out = Vec::with_capacity(rings.len());
    for ring in rings {
        out.push(parse_ring(ring)?);
    }
    Ok(out)
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Rings>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    let mut out = Vec::with_capacity(polys.len());
    for poly in polys {
        out.push(parse_polygon(poly)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::StateShapes;
    use crate::error::FormatError;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"STATE_FIPS": "06", "STATE_ABBR": "CA"},
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}
            },
            {
                "type": "Feature",
                "properties": {"STATE_FIPS": 53, "STATE_ABBR": "WA"},
                "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[1,0],[2,0],[2,1],[1,1],[1,0]]],
                    [[[3,3],[4,3],[4,4],[3,3]]]
                ]}
            }
        ]
    }"#;

    #[test]
    fn parses_polygons_and_multipolygons() {
        let shapes = StateShapes::from_geojson_str(SAMPLE).expect("parse");
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes.shapes[0].fips, 6);
        assert_eq!(shapes.shapes[0].parts.len(), 1);
        let wa = shapes.by_fips(53).expect("WA present");
        assert_eq!(wa.abbr, "WA");
        assert_eq!(wa.parts.len(), 2);
        assert_eq!(wa.parts[1][0].len(), 4);
    }

    #[test]
    fn rejects_non_collection() {
        let err = StateShapes::from_geojson_str(r#"{"type":"Feature"}"#).unwrap_err();
        assert!(matches!(err, FormatError::NotAFeatureCollection));
    }

    #[test]
    fn reports_feature_index_for_missing_abbr() {
        let payload = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"STATE_FIPS":1},
             "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1]]]}}
        ]}"#;
        let err = StateShapes::from_geojson_str(payload).unwrap_err();
        match err {
            FormatError::InvalidFeature { index, reason } => {
                assert_eq!(index, 0);
                assert!(reason.contains("STATE_ABBR"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_point_geometry() {
        let payload = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"STATE_FIPS":1,"STATE_ABBR":"AL"},
             "geometry":{"type":"Point","coordinates":[0,0]}}
        ]}"#;
        let err = StateShapes::from_geojson_str(payload).unwrap_err();
        assert!(err.to_string().contains("unsupported geometry type: Point"));
    }
}
