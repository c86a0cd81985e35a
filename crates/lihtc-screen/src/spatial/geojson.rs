use super::coordinate::Coordinate;
use super::polygon::{MultiPolygon, Polygon, Ring};
use super::SpatialError;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Unsupported,
}

/// Feature decoded from GeoJSON with stringified attributes.
#[derive(Debug)]
pub(crate) struct RawFeature {
    pub(crate) index: usize,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) geometry: MultiPolygon,
}

#[derive(Debug, Default)]
pub(crate) struct DecodedCollection {
    pub(crate) features: Vec<RawFeature>,
    pub(crate) skipped: usize,
}

pub(crate) fn decode_feature_collection<R: Read>(
    reader: R,
) -> Result<DecodedCollection, SpatialError> {
    let collection: FeatureCollection = serde_json::from_reader(reader)?;
    if collection.kind != "FeatureCollection" {
        return Err(SpatialError::NotFeatureCollection(collection.kind));
    }

    let mut decoded = DecodedCollection::default();
    for (index, feature) in collection.features.into_iter().enumerate() {
        let geometry = match feature.geometry {
            Some(Geometry::Polygon { coordinates }) => {
                MultiPolygon::from(polygon_from_rings(index, coordinates)?)
            }
            Some(Geometry::MultiPolygon { coordinates }) => {
                let polygons = coordinates
                    .into_iter()
                    .map(|rings| polygon_from_rings(index, rings))
                    .collect::<Result<Vec<_>, _>>()?;
                MultiPolygon::new(polygons)?
            }
            Some(Geometry::Unsupported) | None => {
                decoded.skipped += 1;
                continue;
            }
        };

        decoded.features.push(RawFeature {
            index,
            attributes: stringify_properties(feature.properties.unwrap_or_default()),
            geometry,
        });
    }

    Ok(decoded)
}

fn polygon_from_rings(feature: usize, rings: Vec<Vec<Vec<f64>>>) -> Result<Polygon, SpatialError> {
    let mut rings = rings
        .into_iter()
        .map(|positions| ring_from_positions(feature, positions))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter();
    let exterior = rings.next().ok_or(SpatialError::EmptyGeometry)?;
    Ok(Polygon::new(exterior, rings.collect()))
}

fn ring_from_positions(feature: usize, positions: Vec<Vec<f64>>) -> Result<Ring, SpatialError> {
    let points = positions
        .into_iter()
        .map(|position| match position.as_slice() {
            // GeoJSON positions are [lon, lat, (alt)]
            [lon, lat, ..] => Ok(Coordinate {
                lat: *lat,
                lon: *lon,
            }),
            _ => Err(SpatialError::InvalidPosition { feature }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ring::new(points)
}

fn stringify_properties(properties: Map<String, Value>) -> BTreeMap<String, String> {
    properties
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(text) => text,
                Value::Bool(flag) => flag.to_string(),
                Value::Number(number) => number.to_string(),
                other => other.to_string(),
            };
            Some((key, text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decodes_polygons_multipolygons_and_skips_other_geometry() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"GEOID": "48453001100", "QCT": 1},
                 "geometry": {"type": "Polygon", "coordinates": [[[-97.8,30.2],[-97.7,30.2],[-97.7,30.3],[-97.8,30.3],[-97.8,30.2]]]}},
                {"type": "Feature", "properties": null,
                 "geometry": {"type": "MultiPolygon", "coordinates": [[[[-96.9,32.7,0.0],[-96.8,32.7,0.0],[-96.8,32.8,0.0],[-96.9,32.7,0.0]]]]}},
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [-97.0, 30.0]}},
                {"type": "Feature", "properties": {}, "geometry": null}
            ]
        }"#;

        let decoded = decode_feature_collection(Cursor::new(json)).expect("decodes");
        assert_eq!(decoded.features.len(), 2);
        assert_eq!(decoded.skipped, 2);

        let first = &decoded.features[0];
        assert_eq!(first.index, 0);
        assert_eq!(first.attributes.get("GEOID").map(String::as_str), Some("48453001100"));
        assert_eq!(first.attributes.get("QCT").map(String::as_str), Some("1"));
        assert!(first.geometry.contains(&Coordinate {
            lat: 30.25,
            lon: -97.75
        }));
        assert!(decoded.features[1].attributes.is_empty());
    }

    #[test]
    fn rejects_non_collections_and_short_positions() {
        let err = decode_feature_collection(Cursor::new(r#"{"type": "Feature"}"#))
            .expect_err("not a collection");
        assert!(matches!(err, SpatialError::NotFeatureCollection(kind) if kind == "Feature"));

        let json = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Polygon", "coordinates": [[[-97.8],[-97.7,30.2],[-97.7,30.3]]]}}
        ]}"#;
        let err = decode_feature_collection(Cursor::new(json)).expect_err("bad position");
        assert!(matches!(err, SpatialError::InvalidPosition { feature: 0 }));
    }
}
