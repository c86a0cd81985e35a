use crate::spatial::{Coordinate, ZoneLayer};
use serde::{Deserialize, Serialize};

/// Federal basis-boost designations covering a site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasisBoostFinding {
    /// Label of the containing Qualified Census Tract.
    pub qct: Option<String>,
    /// Label of the containing Difficult Development Area.
    pub dda: Option<String>,
    /// Closest QCT when the site sits outside every tract.
    pub nearest_qct: Option<NearbyZone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyZone {
    pub label: String,
    pub distance_miles: f64,
}

impl BasisBoostFinding {
    pub fn in_qct(&self) -> bool {
        self.qct.is_some()
    }

    pub fn in_dda(&self) -> bool {
        self.dda.is_some()
    }

    /// Eligible for the 130% basis boost when inside a QCT or a DDA.
    pub fn basis_boost(&self) -> bool {
        self.in_qct() || self.in_dda()
    }
}

pub(crate) fn designate(
    qct: Option<&ZoneLayer>,
    dda: Option<&ZoneLayer>,
    point: &Coordinate,
) -> BasisBoostFinding {
    let qct_hit = qct.and_then(|layer| layer.locate(point));
    let nearest_qct = match (qct, qct_hit) {
        (Some(layer), None) => layer.nearest(point).map(|nearest| NearbyZone {
            label: nearest.feature.label.clone(),
            distance_miles: nearest.distance_miles,
        }),
        _ => None,
    };

    BasisBoostFinding {
        qct: qct_hit.map(|feature| feature.label.clone()),
        dda: dda
            .and_then(|layer| layer.locate(point))
            .map(|feature| feature.label.clone()),
        nearest_qct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn square_layer(name: &str, label: &str, min_lon: f64, min_lat: f64) -> ZoneLayer {
        let json = format!(
            r#"{{"type": "FeatureCollection", "features": [{{"type": "Feature",
                "properties": {{"GEOID": "{label}"}},
                "geometry": {{"type": "Polygon", "coordinates": [[[{a},{b}],[{c},{b}],[{c},{d}],[{a},{d}],[{a},{b}]]]}}}}]}}"#,
            a = min_lon,
            b = min_lat,
            c = min_lon + 0.1,
            d = min_lat + 0.1,
        );
        ZoneLayer::from_geojson_reader(name, Cursor::new(json)).expect("layer loads")
    }

    #[test]
    fn basis_boost_follows_either_designation() {
        let qct = square_layer("qct", "48453001100", -97.8, 30.2);
        let dda = square_layer("dda", "Austin-Round Rock", -97.75, 30.25);

        let both = designate(Some(&qct), Some(&dda), &Coordinate { lat: 30.27, lon: -97.72 });
        assert!(both.in_qct() && both.in_dda() && both.basis_boost());
        assert!(both.nearest_qct.is_none());

        let dda_only = designate(Some(&qct), Some(&dda), &Coordinate { lat: 30.33, lon: -97.66 });
        assert!(!dda_only.in_qct());
        assert_eq!(dda_only.dda.as_deref(), Some("Austin-Round Rock"));
        assert!(dda_only.basis_boost());
        let nearest = dda_only.nearest_qct.expect("nearest tract reported");
        assert_eq!(nearest.label, "48453001100");
        assert!(nearest.distance_miles > 0.0);

        let neither = designate(Some(&qct), Some(&dda), &Coordinate { lat: 31.0, lon: -97.0 });
        assert!(!neither.basis_boost());
    }

    #[test]
    fn missing_layers_never_grant_a_boost() {
        let finding = designate(None, None, &Coordinate { lat: 30.27, lon: -97.72 });
        assert!(!finding.basis_boost());
        assert!(finding.nearest_qct.is_none());
    }
}
