//! End-to-end screening runs through the public importer, pipeline and report APIs.

use std::io::Cursor;
use std::sync::Arc;

use lihtc_screen::spatial::ZoneLayer;
use lihtc_screen::workflows::parcels::{CensusBatchGeocoder, PropertyImporter};
use lihtc_screen::workflows::reference::ReferenceData;
use lihtc_screen::workflows::report::{render_html, write_csv, ReportHeading};
use lihtc_screen::workflows::screening::{
    CompetitionRule, CreditType, EliminationReason, ScreeningConfig, ScreeningPipeline, UsState,
};

const PROPERTIES: &str = "\
Property ID,Address,City,County,State,Zip,Latitude,Longitude,Acres,Asking Price,Market Rent,60% AMI Rent
A-1,100 Main St,Houston,Harris,TX,77002,29.75,-95.35,4,1000000,1350,1300
A-2,200 Bayou Rd,Houston,Harris,TX,77003,29.75,-95.15,5,900000,1300,1300
A-3,5 Ocean Ave,Santa Monica,Los Angeles,CA,90401,34.01,-118.49,2,4000000,2800,2100
A-4,9 Mesa Dr,Santa Fe,Santa Fe,NM,87501,35.68,-105.94,3,500000,,
A-5,400 Elm St,Houston,Harris,TX,77004,,,3,\"$750,000\",1200,1250
";

const COMPETITORS: &str = "\
Development Name,Latitude,Longitude,County,State,Award Year,Target Population,Total Units
Bayou Lofts,29.752,-95.352,Harris,TX,2021,General,90
";

const GEOCODER_RESULTS: &str = "\
\"A-5\",\"400 Elm St, Houston, TX, 77004\",\"Match\",\"Exact\",\"400 ELM ST, HOUSTON, TX, 77004\",\"-95.36,29.74\",\"76543210\",\"L\"
";

const QCT: &str = r#"{"type": "FeatureCollection", "features": [
    {"type": "Feature", "properties": {"GEOID": "48201100000"},
     "geometry": {"type": "Polygon", "coordinates": [[[-95.40,29.70],[-95.30,29.70],[-95.30,29.80],[-95.40,29.80],[-95.40,29.70]]]}}
]}"#;

const FLOOD: &str = r#"{"type": "FeatureCollection", "features": [
    {"type": "Feature", "properties": {"FLD_ZONE": "AE", "ZONE_SUBTY": "FLOODWAY"},
     "geometry": {"type": "Polygon", "coordinates": [[[-95.20,29.70],[-95.10,29.70],[-95.10,29.80],[-95.20,29.80],[-95.20,29.70]]]}}
]}"#;

fn pipeline() -> ScreeningPipeline {
    let reference = ReferenceData {
        qct: Some(ZoneLayer::from_geojson_reader("qct", Cursor::new(QCT)).expect("qct layer")),
        dda: None,
        flood: Some(
            ZoneLayer::from_geojson_reader("flood", Cursor::new(FLOOD)).expect("flood layer"),
        ),
        competitors: ReferenceData::competitors_from_reader(COMPETITORS.as_bytes())
            .expect("competitors parse"),
    };
    let geocoder =
        CensusBatchGeocoder::from_reader(GEOCODER_RESULTS.as_bytes()).expect("geocoder results");

    ScreeningPipeline::new(
        Arc::new(reference),
        ScreeningConfig::new(2025, CreditType::NinePercent),
    )
    .expect("valid config")
    .with_geocoder(Arc::new(geocoder))
}

#[test]
fn spreadsheet_run_ranks_survivors_and_keeps_eliminations() {
    let properties = PropertyImporter::from_reader(PROPERTIES.as_bytes()).expect("import");
    assert_eq!(properties.len(), 5);

    let run = pipeline().run(properties);

    let retained: Vec<&str> = run
        .retained()
        .map(|result| result.property.id.as_str())
        .collect();
    assert_eq!(retained.len(), 3);
    assert!(retained.contains(&"A-1"));
    assert!(retained.contains(&"A-3"));
    assert!(retained.contains(&"A-5"));

    let ranks: Vec<usize> = run.retained().filter_map(|result| result.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
    let scores: Vec<f64> = run
        .retained()
        .filter_map(|result| result.total_score())
        .collect();
    assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
    assert!(scores.iter().all(|score| (0.0..=100.0).contains(score)));

    let eliminated: Vec<(&str, Option<&EliminationReason>)> = run
        .eliminated()
        .map(|result| (result.property.id.as_str(), result.elimination.as_ref()))
        .collect();
    assert_eq!(
        eliminated,
        vec![
            ("A-2", Some(&EliminationReason::Floodway)),
            (
                "A-4",
                Some(&EliminationReason::UnsupportedState("NM".to_string()))
            ),
        ]
    );
    assert!(run.eliminated().all(|result| result.rank.is_none()));

    let geocoded = run
        .results
        .iter()
        .find(|result| result.property.id == "A-5")
        .expect("geocoded row present");
    assert!(geocoded.basis_boost());
    assert_eq!(geocoded.competitors_nearby(), 1);
    assert!(geocoded
        .property
        .warnings
        .iter()
        .any(|warning| warning.contains("geocoder")));

    assert_eq!(run.summary.total, 5);
    assert_eq!(run.summary.retained, 3);
    assert_eq!(run.summary.eliminated, 2);
    assert_eq!(run.summary.basis_boost_count, 2);
    assert!(run.summary.rows_with_warnings >= 1);
}

#[test]
fn reports_cover_every_row() {
    let properties = PropertyImporter::from_reader(PROPERTIES.as_bytes()).expect("import");
    let run = pipeline().run(properties);

    let mut buffer = Vec::new();
    let written = write_csv(&run.results, &mut buffer).expect("csv written");
    assert_eq!(written, 5);

    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    let headers = reader.headers().expect("header row").clone();
    assert_eq!(headers.get(0), Some("rank"));
    assert_eq!(headers.get(1), Some("id"));
    assert!(headers.iter().any(|header| header == "total_score"));

    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("rows parse");
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].get(0), Some("1"));
    assert_eq!(rows[4].get(0), Some(""));

    let page = render_html(&ReportHeading::new("Harris County sites"), &run.summary, &run.results)
        .expect("html renders");
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("Harris County sites"));
    assert!(page.contains("A-1"));
}

#[test]
fn default_state_rescues_rows_with_blank_state() {
    let csv = "\
Site ID,Latitude,Longitude
B-1,29.75,-95.35
";
    let properties = PropertyImporter::from_reader(csv.as_bytes()).expect("import");
    assert!(properties[0].state.is_none());

    let reference = Arc::new(ReferenceData::default());
    let strict = ScreeningPipeline::new(
        reference.clone(),
        ScreeningConfig::new(2025, CreditType::NinePercent),
    )
    .expect("valid config");
    let run = strict.run(properties.clone());
    assert_eq!(run.summary.retained, 0);

    let mut config = ScreeningConfig::new(2025, CreditType::NinePercent);
    config.default_state = Some(UsState::Texas);
    let lenient = ScreeningPipeline::new(reference, config).expect("valid config");
    let run = lenient.run(properties);
    assert_eq!(run.summary.retained, 1);
    assert_eq!(run.results[0].property.state, Some(UsState::Texas));
}

#[test]
fn flood_elimination_takes_precedence_over_competition() {
    const ZONES: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"FLD_ZONE": "AE", "ZONE_SUBTY": "FLOODWAY"},
         "geometry": {"type": "Polygon", "coordinates": [[[-95.40,29.70],[-95.35,29.70],[-95.35,29.80],[-95.40,29.80],[-95.40,29.70]]]}},
        {"type": "Feature", "properties": {"FLD_ZONE": "AE"},
         "geometry": {"type": "Polygon", "coordinates": [[[-95.35,29.70],[-95.30,29.70],[-95.30,29.80],[-95.35,29.80],[-95.35,29.70]]]}}
    ]}"#;
    const NEIGHBORS: &str = "\
Development Name,Latitude,Longitude,County,State,Award Year,Target Population
Creekside Commons,29.751,-95.350,Harris,TX,2024,General
";
    const SITES: &str = "\
Property ID,County,State,Latitude,Longitude
W-1,Harris,TX,29.75,-95.36
S-1,Harris,TX,29.75,-95.34
C-1,Harris,TX,29.76,-95.20
";

    let reference = Arc::new(ReferenceData {
        qct: None,
        dda: None,
        flood: Some(
            ZoneLayer::from_geojson_reader("flood", Cursor::new(ZONES)).expect("flood layer"),
        ),
        competitors: ReferenceData::competitors_from_reader(NEIGHBORS.as_bytes())
            .expect("competitors parse"),
    });
    let properties = PropertyImporter::from_reader(SITES.as_bytes()).expect("import");

    let reasons = |flood_high_is_fatal: bool| {
        let mut config = ScreeningConfig::new(2025, CreditType::NinePercent);
        config.prefilter.flood_high_is_fatal = flood_high_is_fatal;
        let pipeline = ScreeningPipeline::new(reference.clone(), config).expect("valid config");
        let run = pipeline.run(properties.clone());
        let mut reasons: Vec<(String, Option<EliminationReason>)> = run
            .results
            .into_iter()
            .map(|result| (result.property.id, result.elimination))
            .collect();
        reasons.sort_by(|a, b| a.0.cmp(&b.0));
        reasons
    };

    let conflict = Some(EliminationReason::CompetitionRule(
        CompetitionRule::OneMileThreeYear,
    ));

    // Both flooded sites sit within a mile of the 2024 award.
    assert_eq!(
        reasons(false),
        vec![
            ("C-1".to_string(), None),
            ("S-1".to_string(), conflict),
            ("W-1".to_string(), Some(EliminationReason::Floodway)),
        ]
    );
    assert_eq!(
        reasons(true),
        vec![
            ("C-1".to_string(), None),
            ("S-1".to_string(), Some(EliminationReason::HighFloodRisk)),
            ("W-1".to_string(), Some(EliminationReason::Floodway)),
        ]
    );
}
