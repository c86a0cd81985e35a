use crate::workflows::screening::domain::{Tier, UsState};
use crate::workflows::screening::evaluation::ScoreFactor;
use crate::workflows::screening::ScreeningResult;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierCountEntry {
    pub tier: Tier,
    pub tier_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasonCountEntry {
    pub reason: &'static str,
    pub reason_label: &'static str,
    pub count: usize,
}

/// Flat output row; field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSiteRow {
    pub rank: Option<usize>,
    pub id: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub qct: Option<String>,
    pub dda: Option<String>,
    pub basis_boost: bool,
    pub nearest_qct: Option<String>,
    pub nearest_qct_miles: Option<f64>,
    pub flood_zone: Option<String>,
    pub flood_risk: Option<&'static str>,
    pub nearest_competitor: Option<String>,
    pub nearest_competitor_miles: Option<f64>,
    pub competitors_within_radius: Option<usize>,
    pub rule_violations: String,
    pub score_basis_boost: Option<f64>,
    pub score_flood_risk: Option<f64>,
    pub score_competition_density: Option<f64>,
    pub score_rent_headroom: Option<f64>,
    pub score_land_cost: Option<f64>,
    pub total_score: Option<f64>,
    pub tier: Option<&'static str>,
    pub eliminated_reason: Option<String>,
    pub advisories: String,
    pub warnings: String,
}

impl ScoredSiteRow {
    /// CSV header; mirrors the field order above.
    pub const COLUMNS: &'static [&'static str] = &[
        "rank",
        "id",
        "address",
        "city",
        "county",
        "state",
        "zip",
        "latitude",
        "longitude",
        "qct",
        "dda",
        "basis_boost",
        "nearest_qct",
        "nearest_qct_miles",
        "flood_zone",
        "flood_risk",
        "nearest_competitor",
        "nearest_competitor_miles",
        "competitors_within_radius",
        "rule_violations",
        "score_basis_boost",
        "score_flood_risk",
        "score_competition_density",
        "score_rent_headroom",
        "score_land_cost",
        "total_score",
        "tier",
        "eliminated_reason",
        "advisories",
        "warnings",
    ];

    pub fn from_result(result: &ScreeningResult) -> Self {
        let property = &result.property;
        let findings = result.findings.as_ref();
        let factor_score = |factor: ScoreFactor| {
            result
                .evaluation
                .as_ref()
                .and_then(|outcome| outcome.component(factor))
                .map(|component| round_to(component.score, 3))
        };

        Self {
            rank: result.rank,
            id: property.id.clone(),
            address: property.address.clone(),
            city: property.city.clone(),
            county: property.county.clone(),
            state: property.state.as_ref().map(UsState::to_string),
            zip: property.zip.clone(),
            latitude: property.coordinate.map(|c| c.lat),
            longitude: property.coordinate.map(|c| c.lon),
            qct: findings.and_then(|f| f.basis.qct.clone()),
            dda: findings.and_then(|f| f.basis.dda.clone()),
            basis_boost: result.basis_boost(),
            nearest_qct: findings
                .and_then(|f| f.basis.nearest_qct.as_ref())
                .map(|zone| zone.label.clone()),
            nearest_qct_miles: findings
                .and_then(|f| f.basis.nearest_qct.as_ref())
                .map(|zone| round_to(zone.distance_miles, 2)),
            flood_zone: findings.and_then(|f| f.flood.zone_label()),
            flood_risk: findings.map(|f| f.flood.risk.label()),
            nearest_competitor: findings
                .and_then(|f| f.competition.nearest.as_ref())
                .map(|nearest| nearest.name.clone()),
            nearest_competitor_miles: findings
                .and_then(|f| f.competition.nearest.as_ref())
                .map(|nearest| round_to(nearest.distance_miles, 2)),
            competitors_within_radius: findings.map(|f| f.competition.within_density_radius),
            rule_violations: findings
                .map(|f| f.competition.violation_summary())
                .unwrap_or_default(),
            score_basis_boost: factor_score(ScoreFactor::BasisBoost),
            score_flood_risk: factor_score(ScoreFactor::FloodRisk),
            score_competition_density: factor_score(ScoreFactor::CompetitionDensity),
            score_rent_headroom: factor_score(ScoreFactor::RentHeadroom),
            score_land_cost: factor_score(ScoreFactor::LandCost),
            total_score: result.total_score(),
            tier: result.tier().map(Tier::label),
            eliminated_reason: result.elimination.as_ref().map(|reason| reason.summary()),
            advisories: result
                .evaluation
                .as_ref()
                .map(|outcome| outcome.advisories.join("; "))
                .unwrap_or_default(),
            warnings: property.warnings.join("; "),
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
