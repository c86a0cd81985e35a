use super::super::domain::{FloodRisk, PropertyRecord};
use super::super::SiteFindings;
use super::config::EvaluationConfig;
use super::{ScoreComponent, ScoreFactor};

const NEUTRAL: f64 = 0.5;
const RENT_RATIO_FLOOR: f64 = 0.7;
const LAND_COST_CEILING_MULTIPLE: f64 = 3.0;

pub(crate) fn score_site(
    property: &PropertyRecord,
    findings: &SiteFindings,
    config: &EvaluationConfig,
) -> (Vec<ScoreComponent>, f64) {
    let mut components = Vec::with_capacity(5);

    let (score, notes) = basis_boost(findings);
    components.push(component(ScoreFactor::BasisBoost, score, notes, config));

    let (score, notes) = flood(findings);
    components.push(component(ScoreFactor::FloodRisk, score, notes, config));

    let count = findings.competition.within_density_radius;
    components.push(component(
        ScoreFactor::CompetitionDensity,
        1.0 / (1.0 + count as f64),
        format!(
            "{count} tax credit project(s) within {:.1} mi",
            findings.competition.density_radius_miles
        ),
        config,
    ));

    let (score, notes) = rent_headroom(property);
    components.push(component(ScoreFactor::RentHeadroom, score, notes, config));

    let (score, notes) = land_cost(property, config.target_price_per_acre);
    components.push(component(ScoreFactor::LandCost, score, notes, config));

    let points: f64 = components.iter().map(|component| component.points).sum();
    let total = (points * 10.0).round() / 10.0;

    (components, total.clamp(0.0, 100.0))
}

fn component(
    factor: ScoreFactor,
    score: f64,
    notes: String,
    config: &EvaluationConfig,
) -> ScoreComponent {
    let weight = config.weights.weight_for(factor);
    let score = score.clamp(0.0, 1.0);
    ScoreComponent {
        factor,
        weight,
        score,
        points: 100.0 * weight * score / config.weights.total(),
        notes,
    }
}

fn basis_boost(findings: &SiteFindings) -> (f64, String) {
    let basis = &findings.basis;
    match (&basis.qct, &basis.dda) {
        (Some(qct), Some(dda)) => (1.0, format!("inside QCT {qct} and DDA {dda}")),
        (Some(qct), None) => (1.0, format!("inside QCT {qct}")),
        (None, Some(dda)) => (1.0, format!("inside DDA {dda}")),
        (None, None) => (0.0, "no QCT/DDA basis boost".to_string()),
    }
}

fn flood(findings: &SiteFindings) -> (f64, String) {
    let risk = findings.flood.risk;
    let score = match risk {
        FloodRisk::Minimal => 1.0,
        FloodRisk::Unknown => NEUTRAL,
        FloodRisk::Moderate => 0.6,
        FloodRisk::Undetermined => 0.4,
        FloodRisk::High | FloodRisk::Floodway => 0.0,
    };
    let notes = match findings.flood.zone_label() {
        Some(zone) => format!("{} flood risk (zone {zone})", risk.label()),
        None => format!("{} flood risk", risk.label()),
    };
    (score, notes)
}

/// Market rent over the AMI limit; `None` unless both are positive.
pub(crate) fn rent_ratio(property: &PropertyRecord) -> Option<f64> {
    match (property.market_rent, property.ami_rent_limit) {
        (Some(market), Some(limit)) if market > 0.0 && limit > 0.0 => Some(market / limit),
        _ => None,
    }
}

fn rent_headroom(property: &PropertyRecord) -> (f64, String) {
    match rent_ratio(property) {
        Some(ratio) => {
            let score = if ratio >= 1.0 {
                1.0
            } else if ratio <= RENT_RATIO_FLOOR {
                0.0
            } else {
                (ratio - RENT_RATIO_FLOOR) / (1.0 - RENT_RATIO_FLOOR)
            };
            (
                score,
                format!("market rent is {:.0}% of the 60% AMI limit", ratio * 100.0),
            )
        }
        None => (
            NEUTRAL,
            "rent data missing; scored neutral".to_string(),
        ),
    }
}

fn land_cost(property: &PropertyRecord, target: f64) -> (f64, String) {
    match property.price_per_acre() {
        Some(per_acre) => {
            let ceiling = target * LAND_COST_CEILING_MULTIPLE;
            let score = if per_acre <= target {
                1.0
            } else if per_acre >= ceiling {
                0.0
            } else {
                1.0 - (per_acre - target) / (ceiling - target)
            };
            (score, format!("${per_acre:.0} per acre"))
        }
        None => (
            NEUTRAL,
            "price or acreage missing; scored neutral".to_string(),
        ),
    }
}
