use super::super::domain::{FloodRisk, PropertyRecord, Tier};
use super::super::SiteFindings;
use super::config::TierThresholds;
use super::rules::rent_ratio;

pub fn decide_tier(total_score: f64, tiers: &TierThresholds) -> Tier {
    if total_score >= tiers.priority {
        Tier::Priority
    } else if total_score >= tiers.viable {
        Tier::Viable
    } else if total_score >= tiers.marginal {
        Tier::Marginal
    } else {
        Tier::Weak
    }
}

/// Non-fatal notes surfaced next to the score for analyst follow-up.
pub(crate) fn advisories(property: &PropertyRecord, findings: &SiteFindings) -> Vec<String> {
    let mut notes = Vec::new();

    if findings.flood.risk == FloodRisk::High {
        notes.push(match findings.flood.zone_label() {
            Some(zone) => format!("inside a Special Flood Hazard Area (zone {zone})"),
            None => "inside a Special Flood Hazard Area".to_string(),
        });
    }

    if let Some(nearest) = &findings.basis.nearest_qct {
        if !findings.basis.basis_boost() && nearest.distance_miles <= 0.5 {
            notes.push(format!(
                "QCT {} is {:.2} mi away; confirm tract boundaries",
                nearest.label, nearest.distance_miles
            ));
        }
    }

    if rent_ratio(property).is_none() {
        notes.push("rent data missing; rent headroom scored neutral".to_string());
    }
    if property.price_per_acre().is_none() {
        notes.push("price or acreage missing; land cost scored neutral".to_string());
    }

    notes
}
