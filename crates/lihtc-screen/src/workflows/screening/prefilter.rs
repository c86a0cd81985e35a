use super::domain::{EliminationReason, FloodRisk, PropertyRecord};
use super::SiteFindings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrefilterConfig {
    /// Treat SFHA (A/V zone) sites as fatal rather than as a score penalty.
    pub flood_high_is_fatal: bool,
}

/// Stage-one gate. Returns the first fatal condition, checked in a fixed
/// order: state, coordinates, flood, competition.
pub fn eliminate(
    property: &PropertyRecord,
    findings: Option<&SiteFindings>,
    config: &PrefilterConfig,
) -> Option<EliminationReason> {
    match &property.state {
        None => return Some(EliminationReason::UnsupportedState(String::new())),
        Some(state) if !state.is_supported() => {
            return Some(EliminationReason::UnsupportedState(state.code().to_string()))
        }
        Some(_) => {}
    }

    let Some(findings) = findings else {
        return Some(EliminationReason::MissingCoordinates);
    };

    match findings.flood.risk {
        FloodRisk::Floodway => return Some(EliminationReason::Floodway),
        FloodRisk::High if config.flood_high_is_fatal => {
            return Some(EliminationReason::HighFloodRisk)
        }
        _ => {}
    }

    findings
        .competition
        .first_violated_rule()
        .map(EliminationReason::CompetitionRule)
}
