mod config;
mod rules;

pub use config::{CompetitionConfig, DEFAULT_LARGE_COUNTIES};

use super::domain::{
    CompetitionRule, CompetitorProject, PropertyRecord, RuleViolation, TargetPopulation, UsState,
};
use crate::spatial::Coordinate;
use serde::{Deserialize, Serialize};

/// Site attributes the competition rules look at.
#[derive(Debug, Clone, Copy)]
pub struct CompetitionSite<'a> {
    pub coordinate: Coordinate,
    pub state: Option<&'a UsState>,
    pub county: Option<&'a str>,
    pub population: TargetPopulation,
}

impl<'a> CompetitionSite<'a> {
    pub fn for_property(property: &'a PropertyRecord, coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            state: property.state.as_ref(),
            county: property.county.as_deref(),
            population: property.population,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyCompetitor {
    pub name: String,
    pub distance_miles: f64,
    pub award_year: Option<i32>,
}

/// Competition picture around a site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitionFinding {
    pub violations: Vec<RuleViolation>,
    pub nearest: Option<NearbyCompetitor>,
    pub within_density_radius: usize,
    pub density_radius_miles: f64,
}

impl CompetitionFinding {
    pub fn has_violation(&self) -> bool {
        !self.violations.is_empty()
    }

    pub fn first_violated_rule(&self) -> Option<CompetitionRule> {
        self.violations.first().map(|violation| violation.rule)
    }

    pub fn violation_summary(&self) -> String {
        self.violations
            .iter()
            .map(RuleViolation::summary)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Stateless analyzer applying the configured rule set to a site.
#[derive(Debug, Clone)]
pub struct CompetitionAnalyzer {
    config: CompetitionConfig,
}

impl CompetitionAnalyzer {
    pub fn new(config: CompetitionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompetitionConfig {
        &self.config
    }

    pub fn analyze(
        &self,
        site: &CompetitionSite<'_>,
        competitors: &[CompetitorProject],
    ) -> CompetitionFinding {
        rules::evaluate_site(site, competitors, &self.config)
    }
}
