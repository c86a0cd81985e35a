mod config;
mod policy;
mod rules;

pub use config::{EvaluationConfig, ScoringWeights, TierThresholds};
pub use policy::decide_tier;

use super::domain::{PropertyRecord, Tier};
use super::SiteFindings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("weight for {factor} must be a non-negative finite number, got {value}")]
    InvalidWeight { factor: &'static str, value: f64 },
    #[error("scoring weights sum to zero")]
    ZeroTotalWeight,
    #[error("tier thresholds must satisfy 100 >= priority >= viable >= marginal >= 0")]
    InvalidThresholds,
    #[error("target price per acre must be positive, got {0}")]
    InvalidTargetPrice(f64),
    #[error("failed to read weights file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse weights file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Factors contributing to the stage-two score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    BasisBoost,
    FloodRisk,
    CompetitionDensity,
    RentHeadroom,
    LandCost,
}

impl ScoreFactor {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::BasisBoost,
            Self::FloodRisk,
            Self::CompetitionDensity,
            Self::RentHeadroom,
            Self::LandCost,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::BasisBoost => "basis_boost",
            Self::FloodRisk => "flood_risk",
            Self::CompetitionDensity => "competition_density",
            Self::RentHeadroom => "rent_headroom",
            Self::LandCost => "land_cost",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::BasisBoost => "Basis boost",
            Self::FloodRisk => "Flood risk",
            Self::CompetitionDensity => "Competition density",
            Self::RentHeadroom => "Rent headroom",
            Self::LandCost => "Land cost",
        }
    }
}

/// Discrete contribution to a site score, kept for audit columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub weight: f64,
    /// Normalized factor score in `0.0..=1.0`.
    pub score: f64,
    /// Share of the 100-point total this factor earned.
    pub points: f64,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub total_score: f64,
    pub tier: Tier,
    pub components: Vec<ScoreComponent>,
    pub advisories: Vec<String>,
}

impl EvaluationOutcome {
    pub fn component(&self, factor: ScoreFactor) -> Option<&ScoreComponent> {
        self.components
            .iter()
            .find(|component| component.factor == factor)
    }
}

/// Stateless evaluator that applies the rubric configuration to a site.
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    config: EvaluationConfig,
}

impl EvaluationEngine {
    pub fn new(config: EvaluationConfig) -> Result<Self, ScoringError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn score(&self, property: &PropertyRecord, findings: &SiteFindings) -> EvaluationOutcome {
        let (components, total_score) = rules::score_site(property, findings, &self.config);
        let tier = decide_tier(total_score, &self.config.tiers);
        let advisories = policy::advisories(property, findings);

        EvaluationOutcome {
            total_score,
            tier,
            components,
            advisories,
        }
    }
}
