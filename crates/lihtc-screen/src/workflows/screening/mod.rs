pub mod basis_boost;
pub mod competition;
pub mod domain;
pub mod evaluation;
pub mod flood;
pub mod pipeline;
pub mod prefilter;
pub mod router;

pub use basis_boost::{BasisBoostFinding, NearbyZone};
pub use competition::{
    CompetitionAnalyzer, CompetitionConfig, CompetitionFinding, CompetitionSite, NearbyCompetitor,
};
pub use domain::{
    CompetitionRule, CompetitorProject, CreditType, EliminationReason, FloodRisk, PropertyRecord,
    RuleViolation, TargetPopulation, Tier, UsState,
};
pub use evaluation::{
    EvaluationConfig, EvaluationEngine, EvaluationOutcome, ScoreComponent, ScoreFactor,
    ScoringError, ScoringWeights, TierThresholds,
};
pub use flood::{classify_zone, FloodFinding};
pub use pipeline::{ScreeningConfig, ScreeningPipeline, ScreeningRun};
pub use prefilter::PrefilterConfig;
pub use router::{screening_router, EvaluateRequest, EvaluateResponse, LocateRequest};

use serde::{Deserialize, Serialize};

/// Spatial facts gathered for one coordinate before any scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteFindings {
    pub basis: BasisBoostFinding,
    pub flood: FloodFinding,
    pub competition: CompetitionFinding,
}

/// Outcome of screening a single property through both stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub property: PropertyRecord,
    pub findings: Option<SiteFindings>,
    pub elimination: Option<EliminationReason>,
    pub evaluation: Option<EvaluationOutcome>,
    pub rank: Option<usize>,
}

impl ScreeningResult {
    pub fn is_retained(&self) -> bool {
        self.elimination.is_none()
    }

    pub fn total_score(&self) -> Option<f64> {
        self.evaluation.as_ref().map(|outcome| outcome.total_score)
    }

    pub fn tier(&self) -> Option<Tier> {
        self.evaluation.as_ref().map(|outcome| outcome.tier)
    }

    pub fn basis_boost(&self) -> bool {
        self.findings
            .as_ref()
            .map(|findings| findings.basis.basis_boost())
            .unwrap_or(false)
    }

    pub fn competitors_nearby(&self) -> usize {
        self.findings
            .as_ref()
            .map(|findings| findings.competition.within_density_radius)
            .unwrap_or(0)
    }
}
