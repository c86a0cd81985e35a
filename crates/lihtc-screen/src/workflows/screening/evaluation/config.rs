use super::{ScoreFactor, ScoringError};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Relative weight of each factor in the composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub basis_boost: f64,
    pub flood_risk: f64,
    pub competition_density: f64,
    pub rent_headroom: f64,
    pub land_cost: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            basis_boost: 30.0,
            flood_risk: 20.0,
            competition_density: 20.0,
            rent_headroom: 15.0,
            land_cost: 15.0,
        }
    }
}

impl ScoringWeights {
    /// Reads a (possibly partial) JSON weights file; absent keys keep defaults.
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, ScoringError> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(file)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, ScoringError> {
        let weights: Self = serde_json::from_reader(reader)?;
        weights.validate()?;
        Ok(weights)
    }

    pub fn weight_for(&self, factor: ScoreFactor) -> f64 {
        match factor {
            ScoreFactor::BasisBoost => self.basis_boost,
            ScoreFactor::FloodRisk => self.flood_risk,
            ScoreFactor::CompetitionDensity => self.competition_density,
            ScoreFactor::RentHeadroom => self.rent_headroom,
            ScoreFactor::LandCost => self.land_cost,
        }
    }

    pub fn total(&self) -> f64 {
        ScoreFactor::ordered()
            .into_iter()
            .map(|factor| self.weight_for(factor))
            .sum()
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        for factor in ScoreFactor::ordered() {
            let value = self.weight_for(factor);
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringError::InvalidWeight {
                    factor: factor.key(),
                    value,
                });
            }
        }
        if self.total() <= 0.0 {
            return Err(ScoringError::ZeroTotalWeight);
        }
        Ok(())
    }
}

/// Minimum composite score for each tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub priority: f64,
    pub viable: f64,
    pub marginal: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            priority: 75.0,
            viable: 55.0,
            marginal: 35.0,
        }
    }
}

impl TierThresholds {
    pub fn validate(&self) -> Result<(), ScoringError> {
        let ordered = self.priority >= self.viable && self.viable >= self.marginal;
        let in_range = [self.priority, self.viable, self.marginal]
            .iter()
            .all(|value| value.is_finite() && (0.0..=100.0).contains(value));
        if ordered && in_range {
            Ok(())
        } else {
            Err(ScoringError::InvalidThresholds)
        }
    }
}

/// Rubric configuration for the stage-two analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub weights: ScoringWeights,
    pub tiers: TierThresholds,
    /// Land price per acre that scores full marks.
    pub target_price_per_acre: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            tiers: TierThresholds::default(),
            target_price_per_acre: 400_000.0,
        }
    }
}

impl EvaluationConfig {
    pub fn validate(&self) -> Result<(), ScoringError> {
        self.weights.validate()?;
        self.tiers.validate()?;
        if !self.target_price_per_acre.is_finite() || self.target_price_per_acre <= 0.0 {
            return Err(ScoringError::InvalidTargetPrice(self.target_price_per_acre));
        }
        Ok(())
    }
}
