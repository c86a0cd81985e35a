use super::basis_boost;
use super::competition::{CompetitionAnalyzer, CompetitionConfig, CompetitionSite};
use super::domain::{CreditType, PropertyRecord, UsState};
use super::evaluation::{EvaluationConfig, EvaluationEngine, ScoringError};
use super::flood;
use super::prefilter::{self, PrefilterConfig};
use super::{ScreeningResult, SiteFindings};
use crate::workflows::parcels::{fill_missing_coordinates, Geocoder};
use crate::workflows::reference::ReferenceData;
use crate::workflows::report::ScreeningSummary;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ScreeningConfig {
    pub competition: CompetitionConfig,
    pub prefilter: PrefilterConfig,
    pub evaluation: EvaluationConfig,
    /// Applied to rows whose state column is blank.
    pub default_state: Option<UsState>,
}

impl ScreeningConfig {
    pub fn new(application_year: i32, credit_type: CreditType) -> Self {
        Self {
            competition: CompetitionConfig::tdhca(application_year, credit_type),
            prefilter: PrefilterConfig::default(),
            evaluation: EvaluationConfig::default(),
            default_state: None,
        }
    }
}

/// Results of a full two-stage run, ranked rows first.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningRun {
    pub results: Vec<ScreeningResult>,
    pub summary: ScreeningSummary,
}

impl ScreeningRun {
    pub fn retained(&self) -> impl Iterator<Item = &ScreeningResult> {
        self.results.iter().filter(|result| result.is_retained())
    }

    pub fn eliminated(&self) -> impl Iterator<Item = &ScreeningResult> {
        self.results.iter().filter(|result| !result.is_retained())
    }

    pub fn top(&self, count: usize) -> impl Iterator<Item = &ScreeningResult> {
        self.retained().take(count)
    }
}

/// Joins properties against the reference layers and applies both stages.
pub struct ScreeningPipeline {
    reference: Arc<ReferenceData>,
    analyzer: CompetitionAnalyzer,
    engine: EvaluationEngine,
    prefilter: PrefilterConfig,
    default_state: Option<UsState>,
    geocoder: Option<Arc<dyn Geocoder>>,
}

impl ScreeningPipeline {
    pub fn new(reference: Arc<ReferenceData>, config: ScreeningConfig) -> Result<Self, ScoringError> {
        Ok(Self {
            reference,
            analyzer: CompetitionAnalyzer::new(config.competition),
            engine: EvaluationEngine::new(config.evaluation)?,
            prefilter: config.prefilter,
            default_state: config.default_state,
            geocoder: None,
        })
    }

    /// Fills blank coordinates before screening.
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn competition_config(&self) -> &CompetitionConfig {
        self.analyzer.config()
    }

    /// Spatial joins for a property. `None` when it has no usable coordinate.
    pub fn assess(&self, property: &PropertyRecord) -> Option<SiteFindings> {
        let coordinate = property.screenable_coordinate()?;
        let reference = self.reference.as_ref();

        let basis = basis_boost::designate(reference.qct.as_ref(), reference.dda.as_ref(), &coordinate);
        let flood = flood::assess(reference.flood.as_ref(), &coordinate);
        let site = CompetitionSite::for_property(property, coordinate);
        let competition = self.analyzer.analyze(&site, &reference.competitors);

        Some(SiteFindings {
            basis,
            flood,
            competition,
        })
    }

    /// Stage one only. Rows keep their input order and carry no score.
    pub fn prefilter(&self, properties: Vec<PropertyRecord>) -> Vec<ScreeningResult> {
        let properties = self.prepare(properties);
        let results: Vec<ScreeningResult> =
            properties.into_iter().map(|property| self.screen(property)).collect();

        let eliminated = results.iter().filter(|result| !result.is_retained()).count();
        info!(
            properties = results.len(),
            eliminated,
            retained = results.len() - eliminated,
            "prefilter complete"
        );
        results
    }

    /// Both stages: prefilter, score the survivors, then rank them.
    pub fn run(&self, properties: Vec<PropertyRecord>) -> ScreeningRun {
        let screened = self.prefilter(properties);
        let (mut retained, eliminated): (Vec<_>, Vec<_>) =
            screened.into_iter().partition(ScreeningResult::is_retained);

        for result in &mut retained {
            self.score(result);
        }

        retained.sort_by(ranking_order);
        for (index, result) in retained.iter_mut().enumerate() {
            result.rank = Some(index + 1);
        }

        let mut results = retained;
        results.extend(eliminated);
        let summary = ScreeningSummary::from_results(&results);
        info!(
            scored = summary.retained,
            mean_score = summary.mean_score.unwrap_or_default(),
            basis_boost = summary.basis_boost_count,
            "analysis complete"
        );

        ScreeningRun { results, summary }
    }

    /// Both stages for one property, without ranking. Backs point lookups.
    pub fn evaluate_one(&self, mut property: PropertyRecord) -> ScreeningResult {
        self.apply_default_state(&mut property);
        let mut result = self.screen(property);
        self.score(&mut result);
        result
    }

    fn prepare(&self, mut properties: Vec<PropertyRecord>) -> Vec<PropertyRecord> {
        for property in &mut properties {
            self.apply_default_state(property);
        }
        if let Some(geocoder) = &self.geocoder {
            let stats = fill_missing_coordinates(&mut properties, geocoder.as_ref());
            info!(
                attempted = stats.attempted,
                matched = stats.matched,
                failed = stats.failed,
                "geocoded missing coordinates"
            );
        }
        properties
    }

    fn apply_default_state(&self, property: &mut PropertyRecord) {
        if property.state.is_none() {
            property.state = self.default_state.clone();
        }
    }

    fn score(&self, result: &mut ScreeningResult) {
        if !result.is_retained() {
            return;
        }
        if let Some(findings) = &result.findings {
            result.evaluation = Some(self.engine.score(&result.property, findings));
        }
    }

    fn screen(&self, property: PropertyRecord) -> ScreeningResult {
        let findings = self.assess(&property);
        let elimination = prefilter::eliminate(&property, findings.as_ref(), &self.prefilter);
        if let Some(reason) = &elimination {
            debug!(property = %property.id, reason = reason.key(), "property eliminated");
        }

        ScreeningResult {
            property,
            findings,
            elimination,
            evaluation: None,
            rank: None,
        }
    }
}

/// Higher score first, then basis boost, then fewer nearby competitors, then id.
fn ranking_order(a: &ScreeningResult, b: &ScreeningResult) -> Ordering {
    let score = |result: &ScreeningResult| result.total_score().unwrap_or(f64::NEG_INFINITY);
    score(b)
        .total_cmp(&score(a))
        .then_with(|| b.basis_boost().cmp(&a.basis_boost()))
        .then_with(|| a.competitors_nearby().cmp(&b.competitors_nearby()))
        .then_with(|| a.property.id.cmp(&b.property.id))
}
