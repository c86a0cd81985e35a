use crate::cli::ReferenceArgs;
use lihtc_screen::config::{self, AppConfig, ScreeningSettings};
use lihtc_screen::error::AppError;
use lihtc_screen::telemetry;
use lihtc_screen::workflows::parcels::CensusBatchGeocoder;
use lihtc_screen::workflows::reference::ReferenceData;
use lihtc_screen::workflows::screening::{
    CreditType, ScoringWeights, ScreeningConfig, ScreeningPipeline, TargetPopulation, UsState,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads configuration and installs logging for a CLI command.
pub(crate) fn bootstrap() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

/// Command-line flags win over the environment.
pub(crate) fn apply_overrides(settings: &mut ScreeningSettings, args: &ReferenceArgs) {
    let reference = &mut settings.reference;
    if let Some(path) = &args.qct {
        reference.qct = Some(path.clone());
    }
    if let Some(path) = &args.dda {
        reference.dda = Some(path.clone());
    }
    if let Some(path) = &args.flood {
        reference.flood = Some(path.clone());
    }
    if let Some(path) = &args.competitors {
        reference.competitors = Some(path.clone());
    }
    if let Some(year) = args.application_year {
        settings.application_year = year;
    }
    if let Some(credit_type) = args.credit_type {
        settings.credit_type = credit_type;
    }
    if let Some(state) = &args.default_state {
        settings.default_state = Some(UsState::parse(state));
    }
    if args.flood_high_is_fatal {
        settings.flood_high_is_fatal = true;
    }
}

pub(crate) fn build_pipeline(settings: &ScreeningSettings) -> Result<ScreeningPipeline, AppError> {
    let reference = ReferenceData::load(&settings.reference)?;

    let mut config = ScreeningConfig::new(settings.application_year, settings.credit_type);
    config.prefilter.flood_high_is_fatal = settings.flood_high_is_fatal;
    config.default_state = settings.default_state.clone();
    if let Some(path) = &settings.weights_path {
        config.evaluation.weights = ScoringWeights::from_json_path(path)?;
    }

    let mut pipeline = ScreeningPipeline::new(Arc::new(reference), config)?;

    if let Some(path) = &settings.geocode_results {
        let geocoder = CensusBatchGeocoder::from_path(path)?;
        info!(path = %path.display(), matches = geocoder.len(), "loaded geocoder results");
        pipeline = pipeline.with_geocoder(Arc::new(geocoder));
    }

    Ok(pipeline)
}

pub(crate) fn parse_application_year(raw: &str) -> Result<i32, String> {
    config::parse_application_year(raw)
        .ok_or_else(|| format!("invalid application year '{raw}' (expected 1987-2100)"))
}

pub(crate) fn parse_credit_type(raw: &str) -> Result<CreditType, String> {
    CreditType::parse(raw).ok_or_else(|| format!("unknown credit type '{raw}' (expected 9 or 4)"))
}

pub(crate) fn parse_population(raw: &str) -> Result<TargetPopulation, String> {
    TargetPopulation::parse(raw).ok_or_else(|| {
        format!("unknown population '{raw}' (expected general, elderly or supportive)")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lihtc_screen::workflows::reference::ReferencePaths;
    use std::path::PathBuf;

    fn settings() -> ScreeningSettings {
        ScreeningSettings {
            reference: ReferencePaths::default(),
            geocode_results: None,
            application_year: 2024,
            credit_type: CreditType::NinePercent,
            weights_path: None,
            flood_high_is_fatal: false,
            default_state: None,
        }
    }

    #[test]
    fn overrides_replace_only_supplied_values() {
        let mut settings = settings();
        settings.reference.dda = Some(PathBuf::from("env-dda.geojson"));

        let args = ReferenceArgs {
            qct: Some(PathBuf::from("qct.geojson")),
            application_year: Some(2026),
            default_state: Some("texas".to_string()),
            ..ReferenceArgs::default()
        };
        apply_overrides(&mut settings, &args);

        assert_eq!(settings.reference.qct, Some(PathBuf::from("qct.geojson")));
        assert_eq!(settings.reference.dda, Some(PathBuf::from("env-dda.geojson")));
        assert_eq!(settings.application_year, 2026);
        assert_eq!(settings.credit_type, CreditType::NinePercent);
        assert_eq!(settings.default_state, Some(UsState::Texas));
        assert!(!settings.flood_high_is_fatal);
    }

    #[test]
    fn builds_pipeline_without_reference_layers() {
        let pipeline = build_pipeline(&settings()).expect("empty reference data is allowed");
        assert_eq!(pipeline.competition_config().application_year, 2024);
    }

    #[test]
    fn missing_weights_file_is_an_error() {
        let mut settings = settings();
        settings.weights_path = Some(PathBuf::from("/nonexistent/weights.json"));
        assert!(matches!(
            build_pipeline(&settings),
            Err(AppError::Scoring(_))
        ));
    }
}
