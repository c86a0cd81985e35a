use super::super::domain::CreditType;
use serde::{Deserialize, Serialize};

/// Counties over one million residents where the two-mile same-year rule applies.
pub const DEFAULT_LARGE_COUNTIES: &[&str] = &["Harris", "Dallas", "Tarrant", "Bexar", "Travis"];

/// Distance and timing dials for the TDHCA competition rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionConfig {
    pub application_year: i32,
    pub credit_type: CreditType,
    pub one_mile_radius_miles: f64,
    pub one_mile_lookback_years: i32,
    pub two_mile_radius_miles: f64,
    pub large_counties: Vec<String>,
    pub density_radius_miles: f64,
}

impl CompetitionConfig {
    pub fn tdhca(application_year: i32, credit_type: CreditType) -> Self {
        Self {
            application_year,
            credit_type,
            one_mile_radius_miles: 1.0,
            one_mile_lookback_years: 3,
            two_mile_radius_miles: 2.0,
            large_counties: DEFAULT_LARGE_COUNTIES
                .iter()
                .map(|county| county.to_string())
                .collect(),
            density_radius_miles: 2.0,
        }
    }

    pub fn is_large_county(&self, county: &str) -> bool {
        let county = normalize_county(county);
        self.large_counties
            .iter()
            .any(|candidate| normalize_county(candidate) == county)
    }
}

fn normalize_county(value: &str) -> String {
    let lowered = value.trim().to_ascii_lowercase();
    lowered
        .strip_suffix(" county")
        .unwrap_or(&lowered)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_county_match_ignores_case_and_suffix() {
        let config = CompetitionConfig::tdhca(2025, CreditType::NinePercent);
        assert!(config.is_large_county("HARRIS COUNTY"));
        assert!(config.is_large_county(" travis "));
        assert!(!config.is_large_county("Williamson"));
    }
}
