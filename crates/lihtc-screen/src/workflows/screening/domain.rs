use crate::spatial::Coordinate;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// States whose allocation rules the screen understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UsState {
    Texas,
    California,
    Unsupported(String),
}

impl UsState {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "tx" | "texas" => Self::Texas,
            "ca" | "california" => Self::California,
            _ => Self::Unsupported(trimmed.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Texas => "TX",
            Self::California => "CA",
            Self::Unsupported(raw) => raw,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl From<String> for UsState {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<UsState> for String {
    fn from(value: UsState) -> Self {
        value.code().to_string()
    }
}

impl fmt::Display for UsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Tenant population a development serves. Drives the one-mile rule's
/// "same population" test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPopulation {
    #[default]
    General,
    Elderly,
    Supportive,
}

impl TargetPopulation {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" => None,
            "general" | "family" | "gen" => Some(Self::General),
            "elderly" | "senior" | "seniors" | "qualified elderly" | "eld" => Some(Self::Elderly),
            "supportive" | "supportive housing" | "psh" => Some(Self::Supportive),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Elderly => "Elderly",
            Self::Supportive => "Supportive",
        }
    }

    /// Developments conflict when they serve the same population or either
    /// side is open to the general population.
    pub fn conflicts_with(self, other: TargetPopulation) -> bool {
        self == other || self == Self::General || other == Self::General
    }
}

/// Housing tax credit flavor sought by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditType {
    /// Competitive 9% credits.
    #[default]
    NinePercent,
    /// Non-competitive 4% credits paired with tax-exempt bonds.
    FourPercent,
}

impl CreditType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().trim_end_matches('%').to_ascii_lowercase().as_str() {
            "9" | "nine" | "nine_percent" | "competitive" => Some(Self::NinePercent),
            "4" | "four" | "four_percent" | "bond" => Some(Self::FourPercent),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NinePercent => "9%",
            Self::FourPercent => "4%",
        }
    }
}

/// Candidate parcel as read from the input spreadsheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub id: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub state: Option<UsState>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
    #[serde(default)]
    pub acres: Option<f64>,
    #[serde(default)]
    pub asking_price: Option<f64>,
    #[serde(default)]
    pub market_rent: Option<f64>,
    #[serde(default)]
    pub ami_rent_limit: Option<f64>,
    #[serde(default)]
    pub population: TargetPopulation,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl PropertyRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: None,
            city: None,
            county: None,
            state: None,
            zip: None,
            coordinate: None,
            acres: None,
            asking_price: None,
            market_rent: None,
            ami_rent_limit: None,
            population: TargetPopulation::General,
            warnings: Vec::new(),
        }
    }

    /// Coordinate usable for spatial joins, if any.
    pub fn screenable_coordinate(&self) -> Option<Coordinate> {
        self.coordinate.filter(Coordinate::is_valid)
    }

    /// One-line address suitable for geocoder lookups.
    pub fn one_line_address(&self) -> Option<String> {
        let street = self.address.as_deref()?.trim();
        if street.is_empty() {
            return None;
        }
        let state = self.state.as_ref().map(UsState::code);
        let parts: Vec<&str> = [Some(street), self.city.as_deref(), state, self.zip.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .collect();
        Some(parts.join(", "))
    }

    pub fn price_per_acre(&self) -> Option<f64> {
        match (self.asking_price, self.acres) {
            (Some(price), Some(acres)) if acres > 0.0 && price >= 0.0 => Some(price / acres),
            _ => None,
        }
    }
}

/// Existing or awarded tax credit development used in competition checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorProject {
    pub name: String,
    pub coordinate: Coordinate,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub state: Option<UsState>,
    #[serde(default)]
    pub award_year: Option<i32>,
    #[serde(default)]
    pub placed_in_service: Option<NaiveDate>,
    #[serde(default)]
    pub population: TargetPopulation,
    #[serde(default)]
    pub units: Option<u32>,
}

impl CompetitorProject {
    /// Award year, falling back to the placed-in-service year.
    pub fn effective_year(&self) -> Option<i32> {
        self.award_year
            .or_else(|| self.placed_in_service.map(|date| date.year()))
    }
}

/// FEMA flood hazard classification, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloodRisk {
    Minimal,
    Unknown,
    Moderate,
    Undetermined,
    High,
    Floodway,
}

impl FloodRisk {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Minimal => "Minimal",
            Self::Unknown => "Unknown",
            Self::Moderate => "Moderate",
            Self::Undetermined => "Undetermined",
            Self::High => "High (SFHA)",
            Self::Floodway => "Floodway",
        }
    }
}

/// TDHCA competition rules evaluated against nearby awards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionRule {
    OneMileThreeYear,
    TwoMileSameYear,
}

impl CompetitionRule {
    pub const fn label(self) -> &'static str {
        match self {
            Self::OneMileThreeYear => "One Mile Three Year",
            Self::TwoMileSameYear => "Two Mile Same Year",
        }
    }
}

/// Concrete competitor that triggered a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub rule: CompetitionRule,
    pub competitor: String,
    pub distance_miles: f64,
    pub award_year: i32,
}

impl RuleViolation {
    pub fn summary(&self) -> String {
        format!(
            "{}: {} ({:.2} mi, awarded {})",
            self.rule.label(),
            self.competitor,
            self.distance_miles,
            self.award_year
        )
    }
}

/// Why the pre-filter removed a property from scoring.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationReason {
    UnsupportedState(String),
    MissingCoordinates,
    Floodway,
    HighFloodRisk,
    CompetitionRule(CompetitionRule),
}

impl EliminationReason {
    pub fn summary(&self) -> String {
        match self {
            Self::UnsupportedState(state) if state.is_empty() => "state missing".to_string(),
            Self::UnsupportedState(state) => format!("unsupported state '{state}'"),
            Self::MissingCoordinates => "missing or invalid coordinates".to_string(),
            Self::Floodway => "inside regulatory floodway".to_string(),
            Self::HighFloodRisk => "inside special flood hazard area".to_string(),
            Self::CompetitionRule(rule) => format!("violates {} rule", rule.label()),
        }
    }

    /// Stable key used when aggregating eliminations.
    pub fn key(&self) -> &'static str {
        match self {
            Self::UnsupportedState(_) => "unsupported_state",
            Self::MissingCoordinates => "missing_coordinates",
            Self::Floodway => "floodway",
            Self::HighFloodRisk => "high_flood_risk",
            Self::CompetitionRule(CompetitionRule::OneMileThreeYear) => "one_mile_three_year",
            Self::CompetitionRule(CompetitionRule::TwoMileSameYear) => "two_mile_same_year",
        }
    }
}

/// Feasibility tier assigned from the weighted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Priority,
    Viable,
    Marginal,
    Weak,
}

impl Tier {
    pub const fn ordered() -> [Self; 4] {
        [Self::Priority, Self::Viable, Self::Marginal, Self::Weak]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Priority => "Priority",
            Self::Viable => "Viable",
            Self::Marginal => "Marginal",
            Self::Weak => "Weak",
        }
    }
}
