use crate::workflows::parcels::mapping::{Column, HeaderIndex};
use crate::workflows::parcels::parser::{
    csv_reader, is_blank, read_coordinate, read_number, read_population,
};
use crate::workflows::parcels::ImportError;
use crate::workflows::screening::domain::{CompetitorProject, UsState};
use chrono::{Datelike, NaiveDate};
use std::io::Read;
use tracing::warn;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%Y/%m/%d"];

/// Parses an awarded/existing project list. Rows without a usable location
/// cannot take part in distance checks and are skipped with a log line.
pub(crate) fn parse_competitors<R: Read>(reader: R) -> Result<Vec<CompetitorProject>, ImportError> {
    let mut csv_reader = csv_reader(reader);
    let index = HeaderIndex::from_headers(csv_reader.headers()?);

    if !(index.contains(Column::Latitude) && index.contains(Column::Longitude)) {
        return Err(ImportError::MissingColumns("latitude, longitude".to_string()));
    }

    let mut projects = Vec::new();
    for (offset, record) in csv_reader.records().enumerate() {
        let record = record?;
        if is_blank(&record) {
            continue;
        }
        let row_number = offset + 1;
        let name = index
            .get(&record, Column::Name)
            .or_else(|| index.get(&record, Column::Id))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Project {row_number}"));

        let mut warnings = Vec::new();
        let Some(coordinate) = read_coordinate(&index, &record, &mut warnings) else {
            warn!(row = row_number, project = %name, "skipping competitor without coordinates");
            continue;
        };

        let units = read_number(&index, &record, Column::Units, "units", &mut warnings)
            .filter(|units| *units >= 0.0)
            .map(|units| units.round() as u32);

        let project = CompetitorProject {
            name,
            coordinate,
            county: index.get(&record, Column::County).map(str::to_string),
            state: index.get(&record, Column::State).map(UsState::parse),
            award_year: index.get(&record, Column::AwardYear).and_then(parse_year),
            placed_in_service: index
                .get(&record, Column::PlacedInService)
                .and_then(parse_date),
            population: read_population(&index, &record, &mut warnings),
            units,
        };
        for warning in &warnings {
            warn!(row = row_number, project = %project.name, "{warning}");
        }
        projects.push(project);
    }

    Ok(projects)
}

fn parse_year(value: &str) -> Option<i32> {
    match value.parse::<i32>() {
        Ok(year) => Some(year),
        Err(_) => parse_date(value).map(|date| date.year()),
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
    {
        return Some(date);
    }
    value
        .parse::<i32>()
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::screening::domain::TargetPopulation;

    const PROJECTS: &str = "Development Name,Project City,Project County,Project State,Latitude,Longitude,Year Awarded,Placed in Service Date,Population Served,Total Units\n\
        Bayou Commons,Houston,Harris,TX,29.7601,-95.3701,2023,,General,120\n\
        Oak Senior Villas,Houston,Harris,TX,29.80,-95.40,,06/30/2019,Elderly,80\n\
        Lost Pin,Houston,Harris,TX,,,2024,,,\n\
        ,Dallas,Dallas,TX,32.78,-96.80,2025-03-01,,PSH,abc\n";

    #[test]
    fn parses_projects_and_normalizes_years() {
        let projects = parse_competitors(PROJECTS.as_bytes()).expect("parse");
        let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Bayou Commons", "Oak Senior Villas", "Project 4"]);

        assert_eq!(projects[0].award_year, Some(2023));
        assert_eq!(projects[0].units, Some(120));
        assert_eq!(projects[0].state, Some(UsState::Texas));

        assert_eq!(projects[1].award_year, None);
        assert_eq!(projects[1].effective_year(), Some(2019));
        assert_eq!(projects[1].population, TargetPopulation::Elderly);

        assert_eq!(projects[2].award_year, Some(2025));
        assert_eq!(projects[2].population, TargetPopulation::Supportive);
        assert_eq!(projects[2].units, None);
    }

    #[test]
    fn requires_location_columns() {
        let err = parse_competitors("name,county\nA,Harris\n".as_bytes()).expect_err("missing");
        assert!(matches!(err, ImportError::MissingColumns(_)));
    }
}
