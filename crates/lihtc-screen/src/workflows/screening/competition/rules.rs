use super::super::domain::{
    CompetitionRule, CompetitorProject, CreditType, RuleViolation, UsState,
};
use super::config::CompetitionConfig;
use super::{CompetitionFinding, CompetitionSite, NearbyCompetitor};
use crate::spatial::haversine_miles;

pub(crate) fn evaluate_site(
    site: &CompetitionSite<'_>,
    competitors: &[CompetitorProject],
    config: &CompetitionConfig,
) -> CompetitionFinding {
    let in_texas = site.state == Some(&UsState::Texas);
    let two_mile_applies = in_texas
        && config.credit_type == CreditType::NinePercent
        && site
            .county
            .map(|county| config.is_large_county(county))
            .unwrap_or(false);
    let lookback_start = config.application_year - config.one_mile_lookback_years;

    let mut finding = CompetitionFinding {
        density_radius_miles: config.density_radius_miles,
        ..CompetitionFinding::default()
    };

    for competitor in competitors {
        let distance_miles = haversine_miles(site.coordinate, competitor.coordinate);

        if distance_miles <= config.density_radius_miles {
            finding.within_density_radius += 1;
        }

        let closer = finding
            .nearest
            .as_ref()
            .map(|nearest| distance_miles < nearest.distance_miles)
            .unwrap_or(true);
        if closer {
            finding.nearest = Some(NearbyCompetitor {
                name: competitor.name.clone(),
                distance_miles,
                award_year: competitor.effective_year(),
            });
        }

        if !in_texas {
            continue;
        }
        let Some(award_year) = competitor.effective_year() else {
            continue;
        };

        if distance_miles <= config.one_mile_radius_miles
            && (lookback_start..=config.application_year).contains(&award_year)
            && site.population.conflicts_with(competitor.population)
        {
            finding.violations.push(RuleViolation {
                rule: CompetitionRule::OneMileThreeYear,
                competitor: competitor.name.clone(),
                distance_miles,
                award_year,
            });
        }

        if two_mile_applies
            && distance_miles <= config.two_mile_radius_miles
            && award_year == config.application_year
        {
            finding.violations.push(RuleViolation {
                rule: CompetitionRule::TwoMileSameYear,
                competitor: competitor.name.clone(),
                distance_miles,
                award_year,
            });
        }
    }

    finding.violations.sort_by(|a, b| {
        rule_order(a.rule)
            .cmp(&rule_order(b.rule))
            .then(a.distance_miles.total_cmp(&b.distance_miles))
    });

    finding
}

fn rule_order(rule: CompetitionRule) -> u8 {
    match rule {
        CompetitionRule::OneMileThreeYear => 0,
        CompetitionRule::TwoMileSameYear => 1,
    }
}
