use super::views::{ReasonCountEntry, TierCountEntry};
use crate::workflows::screening::domain::Tier;
use crate::workflows::screening::ScreeningResult;
use serde::Serialize;
use std::collections::HashMap;

/// Elimination keys in the order the pre-filter checks them.
const ELIMINATION_ORDER: &[(&str, &str)] = &[
    ("unsupported_state", "Unsupported or missing state"),
    ("missing_coordinates", "Missing coordinates"),
    ("floodway", "Regulatory floodway"),
    ("high_flood_risk", "Special flood hazard area"),
    ("one_mile_three_year", "One Mile Three Year rule"),
    ("two_mile_same_year", "Two Mile Same Year rule"),
];

/// Roll-up of a screening run for the console, JSON and HTML outputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScreeningSummary {
    pub total: usize,
    pub retained: usize,
    pub eliminated: usize,
    pub tiers: Vec<TierCountEntry>,
    pub eliminated_by_reason: Vec<ReasonCountEntry>,
    pub basis_boost_count: usize,
    pub mean_score: Option<f64>,
    pub rows_with_warnings: usize,
}

impl ScreeningSummary {
    pub fn from_results(results: &[ScreeningResult]) -> Self {
        let mut tier_counts: HashMap<Tier, usize> = HashMap::new();
        let mut reason_counts: HashMap<&'static str, usize> = HashMap::new();
        let mut scores = Vec::new();
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };

        for result in results {
            if !result.property.warnings.is_empty() {
                summary.rows_with_warnings += 1;
            }
            if let Some(reason) = &result.elimination {
                summary.eliminated += 1;
                *reason_counts.entry(reason.key()).or_default() += 1;
                continue;
            }

            summary.retained += 1;
            if result.basis_boost() {
                summary.basis_boost_count += 1;
            }
            if let Some(outcome) = &result.evaluation {
                *tier_counts.entry(outcome.tier).or_default() += 1;
                scores.push(outcome.total_score);
            }
        }

        summary.tiers = Tier::ordered()
            .into_iter()
            .map(|tier| TierCountEntry {
                tier,
                tier_label: tier.label(),
                count: tier_counts.get(&tier).copied().unwrap_or(0),
            })
            .collect();

        summary.eliminated_by_reason = ELIMINATION_ORDER
            .iter()
            .filter_map(|(key, label)| {
                reason_counts.get(key).map(|count| ReasonCountEntry {
                    reason: *key,
                    reason_label: *label,
                    count: *count,
                })
            })
            .collect();

        if !scores.is_empty() {
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            summary.mean_score = Some((mean * 10.0).round() / 10.0);
        }

        summary
    }

    pub fn tier_count(&self, tier: Tier) -> usize {
        self.tiers
            .iter()
            .find(|entry| entry.tier == tier)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }
}
