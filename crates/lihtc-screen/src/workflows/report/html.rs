use super::summary::ScreeningSummary;
use super::views::ScoredSiteRow;
use super::ReportError;
use crate::workflows::screening::ScreeningResult;
use chrono::{DateTime, Utc};
use std::fmt::Write;

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:2rem;color:#1f2933}\
table{border-collapse:collapse;width:100%;font-size:0.85rem}\
th,td{border:1px solid #cbd2d9;padding:0.3rem 0.5rem;text-align:left;vertical-align:top}\
th{background:#f0f4f8}tr.eliminated{color:#7b8794}\
.tier-priority{background:#e3f9e5}.tier-viable{background:#f0fce4}\
.tier-marginal{background:#fffbea}.tier-weak{background:#ffeeee}\
dl{display:grid;grid-template-columns:max-content auto;gap:0.2rem 1rem}";

#[derive(Debug, Clone)]
pub struct ReportHeading {
    pub title: String,
    pub subtitle: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl ReportHeading {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            generated_at: Utc::now(),
        }
    }
}

/// Renders a single self-contained HTML page: summary, then the ranked table.
pub fn render_html(
    heading: &ReportHeading,
    summary: &ScreeningSummary,
    results: &[ScreeningResult],
) -> Result<String, ReportError> {
    let mut page = String::new();
    let title = escape(&heading.title);

    writeln!(page, "<!DOCTYPE html>")?;
    writeln!(page, "<html lang=\"en\"><head><meta charset=\"utf-8\">")?;
    writeln!(page, "<title>{title}</title><style>{STYLE}</style></head><body>")?;
    writeln!(page, "<h1>{title}</h1>")?;
    if let Some(subtitle) = &heading.subtitle {
        writeln!(page, "<p>{}</p>", escape(subtitle))?;
    }
    writeln!(
        page,
        "<p>Generated {}</p>",
        heading.generated_at.format("%Y-%m-%d %H:%M UTC")
    )?;

    write_summary(&mut page, summary)?;
    write_table(&mut page, results)?;

    writeln!(page, "</body></html>")?;
    Ok(page)
}

fn write_summary(page: &mut String, summary: &ScreeningSummary) -> std::fmt::Result {
    writeln!(page, "<h2>Summary</h2><dl>")?;
    writeln!(page, "<dt>Properties</dt><dd>{}</dd>", summary.total)?;
    writeln!(page, "<dt>Retained</dt><dd>{}</dd>", summary.retained)?;
    writeln!(page, "<dt>Eliminated</dt><dd>{}</dd>", summary.eliminated)?;
    writeln!(
        page,
        "<dt>Basis boost (QCT/DDA)</dt><dd>{}</dd>",
        summary.basis_boost_count
    )?;
    if let Some(mean) = summary.mean_score {
        writeln!(page, "<dt>Mean score</dt><dd>{mean:.1}</dd>")?;
    }
    for entry in &summary.tiers {
        writeln!(page, "<dt>{}</dt><dd>{}</dd>", entry.tier_label, entry.count)?;
    }
    for entry in &summary.eliminated_by_reason {
        writeln!(
            page,
            "<dt>Eliminated: {}</dt><dd>{}</dd>",
            escape(entry.reason_label),
            entry.count
        )?;
    }
    writeln!(page, "</dl>")
}

fn write_table(page: &mut String, results: &[ScreeningResult]) -> std::fmt::Result {
    const HEADERS: &[&str] = &[
        "Rank",
        "Property",
        "Address",
        "County",
        "State",
        "Score",
        "Tier",
        "QCT",
        "DDA",
        "Flood",
        "Nearest competitor",
        "Within radius",
        "Notes",
    ];

    writeln!(page, "<h2>Properties</h2><table><thead><tr>")?;
    for header in HEADERS {
        write!(page, "<th>{header}</th>")?;
    }
    writeln!(page, "</tr></thead><tbody>")?;

    for result in results {
        let row = ScoredSiteRow::from_result(result);
        let class = match row.tier {
            Some(tier) => format!("tier-{}", tier.to_ascii_lowercase()),
            None => "eliminated".to_string(),
        };
        let nearest = match (&row.nearest_competitor, row.nearest_competitor_miles) {
            (Some(name), Some(miles)) => format!("{name} ({miles:.2} mi)"),
            _ => String::new(),
        };
        let notes = [
            row.eliminated_reason.clone().unwrap_or_default(),
            row.rule_violations.clone(),
            row.advisories.clone(),
            row.warnings.clone(),
        ]
        .into_iter()
        .filter(|note| !note.is_empty())
        .collect::<Vec<_>>()
        .join("; ");

        let cells = [
            row.rank.map(|rank| rank.to_string()).unwrap_or_default(),
            row.id.clone(),
            address_line(&row),
            row.county.clone().unwrap_or_default(),
            row.state.clone().unwrap_or_default(),
            row.total_score
                .map(|score| format!("{score:.1}"))
                .unwrap_or_default(),
            row.tier.unwrap_or("Eliminated").to_string(),
            row.qct.clone().unwrap_or_default(),
            row.dda.clone().unwrap_or_default(),
            row.flood_risk.unwrap_or_default().to_string(),
            nearest,
            row.competitors_within_radius
                .map(|count| count.to_string())
                .unwrap_or_default(),
            notes,
        ];

        write!(page, "<tr class=\"{class}\">")?;
        for cell in &cells {
            write!(page, "<td>{}</td>", escape(cell))?;
        }
        writeln!(page, "</tr>")?;
    }

    writeln!(page, "</tbody></table>")
}

fn address_line(row: &ScoredSiteRow) -> String {
    [row.address.as_deref(), row.city.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
