use crate::cli::{AnalyzeArgs, GeocodeBatchArgs, LocateArgs, PrefilterArgs};
use crate::infra::{apply_overrides, bootstrap, build_pipeline};
use lihtc_screen::error::AppError;
use lihtc_screen::spatial::Coordinate;
use lihtc_screen::workflows::parcels::{write_batch_request, PropertyImporter};
use lihtc_screen::workflows::report::{
    render_html, write_csv, write_csv_path, write_summary_json_path, ReportHeading,
    ScreeningSummary,
};
use lihtc_screen::workflows::screening::{PropertyRecord, ScreeningResult, UsState};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

pub(crate) fn run_prefilter(args: PrefilterArgs) -> Result<(), AppError> {
    let PrefilterArgs {
        properties,
        output,
        geocode_results,
        reference,
    } = args;

    let mut config = bootstrap()?;
    apply_overrides(&mut config.screening, &reference);
    if geocode_results.is_some() {
        config.screening.geocode_results = geocode_results;
    }

    let pipeline = build_pipeline(&config.screening)?;
    let records = PropertyImporter::from_path(&properties)?;
    let results = pipeline.prefilter(records);
    let summary = ScreeningSummary::from_results(&results);

    write_rows(&results, output.as_deref())?;
    if output.is_some() {
        render_elimination_summary(&summary);
    }
    Ok(())
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let AnalyzeArgs {
        properties,
        output,
        html,
        summary_json,
        weights,
        top,
        geocode_results,
        reference,
    } = args;

    let mut config = bootstrap()?;
    apply_overrides(&mut config.screening, &reference);
    if weights.is_some() {
        config.screening.weights_path = weights;
    }
    if geocode_results.is_some() {
        config.screening.geocode_results = geocode_results;
    }

    let pipeline = build_pipeline(&config.screening)?;
    let records = PropertyImporter::from_path(&properties)?;
    let run = pipeline.run(records);

    let rows: Vec<ScreeningResult> = match top {
        Some(count) => run.top(count).cloned().collect(),
        None => run.results.clone(),
    };

    write_rows(&rows, output.as_deref())?;

    if let Some(path) = &summary_json {
        write_summary_json_path(&run.summary, path)?;
        info!(path = %path.display(), "wrote summary json");
    }

    if let Some(path) = &html {
        let mut heading = ReportHeading::new("LIHTC Site Screening");
        heading.subtitle = Some(format!(
            "{} | application year {} | {} credits",
            properties.display(),
            config.screening.application_year,
            config.screening.credit_type.label()
        ));
        let page = render_html(&heading, &run.summary, &rows)?;
        std::fs::write(path, page)?;
        info!(path = %path.display(), "wrote html report");
    }

    // Console output would interleave with CSV on stdout.
    if output.is_some() {
        render_elimination_summary(&run.summary);
        render_ranking(&run.summary, run.top(top.unwrap_or(10)));
    }
    Ok(())
}

pub(crate) fn run_locate(args: LocateArgs) -> Result<(), AppError> {
    let LocateArgs {
        lat,
        lon,
        state,
        county,
        population,
        reference,
    } = args;

    let coordinate = Coordinate::new(lat, lon)?;
    let mut config = bootstrap()?;
    apply_overrides(&mut config.screening, &reference);
    let pipeline = build_pipeline(&config.screening)?;

    let mut property = PropertyRecord::new("point");
    property.coordinate = Some(coordinate);
    property.state = state.as_deref().map(UsState::parse);
    property.county = county;
    if let Some(population) = population {
        property.population = population;
    }

    let result = pipeline.evaluate_one(property);
    render_location(&result, pipeline.reference().layer_names());
    Ok(())
}

pub(crate) fn run_geocode_batch(args: GeocodeBatchArgs) -> Result<(), AppError> {
    bootstrap()?;
    let records = PropertyImporter::from_path(&args.properties)?;
    let file = File::create(&args.output)?;
    let written = write_batch_request(&records, BufWriter::new(file))?;

    info!(path = %args.output.display(), rows = written, "wrote geocoder batch");
    println!(
        "{} of {} rows need geocoding; upload {} to the Census batch geocoder",
        written,
        records.len(),
        args.output.display()
    );
    Ok(())
}

fn write_rows(results: &[ScreeningResult], output: Option<&Path>) -> Result<(), AppError> {
    match output {
        Some(path) => {
            let written = write_csv_path(results, path)?;
            info!(path = %path.display(), rows = written, "wrote screening csv");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            write_csv(results, &mut handle)?;
            handle.flush()?;
        }
    }
    Ok(())
}

fn render_elimination_summary(summary: &ScreeningSummary) {
    println!("Screening summary");
    println!(
        "- {} properties | {} retained | {} eliminated | {} with warnings",
        summary.total, summary.retained, summary.eliminated, summary.rows_with_warnings
    );
    for entry in summary.eliminated_by_reason.iter().filter(|entry| entry.count > 0) {
        println!("  - {}: {}", entry.reason_label, entry.count);
    }
}

fn render_ranking<'a>(
    summary: &ScreeningSummary,
    ranked: impl Iterator<Item = &'a ScreeningResult>,
) {
    if summary.retained == 0 {
        println!("\nNo properties survived the pre-filter.");
        return;
    }

    println!("\nTier breakdown");
    for entry in &summary.tiers {
        println!("  - {}: {}", entry.tier_label, entry.count);
    }
    println!("- {} sites qualify for the basis boost", summary.basis_boost_count);
    if let Some(mean) = summary.mean_score {
        println!("- mean score {:.1}", mean);
    }

    println!("\nTop sites");
    for result in ranked {
        let rank = result.rank.unwrap_or_default();
        let label = result
            .property
            .one_line_address()
            .unwrap_or_else(|| result.property.id.clone());
        let tier = result.tier().map(|tier| tier.label()).unwrap_or("-");
        println!(
            "  {:>3}. {:<48} {:>6.1}  {}{}",
            rank,
            label,
            result.total_score().unwrap_or_default(),
            tier,
            if result.basis_boost() { "  [boost]" } else { "" }
        );
    }
}

fn render_location(result: &ScreeningResult, layers: Vec<&str>) {
    if let Some(coordinate) = result.property.coordinate {
        println!(
            "Location diagnostics for {:.6}, {:.6}",
            coordinate.lat, coordinate.lon
        );
    }
    if layers.is_empty() {
        println!("- no reference layers configured");
    } else {
        println!("- reference layers: {}", layers.join(", "));
    }

    if let Some(findings) = &result.findings {
        let basis = &findings.basis;
        println!(
            "- QCT: {}",
            basis.qct.as_deref().unwrap_or("not inside a qualified census tract")
        );
        println!(
            "- DDA: {}",
            basis.dda.as_deref().unwrap_or("not inside a difficult development area")
        );
        if let Some(nearest) = &basis.nearest_qct {
            println!(
                "  nearest QCT {} at {:.2} mi",
                nearest.label, nearest.distance_miles
            );
        }
        println!(
            "- basis boost: {}",
            if basis.basis_boost() { "yes" } else { "no" }
        );

        let flood = &findings.flood;
        println!(
            "- flood: {} ({})",
            flood.zone_label().unwrap_or_else(|| "no mapped zone".to_string()),
            flood.risk.label()
        );

        let competition = &findings.competition;
        println!(
            "- competitors within {:.1} mi: {}",
            competition.density_radius_miles, competition.within_density_radius
        );
        if let Some(nearest) = &competition.nearest {
            println!(
                "  nearest {} at {:.2} mi",
                nearest.name, nearest.distance_miles
            );
        }
        for violation in &competition.violations {
            println!("  ! {}", violation.summary());
        }
    }

    if let Some(reason) = &result.elimination {
        println!("- eliminated: {}", reason.summary());
    }

    if let Some(outcome) = &result.evaluation {
        println!(
            "- score {:.1} ({})",
            outcome.total_score,
            outcome.tier.label()
        );
        for component in &outcome.components {
            println!(
                "    - {}: {:.1} of {:.1} ({})",
                component.factor.label(),
                component.points,
                component.weight,
                component.notes
            );
        }
        for advisory in &outcome.advisories {
            println!("  * {}", advisory);
        }
    }

    for warning in &result.property.warnings {
        println!("  warning: {}", warning);
    }
}
