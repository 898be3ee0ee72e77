use chrono::{Duration, Utc};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::analyzers::{render_stats_table, WeatherDashboard};
use crate::charts::{
    render_to_file, renderer_for_format, AsciiRenderer, ChartData, ChartDataExporter,
    ChartDataFormat, ChartFormat,
};
use crate::cli::args::{parse_region_list, Cli, Commands};
use crate::context::AppContext;
use crate::error::{MonitorError, Result};
use crate::ingest::IngestPipeline;
use crate::interactive::{PresetManager, RegionSelector};
use crate::models::{Metric, Region, FIELD_NAMES};
use crate::providers::OpenMeteoClient;
use crate::storage::{ObservationQuery, WeatherDatabase};
use crate::utils::progress::ProgressReporter;
use crate::utils::{
    format_coordinates, generate_default_export_filename, parse_filter_bound, RangeBound,
};
use crate::web;
use crate::writers::{ExportFormat, ExportOutcome, Exporter};

/// How the user asked for regions on the command line.
struct RegionChoice<'a> {
    regions: Option<&'a str>,
    preset: Option<&'a str>,
    interactive: bool,
}

pub async fn run(cli: Cli) -> Result<()> {
    let ctx = AppContext::load(&cli.config, cli.log_settings())?.with_quiet(cli.quiet);
    if cli.verbose {
        info!("Verbose logging enabled");
    }

    match cli.command {
        Commands::Fetch { hours, regions } => {
            fetch(&ctx, hours, regions.as_deref()).await?;
        }

        Commands::Latest { region } => {
            let db = ctx.database()?;
            match db.latest_for(&region)? {
                Some(record) => {
                    println!("Latest weather data for {}:", region);
                    for (name, value) in FIELD_NAMES.iter().zip(record.field_values()) {
                        println!("  {}: {}", name, value);
                    }
                }
                None => println!("No weather data found for region {}", region),
            }
        }

        Commands::Export {
            output,
            format,
            region,
            start_date,
            end_date,
            limit,
            pretty,
        } => {
            let format = ExportFormat::parse(&format)?;
            let mut query = ObservationQuery::new();
            if let Some(code) = region {
                query = query.with_region(code);
            }
            if let Some(start) = start_date {
                query = query.with_start(parse_filter_bound(&start, RangeBound::Start)?);
            }
            if let Some(end) = end_date {
                query = query.with_end(parse_filter_bound(&end, RangeBound::End)?);
            }
            if let Some(limit) = limit {
                query = query.with_limit(limit);
            }

            let records = ctx.database()?.query(&query)?;
            let output =
                output.unwrap_or_else(|| generate_default_export_filename(format.extension()));

            match Exporter::new(format)
                .with_pretty(pretty)
                .export_to_file(&records, &output)?
            {
                ExportOutcome::Written { records, path } => {
                    println!("Successfully exported {} records to {}", records, path.display());
                }
                ExportOutcome::NothingToExport => {
                    println!("No data found matching the specified criteria");
                }
            }
        }

        Commands::Plot {
            metric,
            regions,
            preset,
            hours,
            output,
            export_data,
            interactive,
        } => {
            let metric = Metric::parse(&metric)?;
            let db = ctx.database()?;
            let choice = RegionChoice {
                regions: regions.as_deref(),
                preset: preset.as_deref(),
                interactive,
            };
            let Some(codes) = resolve_region_codes(&ctx, &db, &choice)? else {
                return Ok(());
            };

            let since = Utc::now() - Duration::hours(i64::from(hours));
            let chart = ChartData::new(metric, hours, db.metric_series(metric, &codes, &since)?);

            if let Some(path) = export_data {
                export_chart_data(&chart, &path)?;
            }

            match output {
                Some(path) => {
                    let renderer = renderer_for_format(ChartFormat::from_path(&path)?, &ctx.config.plotting);
                    render_to_file(renderer.as_ref(), &chart, &path)?;
                    println!("Plot saved to {}", path.display());
                }
                None => {
                    let renderer = AsciiRenderer::from_config(&ctx.config.plotting);
                    println!("{}", renderer.render_text(&chart)?);
                }
            }
        }

        Commands::Dashboard {
            hours,
            regions,
            preset,
        } => {
            let db = ctx.database()?;
            let choice = RegionChoice {
                regions: regions.as_deref(),
                preset: preset.as_deref(),
                interactive: false,
            };
            let selected = match (choice.regions, choice.preset) {
                (None, None) => dashboard_defaults(&ctx, &db)?,
                _ => match resolve_region_codes(&ctx, &db, &choice)? {
                    Some(codes) => regions_for_codes(&ctx, &db, &codes)?,
                    None => return Ok(()),
                },
            };

            if selected.is_empty() {
                println!("No regions to show");
                return Ok(());
            }

            let report = WeatherDashboard::new(db).build(&selected, hours)?;
            println!("{}", report.render());
        }

        Commands::Serve { host, port } => {
            web::serve(&ctx, host, port).await?;
        }

        Commands::Regions => {
            list_regions(&ctx);
        }

        Commands::Stats {
            metric,
            hours,
            regions,
        } => {
            let metric = Metric::parse(&metric)?;
            let codes = parse_region_list(regions.as_deref());
            let since = Utc::now() - Duration::hours(i64::from(hours));

            let stats = ctx.database()?.metric_stats(metric, &codes, &since)?;
            if stats.is_empty() {
                println!(
                    "No data found for {} in the last {} hours",
                    metric.column(),
                    hours
                );
            } else {
                println!("{}", render_stats_table(metric, hours, &stats));
            }
        }
    }

    Ok(())
}

async fn fetch(ctx: &AppContext, hours: Option<u32>, regions: Option<&str>) -> Result<()> {
    let hours = hours.unwrap_or(ctx.config.provider.lookback_hours);
    let requested = parse_region_list(regions);

    let targets: Vec<Region> = if requested.is_empty() {
        ctx.config.regions()
    } else {
        requested
            .iter()
            .map(|code| ctx.config.region(code))
            .collect::<Result<Vec<_>>>()?
    };

    if targets.is_empty() {
        error!("No regions configured");
        return Ok(());
    }

    println!("Fetching the last {} hours for {} regions", hours, targets.len());
    info!("Starting weather data collection");

    let provider = OpenMeteoClient::new(ctx.config.provider.clone())?;
    let pipeline = IngestPipeline::new(Arc::new(provider), ctx.database()?);

    let progress = ProgressReporter::new(targets.len() as u64, "Fetching weather data", ctx.quiet);
    let report = pipeline.run_batch(&targets, hours, Some(&progress)).await;
    progress.finish_with_message(&format!("Saved {} new records", report.total_saved));

    for region_yield in &report.yields {
        println!("  {}: {} new", region_yield.region_code, region_yield.saved);
    }
    for failure in &report.failures {
        println!("  {}: failed ({})", failure.region_code, failure.error);
    }
    println!(
        "Weather data collection completed. Total new records saved: {}",
        report.total_saved
    );

    Ok(())
}

/// Region codes for a read command; `None` when the user cancelled the picker.
fn resolve_region_codes(
    ctx: &AppContext,
    db: &WeatherDatabase,
    choice: &RegionChoice<'_>,
) -> Result<Option<Vec<String>>> {
    let listed = parse_region_list(choice.regions);

    if choice.interactive {
        let codes = RegionSelector::new(ctx.config.regions())
            .with_preselected(&listed)
            .run_terminal()?;
        if codes.is_empty() {
            println!("No regions selected");
            return Ok(None);
        }
        return Ok(Some(codes));
    }

    if let Some(name) = choice.preset {
        let available = db.available_regions()?;
        return Ok(Some(PresetManager::from_config(&ctx.config).validate_preset(name, &available)?));
    }

    if listed.is_empty() {
        return Ok(Some(Vec::new()));
    }
    Ok(Some(db.validate_regions(&listed)?))
}

/// Configured regions, or every stored region when none are configured.
fn dashboard_defaults(ctx: &AppContext, db: &WeatherDatabase) -> Result<Vec<Region>> {
    let configured = ctx.config.regions();
    if !configured.is_empty() {
        return Ok(configured);
    }
    let codes = db.available_regions()?;
    regions_for_codes(ctx, db, &codes)
}

/// Look codes up in the configuration first, then in the store.
fn regions_for_codes(ctx: &AppContext, db: &WeatherDatabase, codes: &[String]) -> Result<Vec<Region>> {
    let summaries = db.region_summaries()?;
    let mut regions = Vec::with_capacity(codes.len());

    for code in codes {
        match ctx.config.region(code) {
            Ok(region) => regions.push(region),
            Err(MonitorError::RegionNotFound { .. }) => {
                match summaries.iter().find(|s| &s.code == code) {
                    Some(s) => regions.push(Region::new(
                        s.code.as_str(),
                        s.name.as_str(),
                        s.latitude,
                        s.longitude,
                    )),
                    None => warn!("Region {} is neither configured nor stored", code),
                }
            }
            Err(e) => return Err(e),
        }
    }
    Ok(regions)
}

fn export_chart_data(chart: &ChartData, path: &Path) -> Result<()> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("csv");
    let format = ChartDataFormat::parse(extension)?;

    match ChartDataExporter::new(format).render(chart)? {
        Some(bytes) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, bytes)?;
            println!("Chart data exported to {}", path.display());
        }
        None => println!("{}", chart.empty_message()),
    }
    Ok(())
}

fn list_regions(ctx: &AppContext) {
    let regions = ctx.config.regions();
    if regions.is_empty() {
        println!("No regions configured in {}", ctx.config_path.display());
    } else {
        println!("Configured regions:");
        for region in &regions {
            println!(
                "  {:<16} {:<24} {}",
                region.code,
                region.name,
                format_coordinates(region.latitude, region.longitude)
            );
        }
    }

    let presets = PresetManager::from_config(&ctx.config);
    let names = presets.list_presets();
    if !names.is_empty() {
        println!("\nPresets:");
        for name in names {
            if let Ok(codes) = presets.preset_regions(name) {
                println!("  {}: {}", name, codes.join(", "));
            }
        }
    }
}
