use analytics::{AnalyticsEngine, ResultsBundle, RunOptions, RunRequest};
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use configuration::{Settings, load_config, load_config_from};
use core_types::{MetricCatalog, MetricFormat, Observation};
use std::path::{Path, PathBuf};

/// The main entry point for the tearsheet application.
fn main() -> anyhow::Result<()> {
    // A .env file is optional; real environment variables always win.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // The catalog is built once and passed by reference from here on.
    let catalog = MetricCatalog::standard();
    let settings = match &cli.config {
        Some(path) => load_config_from(path, &catalog),
        None => load_config(&catalog),
    }
    .context("Failed to load configuration")?;

    let _guard = configuration::init_tracing(&settings.logging)?;

    match cli.command {
        Commands::Run(args) => handle_run(args, &settings, &catalog),
        Commands::Batch(args) => handle_batch(args, &settings, &catalog),
        Commands::Catalog => {
            print_catalog(&catalog);
            Ok(())
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Performance and risk tear sheets for a portfolio value series.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML settings file. Defaults to ./tearsheet.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one strategy, optionally against a benchmark.
    Run(RunArgs),
    /// Analyze several strategies in parallel over the same window.
    Batch(BatchArgs),
    /// List every metric the engine computes.
    Catalog,
}

#[derive(Parser)]
struct WindowArgs {
    /// First date to include (format: YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last date to include (format: YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Capital the equity curve is rebased to. Defaults to the first value.
    #[arg(long)]
    capital: Option<f64>,
}

impl WindowArgs {
    fn options(&self) -> RunOptions {
        RunOptions { start_date: self.from, end_date: self.to, initial_capital: self.capital }
    }
}

#[derive(Parser)]
struct RunArgs {
    /// JSON file holding an array of {"date": "YYYY-MM-DD", "value": number}.
    #[arg(long)]
    strategy: PathBuf,

    /// JSON file holding the benchmark series, in the same format.
    #[arg(long)]
    benchmark: Option<PathBuf>,

    #[command(flatten)]
    window: WindowArgs,

    /// Print the whole results bundle as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct BatchArgs {
    /// One JSON series file per strategy.
    #[arg(long = "strategy", required = true)]
    strategies: Vec<PathBuf>,

    /// Benchmark shared by every strategy.
    #[arg(long)]
    benchmark: Option<PathBuf>,

    #[command(flatten)]
    window: WindowArgs,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_run(args: RunArgs, settings: &Settings, catalog: &MetricCatalog) -> anyhow::Result<()> {
    let engine = AnalyticsEngine::new(settings)?;
    let strategy = read_series(&args.strategy)?;
    let benchmark = args.benchmark.as_deref().map(read_series).transpose()?;
    tracing::info!(
        strategy = %args.strategy.display(),
        observations = strategy.len(),
        has_benchmark = benchmark.is_some(),
        "Running analysis"
    );

    let bundle = engine
        .run(&strategy, benchmark.as_deref(), &args.window.options())
        .with_context(|| format!("Analysis of {} failed", args.strategy.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
        return Ok(());
    }

    print_summary(&bundle, settings, catalog);
    Ok(())
}

fn handle_batch(
    args: BatchArgs,
    settings: &Settings,
    catalog: &MetricCatalog,
) -> anyhow::Result<()> {
    let engine = AnalyticsEngine::new(settings)?;
    let benchmark = args.benchmark.as_deref().map(read_series).transpose()?;

    let requests = args
        .strategies
        .iter()
        .map(|path| {
            Ok(RunRequest {
                strategy: read_series(path)?,
                benchmark: benchmark.clone(),
                options: args.window.options(),
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    tracing::info!(runs = requests.len(), "Running batch analysis");
    let results = engine.run_batch(&requests);

    let mut table = new_table();
    let mut header = vec![Cell::new("Metric")];
    header.extend(args.strategies.iter().map(|p| Cell::new(file_label(p))));
    table.set_header(header);

    for descriptor in catalog.iter() {
        let mut row = vec![Cell::new(descriptor.label)];
        for result in &results {
            let text = match result {
                Ok(bundle) => format_value(bundle.metric(descriptor.id), descriptor.format),
                Err(_) => "error".to_string(),
            };
            row.push(Cell::new(text));
        }
        table.add_row(row);
    }
    println!("{table}");

    for (path, result) in args.strategies.iter().zip(&results) {
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "Batch entry failed");
            eprintln!("{}: {}", path.display(), e);
        }
    }
    Ok(())
}

fn read_series(path: &Path) -> anyhow::Result<Vec<Observation>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

// ==============================================================================
// Rendering
// ==============================================================================

fn print_summary(bundle: &ResultsBundle, settings: &Settings, catalog: &MetricCatalog) {
    let meta = bundle.metadata();
    println!(
        "{} to {} | {} observations | {} periods/year | benchmark: {}",
        meta.start_date,
        meta.end_date,
        meta.observations,
        meta.periods_per_year,
        if meta.has_benchmark { "yes" } else { "no" }
    );

    // Dashboard cards first, in the configured order.
    let mut cards = new_table();
    cards.set_header(settings.dashboard.cards.iter().map(|c| Cell::new(&c.title)));
    cards.add_row(settings.dashboard.cards.iter().map(|card| {
        let format = catalog.get(card.value_key).map_or(MetricFormat::Ratio, |d| d.format);
        Cell::new(format_value(bundle.metric(card.value_key), format))
    }));
    println!("{cards}");

    let mut metrics = new_table();
    metrics.set_header(vec!["Metric", "Value"]);
    for descriptor in catalog.iter() {
        if descriptor.requires_benchmark && !meta.has_benchmark {
            continue;
        }
        metrics.add_row(vec![
            Cell::new(descriptor.label),
            Cell::new(format_value(bundle.metric(descriptor.id), descriptor.format)),
        ]);
    }
    println!("{metrics}");

    let top = bundle.top_drawdowns(3);
    if !top.is_empty() {
        let mut drawdowns = new_table();
        drawdowns.set_header(vec!["Peak", "Trough", "Recovery", "Depth", "Periods"]);
        for period in top {
            drawdowns.add_row(vec![
                Cell::new(period.peak),
                Cell::new(period.trough),
                Cell::new(period.recovery.map_or("-".to_string(), |d| d.to_string())),
                Cell::new(format_value(Some(period.depth), MetricFormat::Percentage)),
                Cell::new(period.duration),
            ]);
        }
        println!("{drawdowns}");
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Undefined metrics render as "N/A", never as zero.
fn format_value(value: Option<f64>, format: MetricFormat) -> String {
    match value {
        None => "N/A".to_string(),
        Some(v) => match format {
            MetricFormat::Percentage => format!("{:.2}%", v * 100.0),
            MetricFormat::Ratio => format!("{v:.2}"),
            MetricFormat::Count => format!("{v:.0}"),
            MetricFormat::Periods => format!("{v:.1}"),
        },
    }
}

fn file_label(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned())
}

fn print_catalog(catalog: &MetricCatalog) {
    let mut table = new_table();
    table.set_header(vec!["Key", "Label", "Format", "Needs benchmark"]);
    for descriptor in catalog.iter() {
        table.add_row(vec![
            Cell::new(descriptor.id),
            Cell::new(descriptor.label),
            Cell::new(format!("{:?}", descriptor.format)),
            Cell::new(if descriptor.requires_benchmark { "yes" } else { "no" }),
        ]);
    }
    println!("{table}");
}
