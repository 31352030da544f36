// Entry point and high-level CLI flow.
//
// `analyze` (the default) loads the census and candidate site tables, scores
// and ranks the tehsils, derives site recommendations and writes:
// - tehsil_analysis.csv and site_recommendations.csv,
// - summary.json,
// - data_summary.md,
// printing markdown previews of each table along the way.
// `check` loads the same inputs and only reports on their quality.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lahore_ev_sites::config::{self, Config};
use lahore_ev_sites::sites::recommend_sites;
use lahore_ev_sites::types::{CandidateSite, RegionInput};
use lahore_ev_sites::{loader, output, reports, score_detailed, util};
use std::path::PathBuf;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score tehsils, recommend sites and write reports (default)
    Analyze,
    /// Load inputs and report on data quality
    Check,
}

#[derive(Parser, Debug)]
#[command(name = "lahore-ev-sites")]
#[command(about = "EV charging station site selection for Lahore tehsils", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to JSON config file (defaults to ./ev_sites.json if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Census CSV (overrides config)
    #[arg(long, global = true)]
    census: Option<PathBuf>,

    /// Candidate sites CSV (overrides config)
    #[arg(long, global = true)]
    sites: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(short, long, global = true)]
    out: Option<PathBuf>,

    /// Site score jitter amplitude (overrides config)
    #[arg(long, global = true)]
    jitter: Option<f64>,

    /// Seed for site score jitter (overrides config)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(p) = &self.census {
            config.census_path = p.clone();
        }
        if let Some(p) = &self.sites {
            config.sites_path = Some(p.clone());
        }
        if let Some(p) = &self.out {
            config.output_dir = p.clone();
        }
        if let Some(j) = self.jitter {
            config.jitter = j;
        }
        if let Some(s) = self.seed {
            config.seed = Some(s);
        }
        config
    }
}

struct Inputs {
    regions: Vec<RegionInput>,
    report: loader::LoadReport,
    sites: Vec<CandidateSite>,
}

fn load_inputs(config: &Config) -> Result<Inputs> {
    let (regions, report) = loader::load_census(&config.census_path).with_context(|| {
        format!("Failed to load census data from {}", config.census_path.display())
    })?;
    println!(
        "Processing census... ({} rows read, {} tehsils loaded)",
        util::format_int(report.total_rows),
        util::format_int(report.loaded_rows)
    );
    if report.aggregate_rows > 0 {
        println!(
            "Info: {} district aggregate row(s) excluded from scoring.",
            util::format_int(report.aggregate_rows)
        );
    }
    if report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped due to parse/validation errors.",
            util::format_int(report.parse_errors)
        );
    }

    let sites = match &config.sites_path {
        Some(path) if path.exists() => {
            let (sites, skipped) = loader::load_sites(path).with_context(|| {
                format!("Failed to load candidate sites from {}", path.display())
            })?;
            println!(
                "Loaded {} candidate sites ({} skipped).",
                util::format_int(sites.len()),
                util::format_int(skipped)
            );
            sites
        }
        Some(path) => {
            log::warn!(
                "Candidate sites file {} not found; skipping site recommendations",
                path.display()
            );
            Vec::new()
        }
        None => Vec::new(),
    };
    println!();

    Ok(Inputs { regions, report, sites })
}

fn run_check(config: &Config) -> Result<()> {
    let inputs = load_inputs(config)?;
    if let Some(d) = &inputs.report.district {
        println!("Total population ({}): {}", d.name, util::format_count(d.population));
    }
    let level = reports::assess_quality(&inputs.report, inputs.sites.len());
    println!("Overall assessment: {}", level.describe());
    Ok(())
}

fn run_analyze(config: &Config) -> Result<()> {
    let inputs = load_inputs(config)?;
    let weights = config.criteria_weights();

    println!("Criteria and weights:");
    for line in reports::criteria_lines(&weights) {
        println!("   {}", line);
    }
    println!();

    let card = score_detailed(&inputs.regions, &weights).context("Scoring failed")?;
    for d in &card.degenerate {
        log::warn!("Criterion '{}' has no spread across tehsils; scored neutrally", d.0);
    }

    let mut jitter = config.site_jitter().context("Invalid site jitter")?;
    if jitter.amplitude() > 0.0 {
        log::info!("Site scores jittered by up to ±{}", jitter.amplitude());
    }
    let plan = recommend_sites(&card.results, &inputs.regions, &inputs.sites, &mut jitter);
    for name in &plan.unmatched {
        log::warn!("Site '{}' belongs to no scored tehsil", name);
    }

    let out = &config.output_dir;
    let tehsil_rows = reports::tehsil_rows(&card.results, &inputs.regions);
    let file1 = out.join("tehsil_analysis.csv");
    output::write_csv(&file1, &tehsil_rows)?;
    output::preview_table(
        "Tehsil Rankings",
        Some("Weighted multi-criteria score"),
        &tehsil_rows,
        tehsil_rows.len(),
    );
    println!("(Full table exported to {})\n", file1.display());

    let site_rows = reports::site_rows(&plan.recommendations);
    let file2 = out.join("site_recommendations.csv");
    output::write_csv(&file2, &site_rows)?;
    output::preview_table("Top Recommended Sites", Some("Top 5 by site score"), &site_rows, 5);
    println!("(Full table exported to {})\n", file2.display());

    let summary = reports::build_summary(
        &card.results,
        &inputs.regions,
        &plan,
        &weights,
        &card.degenerate,
        chrono::Utc::now(),
    );
    let file3 = out.join("summary.json");
    output::write_json(&file3, &summary)?;

    let md = reports::data_summary_markdown(
        &inputs.regions,
        inputs.report.district.as_ref(),
        &card.results,
    );
    let file4 = out.join("data_summary.md");
    output::write_markdown(&file4, &md)?;

    println!("Summary saved to {} and {}", file3.display(), file4.display());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(c) => cli.apply_overrides(c),
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    log::debug!("Effective config: {:?}", config);

    let result = match cli.command.as_ref().unwrap_or(&Commands::Analyze) {
        Commands::Analyze => run_analyze(&config),
        Commands::Check => run_check(&config),
    };
    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    }
}
