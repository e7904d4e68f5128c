//! Racecard model CLI
//!
//! Usage:
//!   racecard_model scrape --url https://www.attheraces.com/racecard/... [--form form.csv]
//!   racecard_model score --input racecard.csv --out race_model_output.csv
//!   racecard_model score --input racecard.csv --step-up yes --json

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use racecard::config::Config;
use racecard::model::{RunnerFilter, StaminaFlag, StepUp};
use racecard::outputs::{selection_json, write_csv_file};
use racecard::pipeline::{load_form, run_scrape, run_table, RaceOutcome};
use racecard::racecard::{parse_race_url, HttpFetcher};
use racecard::report::{render_runners, render_selection};
use racecard::RacecardError;

#[derive(Parser)]
#[command(name = "racecard_model")]
#[command(about = "Racecard scoring: delta, fair price, value flags and bet selections")]
struct Cli {
    /// TOML config; built-in defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a desktop racecard URL and score it
    Scrape {
        #[arg(long)]
        url: String,
        /// Form table overlaid on scraped runners by horse name
        #[arg(long)]
        form: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Score a delimited racecard table
    Score {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Export the enriched table to this path
    #[arg(long)]
    out: Option<PathBuf>,
    /// Write the export to the configured default file name
    #[arg(long)]
    export: bool,
    /// Print the selection summary as JSON
    #[arg(long)]
    json: bool,
    /// Only list runners with this step-up suitability (yes/no/maybe)
    #[arg(long, value_parser = parse_step_up)]
    step_up: Option<StepUp>,
    /// Only list runners with this pedigree stamina flag (good/mixed/poor)
    #[arg(long, value_parser = parse_stamina)]
    pedigree: Option<StaminaFlag>,
    /// Only list runners with this ground suitability (good/mixed/poor)
    #[arg(long, value_parser = parse_stamina)]
    ground: Option<StaminaFlag>,
}

fn parse_step_up(raw: &str) -> std::result::Result<StepUp, String> {
    StepUp::parse(raw).ok_or_else(|| format!("unknown step-up value '{}' (expected yes/no/maybe)", raw))
}

fn parse_stamina(raw: &str) -> std::result::Result<StaminaFlag, String> {
    StaminaFlag::parse(raw).ok_or_else(|| format!("unknown flag '{}' (expected good/mixed/poor)", raw))
}

impl OutputArgs {
    fn filter(&self) -> RunnerFilter {
        RunnerFilter {
            step_up: self.step_up,
            pedigree: self.pedigree,
            ground: self.ground,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(p) => Config::load(p),
        None => Ok(Config::default()),
    }
}

fn present(outcome: &RaceOutcome, args: &OutputArgs, config: &Config) -> Result<()> {
    let filter = args.filter();

    println!("=== Runners ===");
    let listed = filter.apply(&outcome.race);
    if listed.is_empty() {
        println!("(no runners match the filters)");
    }
    for line in render_runners(listed) {
        println!("{}", line);
    }

    if args.json {
        println!("{}", selection_json(&outcome.selection)?);
    } else {
        println!("\n=== Model Verdicts & Bets ===");
        for line in render_selection(&outcome.selection) {
            println!("{}", line);
        }
    }

    let out = args
        .out
        .clone()
        .or_else(|| args.export.then(|| PathBuf::from(&config.export.file_name)));
    if let Some(path) = out {
        write_csv_file(&outcome.race, &path, config.export.delimiter as u8)
            .with_context(|| format!("Failed to export to {:?}", path))?;
        println!("\nWrote {}", path.display());
    }

    Ok(())
}

fn report_failure(err: RacecardError) -> anyhow::Error {
    tracing::error!("{}", err);
    anyhow::anyhow!(err.user_message())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Scrape { url, form, output } => {
            let url = parse_race_url(&url).map_err(report_failure)?;
            let form = load_form(form.as_ref(), &config).map_err(report_failure)?;
            let fetcher = HttpFetcher::new(&config.fetch).map_err(report_failure)?;

            let outcome = run_scrape(&fetcher, &url, &config, form.as_ref())
                .await
                .map_err(report_failure)?;
            present(&outcome, &output, &config)?;
        }
        Commands::Score { input, output } => {
            let outcome = run_table(&input, &config).map_err(report_failure)?;
            present(&outcome, &output, &config)?;
        }
    }

    Ok(())
}
