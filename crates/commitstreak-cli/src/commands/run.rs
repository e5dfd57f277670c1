use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::Args;
use commitstreak_core::{
    GitCli, JsonStateFile, MemoryStateStore, Preset, RecordingVcs, RunReport, SeededRandom,
    Simulator,
};
use serde::Serialize;

use super::{load_config, state_path};

#[derive(Args)]
pub struct RunArgs {
    /// Working tree of the target repository
    #[arg(long, default_value = ".")]
    repo: PathBuf,
    /// State file relative to the working tree (defaults to repo.state_file)
    #[arg(long)]
    state: Option<PathBuf>,
    /// Seed the random source for a reproducible history
    #[arg(long)]
    seed: Option<u64>,
    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,
    /// Override the configured preset (streaky or fixed)
    #[arg(long)]
    preset: Option<Preset>,
    /// Print the commits a run would make without touching state or git
    #[arg(long)]
    dry_run: bool,
    /// Commit but do not push
    #[arg(long)]
    no_push: bool,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct DryRunOutput<'a> {
    report: &'a RunReport,
    commits: Vec<&'a str>,
}

pub fn run(args: RunArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path)?;
    if let Some(preset) = args.preset {
        config.preset = preset;
    }
    config.validate()?;

    let mut simulator = Simulator::from_config(&config).with_push(config.repo.push && !args.no_push);
    if let Some(state) = &args.state {
        simulator = simulator.with_stage_path(state);
    }

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let state_file = JsonStateFile::new(state_path(&args.repo, simulator.stage_path()));
    let mut rng = SeededRandom::new(args.seed);

    if args.dry_run {
        let plan = simulator.load_plan(&state_file, today);
        let mut preview_store = MemoryStateStore::new(Some(plan.state));
        let mut preview_vcs = RecordingVcs::new();
        let report = simulator.run_plan(plan, &mut preview_store, &mut preview_vcs, &mut rng)?;

        if args.json {
            let output = DryRunOutput {
                report: &report,
                commits: preview_vcs.commits().iter().map(|c| c.date.as_str()).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            for commit in preview_vcs.commits() {
                println!("would commit {}", commit.date);
            }
            print_summary(&report, true);
        }
        return Ok(());
    }

    let mut state_file = state_file;
    let mut git = GitCli::new(&args.repo);
    let report = simulator.run(&mut state_file, &mut git, &mut rng, today)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, false);
    }
    Ok(())
}

fn print_summary(report: &RunReport, dry_run: bool) {
    if report.first_day.is_none() {
        println!("Already up to date (through {}).", report.target);
        return;
    }

    let verb = if dry_run { "Would make" } else { "Made" };
    println!(
        "{verb} {} commits on {} of {} days ({} streaks started), cursor now {} with {} streak days owed.",
        report.commits,
        report.active_days,
        report.days_evaluated,
        report.streaks_started,
        report.final_state.last_event.format("%Y-%m-%dT%H:%M:%S"),
        report.final_state.streak_remaining,
    );
    if report.pushed {
        println!("{}", if dry_run { "Would push." } else { "Pushed." });
    }
}
