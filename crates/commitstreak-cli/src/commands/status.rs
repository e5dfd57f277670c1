use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::Args;
use commitstreak_core::{JsonStateFile, Simulator};
use serde::Serialize;

use super::{load_config, state_path};

#[derive(Args)]
pub struct StatusArgs {
    /// Working tree of the target repository
    #[arg(long, default_value = ".")]
    repo: PathBuf,
    /// State file relative to the working tree (defaults to repo.state_file)
    #[arg(long)]
    state: Option<PathBuf>,
    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,
    /// Print status as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Status {
    last_commit: String,
    streak_remaining: u32,
    resumed: bool,
    target: NaiveDate,
    next_day: Option<NaiveDate>,
    pending_days: usize,
}

pub fn run(args: StatusArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let mut simulator = Simulator::from_config(&config);
    if let Some(state) = &args.state {
        simulator = simulator.with_stage_path(state);
    }

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let state_file = JsonStateFile::new(state_path(&args.repo, simulator.stage_path()));
    let plan = simulator.load_plan(&state_file, today);

    let status = Status {
        last_commit: plan.state.last_event.format("%Y-%m-%dT%H:%M:%S").to_string(),
        streak_remaining: plan.state.streak_remaining,
        resumed: plan.resumed,
        target: plan.target,
        next_day: plan.days.first(),
        pending_days: plan.days.len(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    if status.resumed {
        println!("Last commit: {}", status.last_commit);
    } else {
        println!("No saved state; starting at epoch {}", config.calendar.epoch);
    }
    println!("Streak remaining: {}", status.streak_remaining);
    match status.next_day {
        Some(next) => println!(
            "Pending: {} days, {} to {}",
            status.pending_days, next, status.target
        ),
        None => println!("Already up to date."),
    }
    Ok(())
}
