//! Run orchestrator.
//!
//! Loads the cursor, walks the pending days in order, and for every
//! synthesized unit saves the cursor, stages the state file and commits with
//! the unit's timestamp. A single push follows if anything was committed.
//!
//! The cursor is threaded through [`Simulator::step_day`] as a value; the
//! only mutation happens through the injected collaborators.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::activity::{decide, ActivityDecision, ActivityRules, DecisionReason};
use crate::calendar::{range_to_process, target_date, DayRange};
use crate::error::Result;
use crate::random::RandomSource;
use crate::state::{PersistedState, StateStore, DEFAULT_STATE_FILE};
use crate::storage::Config;
use crate::synth::synthesize;
use crate::vcs::VersionControl;

/// Where a run starts and what it will cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    /// Cursor the run starts from
    pub state: PersistedState,
    /// Whether `state` was loaded rather than defaulted
    pub resumed: bool,
    pub target: NaiveDate,
    pub days: DayRange,
}

impl RunPlan {
    pub fn is_up_to_date(&self) -> bool {
        self.days.is_empty()
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub first_day: Option<NaiveDate>,
    pub target: NaiveDate,
    pub days_evaluated: usize,
    pub active_days: usize,
    pub streaks_started: usize,
    pub commits: usize,
    pub pushed: bool,
    pub final_state: PersistedState,
}

/// Result of one day step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayOutcome {
    pub state: PersistedState,
    pub decision: ActivityDecision,
    pub commits: usize,
}

/// Drives a run with fixed rules and calendar bounds.
#[derive(Debug, Clone)]
pub struct Simulator {
    rules: ActivityRules,
    hard_stop: NaiveDate,
    stage_path: PathBuf,
    push: bool,
}

impl Simulator {
    pub fn new(rules: ActivityRules, hard_stop: NaiveDate) -> Self {
        Self {
            rules,
            hard_stop,
            stage_path: PathBuf::from(DEFAULT_STATE_FILE),
            push: true,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rules(), config.calendar.hard_stop)
            .with_stage_path(&config.repo.state_file)
            .with_push(config.repo.push)
    }

    /// Path handed to `stage` for every commit, relative to the working tree.
    pub fn with_stage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stage_path = path.into();
        self
    }

    pub fn with_push(mut self, push: bool) -> Self {
        self.push = push;
        self
    }

    pub fn rules(&self) -> &ActivityRules {
        &self.rules
    }

    pub fn hard_stop(&self) -> NaiveDate {
        self.hard_stop
    }

    pub fn stage_path(&self) -> &Path {
        &self.stage_path
    }

    /// Resolve the cursor and pending days without side effects.
    ///
    /// With nothing persisted the epoch itself is the first pending day.
    pub fn plan(&self, loaded: Option<PersistedState>, today: NaiveDate) -> RunPlan {
        let target = target_date(today, self.hard_stop);
        match loaded {
            Some(state) => RunPlan {
                state,
                resumed: true,
                target,
                days: range_to_process(state.last_date(), target),
            },
            None => RunPlan {
                state: PersistedState::initial(self.rules.epoch),
                resumed: false,
                target,
                days: DayRange::inclusive(self.rules.epoch, target),
            },
        }
    }

    /// Load the cursor, falling back to the default when it is unreadable.
    pub fn load_plan<S>(&self, store: &S, today: NaiveDate) -> RunPlan
    where
        S: StateStore + ?Sized,
    {
        let loaded = match store.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(error = %e, "state unreadable, starting from the epoch");
                None
            }
        };
        self.plan(loaded, today)
    }

    /// Evaluate one day and commit its units.
    ///
    /// # Errors
    ///
    /// Returns the first state save or version-control failure; units before
    /// it stay saved and committed.
    pub fn step_day<S, V, R>(
        &self,
        state: PersistedState,
        day: NaiveDate,
        store: &mut S,
        vcs: &mut V,
        rng: &mut R,
    ) -> Result<DayOutcome>
    where
        S: StateStore + ?Sized,
        V: VersionControl + ?Sized,
        R: RandomSource + ?Sized,
    {
        let decision = decide(&self.rules, day, state.streak_remaining, rng);
        let mut state = PersistedState {
            streak_remaining: decision.streak_remaining,
            ..state
        };

        if let DecisionReason::StreakStarted { length } = decision.reason {
            tracing::info!(
                %day,
                length,
                remaining = decision.streak_remaining,
                "streak started"
            );
        }

        if !decision.active {
            tracing::debug!(%day, "skipping");
            return Ok(DayOutcome {
                state,
                decision,
                commits: 0,
            });
        }

        let mut commits = 0;
        for unit in synthesize(&self.rules, day, rng) {
            let stamp = unit.iso();
            state = PersistedState {
                last_event: unit.timestamp,
                streak_remaining: decision.streak_remaining,
            };

            store.save(&state)?;
            vcs.stage(&[self.stage_path.as_path()])?;
            vcs.commit(&stamp, &stamp)?;
            commits += 1;

            tracing::info!(date = %stamp, streak = decision.streak_remaining, "committed");
        }

        Ok(DayOutcome {
            state,
            decision,
            commits,
        })
    }

    /// Advance from the persisted cursor to `min(today, hard_stop)`.
    ///
    /// # Errors
    ///
    /// Aborts on the first state save or version-control failure. Nothing is
    /// rolled back; a later run resumes from the last saved cursor.
    pub fn run<S, V, R>(
        &self,
        store: &mut S,
        vcs: &mut V,
        rng: &mut R,
        today: NaiveDate,
    ) -> Result<RunReport>
    where
        S: StateStore + ?Sized,
        V: VersionControl + ?Sized,
        R: RandomSource + ?Sized,
    {
        let plan = self.load_plan(store, today);
        self.run_plan(plan, store, vcs, rng)
    }

    /// Execute a plan produced by [`Simulator::plan`].
    ///
    /// # Errors
    ///
    /// See [`Simulator::run`].
    pub fn run_plan<S, V, R>(
        &self,
        plan: RunPlan,
        store: &mut S,
        vcs: &mut V,
        rng: &mut R,
    ) -> Result<RunReport>
    where
        S: StateStore + ?Sized,
        V: VersionControl + ?Sized,
        R: RandomSource + ?Sized,
    {
        let first_day = plan.days.first();

        tracing::info!(
            last_commit = %plan.state.last_date(),
            streak_remaining = plan.state.streak_remaining,
            resumed = plan.resumed,
            "loaded cursor"
        );

        let mut report = RunReport {
            first_day,
            target: plan.target,
            days_evaluated: 0,
            active_days: 0,
            streaks_started: 0,
            commits: 0,
            pushed: false,
            final_state: plan.state,
        };

        let Some(first) = first_day else {
            tracing::info!(target_date = %plan.target, "already up to date");
            return Ok(report);
        };
        tracing::info!(from = %first, to = %plan.target, "processing days");

        let mut state = plan.state;
        for day in plan.days {
            let outcome = self.step_day(state, day, store, vcs, rng)?;
            state = outcome.state;

            report.days_evaluated += 1;
            report.commits += outcome.commits;
            if outcome.decision.active {
                report.active_days += 1;
            }
            if matches!(outcome.decision.reason, DecisionReason::StreakStarted { .. }) {
                report.streaks_started += 1;
            }
        }
        report.final_state = state;

        if report.commits == 0 {
            tracing::info!("no new commits generated");
        } else if self.push {
            tracing::info!(commits = report.commits, "pushing");
            vcs.push()?;
            report.pushed = true;
        } else {
            tracing::info!(commits = report.commits, "push disabled, leaving commits local");
        }

        Ok(report)
    }
}
