//! # commitstreak Core Library
//!
//! This library synthesizes a dated commit history over a bounded calendar
//! range and resumes from wherever the previous run stopped. The
//! `commitstreak` CLI is a thin layer over it.
//!
//! ## Architecture
//!
//! - **Calendar**: the ordered days between the persisted cursor and the target date
//! - **Activity**: the streak/parity decision engine, driven by an injected random source
//! - **Synthesis**: per-day commit timestamps
//! - **Runner**: ties the above to the state store and the version-control client
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Simulator`]: Run orchestrator
//! - [`ActivityRules`]: Engine parameters, resolved from a [`Preset`]
//! - [`StateStore`]: Cursor persistence (JSON file or in-memory)
//! - [`VersionControl`]: `git` subprocesses or an in-memory recorder
//! - [`Config`]: Application configuration management

pub mod activity;
pub mod calendar;
pub mod error;
pub mod random;
pub mod runner;
pub mod state;
pub mod storage;
pub mod synth;
pub mod vcs;

pub use activity::{decide, ActivityDecision, ActivityRules, DecisionReason, Preset};
pub use calendar::{range_to_process, DayRange};
pub use error::{ConfigError, CoreError, StateError, ValidationError, VcsError};
pub use random::{RandomSource, SeededRandom};
pub use runner::{DayOutcome, RunPlan, RunReport, Simulator};
pub use state::{JsonStateFile, MemoryStateStore, PersistedState, StateStore};
pub use storage::Config;
pub use synth::{synthesize, SyntheticUnit};
pub use vcs::{GitCli, RecordedCommit, RecordingVcs, VersionControl};
