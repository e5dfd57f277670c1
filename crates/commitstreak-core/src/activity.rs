//! Streak/activity decision engine.
//!
//! One register, `streak_remaining`, is threaded through the days of a run
//! (and across runs via the persisted cursor). Per day:
//!
//! - a positive register means the day is active and the register drops by one;
//! - otherwise a `1..=streak_start_odds` roll of 1 starts a new streak whose
//!   first day is today, leaving `length - 1` days owed;
//! - otherwise the day is active iff its offset from the epoch is even.
//!
//! The register is a `u32`, so it can never go negative.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::whole_days_between;
use crate::error::ValidationError;
use crate::random::RandomSource;

pub const DEFAULT_STREAK_START_ODDS: u32 = 20;
pub const DEFAULT_STREAK_MIN_DAYS: u32 = 10;
pub const DEFAULT_STREAK_MAX_DAYS: u32 = 15;
pub const DEFAULT_UNITS_MIN: u32 = 1;
pub const DEFAULT_UNITS_MAX: u32 = 10;

/// Commits per active day in the fixed preset.
pub const FIXED_UNITS_PER_DAY: u32 = 10;

/// Named parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Random streak bursts over an every-other-day baseline
    #[default]
    Streaky,
    /// No streaks, exactly ten commits every other day
    Fixed,
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "streaky" => Ok(Preset::Streaky),
            "fixed" => Ok(Preset::Fixed),
            other => Err(format!("unknown preset: {other} (expected 'streaky' or 'fixed')")),
        }
    }
}

/// Parameters of the decision engine and the synthesizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRules {
    /// Parity reference: day offsets are measured from here
    pub epoch: NaiveDate,
    /// A streak starts when a `1..=odds` roll comes up 1. Zero disables streaks.
    pub streak_start_odds: u32,
    pub streak_min_days: u32,
    pub streak_max_days: u32,
    pub units_min: u32,
    pub units_max: u32,
}

impl ActivityRules {
    /// 5% streak starts, 10-15 day streaks, 1-10 commits per active day.
    pub fn streaky(epoch: NaiveDate) -> Self {
        Self {
            epoch,
            streak_start_odds: DEFAULT_STREAK_START_ODDS,
            streak_min_days: DEFAULT_STREAK_MIN_DAYS,
            streak_max_days: DEFAULT_STREAK_MAX_DAYS,
            units_min: DEFAULT_UNITS_MIN,
            units_max: DEFAULT_UNITS_MAX,
        }
    }

    /// Every other day, always ten commits, never a streak.
    pub fn fixed(epoch: NaiveDate) -> Self {
        Self {
            epoch,
            streak_start_odds: 0,
            streak_min_days: DEFAULT_STREAK_MIN_DAYS,
            streak_max_days: DEFAULT_STREAK_MAX_DAYS,
            units_min: FIXED_UNITS_PER_DAY,
            units_max: FIXED_UNITS_PER_DAY,
        }
    }

    pub fn for_preset(preset: Preset, epoch: NaiveDate) -> Self {
        match preset {
            Preset::Streaky => Self::streaky(epoch),
            Preset::Fixed => Self::fixed(epoch),
        }
    }

    pub fn streaks_enabled(&self) -> bool {
        self.streak_start_odds > 0
    }

    /// # Errors
    ///
    /// Returns an error if a range is inverted or allows zero-length streaks
    /// or zero commits on an active day.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("streak_days", self.streak_min_days, self.streak_max_days)?;
        check_range("units_per_day", self.units_min, self.units_max)?;
        Ok(())
    }
}

fn check_range(field: &str, min: u32, max: u32) -> Result<(), ValidationError> {
    if min == 0 || min > max {
        return Err(ValidationError::InvalidRange {
            field: field.to_string(),
            min,
            max,
        });
    }
    Ok(())
}

/// Why a day came out active or idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionReason {
    StreakContinued,
    StreakStarted { length: u32 },
    ParityActive,
    ParityIdle,
}

/// Outcome of evaluating one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDecision {
    pub active: bool,
    /// Register value after this day
    pub streak_remaining: u32,
    pub reason: DecisionReason,
}

/// Decide whether `day` is active given the register entering it.
pub fn decide<R>(
    rules: &ActivityRules,
    day: NaiveDate,
    streak_remaining: u32,
    rng: &mut R,
) -> ActivityDecision
where
    R: RandomSource + ?Sized,
{
    if streak_remaining > 0 {
        return ActivityDecision {
            active: true,
            streak_remaining: streak_remaining - 1,
            reason: DecisionReason::StreakContinued,
        };
    }

    if rules.streaks_enabled() && rng.uniform_int(1, rules.streak_start_odds) == 1 {
        let length = rng.uniform_int(rules.streak_min_days, rules.streak_max_days);
        return ActivityDecision {
            active: true,
            // today is the first day of the new streak
            streak_remaining: length.saturating_sub(1),
            reason: DecisionReason::StreakStarted { length },
        };
    }

    if parity_active(day, rules.epoch) {
        ActivityDecision {
            active: true,
            streak_remaining: 0,
            reason: DecisionReason::ParityActive,
        }
    } else {
        ActivityDecision {
            active: false,
            streak_remaining: 0,
            reason: DecisionReason::ParityIdle,
        }
    }
}

/// Even offsets from the epoch are active, on both sides of it.
pub fn parity_active(day: NaiveDate, epoch: NaiveDate) -> bool {
    whole_days_between(day, epoch).rem_euclid(2) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn epoch() -> NaiveDate {
        d(2025, 1, 1)
    }

    /// Never starts a streak; any other draw returns its minimum.
    fn no_streak(min: u32, max: u32) -> u32 {
        if (min, max) == (1, DEFAULT_STREAK_START_ODDS) {
            max
        } else {
            min
        }
    }

    #[test]
    fn test_streak_consumed_without_drawing() {
        let rules = ActivityRules::streaky(epoch());
        let mut draws = 0;
        let mut rng = |min: u32, _max: u32| {
            draws += 1;
            min
        };

        let decision = decide(&rules, d(2025, 1, 2), 4, &mut rng);

        assert!(decision.active);
        assert_eq!(decision.streak_remaining, 3);
        assert_eq!(decision.reason, DecisionReason::StreakContinued);
        assert_eq!(draws, 0);
    }

    #[test]
    fn test_streak_start_consumes_today() {
        let rules = ActivityRules::streaky(epoch());
        // roll 1 starts a streak, then the length draw picks 12
        let mut rng = |min: u32, max: u32| if max == 20 { 1 } else { 12u32.clamp(min, max) };

        // odd offset: would be idle under parity
        let decision = decide(&rules, d(2025, 1, 2), 0, &mut rng);

        assert!(decision.active);
        assert_eq!(decision.streak_remaining, 11);
        assert_eq!(decision.reason, DecisionReason::StreakStarted { length: 12 });
    }

    #[test]
    fn test_shortest_streak_never_negative() {
        let rules = ActivityRules::streaky(epoch());
        let mut rng = |min: u32, _max: u32| min;

        let decision = decide(&rules, d(2025, 1, 1), 0, &mut rng);

        assert_eq!(decision.reason, DecisionReason::StreakStarted { length: 10 });
        assert_eq!(decision.streak_remaining, 9);
    }

    #[test]
    fn test_parity_fallback_alternates() {
        let rules = ActivityRules::streaky(epoch());
        let mut rng = no_streak;

        let jan1 = decide(&rules, d(2025, 1, 1), 0, &mut rng);
        let jan2 = decide(&rules, d(2025, 1, 2), 0, &mut rng);
        let jan3 = decide(&rules, d(2025, 1, 3), 0, &mut rng);

        assert_eq!(jan1.reason, DecisionReason::ParityActive);
        assert!(jan1.active);
        assert_eq!(jan2.reason, DecisionReason::ParityIdle);
        assert!(!jan2.active);
        assert!(jan3.active);
        assert_eq!(jan3.streak_remaining, 0);
    }

    #[test]
    fn test_parity_before_epoch() {
        assert!(!parity_active(d(2024, 12, 31), epoch()));
        assert!(parity_active(d(2024, 12, 30), epoch()));
    }

    #[test]
    fn test_fixed_preset_never_rolls() {
        let rules = ActivityRules::fixed(epoch());
        let mut draws = 0;
        let mut rng = |min: u32, _max: u32| {
            draws += 1;
            min
        };

        let active = decide(&rules, d(2025, 1, 5), 0, &mut rng);
        let idle = decide(&rules, d(2025, 1, 6), 0, &mut rng);

        assert!(active.active);
        assert!(!idle.active);
        assert_eq!(draws, 0);
    }

    #[test]
    fn test_validate_rejects_inverted_ranges() {
        let mut rules = ActivityRules::streaky(epoch());
        rules.units_min = 11;
        assert_eq!(
            rules.validate(),
            Err(ValidationError::InvalidRange {
                field: "units_per_day".to_string(),
                min: 11,
                max: 10,
            })
        );

        let mut rules = ActivityRules::streaky(epoch());
        rules.streak_min_days = 0;
        assert!(rules.validate().is_err());

        assert!(ActivityRules::fixed(epoch()).validate().is_ok());
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("fixed".parse::<Preset>(), Ok(Preset::Fixed));
        assert_eq!("streaky".parse::<Preset>(), Ok(Preset::Streaky));
        assert!("daily".parse::<Preset>().is_err());
    }

    proptest! {
        #[test]
        fn prop_register_counts_down_regardless_of_draws(
            k in 1u32..1000,
            offset in 0i64..2000,
            draw in any::<u32>(),
        ) {
            let rules = ActivityRules::streaky(epoch());
            let day = epoch() + chrono::Days::new(offset as u64);
            let mut rng = |min: u32, max: u32| draw.clamp(min, max);

            let decision = decide(&rules, day, k, &mut rng);

            prop_assert!(decision.active);
            prop_assert_eq!(decision.streak_remaining, k - 1);
        }

        #[test]
        fn prop_fresh_streak_within_configured_length(
            offset in 0i64..2000,
            length_draw in any::<u32>(),
        ) {
            let rules = ActivityRules::streaky(epoch());
            let day = epoch() + chrono::Days::new(offset as u64);
            let mut rng = |min: u32, max: u32| if max == 20 { 1 } else { length_draw.clamp(min, max) };

            let decision = decide(&rules, day, 0, &mut rng);

            prop_assert!(decision.active);
            prop_assert!(decision.streak_remaining >= DEFAULT_STREAK_MIN_DAYS - 1);
            prop_assert!(decision.streak_remaining <= DEFAULT_STREAK_MAX_DAYS - 1);
        }

        #[test]
        fn prop_idle_roll_follows_parity(offset in -2000i64..2000) {
            let rules = ActivityRules::streaky(epoch());
            let day = epoch() + chrono::Duration::days(offset);
            let mut rng = no_streak;

            let decision = decide(&rules, day, 0, &mut rng);

            prop_assert_eq!(decision.active, offset.rem_euclid(2) == 0);
            prop_assert_eq!(decision.streak_remaining, 0);
        }
    }
}
