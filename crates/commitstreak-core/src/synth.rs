//! Event synthesizer: the commit timestamps of one active day.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::activity::ActivityRules;
use crate::random::RandomSource;

/// ISO-8601 local date-time, used for commit messages, `--date` and the state file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One synthesized event; becomes exactly one commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticUnit {
    pub timestamp: NaiveDateTime,
}

impl SyntheticUnit {
    pub fn iso(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Lazily yields the units of one day.
///
/// The unit count is drawn up front; each unit's time of day is drawn only
/// when it is pulled, so a caller that persists and commits between pulls
/// consumes randomness in the same order as it produces side effects.
pub struct DayUnits<'r, R: ?Sized> {
    day: NaiveDate,
    remaining: u32,
    rng: &'r mut R,
}

impl<R: RandomSource + ?Sized> DayUnits<'_, R> {
    /// Units not yet yielded.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl<R: RandomSource + ?Sized> Iterator for DayUnits<'_, R> {
    type Item = SyntheticUnit;

    fn next(&mut self) -> Option<SyntheticUnit> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let hour = self.rng.uniform_int(0, 23).min(23);
        let minute = self.rng.uniform_int(0, 59).min(59);
        let second = self.rng.uniform_int(0, 59).min(59);
        let time = NaiveTime::from_hms_opt(hour, minute, second).unwrap_or(NaiveTime::MIN);

        Some(SyntheticUnit {
            timestamp: self.day.and_time(time),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

/// Draw the number of units for `day` and return them as a lazy sequence.
pub fn synthesize<'r, R>(rules: &ActivityRules, day: NaiveDate, rng: &'r mut R) -> DayUnits<'r, R>
where
    R: RandomSource + ?Sized,
{
    let count = rng.uniform_int(rules.units_min, rules.units_max);
    DayUnits {
        day,
        remaining: count,
        rng,
    }
}
