//! Calendar cursor: the ordered days a run has to evaluate.

use chrono::{Days, NaiveDate};

/// Inclusive daily range `[first, last]`. Empty when `first > last`.
///
/// Cloning restarts iteration from `first`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRange {
    next: Option<NaiveDate>,
    last: NaiveDate,
}

impl DayRange {
    /// Days from `first` through `last`, inclusive.
    pub fn inclusive(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            next: (first <= last).then_some(first),
            last,
        }
    }

    /// Days after `last_date` up to and including `target`.
    pub fn after(last_date: NaiveDate, target: NaiveDate) -> Self {
        match last_date.checked_add_days(Days::new(1)) {
            Some(first) => Self::inclusive(first, target),
            None => Self {
                next: None,
                last: target,
            },
        }
    }

    /// First day still to be yielded, if any.
    pub fn first(&self) -> Option<NaiveDate> {
        self.next
    }

    pub fn is_empty(&self) -> bool {
        self.next.is_none()
    }
}

impl Iterator for DayRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let day = self.next?;
        self.next = day
            .checked_add_days(Days::new(1))
            .filter(|next| *next <= self.last);
        Some(day)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self
            .next
            .map_or(0, |day| (self.last - day).num_days() as usize + 1);
        (len, Some(len))
    }
}

impl ExactSizeIterator for DayRange {}

/// Days the run must process after a cursor at `last_date`, ending at `target`.
pub fn range_to_process(last_date: NaiveDate, target: NaiveDate) -> DayRange {
    DayRange::after(last_date, target)
}

/// Whole calendar days from `reference` to `day` (negative before the reference).
pub fn whole_days_between(day: NaiveDate, reference: NaiveDate) -> i64 {
    (day - reference).num_days()
}

/// `min(today, hard_stop)`.
pub fn target_date(today: NaiveDate, hard_stop: NaiveDate) -> NaiveDate {
    today.min(hard_stop)
}
