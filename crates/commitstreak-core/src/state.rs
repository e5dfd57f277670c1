//! Persisted cursor and the stores that hold it.
//!
//! On disk the cursor is a small JSON object:
//!
//! ```json
//! { "date": "2025-01-03T14:05:09", "streak": 7 }
//! ```
//!
//! `streak` may be absent (treated as 0). `date` is accepted as RFC 3339 with
//! an offset, a naive local date-time, or a bare date; it is always written
//! back as a naive local date-time.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::synth::TIMESTAMP_FORMAT;

pub const DEFAULT_STATE_FILE: &str = "data.json";

/// Resume position: last committed timestamp plus streak days still owed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PersistedState {
    pub last_event: NaiveDateTime,
    pub streak_remaining: u32,
}

impl PersistedState {
    /// Cursor used when nothing has been persisted yet.
    pub fn initial(epoch: NaiveDate) -> Self {
        Self {
            last_event: epoch.and_time(chrono::NaiveTime::MIN),
            streak_remaining: 0,
        }
    }

    pub fn last_date(&self) -> NaiveDate {
        self.last_event.date()
    }

    fn to_record(self) -> StateRecord {
        StateRecord {
            date: self.last_event.format(TIMESTAMP_FORMAT).to_string(),
            streak: Some(self.streak_remaining),
        }
    }

    fn from_record(record: StateRecord) -> Result<Self, StateError> {
        Ok(Self {
            last_event: parse_timestamp(&record.date)?,
            streak_remaining: record.streak.unwrap_or(0),
        })
    }

    /// Decode the JSON wire form.
    pub fn from_json(path: &Path, json: &str) -> Result<Self, StateError> {
        let record: StateRecord = serde_json::from_str(json).map_err(|source| StateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_record(record)
    }

    /// Encode the JSON wire form.
    pub fn to_json(&self) -> Result<String, StateError> {
        serde_json::to_string(&self.to_record()).map_err(StateError::Encode)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StateRecord {
    date: String,
    #[serde(default)]
    streak: Option<u32>,
}

/// Parse the `date` field leniently.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, StateError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }
    Err(StateError::InvalidTimestamp {
        value: value.to_string(),
    })
}

/// Load/save of the cursor.
///
/// `load` returning `Ok(None)` means nothing was persisted yet.
pub trait StateStore {
    fn load(&self) -> Result<Option<PersistedState>, StateError>;
    fn save(&mut self, state: &PersistedState) -> Result<(), StateError>;
}

/// The cursor as a JSON file, overwritten wholesale on every save.
#[derive(Debug, Clone)]
pub struct JsonStateFile {
    path: PathBuf,
}

impl JsonStateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonStateFile {
    fn load(&self) -> Result<Option<PersistedState>, StateError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StateError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        PersistedState::from_json(&self.path, &json).map(Some)
    }

    fn save(&mut self, state: &PersistedState) -> Result<(), StateError> {
        let json = state.to_json()?;
        fs::write(&self.path, json).map_err(|source| StateError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// In-memory cursor for previews and tests. Records every save.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    current: Option<PersistedState>,
    saves: Vec<PersistedState>,
}

impl MemoryStateStore {
    pub fn new(initial: Option<PersistedState>) -> Self {
        Self {
            current: initial,
            saves: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<PersistedState> {
        self.current
    }

    /// Every state saved so far, oldest first.
    pub fn saves(&self) -> &[PersistedState] {
        &self.saves
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<Option<PersistedState>, StateError> {
        Ok(self.current)
    }

    fn save(&mut self, state: &PersistedState) -> Result<(), StateError> {
        self.current = Some(*state);
        self.saves.push(*state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn test_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonStateFile::new(temp_dir.path().join("data.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = JsonStateFile::new(temp_dir.path().join("data.json"));
        let state = PersistedState {
            last_event: dt("2025-03-04T05:06:07"),
            streak_remaining: 6,
        };

        store.save(&state).unwrap();

        assert_eq!(store.load().unwrap(), Some(state));
        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, r#"{"date":"2025-03-04T05:06:07","streak":6}"#);
    }

    #[test]
    fn test_missing_streak_defaults_to_zero() {
        let state =
            PersistedState::from_json(Path::new("data.json"), r#"{"date":"2025-01-01T00:00:00"}"#)
                .unwrap();
        assert_eq!(state.streak_remaining, 0);
        assert_eq!(state.last_event, dt("2025-01-01T00:00:00"));
    }

    #[test]
    fn test_parses_offset_timestamps_as_local_wall_clock() {
        let parsed = parse_timestamp("2025-02-10T21:15:00+05:30").unwrap();
        assert_eq!(parsed, dt("2025-02-10T21:15:00"));
    }

    #[test]
    fn test_parses_bare_date() {
        assert_eq!(parse_timestamp("2025-01-05").unwrap(), dt("2025-01-05T00:00:00"));
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        fs::write(&path, "{not json").unwrap();

        let result = JsonStateFile::new(&path).load();
        assert!(matches!(result, Err(StateError::Parse { .. })));
    }

    #[test]
    fn test_bad_date_is_invalid_timestamp() {
        let result = PersistedState::from_json(Path::new("data.json"), r#"{"date":"yesterday"}"#);
        assert!(matches!(result, Err(StateError::InvalidTimestamp { .. })));
    }

    #[test]
    fn test_negative_streak_rejected() {
        let result =
            PersistedState::from_json(Path::new("data.json"), r#"{"date":"2025-01-01","streak":-2}"#);
        assert!(matches!(result, Err(StateError::Parse { .. })));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = JsonStateFile::new(temp_dir.path().join("nested/data.json"));
        let result = store.save(&PersistedState::initial(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert!(matches!(result, Err(StateError::Write { .. })));
    }

    #[test]
    fn test_memory_store_records_saves() {
        let mut store = MemoryStateStore::default();
        let a = PersistedState {
            last_event: dt("2025-01-01T10:00:00"),
            streak_remaining: 2,
        };
        let b = PersistedState {
            last_event: dt("2025-01-02T11:00:00"),
            streak_remaining: 1,
        };
        store.save(&a).unwrap();
        store.save(&b).unwrap();

        assert_eq!(store.load().unwrap(), Some(b));
        assert_eq!(store.saves(), &[a, b]);
    }
}
