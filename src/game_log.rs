use std::collections::HashMap;

use anyhow::anyhow;
use chrono::NaiveDate;
use serde_json::Value;

use crate::errors::PropError;

/// Date formats seen in provider game-log payloads. The primary shape is
/// `"Nov 2, 2025"`; older exports used plain ISO dates.
const DATE_FORMATS: &[&str] = &["%b %d, %Y", "%Y-%m-%d", "%m/%d/%Y"];

pub const DATE_COLUMN: &str = "GAME_DATE";

/// The per-game statistics this system tracks. Minutes feed the feature
/// window only; the other five are also prediction targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Minutes,
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
}

impl Stat {
    pub const ALL: [Stat; 6] = [
        Stat::Minutes,
        Stat::Points,
        Stat::Rebounds,
        Stat::Assists,
        Stat::Steals,
        Stat::Blocks,
    ];

    pub const TARGETS: [Stat; 5] = [
        Stat::Points,
        Stat::Rebounds,
        Stat::Assists,
        Stat::Steals,
        Stat::Blocks,
    ];

    /// Canonical uppercase column name used across provider payloads,
    /// the training dataset and display output.
    pub fn column(self) -> &'static str {
        match self {
            Stat::Minutes => "MIN",
            Stat::Points => "PTS",
            Stat::Rebounds => "REB",
            Stat::Assists => "AST",
            Stat::Steals => "STL",
            Stat::Blocks => "BLK",
        }
    }

    pub fn from_column(raw: &str) -> Option<Stat> {
        let key = raw.trim().to_ascii_uppercase();
        Stat::ALL.into_iter().find(|s| s.column() == key)
    }

    pub(crate) fn ordinal(self) -> usize {
        match self {
            Stat::Minutes => 0,
            Stat::Points => 1,
            Stat::Rebounds => 2,
            Stat::Assists => 3,
            Stat::Steals => 4,
            Stat::Blocks => 5,
        }
    }
}

/// One game as returned by the stats provider: header names mapped to raw
/// cells, before any column normalization.
#[derive(Debug, Clone, Default)]
pub struct RawGameRow {
    pub cells: HashMap<String, Value>,
}

/// One normalized game. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameRecord {
    pub date: NaiveDate,
    pub minutes: f64,
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
}

impl GameRecord {
    pub fn stat(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Minutes => self.minutes,
            Stat::Points => self.points,
            Stat::Rebounds => self.rebounds,
            Stat::Assists => self.assists,
            Stat::Steals => self.steals,
            Stat::Blocks => self.blocks,
        }
    }
}

/// A single player's season log, strictly increasing by game date.
#[derive(Debug, Clone)]
pub struct GameLog {
    records: Vec<GameRecord>,
}

impl GameLog {
    /// Normalize raw provider rows into an ordered log. Column names are
    /// matched case-insensitively (provider header casing has drifted across
    /// versions); rows whose date or stat cells do not parse are dropped.
    pub fn from_raw_rows(rows: &[RawGameRow]) -> Result<GameLog, PropError> {
        if rows.is_empty() {
            return Err(PropError::EmptyLog);
        }

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(record) = parse_game_row(row) {
                records.push(record);
            }
        }

        if records.is_empty() {
            return Err(PropError::DataUnavailable(anyhow!(
                "game log rows present but none parsed into a usable record"
            )));
        }
        GameLog::from_records(records)
    }

    /// Build a log from already-parsed records, enforcing the ordering and
    /// uniqueness invariants.
    pub fn from_records(mut records: Vec<GameRecord>) -> Result<GameLog, PropError> {
        if records.is_empty() {
            return Err(PropError::EmptyLog);
        }
        records.sort_by_key(|r| r.date);
        for pair in records.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(PropError::DataUnavailable(anyhow!(
                    "duplicate game date in log: {}",
                    pair[0].date
                )));
            }
        }
        Ok(GameLog { records })
    }

    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_game_row(row: &RawGameRow) -> Option<GameRecord> {
    let mut normalized: HashMap<String, &Value> = HashMap::with_capacity(row.cells.len());
    for (key, value) in &row.cells {
        normalized.insert(key.trim().to_ascii_uppercase(), value);
    }

    let date_raw = normalized.get(DATE_COLUMN)?.as_str()?;
    let date = parse_game_date(date_raw)?;

    let mut values = [0.0f64; Stat::ALL.len()];
    for stat in Stat::ALL {
        let cell = normalized.get(stat.column())?;
        values[stat.ordinal()] = parse_stat_cell(cell)?;
    }

    Some(GameRecord {
        date,
        minutes: values[Stat::Minutes.ordinal()],
        points: values[Stat::Points.ordinal()],
        rebounds: values[Stat::Rebounds.ordinal()],
        assists: values[Stat::Assists.ordinal()],
        steals: values[Stat::Steals.ordinal()],
        blocks: values[Stat::Blocks.ordinal()],
    })
}

pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    None
}

/// Lenient numeric cell parse. Minutes sometimes arrive as `"34:12"`.
pub fn parse_stat_cell(v: &Value) -> Option<f64> {
    if let Some(n) = v.as_f64() {
        return Some(n);
    }
    let s = v.as_str()?.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    if let Some((mins, secs)) = s.split_once(':') {
        let m = mins.trim().parse::<f64>().ok()?;
        let sec = secs.trim().parse::<f64>().ok()?;
        return Some(m + sec / 60.0);
    }
    s.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_row(date: &str, pts: Value) -> RawGameRow {
        let mut cells = HashMap::new();
        cells.insert("Game_Date".to_string(), json!(date));
        cells.insert("Min".to_string(), json!(30));
        cells.insert("Pts".to_string(), pts);
        cells.insert("Reb".to_string(), json!(5));
        cells.insert("Ast".to_string(), json!(4));
        cells.insert("Stl".to_string(), json!(1));
        cells.insert("Blk".to_string(), json!(0));
        RawGameRow { cells }
    }

    #[test]
    fn parse_game_date_accepts_provider_formats() {
        assert_eq!(
            parse_game_date("Nov 2, 2025"),
            NaiveDate::from_ymd_opt(2025, 11, 2)
        );
        assert_eq!(
            parse_game_date("NOV 02, 2025"),
            NaiveDate::from_ymd_opt(2025, 11, 2)
        );
        assert_eq!(
            parse_game_date("2025-11-02"),
            NaiveDate::from_ymd_opt(2025, 11, 2)
        );
        assert!(parse_game_date("soon").is_none());
    }

    #[test]
    fn parse_stat_cell_handles_numbers_strings_and_clock() {
        assert_eq!(parse_stat_cell(&json!(21)), Some(21.0));
        assert_eq!(parse_stat_cell(&json!("8")), Some(8.0));
        assert_eq!(parse_stat_cell(&json!("34:30")), Some(34.5));
        assert!(parse_stat_cell(&json!("-")).is_none());
        assert!(parse_stat_cell(&json!(null)).is_none());
    }

    #[test]
    fn columns_match_case_insensitively() {
        let log = GameLog::from_raw_rows(&[raw_row("Oct 25, 2025", json!(12))]).expect("log");
        assert_eq!(log.len(), 1);
        assert_eq!(log.records()[0].points, 12.0);
        assert_eq!(log.records()[0].minutes, 30.0);
    }

    #[test]
    fn rows_sort_ascending_by_date() {
        let rows = vec![
            raw_row("Nov 2, 2025", json!(20)),
            raw_row("Oct 25, 2025", json!(10)),
            raw_row("Oct 28, 2025", json!(15)),
        ];
        let log = GameLog::from_raw_rows(&rows).expect("log");
        let pts: Vec<f64> = log.records().iter().map(|r| r.points).collect();
        assert_eq!(pts, vec![10.0, 15.0, 20.0]);
    }

    #[test]
    fn empty_input_is_empty_log_error() {
        assert!(matches!(
            GameLog::from_raw_rows(&[]),
            Err(PropError::EmptyLog)
        ));
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let rows = vec![
            raw_row("Oct 25, 2025", json!(10)),
            raw_row("Oct 25, 2025", json!(12)),
        ];
        assert!(matches!(
            GameLog::from_raw_rows(&rows),
            Err(PropError::DataUnavailable(_))
        ));
    }

    #[test]
    fn unparseable_rows_are_dropped() {
        let rows = vec![
            raw_row("Oct 25, 2025", json!(10)),
            raw_row("not a date", json!(10)),
        ];
        let log = GameLog::from_raw_rows(&rows).expect("log");
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn stat_from_column_is_case_insensitive() {
        assert_eq!(Stat::from_column("pts"), Some(Stat::Points));
        assert_eq!(Stat::from_column(" BLK "), Some(Stat::Blocks));
        assert_eq!(Stat::from_column("FG3M"), None);
    }
}
