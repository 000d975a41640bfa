use crate::errors::PropError;
use crate::game_log::{GameLog, GameRecord, Stat};

/// Rolling window width. The `_L5` feature suffix encodes this value; the
/// same precondition gates both training-example generation and live
/// prediction so features and labels stay distributionally consistent.
pub const WINDOW: usize = 5;

/// Column name of a stat's trailing-window mean.
pub fn feature_column(stat: Stat) -> &'static str {
    match stat {
        Stat::Minutes => "MIN_L5",
        Stat::Points => "PTS_L5",
        Stat::Rebounds => "REB_L5",
        Stat::Assists => "AST_L5",
        Stat::Steals => "STL_L5",
        Stat::Blocks => "BLK_L5",
    }
}

pub fn feature_columns() -> [&'static str; Stat::ALL.len()] {
    let mut out = [""; Stat::ALL.len()];
    for stat in Stat::ALL {
        out[stat.ordinal()] = feature_column(stat);
    }
    out
}

/// Trailing-window means, one per tracked stat, in `Stat::ALL` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; Stat::ALL.len()],
}

impl FeatureVector {
    pub fn from_values(values: [f64; Stat::ALL.len()]) -> FeatureVector {
        FeatureVector { values }
    }

    pub fn get(&self, stat: Stat) -> f64 {
        self.values[stat.ordinal()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        Stat::ALL
            .into_iter()
            .map(|stat| (feature_column(stat), self.get(stat)))
    }
}

/// Features for the player's next game: the mean of each tracked stat over
/// the last `WINDOW` games of the log. Never looks past the end of the log.
pub fn trailing_features(log: &GameLog) -> Result<FeatureVector, PropError> {
    window_features(log.records())
}

/// Same computation over a record slice; used by training-example generation
/// where the window slides across a season.
pub fn window_features(records: &[GameRecord]) -> Result<FeatureVector, PropError> {
    if records.len() < WINDOW {
        return Err(PropError::InsufficientHistory {
            got: records.len(),
            need: WINDOW,
        });
    }

    let tail = &records[records.len() - WINDOW..];
    let mut values = [0.0f64; Stat::ALL.len()];
    for stat in Stat::ALL {
        let sum: f64 = tail.iter().map(|r| r.stat(stat)).sum();
        values[stat.ordinal()] = sum / WINDOW as f64;
    }
    Ok(FeatureVector { values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(day: u32, points: f64) -> GameRecord {
        GameRecord {
            date: NaiveDate::from_ymd_opt(2025, 11, day).expect("date"),
            minutes: 30.0,
            points,
            rebounds: 5.0,
            assists: 4.0,
            steals: 1.0,
            blocks: 0.5,
        }
    }

    #[test]
    fn trailing_mean_uses_last_window_only() {
        let records: Vec<GameRecord> = [10.0, 12.0, 14.0, 16.0, 18.0, 20.0]
            .iter()
            .enumerate()
            .map(|(i, &p)| record(i as u32 + 1, p))
            .collect();
        let log = GameLog::from_records(records).expect("log");
        let features = trailing_features(&log).expect("features");
        assert_eq!(features.get(Stat::Points), 16.0);
        assert_eq!(features.get(Stat::Minutes), 30.0);
    }

    #[test]
    fn four_records_is_insufficient_five_is_enough() {
        let four: Vec<GameRecord> = (1..=4).map(|d| record(d, 10.0)).collect();
        let log = GameLog::from_records(four).expect("log");
        match trailing_features(&log) {
            Err(PropError::InsufficientHistory { got, need }) => {
                assert_eq!(got, 4);
                assert_eq!(need, 5);
            }
            other => panic!("expected InsufficientHistory, got {other:?}"),
        }

        let five: Vec<GameRecord> = (1..=5).map(|d| record(d, 10.0)).collect();
        let log = GameLog::from_records(five).expect("log");
        assert!(trailing_features(&log).is_ok());
    }

    #[test]
    fn records_before_the_window_do_not_matter() {
        let mut a: Vec<GameRecord> = vec![record(1, 99.0), record(2, 1.0)];
        let mut b: Vec<GameRecord> = vec![record(1, 1.0), record(2, 99.0)];
        for day in 3..=7 {
            a.push(record(day, 10.0));
            b.push(record(day, 10.0));
        }
        let fa = trailing_features(&GameLog::from_records(a).expect("log")).expect("fa");
        let fb = trailing_features(&GameLog::from_records(b).expect("log")).expect("fb");
        assert_eq!(fa, fb);
    }

    #[test]
    fn feature_columns_line_up_with_stats() {
        let cols = feature_columns();
        assert_eq!(cols[Stat::Points.ordinal()], "PTS_L5");
        assert_eq!(cols[Stat::Minutes.ordinal()], "MIN_L5");
        assert_eq!(cols.len(), Stat::ALL.len());
    }
}
