use chrono::NaiveDate;

use crate::config::AppConfig;
use crate::defense_rank::{DefensiveRanking, Matchup, TeamDefenseRow};
use crate::edge::{compare_to_line, LineComparison};
use crate::errors::PropError;
use crate::features::{trailing_features, WINDOW};
use crate::game_log::{GameLog, Stat};
use crate::league_fetch::{fetch_scoreboard, opponent_for, ScheduledGame};
use crate::prop_model::{train_models, PropPrediction, StatModelSet};
use crate::training_data::load_training_table;

/// The long-lived core: trained models plus the league defensive ranking,
/// both constructed up front and read-only between explicit refreshes. All
/// player context arrives as arguments; the advisor holds no per-request
/// state.
pub struct PropAdvisor {
    models: StatModelSet,
    ranking: DefensiveRanking,
}

/// Load the static dataset and fit the per-stat models. A missing feature
/// column aborts here, before anything is served.
pub fn train_from_dataset(cfg: &AppConfig) -> Result<StatModelSet, PropError> {
    let table = load_training_table(&cfg.dataset_path)?;
    train_models(&table, &cfg.forest, cfg.seed)
}

impl PropAdvisor {
    pub fn new(models: StatModelSet, ranking: DefensiveRanking) -> Self {
        Self { models, ranking }
    }

    pub fn models(&self) -> &StatModelSet {
        &self.models
    }

    pub fn ranking(&self) -> &DefensiveRanking {
        &self.ranking
    }

    /// Swap in a freshly computed league aggregate. Wholesale replacement,
    /// never a partial update.
    pub fn refresh_ranking(&mut self, rows: &[TeamDefenseRow]) {
        self.ranking = DefensiveRanking::from_rows(rows);
    }

    /// Predictions for the player behind `log`. The history check happens
    /// here, before feature extraction, so a short log surfaces as
    /// `InsufficientHistory` instead of a prediction from fabricated
    /// features.
    pub fn predict_for_log(&self, log: &GameLog) -> Result<PropPrediction, PropError> {
        if log.len() < WINDOW {
            return Err(PropError::InsufficientHistory {
                got: log.len(),
                need: WINDOW,
            });
        }
        let features = trailing_features(log)?;
        Ok(self.models.predict(&features))
    }

    /// Matchup classification for `team_id`'s scheduled opponent on `date`.
    /// `Unknown` (no game that day, or the opponent missing from the
    /// ranking) is an answer, not an error; only transport failure errors.
    pub fn matchup(
        &self,
        cfg: &AppConfig,
        team_id: u64,
        date: NaiveDate,
    ) -> Result<Matchup, PropError> {
        let games = fetch_scoreboard(cfg, date)?;
        Ok(self.matchup_on_slate(&games, team_id))
    }

    pub fn matchup_on_slate(&self, games: &[ScheduledGame], team_id: u64) -> Matchup {
        match opponent_for(games, team_id) {
            Some(opponent_id) => self.ranking.classify(opponent_id),
            None => Matchup::Unknown,
        }
    }

    /// Edge of a predicted stat against a quoted line; `None` when no model
    /// produced a prediction for that stat.
    pub fn edge(
        &self,
        prediction: &PropPrediction,
        stat: Stat,
        line: f64,
    ) -> Option<LineComparison> {
        prediction
            .get(stat)
            .map(|predicted| compare_to_line(stat, predicted, line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::LineSide;
    use crate::forest::ForestParams;
    use crate::game_log::GameRecord;
    use crate::training_data::read_training_table;
    use chrono::NaiveDate;
    use std::fmt::Write as _;
    use std::io::Cursor;

    fn trained_advisor() -> PropAdvisor {
        let mut csv_text =
            String::from("MIN_L5,PTS_L5,REB_L5,AST_L5,STL_L5,BLK_L5,PTS,REB,AST,STL,BLK\n");
        for i in 0..40 {
            let pts = 12.0 + (i % 10) as f64;
            writeln!(
                csv_text,
                "32,{pts},6,5,1,0.5,{t},6.1,5.0,1.0,0.4",
                t = pts + 0.5
            )
            .unwrap();
        }
        let table = read_training_table(Cursor::new(csv_text)).expect("table");
        let models = train_models(&table, &ForestParams::default(), 11).expect("models");

        let rows: Vec<TeamDefenseRow> = (1..=30)
            .map(|k| TeamDefenseRow {
                team_id: k,
                team: format!("Team {k}"),
                points_allowed: 100.0 + k as f64,
            })
            .collect();
        PropAdvisor::new(models, DefensiveRanking::from_rows(&rows))
    }

    fn log_of(games: usize) -> GameLog {
        let records: Vec<GameRecord> = (1..=games)
            .map(|d| GameRecord {
                date: NaiveDate::from_ymd_opt(2025, 11, d as u32).expect("date"),
                minutes: 32.0,
                points: 15.0,
                rebounds: 6.0,
                assists: 5.0,
                steals: 1.0,
                blocks: 0.5,
            })
            .collect();
        GameLog::from_records(records).expect("log")
    }

    #[test]
    fn short_log_is_rejected_before_prediction() {
        let advisor = trained_advisor();
        match advisor.predict_for_log(&log_of(3)) {
            Err(PropError::InsufficientHistory { got, need }) => {
                assert_eq!((got, need), (3, WINDOW));
            }
            other => panic!("expected InsufficientHistory, got {other:?}"),
        }
        assert!(advisor.predict_for_log(&log_of(5)).is_ok());
    }

    #[test]
    fn slate_matchup_uses_opponent_rank() {
        let advisor = trained_advisor();
        let games = [ScheduledGame {
            home_team_id: 5,
            visitor_team_id: 25,
        }];
        assert_eq!(advisor.matchup_on_slate(&games, 25), Matchup::Hard);
        assert_eq!(advisor.matchup_on_slate(&games, 5), Matchup::Easy);
        assert_eq!(advisor.matchup_on_slate(&games, 12), Matchup::Unknown);
        assert_eq!(advisor.matchup_on_slate(&[], 5), Matchup::Unknown);
    }

    #[test]
    fn edge_reads_the_predicted_value() {
        let advisor = trained_advisor();
        let prediction = advisor.predict_for_log(&log_of(6)).expect("prediction");
        let cmp = advisor
            .edge(&prediction, Stat::Points, 0.5)
            .expect("points edge");
        assert_eq!(cmp.side, LineSide::Over);
    }

    #[test]
    fn refresh_replaces_the_ranking_wholesale() {
        let mut advisor = trained_advisor();
        assert_eq!(advisor.ranking().len(), 30);
        advisor.refresh_ranking(&[TeamDefenseRow {
            team_id: 42,
            team: "Solo".into(),
            points_allowed: 99.0,
        }]);
        assert_eq!(advisor.ranking().len(), 1);
        assert_eq!(advisor.ranking().rank_of(42), Some(1));
        assert_eq!(advisor.ranking().rank_of(5), None);
    }
}
