use std::collections::HashMap;

/// Rank cutoffs for matchup classification, fixed for a 30-team league.
/// Top third of defenses suppress scoring; bottom third inflate it.
const HARD_RANK_MAX: usize = 10;
const EASY_RANK_MIN: usize = 20;

/// One row of the league-wide defensive aggregate: total points a team has
/// allowed this season.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamDefenseRow {
    pub team_id: u64,
    pub team: String,
    pub points_allowed: f64,
}

/// How an opponent's defense bears on a player's expected output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matchup {
    /// Top-10 defense; expect suppressed output.
    Hard,
    Neutral,
    /// Bottom-third defense; expect inflated output.
    Easy,
    /// Opponent could not be resolved or is absent from the ranking.
    /// Reported as-is, never silently treated as neutral.
    Unknown,
}

impl Matchup {
    pub fn label(self) -> &'static str {
        match self {
            Matchup::Hard => "HARD",
            Matchup::Neutral => "NEUTRAL",
            Matchup::Easy => "EASY",
            Matchup::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedTeam {
    pub rank: usize,
    pub team_id: u64,
    pub team: String,
    pub points_allowed: f64,
}

/// Full-league defensive ranking, rank 1 = fewest points allowed. Rebuilt
/// wholesale from a fresh aggregate, never patched in place. The sort is
/// stable: teams tied on points allowed keep their input order, earlier row
/// taking the better rank.
#[derive(Debug, Clone, Default)]
pub struct DefensiveRanking {
    entries: Vec<RankedTeam>,
    rank_by_team: HashMap<u64, usize>,
}

impl DefensiveRanking {
    pub fn from_rows(rows: &[TeamDefenseRow]) -> DefensiveRanking {
        let mut ordered: Vec<&TeamDefenseRow> = rows.iter().collect();
        ordered.sort_by(|a, b| a.points_allowed.total_cmp(&b.points_allowed));

        let mut entries = Vec::with_capacity(ordered.len());
        let mut rank_by_team = HashMap::with_capacity(ordered.len());
        for (idx, row) in ordered.into_iter().enumerate() {
            let rank = idx + 1;
            entries.push(RankedTeam {
                rank,
                team_id: row.team_id,
                team: row.team.clone(),
                points_allowed: row.points_allowed,
            });
            rank_by_team.entry(row.team_id).or_insert(rank);
        }
        DefensiveRanking {
            entries,
            rank_by_team,
        }
    }

    pub fn entries(&self) -> &[RankedTeam] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rank_of(&self, team_id: u64) -> Option<usize> {
        self.rank_by_team.get(&team_id).copied()
    }

    /// Classify a team by its defensive rank. Absent teams are `Unknown`.
    pub fn classify(&self, team_id: u64) -> Matchup {
        match self.rank_of(team_id) {
            Some(rank) if rank <= HARD_RANK_MAX => Matchup::Hard,
            Some(rank) if rank >= EASY_RANK_MIN => Matchup::Easy,
            Some(_) => Matchup::Neutral,
            None => Matchup::Unknown,
        }
    }
}
