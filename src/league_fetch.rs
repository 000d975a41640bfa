use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::config::AppConfig;
use crate::defense_rank::TeamDefenseRow;
use crate::game_log::parse_stat_cell;
use crate::gamelog_fetch::{cell_string, cell_u64, parse_result_set};
use crate::http_cache::fetch_json_cached;
use crate::http_client::{http_client, STATS_HEADERS};

/// One scheduled game on a slate; team ids only, the caller does not need
/// names for opponent resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledGame {
    pub home_team_id: u64,
    pub visitor_team_id: u64,
}

/// The opponent a team faces on a slate, if it plays at all.
pub fn opponent_for(games: &[ScheduledGame], team_id: u64) -> Option<u64> {
    games.iter().find_map(|game| {
        if game.home_team_id == team_id {
            Some(game.visitor_team_id)
        } else if game.visitor_team_id == team_id {
            Some(game.home_team_id)
        } else {
            None
        }
    })
}

pub fn parse_league_defense_json(raw: &str) -> Result<Vec<TeamDefenseRow>> {
    let Some(set) = parse_result_set(raw, "LeagueDashTeamStats")? else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(set.rows().len());
    for row in 0..set.rows().len() {
        let Some(team_id) = set.cell(row, "TEAM_ID").and_then(cell_u64) else {
            continue;
        };
        let Some(points_allowed) = set.cell(row, "OPP_PTS").and_then(parse_stat_cell) else {
            continue;
        };
        let team = set
            .cell(row, "TEAM_NAME")
            .and_then(cell_string)
            .unwrap_or_else(|| team_id.to_string());
        out.push(TeamDefenseRow {
            team_id,
            team,
            points_allowed,
        });
    }
    Ok(out)
}

pub fn parse_scoreboard_json(raw: &str) -> Result<Vec<ScheduledGame>> {
    let Some(set) = parse_result_set(raw, "GameHeader")? else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(set.rows().len());
    for row in 0..set.rows().len() {
        let home = set.cell(row, "HOME_TEAM_ID").and_then(cell_u64);
        let visitor = set.cell(row, "VISITOR_TEAM_ID").and_then(cell_u64);
        if let (Some(home_team_id), Some(visitor_team_id)) = (home, visitor) {
            out.push(ScheduledGame {
                home_team_id,
                visitor_team_id,
            });
        }
    }
    Ok(out)
}

/// Season totals of points allowed, one row per team.
pub fn fetch_league_defense(cfg: &AppConfig) -> Result<Vec<TeamDefenseRow>> {
    let client = http_client()?;
    let url = format!(
        "{}/leaguedashteamstats?MeasureType=Opponent&PerMode=Totals&LeagueID=00&Season={}&SeasonType=Regular%20Season",
        cfg.base_url, cfg.season
    );
    let body = fetch_json_cached(client, &url, STATS_HEADERS).context("league defense request")?;
    parse_league_defense_json(&body)
}

/// The slate of games scheduled for one date. An empty Vec means no games
/// that day; opponent resolution then reports an unknown matchup.
pub fn fetch_scoreboard(cfg: &AppConfig, date: NaiveDate) -> Result<Vec<ScheduledGame>> {
    let client = http_client()?;
    let url = format!(
        "{}/scoreboardv2?GameDate={}&LeagueID=00&DayOffset=0",
        cfg.base_url,
        date.format("%m/%d/%Y")
    );
    let body = fetch_json_cached(client, &url, STATS_HEADERS).context("scoreboard request")?;
    parse_scoreboard_json(&body)
}
