use anyhow::{Context, Result};
use serde_json::Value;

use crate::config::AppConfig;
use crate::game_log::RawGameRow;
use crate::http_cache::fetch_json_cached;
use crate::http_client::{http_client, STATS_HEADERS};

/// One tabular block of a stats-provider response. Every endpoint this app
/// touches answers the same envelope: `resultSets: [{name, headers, rowSet}]`
/// with positional rows. Header casing has drifted across provider versions,
/// so lookups go through an uppercased copy.
#[derive(Debug, Clone)]
pub struct ResultSet {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Cell by row index and (case-insensitive) column name.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let key = column.to_ascii_uppercase();
        let idx = self.headers.iter().position(|h| *h == key)?;
        self.rows.get(row)?.get(idx)
    }
}

/// Pull the named result set out of a raw response body. `Ok(None)` means
/// the response parsed but carried no such set.
pub fn parse_result_set(raw: &str, name: &str) -> Result<Option<ResultSet>> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid stats json")?;
    let Some(sets) = root.get("resultSets").and_then(|v| v.as_array()) else {
        return Ok(None);
    };

    for set in sets {
        let set_name = set.get("name").and_then(|v| v.as_str()).unwrap_or("");
        if !set_name.eq_ignore_ascii_case(name) {
            continue;
        }
        let headers: Vec<String> = set
            .get("headers")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|h| h.as_str())
                    .map(|h| h.trim().to_ascii_uppercase())
                    .collect()
            })
            .unwrap_or_default();
        let rows: Vec<Vec<Value>> = set
            .get("rowSet")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|row| row.as_array().cloned())
                    .collect()
            })
            .unwrap_or_default();
        return Ok(Some(ResultSet { headers, rows }));
    }
    Ok(None)
}

pub(crate) fn cell_u64(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    value.as_str()?.trim().parse::<u64>().ok()
}

pub(crate) fn cell_string(value: &Value) -> Option<String> {
    let s = value.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// One row of the provider's active-player index, used to resolve a typed
/// name to a player id and current team.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerListing {
    pub id: u64,
    pub name: String,
    pub team_id: u64,
}

pub fn parse_player_index_json(raw: &str) -> Result<Vec<PlayerListing>> {
    let Some(set) = parse_result_set(raw, "CommonAllPlayers")? else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(set.rows().len());
    for row in 0..set.rows().len() {
        let Some(id) = set.cell(row, "PERSON_ID").and_then(cell_u64) else {
            continue;
        };
        let Some(name) = set.cell(row, "DISPLAY_FIRST_LAST").and_then(cell_string) else {
            continue;
        };
        let team_id = set
            .cell(row, "TEAM_ID")
            .and_then(cell_u64)
            .unwrap_or_default();
        out.push(PlayerListing { id, name, team_id });
    }
    Ok(out)
}

/// Case-insensitive name resolution: exact match wins, otherwise a unique
/// substring match.
pub fn find_player<'a>(listings: &'a [PlayerListing], query: &str) -> Option<&'a PlayerListing> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    if let Some(exact) = listings
        .iter()
        .find(|p| p.name.to_lowercase() == needle)
    {
        return Some(exact);
    }
    let mut matches = listings
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle));
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first)
}

pub fn parse_game_log_json(raw: &str) -> Result<Vec<RawGameRow>> {
    let Some(set) = parse_result_set(raw, "PlayerGameLog")? else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(set.rows().len());
    for row in set.rows() {
        let mut raw_row = RawGameRow::default();
        for (idx, header) in set.headers().iter().enumerate() {
            if let Some(value) = row.get(idx) {
                raw_row.cells.insert(header.clone(), value.clone());
            }
        }
        out.push(raw_row);
    }
    Ok(out)
}

pub fn fetch_player_index(cfg: &AppConfig) -> Result<Vec<PlayerListing>> {
    let client = http_client()?;
    let url = format!(
        "{}/commonallplayers?IsOnlyCurrentSeason=1&LeagueID=00&Season={}",
        cfg.base_url, cfg.season
    );
    let body = fetch_json_cached(client, &url, STATS_HEADERS).context("player index request")?;
    parse_player_index_json(&body)
}

/// The player's per-game rows for the season, raw. An empty Vec is a real
/// answer ("no games played"), distinct from a transport error.
pub fn fetch_player_game_log(cfg: &AppConfig, player_id: u64) -> Result<Vec<RawGameRow>> {
    let client = http_client()?;
    let url = format!(
        "{}/playergamelog?PlayerID={}&Season={}&SeasonType=Regular%20Season",
        cfg.base_url, player_id, cfg.season
    );
    let body = fetch_json_cached(client, &url, STATS_HEADERS).context("game log request")?;
    parse_game_log_json(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: u64, name: &str) -> PlayerListing {
        PlayerListing {
            id,
            name: name.to_string(),
            team_id: 1_610_612_747,
        }
    }

    #[test]
    fn exact_name_beats_substring() {
        let listings = vec![listing(1, "Jalen Green"), listing(2, "A.J. Green")];
        let hit = find_player(&listings, "jalen green").expect("player");
        assert_eq!(hit.id, 1);
    }

    #[test]
    fn ambiguous_substring_resolves_to_none() {
        let listings = vec![listing(1, "Jalen Green"), listing(2, "A.J. Green")];
        assert!(find_player(&listings, "green").is_none());
        assert_eq!(find_player(&listings, "jalen").map(|p| p.id), Some(1));
    }

    #[test]
    fn missing_result_set_is_empty_not_error() {
        let raw = r#"{"resource":"playergamelog","resultSets":[]}"#;
        assert!(parse_game_log_json(raw).expect("parse").is_empty());
        assert!(parse_player_index_json(raw).expect("parse").is_empty());
    }
}
