use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::game_log::GameRecord;
use crate::http_cache::app_cache_dir;

/// Sqlite store of ingested per-player game logs, feeding the training-CSV
/// builder. Keyed on (player, date) so re-ingesting a season is an upsert,
/// not a duplicate.
pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("player_games.sqlite"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS player_games (
            player_id INTEGER NOT NULL,
            season TEXT NOT NULL,
            game_date TEXT NOT NULL,
            min REAL NOT NULL,
            pts REAL NOT NULL,
            reb REAL NOT NULL,
            ast REAL NOT NULL,
            stl REAL NOT NULL,
            blk REAL NOT NULL,
            PRIMARY KEY (player_id, game_date)
        );
        CREATE INDEX IF NOT EXISTS idx_player_games_season ON player_games(season);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

pub fn upsert_game(
    conn: &Connection,
    player_id: u64,
    season: &str,
    record: &GameRecord,
) -> Result<()> {
    conn.execute(
        "INSERT INTO player_games(player_id, season, game_date, min, pts, reb, ast, stl, blk)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(player_id, game_date) DO UPDATE SET
             season = excluded.season,
             min = excluded.min,
             pts = excluded.pts,
             reb = excluded.reb,
             ast = excluded.ast,
             stl = excluded.stl,
             blk = excluded.blk",
        params![
            player_id as i64,
            season,
            record.date.format("%Y-%m-%d").to_string(),
            record.minutes,
            record.points,
            record.rebounds,
            record.assists,
            record.steals,
            record.blocks,
        ],
    )
    .context("upsert player game")?;
    Ok(())
}

pub fn upsert_log(
    conn: &mut Connection,
    player_id: u64,
    season: &str,
    records: &[GameRecord],
) -> Result<usize> {
    let tx = conn.transaction().context("begin ingest transaction")?;
    for record in records {
        upsert_game(&tx, player_id, season, record)?;
    }
    tx.commit().context("commit ingest transaction")?;
    Ok(records.len())
}

pub fn stored_player_ids(conn: &Connection, season: &str) -> Result<Vec<u64>> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT player_id FROM player_games WHERE season = ?1 ORDER BY player_id")
        .context("prepare player id query")?;
    let ids = stmt
        .query_map(params![season], |row| row.get::<_, i64>(0))
        .context("query player ids")?
        .filter_map(|r| r.ok())
        .map(|id| id as u64)
        .collect();
    Ok(ids)
}

/// A player's stored games for a season, ascending by date.
pub fn load_player_records(
    conn: &Connection,
    player_id: u64,
    season: &str,
) -> Result<Vec<GameRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT game_date, min, pts, reb, ast, stl, blk
             FROM player_games
             WHERE player_id = ?1 AND season = ?2
             ORDER BY game_date ASC",
        )
        .context("prepare game query")?;
    let rows = stmt
        .query_map(params![player_id as i64, season], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, f64>(6)?,
            ))
        })
        .context("query player games")?;

    let mut records = Vec::new();
    for row in rows {
        let (date_raw, minutes, points, rebounds, assists, steals, blocks) =
            row.context("read player game row")?;
        let Ok(date) = NaiveDate::parse_from_str(&date_raw, "%Y-%m-%d") else {
            continue;
        };
        records.push(GameRecord {
            date,
            minutes,
            points,
            rebounds,
            assists,
            steals,
            blocks,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, points: f64) -> GameRecord {
        GameRecord {
            date: NaiveDate::from_ymd_opt(2025, 12, day).expect("date"),
            minutes: 30.0,
            points,
            rebounds: 5.0,
            assists: 4.0,
            steals: 1.0,
            blocks: 0.5,
        }
    }

    #[test]
    fn upsert_then_load_round_trips_in_date_order() {
        let mut conn = Connection::open_in_memory().expect("db");
        init_schema(&conn).expect("schema");

        let records = vec![record(9, 20.0), record(3, 10.0), record(6, 15.0)];
        upsert_log(&mut conn, 7, "2025-26", &records).expect("upsert");

        let loaded = load_player_records(&conn, 7, "2025-26").expect("load");
        let pts: Vec<f64> = loaded.iter().map(|r| r.points).collect();
        assert_eq!(pts, vec![10.0, 15.0, 20.0]);
        assert_eq!(stored_player_ids(&conn, "2025-26").expect("ids"), vec![7]);
    }

    #[test]
    fn reingest_updates_rather_than_duplicates() {
        let mut conn = Connection::open_in_memory().expect("db");
        init_schema(&conn).expect("schema");

        upsert_log(&mut conn, 7, "2025-26", &[record(3, 10.0)]).expect("first");
        let mut corrected = record(3, 12.0);
        corrected.rebounds = 8.0;
        upsert_log(&mut conn, 7, "2025-26", &[corrected]).expect("second");

        let loaded = load_player_records(&conn, 7, "2025-26").expect("load");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].points, 12.0);
        assert_eq!(loaded[0].rebounds, 8.0);
    }
}
