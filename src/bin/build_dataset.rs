use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use hoop_edge::config::AppConfig;
use hoop_edge::features::{feature_columns, window_features, WINDOW};
use hoop_edge::game_log::{GameLog, Stat};
use hoop_edge::gamelog_fetch::fetch_player_game_log;
use hoop_edge::player_store;

/// Out-of-band preparer of the static training CSV: ingest per-player season
/// logs into sqlite, then walk every stored log with the same rolling window
/// the live path uses and emit one (features, next-game targets) row per
/// game with enough prior history.
fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cfg = AppConfig::from_env();
    let db_path = parse_path_arg("--db")
        .or_else(player_store::default_db_path)
        .context("unable to resolve sqlite path")?;
    let out_path = parse_path_arg("--out").unwrap_or_else(|| cfg.dataset_path.clone());
    let player_ids = parse_player_ids_arg();

    let mut conn = player_store::open_db(&db_path)?;

    if let Some(ids) = player_ids {
        if ids.is_empty() {
            return Err(anyhow!("--players given but no ids parsed"));
        }
        eprintln!(
            "[INFO] ingesting {} players for season {}",
            ids.len(),
            cfg.season
        );
        let mut ingested = 0usize;
        for player_id in ids {
            match ingest_player(&cfg, &mut conn, player_id) {
                Ok(games) => {
                    ingested += 1;
                    eprintln!("[INFO] player {player_id}: {games} games stored");
                }
                Err(err) => eprintln!("[WARN] player {player_id}: {err}"),
            }
        }
        if ingested == 0 {
            return Err(anyhow!("no player logs could be ingested"));
        }
    }

    let rows = emit_training_csv(&conn, &cfg.season, &out_path)?;
    println!("Training dataset written");
    println!("DB:   {}", db_path.display());
    println!("CSV:  {}", out_path.display());
    println!("Rows: {rows}");
    Ok(())
}

fn ingest_player(
    cfg: &AppConfig,
    conn: &mut rusqlite::Connection,
    player_id: u64,
) -> Result<usize> {
    let raw_rows = fetch_player_game_log(cfg, player_id)?;
    let log = GameLog::from_raw_rows(&raw_rows)?;
    player_store::upsert_log(conn, player_id, &cfg.season, log.records())
}

fn emit_training_csv(
    conn: &rusqlite::Connection,
    season: &str,
    out_path: &std::path::Path,
) -> Result<usize> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let mut writer = csv::Writer::from_path(out_path)
        .with_context(|| format!("create {}", out_path.display()))?;

    let mut header: Vec<String> = feature_columns().iter().map(|c| c.to_string()).collect();
    header.extend(Stat::TARGETS.iter().map(|s| s.column().to_string()));
    writer.write_record(&header).context("write csv header")?;

    let mut rows_written = 0usize;
    for player_id in player_store::stored_player_ids(conn, season)? {
        let records = player_store::load_player_records(conn, player_id, season)?;
        // One training row per game with >= WINDOW prior games: trailing
        // features over the preceding window, targets from the game itself.
        for next in WINDOW..records.len() {
            let features = match window_features(&records[..next]) {
                Ok(features) => features,
                Err(_) => continue,
            };
            let target_game = &records[next];

            let mut row: Vec<String> = features
                .as_slice()
                .iter()
                .map(|v| format!("{v:.3}"))
                .collect();
            row.extend(
                Stat::TARGETS
                    .iter()
                    .map(|&stat| format!("{:.1}", target_game.stat(stat))),
            );
            writer.write_record(&row).context("write csv row")?;
            rows_written += 1;
        }
    }
    writer.flush().context("flush csv")?;
    Ok(rows_written)
}

fn parse_path_arg(name: &str) -> Option<PathBuf> {
    let prefix = format!("{name}=");
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&prefix) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}

fn parse_player_ids_arg() -> Option<Vec<u64>> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        let raw = if let Some(list) = arg.strip_prefix("--players=") {
            Some(list.to_string())
        } else if arg == "--players" {
            args.get(idx + 1).cloned()
        } else {
            None
        };
        if let Some(raw) = raw {
            let ids: Vec<u64> = raw
                .split(',')
                .filter_map(|part| part.trim().parse::<u64>().ok())
                .collect();
            return Some(ids);
        }
    }
    None
}
