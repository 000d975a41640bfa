use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};

use hoop_edge::advisor::{train_from_dataset, PropAdvisor};
use hoop_edge::config::AppConfig;
use hoop_edge::defense_rank::{DefensiveRanking, Matchup};
use hoop_edge::errors::PropError;
use hoop_edge::game_log::{GameLog, Stat};
use hoop_edge::gamelog_fetch::{fetch_player_game_log, fetch_player_index, find_player};
use hoop_edge::league_fetch::fetch_league_defense;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(player_query) = parse_player_arg(&args) else {
        eprintln!("usage: hoop_edge \"Player Name\" [--date YYYY-MM-DD] [PTS=27.5 REB=7.5 ...]");
        return Err(anyhow!("no player name given"));
    };
    let date = parse_date_arg(&args).unwrap_or_else(|| Local::now().date_naive());
    let lines = parse_line_args(&args);

    let cfg = AppConfig::from_env();

    // Models are built once, up front. A malformed dataset stops the run
    // here instead of producing silently degraded predictions later.
    let models = match train_from_dataset(&cfg) {
        Ok(models) => models,
        Err(err @ PropError::MissingFeatureColumns { .. }) => {
            eprintln!("[WARN] training dataset is malformed: {err}");
            return Err(err.into());
        }
        Err(err) => {
            eprintln!(
                "[WARN] training dataset unavailable at {}: {err}",
                cfg.dataset_path.display()
            );
            eprintln!("[WARN] run `cargo run --bin build_dataset` to prepare it");
            return Err(err.into());
        }
    };
    if models.is_empty() {
        return Err(anyhow!("no models could be trained from the dataset"));
    }
    eprintln!(
        "[INFO] trained models: {}",
        models
            .trained_targets()
            .iter()
            .map(|s| s.column())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let ranking = match fetch_league_defense(&cfg) {
        Ok(rows) => DefensiveRanking::from_rows(&rows),
        Err(err) => {
            eprintln!("[WARN] league defense aggregate unavailable: {err}");
            DefensiveRanking::default()
        }
    };
    let advisor = PropAdvisor::new(models, ranking);

    let listings = fetch_player_index(&cfg).map_err(|err| anyhow!("data unavailable: {err}"))?;
    let Some(player) = find_player(&listings, &player_query) else {
        return Err(anyhow!("player not found: {player_query}"));
    };
    println!("{} (#{})", player.name, player.id);

    let raw_rows = match fetch_player_game_log(&cfg, player.id) {
        Ok(rows) => rows,
        Err(err) => {
            println!("data unavailable: {err}");
            return Ok(());
        }
    };
    let log = match GameLog::from_raw_rows(&raw_rows) {
        Ok(log) => log,
        Err(PropError::EmptyLog) => {
            println!("no games played this season");
            return Ok(());
        }
        Err(err) => {
            println!("data unavailable: {err}");
            return Ok(());
        }
    };

    let prediction = match advisor.predict_for_log(&log) {
        Ok(prediction) => prediction,
        Err(err @ PropError::InsufficientHistory { .. }) => {
            let short = err.games_short().unwrap_or_default();
            println!("insufficient data: need {short} more games");
            return Ok(());
        }
        Err(err) => {
            println!("data unavailable: {err}");
            return Ok(());
        }
    };

    println!("\nPredicted line ({} games logged):", log.len());
    for (stat, value) in prediction.iter() {
        println!("  {:<4} {value:.1}", stat.column());
    }

    match advisor.matchup(&cfg, player.team_id, date) {
        Ok(matchup) => print_matchup(matchup, date),
        Err(err) => eprintln!("[WARN] matchup lookup failed: {err}"),
    }

    if !lines.is_empty() {
        println!("\nEdges:");
        for (stat, line) in lines {
            match advisor.edge(&prediction, stat, line) {
                Some(cmp) => println!(
                    "  {:<4} {:.1} vs {:.1}  ->  {:+.1}  {}",
                    stat.column(),
                    cmp.predicted,
                    cmp.line,
                    cmp.difference,
                    cmp.side.label()
                ),
                None => println!("  {:<4} no model for this stat", stat.column()),
            }
        }
    }

    Ok(())
}

fn print_matchup(matchup: Matchup, date: NaiveDate) {
    match matchup {
        Matchup::Unknown => println!("\nMatchup on {date}: UNKNOWN (no resolvable opponent)"),
        other => println!("\nMatchup on {date}: {}", other.label()),
    }
}

fn parse_player_arg(args: &[String]) -> Option<String> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--date" {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        if parse_stat_line(arg).is_some() {
            continue;
        }
        return Some(arg.clone());
    }
    None
}

fn parse_date_arg(args: &[String]) -> Option<NaiveDate> {
    for (idx, arg) in args.iter().enumerate() {
        let raw = if let Some(value) = arg.strip_prefix("--date=") {
            Some(value.to_string())
        } else if arg == "--date" {
            args.get(idx + 1).cloned()
        } else {
            None
        };
        if let Some(raw) = raw {
            if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                return Some(date);
            }
            eprintln!("[WARN] ignoring unparseable --date {raw}");
        }
    }
    None
}

/// `PTS=27.5` style prop-line arguments.
fn parse_line_args(args: &[String]) -> Vec<(Stat, f64)> {
    args.iter().filter_map(|arg| parse_stat_line(arg)).collect()
}

fn parse_stat_line(arg: &str) -> Option<(Stat, f64)> {
    let (name, value) = arg.split_once('=')?;
    let stat = Stat::from_column(name)?;
    if !Stat::TARGETS.contains(&stat) {
        return None;
    }
    let line = value.trim().parse::<f64>().ok()?;
    Some((stat, line))
}
