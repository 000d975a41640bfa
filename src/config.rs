use std::env;
use std::path::PathBuf;

use crate::forest::ForestParams;

const DEFAULT_SEASON: &str = "2025-26";
const DEFAULT_BASE_URL: &str = "https://stats.nba.com/stats";
const DEFAULT_DATASET_PATH: &str = "data/training.csv";
const DEFAULT_SEED: u64 = 42;

/// Process-wide settings, resolved from the environment once at startup.
/// `.env` / `.env.local` are loaded by `main` before this runs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub season: String,
    pub base_url: String,
    pub dataset_path: PathBuf,
    pub forest: ForestParams,
    pub seed: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let season = env::var("HOOP_SEASON")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SEASON.to_string());
        let base_url = env::var("NBA_STATS_BASE_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let dataset_path = env::var("HOOP_DATASET")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH));

        let defaults = ForestParams::default();
        let forest = ForestParams {
            n_trees: env_usize("FOREST_TREES", defaults.n_trees).clamp(10, 500),
            max_depth: env_usize("FOREST_DEPTH", defaults.max_depth).clamp(2, 16),
            min_leaf: env_usize("FOREST_MIN_LEAF", defaults.min_leaf).clamp(2, 64),
        };

        let seed = env::var("HOOP_SEED")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_SEED);

        Self {
            season,
            base_url,
            dataset_path,
            forest,
            seed,
        }
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}
