pub mod advisor;
pub mod config;
pub mod defense_rank;
pub mod edge;
pub mod errors;
pub mod features;
pub mod forest;
pub mod game_log;
pub mod gamelog_fetch;
pub mod http_cache;
pub mod http_client;
pub mod league_fetch;
pub mod player_store;
pub mod prop_model;
pub mod training_data;
