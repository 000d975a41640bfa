use rayon::prelude::*;

use crate::errors::PropError;
use crate::features::{feature_columns, FeatureVector};
use crate::forest::{ForestParams, RegressionForest};
use crate::game_log::Stat;
use crate::training_data::TrainingTable;

fn target_index(stat: Stat) -> Option<usize> {
    Stat::TARGETS.iter().position(|&t| t == stat)
}

/// One trained forest per target stat the dataset covered. Built once at
/// startup and read-only afterwards; never persisted.
#[derive(Debug)]
pub struct StatModelSet {
    models: [Option<RegressionForest>; Stat::TARGETS.len()],
}

impl StatModelSet {
    pub fn has_model(&self, stat: Stat) -> bool {
        target_index(stat).is_some_and(|i| self.models[i].is_some())
    }

    pub fn trained_targets(&self) -> Vec<Stat> {
        Stat::TARGETS
            .into_iter()
            .filter(|&stat| self.has_model(stat))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.models.iter().all(|m| m.is_none())
    }

    /// Apply every trained model to the player's current features. The
    /// result covers exactly the stats a model exists for; a reduced set is
    /// normal when the dataset lacked some target column.
    pub fn predict(&self, features: &FeatureVector) -> PropPrediction {
        let mut values = [None; Stat::TARGETS.len()];
        for (idx, model) in self.models.iter().enumerate() {
            if let Some(model) = model {
                values[idx] = Some(round1(model.predict(features.as_slice())));
            }
        }
        PropPrediction { values }
    }
}

/// Per-stat point predictions, each rounded to one decimal place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropPrediction {
    values: [Option<f64>; Stat::TARGETS.len()],
}

impl PropPrediction {
    pub fn get(&self, stat: Stat) -> Option<f64> {
        target_index(stat).and_then(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, f64)> + '_ {
        Stat::TARGETS
            .into_iter()
            .filter_map(|stat| self.get(stat).map(|v| (stat, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| v.is_none())
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Fit one forest per target stat from the static training table.
///
/// A missing feature column is fatal: a model set trained on a subset of the
/// feature contract would silently disagree with live extraction. A missing
/// target column only skips that one model. Each target trains from its own
/// rng seeded `base_seed + target position`, so results do not depend on
/// rayon scheduling and adding a target never reshuffles existing models.
pub fn train_models(
    table: &TrainingTable,
    params: &ForestParams,
    base_seed: u64,
) -> Result<StatModelSet, PropError> {
    let feature_names = feature_columns();
    let missing: Vec<String> = feature_names
        .iter()
        .filter(|name| !table.has_column(name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PropError::MissingFeatureColumns { missing });
    }

    let trained: Vec<(usize, Option<RegressionForest>)> = Stat::TARGETS
        .into_par_iter()
        .enumerate()
        .map(|(idx, stat)| {
            if !table.has_column(stat.column()) {
                return (idx, None);
            }
            let (rows, targets) = table.rows_for_target(&feature_names, stat.column());
            let seed = base_seed.wrapping_add(idx as u64);
            (idx, RegressionForest::fit(&rows, &targets, params, seed))
        })
        .collect();

    let mut models: [Option<RegressionForest>; Stat::TARGETS.len()] =
        std::array::from_fn(|_| None);
    for (idx, model) in trained {
        models[idx] = model;
    }
    Ok(StatModelSet { models })
}
