use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

/// The static training table, prepared out of band by `build_dataset`.
/// Columns are keyed by uppercased header name; blank or unparseable cells
/// load as `None` so per-target fitting can drop them row by row.
#[derive(Debug, Clone)]
pub struct TrainingTable {
    columns: HashMap<String, Vec<Option<f64>>>,
    n_rows: usize,
}

impl TrainingTable {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(&name.to_ascii_uppercase())
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .get(&name.to_ascii_uppercase())
            .map(|c| c.as_slice())
    }

    pub fn len(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Rows where every named feature column has a value AND the target
    /// column has a value, as (feature row, target) pairs. Rows missing the
    /// target are excluded here but stay available to other targets.
    pub fn rows_for_target(
        &self,
        feature_names: &[&str],
        target_name: &str,
    ) -> (Vec<Vec<f64>>, Vec<f64>) {
        let features: Vec<&[Option<f64>]> = feature_names
            .iter()
            .filter_map(|name| self.column(name))
            .collect();
        let Some(target) = self.column(target_name) else {
            return (Vec::new(), Vec::new());
        };
        if features.len() != feature_names.len() {
            return (Vec::new(), Vec::new());
        }

        let mut rows = Vec::new();
        let mut targets = Vec::new();
        'row: for i in 0..self.n_rows {
            let Some(y) = target[i] else { continue };
            let mut row = Vec::with_capacity(features.len());
            for col in &features {
                let Some(x) = col[i] else { continue 'row };
                row.push(x);
            }
            rows.push(row);
            targets.push(y);
        }
        (rows, targets)
    }
}

pub fn load_training_table(path: &Path) -> Result<TrainingTable> {
    let file = File::open(path)
        .with_context(|| format!("open training dataset {}", path.display()))?;
    read_training_table(file)
}

pub fn read_training_table(reader: impl Read) -> Result<TrainingTable> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv
        .headers()
        .context("read training dataset header row")?
        .iter()
        .map(|h| h.trim().to_ascii_uppercase())
        .collect();

    let mut columns: HashMap<String, Vec<Option<f64>>> =
        headers.iter().map(|h| (h.clone(), Vec::new())).collect();
    let mut n_rows = 0usize;

    for record in csv.records() {
        let record = record.context("read training dataset row")?;
        for (idx, header) in headers.iter().enumerate() {
            let cell = record.get(idx).unwrap_or("");
            let value = if cell.is_empty() {
                None
            } else {
                cell.parse::<f64>().ok()
            };
            if let Some(col) = columns.get_mut(header) {
                col.push(value);
            }
        }
        n_rows += 1;
    }

    Ok(TrainingTable { columns, n_rows })
}
