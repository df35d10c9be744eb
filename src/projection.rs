//! Precomputed dimensionality-reduction coordinates and their quality
//! metrics, loaded read-only from two delimited files.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::data::loader::read_csv_table;
use crate::data::model::CellValue;
use crate::error::DashboardError;

/// One chart-ready point: embedding coordinates plus the value of the chosen
/// coloring target.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionPoint {
    pub x: f64,
    pub y: f64,
    pub target: CellValue,
}

/// Embedding-quality scalars for one feature subset.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionEvaluation {
    pub method: String,
    pub trustworthiness: f64,
    pub continuity: f64,
    pub kl_divergence: f64,
}

/// The projection coordinate table (`<subset>_x` / `<subset>_y` column pairs
/// plus target columns) paired with one evaluation row per subset.
#[derive(Debug, Clone)]
pub struct ProjectionSet {
    columns: Vec<String>,
    rows: Vec<BTreeMap<String, CellValue>>,
    evaluations: Vec<ProjectionEvaluation>,
}

impl ProjectionSet {
    /// Load the coordinate and evaluation files.
    pub fn load(coords_path: &Path, evals_path: &Path) -> Result<Self> {
        let (columns, rows) = read_csv_table(coords_path).context("loading coordinate file")?;

        let (_, eval_rows) = read_csv_table(evals_path).context("loading evaluation file")?;
        let evaluations = eval_rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let method = match row.get("method") {
                    Some(CellValue::Text(s)) => s.clone(),
                    _ => bail!("evaluation row {i}: missing 'method'"),
                };
                let metric = |name: &str| -> Result<f64> {
                    row.get(name)
                        .and_then(CellValue::as_f64)
                        .with_context(|| format!("evaluation row {i}: missing numeric {name:?}"))
                };
                Ok(ProjectionEvaluation {
                    method,
                    trustworthiness: metric("trustworthiness")?,
                    continuity: metric("continuity")?,
                    kl_divergence: metric("kl_divergence")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ProjectionSet {
            columns,
            rows,
            evaluations,
        })
    }

    /// Subset names derived from the `*_x` coordinate columns, in file
    /// column order.
    pub fn subsets(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter_map(|c| c.strip_suffix("_x"))
            .collect()
    }

    /// Chart-ready points for one subset, colored by `target`. Rows whose
    /// coordinates are not numeric are skipped; a null target is kept so the
    /// rendering layer can show it as uncolored.
    pub fn coordinates(
        &self,
        subset: &str,
        target: &str,
    ) -> Result<Vec<ProjectionPoint>, DashboardError> {
        let x_col = format!("{subset}_x");
        let y_col = format!("{subset}_y");
        if !self.columns.contains(&x_col) || !self.columns.contains(&y_col) {
            return Err(DashboardError::UnknownSubset(subset.to_string()));
        }
        if !self.columns.iter().any(|c| c == target) {
            return Err(DashboardError::UnknownColumn(target.to_string()));
        }

        Ok(self
            .rows
            .iter()
            .filter_map(|row| {
                let x = row.get(&x_col).and_then(CellValue::as_f64)?;
                let y = row.get(&y_col).and_then(CellValue::as_f64)?;
                let target = row.get(target).cloned().unwrap_or(CellValue::Null);
                Some(ProjectionPoint { x, y, target })
            })
            .collect())
    }

    /// Quality metrics for one subset.
    pub fn evaluation(&self, subset: &str) -> Result<&ProjectionEvaluation, DashboardError> {
        self.evaluations
            .iter()
            .find(|e| e.method == subset)
            .ok_or_else(|| DashboardError::UnknownSubset(subset.to_string()))
    }
}
