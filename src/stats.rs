use serde::Serialize;

use crate::data::model::Dataset;
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// FeatureSummary – seven order/central statistics for one feature
// ---------------------------------------------------------------------------

/// Statistic names, in display order. [`SummaryTable::by_statistic`] yields
/// its rows in this order.
pub const STAT_NAMES: [&str; 7] = ["min", "q1", "median", "mean", "q3", "max", "std"];

/// Distributional summary of one feature over one row subset.
///
/// All seven statistics are computed from the same non-null value list, so
/// they can never disagree about which rows were included. Every field is
/// NaN for an empty input; `std` is additionally NaN for a single value
/// (sample statistic, N−1 denominator).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub mean: f64,
    pub q3: f64,
    pub max: f64,
    pub std: f64,
}

impl FeatureSummary {
    /// Summarize a value list. The input need not be sorted.
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return FeatureSummary {
                min: f64::NAN,
                q1: f64::NAN,
                median: f64::NAN,
                mean: f64::NAN,
                q3: f64::NAN,
                max: f64::NAN,
                std: f64::NAN,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let n = sorted.len();

        let mean = sorted.iter().sum::<f64>() / n as f64;
        let std = if n < 2 {
            f64::NAN
        } else {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        };

        FeatureSummary {
            min: sorted[0],
            q1: percentile(&sorted, 0.25),
            median: percentile(&sorted, 0.5),
            mean,
            q3: percentile(&sorted, 0.75),
            max: sorted[n - 1],
            std,
        }
    }

    /// Statistic value by name, in the [`STAT_NAMES`] vocabulary.
    pub fn get(&self, stat: &str) -> Option<f64> {
        match stat {
            "min" => Some(self.min),
            "q1" => Some(self.q1),
            "median" => Some(self.median),
            "mean" => Some(self.mean),
            "q3" => Some(self.q3),
            "max" => Some(self.max),
            "std" => Some(self.std),
            _ => None,
        }
    }
}

/// Percentile with linear interpolation between closest ranks, over an
/// already sorted, non-empty slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

// ---------------------------------------------------------------------------
// SummaryTable – one summary per feature
// ---------------------------------------------------------------------------

/// Statistics table for a feature list: one [`FeatureSummary`] per feature,
/// in the caller's feature order. The by-feature and by-statistic views are
/// transposes of each other; both are available to the rendering layer.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryTable {
    features: Vec<String>,
    summaries: Vec<FeatureSummary>,
}

impl SummaryTable {
    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn get(&self, feature: &str) -> Option<&FeatureSummary> {
        self.features
            .iter()
            .position(|f| f == feature)
            .map(|i| &self.summaries[i])
    }

    /// Rows indexed by feature: `(feature, summary)`.
    pub fn by_feature(&self) -> impl Iterator<Item = (&str, &FeatureSummary)> {
        self.features
            .iter()
            .map(String::as_str)
            .zip(self.summaries.iter())
    }

    /// Rows indexed by statistic: `(statistic, one value per feature)`.
    pub fn by_statistic(&self) -> Vec<(&'static str, Vec<f64>)> {
        STAT_NAMES
            .iter()
            .map(|&stat| {
                let row = self
                    .summaries
                    .iter()
                    .map(|s| s.get(stat).unwrap_or(f64::NAN))
                    .collect();
                (stat, row)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Aggregation over a dataset
// ---------------------------------------------------------------------------

/// Summarize every feature in `features` over the given row subset.
///
/// Statistics are computed over the non-null numeric values within `rows`;
/// an empty subset yields NaN statistics rather than an error. A feature
/// name the dataset does not know is [`DashboardError::UnknownColumn`].
pub fn summarize(
    dataset: &Dataset,
    rows: &[usize],
    features: &[String],
) -> Result<SummaryTable, DashboardError> {
    let mut summaries = Vec::with_capacity(features.len());
    for feature in features {
        if !dataset.has_column(feature) {
            return Err(DashboardError::UnknownColumn(feature.clone()));
        }
        let values = dataset.numeric_column(feature, rows);
        summaries.push(FeatureSummary::of(&values));
    }
    Ok(SummaryTable {
        features: features.to_vec(),
        summaries,
    })
}

/// Two independent summaries meant for side-by-side display. No cross-group
/// statistic is computed.
#[derive(Debug, Clone, Serialize)]
pub struct GroupComparison {
    pub a: SummaryTable,
    pub b: SummaryTable,
    pub len_a: usize,
    pub len_b: usize,
}

/// Summarize the same feature list over two row subsets.
pub fn compare(
    dataset: &Dataset,
    rows_a: &[usize],
    rows_b: &[usize],
    features: &[String],
) -> Result<GroupComparison, DashboardError> {
    Ok(GroupComparison {
        a: summarize(dataset, rows_a, features)?,
        b: summarize(dataset, rows_b, features)?,
        len_a: rows_a.len(),
        len_b: rows_b.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{BatteryRecord, CellValue, Dataset};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn one_column_dataset(column: &str, values: &[Option<f64>]) -> Dataset {
        let records = values
            .iter()
            .enumerate()
            .map(|(i, v)| BatteryRecord {
                battery_id: format!("mp-{i}"),
                values: [(
                    column.to_string(),
                    v.map_or(CellValue::Null, CellValue::Float),
                )]
                .into_iter()
                .collect(),
            })
            .collect();
        Dataset::from_records(records)
    }

    #[test]
    fn one_to_five_scenario() {
        let s = FeatureSummary::of(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.q1, 2.0);
        assert_eq!(s.median, 3.0);
        assert_eq!(s.mean, 3.0);
        assert_eq!(s.q3, 4.0);
        assert_eq!(s.max, 5.0);
        assert!(close(s.std, 1.5811388300841898));
    }

    #[test]
    fn percentiles_interpolate_linearly() {
        let s = FeatureSummary::of(&[1.0, 2.0, 3.0, 4.0]);
        assert!(close(s.q1, 1.75));
        assert!(close(s.median, 2.5));
        assert!(close(s.q3, 3.25));
    }

    #[test]
    fn order_statistics_are_monotone() {
        let values = [4.2, -1.0, 7.7, 0.3, 2.2, 2.2, 9.9];
        let s = FeatureSummary::of(&values);
        assert!(s.min <= s.q1);
        assert!(s.q1 <= s.median);
        assert!(s.median <= s.q3);
        assert!(s.q3 <= s.max);
        assert!(s.std >= 0.0);
    }

    #[test]
    fn empty_input_yields_nan_not_panic() {
        let s = FeatureSummary::of(&[]);
        assert!(s.min.is_nan());
        assert!(s.mean.is_nan());
        assert!(s.std.is_nan());
    }

    #[test]
    fn single_value_has_nan_std() {
        let s = FeatureSummary::of(&[2.5]);
        assert_eq!(s.median, 2.5);
        assert!(s.std.is_nan());
    }

    #[test]
    fn summarize_skips_nulls() {
        let ds = one_column_dataset(
            "energy_grav",
            &[Some(1.0), None, Some(3.0), Some(5.0)],
        );
        let table = summarize(&ds, &ds.all_indices(), &["energy_grav".to_string()]).unwrap();
        let s = table.get("energy_grav").unwrap();
        assert_eq!(s.median, 3.0);
        assert_eq!(s.max, 5.0);
    }

    #[test]
    fn summarize_unknown_feature_fails() {
        let ds = one_column_dataset("a", &[Some(1.0)]);
        let err = summarize(&ds, &[0], &["b".to_string()]).unwrap_err();
        assert!(matches!(err, DashboardError::UnknownColumn(c) if c == "b"));
    }

    #[test]
    fn by_statistic_is_the_transpose() {
        let ds = one_column_dataset("v", &[Some(1.0), Some(2.0), Some(3.0)]);
        let table = summarize(&ds, &ds.all_indices(), &["v".to_string()]).unwrap();

        let by_stat = table.by_statistic();
        assert_eq!(by_stat.len(), STAT_NAMES.len());
        let summary = table.get("v").unwrap();
        for (stat, row) in by_stat {
            assert_eq!(row.len(), 1);
            let direct = summary.get(stat).unwrap();
            assert!(close(row[0], direct) || (row[0].is_nan() && direct.is_nan()));
        }
    }

    #[test]
    fn compare_keeps_groups_independent() {
        let ds = one_column_dataset("v", &[Some(1.0), Some(2.0), Some(10.0), Some(20.0)]);
        let cmp = compare(&ds, &[0, 1], &[2, 3], &["v".to_string()]).unwrap();
        assert_eq!(cmp.len_a, 2);
        assert_eq!(cmp.len_b, 2);
        assert!(close(cmp.a.get("v").unwrap().mean, 1.5));
        assert!(close(cmp.b.get("v").unwrap().mean, 15.0));
    }
}
