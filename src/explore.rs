//! Page-level selection pipelines: the battery-viewer interactions with the
//! rendering stripped away.

use crate::data::filter::filter_by_elements;
use crate::data::model::{CellValue, Dataset};
use crate::error::DashboardError;
use crate::registry::FeatureRegistry;
use crate::stats::{compare, summarize, GroupComparison, SummaryTable};

/// Everything the single-battery view needs: the whole-dataset distribution
/// of the group's features (box-plot background) and the chosen battery's
/// own values (marker overlay + value table).
#[derive(Debug, Clone)]
pub struct BatteryProfile {
    pub battery_id: String,
    pub summary: SummaryTable,
    /// The battery's value for each group feature, in group column order.
    pub battery_values: Vec<(String, CellValue)>,
}

/// Profile one battery against the full dataset for a feature group.
pub fn battery_profile(
    dataset: &Dataset,
    registry: &FeatureRegistry,
    battery_id: &str,
    group_name: &str,
) -> Result<BatteryProfile, DashboardError> {
    let features = registry.columns_for(group_name)?;
    let record = dataset
        .record_for(battery_id)
        .ok_or_else(|| DashboardError::UnknownBattery(battery_id.to_string()))?;

    let summary = summarize(dataset, &dataset.all_indices(), features)?;
    let battery_values = features
        .iter()
        .map(|col| {
            let value = record.get(col).cloned().unwrap_or(CellValue::Null);
            (col.clone(), value)
        })
        .collect();

    Ok(BatteryProfile {
        battery_id: battery_id.to_string(),
        summary,
        battery_values,
    })
}

/// Compare all batteries against the subset containing every selected
/// element, over one feature group. Side `a` is the full dataset, side `b`
/// the element-containing subset.
pub fn element_comparison(
    dataset: &Dataset,
    registry: &FeatureRegistry,
    element_symbols: &[String],
    group_name: &str,
) -> Result<GroupComparison, DashboardError> {
    let features = registry.columns_for(group_name)?;
    let all = dataset.all_indices();
    let matching = filter_by_elements(dataset, element_symbols)?;
    compare(dataset, &all, &matching, features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::BatteryRecord;

    fn registry() -> FeatureRegistry {
        let mut reg = FeatureRegistry::new();
        reg.register_group("Battery Properties", vec!["average_voltage", "energy_grav"]);
        reg
    }

    fn dataset() -> Dataset {
        let rows = [
            ("mp-1", 3.0, 5.0, 1.0),
            ("mp-2", 2.0, 3.0, 0.0),
            ("mp-3", 4.0, 7.0, 2.0),
        ];
        let records = rows
            .iter()
            .map(|(id, volt, energy, li)| BatteryRecord {
                battery_id: id.to_string(),
                values: [
                    ("average_voltage".to_string(), CellValue::Float(*volt)),
                    ("energy_grav".to_string(), CellValue::Float(*energy)),
                    (
                        "Li_formula_discharge".to_string(),
                        CellValue::Float(*li),
                    ),
                ]
                .into_iter()
                .collect(),
            })
            .collect();
        Dataset::from_records(records)
    }

    #[test]
    fn profile_pairs_summary_with_battery_values() {
        let profile =
            battery_profile(&dataset(), &registry(), "mp-2", "Battery Properties").unwrap();
        assert_eq!(profile.battery_id, "mp-2");
        assert_eq!(profile.summary.get("energy_grav").unwrap().max, 7.0);
        assert_eq!(
            profile.battery_values,
            vec![
                ("average_voltage".to_string(), CellValue::Float(2.0)),
                ("energy_grav".to_string(), CellValue::Float(3.0)),
            ]
        );
    }

    #[test]
    fn profile_of_unknown_battery_fails() {
        let err =
            battery_profile(&dataset(), &registry(), "mp-99", "Battery Properties").unwrap_err();
        assert!(matches!(err, DashboardError::UnknownBattery(_)));
    }

    #[test]
    fn comparison_puts_full_dataset_on_side_a() {
        let cmp = element_comparison(
            &dataset(),
            &registry(),
            &["Li".to_string()],
            "Battery Properties",
        )
        .unwrap();
        assert_eq!(cmp.len_a, 3);
        assert_eq!(cmp.len_b, 2);
        assert_eq!(cmp.b.get("energy_grav").unwrap().min, 5.0);
    }
}
