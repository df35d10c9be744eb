//! Trained-model result records and their lookup.
//!
//! Records are materialized from the external record store once per session
//! ([`crate::session`]) and then filtered in memory: the dashboard selects a
//! model by feature-subset set-equality plus an exact response-variable
//! match.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::error::DashboardError;
use crate::registry::GroupKey;
use crate::store::RecordStore;

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// One trained model run: its configuration key and test-set metrics.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelResult {
    pub id: i64,
    /// Feature-group names the model was trained on. Stored unordered;
    /// compared by set-equality.
    pub feature_subset: Vec<String>,
    pub response_variable: String,
    pub r_squared: f64,
    pub rmse: f64,
    pub mae: f64,
}

impl ModelResult {
    pub fn subset_key(&self) -> GroupKey {
        GroupKey::new(self.feature_subset.iter().cloned())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectedFeature {
    pub model_id: i64,
    pub feature_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureImportance {
    pub model_id: i64,
    pub feature_name: String,
    pub importance: f64,
}

/// Linear models only.
#[derive(Debug, Clone, Deserialize)]
pub struct CoefficientInfo {
    pub model_id: i64,
    pub feature_name: String,
    pub coefficient: f64,
    pub p_value: f64,
}

/// Tree models only. Values are kept as raw JSON: the store mixes numeric
/// and string hyperparameters.
#[derive(Debug, Clone, Deserialize)]
pub struct Hyperparameter {
    pub model_id: i64,
    pub name: String,
    pub value: JsonValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Visualization {
    pub model_id: i64,
    pub vis_type: String,
    pub file_path: String,
}

// ---------------------------------------------------------------------------
// Model families and their store layout
// ---------------------------------------------------------------------------

/// The two trained-model families, mapping to their logical tables and
/// storage buckets in the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Linear,
    Xgboost,
}

/// Figure display order for linear models.
const LINEAR_VIS_ORDER: [&str; 3] = ["rfecv", "importance", "venn"];

/// Figure display order for tree models.
const XGBOOST_VIS_ORDER: [&str; 11] = [
    "importance",
    "rfecv",
    "learning_curve",
    "parity",
    "feature_importance",
    "network",
    "n_sii",
    "force_SV",
    "force_n_SII",
    "waterfall_SV",
    "waterfall_n_sii",
];

impl ModelFamily {
    pub fn models_table(self) -> &'static str {
        match self {
            ModelFamily::Linear => "regression_models",
            ModelFamily::Xgboost => "xgboost_models",
        }
    }

    pub fn selected_features_table(self) -> &'static str {
        match self {
            ModelFamily::Linear => "selected_features",
            ModelFamily::Xgboost => "xgboost_selected_features",
        }
    }

    pub fn feature_importance_table(self) -> &'static str {
        match self {
            ModelFamily::Linear => "feature_importance",
            ModelFamily::Xgboost => "xgboost_feature_importance",
        }
    }

    pub fn visualizations_table(self) -> &'static str {
        match self {
            ModelFamily::Linear => "visualizations",
            ModelFamily::Xgboost => "xgboost_visualizations",
        }
    }

    pub fn bucket(self) -> &'static str {
        match self {
            ModelFamily::Linear => "Visualisations",
            ModelFamily::Xgboost => "Tree_Visuals",
        }
    }

    /// Fixed figure order the results page walks through.
    pub fn vis_order(self) -> &'static [&'static str] {
        match self {
            ModelFamily::Linear => &LINEAR_VIS_ORDER,
            ModelFamily::Xgboost => &XGBOOST_VIS_ORDER,
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory lookup
// ---------------------------------------------------------------------------

/// Select the model trained on exactly this feature subset for this response
/// variable. Subset equality is set-equality; the response variable matches
/// exactly.
///
/// `None` is the routine "valid combination, no trained model yet" state,
/// not a failure. The data contract assumes at most one record per
/// combination; if duplicates exist anyway the first wins and a warning is
/// logged.
pub fn find_result<'a>(
    records: &'a [ModelResult],
    feature_subset: &GroupKey,
    response_variable: &str,
) -> Option<&'a ModelResult> {
    let mut matches = records.iter().filter(|r| {
        r.response_variable == response_variable && &r.subset_key() == feature_subset
    });
    let first = matches.next();
    let extra = matches.count();
    if extra > 0 {
        log::warn!(
            "{extra} duplicate result(s) for {feature_subset:?} / {response_variable:?}; \
             keeping the first"
        );
    }
    first
}

/// Distinct response variables with a trained model for this feature subset,
/// in record order. Empty when none exist; never an error.
pub fn available_targets(records: &[ModelResult], feature_subset: &GroupKey) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();
    for record in records {
        if &record.subset_key() == feature_subset
            && !targets.contains(&record.response_variable)
        {
            targets.push(record.response_variable.clone());
        }
    }
    targets
}

// ---------------------------------------------------------------------------
// Store fetches
// ---------------------------------------------------------------------------

fn decode<T: DeserializeOwned>(
    records: Vec<JsonValue>,
    table: &str,
) -> Result<Vec<T>, DashboardError> {
    records
        .into_iter()
        .map(|r| {
            serde_json::from_value(r)
                .map_err(|e| DashboardError::UpstreamQuery(format!("malformed {table} record: {e}")))
        })
        .collect()
}

/// All trained-model records of one family.
pub fn fetch_models(
    store: &dyn RecordStore,
    family: ModelFamily,
) -> Result<Vec<ModelResult>, DashboardError> {
    let table = family.models_table();
    decode(store.select_all(table)?, table)
}

pub fn fetch_selected_features(
    store: &dyn RecordStore,
    family: ModelFamily,
    model_id: i64,
) -> Result<Vec<SelectedFeature>, DashboardError> {
    let table = family.selected_features_table();
    decode(store.select_eq(table, "model_id", &json!(model_id))?, table)
}

/// Feature importances, most important first.
pub fn fetch_feature_importance(
    store: &dyn RecordStore,
    family: ModelFamily,
    model_id: i64,
) -> Result<Vec<FeatureImportance>, DashboardError> {
    let table = family.feature_importance_table();
    let mut rows: Vec<FeatureImportance> =
        decode(store.select_eq(table, "model_id", &json!(model_id))?, table)?;
    rows.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    Ok(rows)
}

/// Coefficient details for a linear model, most significant first.
pub fn fetch_coefficient_info(
    store: &dyn RecordStore,
    model_id: i64,
) -> Result<Vec<CoefficientInfo>, DashboardError> {
    let mut rows: Vec<CoefficientInfo> = decode(
        store.select_eq("coefficient_info", "model_id", &json!(model_id))?,
        "coefficient_info",
    )?;
    rows.sort_by(|a, b| a.p_value.total_cmp(&b.p_value));
    Ok(rows)
}

/// Hyperparameters for a tree model.
pub fn fetch_hyperparameters(
    store: &dyn RecordStore,
    model_id: i64,
) -> Result<Vec<Hyperparameter>, DashboardError> {
    decode(
        store.select_eq("xgboost_hyperparameters", "model_id", &json!(model_id))?,
        "xgboost_hyperparameters",
    )
}

/// Resolve a model's figures to public URLs, in the family's fixed display
/// order. A figure type with no stored file yields `None` so the caller can
/// render a placeholder in its slot.
pub fn visualization_urls(
    store: &dyn RecordStore,
    family: ModelFamily,
    model_id: i64,
) -> Result<Vec<(&'static str, Option<String>)>, DashboardError> {
    let table = family.visualizations_table();
    let stored: Vec<Visualization> =
        decode(store.select_eq(table, "model_id", &json!(model_id))?, table)?;

    Ok(family
        .vis_order()
        .iter()
        .map(|&vis_type| {
            let url = stored
                .iter()
                .find(|v| v.vis_type == vis_type)
                .map(|v| store.public_url(family.bucket(), &v.file_path));
            (vis_type, url)
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Per-model detail assembly
// ---------------------------------------------------------------------------

/// Everything the results page shows for one model, fetched section by
/// section. A failing section leaves its slot empty and records a warning;
/// the remaining sections are still fetched, so one bad query never blanks
/// the whole page.
#[derive(Debug, Clone, Default)]
pub struct ModelDetail {
    pub selected_features: Vec<SelectedFeature>,
    pub feature_importance: Vec<FeatureImportance>,
    /// Populated for linear models.
    pub coefficients: Vec<CoefficientInfo>,
    /// Populated for tree models.
    pub hyperparameters: Vec<Hyperparameter>,
    pub visualizations: Vec<(&'static str, Option<String>)>,
    /// One entry per failed section, for display as non-fatal warnings.
    pub warnings: Vec<String>,
}

pub fn model_detail(store: &dyn RecordStore, family: ModelFamily, model_id: i64) -> ModelDetail {
    let mut detail = ModelDetail::default();

    let mut section = |warnings: &mut Vec<String>, name: &str, err: DashboardError| {
        log::warn!("results section {name:?} failed: {err}");
        warnings.push(format!("{name}: {err}"));
    };

    match fetch_selected_features(store, family, model_id) {
        Ok(rows) => detail.selected_features = rows,
        Err(e) => section(&mut detail.warnings, "selected features", e),
    }
    match fetch_feature_importance(store, family, model_id) {
        Ok(rows) => detail.feature_importance = rows,
        Err(e) => section(&mut detail.warnings, "feature importance", e),
    }
    match family {
        ModelFamily::Linear => match fetch_coefficient_info(store, model_id) {
            Ok(rows) => detail.coefficients = rows,
            Err(e) => section(&mut detail.warnings, "coefficient info", e),
        },
        ModelFamily::Xgboost => match fetch_hyperparameters(store, model_id) {
            Ok(rows) => detail.hyperparameters = rows,
            Err(e) => section(&mut detail.warnings, "hyperparameters", e),
        },
    }
    match visualization_urls(store, family, model_id) {
        Ok(urls) => detail.visualizations = urls,
        Err(e) => section(&mut detail.warnings, "visualizations", e),
    }

    detail
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn result(id: i64, subset: &[&str], response: &str) -> ModelResult {
        ModelResult {
            id,
            feature_subset: subset.iter().map(|s| s.to_string()).collect(),
            response_variable: response.to_string(),
            r_squared: 0.9,
            rmse: 0.1,
            mae: 0.05,
        }
    }

    #[test]
    fn find_result_matches_subset_as_a_set() {
        let records = vec![
            result(1, &["Battery Properties", "Economic Feature"], "CCH"),
            result(2, &["Battery Properties"], "CCH"),
        ];
        let key = GroupKey::new(["Economic Feature", "Battery Properties"]);
        let hit = find_result(&records, &key, "CCH").unwrap();
        assert_eq!(hit.id, 1);

        // Same elements, other order: same record.
        let key2 = GroupKey::new(["Battery Properties", "Economic Feature"]);
        assert_eq!(find_result(&records, &key2, "CCH").unwrap().id, 1);
    }

    #[test]
    fn find_result_without_match_is_none() {
        let records = vec![result(1, &["Battery Properties"], "CCH")];
        let key = GroupKey::new(["Structural Encoding"]);
        assert!(find_result(&records, &key, "CCH").is_none());
        assert!(find_result(&records, &GroupKey::new(["Battery Properties"]), "ODP").is_none());
    }

    #[test]
    fn find_result_takes_first_of_duplicates() {
        let records = vec![
            result(7, &["Battery Properties"], "CCH"),
            result(8, &["Battery Properties"], "CCH"),
        ];
        let key = GroupKey::new(["Battery Properties"]);
        assert_eq!(find_result(&records, &key, "CCH").unwrap().id, 7);
    }

    #[test]
    fn available_targets_deduplicates_and_never_errors() {
        let key = GroupKey::new(["Battery Properties"]);
        assert!(available_targets(&[], &key).is_empty());

        let records = vec![
            result(1, &["Battery Properties"], "CCH"),
            result(2, &["Battery Properties"], "ODP"),
            result(3, &["Battery Properties"], "CCH"),
            result(4, &["Structural Encoding"], "HT"),
        ];
        assert_eq!(available_targets(&records, &key), vec!["CCH", "ODP"]);
    }

    #[test]
    fn fetch_models_decodes_store_records() {
        let mut store = MemoryStore::new();
        store.insert(
            "regression_models",
            json!({
                "id": 1,
                "feature_subset": ["Battery Properties"],
                "response_variable": "CCH",
                "r_squared": 0.87,
                "rmse": 0.2,
                "mae": 0.1
            }),
        );
        let models = fetch_models(&store, ModelFamily::Linear).unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].response_variable, "CCH");
    }

    #[test]
    fn malformed_store_record_is_an_upstream_error() {
        let mut store = MemoryStore::new();
        store.insert("regression_models", json!({"id": "not-a-number"}));
        let err = fetch_models(&store, ModelFamily::Linear).unwrap_err();
        assert!(matches!(err, DashboardError::UpstreamQuery(_)));
    }

    #[test]
    fn visualization_urls_follow_display_order() {
        let mut store = MemoryStore::new();
        store.insert(
            "visualizations",
            json!({"model_id": 1, "vis_type": "venn", "file_path": "m1/venn.png"}),
        );
        store.insert(
            "visualizations",
            json!({"model_id": 1, "vis_type": "rfecv", "file_path": "m1/rfecv.png"}),
        );

        let urls = visualization_urls(&store, ModelFamily::Linear, 1).unwrap();
        assert_eq!(urls.len(), 3);
        assert_eq!(urls[0].0, "rfecv");
        assert_eq!(
            urls[0].1.as_deref(),
            Some("memory://Visualisations/m1/rfecv.png")
        );
        // No importance plot stored: placeholder slot.
        assert_eq!(urls[1], ("importance", None));
        assert_eq!(
            urls[2].1.as_deref(),
            Some("memory://Visualisations/m1/venn.png")
        );
    }

    #[test]
    fn model_detail_sorts_importance_and_coefficients() {
        let mut store = MemoryStore::new();
        store.insert(
            "feature_importance",
            json!({"model_id": 1, "feature_name": "a", "importance": 0.2}),
        );
        store.insert(
            "feature_importance",
            json!({"model_id": 1, "feature_name": "b", "importance": 0.7}),
        );
        store.insert(
            "coefficient_info",
            json!({"model_id": 1, "feature_name": "a", "coefficient": 1.5, "p_value": 0.04}),
        );
        store.insert(
            "coefficient_info",
            json!({"model_id": 1, "feature_name": "b", "coefficient": -0.3, "p_value": 0.001}),
        );

        let detail = model_detail(&store, ModelFamily::Linear, 1);
        assert!(detail.warnings.is_empty());
        assert_eq!(detail.feature_importance[0].feature_name, "b");
        assert_eq!(detail.coefficients[0].feature_name, "b");
        assert!(detail.hyperparameters.is_empty());
    }

    #[test]
    fn model_detail_continues_past_a_bad_section() {
        let mut store = MemoryStore::new();
        // Malformed importance row; the other sections still come back.
        store.insert("feature_importance", json!({"model_id": 1}));
        store.insert(
            "selected_features",
            json!({"model_id": 1, "feature_name": "energy_grav"}),
        );

        let detail = model_detail(&store, ModelFamily::Linear, 1);
        assert_eq!(detail.warnings.len(), 1);
        assert_eq!(detail.selected_features.len(), 1);
        assert!(detail.feature_importance.is_empty());
        assert_eq!(detail.visualizations.len(), 3);
    }
}
