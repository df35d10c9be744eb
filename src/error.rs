use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Failures surfaced by the analytical layer.
///
/// "No trained model for this combination" is a routine, expected state and
/// is therefore represented as `Option::None` / an empty list by the lookup
/// operations, never as a variant here.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// A feature-group name that is not registered.
    #[error("unknown feature group: {0:?}")]
    UnknownGroup(String),

    /// A combination of feature-group names with no registered target list.
    #[error("no targets registered for group combination {0:?}")]
    UnknownGroupCombination(Vec<String>),

    /// An element symbol with no discharge-indicator column in the dataset.
    #[error("unknown element symbol: {0:?}")]
    UnknownElement(String),

    /// A column referenced by name that the dataset does not contain.
    #[error("column not found in dataset: {0:?}")]
    UnknownColumn(String),

    /// A battery id absent from the dataset.
    #[error("unknown battery id: {0:?}")]
    UnknownBattery(String),

    /// A projection subset with no coordinate columns or evaluation row.
    #[error("unknown projection subset: {0:?}")]
    UnknownSubset(String),

    /// The record store call failed or returned malformed data. Non-fatal
    /// for the page: callers render a warning and continue with the next
    /// independent section.
    #[error("record store query failed: {0}")]
    UpstreamQuery(String),
}
