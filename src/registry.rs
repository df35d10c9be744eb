use std::collections::BTreeMap;

use crate::data::filter::indicator_column;
use crate::data::model::Dataset;
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// GroupKey – canonical key for a combination of feature groups
// ---------------------------------------------------------------------------

/// A sorted, deduplicated set of feature-group names.
///
/// Target lists are keyed by combinations of groups (impact crosses group
/// boundaries), and callers supply the combination in whatever order their
/// widgets produce. Canonicalizing at construction makes every lookup
/// order- and duplicate-insensitive by construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey(Vec<String>);

impl GroupKey {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        GroupKey(names)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Registry content
// ---------------------------------------------------------------------------

pub const STRUCTURAL_ENCODING: &str = "Structural Encoding";
pub const BATTERY_PROPERTIES: &str = "Battery Properties";
pub const ENVIRONMENTAL_IMPACT: &str = "Environmental Impact Features";
pub const SOCIOECONOMIC_IMPACT: &str = "Socioeconomic Impact Features";
pub const ECONOMIC: &str = "Economic Feature";

/// Elements with a discharge-indicator column, in registration order.
const ELEMENTS: [&str; 77] = [
    "Li", "C", "In", "Bi", "Na", "Tl", "Sb", "K", "Rb", "Mg", "Mn", "O", "Ca", "Nb", "S", "Co",
    "Al", "Cu", "Zn", "Ni", "Ti", "As", "Cs", "Sn", "Sc", "Si", "P", "Mo", "Cr", "V", "Ge", "N",
    "Fe", "Pd", "Y", "Ga", "Pt", "Te", "Se", "F", "W", "Ho", "Ba", "Be", "La", "Sr", "Re", "Ta",
    "Pr", "Ir", "Cl", "I", "Lu", "Tb", "Tm", "Er", "Ag", "Zr", "Dy", "Cd", "H", "Br", "Ce", "B",
    "Tc", "Rh", "Nd", "U", "Gd", "Ru", "Au", "Hg", "Sm", "Hf", "Yb", "Pb", "Eu",
];

const BATTERY_PROPERTY_COLUMNS: [&str; 14] = [
    "average_voltage",
    "capacity_grav",
    "energy_grav",
    "max_delta_volume",
    "working_ion_Al",
    "working_ion_Ca",
    "working_ion_Cs",
    "working_ion_K",
    "working_ion_Li",
    "working_ion_Mg",
    "working_ion_Na",
    "working_ion_Rb",
    "working_ion_Y",
    "working_ion_Zn",
];

const ENVIRONMENTAL_COLUMNS: [&str; 19] = [
    "ADP (Kg)",
    "CCH",
    "ODP",
    "HT",
    "POF",
    "PM",
    "IR",
    "CCE",
    "TA",
    "FE",
    "TET",
    "FET",
    "MET",
    "ALO",
    "ULO",
    "NLT",
    "Human Health",
    "Eco- systems",
    "Criticality EI Score",
];

const SOCIOECONOMIC_COLUMNS: [&str; 12] = [
    "Political Stability",
    "Demand growth",
    "Mining capacity",
    "Concentration of reserves",
    "Concentration of production",
    "Trade barriers",
    "Feasability of exploration projects",
    "Price volatility",
    "Occurence of co-production",
    "Primary material use",
    "Company concentration",
    "(Non) compliance with social standards",
];

const ECONOMIC_COLUMNS: [&str; 1] = ["Price (latest, 1998)"];

const CRITICALITY_COLUMNS: [&str; 3] = ["UK_Critical", "US_Critical", "EU_Critical"];

// ---------------------------------------------------------------------------
// FeatureRegistry
// ---------------------------------------------------------------------------

/// Static configuration mapping group names to ordered column lists, and
/// group combinations to their valid coloring targets. Built once at
/// startup; never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct FeatureRegistry {
    /// Registration-ordered (name, columns) pairs.
    groups: Vec<(String, Vec<String>)>,
    targets: BTreeMap<GroupKey, Vec<String>>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_group<S: Into<String>>(&mut self, name: &str, columns: Vec<S>) {
        self.groups.push((
            name.to_string(),
            columns.into_iter().map(Into::into).collect(),
        ));
    }

    pub fn register_targets<S: Into<String>>(&mut self, key: GroupKey, targets: Vec<S>) {
        self.targets
            .insert(key, targets.into_iter().map(Into::into).collect());
    }

    /// Group names in registration order.
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Ordered column list for a registered group.
    pub fn columns_for(&self, group_name: &str) -> Result<&[String], DashboardError> {
        self.groups
            .iter()
            .find(|(n, _)| n == group_name)
            .map(|(_, cols)| cols.as_slice())
            .ok_or_else(|| DashboardError::UnknownGroup(group_name.to_string()))
    }

    /// Valid coloring targets for a group or combination of groups. The
    /// selector is canonicalized, so `["A", "B"]` and `["B", "A"]` resolve
    /// to the same entry.
    pub fn targets_for<I, S>(&self, group_selector: I) -> Result<&[String], DashboardError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = GroupKey::new(group_selector);
        self.targets
            .get(&key)
            .map(Vec::as_slice)
            .ok_or_else(|| DashboardError::UnknownGroupCombination(key.0))
    }

    /// Check that every registered group column exists in the dataset.
    /// Target columns are not checked: several live only in the projection
    /// coordinate file.
    pub fn validate_against(&self, dataset: &Dataset) -> Result<(), DashboardError> {
        for (_, columns) in &self.groups {
            for col in columns {
                if !dataset.has_column(col) {
                    return Err(DashboardError::UnknownColumn(col.clone()));
                }
            }
        }
        Ok(())
    }

    /// The registry of the battery-impact dataset: five feature groups and
    /// the target lists of every viewable group combination.
    pub fn builtin() -> Self {
        let mut reg = FeatureRegistry::new();

        reg.register_group(
            STRUCTURAL_ENCODING,
            ELEMENTS.iter().map(|el| indicator_column(el)).collect(),
        );
        reg.register_group(BATTERY_PROPERTIES, BATTERY_PROPERTY_COLUMNS.to_vec());
        reg.register_group(ENVIRONMENTAL_IMPACT, ENVIRONMENTAL_COLUMNS.to_vec());
        reg.register_group(SOCIOECONOMIC_IMPACT, SOCIOECONOMIC_COLUMNS.to_vec());
        reg.register_group(ECONOMIC, ECONOMIC_COLUMNS.to_vec());

        let phys = ["average_voltage", "capacity_grav", "energy_grav"];
        let price = ECONOMIC_COLUMNS[0];

        reg.register_targets(GroupKey::new([STRUCTURAL_ENCODING]), phys.to_vec());
        reg.register_targets(GroupKey::new([BATTERY_PROPERTIES]), vec![price]);
        reg.register_targets(
            GroupKey::new([ENVIRONMENTAL_IMPACT]),
            SOCIOECONOMIC_COLUMNS
                .iter()
                .copied()
                .chain(["ADP (Kg)"])
                .chain(phys)
                .chain([price])
                .chain(CRITICALITY_COLUMNS)
                .collect(),
        );
        reg.register_targets(
            GroupKey::new([SOCIOECONOMIC_IMPACT]),
            ENVIRONMENTAL_COLUMNS
                .iter()
                .copied()
                .filter(|c| *c != "ADP (Kg)")
                .chain(CRITICALITY_COLUMNS)
                .chain(phys)
                .collect(),
        );
        reg.register_targets(
            GroupKey::new([BATTERY_PROPERTIES, ENVIRONMENTAL_IMPACT]),
            SOCIOECONOMIC_COLUMNS
                .iter()
                .copied()
                .chain(["ADP (Kg)", price])
                .chain(CRITICALITY_COLUMNS)
                .collect(),
        );
        reg.register_targets(
            GroupKey::new([BATTERY_PROPERTIES, SOCIOECONOMIC_IMPACT]),
            ENVIRONMENTAL_COLUMNS
                .iter()
                .copied()
                .filter(|c| *c != "ADP (Kg)")
                .chain(CRITICALITY_COLUMNS)
                .collect(),
        );
        reg.register_targets(
            GroupKey::new([ENVIRONMENTAL_IMPACT, SOCIOECONOMIC_IMPACT]),
            phys.iter()
                .copied()
                .chain(CRITICALITY_COLUMNS)
                .chain([price])
                .collect(),
        );
        reg.register_targets(
            GroupKey::new([BATTERY_PROPERTIES, ENVIRONMENTAL_IMPACT, SOCIOECONOMIC_IMPACT]),
            CRITICALITY_COLUMNS.iter().copied().chain([price]).collect(),
        );

        reg
    }
}
