use crate::error::DashboardError;

use super::model::{Dataset, ELEMENT_COLUMN_SUFFIX};

// ---------------------------------------------------------------------------
// Element-containment filter
// ---------------------------------------------------------------------------

/// Discharge-indicator column for an element symbol.
pub fn indicator_column(symbol: &str) -> String {
    format!("{symbol}{ELEMENT_COLUMN_SUFFIX}")
}

/// Return indices of batteries whose discharge formula contains every
/// selected element, i.e. every selected element's indicator column is
/// strictly positive.
///
/// * An empty selection matches every row (vacuous containment), so the
///   result is the identity row subset in source order.
/// * A symbol with no indicator column is [`DashboardError::UnknownElement`];
///   selectable choices should be constrained to [`Dataset::elements`].
pub fn filter_by_elements(
    dataset: &Dataset,
    element_symbols: &[String],
) -> Result<Vec<usize>, DashboardError> {
    let columns: Vec<String> = element_symbols
        .iter()
        .map(|sym| {
            let col = indicator_column(sym);
            if dataset.has_column(&col) {
                Ok(col)
            } else {
                Err(DashboardError::UnknownElement(sym.clone()))
            }
        })
        .collect::<Result<_, _>>()?;

    Ok(dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            columns
                .iter()
                .all(|col| rec.numeric(col).is_some_and(|v| v > 0.0))
        })
        .map(|(i, _)| i)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{BatteryRecord, CellValue};

    fn dataset(rows: &[&[(&str, f64)]]) -> Dataset {
        let records = rows
            .iter()
            .enumerate()
            .map(|(i, cells)| BatteryRecord {
                battery_id: format!("mp-{i}"),
                values: cells
                    .iter()
                    .map(|(c, v)| (c.to_string(), CellValue::Float(*v)))
                    .collect(),
            })
            .collect();
        Dataset::from_records(records)
    }

    fn syms(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_selection_is_identity() {
        let ds = dataset(&[
            &[("Li_formula_discharge", 1.0)],
            &[("Li_formula_discharge", 0.0)],
        ]);
        assert_eq!(filter_by_elements(&ds, &[]).unwrap(), vec![0, 1]);
    }

    #[test]
    fn selects_rows_containing_element() {
        let ds = dataset(&[
            &[("Li_formula_discharge", 1.0), ("energy_grav", 5.0)],
            &[("Li_formula_discharge", 0.0), ("energy_grav", 3.0)],
        ]);
        assert_eq!(filter_by_elements(&ds, &syms(&["Li"])).unwrap(), vec![0]);
    }

    #[test]
    fn growing_selection_never_grows_result() {
        let ds = dataset(&[
            &[("Li_formula_discharge", 1.0), ("O_formula_discharge", 2.0)],
            &[("Li_formula_discharge", 1.0), ("O_formula_discharge", 0.0)],
            &[("Li_formula_discharge", 0.0), ("O_formula_discharge", 1.0)],
        ]);
        let li = filter_by_elements(&ds, &syms(&["Li"])).unwrap();
        let li_o = filter_by_elements(&ds, &syms(&["Li", "O"])).unwrap();
        assert!(li_o.len() <= li.len());
        assert_eq!(li, vec![0, 1]);
        assert_eq!(li_o, vec![0]);
    }

    #[test]
    fn unknown_symbol_is_an_error() {
        let ds = dataset(&[&[("Li_formula_discharge", 1.0)]]);
        let err = filter_by_elements(&ds, &syms(&["Xx"])).unwrap_err();
        assert!(matches!(err, DashboardError::UnknownElement(s) if s == "Xx"));
    }
}
