//! Filter predicate evaluation.
//!
//! Matching is case-insensitive substring containment on the field's text
//! rendering, for every field type. Filtered views are always derived from the
//! immutable initial list in its original order, so clearing a filter restores
//! exactly the original presentation.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use lineup_core::{field_text, FieldMap};

use crate::row::{CatalogRow, ProductId};

/// Active filter constraints, keyed by field API name.
///
/// Values are stored trimmed and lower-cased; setting an empty value removes
/// the constraint. An empty state matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    values: BTreeMap<String, String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one filter input. Blank input clears the field's constraint.
    pub fn set(&mut self, field: impl Into<String>, raw: &str) {
        let value = raw.trim().to_lowercase();
        let field = field.into();
        if value.is_empty() {
            self.values.remove(&field);
        } else {
            self.values.insert(field, value);
        }
    }

    /// Drop every constraint.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True iff every present constraint is a substring of the corresponding
    /// field's case-folded text. Missing or empty fields never match a
    /// non-empty constraint.
    pub fn matches(&self, fields: &FieldMap) -> bool {
        self.values.iter().all(|(field, constraint)| {
            fields
                .get(field)
                .and_then(field_text)
                .map(|text| text.trim().to_lowercase().contains(constraint))
                .unwrap_or(false)
        })
    }
}

/// Filter rows directly on their own fields, preserving input order.
pub fn apply_filter(rows: &[CatalogRow], state: &FilterState) -> Vec<CatalogRow> {
    if state.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|row| {
            state.values.iter().all(|(field, constraint)| {
                row.field_value(field)
                    .and_then(|v| field_text(&v))
                    .map(|text| text.trim().to_lowercase().contains(constraint))
                    .unwrap_or(false)
            })
        })
        .cloned()
        .collect()
}

/// Filter through the flat candidate projection, then map matches back onto
/// the initial view by identity so the result keeps the initial ordering.
///
/// Candidates carry an `Id` field naming the product they denormalize.
pub fn filter_by_candidates(
    initial: &[CatalogRow],
    candidates: &[FieldMap],
    state: &FilterState,
) -> Vec<CatalogRow> {
    if state.is_empty() {
        return initial.to_vec();
    }

    let matched: HashSet<ProductId> = candidates
        .iter()
        .filter(|fields| state.matches(fields))
        .filter_map(|fields| {
            fields
                .get("Id")
                .and_then(field_text)
                .and_then(|s| s.parse().ok())
                .map(ProductId::new)
        })
        .collect();

    initial
        .iter()
        .filter(|row| matched.contains(&row.id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineup_core::RecordId;
    use serde_json::json;

    fn row(name: &str, family: &str) -> CatalogRow {
        let mut fields = FieldMap::new();
        fields.insert("Family".to_string(), json!(family));
        CatalogRow::unpriced(ProductId::new(RecordId::new()), name, fields)
    }

    fn candidate(row: &CatalogRow) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("Id".to_string(), json!(row.id.to_string()));
        fields.insert("Name".to_string(), json!(row.name.clone()));
        for (k, v) in &row.fields {
            fields.insert(k.clone(), v.clone());
        }
        fields
    }

    fn names(rows: &[CatalogRow]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn empty_state_matches_everything_in_order() {
        let rows = vec![row("Pump", "Hardware"), row("Anvil", "Hardware")];
        let state = FilterState::new();
        assert_eq!(names(&apply_filter(&rows, &state)), ["Pump", "Anvil"]);
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let rows = vec![row("GenWatt Diesel", "Generators"), row("Pump", "Hardware")];
        let mut state = FilterState::new();
        state.set("Name", "  GENWATT ");
        assert_eq!(names(&apply_filter(&rows, &state)), ["GenWatt Diesel"]);
    }

    #[test]
    fn every_constraint_must_match() {
        let rows = vec![
            row("GenWatt Diesel", "Generators"),
            row("GenWatt Propane", "Installations"),
        ];
        let mut state = FilterState::new();
        state.set("Name", "genwatt");
        state.set("Family", "gener");
        assert_eq!(names(&apply_filter(&rows, &state)), ["GenWatt Diesel"]);
    }

    #[test]
    fn missing_or_empty_fields_never_match() {
        let mut no_family = row("Pump", "");
        no_family.fields.remove("Family");
        let empty_family = row("Anvil", "");
        let rows = vec![no_family, empty_family];

        let mut state = FilterState::new();
        state.set("Family", "hardware");
        assert!(apply_filter(&rows, &state).is_empty());
    }

    #[test]
    fn impossible_constraints_yield_empty_view() {
        let rows = vec![row("Pump", "Hardware")];
        let mut state = FilterState::new();
        state.set("Name", "no-such-product");
        assert!(apply_filter(&rows, &state).is_empty());
    }

    #[test]
    fn blank_input_removes_a_constraint() {
        let mut state = FilterState::new();
        state.set("Name", "pump");
        state.set("Name", "   ");
        assert!(state.is_empty());
    }

    #[test]
    fn filtering_never_mutates_the_source() {
        let rows = vec![row("Pump", "Hardware"), row("Anvil", "Hardware")];
        let before = rows.clone();
        let mut state = FilterState::new();
        state.set("Name", "anvil");
        let _ = apply_filter(&rows, &state);
        assert_eq!(rows, before);
    }

    #[test]
    fn candidate_projection_keeps_initial_order() {
        let rows = vec![
            row("Pump", "Hardware"),
            row("Anvil", "Hardware"),
            row("Mixer", "Kitchen"),
        ];
        let candidates: Vec<FieldMap> = rows.iter().map(candidate).collect();

        let mut state = FilterState::new();
        state.set("Family", "hardware");
        let filtered = filter_by_candidates(&rows, &candidates, &state);
        assert_eq!(names(&filtered), ["Pump", "Anvil"]);

        // Clearing restores the initial view exactly.
        state.clear();
        let restored = filter_by_candidates(&rows, &candidates, &state);
        assert_eq!(restored, rows);
    }

    #[test]
    fn numeric_fields_match_by_text_rendering() {
        let mut r = row("Pump", "Hardware");
        r.fields.insert("Stock".to_string(), json!(1250));
        let rows = vec![r];

        let mut state = FilterState::new();
        state.set("Stock", "125");
        assert_eq!(apply_filter(&rows, &state).len(), 1);
    }
}
