//! Selection entries: chosen catalog rows projected into the configuration grid.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use lineup_catalog::{CatalogRow, PricebookEntryId};
use lineup_core::{is_blank, DomainError, FieldMap, ParentKind};
use lineup_gateway::ConfigColumn;

/// Icon shown on selection pills.
pub const PILL_ICON: &str = "utility:checkout";

/// Removable-pill projection of one selection entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pill {
    pub label: String,
    pub icon_name: String,
    pub kind: String,
}

/// A user-chosen catalog row, projected through the configuration schema.
///
/// `fields` holds exactly the configured grid columns (plus the price-list
/// binding); the `Product2Id` column carries the product's display name so the
/// grid shows a human label instead of a raw identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub pricebook_entry_id: PricebookEntryId,
    pub label: String,
    pub fields: FieldMap,
}

impl SelectionEntry {
    /// Project a selected row through the grid schema.
    ///
    /// Returns `None` for rows the active price list does not bind; without a
    /// price binding there is nothing to turn into a line item.
    pub fn project(row: &CatalogRow, columns: &[ConfigColumn]) -> Option<Self> {
        let entry_id = row.pricebook_entry_id?;

        let mut fields = FieldMap::new();
        for column in columns {
            let value = if column.api_name == "Product2Id" {
                Value::String(row.name.clone())
            } else {
                row.field_value(&column.api_name)
                    .unwrap_or_else(|| Value::String(String::new()))
            };
            fields.insert(column.api_name.clone(), value);
        }
        fields.insert(
            "PricebookEntryId".to_string(),
            Value::String(entry_id.to_string()),
        );

        Some(Self {
            pricebook_entry_id: entry_id,
            label: row.name.clone(),
            fields,
        })
    }

    pub fn pill(&self) -> Pill {
        Pill {
            label: self.label.clone(),
            icon_name: PILL_ICON.to_string(),
            kind: "icon".to_string(),
        }
    }
}

/// One batch of inline grid edits for the entry at `row`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftEdit {
    pub row: usize,
    pub fields: FieldMap,
}

/// Merge draft edits onto the selection in place.
///
/// Edits addressing rows past the current selection are dropped; the grid the
/// user edited may be stale relative to the selection set.
pub fn merge_drafts(entries: &mut [SelectionEntry], edits: Vec<DraftEdit>) {
    for edit in edits {
        let Some(entry) = entries.get_mut(edit.row) else {
            tracing::debug!(row = edit.row, "dropping draft edit for stale row");
            continue;
        };
        for (key, value) in edit.fields {
            entry.fields.insert(key, value);
        }
    }
}

/// Commit precondition: every entry needs a quantity and a unit price.
///
/// The stored field is always `UnitPrice`; the message names it the way the
/// parent kind labels it.
pub fn validate_for_commit(
    entries: &[SelectionEntry],
    kind: ParentKind,
) -> Result<(), DomainError> {
    for entry in entries {
        if is_blank(entry.fields.get("Quantity")) || is_blank(entry.fields.get("UnitPrice")) {
            return Err(DomainError::validation(format!(
                "Required Field Missing. Please check Quantity and {}",
                kind.price_field_label()
            )));
        }
    }
    Ok(())
}

/// Banner shown when entering the configuration grid.
pub fn required_fields_note(kind: ParentKind) -> String {
    format!(
        "Note: Quantity and {} are required fields.",
        kind.price_field_label()
    )
}
