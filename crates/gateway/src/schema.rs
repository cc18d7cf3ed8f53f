//! Schema descriptors supplied by the metadata collaborators.
//!
//! Field sets arrive as raw descriptors; this module normalizes them into the
//! two table shapes the wizard renders from: the product table columns and the
//! configuration-grid columns (with their input controls).

use serde::{Deserialize, Serialize};

/// Platform field type, as reported by field metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "DATE")]
    Date,
    #[serde(rename = "DOUBLE")]
    Double,
    #[serde(rename = "PERCENT")]
    Percent,
    #[serde(other)]
    Other,
}

/// One raw field descriptor from a configured field set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub api_name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// One filterable attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterField {
    pub api_name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl From<FieldDescriptor> for FilterField {
    fn from(d: FieldDescriptor) -> Self {
        Self {
            api_name: d.api_name,
            label: d.label,
            field_type: d.field_type,
        }
    }
}

/// One product-table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    pub label: String,
    pub field_name: String,
    pub sortable: bool,
}

impl TableColumn {
    /// Product-table columns: the configured field set, `Name` sortable, plus
    /// the appended (sortable) List Price column for the joined price.
    pub fn product_table(descriptors: &[FieldDescriptor]) -> Vec<TableColumn> {
        let mut columns: Vec<TableColumn> = descriptors
            .iter()
            .map(|d| TableColumn {
                label: d.label.clone(),
                field_name: d.api_name.clone(),
                sortable: d.api_name == "Name",
            })
            .collect();
        columns.push(TableColumn {
            label: "List Price".to_string(),
            field_name: "ListPrice".to_string(),
            sortable: true,
        });
        columns
    }
}

/// Input control backing an editable configuration column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnControl {
    Date,
    Number,
    Text,
}

/// One editable attribute of a selected row in the configuration grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigColumn {
    pub api_name: String,
    pub label: String,
    pub control: ColumnControl,
    /// Read-only columns render with a read-only icon instead of an input.
    pub read_only: bool,
}

impl ConfigColumn {
    /// Normalize a raw descriptor into a grid column.
    ///
    /// The product reference and the joined list price are display-only; the
    /// control follows the field type (dates and numerics get dedicated
    /// inputs, everything else is free text).
    pub fn from_descriptor(d: &FieldDescriptor) -> Self {
        let read_only = d.api_name == "Product2Id" || d.api_name == "ListPrice";
        let control = match d.field_type {
            FieldType::Date => ColumnControl::Date,
            FieldType::Double | FieldType::Percent => ColumnControl::Number,
            FieldType::Other => ColumnControl::Text,
        };
        Self {
            api_name: d.api_name.clone(),
            label: d.label.clone(),
            control,
            read_only,
        }
    }

    pub fn configuration_grid(descriptors: &[FieldDescriptor]) -> Vec<ConfigColumn> {
        descriptors.iter().map(Self::from_descriptor).collect()
    }
}
