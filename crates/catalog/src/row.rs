//! Catalog rows and the price-list join.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use lineup_core::{FieldMap, RecordId};

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub RecordId);

impl ProductId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Price list identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricebookId(pub RecordId);

impl PricebookId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PricebookId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Identifier of one price binding (product × price list).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricebookEntryId(pub RecordId);

impl PricebookEntryId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PricebookEntryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// One price binding from the active price list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub id: PricebookEntryId,
    pub product_id: ProductId,
    pub unit_price: f64,
}

/// One sellable product candidate.
///
/// `fields` carries the metadata-driven display columns; pricing is merged in
/// from the price-list join and stays `None` for products the active price
/// list does not bind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub id: ProductId,
    pub name: String,
    pub fields: FieldMap,
    pub unit_price: Option<f64>,
    pub list_price: Option<f64>,
    pub pricebook_entry_id: Option<PricebookEntryId>,
}

impl CatalogRow {
    /// A row as fetched, before the price-list join.
    pub fn unpriced(id: ProductId, name: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            id,
            name: name.into(),
            fields,
            unit_price: None,
            list_price: None,
            pricebook_entry_id: None,
        }
    }

    pub fn is_priced(&self) -> bool {
        self.pricebook_entry_id.is_some()
    }

    /// Resolve a field by API name.
    ///
    /// `Name` and the merged price fields resolve from their dedicated slots;
    /// everything else comes from the dynamic field map.
    pub fn field_value(&self, api_name: &str) -> Option<Value> {
        match api_name {
            "Name" => Some(Value::String(self.name.clone())),
            "UnitPrice" => self.unit_price.map(number),
            "ListPrice" => self.list_price.map(number),
            _ => self.fields.get(api_name).cloned(),
        }
    }
}

fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Merge price-list bindings onto fetched products.
///
/// Per product, the first entry whose `product_id` matches is merged in; rows
/// without a binding pass through unpriced. Linear scan per product; catalog
/// and price-list sizes are bounded by platform record limits.
pub fn join_prices(products: Vec<CatalogRow>, entries: &[PriceEntry]) -> Vec<CatalogRow> {
    products
        .into_iter()
        .map(|mut row| {
            if let Some(entry) = entries.iter().find(|e| e.product_id == row.id) {
                row.unit_price = Some(entry.unit_price);
                row.list_price = Some(entry.unit_price);
                row.pricebook_entry_id = Some(entry.id);
            }
            row
        })
        .collect()
}
