//! Pricebook resolution flow.
//!
//! Resolves or changes the active price list for a parent record before the
//! selection wizard is entered. Changing an already-associated price list is
//! destructive (existing line items are deleted first), so that path runs
//! behind a confirmation modal.

pub mod flow;

pub use flow::{FlowError, PricebookFlow, Resolution};
