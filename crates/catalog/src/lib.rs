//! Catalog engine (leaf module).
//!
//! This crate owns the product list and everything derived from it: the
//! price-list join that produces the immutable initial view, filter predicate
//! evaluation, and stable sort ordering. It is pure domain logic (no IO, no
//! HTTP, no storage).

pub mod filter;
pub mod row;
pub mod sort;

pub use filter::{apply_filter, filter_by_candidates, FilterState};
pub use row::{join_prices, CatalogRow, PriceEntry, PricebookEntryId, PricebookId, ProductId};
pub use sort::{fold_case, sort_rows, Direction, Normalizer};
