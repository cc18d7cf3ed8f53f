//! Collaborator contracts for the selection wizard.
//!
//! The wizard core never talks to the platform directly. Everything remote
//! (catalog and metadata fetches, record creation/deletion, the confirmation
//! modal, toast notices, page navigation) goes through the traits in this
//! crate, so the core stays pure and the collaborators stay swappable:
//! platform-backed in production, in-memory in tests.

pub mod error;
pub mod memory;
pub mod schema;
pub mod traits;

pub use error::{ErrorDetail, GatewayError, ENTITY_IS_DELETED};
pub use memory::{CreatedRecord, InMemoryCatalog, InMemoryRecords, Operation, RecordingShell};
pub use schema::{ColumnControl, ConfigColumn, FieldDescriptor, FieldType, FilterField, TableColumn};
pub use traits::{
    CatalogPayload, CatalogSource, ConfirmChoice, ConfirmRequest, NavTarget, Notice,
    NoticePersistence, PricebookSummary, RecordWriter, Severity, Shell,
};
