//! In-memory collaborator implementations for tests and local development.
//!
//! `InMemoryRecords` journals every write operation in call order, so tests
//! can assert sequencing (e.g. cleanup before persistence) as well as end
//! state. Failures are scripted per request.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use lineup_catalog::{CatalogRow, PricebookEntryId, PricebookId, PriceEntry};
use lineup_core::{field_text, FieldMap, ParentKind, RecordId};

use crate::error::GatewayError;
use crate::schema::{FieldDescriptor, FilterField};
use crate::traits::{
    CatalogPayload, CatalogSource, ConfirmChoice, ConfirmRequest, NavTarget, Notice,
    PricebookSummary, RecordWriter, Shell,
};

/// One journaled write operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreateChild {
        record_type: String,
        id: RecordId,
    },
    DeleteRecord {
        id: RecordId,
    },
    UpdateParentPricebook {
        parent_id: RecordId,
        pricebook_id: PricebookId,
    },
    DeleteChildLineItems {
        parent_id: RecordId,
    },
}

/// A record created through the fake writer.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedRecord {
    pub id: RecordId,
    pub record_type: String,
    pub fields: FieldMap,
}

#[derive(Debug, Default)]
struct RecordsState {
    created: Vec<CreatedRecord>,
    deleted: Vec<RecordId>,
    operations: Vec<Operation>,
    create_failures: HashMap<String, GatewayError>,
    delete_failures: HashMap<RecordId, GatewayError>,
    delete_failure_all: Option<GatewayError>,
    update_failure: Option<GatewayError>,
    purge_failure: Option<GatewayError>,
}

/// In-memory `RecordWriter` with scriptable failures.
#[derive(Debug, Default)]
pub struct InMemoryRecords {
    state: Mutex<RecordsState>,
}

impl InMemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the creation carrying this price-list binding to fail.
    pub fn fail_create_for_entry(&self, entry: PricebookEntryId, error: GatewayError) {
        self.state
            .lock()
            .unwrap()
            .create_failures
            .insert(entry.to_string(), error);
    }

    /// Script deletion of one record id to fail.
    pub fn fail_delete(&self, id: RecordId, error: GatewayError) {
        self.state.lock().unwrap().delete_failures.insert(id, error);
    }

    /// Script every deletion to fail (ids created later included).
    pub fn fail_all_deletes(&self, error: GatewayError) {
        self.state.lock().unwrap().delete_failure_all = Some(error);
    }

    /// Drop every scripted creation failure (e.g. before a retry).
    pub fn clear_create_failures(&self) {
        self.state.lock().unwrap().create_failures.clear();
    }

    pub fn fail_update_parent_pricebook(&self, error: GatewayError) {
        self.state.lock().unwrap().update_failure = Some(error);
    }

    pub fn fail_delete_child_line_items(&self, error: GatewayError) {
        self.state.lock().unwrap().purge_failure = Some(error);
    }

    pub fn created_records(&self) -> Vec<CreatedRecord> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn deleted_ids(&self) -> Vec<RecordId> {
        self.state.lock().unwrap().deleted.clone()
    }

    /// Created records that were never deleted afterwards.
    pub fn remaining_ids(&self) -> Vec<RecordId> {
        let state = self.state.lock().unwrap();
        state
            .created
            .iter()
            .map(|r| r.id)
            .filter(|id| !state.deleted.contains(id))
            .collect()
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.state.lock().unwrap().operations.clone()
    }
}

#[async_trait]
impl RecordWriter for InMemoryRecords {
    async fn create_child_record(
        &self,
        record_type: &str,
        fields: FieldMap,
    ) -> Result<RecordId, GatewayError> {
        let mut state = self.state.lock().unwrap();

        // Scripted failures key on the price-list binding the payload carries.
        if let Some(entry) = fields.get("PricebookEntryId").and_then(field_text) {
            if let Some(error) = state.create_failures.get(&entry) {
                return Err(error.clone());
            }
        }

        let id = RecordId::new();
        state.operations.push(Operation::CreateChild {
            record_type: record_type.to_string(),
            id,
        });
        state.created.push(CreatedRecord {
            id,
            record_type: record_type.to_string(),
            fields,
        });
        Ok(id)
    }

    async fn delete_record(&self, id: RecordId) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        // Deletion attempts are journaled even when scripted to fail, so tests
        // can assert that a rollback addressed every created record.
        state.operations.push(Operation::DeleteRecord { id });
        if let Some(error) = state.delete_failures.get(&id) {
            return Err(error.clone());
        }
        if let Some(error) = state.delete_failure_all.clone() {
            return Err(error);
        }
        state.deleted.push(id);
        Ok(())
    }

    async fn update_parent_pricebook(
        &self,
        parent_id: RecordId,
        pricebook_id: PricebookId,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.update_failure.clone() {
            return Err(error);
        }
        state.operations.push(Operation::UpdateParentPricebook {
            parent_id,
            pricebook_id,
        });
        Ok(())
    }

    async fn delete_child_line_items(&self, parent_id: RecordId) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.purge_failure.clone() {
            return Err(error);
        }
        state
            .operations
            .push(Operation::DeleteChildLineItems { parent_id });
        Ok(())
    }
}

/// In-memory `CatalogSource` serving fixed fixtures.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    pub columns: Vec<FieldDescriptor>,
    pub parent_kind: ParentKind,
    pub products: Vec<CatalogRow>,
    pub price_entries: Vec<PriceEntry>,
    pub config_schema: Vec<FieldDescriptor>,
    pub filter_fields: Vec<FilterField>,
    pub filter_candidates: Vec<FieldMap>,
    pub pricebooks: Vec<PricebookSummary>,
    pub parent_pricebook: Option<PricebookId>,
    /// When set, every fetch fails (degradation paths).
    pub fail_fetches: bool,
}

impl InMemoryCatalog {
    pub fn new(parent_kind: ParentKind) -> Self {
        Self {
            columns: Vec::new(),
            parent_kind,
            products: Vec::new(),
            price_entries: Vec::new(),
            config_schema: Vec::new(),
            filter_fields: Vec::new(),
            filter_candidates: Vec::new(),
            pricebooks: Vec::new(),
            parent_pricebook: None,
            fail_fetches: false,
        }
    }

    fn guard(&self) -> Result<(), GatewayError> {
        if self.fail_fetches {
            Err(GatewayError::generic("catalog fetch failed"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    async fn fetch_catalog_with_prices(
        &self,
        _pricebook_id: PricebookId,
        _parent_id: RecordId,
    ) -> Result<CatalogPayload, GatewayError> {
        self.guard()?;
        Ok(CatalogPayload {
            columns: self.columns.clone(),
            parent_kind: self.parent_kind,
            products: self.products.clone(),
            price_entries: self.price_entries.clone(),
        })
    }

    async fn fetch_configuration_schema(
        &self,
        _parent_id: RecordId,
    ) -> Result<Vec<FieldDescriptor>, GatewayError> {
        self.guard()?;
        Ok(self.config_schema.clone())
    }

    async fn fetch_filterable_fields(&self) -> Result<Vec<FilterField>, GatewayError> {
        self.guard()?;
        Ok(self.filter_fields.clone())
    }

    async fn fetch_filter_candidates(
        &self,
        _pricebook_id: PricebookId,
    ) -> Result<Vec<FieldMap>, GatewayError> {
        self.guard()?;
        Ok(self.filter_candidates.clone())
    }

    async fn fetch_pricebooks(&self) -> Result<Vec<PricebookSummary>, GatewayError> {
        self.guard()?;
        Ok(self.pricebooks.clone())
    }

    async fn fetch_parent_pricebook(
        &self,
        _parent_id: RecordId,
    ) -> Result<Option<PricebookId>, GatewayError> {
        self.guard()?;
        Ok(self.parent_pricebook)
    }
}

/// Recording `Shell` with a scripted modal answer.
#[derive(Debug)]
pub struct RecordingShell {
    answer: Mutex<ConfirmChoice>,
    confirm_requests: Mutex<Vec<ConfirmRequest>>,
    notices: Mutex<Vec<Notice>>,
    navigations: Mutex<Vec<NavTarget>>,
}

impl RecordingShell {
    pub fn new() -> Self {
        Self::answering(ConfirmChoice::Confirm)
    }

    pub fn answering(choice: ConfirmChoice) -> Self {
        Self {
            answer: Mutex::new(choice),
            confirm_requests: Mutex::new(Vec::new()),
            notices: Mutex::new(Vec::new()),
            navigations: Mutex::new(Vec::new()),
        }
    }

    pub fn set_answer(&self, choice: ConfirmChoice) {
        *self.answer.lock().unwrap() = choice;
    }

    pub fn confirm_requests(&self) -> Vec<ConfirmRequest> {
        self.confirm_requests.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn navigations(&self) -> Vec<NavTarget> {
        self.navigations.lock().unwrap().clone()
    }
}

impl Default for RecordingShell {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Shell for RecordingShell {
    async fn confirm(&self, request: ConfirmRequest) -> Result<ConfirmChoice, GatewayError> {
        self.confirm_requests.lock().unwrap().push(request);
        Ok(*self.answer.lock().unwrap())
    }

    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }

    fn navigate(&self, target: NavTarget) {
        self.navigations.lock().unwrap().push(target);
    }
}
