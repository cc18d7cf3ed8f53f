//! The collaborator traits the wizard core depends on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lineup_catalog::{CatalogRow, PricebookId, PriceEntry};
use lineup_core::{FieldMap, ParentKind, RecordId};

use crate::error::GatewayError;
use crate::schema::{FieldDescriptor, FilterField};

/// Everything one catalog fetch returns: table schema, the parent's kind, the
/// raw product rows and the active price-list bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPayload {
    pub columns: Vec<FieldDescriptor>,
    pub parent_kind: ParentKind,
    pub products: Vec<CatalogRow>,
    pub price_entries: Vec<PriceEntry>,
}

/// One price list, as offered in the pricebook picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricebookSummary {
    pub id: PricebookId,
    pub name: String,
}

/// Read-side collaborator: catalog, price and field-metadata fetches.
///
/// Fetch failures degrade the feature (empty lists) rather than aborting the
/// wizard; callers log and move on.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog_with_prices(
        &self,
        pricebook_id: PricebookId,
        parent_id: RecordId,
    ) -> Result<CatalogPayload, GatewayError>;

    async fn fetch_configuration_schema(
        &self,
        parent_id: RecordId,
    ) -> Result<Vec<FieldDescriptor>, GatewayError>;

    async fn fetch_filterable_fields(&self) -> Result<Vec<FilterField>, GatewayError>;

    /// Flat denormalized projection of the catalog, used only for filter
    /// matching. Rows carry an `Id` field naming their product.
    async fn fetch_filter_candidates(
        &self,
        pricebook_id: PricebookId,
    ) -> Result<Vec<FieldMap>, GatewayError>;

    async fn fetch_pricebooks(&self) -> Result<Vec<PricebookSummary>, GatewayError>;

    async fn fetch_parent_pricebook(
        &self,
        parent_id: RecordId,
    ) -> Result<Option<PricebookId>, GatewayError>;
}

/// Write-side collaborator: record creation, deletion and parent updates.
#[async_trait]
pub trait RecordWriter: Send + Sync {
    async fn create_child_record(
        &self,
        record_type: &str,
        fields: FieldMap,
    ) -> Result<RecordId, GatewayError>;

    async fn delete_record(&self, id: RecordId) -> Result<(), GatewayError>;

    async fn update_parent_pricebook(
        &self,
        parent_id: RecordId,
        pricebook_id: PricebookId,
    ) -> Result<(), GatewayError>;

    /// Delete every line item currently attached to the parent record.
    async fn delete_child_line_items(&self, parent_id: RecordId) -> Result<(), GatewayError>;
}

/// Notice severity, mirrored onto the toast variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

/// How long a notice stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticePersistence {
    Dismissible,
    Sticky,
}

/// A user-visible notification (fire-and-forget).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub persistence: NoticePersistence,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            title: "Success".to_string(),
            message: message.into(),
            severity: Severity::Success,
            persistence: NoticePersistence::Dismissible,
        }
    }

    pub fn sticky_error(message: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            message: message.into(),
            severity: Severity::Error,
            persistence: NoticePersistence::Sticky,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            message: message.into(),
            severity: Severity::Error,
            persistence: NoticePersistence::Dismissible,
        }
    }
}

/// A confirmation modal request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmRequest {
    pub label: String,
}

impl ConfirmRequest {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

/// Outcome of a confirmation modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmChoice {
    Confirm,
    Cancel,
}

/// Page navigation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavTarget {
    /// The parent record's detail view.
    RecordView {
        parent_kind: ParentKind,
        record_id: RecordId,
    },
    /// The product-selection page, carrying the wizard's two parameters.
    ProductSelection {
        record_id: RecordId,
        pricebook_id: PricebookId,
    },
}

/// Page-shell primitives: modal confirmation, toasts, navigation.
#[async_trait]
pub trait Shell: Send + Sync {
    /// Open a confirmation modal and wait for the user's choice.
    async fn confirm(&self, request: ConfirmRequest) -> Result<ConfirmChoice, GatewayError>;

    /// Fire-and-forget toast.
    fn notify(&self, notice: Notice);

    /// Request a page transition.
    fn navigate(&self, target: NavTarget);
}

#[async_trait]
impl<T> CatalogSource for std::sync::Arc<T>
where
    T: CatalogSource + ?Sized,
{
    async fn fetch_catalog_with_prices(
        &self,
        pricebook_id: PricebookId,
        parent_id: RecordId,
    ) -> Result<CatalogPayload, GatewayError> {
        (**self).fetch_catalog_with_prices(pricebook_id, parent_id).await
    }

    async fn fetch_configuration_schema(
        &self,
        parent_id: RecordId,
    ) -> Result<Vec<FieldDescriptor>, GatewayError> {
        (**self).fetch_configuration_schema(parent_id).await
    }

    async fn fetch_filterable_fields(&self) -> Result<Vec<FilterField>, GatewayError> {
        (**self).fetch_filterable_fields().await
    }

    async fn fetch_filter_candidates(
        &self,
        pricebook_id: PricebookId,
    ) -> Result<Vec<FieldMap>, GatewayError> {
        (**self).fetch_filter_candidates(pricebook_id).await
    }

    async fn fetch_pricebooks(&self) -> Result<Vec<PricebookSummary>, GatewayError> {
        (**self).fetch_pricebooks().await
    }

    async fn fetch_parent_pricebook(
        &self,
        parent_id: RecordId,
    ) -> Result<Option<PricebookId>, GatewayError> {
        (**self).fetch_parent_pricebook(parent_id).await
    }
}

#[async_trait]
impl<T> RecordWriter for std::sync::Arc<T>
where
    T: RecordWriter + ?Sized,
{
    async fn create_child_record(
        &self,
        record_type: &str,
        fields: FieldMap,
    ) -> Result<RecordId, GatewayError> {
        (**self).create_child_record(record_type, fields).await
    }

    async fn delete_record(&self, id: RecordId) -> Result<(), GatewayError> {
        (**self).delete_record(id).await
    }

    async fn update_parent_pricebook(
        &self,
        parent_id: RecordId,
        pricebook_id: PricebookId,
    ) -> Result<(), GatewayError> {
        (**self).update_parent_pricebook(parent_id, pricebook_id).await
    }

    async fn delete_child_line_items(&self, parent_id: RecordId) -> Result<(), GatewayError> {
        (**self).delete_child_line_items(parent_id).await
    }
}

#[async_trait]
impl<T> Shell for std::sync::Arc<T>
where
    T: Shell + ?Sized,
{
    async fn confirm(&self, request: ConfirmRequest) -> Result<ConfirmChoice, GatewayError> {
        (**self).confirm(request).await
    }

    fn notify(&self, notice: Notice) {
        (**self).notify(notice)
    }

    fn navigate(&self, target: NavTarget) {
        (**self).navigate(target)
    }
}
