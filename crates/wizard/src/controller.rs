//! The wizard phase state machine.
//!
//! One controller instance drives one parent record through browse → filter →
//! configure → commit. All transitions run to completion on the owning task;
//! the only suspension points are collaborator calls. Visibility is derived
//! from exactly two fields: the phase and the filter-overlay flag.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use lineup_catalog::{
    filter_by_candidates, join_prices, sort_rows, CatalogRow, Direction, FilterState, PricebookId,
};
use lineup_core::{DomainError, FieldMap, ParentKind, RecordId};
use lineup_gateway::{
    CatalogSource, ConfigColumn, FilterField, NavTarget, Notice, RecordWriter, Shell, TableColumn,
};

use crate::commit::{build_batch, dispatch_batch, roll_back, CommitError};
use crate::selection::{
    merge_drafts, required_fields_note, validate_for_commit, DraftEdit, Pill, SelectionEntry,
};

/// Wizard phase. Filtering is an overlay inside Browsing, not a phase of its
/// own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardPhase {
    Browsing,
    Configuring,
}

/// The selection-and-commit workflow engine for one parent record.
pub struct WizardController<S, W, U> {
    source: S,
    writer: Arc<W>,
    shell: U,

    parent_id: RecordId,
    pricebook_id: PricebookId,
    parent_kind: Option<ParentKind>,

    table_columns: Vec<TableColumn>,
    config_columns: Vec<ConfigColumn>,
    filter_fields: Vec<FilterField>,
    filter_candidates: Vec<FieldMap>,
    filter_state: FilterState,

    /// The price-joined catalog exactly as fetched. Never reordered, never
    /// filtered; every view derives from it.
    initial: Vec<CatalogRow>,
    visible: Vec<CatalogRow>,
    sorted_by: Option<(String, Direction)>,

    selected_rows: Vec<CatalogRow>,
    selection: Vec<SelectionEntry>,

    phase: WizardPhase,
    filter_overlay_open: bool,
    note_message: Option<String>,
}

impl<S, W, U> WizardController<S, W, U>
where
    S: CatalogSource,
    W: RecordWriter + 'static,
    U: Shell,
{
    pub fn new(
        source: S,
        writer: Arc<W>,
        shell: U,
        parent_id: RecordId,
        pricebook_id: PricebookId,
    ) -> Self {
        Self {
            source,
            writer,
            shell,
            parent_id,
            pricebook_id,
            parent_kind: None,
            table_columns: Vec::new(),
            config_columns: Vec::new(),
            filter_fields: Vec::new(),
            filter_candidates: Vec::new(),
            filter_state: FilterState::new(),
            initial: Vec::new(),
            visible: Vec::new(),
            sorted_by: None,
            selected_rows: Vec::new(),
            selection: Vec::new(),
            phase: WizardPhase::Browsing,
            filter_overlay_open: false,
            note_message: None,
        }
    }

    /// Browsing entry action: fetch catalog, schema and filter metadata.
    ///
    /// Fetch failures are logged and degrade to empty lists; the wizard stays
    /// usable-but-empty rather than failing the page.
    pub async fn load(&mut self) {
        match self
            .source
            .fetch_catalog_with_prices(self.pricebook_id, self.parent_id)
            .await
        {
            Ok(payload) => {
                self.parent_kind = Some(payload.parent_kind);
                self.table_columns = TableColumn::product_table(&payload.columns);
                self.initial = join_prices(payload.products, &payload.price_entries);

                // Presented view starts name-sorted; the initial list keeps
                // fetch order so filters can restore it exactly.
                let mut view = self.initial.clone();
                sort_rows(&mut view, "Name", Direction::Ascending, None);
                self.visible = view;
                self.sorted_by = Some(("Name".to_string(), Direction::Ascending));
            }
            Err(error) => {
                tracing::warn!(error = %error, "catalog fetch failed; browsing view stays empty");
            }
        }

        match self.source.fetch_configuration_schema(self.parent_id).await {
            Ok(descriptors) => {
                self.config_columns = ConfigColumn::configuration_grid(&descriptors);
            }
            Err(error) => {
                tracing::warn!(error = %error, "configuration schema fetch failed");
            }
        }

        match self.source.fetch_filterable_fields().await {
            Ok(fields) => self.filter_fields = fields,
            Err(error) => {
                tracing::warn!(error = %error, "filterable fields fetch failed");
            }
        }

        match self
            .source
            .fetch_filter_candidates(self.pricebook_id)
            .await
        {
            Ok(candidates) => self.filter_candidates = candidates,
            Err(error) => {
                tracing::warn!(error = %error, "filter candidates fetch failed");
            }
        }
    }

    pub fn open_filter(&mut self) {
        self.filter_overlay_open = true;
    }

    pub fn close_filter(&mut self) {
        self.filter_overlay_open = false;
    }

    /// Record one filter input; blank input removes that constraint.
    pub fn set_filter_input(&mut self, field: impl Into<String>, value: &str) {
        self.filter_state.set(field, value);
    }

    /// Browsing → Browsing: recompute the visible rows from the current
    /// constraints. The overlay and its inputs stay as they are.
    pub fn apply_filter(&mut self) {
        self.visible =
            filter_by_candidates(&self.initial, &self.filter_candidates, &self.filter_state);
        self.sorted_by = None;
    }

    /// Browsing → Browsing: drop every constraint and restore the initial
    /// presentation order.
    pub fn clear_filter(&mut self) {
        self.filter_state.clear();
        self.visible = self.initial.clone();
        self.sorted_by = None;
    }

    /// Re-sort the visible view. Stable: equal keys keep their current
    /// relative order.
    pub fn sort_visible(&mut self, field: &str, direction: Direction) {
        sort_rows(&mut self.visible, field, direction, None);
        self.sorted_by = Some((field.to_string(), direction));
    }

    /// Merge newly selected rows into the selection set by row identity;
    /// duplicates are ignored. Rows the price list does not bind cannot become
    /// line items and are skipped.
    pub fn select_rows(&mut self, rows: &[CatalogRow]) {
        for row in rows {
            if self.selected_rows.iter().any(|held| held.id == row.id) {
                continue;
            }
            if row.pricebook_entry_id.is_none() {
                tracing::debug!(product = %row.id, "ignoring selection of unpriced product");
                continue;
            }
            self.selected_rows.push(row.clone());
        }
        self.rebuild_projection();
    }

    /// Remove the pill at `index` and the matching selected row. Out-of-range
    /// indexes are ignored (the pill list the user clicked may be stale).
    pub fn remove_selection(&mut self, index: usize) {
        if index >= self.selection.len() {
            tracing::debug!(index, "ignoring removal of stale pill index");
            return;
        }
        let entry = self.selection.remove(index);
        self.selected_rows
            .retain(|row| row.pricebook_entry_id != Some(entry.pricebook_entry_id));
    }

    /// Whether the wizard can progress to the configuration grid.
    pub fn can_advance(&self) -> bool {
        !self.selection.is_empty()
    }

    /// Browsing → Configuring.
    ///
    /// The selection is re-projected against the unfiltered initial view, so
    /// grid values reflect the canonical price-joined rows rather than
    /// whatever filtered subset they were picked from. The browsing table is
    /// reset to the initial view and the filter overlay closes.
    pub fn advance(&mut self) -> Result<(), DomainError> {
        if self.phase != WizardPhase::Browsing {
            return Err(DomainError::invariant("already in the configuration phase"));
        }
        if self.selection.is_empty() {
            return Err(DomainError::validation("select at least one product first"));
        }
        let kind = self
            .parent_kind
            .ok_or_else(|| DomainError::invariant("parent record kind is unknown"))?;

        self.snapshot_selection_from_initial();
        self.visible = self.initial.clone();
        self.sorted_by = None;
        self.phase = WizardPhase::Configuring;
        self.filter_overlay_open = false;
        self.note_message = Some(required_fields_note(kind));
        Ok(())
    }

    /// Configuring → Browsing. The selection set survives.
    pub fn retreat(&mut self) {
        self.phase = WizardPhase::Browsing;
        self.note_message = None;
    }

    /// Merge a batch of inline grid edits into the selection.
    pub fn edit_drafts(&mut self, edits: Vec<DraftEdit>) {
        merge_drafts(&mut self.selection, edits);
    }

    /// Configuring → terminal: create one child record per selection entry,
    /// all-or-nothing.
    ///
    /// On any creation failure every record created in the batch is deleted as
    /// compensation and the most specific structured message is surfaced; the
    /// selection is untouched, so the commit can be retried.
    pub async fn commit(&mut self) -> Result<Vec<RecordId>, CommitError> {
        if self.phase != WizardPhase::Configuring {
            return Err(CommitError::InvariantViolation(
                "commit is only available from the configuration grid".to_string(),
            ));
        }
        let kind = self.parent_kind.ok_or_else(|| {
            CommitError::InvariantViolation("parent record kind is unknown".to_string())
        })?;

        if let Err(error) = validate_for_commit(&self.selection, kind) {
            let commit_error = CommitError::from(error);
            self.shell
                .notify(Notice::sticky_error(commit_error.to_string()));
            return Err(commit_error);
        }

        let payloads = build_batch(&self.selection, kind, self.parent_id);
        let (created, failure) =
            dispatch_batch(&self.writer, kind.child_record_type(), payloads).await;

        if let Some(error) = failure {
            let compensated = roll_back(&self.writer, created).await;
            let message = error.surfaced_message();
            tracing::warn!(
                error = %message,
                compensated,
                "commit failed; compensating deletes issued"
            );
            self.shell.notify(Notice::sticky_error(message.clone()));
            return Err(CommitError::Failed {
                message,
                compensated,
            });
        }

        self.shell
            .notify(Notice::success("Record Created Successfully"));
        self.shell.navigate(NavTarget::RecordView {
            parent_kind: kind,
            record_id: self.parent_id,
        });
        Ok(created)
    }

    /// Abandon the wizard and return to the parent record.
    pub fn cancel(&self) {
        if let Some(kind) = self.parent_kind {
            self.shell.navigate(NavTarget::RecordView {
                parent_kind: kind,
                record_id: self.parent_id,
            });
        }
    }

    fn rebuild_projection(&mut self) {
        self.selection = self
            .selected_rows
            .iter()
            .filter_map(|row| SelectionEntry::project(row, &self.config_columns))
            .collect();
    }

    /// Re-project every entry from the canonical initial row with the same
    /// price-list binding (falling back to the held row if the initial view is
    /// gone, which only happens on degraded fetches).
    fn snapshot_selection_from_initial(&mut self) {
        let columns = &self.config_columns;
        self.selection = self
            .selected_rows
            .iter()
            .filter_map(|held| {
                let canonical = self
                    .initial
                    .iter()
                    .find(|row| row.id == held.id)
                    .unwrap_or(held);
                SelectionEntry::project(canonical, columns)
            })
            .collect();
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn filter_overlay_open(&self) -> bool {
        self.filter_overlay_open
    }

    pub fn parent_kind(&self) -> Option<ParentKind> {
        self.parent_kind
    }

    pub fn visible_rows(&self) -> &[CatalogRow] {
        &self.visible
    }

    pub fn selection(&self) -> &[SelectionEntry] {
        &self.selection
    }

    pub fn pills(&self) -> Vec<Pill> {
        self.selection.iter().map(SelectionEntry::pill).collect()
    }

    pub fn table_columns(&self) -> &[TableColumn] {
        &self.table_columns
    }

    pub fn config_columns(&self) -> &[ConfigColumn] {
        &self.config_columns
    }

    pub fn filter_fields(&self) -> &[FilterField] {
        &self.filter_fields
    }

    pub fn note_message(&self) -> Option<&str> {
        self.note_message.as_deref()
    }

    pub fn sorted_by(&self) -> Option<(&str, Direction)> {
        self.sorted_by.as_ref().map(|(f, d)| (f.as_str(), *d))
    }
}
