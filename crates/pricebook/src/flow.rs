//! The resolution flow itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lineup_catalog::PricebookId;
use lineup_core::RecordId;
use lineup_gateway::{
    CatalogSource, ConfirmChoice, ConfirmRequest, GatewayError, NavTarget, Notice,
    PricebookSummary, RecordWriter, Shell,
};

/// Outcome of a save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// The price list is settled; the wizard page was requested.
    HandOff { pricebook_id: PricebookId },
    /// Nothing changed (no selection yet, or the user backed out).
    Cancelled,
}

/// A collaborator failure that aborted the flow. Hand-off never happens on
/// error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error(transparent)]
pub struct FlowError(#[from] pub GatewayError);

/// Price-list resolution for one parent record.
pub struct PricebookFlow<S, W, U> {
    source: S,
    writer: W,
    shell: U,

    parent_id: RecordId,
    options: Vec<PricebookSummary>,
    existing: Option<PricebookId>,
    selected: Option<PricebookId>,
}

impl<S, W, U> PricebookFlow<S, W, U>
where
    S: CatalogSource,
    W: RecordWriter,
    U: Shell,
{
    pub fn new(source: S, writer: W, shell: U, parent_id: RecordId) -> Self {
        Self {
            source,
            writer,
            shell,
            parent_id,
            options: Vec::new(),
            existing: None,
            selected: None,
        }
    }

    /// Fetch the picker options and the parent's current association. Fetch
    /// failures are logged and leave the picker empty.
    pub async fn load(&mut self) {
        match self.source.fetch_pricebooks().await {
            Ok(options) => self.options = options,
            Err(error) => {
                tracing::warn!(error = %error, "pricebook list fetch failed");
            }
        }

        match self.source.fetch_parent_pricebook(self.parent_id).await {
            Ok(existing) => {
                self.existing = existing;
                // The picker defaults to the current association.
                self.selected = existing;
            }
            Err(error) => {
                tracing::warn!(error = %error, "parent pricebook fetch failed");
            }
        }
    }

    /// Record the picker choice.
    pub fn select(&mut self, pricebook_id: PricebookId) {
        self.selected = Some(pricebook_id);
    }

    /// Settle the selection.
    ///
    /// - Re-picking the current price list hands off without a write.
    /// - A first-time pick is persisted, then handed off.
    /// - Picking a different price list deletes the parent's existing line
    ///   items (confirmed via modal), persists the new association, then hands
    ///   off. Cancelling the modal changes nothing.
    pub async fn save(&mut self) -> Result<Resolution, FlowError> {
        let Some(selected) = self.selected else {
            return Ok(Resolution::Cancelled);
        };

        match self.existing {
            Some(existing) if existing == selected => {
                // No redundant write on re-picking the same price list.
                self.hand_off(selected);
                Ok(Resolution::HandOff {
                    pricebook_id: selected,
                })
            }
            None => {
                self.persist(selected).await?;
                self.hand_off(selected);
                Ok(Resolution::HandOff {
                    pricebook_id: selected,
                })
            }
            Some(_) => self.replace(selected).await,
        }
    }

    /// The destructive path: confirm, purge existing line items, re-associate.
    async fn replace(&mut self, selected: PricebookId) -> Result<Resolution, FlowError> {
        let choice = match self
            .shell
            .confirm(ConfirmRequest::new("Confirm Price Book Change"))
            .await
        {
            Ok(choice) => choice,
            Err(error) => {
                tracing::warn!(error = %error, "confirmation modal failed");
                return Ok(Resolution::Cancelled);
            }
        };
        if choice == ConfirmChoice::Cancel {
            return Ok(Resolution::Cancelled);
        }

        if let Err(error) = self.writer.delete_child_line_items(self.parent_id).await {
            self.shell.notify(Notice::error(error.surfaced_message()));
            return Err(error.into());
        }

        self.persist(selected).await?;
        self.hand_off(selected);
        Ok(Resolution::HandOff {
            pricebook_id: selected,
        })
    }

    async fn persist(&mut self, selected: PricebookId) -> Result<(), FlowError> {
        if let Err(error) = self
            .writer
            .update_parent_pricebook(self.parent_id, selected)
            .await
        {
            self.shell.notify(Notice::error(error.surfaced_message()));
            return Err(error.into());
        }

        self.existing = Some(selected);
        self.shell
            .notify(Notice::success("pricebook updated successfully"));
        Ok(())
    }

    fn hand_off(&self, selected: PricebookId) {
        self.shell.navigate(NavTarget::ProductSelection {
            record_id: self.parent_id,
            pricebook_id: selected,
        });
    }

    pub fn options(&self) -> &[PricebookSummary] {
        &self.options
    }

    pub fn existing(&self) -> Option<PricebookId> {
        self.existing
    }

    pub fn selected(&self) -> Option<PricebookId> {
        self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lineup_core::ParentKind;
    use lineup_gateway::{
        InMemoryCatalog, InMemoryRecords, Operation, RecordingShell, Severity,
    };

    type TestFlow = PricebookFlow<InMemoryCatalog, Arc<InMemoryRecords>, Arc<RecordingShell>>;

    fn pricebook(name: &str) -> PricebookSummary {
        PricebookSummary {
            id: PricebookId::new(RecordId::new()),
            name: name.to_string(),
        }
    }

    fn flow_with(
        existing: Option<PricebookId>,
    ) -> (TestFlow, Arc<InMemoryRecords>, Arc<RecordingShell>, RecordId) {
        let mut catalog = InMemoryCatalog::new(ParentKind::Opportunity);
        catalog.pricebooks = vec![pricebook("Standard"), pricebook("Wholesale")];
        catalog.parent_pricebook = existing;

        let writer = Arc::new(InMemoryRecords::new());
        let shell = Arc::new(RecordingShell::new());
        let parent_id = RecordId::new();
        let flow = PricebookFlow::new(
            catalog,
            Arc::clone(&writer),
            Arc::clone(&shell),
            parent_id,
        );
        (flow, writer, shell, parent_id)
    }

    fn hand_offs(shell: &RecordingShell) -> Vec<PricebookId> {
        shell
            .navigations()
            .into_iter()
            .filter_map(|target| match target {
                NavTarget::ProductSelection { pricebook_id, .. } => Some(pricebook_id),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn load_defaults_the_picker_to_the_current_association() {
        let existing = PricebookId::new(RecordId::new());
        let (mut flow, _, _, _) = flow_with(Some(existing));
        flow.load().await;

        assert_eq!(flow.options().len(), 2);
        assert_eq!(flow.existing(), Some(existing));
        assert_eq!(flow.selected(), Some(existing));
    }

    #[tokio::test]
    async fn first_time_pick_persists_then_hands_off() {
        let (mut flow, writer, shell, parent_id) = flow_with(None);
        flow.load().await;

        let picked = PricebookId::new(RecordId::new());
        flow.select(picked);
        let resolution = flow.save().await.unwrap();

        assert_eq!(resolution, Resolution::HandOff { pricebook_id: picked });
        assert_eq!(
            writer.operations(),
            vec![Operation::UpdateParentPricebook {
                parent_id,
                pricebook_id: picked,
            }]
        );
        assert_eq!(hand_offs(&shell), vec![picked]);
        assert_eq!(shell.notices().last().unwrap().severity, Severity::Success);
    }

    #[tokio::test]
    async fn repicking_the_same_price_list_writes_nothing() {
        let existing = PricebookId::new(RecordId::new());
        let (mut flow, writer, shell, _) = flow_with(Some(existing));
        flow.load().await;

        let resolution = flow.save().await.unwrap();

        assert_eq!(
            resolution,
            Resolution::HandOff {
                pricebook_id: existing
            }
        );
        assert!(writer.operations().is_empty());
        assert_eq!(hand_offs(&shell), vec![existing]);
    }

    #[tokio::test]
    async fn cancelled_confirmation_changes_nothing() {
        let existing = PricebookId::new(RecordId::new());
        let (mut flow, writer, shell, _) = flow_with(Some(existing));
        shell.set_answer(ConfirmChoice::Cancel);
        flow.load().await;

        flow.select(PricebookId::new(RecordId::new()));
        let resolution = flow.save().await.unwrap();

        assert_eq!(resolution, Resolution::Cancelled);
        assert_eq!(shell.confirm_requests().len(), 1);
        assert!(writer.operations().is_empty());
        assert!(hand_offs(&shell).is_empty());
    }

    #[tokio::test]
    async fn confirmed_change_purges_line_items_before_persisting() {
        let existing = PricebookId::new(RecordId::new());
        let (mut flow, writer, shell, parent_id) = flow_with(Some(existing));
        flow.load().await;

        let picked = PricebookId::new(RecordId::new());
        flow.select(picked);
        let resolution = flow.save().await.unwrap();

        assert_eq!(resolution, Resolution::HandOff { pricebook_id: picked });
        // Deletion strictly precedes the new association.
        assert_eq!(
            writer.operations(),
            vec![
                Operation::DeleteChildLineItems { parent_id },
                Operation::UpdateParentPricebook {
                    parent_id,
                    pricebook_id: picked,
                },
            ]
        );
        assert_eq!(hand_offs(&shell), vec![picked]);
    }

    #[tokio::test]
    async fn persistence_failure_surfaces_and_blocks_hand_off() {
        let (mut flow, writer, shell, _) = flow_with(None);
        writer.fail_update_parent_pricebook(GatewayError::generic("row locked"));
        flow.load().await;

        flow.select(PricebookId::new(RecordId::new()));
        let err = flow.save().await.unwrap_err();

        assert_eq!(err.0.surfaced_message(), "row locked");
        assert!(hand_offs(&shell).is_empty());
        let notices = shell.notices();
        let last = notices.last().unwrap();
        assert_eq!(last.severity, Severity::Error);
        assert_eq!(last.message, "row locked");
    }

    #[tokio::test]
    async fn deletion_failure_aborts_before_persistence() {
        let existing = PricebookId::new(RecordId::new());
        let (mut flow, writer, shell, _) = flow_with(Some(existing));
        writer.fail_delete_child_line_items(GatewayError::generic("cleanup failed"));
        flow.load().await;

        flow.select(PricebookId::new(RecordId::new()));
        let err = flow.save().await.unwrap_err();

        assert_eq!(err.0.surfaced_message(), "cleanup failed");
        // Nothing was persisted and the wizard was never entered.
        assert!(writer.operations().is_empty());
        assert!(hand_offs(&shell).is_empty());
    }

    #[tokio::test]
    async fn saving_without_a_selection_is_a_no_op() {
        let (mut flow, writer, shell, _) = flow_with(None);
        flow.load().await;

        let resolution = flow.save().await.unwrap();
        assert_eq!(resolution, Resolution::Cancelled);
        assert!(writer.operations().is_empty());
        assert!(shell.navigations().is_empty());
    }
}
