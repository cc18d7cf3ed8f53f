//! Commit batch construction, concurrent dispatch, and compensating rollback.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinSet;

use lineup_core::{DomainError, FieldMap, ParentKind, RecordId};
use lineup_gateway::{GatewayError, RecordWriter};

use crate::selection::SelectionEntry;

/// Commit failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommitError {
    /// A precondition failed; nothing was created.
    #[error("{0}")]
    Validation(String),

    /// The commit was attempted from an impossible state; nothing was created.
    #[error("{0}")]
    InvariantViolation(String),

    /// One or more creations failed; every creation that succeeded was
    /// compensated. The selection is unchanged and the commit can be retried.
    #[error("{message}")]
    Failed { message: String, compensated: usize },
}

impl From<DomainError> for CommitError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => CommitError::Validation(msg),
            DomainError::InvariantViolation(msg) => CommitError::InvariantViolation(msg),
            DomainError::InvalidId(msg) => CommitError::Validation(msg),
        }
    }
}

/// Build one creation payload per selection entry.
///
/// Display-only fields are stripped (`Product2Id` carries the product name,
/// `ListPrice` the joined display price); the parent linkage field is added
/// per the parent-kind dispatch table.
pub fn build_batch(
    entries: &[SelectionEntry],
    kind: ParentKind,
    parent_id: RecordId,
) -> Vec<FieldMap> {
    entries
        .iter()
        .map(|entry| {
            let mut fields = entry.fields.clone();
            fields.remove("Product2Id");
            fields.remove("ListPrice");
            fields.insert(
                kind.linkage_field().to_string(),
                Value::String(parent_id.to_string()),
            );
            fields
        })
        .collect()
}

/// Launch every creation concurrently and join the batch.
///
/// Returns the ids created (in completion order) and the first failure
/// encountered, if any. No ordering is guaranteed among creations; a failure
/// does not stop sibling requests, so the created set can grow after it.
pub(crate) async fn dispatch_batch<W>(
    writer: &Arc<W>,
    record_type: &'static str,
    payloads: Vec<FieldMap>,
) -> (Vec<RecordId>, Option<GatewayError>)
where
    W: RecordWriter + 'static,
{
    let mut set = JoinSet::new();
    for fields in payloads {
        let writer = Arc::clone(writer);
        set.spawn(async move { writer.create_child_record(record_type, fields).await });
    }

    let mut created = Vec::new();
    let mut failure = None;
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Ok(id)) => created.push(id),
            Ok(Err(error)) => {
                if failure.is_none() {
                    failure = Some(error);
                }
            }
            Err(join_error) => {
                if failure.is_none() {
                    failure = Some(GatewayError::generic(format!(
                        "creation task failed: {join_error}"
                    )));
                }
            }
        }
    }
    (created, failure)
}

/// Delete everything the failed batch managed to create.
///
/// Deletions run independently; one failure never blocks the rest. An
/// "entity already deleted" response counts as satisfied (idempotent
/// rollback); any other deletion failure is logged and otherwise dropped.
pub(crate) async fn roll_back<W>(writer: &Arc<W>, created: Vec<RecordId>) -> usize
where
    W: RecordWriter + 'static,
{
    let mut set = JoinSet::new();
    for id in created {
        let writer = Arc::clone(writer);
        set.spawn(async move { (id, writer.delete_record(id).await) });
    }

    let mut compensated = 0;
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((_, Ok(()))) => compensated += 1,
            Ok((id, Err(error))) if error.is_entity_deleted() => {
                tracing::debug!(record_id = %id, "compensating delete found entity already gone");
                compensated += 1;
            }
            Ok((id, Err(error))) => {
                tracing::warn!(record_id = %id, error = %error, "compensating delete failed");
            }
            Err(join_error) => {
                tracing::warn!(error = %join_error, "compensating delete task failed");
            }
        }
    }
    compensated
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineup_catalog::PricebookEntryId;
    use serde_json::json;

    fn entry(name: &str, quantity: &str, price: &str) -> SelectionEntry {
        let entry_id = PricebookEntryId::new(RecordId::new());
        let mut fields = FieldMap::new();
        fields.insert("Product2Id".to_string(), json!(name));
        fields.insert("Quantity".to_string(), json!(quantity));
        fields.insert("UnitPrice".to_string(), json!(price));
        fields.insert("ListPrice".to_string(), json!(price));
        fields.insert("PricebookEntryId".to_string(), json!(entry_id.to_string()));
        SelectionEntry {
            pricebook_entry_id: entry_id,
            label: name.to_string(),
            fields,
        }
    }

    #[test]
    fn batch_strips_display_fields_and_links_the_parent() {
        let parent = RecordId::new();
        let entries = vec![entry("A", "1", "10"), entry("B", "2", "20")];

        let batch = build_batch(&entries, ParentKind::Quote, parent);

        assert_eq!(batch.len(), 2);
        for (payload, source) in batch.iter().zip(&entries) {
            assert!(!payload.contains_key("Product2Id"));
            assert!(!payload.contains_key("ListPrice"));
            assert_eq!(payload["QuoteId"], json!(parent.to_string()));
            assert_eq!(payload["Quantity"], source.fields["Quantity"]);
            assert_eq!(payload["UnitPrice"], source.fields["UnitPrice"]);
            assert_eq!(
                payload["PricebookEntryId"],
                source.fields["PricebookEntryId"]
            );
        }
    }

    #[test]
    fn batch_preserves_entry_order() {
        let parent = RecordId::new();
        let entries: Vec<_> = ["x", "y", "z"]
            .iter()
            .map(|n| entry(n, "1", "1"))
            .collect();
        let batch = build_batch(&entries, ParentKind::Order, parent);
        for (payload, source) in batch.iter().zip(&entries) {
            assert_eq!(
                payload["PricebookEntryId"],
                source.fields["PricebookEntryId"]
            );
        }
    }
}
