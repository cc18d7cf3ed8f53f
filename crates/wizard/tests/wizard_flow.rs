//! Black-box tests of the commit protocol, driven through the public wizard
//! API against in-memory collaborators.

use std::sync::Arc;

use serde_json::json;

use lineup_catalog::{CatalogRow, PriceEntry, PricebookEntryId, PricebookId, ProductId};
use lineup_core::{FieldMap, ParentKind, RecordId};
use lineup_gateway::{
    FieldDescriptor, FieldType, GatewayError, InMemoryCatalog, InMemoryRecords, NavTarget,
    NoticePersistence, RecordingShell, Severity,
};
use lineup_wizard::{CommitError, DraftEdit, WizardController, WizardPhase};

struct Wizard {
    controller: WizardController<InMemoryCatalog, InMemoryRecords, Arc<RecordingShell>>,
    writer: Arc<InMemoryRecords>,
    shell: Arc<RecordingShell>,
    parent_id: RecordId,
}

fn descriptor(api_name: &str, field_type: FieldType) -> FieldDescriptor {
    FieldDescriptor {
        api_name: api_name.to_string(),
        label: api_name.to_string(),
        field_type,
    }
}

fn product(name: &str) -> CatalogRow {
    let mut fields = FieldMap::new();
    fields.insert("Family".to_string(), json!("Hardware"));
    CatalogRow::unpriced(ProductId::new(RecordId::new()), name, fields)
}

/// A wizard over three priced products, loaded and ready in Browsing.
async fn spawn_wizard(kind: ParentKind) -> Wizard {
    let products = vec![product("Anvil"), product("Mixer"), product("Pump")];
    let price_entries: Vec<PriceEntry> = products
        .iter()
        .enumerate()
        .map(|(i, p)| PriceEntry {
            id: PricebookEntryId::new(RecordId::new()),
            product_id: p.id,
            unit_price: 10.0 * (i + 1) as f64,
        })
        .collect();

    let mut catalog = InMemoryCatalog::new(kind);
    catalog.columns = vec![descriptor("Name", FieldType::Other)];
    catalog.config_schema = vec![
        descriptor("Product2Id", FieldType::Other),
        descriptor("Quantity", FieldType::Double),
        descriptor("UnitPrice", FieldType::Double),
        descriptor("ListPrice", FieldType::Double),
    ];
    catalog.products = products;
    catalog.price_entries = price_entries;

    let writer = Arc::new(InMemoryRecords::new());
    let shell = Arc::new(RecordingShell::new());
    let parent_id = RecordId::new();
    let mut controller = WizardController::new(
        catalog,
        Arc::clone(&writer),
        Arc::clone(&shell),
        parent_id,
        PricebookId::new(RecordId::new()),
    );
    controller.load().await;

    Wizard {
        controller,
        writer,
        shell,
        parent_id,
    }
}

/// Select every product and advance to the configuration grid.
fn configure_all(wizard: &mut Wizard) {
    let rows: Vec<CatalogRow> = wizard.controller.visible_rows().to_vec();
    wizard.controller.select_rows(&rows);
    wizard.controller.advance().unwrap();
}

/// Fill in the quantity on every grid row (prices come from the join).
fn fill_quantities(wizard: &mut Wizard) {
    let edits = (0..wizard.controller.selection().len())
        .map(|row| {
            let mut fields = FieldMap::new();
            fields.insert("Quantity".to_string(), json!("2"));
            DraftEdit { row, fields }
        })
        .collect();
    wizard.controller.edit_drafts(edits);
}

fn last_notice_message(wizard: &Wizard) -> String {
    wizard.shell.notices().last().expect("a notice").message.clone()
}

#[tokio::test]
async fn commit_creates_one_line_item_per_entry() {
    let mut wizard = spawn_wizard(ParentKind::Opportunity).await;
    configure_all(&mut wizard);
    fill_quantities(&mut wizard);

    let created = wizard.controller.commit().await.unwrap();
    assert_eq!(created.len(), 3);

    let records = wizard.writer.created_records();
    assert_eq!(records.len(), 3);
    for record in &records {
        assert_eq!(record.record_type, "OpportunityLineItem");
        assert_eq!(
            record.fields["OpportunityId"],
            json!(wizard.parent_id.to_string())
        );
        // Display-only fields never reach the persistence collaborator.
        assert!(!record.fields.contains_key("Product2Id"));
        assert!(!record.fields.contains_key("ListPrice"));
        assert!(record.fields.contains_key("PricebookEntryId"));
        assert_eq!(record.fields["Quantity"], json!("2"));
    }

    // Every selection entry is represented exactly once.
    let mut bindings: Vec<String> = records
        .iter()
        .map(|r| r.fields["PricebookEntryId"].as_str().unwrap().to_string())
        .collect();
    bindings.sort();
    bindings.dedup();
    assert_eq!(bindings.len(), 3);

    let notices = wizard.shell.notices();
    let last = notices.last().unwrap();
    assert_eq!(last.severity, Severity::Success);
    assert_eq!(last.message, "Record Created Successfully");

    match wizard.shell.navigations().as_slice() {
        [NavTarget::RecordView {
            parent_kind,
            record_id,
        }] => {
            assert_eq!(*parent_kind, ParentKind::Opportunity);
            assert_eq!(*record_id, wizard.parent_id);
        }
        other => panic!("expected one record-view navigation, got {other:?}"),
    }
}

#[tokio::test]
async fn order_parents_create_order_items() {
    let mut wizard = spawn_wizard(ParentKind::Order).await;
    configure_all(&mut wizard);
    fill_quantities(&mut wizard);

    wizard.controller.commit().await.unwrap();

    for record in wizard.writer.created_records() {
        assert_eq!(record.record_type, "OrderItem");
        assert_eq!(record.fields["OrderId"], json!(wizard.parent_id.to_string()));
    }
}

#[tokio::test]
async fn missing_quantity_blocks_the_whole_commit() {
    let mut wizard = spawn_wizard(ParentKind::Opportunity).await;
    configure_all(&mut wizard);
    // Sales price is set from the join; quantity left empty.

    let err = wizard.controller.commit().await.unwrap_err();
    match err {
        CommitError::Validation(msg) => {
            assert_eq!(msg, "Required Field Missing. Please check Quantity and Sales Price")
        }
        other => panic!("expected Validation, got {other:?}"),
    }

    assert!(wizard.writer.created_records().is_empty());
    assert!(wizard.shell.navigations().is_empty());

    let notices = wizard.shell.notices();
    let last = notices.last().unwrap();
    assert_eq!(last.severity, Severity::Error);
    assert_eq!(last.persistence, NoticePersistence::Sticky);
}

#[tokio::test]
async fn missing_unit_price_blocks_an_order_commit() {
    let mut wizard = spawn_wizard(ParentKind::Order).await;
    configure_all(&mut wizard);
    fill_quantities(&mut wizard);

    // Blank out one price; quantity stays set.
    let mut fields = FieldMap::new();
    fields.insert("UnitPrice".to_string(), json!(""));
    wizard
        .controller
        .edit_drafts(vec![DraftEdit { row: 1, fields }]);

    let err = wizard.controller.commit().await.unwrap_err();
    match err {
        CommitError::Validation(msg) => {
            assert_eq!(msg, "Required Field Missing. Please check Quantity and Unit Price")
        }
        other => panic!("expected Validation, got {other:?}"),
    }
    assert!(wizard.writer.created_records().is_empty());
}

#[tokio::test]
async fn partial_failure_compensates_every_created_record() {
    let mut wizard = spawn_wizard(ParentKind::Quote).await;
    configure_all(&mut wizard);
    fill_quantities(&mut wizard);

    // Creation #2 fails; #1 and #3 succeed and must be rolled back.
    let failing_entry = wizard.controller.selection()[1].pricebook_entry_id;
    wizard
        .writer
        .fail_create_for_entry(failing_entry, GatewayError::row("insufficient access"));

    let err = wizard.controller.commit().await.unwrap_err();
    match err {
        CommitError::Failed {
            message,
            compensated,
        } => {
            assert_eq!(message, "insufficient access");
            assert_eq!(compensated, 2);
        }
        other => panic!("expected Failed, got {other:?}"),
    }

    // Zero net records remain.
    assert_eq!(wizard.writer.created_records().len(), 2);
    assert_eq!(wizard.writer.deleted_ids().len(), 2);
    assert!(wizard.writer.remaining_ids().is_empty());

    // The surfaced message is the failing creation's, sticky, no navigation.
    assert_eq!(last_notice_message(&wizard), "insufficient access");
    assert!(wizard.shell.navigations().is_empty());
    assert_eq!(wizard.controller.phase(), WizardPhase::Configuring);
}

#[tokio::test]
async fn a_failed_commit_can_be_retried() {
    let mut wizard = spawn_wizard(ParentKind::Quote).await;
    configure_all(&mut wizard);
    fill_quantities(&mut wizard);

    let failing_entry = wizard.controller.selection()[0].pricebook_entry_id;
    wizard
        .writer
        .fail_create_for_entry(failing_entry, GatewayError::field("Quantity", "bad quantity"));

    let err = wizard.controller.commit().await.unwrap_err();
    assert!(matches!(err, CommitError::Failed { .. }));
    assert_eq!(last_notice_message(&wizard), "bad quantity");

    // Same selection, fresh batch, after the platform-side issue clears.
    wizard.writer.clear_create_failures();
    let created = wizard.controller.commit().await.unwrap();
    assert_eq!(created.len(), 3);
    assert_eq!(wizard.writer.remaining_ids().len(), 3);
}

#[tokio::test]
async fn rollback_counts_already_deleted_entities_as_compensated() {
    let mut wizard = spawn_wizard(ParentKind::Order).await;
    configure_all(&mut wizard);
    fill_quantities(&mut wizard);

    let failing_entry = wizard.controller.selection()[2].pricebook_entry_id;
    wizard
        .writer
        .fail_create_for_entry(failing_entry, GatewayError::row("row locked"));
    // Every compensating delete reports the entity as already gone.
    wizard.writer.fail_all_deletes(GatewayError::entity_deleted());

    let err = wizard.controller.commit().await.unwrap_err();
    match err {
        CommitError::Failed {
            message,
            compensated,
        } => {
            assert_eq!(message, "row locked");
            // Idempotent rollback: "already deleted" counts as satisfied.
            assert_eq!(compensated, 2);
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}
