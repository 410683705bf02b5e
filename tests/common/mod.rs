//! Contract suite shared by every backend.
//!
//! Each check takes a freshly opened, empty store.
#![allow(dead_code)]

use docstore::storage::MAX_ID_LEN;
use docstore::{
    AuditAction, Changes, Content, Document, DocumentStoreExt, DocumentType, DocumentVersion,
    ErrorKind, ListQuery, Metadata, StorageError, StoreHandle,
};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

pub fn sample_document(id: &str, user: &str, document_type: DocumentType) -> Document {
    let mut metadata = Metadata::with_id(id, document_type, format!("Document {id}"), user);
    metadata.tags = vec!["zeta".to_string(), "alpha".to_string()];
    metadata.summary = Some("A sample".to_string());
    let mut content = Content::new(format!("# {id}"), id);
    content
        .structured_data
        .insert("second".to_string(), json!(2));
    content
        .structured_data
        .insert("first".to_string(), json!({"nested": [1, 2]}));
    content.embeddings = Some(vec![0.5, -0.25]);
    Document::new(metadata, content)
}

fn actions(document: &Document) -> Vec<AuditAction> {
    document.audit_log().iter().map(|e| e.action).collect()
}

fn version_numbers(ledger: &[DocumentVersion]) -> Vec<u32> {
    ledger.iter().map(|v| v.version).collect()
}

pub async fn save_then_load_roundtrips(store: &StoreHandle) {
    let mut document = sample_document("doc-1", "alice", DocumentType::Markdown);
    store.save(&mut document).await.unwrap();
    assert_eq!(actions(&document), vec![AuditAction::Created]);

    let loaded = store.load("doc-1").await.unwrap().expect("saved document");
    assert_eq!(loaded.metadata, document.metadata);
    assert_eq!(loaded.content, document.content);
    let keys: Vec<&String> = loaded.content.structured_data.keys().collect();
    assert_eq!(keys, vec!["second", "first"]);
    assert_eq!(loaded.metadata.tags, vec!["zeta", "alpha"]);
    assert_eq!(
        actions(&loaded),
        vec![AuditAction::Created, AuditAction::Accessed]
    );
}

pub async fn missing_documents_are_values_not_errors(store: &StoreHandle) {
    assert!(store.load("nope").await.unwrap().is_none());
    assert!(!store.exists("nope").await.unwrap());
    assert!(!store.delete("nope").await.unwrap());
    assert!(store.get_versions("nope").await.unwrap().is_empty());
    assert!(store.get_file("nope", "pdf").await.unwrap().is_none());
    assert!(!store.delete_file("nope", "pdf").await.unwrap());
}

pub async fn delete_removes_document_and_versions(store: &StoreHandle) {
    let mut document = sample_document("doc-1", "alice", DocumentType::Text);
    store.create_document(&mut document, "init").await.unwrap();

    assert!(store.delete("doc-1").await.unwrap());
    assert!(!store.exists("doc-1").await.unwrap());
    assert!(store.load("doc-1").await.unwrap().is_none());
    assert!(store.get_versions("doc-1").await.unwrap().is_empty());
    assert!(store
        .list_documents(&ListQuery::new())
        .await
        .unwrap()
        .is_empty());
}

pub async fn versions_increase_strictly(store: &StoreHandle) {
    let mut document = sample_document("doc-1", "alice", DocumentType::Json);
    store.create_document(&mut document, "init").await.unwrap();
    for i in 0..3 {
        document.content.raw_text = format!("edit {i}");
        let mut changes = Changes::new();
        changes.insert("raw_text".to_string(), json!(document.content.raw_text));
        store
            .commit_update(&mut document, "bob", changes, "edit")
            .await
            .unwrap();
    }

    let ledger = store.get_versions("doc-1").await.unwrap();
    assert_eq!(version_numbers(&ledger), vec![1, 2, 3, 4]);
    let live = store.load("doc-1").await.unwrap().unwrap();
    assert_eq!(live.metadata.version, 4);
    assert_eq!(live.metadata.updated_user, "bob");
    assert_eq!(live.history().len(), 4);
}

pub async fn save_version_rejects_reused_numbers(store: &StoreHandle) {
    let mut document = sample_document("doc-1", "alice", DocumentType::Text);
    store.create_document(&mut document, "init").await.unwrap();

    let dup = DocumentVersion::new(1, "bob", Changes::new(), "again");
    let err = store.save_version("doc-1", dup).await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidInput(_)));
    assert_eq!(store.get_versions("doc-1").await.unwrap().len(), 1);
}

pub async fn save_version_requires_parent(store: &StoreHandle) {
    let version = DocumentVersion::new(1, "bob", Changes::new(), "orphan");
    let err = store.save_version("ghost", version).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DocumentNotFound);
}

pub async fn revert_moves_forward(store: &StoreHandle) {
    let mut document = sample_document("doc-1", "alice", DocumentType::Markdown);
    store.create_document(&mut document, "init").await.unwrap();
    let original = document.content.clone();

    for (i, name) in ["second", "third"].iter().enumerate() {
        document.metadata.name = (*name).to_string();
        document.content.formatted_content = format!("edit {i}");
        let mut changes = Changes::new();
        changes.insert("name".to_string(), json!(name));
        store
            .commit_update(&mut document, "bob", changes, "rename")
            .await
            .unwrap();
    }

    let reverted = store.revert_to_version("doc-1", 1, "carol").await.unwrap();
    assert_eq!(reverted.metadata.version, 4);
    assert_eq!(reverted.metadata.name, "Document doc-1");
    assert_eq!(reverted.content, original);
    assert_eq!(reverted.metadata.updated_user, "carol");
    assert_eq!(reverted.metadata.created_user, "alice");
    assert_eq!(reverted.id(), "doc-1");
    assert_eq!(
        reverted.audit_log().last().map(|e| e.action),
        Some(AuditAction::RevertedFrom(1))
    );

    let ledger = store.get_versions("doc-1").await.unwrap();
    assert_eq!(version_numbers(&ledger), vec![1, 2, 3, 4]);
    let record = &ledger[3];
    assert_eq!(record.user, "carol");
    assert_eq!(record.changes["action"], "reverted");
    assert_eq!(record.changes["from_version"], 1);

    let live = store.load("doc-1").await.unwrap().unwrap();
    assert_eq!(live.metadata.version, 4);
    assert_eq!(live.content, original);
}

pub async fn revert_to_unknown_version_fails(store: &StoreHandle) {
    let mut document = sample_document("doc-1", "alice", DocumentType::Text);
    store.create_document(&mut document, "init").await.unwrap();

    let err = store
        .revert_to_version("doc-1", 999, "carol")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VersionNotFound);

    let live = store.load("doc-1").await.unwrap().unwrap();
    assert_eq!(live.metadata.version, 1);
    assert_eq!(store.get_versions("doc-1").await.unwrap().len(), 1);
}

pub async fn revert_of_missing_document_fails(store: &StoreHandle) {
    let err = store.revert_to_version("ghost", 1, "carol").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DocumentNotFound);
}

pub async fn list_filters_and_paginates(store: &StoreHandle) {
    for (id, user, document_type) in [
        ("d1", "a", DocumentType::Pdf),
        ("d2", "a", DocumentType::Markdown),
        ("d3", "b", DocumentType::Pdf),
    ] {
        let mut document = sample_document(id, user, document_type);
        store.save(&mut document).await.unwrap();
    }

    let by_a = store
        .list_documents(&ListQuery::new().user("a"))
        .await
        .unwrap();
    let mut ids: Vec<&str> = by_a.iter().map(Metadata::document_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["d1", "d2"]);

    let pdfs_by_a = store
        .list_documents(&ListQuery::new().user("a").document_type(DocumentType::Pdf))
        .await
        .unwrap();
    assert_eq!(pdfs_by_a.len(), 1);
    assert_eq!(pdfs_by_a[0].document_id(), "d1");

    let all = store.list_documents(&ListQuery::new()).await.unwrap();
    assert_eq!(all.len(), 3);
    let page = store
        .list_documents(&ListQuery::new().offset(1).limit(1))
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].document_id(), all[1].document_id());
    let past_end = store
        .list_documents(&ListQuery::new().offset(3))
        .await
        .unwrap();
    assert!(past_end.is_empty());
}

pub async fn attachments_roundtrip(store: &StoreHandle) {
    store.save_file("doc-1", "pdf", &[7]).await.unwrap();
    assert_eq!(store.get_file("doc-1", ".pdf").await.unwrap(), Some(vec![7]));

    store.save_file("doc-1", "pdf", b"replaced").await.unwrap();
    assert_eq!(
        store.get_file("doc-1", "pdf").await.unwrap(),
        Some(b"replaced".to_vec())
    );
    assert!(store.get_file("doc-1", "txt").await.unwrap().is_none());
    assert!(store.delete_file("doc-1", "pdf").await.unwrap());
    assert!(store.get_file("doc-1", "pdf").await.unwrap().is_none());
}

pub async fn independent_documents_save_concurrently(store: &StoreHandle) {
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..8 {
        let store = Arc::clone(store);
        tasks.spawn(async move {
            let mut document =
                sample_document(&format!("doc-{i}"), "alice", DocumentType::Text);
            store.create_document(&mut document, "init").await
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }
    assert_eq!(
        store.list_documents(&ListQuery::new()).await.unwrap().len(),
        8
    );
}

pub async fn invalid_ids_are_rejected(store: &StoreHandle) {
    for id in ["", "../etc", "a/b"] {
        let err = store.exists(id).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)), "{id:?}");
    }
}

pub async fn longest_ids_are_accepted_and_longer_rejected(store: &StoreHandle) {
    let id = "x".repeat(MAX_ID_LEN);
    let extension = format!(".{}", "e".repeat(16));
    let mut document = sample_document(&id, "alice", DocumentType::Text);
    store.create_document(&mut document, "init").await.unwrap();
    store.save_file(&id, &extension, b"data").await.unwrap();

    assert!(store.load(&id).await.unwrap().is_some());
    assert_eq!(version_numbers(&store.get_versions(&id).await.unwrap()), vec![1]);
    assert_eq!(store.list_documents(&ListQuery::new()).await.unwrap().len(), 1);
    assert_eq!(
        store.get_file(&id, &extension).await.unwrap(),
        Some(b"data".to_vec())
    );

    let too_long = format!("{id}x");
    let mut document = sample_document(&too_long, "alice", DocumentType::Text);
    let err = store.save(&mut document).await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidInput(_)));
    let err = store.exists(&too_long).await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidInput(_)));
}

pub async fn non_finite_embeddings_are_rejected(store: &StoreHandle) {
    for bad in [f32::NAN, f32::INFINITY] {
        let mut document = sample_document("doc-1", "alice", DocumentType::Text);
        document.content.embeddings = Some(vec![0.1, bad]);
        let err = store.save(&mut document).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)), "{bad}");
        assert!(document.audit_log().is_empty());
    }
    assert!(!store.exists("doc-1").await.unwrap());
    assert!(store.list_documents(&ListQuery::new()).await.unwrap().is_empty());
}

pub async fn closed_store_reports_connection_errors(store: &StoreHandle) {
    store.close().await.unwrap();
    let err = store.load("doc-1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(!store.health_check().await.is_healthy());
}
