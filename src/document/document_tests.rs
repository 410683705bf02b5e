use super::*;
use serde_json::json;

fn sample() -> Document {
    let mut metadata = Metadata::with_id("doc-1", DocumentType::Markdown, "Notes", "alice");
    metadata.tags = vec!["b".to_string(), "a".to_string()];
    let mut content = Content::new("# Notes", "Notes");
    content
        .structured_data
        .insert("zeta".to_string(), json!(1));
    content
        .structured_data
        .insert("alpha".to_string(), json!({"nested": true}));
    content.embeddings = Some(vec![0.25, -1.5, 3.0]);
    Document::new(metadata, content)
}

#[test]
fn test_new_metadata_starts_at_version_one() {
    let metadata = Metadata::new(DocumentType::Pdf, "Report", "bob");
    assert_eq!(metadata.version, 1);
    assert_eq!(metadata.created_user, "bob");
    assert_eq!(metadata.updated_user, "bob");
    assert!(!metadata.document_id().is_empty());
}

#[test]
fn test_generated_ids_are_unique() {
    let a = Metadata::new(DocumentType::Text, "a", "u");
    let b = Metadata::new(DocumentType::Text, "b", "u");
    assert_ne!(a.document_id(), b.document_id());
}

#[test]
fn test_document_json_roundtrip_preserves_fields() {
    let mut doc = sample();
    doc.record(AuditAction::Created, "alice");
    let json = serde_json::to_string(&doc).unwrap();
    let back: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(back, doc);
    assert_eq!(back.audit_log().len(), 1);
}

#[test]
fn test_structured_data_keeps_insertion_order() {
    let doc = sample();
    let json = serde_json::to_string(&doc.content.structured_data).unwrap();
    let zeta = json.find("zeta").unwrap();
    let alpha = json.find("alpha").unwrap();
    assert!(zeta < alpha);
}

#[test]
fn test_audit_action_string_forms() {
    assert_eq!(AuditAction::Created.to_string(), "created");
    assert_eq!(AuditAction::RevertedFrom(3).to_string(), "reverted-from-3");
    assert_eq!(
        "reverted-from-12".parse::<AuditAction>().unwrap(),
        AuditAction::RevertedFrom(12)
    );
    assert!("reverted-from-x".parse::<AuditAction>().is_err());
    assert!("renamed".parse::<AuditAction>().is_err());
}

#[test]
fn test_audit_action_serializes_as_string() {
    let entry = AuditLogEntry::now(AuditAction::RevertedFrom(2), "carol");
    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(value["action"], json!("reverted-from-2"));
}

#[test]
fn test_document_type_parse_and_display() {
    assert_eq!("PDF".parse::<DocumentType>().unwrap(), DocumentType::Pdf);
    assert_eq!("md".parse::<DocumentType>().unwrap(), DocumentType::Markdown);
    assert_eq!(DocumentType::Youtube.to_string(), "youtube");
    assert!("spreadsheet".parse::<DocumentType>().is_err());
}

#[test]
fn test_snapshot_excludes_protected_fields() {
    let doc = sample();
    let snapshot = doc.snapshot().unwrap();
    let metadata = snapshot["metadata"].as_object().unwrap();
    for field in PROTECTED_METADATA_FIELDS {
        assert!(!metadata.contains_key(*field), "{field} should be excluded");
    }
    assert_eq!(metadata["name"], json!("Notes"));
    assert_eq!(snapshot["content"]["formatted_content"], json!("# Notes"));
}

#[test]
fn test_missing_optional_fields_deserialize_to_defaults() {
    let raw = json!({
        "metadata": {
            "document_id": "x",
            "document_type": "json",
            "name": "n",
            "created_user": "u",
            "updated_user": "u",
            "version": 1,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        },
        "content": {}
    });
    let doc: Document = serde_json::from_value(raw).unwrap();
    assert_eq!(doc.id(), "x");
    assert!(doc.audit_log().is_empty());
    assert!(doc.history().is_empty());
    assert_eq!(doc.metadata.processing_stage, ProcessingStage::Pending);
}
