//! Integration tests for the validation report


use linguabase_core::{build_report, ErrorKind, ReportEntry};
use linguabase_schemas::DocumentKind;
use serde_json::json;
use test_support::DataDir;

#[tokio::test]
async fn test_all_documents_valid() {
    let data = DataDir::complete();
    data.store
        .append_exercise(&test_support::translation_exercise("Olá"))
        .await
        .unwrap();

    let report = build_report(&data.store).await;

    assert!(report.is_healthy());
    assert_eq!(report.get(DocumentKind::KnowledgeBase), Some(&ReportEntry::Ok { count: 2 }));
    assert_eq!(report.get(DocumentKind::PromptLibrary), Some(&ReportEntry::Ok { count: 2 }));
    assert_eq!(report.get(DocumentKind::PracticeHistory), Some(&ReportEntry::Ok { count: 1 }));
    assert_eq!(report.get(DocumentKind::DialoguePhrases), Some(&ReportEntry::Ok { count: 3 }));
}

#[tokio::test]
async fn test_malformed_knowledge_base_is_isolated() {
    let data = DataDir::complete();
    data.write_raw(DocumentKind::KnowledgeBase, "{ this is not json");

    let report = build_report(&data.store).await;

    assert_eq!(report.entries.len(), 4);
    assert_eq!(report.invalid_count(), 1);
    assert!(matches!(
        report.get(DocumentKind::KnowledgeBase),
        Some(ReportEntry::Invalid { kind: ErrorKind::Malformed, .. })
    ));
    for kind in [
        DocumentKind::PromptLibrary,
        DocumentKind::PracticeHistory,
        DocumentKind::DialoguePhrases,
    ] {
        assert!(matches!(report.get(kind), Some(ReportEntry::Ok { .. })), "{kind} should be ok");
    }
    assert!(!report.is_healthy());
}

#[tokio::test]
async fn test_missing_history_is_optional_but_others_are_not() {
    let data = DataDir::complete();
    std::fs::remove_file(data.store.document_path(DocumentKind::PracticeHistory)).unwrap();
    std::fs::remove_file(data.store.document_path(DocumentKind::DialoguePhrases)).unwrap();

    let report = build_report(&data.store).await;

    assert_eq!(
        report.get(DocumentKind::PracticeHistory),
        Some(&ReportEntry::MissingButOptional)
    );
    assert!(matches!(
        report.get(DocumentKind::DialoguePhrases),
        Some(ReportEntry::Invalid { kind: ErrorKind::NotFound, .. })
    ));
}

#[tokio::test]
async fn test_report_json_shape() {
    let data = DataDir::complete();
    let mut phrases = test_support::dialogue_phrases();
    phrases["extra"] = json!(true);
    data.write(DocumentKind::DialoguePhrases, &phrases);

    let report = build_report(&data.store).await;
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["knowledge_base"], json!({"status": "ok", "count": 2}));
    assert_eq!(value["dialogue_phrases"]["status"], "invalid");
    assert_eq!(value["dialogue_phrases"]["kind"], "schema_violation");
    assert_eq!(value["dialogue_phrases"]["violations"]["errors"][0]["path"], "$.extra");
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 4);
}

#[tokio::test]
async fn test_empty_data_directory() {
    let data = DataDir::empty();

    let report = build_report(&data.store).await;

    assert_eq!(report.invalid_count(), 3);
    assert_eq!(
        report.get(DocumentKind::PracticeHistory),
        Some(&ReportEntry::MissingButOptional)
    );
}
