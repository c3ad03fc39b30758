// Tests for report and data formatting

use super::*;
use linguabase_core::ErrorKind;
use linguabase_schemas::{DocumentKind, Rule, ValidationError, ValidationErrors};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Writer whose contents stay readable after being boxed
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let writer = OutputWriter::with_writer(format, false, quiet, Box::new(buffer.clone()));
    (writer, buffer)
}

fn sample_report() -> ValidationReport {
    let violations = ValidationErrors::from(ValidationError::new(
        "$.extra",
        "unknown field 'extra'",
        ValidationError::create_violation(Rule::UnknownField, "no undeclared fields", "extra"),
    ));
    let mut entries = BTreeMap::new();
    entries.insert(DocumentKind::KnowledgeBase, ReportEntry::Ok { count: 2 });
    entries.insert(DocumentKind::PromptLibrary, ReportEntry::Ok { count: 1 });
    entries.insert(DocumentKind::PracticeHistory, ReportEntry::MissingButOptional);
    entries.insert(
        DocumentKind::DialoguePhrases,
        ReportEntry::Invalid {
            kind: ErrorKind::SchemaViolation,
            error: "document 'dialogue_phrases' failed validation: $.extra: unknown field 'extra'"
                .to_string(),
            violations: Some(violations),
        },
    );
    ValidationReport { entries }
}

#[test]
fn test_human_report_lists_every_document() {
    let formatted = format_report_human(&sample_report(), false, false);

    assert!(formatted.contains("═══ Validation Report ═══"));
    assert!(formatted.contains("✓ knowledge_base    ok (2 entries)"));
    assert!(formatted.contains("✓ prompts           ok (1 entry)"));
    assert!(formatted.contains("- practice_history  missing (optional)"));
    assert!(formatted.contains("✗ dialogue_phrases  schema_violation: document 'dialogue_phrases'"));
    assert!(formatted.contains("1 document(s) failed validation"));
    assert!(!formatted.contains("(unknown_field)"));
}

#[test]
fn test_detailed_report_lists_violations() {
    let formatted = format_report_human(&sample_report(), true, false);
    assert!(formatted.contains("      $.extra unknown field 'extra' (unknown_field)"));
}

#[test]
fn test_healthy_report_summary() {
    let mut report = sample_report();
    report
        .entries
        .insert(DocumentKind::DialoguePhrases, ReportEntry::Ok { count: 3 });
    let formatted = format_report_human(&report, true, false);
    assert!(formatted.ends_with("All documents are valid\n"));
}

#[test]
fn test_json_report_is_keyed_by_logical_name() {
    let (mut output, buffer) = writer(OutputFormat::Json, false);
    output.report(&sample_report(), false).unwrap();

    let value: serde_json::Value = serde_json::from_str(&buffer.contents()).unwrap();
    assert_eq!(value["knowledge_base"]["status"], "ok");
    assert_eq!(value["practice_history"]["status"], "missing_but_optional");
    assert_eq!(value["dialogue_phrases"]["violations"]["errors"][0]["path"], "$.extra");
}

#[test]
fn test_yaml_report() {
    let (mut output, buffer) = writer(OutputFormat::Yaml, false);
    output.report(&sample_report(), false).unwrap();
    assert!(buffer.contents().starts_with("knowledge_base:\n  status: ok\n  count: 2\n"));
}

#[test]
fn test_messages_only_in_human_format() {
    let (mut output, buffer) = writer(OutputFormat::Json, false);
    output.info("loading").unwrap();
    output.success("done").unwrap();
    output.warning("careful").unwrap();
    assert_eq!(buffer.contents(), "");

    let (mut output, buffer) = writer(OutputFormat::Human, false);
    output.info("loading").unwrap();
    output.warning("careful").unwrap();
    assert_eq!(buffer.contents(), "INFO: loading\nWARNING: careful\n");
}

#[test]
fn test_quiet_suppresses_info_but_not_warnings() {
    let (mut output, buffer) = writer(OutputFormat::Human, true);
    output.info("loading").unwrap();
    output.success("done").unwrap();
    output.warning("careful").unwrap();
    assert_eq!(buffer.contents(), "WARNING: careful\n");
}
