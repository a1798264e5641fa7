//! Integration tests for error handling and edge cases.

use casemerge::error::CaseMergeError;
use casemerge::merge::CaseStatus;
use casemerge::output::NoProgress;
use casemerge::pipeline::run_batch;
use std::path::PathBuf;

use crate::common::{
    Workspace, file_names, write_garbage, write_image, write_pdf, write_pdf_with_dangling_parent,
};

#[test]
fn test_corrupt_document_rejects_only_its_case() {
    let ws = Workspace::new();
    write_pdf(&ws.input_file("111111111 Terms.pdf"), &[(612, 792)]);
    write_pdf(&ws.input_file("222222222 Terms.pdf"), &[(612, 792)]);
    write_garbage(&ws.input_file("222222222 Pay History.pdf"));

    let summary = run_batch(&ws.config(), None, &mut NoProgress).unwrap();

    assert_eq!(summary.merged, 1);
    assert_eq!(summary.rejected_corrupt, 1);
    assert_eq!(summary.results[1].status, CaseStatus::RejectedCorrupt);
    assert!(summary.results[1].failure.is_some());
    assert_eq!(
        file_names(&ws.output),
        vec!["111111111.pdf", "merge_results.csv"]
    );
    assert_eq!(
        ws.results_sheet(),
        "Case Number,Merged\n111111111,Yes\n222222222,\n"
    );
}

#[test]
fn test_unreadable_later_page_rejects_only_its_case() {
    let ws = Workspace::new();
    write_pdf(&ws.input_file("111111111 Terms.pdf"), &[(612, 792)]);
    write_pdf(&ws.input_file("222222222 Terms.pdf"), &[(612, 792)]);
    write_pdf_with_dangling_parent(&ws.input_file("222222222 Pay History.pdf"));
    write_pdf(&ws.input_file("333333333 Terms.pdf"), &[(612, 792)]);

    let mut fractions = Vec::new();
    let mut progress = |fraction: f64| fractions.push(fraction);
    let summary = run_batch(&ws.config(), None, &mut progress).unwrap();

    assert_eq!(summary.merged, 2);
    assert_eq!(summary.rejected_corrupt, 1);
    assert_eq!(summary.results[1].status, CaseStatus::RejectedCorrupt);
    assert!(ws.merged("111111111").exists());
    assert!(!ws.merged("222222222").exists());
    assert!(ws.merged("333333333").exists());
    assert_eq!(
        ws.results_sheet(),
        "Case Number,Merged\n111111111,Yes\n222222222,\n333333333,Yes\n"
    );
    assert_eq!(fractions.last(), Some(&1.0));
}

#[test]
fn test_unreadable_scan_rejects_its_case() {
    let ws = Workspace::new();
    std::fs::write(ws.input_file("123456789 scan.jpg"), b"not a jpeg").unwrap();
    write_image(&ws.input_file("987654321 scan.jpg"), 20, 30);

    let summary = run_batch(&ws.config(), None, &mut NoProgress).unwrap();

    assert_eq!(summary.scan.conversion_failures, 1);
    assert_eq!(summary.scan.converted, 1);
    assert_eq!(summary.rejected_corrupt, 1);
    assert!(!ws.merged("123456789").exists());
    assert!(ws.merged("987654321").exists());
}

#[test]
fn test_previous_output_is_replaced() {
    let ws = Workspace::new();
    write_pdf(&ws.input_file("123456789 Terms.pdf"), &[(612, 792)]);
    std::fs::create_dir_all(&ws.output).unwrap();
    std::fs::write(ws.merged("123456789"), b"stale").unwrap();

    run_batch(&ws.config(), None, &mut NoProgress).unwrap();

    assert_ne!(std::fs::read(ws.merged("123456789")).unwrap(), b"stale");
}

#[test]
fn test_missing_input_root() {
    let ws = Workspace::new();
    let mut config = ws.config();
    config.inputs = vec![PathBuf::from("/nonexistent/scans")];

    let err = run_batch(&config, None, &mut NoProgress).unwrap_err();
    assert!(matches!(err, CaseMergeError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(!ws.output.exists());
}

#[test]
fn test_input_root_is_a_file() {
    let ws = Workspace::new();
    let file = ws.input_file("123456789 Terms.pdf");
    write_pdf(&file, &[(612, 792)]);

    let mut config = ws.config();
    config.inputs = vec![file];

    let err = run_batch(&config, None, &mut NoProgress).unwrap_err();
    assert!(matches!(err, CaseMergeError::NotADirectory { .. }));
}

#[test]
fn test_output_equal_to_input_is_rejected() {
    let ws = Workspace::new();
    let mut config = ws.config();
    config.output = ws.input.clone();

    let err = run_batch(&config, None, &mut NoProgress).unwrap_err();
    assert!(matches!(err, CaseMergeError::InvalidConfig { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_invalid_statement_date_excludes_file() {
    let ws = Workspace::new();
    write_pdf(&ws.input_file("123456789 Terms.pdf"), &[(600, 800)]);
    write_pdf(
        &ws.input_file("123456789 - Pay History - 1_1_2020 - Stm. Date - 13_45_2020 - 123456789.pdf"),
        &[(500, 700)],
    );

    let summary = run_batch(&ws.config(), None, &mut NoProgress).unwrap();

    assert_eq!(summary.merged, 1);
    assert_eq!(summary.documents, 1);
    assert_eq!(summary.scan.excluded, 1);
}

#[test]
fn test_empty_input_writes_header_only() {
    let ws = Workspace::new();

    let summary = run_batch(&ws.config(), None, &mut NoProgress).unwrap();

    assert_eq!(summary.cases(), 0);
    assert_eq!(ws.results_sheet(), "Case Number,Merged\n");
}
