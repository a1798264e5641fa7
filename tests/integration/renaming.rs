//! Integration tests for renaming merged files to filing numbers.

use casemerge::output::NoProgress;
use casemerge::pipeline::run_batch;
use casemerge::resolve::{InMemoryLookup, JsonFileLookup};

use crate::common::{Workspace, file_names, write_garbage, write_pdf};

#[test]
fn test_merged_case_renamed_from_json_lookup() {
    let ws = Workspace::new();
    write_pdf(&ws.input_file("111111111 Terms.pdf"), &[(612, 792)]);
    write_pdf(&ws.input_file("222222222 Terms.pdf"), &[(612, 792)]);
    write_pdf(&ws.input_file("333333333 Terms.pdf"), &[(612, 792)]);

    let lookup_path = ws.root.join("filing_numbers.json");
    std::fs::write(
        &lookup_path,
        r#"{ "111111111": "F-100", "222222222": 4711, "444444444": "F-400" }"#,
    )
    .unwrap();
    let lookup = JsonFileLookup::new(&lookup_path);

    let summary = run_batch(&ws.config(), Some(&lookup), &mut NoProgress).unwrap();

    assert_eq!(summary.renamed, 2);
    assert_eq!(
        file_names(&ws.output),
        vec![
            "333333333.pdf",
            "4711-doc seq.pdf",
            "F-100-doc seq.pdf",
            "merge_results.csv",
        ]
    );
    assert_eq!(
        ws.results_sheet(),
        "Case Number,Merged\n111111111,Yes\n222222222,Yes\n333333333,Yes\n"
    );
}

#[test]
fn test_existing_name_gets_numbered_suffix() {
    let ws = Workspace::new();
    write_pdf(&ws.input_file("123456789 Terms.pdf"), &[(612, 792)]);

    std::fs::create_dir_all(&ws.output).unwrap();
    let existing = ws.output.join("F-1-doc seq.pdf");
    std::fs::write(&existing, b"keep me").unwrap();

    let lookup = InMemoryLookup::new([("123456789", "F-1")]);
    let summary = run_batch(&ws.config(), Some(&lookup), &mut NoProgress).unwrap();

    let renamed = ws.output.join("F-1-doc seq_1.pdf");
    assert_eq!(summary.results[0].final_path(), Some(renamed.as_path()));
    assert!(renamed.exists());
    assert!(!ws.merged("123456789").exists());
    assert_eq!(std::fs::read(&existing).unwrap(), b"keep me");
}

#[test]
fn test_rejected_case_is_not_renamed() {
    let ws = Workspace::new();
    write_garbage(&ws.input_file("123456789 Terms.pdf"));

    let lookup = InMemoryLookup::new([("123456789", "F-1")]);
    let summary = run_batch(&ws.config(), Some(&lookup), &mut NoProgress).unwrap();

    assert_eq!(summary.renamed, 0);
    assert_eq!(file_names(&ws.output), vec!["merge_results.csv"]);
}

#[test]
fn test_unreadable_lookup_keeps_case_names() {
    let ws = Workspace::new();
    write_pdf(&ws.input_file("123456789 Terms.pdf"), &[(612, 792)]);

    let lookup_path = ws.root.join("filing_numbers.json");
    std::fs::write(&lookup_path, "not json").unwrap();
    let lookup = JsonFileLookup::new(&lookup_path);

    let summary = run_batch(&ws.config(), Some(&lookup), &mut NoProgress).unwrap();

    assert_eq!(summary.merged, 1);
    assert_eq!(summary.renamed, 0);
    assert!(ws.merged("123456789").exists());
}

#[test]
fn test_missing_lookup_file_keeps_case_names() {
    let ws = Workspace::new();
    write_pdf(&ws.input_file("123456789 Terms.pdf"), &[(612, 792)]);

    let lookup = JsonFileLookup::new(ws.root.join("absent.json"));
    let summary = run_batch(&ws.config(), Some(&lookup), &mut NoProgress).unwrap();

    assert_eq!(summary.renamed, 0);
    assert!(ws.merged("123456789").exists());
}
