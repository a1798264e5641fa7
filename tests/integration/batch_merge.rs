//! Integration tests for full batch runs.

use casemerge::order::OrderingPolicy;
use casemerge::output::NoProgress;
use casemerge::pipeline::run_batch;
use std::collections::BTreeSet;

use crate::common::{Workspace, file_names, page_rotations, page_sizes, write_image, write_pdf};

fn restrict(ids: &[&str]) -> Option<BTreeSet<String>> {
    Some(ids.iter().map(|s| s.to_string()).collect())
}

#[test]
fn test_terms_merged_before_pay_history() {
    let ws = Workspace::new();
    write_pdf(
        &ws.input_file("123456789 - Pay History - 1_1_2020 - Stm. Date - 5_1_2020 - 123456789.pdf"),
        &[(500, 700)],
    );
    write_pdf(
        &ws.input_file("123456789 - Terms - 1_1_2020 - Stm. Date - 6_1_2020 - 123456789.pdf"),
        &[(600, 800)],
    );

    let mut config = ws.config();
    config.restrict_to = restrict(&["123456789"]);

    let summary = run_batch(&config, None, &mut NoProgress).unwrap();

    assert_eq!(summary.merged, 1);
    assert_eq!(page_sizes(&ws.merged("123456789")), vec![(600, 800), (500, 700)]);
    assert_eq!(ws.results_sheet(), "Case Number,Merged\n123456789,Yes\n");
}

#[test]
fn test_statement_dates_newest_first_within_tier() {
    let ws = Workspace::new();
    write_pdf(
        &ws.input_file("123456789 - Bill Statement - 1_1_2020 - Stm. Date - 1_15_2020 - 123456789.pdf"),
        &[(401, 700)],
    );
    write_pdf(
        &ws.input_file("123456789 - Bill Statement - 3_1_2020 - Stm. Date - 3_15_2020 - 123456789.pdf"),
        &[(403, 700)],
    );
    write_pdf(&ws.input_file("123456789 Bill Statement.pdf"), &[(400, 700)]);
    write_pdf(&ws.input_file("123456789 misc.pdf"), &[(300, 700)]);
    write_pdf(&ws.input_file("123456789 Terms.pdf"), &[(200, 700)]);

    run_batch(&ws.config(), None, &mut NoProgress).unwrap();

    assert_eq!(
        page_sizes(&ws.merged("123456789")),
        vec![(200, 700), (403, 700), (401, 700), (400, 700), (300, 700)]
    );
}

#[test]
fn test_keyword_grouped_keeps_path_order_within_tier() {
    let ws = Workspace::new();
    write_pdf(
        &ws.input_file("a/123456789 - Bill Statement - 1_1_2020 - Stm. Date - 1_15_2020 - 123456789.pdf"),
        &[(401, 700)],
    );
    write_pdf(
        &ws.input_file("b/123456789 - Bill Statement - 3_1_2020 - Stm. Date - 3_15_2020 - 123456789.pdf"),
        &[(403, 700)],
    );
    write_pdf(&ws.input_file("c/123456789 Terms.pdf"), &[(200, 700)]);

    let mut config = ws.config();
    config.ordering = OrderingPolicy::KeywordGrouped;
    run_batch(&config, None, &mut NoProgress).unwrap();

    assert_eq!(
        page_sizes(&ws.merged("123456789")),
        vec![(200, 700), (401, 700), (403, 700)]
    );
}

#[test]
fn test_restricted_case_without_files_is_absent() {
    let ws = Workspace::new();
    write_pdf(&ws.input_file("111111111 Terms.pdf"), &[(612, 792)]);
    write_pdf(&ws.input_file("222222222 Terms.pdf"), &[(612, 792)]);

    let mut config = ws.config();
    config.restrict_to = restrict(&["111111111", "999999999"]);

    let summary = run_batch(&config, None, &mut NoProgress).unwrap();

    assert_eq!(summary.cases(), 1);
    assert!(!ws.merged("999999999").exists());
    assert!(!ws.merged("222222222").exists());
    assert_eq!(ws.results_sheet(), "Case Number,Merged\n111111111,Yes\n");
}

#[test]
fn test_landscape_pages_are_rotated_to_portrait() {
    let ws = Workspace::new();
    write_pdf(
        &ws.input_file("123456789 Pay History.pdf"),
        &[(612, 792), (792, 612)],
    );

    run_batch(&ws.config(), None, &mut NoProgress).unwrap();

    let merged = ws.merged("123456789");
    assert_eq!(page_sizes(&merged), vec![(612, 792), (792, 612)]);
    assert_eq!(page_rotations(&merged), vec![0, 90]);
}

#[test]
fn test_scans_are_converted_and_merged() {
    let ws = Workspace::new();
    write_pdf(&ws.input_file("123456789 Terms.pdf"), &[(612, 792)]);
    write_image(&ws.input_file("123456789 Sales Memo.tif"), 40, 60);
    write_image(&ws.input_file("123456789 receipt.jpg"), 60, 40);

    let summary = run_batch(&ws.config(), None, &mut NoProgress).unwrap();

    assert_eq!(summary.scan.converted, 2);
    assert_eq!(summary.total_pages, 3);
    assert!(ws.input.join("123456789 Sales Memo_tif_converted.pdf").exists());
    assert!(ws.input.join("123456789 receipt_jpg_converted.pdf").exists());
    assert!(ws.input.join("123456789 Sales Memo.tif").exists());

    let sizes = page_sizes(&ws.merged("123456789"));
    assert_eq!(sizes.len(), 3);
    assert_eq!(sizes[0], (612, 792));
    assert!(sizes.iter().all(|&(w, h)| w <= h));
}

#[test]
fn test_rerun_does_not_duplicate_converted_pages() {
    let ws = Workspace::new();
    write_image(&ws.input_file("123456789 scan.tif"), 40, 60);

    let first = run_batch(&ws.config(), None, &mut NoProgress).unwrap();
    let second = run_batch(&ws.config(), None, &mut NoProgress).unwrap();

    assert_eq!(first.total_pages, 1);
    assert_eq!(second.total_pages, 1);
    assert_eq!(page_sizes(&ws.merged("123456789")).len(), 1);
}

#[test]
fn test_same_stem_scans_both_merge() {
    let ws = Workspace::new();
    write_image(&ws.input_file("123456789 scan.jpg"), 40, 60);
    write_image(&ws.input_file("123456789 scan.tif"), 50, 90);

    let first = run_batch(&ws.config(), None, &mut NoProgress).unwrap();
    assert_eq!(first.scan.converted, 2);
    assert_eq!(page_sizes(&ws.merged("123456789")), vec![(40, 60), (50, 90)]);

    let second = run_batch(&ws.config(), None, &mut NoProgress).unwrap();
    assert_eq!(second.total_pages, 2);
    assert_eq!(page_sizes(&ws.merged("123456789")), vec![(40, 60), (50, 90)]);
}

#[test]
fn test_case_spread_over_two_roots_is_one_case() {
    let ws = Workspace::new();
    let second_root = ws.root.join("more_scans");
    std::fs::create_dir_all(&second_root).unwrap();

    write_pdf(&ws.input_file("123456789 Pay History.pdf"), &[(500, 700)]);
    write_pdf(&second_root.join("123456789 Terms.pdf"), &[(600, 800)]);

    let mut config = ws.config();
    config.inputs.push(second_root);

    let summary = run_batch(&config, None, &mut NoProgress).unwrap();

    assert_eq!(summary.cases(), 1);
    assert_eq!(page_sizes(&ws.merged("123456789")), vec![(600, 800), (500, 700)]);
}

#[test]
fn test_skipped_and_unnumbered_files_are_ignored() {
    let ws = Workspace::new();
    write_pdf(&ws.input_file("123456789 Terms.pdf"), &[(612, 792)]);
    std::fs::write(ws.input_file("123456789 email.eml"), b"From: x").unwrap();
    std::fs::write(ws.input_file("123456789 notes.txt"), b"notes").unwrap();
    write_pdf(&ws.input_file("no case here.pdf"), &[(612, 792)]);

    let summary = run_batch(&ws.config(), None, &mut NoProgress).unwrap();

    assert_eq!(summary.cases(), 1);
    assert_eq!(summary.documents, 1);
    assert_eq!(summary.scan.excluded, 3);
}

#[test]
fn test_output_inside_input_is_not_rescanned() {
    let ws = Workspace::new();
    write_pdf(&ws.input_file("123456789 Terms.pdf"), &[(612, 792)]);

    let mut config = ws.config();
    config.output = ws.input.join("merged");

    run_batch(&config, None, &mut NoProgress).unwrap();
    let second = run_batch(&config, None, &mut NoProgress).unwrap();

    assert_eq!(second.total_pages, 1);
    assert_eq!(
        file_names(&config.output),
        vec!["123456789.pdf", "merge_results.csv"]
    );
}

#[test]
fn test_progress_reaches_one_and_never_decreases() {
    let ws = Workspace::new();
    write_pdf(&ws.input_file("111111111 Terms.pdf"), &[(612, 792)]);
    write_pdf(&ws.input_file("111111111 Pay History.pdf"), &[(612, 792)]);
    write_pdf(&ws.input_file("222222222 Terms.pdf"), &[(612, 792)]);

    let mut fractions = Vec::new();
    let mut sink = |f: f64| fractions.push(f);
    run_batch(&ws.config(), None, &mut sink).unwrap();

    assert_eq!(fractions.len(), 3);
    assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(fractions.last(), Some(&1.0));
}
