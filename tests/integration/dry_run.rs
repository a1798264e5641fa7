//! Integration tests for dry runs and the CLI-facing flow.

use casemerge::cli::Cli;
use casemerge::pipeline::{self, plan};
use clap::Parser;
use tokio::sync::mpsc;

use crate::common::{Workspace, file_names, write_image, write_pdf};

#[test]
fn test_plan_lists_merge_order_without_writing() {
    let ws = Workspace::new();
    write_pdf(
        &ws.input_file("123456789 - Pay History - 1_1_2020 - Stm. Date - 5_1_2020 - 123456789.pdf"),
        &[(612, 792)],
    );
    write_pdf(
        &ws.input_file("123456789 - Terms - 1_1_2020 - Stm. Date - 6_1_2020 - 123456789.pdf"),
        &[(612, 792)],
    );
    write_image(&ws.input_file("987654321 scan.tiff"), 10, 10);

    let plans = plan(&ws.config()).unwrap();

    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0].case_id, "123456789");
    assert!(plans[0].documents[0].file_name.contains("Terms"));
    assert!(plans[0].documents[1].file_name.contains("Pay History"));
    assert_eq!(plans[1].output_path, ws.merged("987654321"));
    assert!(plans[1].documents[0].needs_conversion);

    assert!(!ws.output.exists());
    assert_eq!(
        file_names(&ws.input),
        vec![
            "123456789 - Pay History - 1_1_2020 - Stm. Date - 5_1_2020 - 123456789.pdf",
            "123456789 - Terms - 1_1_2020 - Stm. Date - 6_1_2020 - 123456789.pdf",
            "987654321 scan.tiff",
        ]
    );
}

#[test]
fn test_cli_dry_run_config() {
    let ws = Workspace::new();
    write_pdf(&ws.input_file("111111111 Terms.pdf"), &[(612, 792)]);
    write_pdf(&ws.input_file("222222222 Terms.pdf"), &[(612, 792)]);

    let input = ws.input.display().to_string();
    let output = ws.output.display().to_string();
    let cli = Cli::try_parse_from([
        "casemerge",
        input.as_str(),
        "-o",
        output.as_str(),
        "--cases",
        "222222222",
        "--dry-run",
        "--quiet",
    ])
    .unwrap();
    let config = cli.to_config().unwrap();

    assert!(config.dry_run);
    assert!(config.should_print());

    let plans = plan(&config).unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].case_id, "222222222");
}

#[tokio::test]
async fn test_batch_on_blocking_worker_streams_progress() {
    let ws = Workspace::new();
    write_pdf(&ws.input_file("111111111 Terms.pdf"), &[(612, 792)]);
    write_pdf(&ws.input_file("111111111 Pay History.pdf"), &[(612, 792)]);
    write_pdf(&ws.input_file("222222222 Terms.pdf"), &[(612, 792)]);

    let config = ws.config();
    let (tx, mut rx) = mpsc::unbounded_channel::<f64>();

    let worker = tokio::task::spawn_blocking(move || {
        let mut progress = move |fraction: f64| {
            let _ = tx.send(fraction);
        };
        pipeline::run_batch(&config, None, &mut progress)
    });

    let mut fractions = Vec::new();
    while let Some(fraction) = rx.recv().await {
        fractions.push(fraction);
    }

    let summary = worker.await.unwrap().unwrap();
    assert_eq!(summary.merged, 2);
    assert_eq!(fractions.len(), 3);
    assert_eq!(fractions.last(), Some(&1.0));
    assert!(ws.merged("111111111").exists());
}
