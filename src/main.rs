//! casemerge - Merge scanned case documents into one PDF per case.
//!
//! Command-line front end: parses arguments, runs the batch on a blocking
//! worker and draws its progress.

use clap::Parser;
use std::process;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use casemerge::cli::Cli;
use casemerge::config::Config;
use casemerge::error::{CaseMergeError, Result};
use casemerge::output::{
    OutputFormatter, ProgressBar, display_case_results, display_plan, display_run_summary,
};
use casemerge::pipeline::{self, RunSummary};
use casemerge::resolve::{FileNumberLookup, JsonFileLookup};
use casemerge::utils::open_folder;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(err) = run(cli).await {
        OutputFormatter::default().error(&format!("Error: {err}"));
        process::exit(err.exit_code());
    }
}

/// Install the log subscriber. `RUST_LOG` wins over the flags.
fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<()> {
    cli.validate()?;
    let config = cli.to_config()?;

    let formatter = OutputFormatter::from_config(&config);

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", casemerge::NAME, casemerge::VERSION));
        formatter.blank_line();
    }

    formatter.info(&format!(
        "Scanning {} input folder(s)...",
        config.inputs.len()
    ));

    if config.dry_run {
        let plans = pipeline::plan(&config)?;
        display_plan(&formatter, &plans);
        formatter.blank_line();
        formatter.success("Dry run completed successfully");
        formatter.info(&format!("  Output would go to: {}", config.output.display()));
        formatter.info("  Run without --dry-run to write the merged files");
        return Ok(());
    }

    let summary = merge_in_background(config.clone(), formatter.should_print()).await?;

    if formatter.should_print() {
        formatter.blank_line();
        display_case_results(&formatter, &summary.results);
    }
    display_run_summary(&formatter, &summary);

    if config.open_output && summary.merged > 0 {
        open_folder(&config.output);
    }

    Ok(())
}

/// Run the batch on a blocking worker, drawing progress as it arrives.
async fn merge_in_background(config: Config, show_progress: bool) -> Result<RunSummary> {
    let (tx, mut rx) = mpsc::unbounded_channel::<f64>();

    let worker = tokio::task::spawn_blocking(move || {
        let lookup = config
            .lookup
            .as_ref()
            .map(|path| JsonFileLookup::new(path.clone()));
        let mut progress = move |fraction: f64| {
            // Receiver is gone only during shutdown.
            let _ = tx.send(fraction);
        };

        pipeline::run_batch(
            &config,
            lookup.as_ref().map(|l| l as &dyn FileNumberLookup),
            &mut progress,
        )
    });

    let mut bar = if show_progress {
        ProgressBar::new(100)
    } else {
        ProgressBar::disabled()
    };
    bar.set_message("Merging");

    let mut updates = 0usize;
    while let Some(fraction) = rx.recv().await {
        bar.update_fraction(fraction);
        updates += 1;
    }
    if updates > 0 {
        bar.finish();
    }

    worker
        .await
        .map_err(|e| CaseMergeError::other(format!("Merge worker failed: {e}")))?
}
