//! featkeep: Feature Count Search CLI Tool
//!
//! A command-line tool for deciding how many importance-ranked features a
//! classifier needs to stay above a confidence-adjusted score threshold.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;

use featkeep::cli::{confirm_refine, Cli, SearchMode};
use featkeep::pipeline::{
    extract_labels, get_column_names, load_dataset_with_progress, AcceptanceThreshold,
    CandidateScore, DataSplit, FeatureCountSearch, ImportanceFile, ImportanceKind,
    LogisticEvaluator, SearchConfig, SearchOutcome, TargetMapping,
};
use featkeep::report::SearchSummary;
use featkeep::utils::{
    print_banner, print_completion, print_config, print_count, print_info, print_step_header,
    print_step_time, print_success, print_warning, ConfigCard,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mode: SearchMode = cli.mode.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let kind: ImportanceKind = cli.importance_type.parse()?;
    let steps = cli.steps as usize;
    let span = cli.span as usize;

    if mode.needs_start_count() && cli.start_count.is_none() {
        anyhow::bail!("--start-count is required for {} mode", mode);
    }

    let threshold = AcceptanceThreshold::new(cli.auc_limit, cli.ci)?;

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&ConfigCard {
        input: &cli.input,
        target: &cli.target,
        importance: &cli.importance,
        importance_type: kind.as_str(),
        mode: &mode.to_string(),
        auc_limit: cli.auc_limit,
        ci: cli.ci,
        threshold: threshold.value(),
    });

    // Step 1: Load dataset and importances
    print_step_header(1, "Load Data");

    let step_start = Instant::now();
    let column_names = get_column_names(&cli.input, cli.infer_schema_length)?;
    if !column_names.contains(&cli.target) {
        anyhow::bail!(
            "Target column '{}' not found in dataset. Available columns: {:?}",
            cli.target,
            column_names
        );
    }

    let (df, rows, cols, memory_mb) = load_dataset_with_progress(&cli.input, cli.infer_schema_length)?;
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);

    let mapping = match (&cli.event_value, &cli.non_event_value) {
        (Some(event), Some(non_event)) => Some(TargetMapping::new(event.clone(), non_event.clone())),
        _ => None,
    };
    let labels = extract_labels(&df, &cli.target, mapping.as_ref())?;

    let mut features = df.drop(&cli.target)?;
    if !cli.drop_columns.is_empty() {
        features = features.drop_many(cli.drop_columns.iter().map(|s| s.as_str()));
        print_info(&format!("Dropped {} column(s) before search", cli.drop_columns.len()));
    }

    let importances = ImportanceFile::load(&cli.importance)?;
    print_success("Importances loaded");
    print_step_time(step_start.elapsed());

    // Step 2: Partition
    print_step_header(2, "Train/Test Partition");

    let step_start = Instant::now();
    let split = DataSplit::partition(&features, &labels, cli.test_size, cli.seed)?;
    print_success(&format!(
        "{} train rows, {} test rows ({:.0}% held out)",
        split.train().height(),
        split.test().height(),
        cli.test_size * 100.0
    ));
    print_step_time(step_start.elapsed());

    // Step 3: Rank features
    print_step_header(3, "Rank Features");

    let evaluator = LogisticEvaluator::default();
    let search = FeatureCountSearch::new(&importances, &evaluator, &split).with_config(SearchConfig {
        workers: cli.workers,
        seed: cli.seed,
        show_progress: true,
    });

    let ranking = search.ranking(kind)?;
    print_count(
        "ranked feature(s)",
        ranking.len(),
        Some(&format!("(by {})", ranking.kind())),
    );
    for feature in ranking.features().iter().take(5) {
        println!(
            "        {} {} {}",
            style(format!("#{}", feature.rank)).dim(),
            feature.name,
            style(format!("{:.4}", feature.importance)).dim()
        );
    }

    // Step 4: Search
    print_step_header(4, "Feature Count Search");

    let step_start = Instant::now();
    match mode {
        SearchMode::Broad => {
            let outcome = search.broad_search(cli.auc_limit, kind, cli.ci, steps)?;
            report_exploratory(&outcome);
        }
        SearchMode::Precise => {
            let start = cli.start_count.unwrap_or(ranking.len());
            let outcome = search.precise_search(start, cli.auc_limit, kind, cli.ci, span)?;
            report_exploratory(&outcome);
        }
        SearchMode::AutoBroad => {
            let outcome = search.automated_broad_search(cli.auc_limit, kind, cli.ci, steps)?;
            report_automated(&outcome);
        }
        SearchMode::AutoPrecise => {
            let start = cli.start_count.unwrap_or(ranking.len());
            let outcome =
                search.automated_precise_search(start, cli.auc_limit, kind, cli.ci, span)?;
            report_automated(&outcome);
        }
        SearchMode::TwoPhase => {
            let coarse = search.automated_broad_search(cli.auc_limit, kind, cli.ci, steps)?;
            report_automated(&coarse);

            if cli.no_confirm || confirm_refine(coarse.value, span)? {
                let fine = search.automated_precise_search(
                    coarse.value,
                    cli.auc_limit,
                    kind,
                    cli.ci,
                    span,
                )?;
                report_automated(&fine);
            } else {
                print_info(&format!("Keeping coarse decision of {} feature(s)", coarse.value));
            }
        }
    }
    print_step_time(step_start.elapsed());

    print_completion();

    Ok(())
}

fn report_warnings<T>(outcome: &SearchOutcome<T>) {
    for warning in &outcome.warnings {
        print_warning(&warning.to_string());
    }
}

fn report_exploratory(outcome: &SearchOutcome<Vec<CandidateScore>>) {
    report_warnings(outcome);
    SearchSummary::from_exploratory(outcome).display();
}

fn report_automated(outcome: &SearchOutcome<usize>) {
    report_warnings(outcome);
    SearchSummary::from_automated(outcome).display();
}
