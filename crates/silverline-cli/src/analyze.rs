//! Analysis command handlers for the CLI.
//!
//! There is no background worker here: tasks the analyzer queues are drained
//! inline before the command returns, or dropped when the caller did not ask
//! for them.

use chrono::Utc;
use silverline_core::ApprovalRecord;
use silverline_sentiment::{AnalysisTask, Analyzer, TaskReceiver};

pub(crate) async fn run_analyze(
    analyzer: &Analyzer,
    rx: &mut TaskReceiver,
    keyword: &str,
    subreddit: &str,
    backfill: bool,
) -> anyhow::Result<()> {
    let outcome = analyzer.analyze_today(keyword, subreddit, Utc::now()).await?;
    if !outcome.is_computed() {
        println!("record already computed today");
    }
    print_json(outcome.record())?;

    let summary = drain_queue(analyzer, rx, backfill).await;
    if backfill {
        println!(
            "backfill: {} succeeded, {} failed",
            summary.succeeded, summary.failed
        );
    }
    Ok(())
}

pub(crate) async fn run_backfill(
    analyzer: &Analyzer,
    keyword: &str,
    subreddit: &str,
    days_ago: u32,
) -> anyhow::Result<()> {
    let record = analyzer
        .analyze_backfill_day(keyword, subreddit, days_ago, Utc::now())
        .await?;
    print_json(&record)
}

pub(crate) async fn run_results(
    analyzer: &Analyzer,
    keyword: &str,
    subreddit: &str,
) -> anyhow::Result<()> {
    let records = analyzer.get_results(keyword, subreddit).await?;
    if records.is_empty() {
        println!("no records for {keyword}");
        return Ok(());
    }
    print_history(&records);
    Ok(())
}

pub(crate) async fn run_subscribed_today(analyzer: &Analyzer) -> anyhow::Result<()> {
    let records = analyzer.get_subscribed(Utc::now()).await?;
    if records.is_empty() {
        println!("no subscribed records for today");
        return Ok(());
    }
    print_history(&records);
    Ok(())
}

pub(crate) async fn run_subscribed(
    analyzer: &Analyzer,
    rx: &mut TaskReceiver,
    backfill: bool,
) -> anyhow::Result<()> {
    let queued = analyzer.invoke_subscribed_analysis().await?;
    let summary = drain_queue(analyzer, rx, backfill).await;
    println!(
        "subscribed analysis: {queued} queued, {} succeeded, {} failed, {} skipped",
        summary.succeeded, summary.failed, summary.skipped
    );
    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct DrainSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Run queued tasks one at a time until the queue is empty, including tasks
/// queued by the tasks themselves. Backfill tasks are skipped unless
/// `include_backfill` is set.
pub(crate) async fn drain_queue(
    analyzer: &Analyzer,
    rx: &mut TaskReceiver,
    include_backfill: bool,
) -> DrainSummary {
    let mut summary = DrainSummary::default();

    while let Some(task) = rx.try_recv() {
        if matches!(task, AnalysisTask::Backfill { .. }) && !include_backfill {
            summary.skipped += 1;
            continue;
        }
        match analyzer.run_task(task, Utc::now()).await {
            Ok(record) => {
                tracing::info!(id = %record.id, "task complete");
                summary.succeeded += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "task failed");
                summary.failed += 1;
            }
        }
    }

    summary
}

fn print_json(record: &ApprovalRecord) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

fn print_history(records: &[ApprovalRecord]) {
    println!(
        "{:<10} {:<20} {:<20} {:>8} {:>5} {:>5} {:>5} {:>5}",
        "date", "keyword", "subreddit", "rating", "pos", "neg", "neu", "mix"
    );
    for record in records {
        let counts = &record.sentiments_breakdown;
        println!(
            "{:<10} {:<20} {:<20} {:>8.2} {:>5} {:>5} {:>5} {:>5}",
            record.date,
            record.keyword,
            record.subreddit,
            record.approval_rating,
            counts.positive,
            counts.negative,
            counts.neutral,
            counts.mixed
        );
    }
}
