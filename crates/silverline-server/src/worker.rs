//! Drains the analysis task queue.

use std::sync::Arc;

use chrono::Utc;
use silverline_sentiment::{AnalysisTask, Analyzer, TaskReceiver};
use tokio::task::JoinHandle;

/// Spawn the loop that runs every queued task on its own tokio task.
///
/// Failures are logged and dropped. The loop ends once every
/// [`TaskQueue`](silverline_sentiment::TaskQueue) handle is gone.
pub fn spawn_worker(analyzer: Arc<Analyzer>, mut rx: TaskReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(task) = rx.recv().await {
            let analyzer = Arc::clone(&analyzer);
            tokio::spawn(async move {
                run_task(&analyzer, task).await;
            });
        }
        tracing::info!("analysis worker: queue closed");
    })
}

async fn run_task(analyzer: &Analyzer, task: AnalysisTask) {
    let description = describe(&task);
    match analyzer.run_task(task, Utc::now()).await {
        Ok(record) => tracing::info!(
            task = %description,
            id = %record.id,
            approval_rating = record.approval_rating,
            "analysis worker: task complete"
        ),
        Err(e) => tracing::warn!(task = %description, error = %e, "analysis worker: task failed"),
    }
}

fn describe(task: &AnalysisTask) -> String {
    match task {
        AnalysisTask::Today { keyword, subreddit } => format!("today {keyword}/{subreddit}"),
        AnalysisTask::Backfill {
            keyword,
            subreddit,
            days_ago,
        } => format!("backfill {keyword}/{subreddit} -{days_ago}d"),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use silverline_sentiment::fakes::{FakeClassifier, FakeFetcher, InMemoryStore};
    use silverline_sentiment::{task_queue, AnalysisSettings, RecordStore};

    use super::*;

    #[test]
    fn describe_names_kind_and_pair() {
        let task = AnalysisTask::Backfill {
            keyword: "rust".to_string(),
            subreddit: "all".to_string(),
            days_ago: 3,
        };
        assert_eq!(describe(&task), "backfill rust/all -3d");
    }

    #[tokio::test]
    async fn worker_runs_fan_out_to_completion() {
        let store = Arc::new(InMemoryStore::new());
        let (queue, rx) = task_queue();
        let analyzer = Arc::new(Analyzer::new(
            Arc::new(FakeFetcher::with_texts(&["good"])),
            Arc::new(FakeClassifier::new()),
            store.clone(),
            queue,
            AnalysisSettings::default(),
        ));
        let _worker = spawn_worker(Arc::clone(&analyzer), rx);

        analyzer
            .analyze_today("rust", "all", Utc::now())
            .await
            .expect("analyze");

        // Today plus eight backfilled days.
        for _ in 0..100 {
            if store.record_count() == 9 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(store.record_count(), 9);
        assert_eq!(
            store.list_for_pair("rust", "all").await.expect("list").len(),
            9
        );
    }
}
