//! Typed, in-process queue for background analysis work.
//!
//! Delivery is best-effort: enqueueing never blocks and never waits for the
//! task to run, nothing is retried, and tasks still queued when the process
//! exits are lost.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// A unit of background analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisTask {
    /// Compute today's record unless it already exists.
    Today { keyword: String, subreddit: String },
    /// Recompute and overwrite the record `days_ago` days back.
    Backfill {
        keyword: String,
        subreddit: String,
        days_ago: u32,
    },
}

#[derive(Debug, Error)]
#[error("analysis task queue is closed")]
pub struct QueueClosed;

/// Producer half. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<AnalysisTask>,
}

/// Consumer half, owned by the worker.
#[derive(Debug)]
pub struct TaskReceiver {
    rx: mpsc::UnboundedReceiver<AnalysisTask>,
}

#[must_use]
pub fn task_queue() -> (TaskQueue, TaskReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TaskQueue { tx }, TaskReceiver { rx })
}

impl TaskQueue {
    /// Hand `task` to the worker without waiting for it to run.
    ///
    /// # Errors
    ///
    /// Returns [`QueueClosed`] if the receiver has been dropped.
    pub fn enqueue(&self, task: AnalysisTask) -> Result<(), QueueClosed> {
        self.tx.send(task).map_err(|_| QueueClosed)
    }
}

impl TaskReceiver {
    /// Wait for the next task; `None` once every producer is gone.
    pub async fn recv(&mut self) -> Option<AnalysisTask> {
        self.rx.recv().await
    }

    /// Take a task if one is ready, without waiting.
    pub fn try_recv(&mut self) -> Option<AnalysisTask> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tasks_arrive_in_enqueue_order() {
        let (queue, mut rx) = task_queue();
        for days_ago in 1..=3 {
            queue
                .enqueue(AnalysisTask::Backfill {
                    keyword: "k".to_string(),
                    subreddit: "all".to_string(),
                    days_ago,
                })
                .expect("enqueue");
        }
        drop(queue);

        let mut seen = Vec::new();
        while let Some(AnalysisTask::Backfill { days_ago, .. }) = rx.recv().await {
            seen.push(days_ago);
        }
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn enqueue_fails_once_receiver_is_dropped() {
        let (queue, rx) = task_queue();
        drop(rx);
        let result = queue.enqueue(AnalysisTask::Today {
            keyword: "k".to_string(),
            subreddit: "all".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn task_payload_is_tagged_json() {
        let task = AnalysisTask::Backfill {
            keyword: "rust".to_string(),
            subreddit: "all".to_string(),
            days_ago: 4,
        };
        let value = serde_json::to_value(&task).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"kind": "backfill", "keyword": "rust", "subreddit": "all", "days_ago": 4})
        );
    }
}
