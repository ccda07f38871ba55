// Debounced saves: one background task per document key.
//
// Mutations hand the latest document to the scheduler without waiting. The task
// waits for a quiet window after the last hand-off and then saves only the
// newest value, so a burst of changes costs one write.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use super::StateStore;

pub struct SaveScheduler {
    key: String,
    tx: watch::Sender<Option<Value>>,
    task: JoinHandle<()>,
}

impl SaveScheduler {
    /// Start the save task for `key`. Must be called inside a tokio runtime.
    pub fn spawn(store: Arc<dyn StateStore>, key: &str, window: Duration) -> Self {
        let (tx, rx) = watch::channel(None);
        let task = tokio::spawn(run(store, key.to_string(), window, rx));
        Self {
            key: key.to_string(),
            tx,
            task,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Queue `doc` as the next value to save, replacing anything still pending
    /// and restarting the quiet window. Never blocks.
    pub fn schedule<T: Serialize>(&self, doc: &T) {
        match serde_json::to_value(doc) {
            Ok(value) => {
                self.tx.send_replace(Some(value));
            }
            Err(e) => warn!("Failed to encode '{}' for saving: {e}", self.key),
        }
    }

    /// Stop the task, saving any pending value first.
    pub async fn shutdown(self) {
        let SaveScheduler { key, tx, task } = self;
        drop(tx);
        if let Err(e) = task.await {
            warn!("Save task for '{key}' ended abnormally: {e}");
        }
    }
}

async fn run(
    store: Arc<dyn StateStore>,
    key: String,
    window: Duration,
    mut rx: watch::Receiver<Option<Value>>,
) {
    loop {
        if rx.changed().await.is_err() {
            return;
        }

        let mut deadline = Instant::now() + window;
        let closed = loop {
            tokio::select! {
                changed = rx.changed() => match changed {
                    Ok(()) => deadline = Instant::now() + window,
                    Err(_) => break true,
                },
                _ = sleep_until(deadline) => break false,
            }
        };

        let pending = rx.borrow_and_update().clone();
        if let Some(value) = pending {
            match store.save(&key, &value).await {
                Ok(()) => debug!("Saved '{key}'"),
                Err(e) => warn!("Failed to save '{key}', keeping in-memory state: {e:#}"),
            }
        }

        if closed {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::testing::RecordingStore;
    use serde_json::json;

    const WINDOW: Duration = Duration::from_millis(500);

    fn scheduler(store: &Arc<RecordingStore>) -> SaveScheduler {
        SaveScheduler::spawn(store.clone(), "priority_list", WINDOW)
    }

    #[tokio::test]
    async fn burst_coalesces_into_one_save_of_final_state() {
        tokio::time::pause();
        let store = Arc::new(RecordingStore::default());
        let saver = scheduler(&store);

        // Five changes within 100ms.
        for n in 0..5 {
            saver.schedule(&json!({ "n": n }));
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(store.save_count(), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(store.save_count(), 1);
        assert_eq!(
            store.last_save(),
            Some(("priority_list".to_string(), json!({ "n": 4 })))
        );

        saver.shutdown().await;
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn separate_bursts_save_separately() {
        tokio::time::pause();
        let store = Arc::new(RecordingStore::default());
        let saver = scheduler(&store);

        saver.schedule(&json!(1));
        tokio::time::sleep(Duration::from_millis(700)).await;
        saver.schedule(&json!(2));
        tokio::time::sleep(Duration::from_millis(700)).await;

        assert_eq!(store.save_count(), 2);
        assert_eq!(store.last_save().map(|(_, v)| v), Some(json!(2)));
        saver.shutdown().await;
    }

    #[tokio::test]
    async fn each_change_restarts_the_window() {
        tokio::time::pause();
        let store = Arc::new(RecordingStore::default());
        let saver = scheduler(&store);

        saver.schedule(&json!("a"));
        tokio::time::sleep(Duration::from_millis(400)).await;
        saver.schedule(&json!("b"));
        tokio::time::sleep(Duration::from_millis(400)).await;
        // 800ms since the first change, 400ms since the last.
        assert_eq!(store.save_count(), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(store.save_count(), 1);
        saver.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_flushes_pending_value() {
        tokio::time::pause();
        let store = Arc::new(RecordingStore::default());
        let saver = scheduler(&store);

        saver.schedule(&json!({ "hidden": [7] }));
        saver.shutdown().await;

        assert_eq!(store.save_count(), 1);
        assert_eq!(
            store.last_save().map(|(_, v)| v),
            Some(json!({ "hidden": [7] }))
        );
    }

    #[tokio::test]
    async fn shutdown_without_changes_saves_nothing() {
        let store = Arc::new(RecordingStore::default());
        let saver = scheduler(&store);
        assert_eq!(saver.key(), "priority_list");
        saver.shutdown().await;
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn failed_save_does_not_stop_the_task() {
        tokio::time::pause();
        let store = Arc::new(RecordingStore::failing());
        let saver = scheduler(&store);

        saver.schedule(&json!(1));
        tokio::time::sleep(Duration::from_millis(600)).await;
        saver.schedule(&json!(2));
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(store.save_count(), 2);
        saver.shutdown().await;
    }
}
