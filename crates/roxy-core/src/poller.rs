use crate::boundary::CommandBoundary;
use crate::store::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Keeps the process status fresh for as long as a view is alive.
///
/// On spawn the profile list and the status are loaded once; after that the
/// status is refreshed every `period`. Poll failures are logged and dropped.
pub struct StatusPoller {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl StatusPoller {
    pub fn spawn<B>(store: Arc<SessionStore<B>>, period: Duration) -> Self
    where
        B: CommandBoundary + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let (loaded, status) = tokio::join!(store.load_users(), store.refresh_status());
            if let Err(e) = loaded {
                tracing::warn!("Initial profile load failed: {}", e);
            }
            if let Err(e) = status {
                tracing::warn!("Initial status check failed: {}", e);
            }

            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Status poller: shutdown signal received");
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = store.refresh_status().await {
                            tracing::warn!("Status poll failed: {}", e);
                        }
                    }
                }
            }
        });

        Self {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Stop polling and wait for the task to finish.
    ///
    /// A status request already in flight is allowed to complete.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBoundary, profile};

    fn count(store: &SessionStore<FakeBoundary>, call: &str) -> usize {
        store.boundary.calls().iter().filter(|c| **c == call).count()
    }

    fn store() -> Arc<SessionStore<FakeBoundary>> {
        Arc::new(SessionStore::new(FakeBoundary::with_users(
            vec![profile("a@x.com")],
            Some("a@x.com"),
        )))
    }

    #[tokio::test(start_paused = true)]
    async fn test_eager_load_then_periodic_refresh() {
        let store = store();
        let poller = StatusPoller::spawn(store.clone(), DEFAULT_POLL_INTERVAL);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(count(&store, "list_users"), 1);
        assert_eq!(count(&store, "get_roxy_status"), 1);
        assert_eq!(store.snapshot().profiles.len(), 1);

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(count(&store, "get_roxy_status"), 3);
        assert_eq!(count(&store, "list_users"), 1);

        poller.stop().await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(count(&store, "get_roxy_status"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_failures_are_not_user_visible() {
        let store = store();
        store.boundary.fail("get_roxy_status", "ps unavailable");
        let poller = StatusPoller::spawn(store.clone(), DEFAULT_POLL_INTERVAL);

        tokio::time::sleep(Duration::from_secs(6)).await;

        assert_eq!(count(&store, "get_roxy_status"), 2);
        let state = store.snapshot();
        assert!(state.error.is_none());
        assert!(!state.busy);
        poller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_the_poller_cancels_it() {
        let store = store();
        let poller = StatusPoller::spawn(store.clone(), DEFAULT_POLL_INTERVAL);
        tokio::time::sleep(Duration::from_millis(10)).await;

        drop(poller);
        tokio::time::sleep(Duration::from_secs(20)).await;

        assert_eq!(count(&store, "get_roxy_status"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_during_initial_load_releases_busy() {
        let store = store();
        let _release = store.boundary.hold("list_users");
        let mut updates = store.subscribe();
        let poller = StatusPoller::spawn(store.clone(), DEFAULT_POLL_INTERVAL);
        updates.wait_for(|state| state.busy).await.unwrap();

        drop(poller);
        let released =
            tokio::time::timeout(Duration::from_secs(1), updates.wait_for(|state| !state.busy))
                .await
                .is_ok();

        assert!(released);
        store.delete_user("a@x.com").await.unwrap();
        assert!(!store.snapshot().busy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_change_is_published() {
        let store = store();
        let mut updates = store.subscribe();
        let poller = StatusPoller::spawn(store.clone(), DEFAULT_POLL_INTERVAL);
        tokio::time::sleep(Duration::from_millis(10)).await;

        store.boundary.start_externally();
        let _ = updates.borrow_and_update();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(updates.has_changed().unwrap());
        assert!(store.snapshot().process.is_running);
        poller.stop().await;
    }
}
