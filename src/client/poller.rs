//! The resource poller: keep a list-shaped view fresh against a remote
//! collection endpoint.
//!
//! On spawn the poller fetches once, then re-fetches on a fixed interval.
//! All fetches run sequentially inside the poller's owning task, so an
//! interval tick never overlaps an in-flight fetch and a stale response
//! can never clobber a newer one. Dropping the handle cancels the task.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::errors::ClientError;

/// Handle to a polling task. The view is exposed through a watch channel;
/// a failed fetch degrades the view to an empty list and the next cycle
/// is the recovery path.
pub struct Poller<T> {
    view: watch::Receiver<Vec<T>>,
    refresh_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl<T> Poller<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Spawn a poller. `fetch` is called once immediately and then every
    /// `interval` until the handle is dropped or [`stop`](Self::stop) is
    /// called.
    pub fn spawn<F, Fut>(name: &'static str, interval: Duration, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Vec<T>, ClientError>> + Send + 'static,
    {
        let (view_tx, view_rx) = watch::channel(Vec::new());
        let (refresh_tx, mut refresh_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    request = refresh_rx.recv() => {
                        if request.is_none() {
                            break;
                        }
                    }
                }
                match fetch().await {
                    Ok(items) => {
                        view_tx.send_replace(items);
                    }
                    Err(err) => {
                        tracing::warn!("{}: fetch failed: {}", name, err);
                        view_tx.send_replace(Vec::new());
                    }
                }
            }
        });

        Self {
            view: view_rx,
            refresh_tx,
            task,
        }
    }

    /// A receiver tracking the current view; `changed()` fires after every
    /// completed fetch.
    pub fn view(&self) -> watch::Receiver<Vec<T>> {
        self.view.clone()
    }

    /// Snapshot of the current view.
    pub fn current(&self) -> Vec<T> {
        self.view.borrow().clone()
    }

    /// Queue an out-of-band re-fetch (used after mutations). The fetch
    /// runs on the poller task; this does not wait for it to finish.
    pub async fn refresh(&self) {
        let _ = self.refresh_tx.send(()).await;
    }

    /// Stop polling. Equivalent to dropping the handle.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    fn backed_poller(
        interval: Duration,
        data: Arc<Mutex<Vec<String>>>,
    ) -> Poller<String> {
        Poller::spawn("test", interval, move || {
            let data = data.clone();
            async move { Ok(data.lock().unwrap().clone()) }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_fetch_fills_view() {
        let data = Arc::new(Mutex::new(vec!["a".to_string()]));
        let poller = backed_poller(Duration::from_secs(10), data);

        let mut view = poller.view();
        view.changed().await.unwrap();
        assert_eq!(poller.current(), vec!["a".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_picks_up_new_data() {
        let data = Arc::new(Mutex::new(vec!["a".to_string()]));
        let poller = backed_poller(Duration::from_secs(10), data.clone());

        let mut view = poller.view();
        view.changed().await.unwrap();

        data.lock().unwrap().push("b".to_string());
        // One interval elapses, the next fetch sees the new list
        view.changed().await.unwrap();
        assert_eq!(poller.current().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_triggers_out_of_band_fetch() {
        let data = Arc::new(Mutex::new(vec!["a".to_string()]));
        let poller = backed_poller(Duration::from_secs(3600), data.clone());

        let mut view = poller.view();
        view.changed().await.unwrap();

        data.lock().unwrap().push("b".to_string());
        poller.refresh().await;
        view.changed().await.unwrap();
        assert_eq!(poller.current().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_degrades_to_empty() {
        let fail = Arc::new(AtomicBool::new(false));
        let poller = {
            let fail = fail.clone();
            Poller::spawn("test", Duration::from_secs(10), move || {
                let fail = fail.clone();
                async move {
                    if fail.load(Ordering::SeqCst) {
                        Err(ClientError::NotLoggedIn)
                    } else {
                        Ok(vec!["a".to_string()])
                    }
                }
            })
        };

        let mut view = poller.view();
        view.changed().await.unwrap();
        assert_eq!(poller.current().len(), 1);

        fail.store(true, Ordering::SeqCst);
        view.changed().await.unwrap();
        assert!(poller.current().is_empty());

        // Recovery on the next cycle
        fail.store(false, Ordering::SeqCst);
        view.changed().await.unwrap();
        assert_eq!(poller.current().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_the_task() {
        let data = Arc::new(Mutex::new(vec!["a".to_string()]));
        let poller = backed_poller(Duration::from_secs(10), data.clone());

        let mut view = poller.view();
        view.changed().await.unwrap();
        poller.stop();

        data.lock().unwrap().push("b".to_string());
        tokio::time::sleep(Duration::from_secs(30)).await;
        // No further fetches after stop
        assert_eq!(poller.current().len(), 1);
    }
}
