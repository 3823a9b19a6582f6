use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(250);

struct Pending {
    handle: JoinHandle<()>,
    fired: Arc<AtomicBool>,
}

/// Runs the last scheduled action once `delay` passed without a newer one.
///
/// An action whose delay already elapsed is never cancelled, so a save in
/// flight always completes.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<Pending>>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            flag.store(true, Ordering::SeqCst);
            action.await;
        });

        let Ok(mut pending) = self.pending.lock() else {
            return;
        };
        if let Some(previous) = pending.replace(Pending { handle, fired }) {
            if !previous.fired.load(Ordering::SeqCst) {
                previous.handle.abort();
            }
        }
    }

    /// Whether an action is waiting for its delay to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .map(|pending| {
                pending
                    .as_ref()
                    .map(|p| !p.fired.load(Ordering::SeqCst))
                    .unwrap_or(false)
            })
            .unwrap_or(false)
    }

    /// Wait for the last scheduled action to run to completion.
    pub async fn settle(&self) {
        let pending = match self.pending.lock() {
            Ok(mut pending) => pending.take(),
            Err(_) => None,
        };
        if let Some(pending) = pending {
            let _ = pending.handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_into_last_action() {
        let debouncer = Debouncer::default();
        let runs = Arc::new(Mutex::new(Vec::new()));
        for value in 1..=3 {
            let runs = runs.clone();
            debouncer.schedule(async move {
                runs.lock().unwrap().push(value);
            });
            tokio::time::advance(Duration::from_millis(100)).await;
        }
        assert!(debouncer.is_pending());
        debouncer.settle().await;
        assert_eq!(*runs.lock().unwrap(), vec![3]);
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_actions_all_run() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let count = count.clone();
            debouncer.schedule(async move {
                count.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(60)).await;
        }
        debouncer.settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
