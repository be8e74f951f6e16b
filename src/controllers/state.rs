use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Observable screen state: one writer, any number of readers.
///
/// Every update replaces the whole record under the channel's lock, so readers
/// never see a half-applied change.
#[derive(Debug)]
pub struct StateHolder<S> {
    tx: Arc<watch::Sender<S>>,
}

impl<S> Clone for StateHolder<S> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<S: Clone + Send + Sync + 'static> StateHolder<S> {
    pub fn new(initial: S) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Snapshot of the current state.
    pub fn get(&self) -> S {
        self.tx.borrow().clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut S)) {
        self.tx.send_modify(f);
    }

    /// Apply `f` and notify readers only when it reports a change.
    pub fn update_if(&self, f: impl FnOnce(&mut S) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    /// Wait until the state satisfies `predicate` and return that snapshot.
    pub async fn wait_for(&self, predicate: impl FnMut(&S) -> bool) -> S {
        let mut rx = self.subscribe();
        let state = match rx.wait_for(predicate).await {
            Ok(state) => state.clone(),
            // The sender lives as long as `self`
            Err(_) => self.get(),
        };
        state
    }
}

/// Flag shared with a background job; once cancelled the job must not commit results.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A spawned fetch together with its token.
#[derive(Debug)]
pub struct Job {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Job {
    pub fn new(token: CancellationToken, handle: JoinHandle<()>) -> Self {
        Self { token, handle }
    }

    pub fn cancel(&self) {
        self.token.cancel();
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
