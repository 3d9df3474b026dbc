use std::sync::Arc;

use tokio::sync::{watch, Mutex, OwnedMutexGuard};

/// Serializes the tag-sensitive window of every package's pipeline.
///
/// A holder acquires the permit before its prepare-time work and drops it
/// at the start of its publish phase; while held, no other package may
/// enter prepare. The permit is an RAII guard, so a failed or panicked
/// pipeline releases the lock on unwind.
#[derive(Debug, Clone, Default)]
pub struct TagLock {
    inner: Arc<Mutex<()>>,
}

impl TagLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other package holds the permit, then takes it.
    pub async fn acquire(&self) -> TagPermit {
        TagPermit {
            _guard: Arc::clone(&self.inner).lock_owned().await,
        }
    }

    /// Takes the permit only if it is free right now.
    #[must_use]
    pub fn try_acquire(&self) -> Option<TagPermit> {
        Arc::clone(&self.inner)
            .try_lock_owned()
            .ok()
            .map(|guard| TagPermit { _guard: guard })
    }
}

/// Exclusive permission to be between prepare and publish. Drop to let
/// the next package through.
#[derive(Debug)]
pub struct TagPermit {
    _guard: OwnedMutexGuard<()>,
}

/// Open-once signal used to hold a package's commit analysis back until a
/// designated cohort of dependencies has finished analyzing.
///
/// Handles are cheap clones of the same gate; waiting on an already-open
/// gate returns immediately.
#[derive(Debug, Clone)]
pub struct BatchGate {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for BatchGate {
    fn default() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }
}

impl BatchGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the gate, releasing every current and future waiter.
    pub fn open(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        *self.rx.borrow()
    }

    /// Suspends until the gate is opened.
    pub async fn wait_open(&self) {
        let mut rx = self.rx.clone();
        // Every handle keeps the sender alive, so the channel cannot close
        // while a waiter exists.
        let _ = rx.wait_for(|open| *open).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn tag_lock_admits_one_holder_at_a_time() {
        let lock = TagLock::new();

        let permit = lock.acquire().await;
        assert!(lock.try_acquire().is_none());

        drop(permit);
        assert!(lock.try_acquire().is_some());
    }

    #[tokio::test]
    async fn tag_permit_released_when_holder_task_fails() {
        let lock = TagLock::new();

        let holder = {
            let lock = lock.clone();
            tokio::spawn(async move {
                let _permit = lock.acquire().await;
                panic!("pipeline blew up mid-window");
            })
        };
        assert!(holder.await.is_err());

        // The permit must not leak past the failed holder.
        let _permit = lock.acquire().await;
    }

    #[tokio::test]
    async fn batch_gate_blocks_until_opened() {
        let gate = BatchGate::new();
        assert!(!gate.is_open());

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.wait_open().await;
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        gate.open();
        waiter.await.expect("waiter completes");
        assert!(gate.is_open());
    }

    #[tokio::test]
    async fn waiting_on_an_open_gate_returns_immediately() {
        let gate = BatchGate::new();
        gate.open();
        gate.wait_open().await;
        gate.wait_open().await;
    }
}
