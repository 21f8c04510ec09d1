// Mount lifetime of a view or controller instance.
// Results of work that finishes after `unmount` are dropped instead of being
// applied to a view nobody is looking at anymore.

use futures::future::{AbortHandle, Abortable};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Mount {
    unmounted: AtomicBool,
    next_id: AtomicU64,
    pending: Mutex<Vec<(u64, AbortHandle)>>,
}

impl Mount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mounted(&self) -> bool {
        !self.unmounted.load(Ordering::SeqCst)
    }

    fn register(&self) -> Option<(u64, futures::future::AbortRegistration)> {
        let mut pending = self.pending.lock();
        if !self.is_mounted() {
            return None;
        }
        let (handle, registration) = AbortHandle::new_pair();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        pending.push((id, handle));
        Some((id, registration))
    }

    fn release(&self, id: u64) {
        self.pending.lock().retain(|(pending_id, _)| *pending_id != id);
    }

    /// Drives `future` to completion while mounted.
    ///
    /// Returns `None` when the mount went away before or while the future was
    /// running; the output is discarded in that case.
    pub async fn run<F: Future>(&self, future: F) -> Option<F::Output> {
        let (id, registration) = self.register()?;
        let output = Abortable::new(future, registration).await;
        self.release(id);
        output.ok().filter(|_| self.is_mounted())
    }

    /// Spawns `future` on the runtime; it is aborted on unmount.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Some((_, registration)) = self.register() {
            tokio::spawn(Abortable::new(future, registration));
        }
    }

    pub fn unmount(&self) {
        let pending = {
            let mut pending = self.pending.lock();
            self.unmounted.store(true, Ordering::SeqCst);
            std::mem::take(&mut *pending)
        };
        for (_, handle) in pending {
            handle.abort();
        }
    }
}
