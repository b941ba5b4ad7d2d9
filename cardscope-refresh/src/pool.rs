use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::RefreshError;

/// Bounded executor for refresh tasks.
///
/// At most `workers` tasks run at once and at most `queue_capacity` more wait
/// for a worker. `submit` blocks while both are full.
pub struct WorkerPool {
    admission: Arc<Semaphore>,
    running: Arc<Semaphore>,
    workers: usize,
    queue_capacity: usize,
}

impl WorkerPool {
    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        let workers = workers.max(1);
        Self {
            admission: Arc::new(Semaphore::new(workers + queue_capacity)),
            running: Arc::new(Semaphore::new(workers)),
            workers,
            queue_capacity,
        }
    }

    /// Tasks admitted and not yet finished, running or queued
    pub fn in_flight(&self) -> usize {
        self.workers + self.queue_capacity - self.admission.available_permits()
    }

    pub async fn submit<F, T>(&self, task: F) -> Result<JoinHandle<T>, RefreshError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let admitted = self
            .admission
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| RefreshError::PoolClosed)?;
        let running = self.running.clone();

        Ok(tokio::spawn(async move {
            let _admitted = admitted;
            // The running semaphore is never closed
            let _worker = running.acquire_owned().await.ok();
            task.await
        }))
    }

    /// Refuse new submissions. Admitted tasks still run.
    pub fn close(&self) {
        self.admission.close();
    }
}
