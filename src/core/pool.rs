use crate::utils::error::{EtlError, Result};
use std::future::Future;
use tokio::sync::Semaphore;

/// Caps the number of tasks running at once.
///
/// The slot is held by a semaphore permit scoped to `submit`, so it is
/// returned on success, error, panic or cancellation alike.
#[derive(Debug)]
pub struct ConcurrencyPool {
    slots: Semaphore,
    capacity: usize,
}

impl ConcurrencyPool {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Semaphore::new(capacity),
            capacity,
        }
    }

    pub async fn submit<F, T>(&self, task: F) -> Result<T>
    where
        F: Future<Output = T>,
    {
        let _permit = self
            .slots
            .acquire()
            .await
            .map_err(|_| EtlError::ProcessingError {
                message: "concurrency pool is closed".to_string(),
            })?;
        Ok(task.await)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    fn available(&self) -> usize {
        self.slots.available_permits()
    }
}
