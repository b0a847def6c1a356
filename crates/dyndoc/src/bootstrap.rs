//! Process-wide lazy initialization of shared services.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;

/// Builds a shared value on first use and hands out the same instance after.
///
/// Concurrent first callers wait on a single initialization. A failed
/// initialization leaves the cell empty, so the next caller retries.
pub struct Bootstrap<T> {
    cell: OnceCell<Arc<T>>,
}

impl<T> Bootstrap<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Returns the shared instance, running `init` if nothing is built yet.
    pub async fn get_or_try_init<F, Fut, E>(&self, init: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.cell
            .get_or_try_init(|| async {
                tracing::info!(service = std::any::type_name::<T>(), "Initializing shared service");
                init().await.map(Arc::new)
            })
            .await
            .cloned()
    }

    /// Returns the instance if it has been built.
    #[allow(dead_code)]
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }

    #[allow(dead_code)]
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

impl<T> Default for Bootstrap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_starts_uninitialized() {
        let bootstrap: Bootstrap<u32> = Bootstrap::new();

        assert!(!bootstrap.is_initialized());
        assert!(bootstrap.get().is_none());
    }

    #[tokio::test]
    async fn test_second_call_reuses_instance() {
        let bootstrap = Bootstrap::new();

        let first = bootstrap
            .get_or_try_init(|| async { Ok::<_, ()>(String::from("store")) })
            .await
            .unwrap();
        let second = bootstrap
            .get_or_try_init(|| async { Ok::<_, ()>(String::from("other")) })
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second, "store");
        assert!(bootstrap.is_initialized());
    }

    #[tokio::test]
    async fn test_failed_init_can_be_retried() {
        let bootstrap = Bootstrap::new();

        let failed = bootstrap
            .get_or_try_init(|| async { Err::<u32, _>("unreachable") })
            .await;
        assert_eq!(failed, Err("unreachable"));
        assert!(!bootstrap.is_initialized());

        let value = bootstrap
            .get_or_try_init(|| async { Ok::<_, &str>(7) })
            .await
            .unwrap();
        assert_eq!(*value, 7);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_use_constructs_once() {
        static BOOTSTRAP: Bootstrap<usize> = Bootstrap::new();
        let constructions = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let constructions = constructions.clone();
                tokio::spawn(async move {
                    BOOTSTRAP
                        .get_or_try_init(|| async move {
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok::<_, ()>(constructions.fetch_add(1, Ordering::SeqCst))
                        })
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut instances = Vec::new();
        for handle in handles {
            instances.push(handle.await.unwrap());
        }

        assert_eq!(constructions.load(Ordering::SeqCst), 1);
        assert!(instances.iter().all(|i| Arc::ptr_eq(i, &instances[0])));
    }
}
