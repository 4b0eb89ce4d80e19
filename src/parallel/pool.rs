use futures::future::try_join_all;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

use super::config::{Config, effective_concurrency};
use super::processor::{FnProcessor, ParallelProcessor};

/// Bounded pool of cooperative workers pulling items from a shared cursor.
///
/// Workers are futures joined on the calling task rather than spawned tasks, so
/// `items` and the processor can be borrowed for the duration of the run.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    config: Arc<Config>,
}

impl WorkerPool {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn iterate<T, E, F, Fut>(&self, items: &[T], on_item: F) -> Result<(), E>
    where
        T: Sync,
        F: Fn(&T, usize) -> Fut + Send + Sync,
        Fut: Future<Output = Result<(), E>> + Send,
        E: Send,
    {
        self.iterate_with_context(items, &FnProcessor::new(on_item))
            .await
    }

    pub async fn iterate_with_context<T, P>(&self, items: &[T], processor: &P) -> Result<(), P::Error>
    where
        T: Sync,
        P: ParallelProcessor<T>,
    {
        if items.is_empty() {
            trace!("no items to iterate, skipping worker start");
            return Ok(());
        }

        let workers = effective_concurrency(self.config.concurrency(), items.len());
        debug!(
            items = items.len(),
            requested = self.config.concurrency(),
            workers,
            "starting worker pool"
        );

        let cursor = AtomicUsize::new(0);
        let lines = (0..workers).map(|worker_id| Self::worker(worker_id, items, &cursor, processor));
        try_join_all(lines).await?;

        debug!(items = items.len(), "worker pool finished");
        Ok(())
    }

    async fn worker<T, P>(
        worker_id: usize,
        items: &[T],
        cursor: &AtomicUsize,
        processor: &P,
    ) -> Result<(), P::Error>
    where
        T: Sync,
        P: ParallelProcessor<T>,
    {
        let mut context = processor.create_context();
        let mut processed = 0usize;

        loop {
            // claim-and-increment is the only synchronisation between workers
            let index = cursor.fetch_add(1, Ordering::Relaxed);
            let Some(item) = items.get(index) else {
                break;
            };
            processor.process(item, index, &mut context).await?;
            processed += 1;
            // let sibling workers claim before this one takes another item
            tokio::task::yield_now().await;
        }

        trace!(worker_id, processed, "worker exhausted items");
        processor.on_worker_end(context)
    }
}

/// Processes every item exactly once using at most `concurrency` concurrent workers.
///
/// Concurrency is clamped to `1..=items.len()`. The first error returned by `on_item`
/// fails the whole run and is returned unchanged.
pub async fn iterate_in_parallel<T, E, F, Fut>(
    items: &[T],
    concurrency: usize,
    on_item: F,
) -> Result<(), E>
where
    T: Sync,
    F: Fn(&T, usize) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), E>> + Send,
    E: Send,
{
    WorkerPool::new(Arc::new(Config::new(concurrency)))
        .iterate(items, on_item)
        .await
}

/// Like [`iterate_in_parallel`], with a context created once per worker and handed to
/// [`ParallelProcessor::on_worker_end`] when that worker runs out of items.
///
/// An empty `items` slice starts no workers, so neither hook is ever called.
pub async fn iterate_in_parallel_with_context<T, P>(
    items: &[T],
    concurrency: usize,
    processor: &P,
) -> Result<(), P::Error>
where
    T: Sync,
    P: ParallelProcessor<T>,
{
    WorkerPool::new(Arc::new(Config::new(concurrency)))
        .iterate_with_context(items, processor)
        .await
}
