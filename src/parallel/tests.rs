use super::*;
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, PartialEq, Eq)]
struct TestError(usize);

fn random_delay() -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(0..20))
}

// Records which worker saw which index and how each context ended
struct RecordingProcessor {
    created: AtomicUsize,
    seen: Mutex<Vec<(usize, usize)>>,
    ended: Mutex<Vec<(usize, usize)>>,
}

impl RecordingProcessor {
    fn new() -> Self {
        Self {
            created: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            ended: Mutex::new(Vec::new()),
        }
    }
}

struct WorkerContext {
    worker: usize,
    processed: usize,
}

#[async_trait]
impl ParallelProcessor<u32> for RecordingProcessor {
    type Context = WorkerContext;
    type Error = TestError;

    fn create_context(&self) -> WorkerContext {
        WorkerContext {
            worker: self.created.fetch_add(1, Ordering::SeqCst),
            processed: 0,
        }
    }

    async fn process(
        &self,
        _item: &u32,
        index: usize,
        context: &mut WorkerContext,
    ) -> Result<(), TestError> {
        self.seen.lock().push((context.worker, index));
        sleep(random_delay()).await;
        context.processed += 1;
        Ok(())
    }

    fn on_worker_end(&self, context: WorkerContext) -> Result<(), TestError> {
        self.ended.lock().push((context.worker, context.processed));
        Ok(())
    }
}

// Fails on one index and counts how many items it was handed
struct FailingProcessor {
    fail_at: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl ParallelProcessor<u32> for FailingProcessor {
    type Context = ();
    type Error = TestError;

    fn create_context(&self) {}

    async fn process(&self, _item: &u32, index: usize, _context: &mut ()) -> Result<(), TestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if index == self.fail_at {
            return Err(TestError(index));
        }
        Ok(())
    }
}

async fn seen_items(items: &[u32], concurrency: usize) -> Vec<u32> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    iterate_in_parallel(items, concurrency, move |item: &u32, _index| {
        let seen = Arc::clone(&seen_clone);
        let item = *item;
        async move {
            sleep(random_delay()).await;
            seen.lock().push(item);
            Ok::<(), TestError>(())
        }
    })
    .await
    .unwrap();

    let mut seen = seen.lock().clone();
    seen.sort();
    seen
}

/// Runs `items.len()` sleeping items and returns the highest number seen in flight.
async fn max_in_flight(item_count: usize, concurrency: usize) -> usize {
    let items: Vec<u32> = (0..item_count as u32).collect();
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let (active_clone, peak_clone) = (Arc::clone(&active), Arc::clone(&peak));

    iterate_in_parallel(&items, concurrency, move |_item: &u32, _index| {
        let active = Arc::clone(&active_clone);
        let peak = Arc::clone(&peak_clone);
        async move {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            sleep(Duration::from_millis(15)).await;
            active.fetch_sub(1, Ordering::SeqCst);
            Ok::<(), TestError>(())
        }
    })
    .await
    .unwrap();

    peak.load(Ordering::SeqCst)
}

#[tokio::test]
async fn test_iterate_without_context_sees_every_item() {
    let items = vec![0, 1, 2];
    for concurrency in [1, 2, 10, 0] {
        assert_eq!(seen_items(&items, concurrency).await, items);
    }
    assert!(seen_items(&[], 100).await.is_empty());
}

#[tokio::test]
async fn test_indices_claimed_once_in_increasing_order_per_worker() {
    let items: Vec<u32> = (0..50).collect();
    let processor = RecordingProcessor::new();

    iterate_in_parallel_with_context(&items, 4, &processor)
        .await
        .unwrap();

    let seen = processor.seen.lock().clone();
    let mut indices: Vec<usize> = seen.iter().map(|(_, index)| *index).collect();
    indices.sort();
    assert_eq!(indices, (0..50).collect::<Vec<_>>());

    for worker in 0..4 {
        let claimed: Vec<usize> = seen
            .iter()
            .filter(|(w, _)| *w == worker)
            .map(|(_, index)| *index)
            .collect();
        assert!(claimed.windows(2).all(|pair| pair[0] < pair[1]));
    }
}

#[tokio::test]
async fn test_context_created_and_ended_once_per_worker() {
    let items = vec![0, 1, 2];
    for (concurrency, workers) in [(1, 1), (2, 2), (10, 3), (0, 1)] {
        let processor = RecordingProcessor::new();
        iterate_in_parallel_with_context(&items, concurrency, &processor)
            .await
            .unwrap();

        assert_eq!(processor.created.load(Ordering::SeqCst), workers);

        let mut ended = processor.ended.lock().clone();
        ended.sort();
        assert_eq!(ended.len(), workers);
        assert!(ended.iter().enumerate().all(|(i, (worker, _))| i == *worker));
        assert_eq!(ended.iter().map(|(_, processed)| processed).sum::<usize>(), 3);
    }
}

#[tokio::test]
async fn test_empty_items_never_touch_hooks() {
    let processor = RecordingProcessor::new();
    iterate_in_parallel_with_context(&[], 100, &processor)
        .await
        .unwrap();

    assert_eq!(processor.created.load(Ordering::SeqCst), 0);
    assert!(processor.seen.lock().is_empty());
    assert!(processor.ended.lock().is_empty());
}

#[tokio::test]
async fn test_concurrency_is_bounded_and_saturated() {
    assert_eq!(max_in_flight(12, 3).await, 3);
    assert_eq!(max_in_flight(3, 10).await, 3);
    assert_eq!(max_in_flight(5, 0).await, 1);
    assert_eq!(max_in_flight(5, 1).await, 1);
}

#[tokio::test]
async fn test_processing_error_is_returned_unchanged() {
    let items: Vec<u32> = (0..10).collect();
    let processor = FailingProcessor {
        fail_at: 4,
        calls: AtomicUsize::new(0),
    };

    let result = iterate_in_parallel_with_context(&items, 1, &processor).await;

    assert_eq!(result, Err(TestError(4)));
    // a single worker stops at the failing item
    assert_eq!(processor.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_worker_pool_uses_config() {
    let config = ConfigBuilder::default().concurrency(2usize).build().unwrap();
    let pool = WorkerPool::new(Arc::new(config));
    assert_eq!(pool.config().concurrency(), 2);

    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = Arc::clone(&counter);
    pool.iterate(&[1u32, 2, 3, 4], move |item: &u32, _index| {
        let counter = Arc::clone(&counter_clone);
        let item = *item as usize;
        async move {
            counter.fetch_add(item, Ordering::SeqCst);
            Ok::<(), TestError>(())
        }
    })
    .await
    .unwrap();

    assert_eq!(counter.load(Ordering::SeqCst), 10);
}
