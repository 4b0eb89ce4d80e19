use async_trait::async_trait;
use futures::future::try_join_all;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, trace};

use super::control_flow::ControlFlow;
use super::storing::{CreatedStoring, DatumStoring, DatumStoringFactory, RecreateSignal};
use super::types::PipelineError;
use crate::parallel::{Config, ParallelProcessor, WorkerPool};

/// Feeds data through lazily created storings using a bounded worker pool.
///
/// Every worker acquires a storing from the factory on its first datum and keeps it
/// until the storing signals a recreate or the worker runs out of data; either way
/// the storing is ended exactly once. Pending results returned by the factory are
/// spawned as soon as their storing exists and joined after all data is consumed.
pub struct BufferedPipeline<C> {
    context: C,
    config: Arc<Config>,
}

impl<C> BufferedPipeline<C> {
    pub fn new(context: C, config: Arc<Config>) -> Self {
        Self { context, config }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run<D, E, F>(&self, factory: &F, data: &[D]) -> Result<(), E>
    where
        C: Sync,
        D: Sync,
        E: From<PipelineError> + Send + 'static,
        F: DatumStoringFactory<C, D, E>,
    {
        let processor = SinkProcessor {
            context: &self.context,
            factory,
            pending: Mutex::new(Vec::new()),
            created: AtomicUsize::new(0),
        };

        let outcome = WorkerPool::new(Arc::clone(&self.config))
            .iterate_with_context(data, &processor)
            .await;

        let SinkProcessor {
            pending, created, ..
        } = processor;
        let pending = pending.into_inner();

        if let Err(err) = outcome {
            for handle in &pending {
                handle.abort();
            }
            return Err(err);
        }

        debug!(
            storings = created.into_inner(),
            pending = pending.len(),
            "all data consumed, joining pending results"
        );
        let aborts: Vec<AbortHandle> = pending.iter().map(JoinHandle::abort_handle).collect();
        if let Err(err) = try_join_all(pending.into_iter().map(join_pending)).await {
            // the remaining handles were dropped, which would detach their tasks
            for handle in &aborts {
                handle.abort();
            }
            return Err(err);
        }
        Ok(())
    }
}

/// Runs `data` through storings created by `factory`, with at most `concurrency`
/// workers each holding one storing at a time.
///
/// Resolves once every datum was processed, every storing ended and every pending
/// result settled. The first failure is returned as is.
pub async fn run_pipeline_with_buffered_data<C, D, E, F>(
    context: C,
    factory: F,
    data: &[D],
    concurrency: usize,
) -> Result<(), E>
where
    C: Sync,
    D: Sync,
    E: From<PipelineError> + Send + 'static,
    F: DatumStoringFactory<C, D, E>,
{
    BufferedPipeline::new(context, Arc::new(Config::new(concurrency)))
        .run(&factory, data)
        .await
}

async fn join_pending<E>(handle: JoinHandle<Result<(), E>>) -> Result<(), E>
where
    E: From<PipelineError>,
{
    match handle.await {
        Ok(result) => result,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(err) => Err(PipelineError::PendingTask(err).into()),
    }
}

struct LiveStoring<D, E> {
    storing: Box<dyn DatumStoring<D, E>>,
    recreate: RecreateSignal,
    generation: usize,
}

/// The storing slot owned by a single worker.
struct WorkerStoring<D, E> {
    live: Option<LiveStoring<D, E>>,
}

impl<D, E> WorkerStoring<D, E> {
    fn retire_if_requested(&mut self) -> Result<(), E> {
        match self.live.take_if(|live| live.recreate.is_requested()) {
            Some(live) => {
                debug!(generation = live.generation, "recreate requested, ending storing");
                live.storing.end()
            }
            None => Ok(()),
        }
    }

    fn finish(self) -> Result<(), E> {
        match self.live {
            Some(live) => {
                trace!(generation = live.generation, "worker done, ending storing");
                live.storing.end()
            }
            None => Ok(()),
        }
    }
}

struct SinkProcessor<'a, C, F, E> {
    context: &'a C,
    factory: &'a F,
    pending: Mutex<Vec<JoinHandle<Result<(), E>>>>,
    created: AtomicUsize,
}

impl<C, F, E> SinkProcessor<'_, C, F, E>
where
    E: Send + 'static,
{
    fn acquire<'w, D>(
        &self,
        worker: &'w mut WorkerStoring<D, E>,
    ) -> Result<&'w mut LiveStoring<D, E>, E>
    where
        F: DatumStoringFactory<C, D, E>,
    {
        let live = match worker.live.take() {
            Some(live) => live,
            None => self.create_storing()?,
        };
        Ok(worker.live.insert(live))
    }

    fn create_storing<D>(&self) -> Result<LiveStoring<D, E>, E>
    where
        F: DatumStoringFactory<C, D, E>,
    {
        let recreate = RecreateSignal::new();
        let CreatedStoring { storing, pending } = self.factory.create(self.context, recreate.clone())?;
        let generation = self.created.fetch_add(1, Ordering::Relaxed);

        if let Some(pending) = pending {
            self.pending.lock().push(tokio::spawn(pending));
        }
        debug!(generation, "created storing");

        Ok(LiveStoring {
            storing,
            recreate,
            generation,
        })
    }
}

#[async_trait]
impl<C, D, E, F> ParallelProcessor<D> for SinkProcessor<'_, C, F, E>
where
    C: Sync,
    D: Sync,
    E: Send + 'static,
    F: DatumStoringFactory<C, D, E>,
{
    type Context = WorkerStoring<D, E>;
    type Error = E;

    fn create_context(&self) -> Self::Context {
        WorkerStoring { live: None }
    }

    async fn process(
        &self,
        datum: &D,
        index: usize,
        worker: &mut WorkerStoring<D, E>,
    ) -> Result<(), E> {
        // a recreate may have been signalled after the previous call returned
        worker.retire_if_requested()?;

        let live = self.acquire(worker)?;
        let control_flow = ControlFlow::new();
        live.storing.process(datum, &control_flow)?;
        // a storing that paused and signalled may only resume from its own `end`
        worker.retire_if_requested()?;

        if control_flow.is_paused() {
            trace!(
                index,
                pauses = control_flow.pause_count(),
                "storing paused, waiting for resume"
            );
            control_flow.wait_until_resumed().await;
        }

        // signals raised from a callback while paused
        worker.retire_if_requested()
    }

    fn on_worker_end(&self, worker: Self::Context) -> Result<(), E> {
        worker.finish()
    }
}
