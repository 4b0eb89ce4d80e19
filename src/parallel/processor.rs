// src/parallel/processor.rs

use async_trait::async_trait;
use std::future::Future;

/// Per-item work run by every worker of the pool.
///
/// Each worker calls [`create_context`](Self::create_context) once when it starts,
/// passes that context to every [`process`](Self::process) call it makes, and hands it
/// back to [`on_worker_end`](Self::on_worker_end) once no items are left to claim.
/// A context never leaves the worker that created it.
#[async_trait]
pub trait ParallelProcessor<T>: Send + Sync {
    type Context: Send;
    type Error: Send;

    fn create_context(&self) -> Self::Context;

    async fn process(
        &self,
        item: &T,
        index: usize,
        context: &mut Self::Context,
    ) -> Result<(), Self::Error>;

    fn on_worker_end(&self, _context: Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Runs a plain `(item, index)` closure as a processor with no per-worker context.
pub struct FnProcessor<F> {
    on_item: F,
}

impl<F> FnProcessor<F> {
    pub fn new(on_item: F) -> Self {
        FnProcessor { on_item }
    }
}

#[async_trait]
impl<T, E, F, Fut> ParallelProcessor<T> for FnProcessor<F>
where
    F: Fn(&T, usize) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), E>> + Send,
    T: Sync,
    E: Send,
{
    type Context = ();
    type Error = E;

    fn create_context(&self) -> Self::Context {}

    async fn process(&self, item: &T, index: usize, _context: &mut ()) -> Result<(), E> {
        (self.on_item)(item, index).await
    }
}
