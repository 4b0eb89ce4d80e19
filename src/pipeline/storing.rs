// src/pipeline/storing.rs

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::control_flow::ControlFlow;

/// Stateful consumer of the data a pipeline produces, e.g. a batch writer.
///
/// `end` consumes the storing, so every instance is finalized at most once.
pub trait DatumStoring<D, E>: Send {
    fn process(&mut self, datum: &D, control_flow: &ControlFlow) -> Result<(), E>;

    fn end(self: Box<Self>) -> Result<(), E>;
}

/// A [`DatumStoring`] made of two closures.
pub struct FnStoring<P, F> {
    process: P,
    end: F,
}

impl<P, F> FnStoring<P, F> {
    pub fn new(process: P, end: F) -> Self {
        FnStoring { process, end }
    }
}

impl<D, E, P, F> DatumStoring<D, E> for FnStoring<P, F>
where
    P: FnMut(&D, &ControlFlow) -> Result<(), E> + Send,
    F: FnOnce() -> Result<(), E> + Send,
{
    fn process(&mut self, datum: &D, control_flow: &ControlFlow) -> Result<(), E> {
        (self.process)(datum, control_flow)
    }

    fn end(self: Box<Self>) -> Result<(), E> {
        (self.end)()
    }
}

/// Lets a storing ask to be finalized and replaced by a fresh one.
///
/// The worker owning the storing checks the signal right after each `process` call
/// returns and again before handing over its next datum.
#[derive(Debug, Clone, Default)]
pub struct RecreateSignal {
    requested: Arc<AtomicBool>,
}

impl RecreateSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Asynchronous work tied to one storing's lifetime, joined at the end of a run.
pub type PendingResult<E> = BoxFuture<'static, Result<(), E>>;

/// What a [`DatumStoringFactory`] hands back for every storing it creates.
pub struct CreatedStoring<D, E> {
    pub storing: Box<dyn DatumStoring<D, E>>,
    pub pending: Option<PendingResult<E>>,
}

impl<D, E> CreatedStoring<D, E> {
    pub fn new<S>(storing: S) -> Self
    where
        S: DatumStoring<D, E> + 'static,
    {
        Self {
            storing: Box::new(storing),
            pending: None,
        }
    }

    pub fn with_pending<Fut>(mut self, pending: Fut) -> Self
    where
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        self.pending = Some(Box::pin(pending));
        self
    }
}

/// Creates storings on demand, once per worker and once more after every recreate.
pub trait DatumStoringFactory<C, D, E>: Send + Sync {
    fn create(&self, context: &C, recreate: RecreateSignal) -> Result<CreatedStoring<D, E>, E>;
}

impl<C, D, E, F> DatumStoringFactory<C, D, E> for F
where
    F: Fn(&C, RecreateSignal) -> Result<CreatedStoring<D, E>, E> + Send + Sync,
{
    fn create(&self, context: &C, recreate: RecreateSignal) -> Result<CreatedStoring<D, E>, E> {
        self(context, recreate)
    }
}
