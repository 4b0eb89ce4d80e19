// src/pipeline/transform.rs

use super::control_flow::ControlFlow;
use super::storing::{CreatedStoring, DatumStoring, DatumStoringFactory, RecreateSignal};

/// Transforms every datum before handing it to the downstream storing.
///
/// Pause/resume requests of the downstream storing travel through unchanged since
/// both share the same [`ControlFlow`].
pub struct MapStoring<T, E, M> {
    transform: M,
    next: Box<dyn DatumStoring<T, E>>,
}

impl<T, E, M> MapStoring<T, E, M> {
    pub fn new(transform: M, next: Box<dyn DatumStoring<T, E>>) -> Self {
        Self { transform, next }
    }
}

impl<D, T, E, M> DatumStoring<D, E> for MapStoring<T, E, M>
where
    M: FnMut(&D) -> T + Send,
{
    fn process(&mut self, datum: &D, control_flow: &ControlFlow) -> Result<(), E> {
        let transformed = (self.transform)(datum);
        self.next.process(&transformed, control_flow)
    }

    fn end(self: Box<Self>) -> Result<(), E> {
        self.next.end()
    }
}

/// Factory that wraps every storing of `next` in a [`MapStoring`].
///
/// `transformer_factory` runs once per created storing with the shared context, so
/// a transformer may hold state scoped to that storing's lifetime.
pub struct MapFactory<G, N> {
    transformer_factory: G,
    next: N,
}

/// Lifts a factory of `T` storings into a factory of `D` storings.
pub fn map_factory<G, N>(transformer_factory: G, next: N) -> MapFactory<G, N> {
    MapFactory {
        transformer_factory,
        next,
    }
}

impl<C, D, T, E, G, M, N> DatumStoringFactory<C, D, E> for MapFactory<G, N>
where
    G: Fn(&C) -> M + Send + Sync,
    M: FnMut(&D) -> T + Send + 'static,
    N: DatumStoringFactory<C, T, E>,
    T: 'static,
    E: 'static,
{
    fn create(&self, context: &C, recreate: RecreateSignal) -> Result<CreatedStoring<D, E>, E> {
        let CreatedStoring { storing, pending } = self.next.create(context, recreate)?;
        let transform = (self.transformer_factory)(context);
        Ok(CreatedStoring {
            storing: Box::new(MapStoring::new(transform, storing)),
            pending,
        })
    }
}
