pub mod config;
pub mod pool;
pub mod processor;
pub mod types;

pub use config::{CONCURRENCY_ENV, Config, ConfigBuilder, effective_concurrency};
pub use pool::{WorkerPool, iterate_in_parallel, iterate_in_parallel_with_context};
pub use processor::{FnProcessor, ParallelProcessor};
pub use types::ParallelError;

#[cfg(test)]
mod tests;
