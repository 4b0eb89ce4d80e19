//! # pipeline-rust
//!
//! Bounded-concurrency iteration and buffered sink pipelines built on Tokio.
//!
//! ## Features
//!
//! - **Worker pool** pulling items from a shared cursor with a fixed number of workers
//! - **Per-worker context** created once per worker and finalized when it runs dry
//! - **Buffered pipelines** where each worker lazily acquires a storing and can rotate it
//! - **Backpressure** via nesting-safe pause/resume handles
//! - **Retry helper** for operations that should survive transient failures
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pipeline_rust::pipeline::{
//!     ControlFlow, CreatedStoring, FnStoring, PipelineError, RecreateSignal,
//!     run_pipeline_with_buffered_data,
//! };
//!
//! let factory = |table: &String, _recreate: RecreateSignal| {
//!     let table = table.clone();
//!     Ok::<_, PipelineError>(CreatedStoring::new(FnStoring::new(
//!         move |row: &u32, _control: &ControlFlow| {
//!             println!("{table} <- {row}");
//!             Ok(())
//!         },
//!         || Ok(()),
//!     )))
//! };
//!
//! run_pipeline_with_buffered_data("users".to_string(), factory, &[1, 2, 3], 2).await?;
//! ```
//!
//! ## Modules
//!
//! - [`parallel`] - Bounded worker pool over a slice of items
//! - [`pipeline`] - Buffered pipelines with sink rotation and pause/resume
//! - [`retry`] - Retrying async actions
//! - [`time`] - Delay helper
//! - [`logging`] - Subscriber setup for binaries and tests

pub mod logging;
pub mod parallel;
pub mod pipeline;
pub mod retry;
pub mod time;

pub use parallel::{iterate_in_parallel, iterate_in_parallel_with_context};
pub use pipeline::run_pipeline_with_buffered_data;
