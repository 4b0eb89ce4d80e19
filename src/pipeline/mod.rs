pub mod control_flow;
pub mod runner;
pub mod storing;
pub mod transform;
pub mod types;

pub use control_flow::ControlFlow;
pub use runner::{BufferedPipeline, run_pipeline_with_buffered_data};
pub use storing::{
    CreatedStoring, DatumStoring, DatumStoringFactory, FnStoring, PendingResult, RecreateSignal,
};
pub use transform::{MapFactory, MapStoring, map_factory};
pub use types::PipelineError;
