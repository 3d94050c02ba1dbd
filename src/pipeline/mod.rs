pub mod adapter;
pub mod batch;
pub mod progress;

pub use adapter::ImagePipeline;
pub use batch::{BatchEvent, BatchPipeline, BatchReport, BatchStop, CancelHandle, PageJob, PageSlots};
pub use progress::ProgressTicker;
