pub use compositor::Compositor;
pub use constants::{OverlayBuffer, PhysicalFrame};
pub use error::PipelineError;
pub use pipeline::{FramePipeline, RenderTask};
pub use transport::DisplayTransport;

mod compositor;
pub mod constants;
mod error;
mod pipeline;
mod transport;
