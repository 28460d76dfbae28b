use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unable to start the render task: {0}")]
    Spawn(#[from] io::Error),

    #[error("the render task panicked")]
    RenderTaskPanicked,
}
