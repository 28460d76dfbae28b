use crate::constants::PhysicalFrame;

/// The device end of the render task.
///
/// Receives one complete, byte-order-converted frame per render pass. Sending is synchronous
/// and cannot fail from the pipeline's point of view; a transport that can fail must deal with
/// it itself.
pub trait DisplayTransport: Send {
    fn send_frame(&mut self, frame: &PhysicalFrame);
}

impl<F> DisplayTransport for F
where
    F: FnMut(&PhysicalFrame) + Send,
{
    fn send_frame(&mut self, frame: &PhysicalFrame) {
        self(frame)
    }
}
