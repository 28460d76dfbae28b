use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, error, info, trace};
use pokip8_core::state::{GraphicsPlane, BLANK_PLANE};

use crate::compositor::Compositor;
use crate::constants::OverlayBuffer;
use crate::error::PipelineError;
use crate::transport::DisplayTransport;

/// Which buffers are spoken for, and whether a render has been asked for.
///
/// A buffer named by `ready` or `reading` belongs to the render task; any other buffer belongs
/// to the writer. The writer only touches a buffer while it holds this lock and never the one
/// in `reading`, so the render task can read its buffer without racing a present.
#[derive(Default)]
struct Handoff {
    /// Presented and not yet picked up; a newer present replaces it
    ready: Option<usize>,
    /// Being composited right now
    reading: Option<usize>,
    /// Travels with `ready` and is dropped at the end of the pass that consumes it
    overlay: Option<Arc<OverlayBuffer>>,
    shutdown: bool,
}

struct Shared {
    buffers: [Mutex<GraphicsPlane>; 2],
    handoff: Mutex<Handoff>,
    render_signal: Condvar,
}

impl Shared {
    /// The data behind every lock here is plain pixels, so a panic elsewhere can't leave it
    /// in a state worth refusing to read
    fn handoff(&self) -> MutexGuard<'_, Handoff> {
        self.handoff.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn buffer(&self, index: usize) -> MutexGuard<'_, GraphicsPlane> {
        self.buffers[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// # Frame pipeline
/// Double buffers frames between the host loop and a render task.
///
/// `present_frame` copies the host's graphics plane into the writer's buffer, hands that
/// buffer to the render task and swaps to the other one. If the render task is still busy when
/// another frame is presented, the frame it hasn't picked up yet is replaced; frames get
/// dropped, never torn. Presenting never waits for a render pass.
///
/// Dropping the pipeline shuts the render task down and joins it before the buffers go away.
pub struct FramePipeline {
    shared: Arc<Shared>,
    active: usize,
    render_thread: Option<JoinHandle<()>>,
}

impl FramePipeline {
    /// Creates a pipeline and the render task that consumes it, for the caller to run
    ///
    /// # Arguments
    /// * `transport` where finished physical frames are sent
    pub fn new<T: DisplayTransport>(transport: T) -> (Self, RenderTask<T>) {
        let shared = Arc::new(Shared {
            buffers: [Mutex::new(BLANK_PLANE), Mutex::new(BLANK_PLANE)],
            handoff: Mutex::new(Handoff::default()),
            render_signal: Condvar::new(),
        });
        let pipeline = FramePipeline {
            shared: Arc::clone(&shared),
            active: 0,
            render_thread: None,
        };
        let task = RenderTask {
            shared,
            compositor: Compositor::new(),
            transport,
        };
        (pipeline, task)
    }

    /// Creates a pipeline with its render task running on a dedicated thread
    ///
    /// # Arguments
    /// * `transport` where finished physical frames are sent
    pub fn spawn<T: DisplayTransport + 'static>(transport: T) -> Result<Self, PipelineError> {
        let (mut pipeline, task) = Self::new(transport);
        let handle = thread::Builder::new()
            .name("render".into())
            .spawn(move || task.run())?;
        pipeline.render_thread = Some(handle);
        info!("render task started");
        Ok(pipeline)
    }

    /// Index of the buffer the next present will fill
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Hands `plane` to the render task
    pub fn present_frame(&mut self, plane: &GraphicsPlane) {
        self.present(plane, None);
    }

    /// Hands `plane` to the render task with `overlay` composited on top for this one frame
    pub fn present_with_overlay(&mut self, plane: &GraphicsPlane, overlay: Arc<OverlayBuffer>) {
        self.present(plane, Some(overlay));
    }

    fn present(&mut self, plane: &GraphicsPlane, overlay: Option<Arc<OverlayBuffer>>) {
        let mut handoff = self.shared.handoff();
        debug_assert!(!handoff.shutdown, "present after shutdown");

        // The render task may still hold the buffer we were going to fill; the other one
        // is then either free or a ready frame it hasn't picked up yet.
        let target = if handoff.reading == Some(self.active) {
            1 - self.active
        } else {
            self.active
        };
        if handoff.ready.is_some() {
            debug!("render task behind; dropping pending frame");
        }

        *self.shared.buffer(target) = *plane;
        handoff.ready = Some(target);
        handoff.overlay = overlay;
        self.active = 1 - target;
        drop(handoff);

        trace!("presented buffer {}", target);
        self.shared.render_signal.notify_one();
    }

    /// Stops the render task and waits for it to finish the pass it is in, if any.
    /// No further frames are rendered.
    pub fn shutdown(mut self) -> Result<(), PipelineError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), PipelineError> {
        self.shared.handoff().shutdown = true;
        self.shared.render_signal.notify_all();
        match self.render_thread.take() {
            Some(handle) => {
                handle
                    .join()
                    .map_err(|_| PipelineError::RenderTaskPanicked)?;
                info!("render task stopped");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for FramePipeline {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            error!("{}", err);
        }
    }
}

/// # Render task
/// Waits for presented frames, composites them and sends them to the transport.
pub struct RenderTask<T> {
    shared: Arc<Shared>,
    compositor: Compositor,
    transport: T,
}

impl<T: DisplayTransport> RenderTask<T> {
    /// Renders frames until the pipeline shuts down
    pub fn run(mut self) {
        while self.render_next().is_some() {}
        debug!("render task exiting");
    }

    /// Blocks until a frame is presented, then renders it.
    /// Returns the index of the buffer rendered, or `None` once the pipeline is shutting down.
    pub fn render_next(&mut self) -> Option<usize> {
        let (index, overlay) = {
            let mut handoff = self.shared.handoff();
            loop {
                if handoff.shutdown {
                    return None;
                }
                if let Some(index) = handoff.ready.take() {
                    handoff.reading = Some(index);
                    break (index, handoff.overlay.take());
                }
                handoff = self
                    .shared
                    .render_signal
                    .wait(handoff)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        {
            let plane = self.shared.buffer(index);
            let frame = self.compositor.compose(&plane, overlay.as_deref());
            self.transport.send_frame(frame);
        }
        drop(overlay);

        self.shared.handoff().reading = None;
        trace!("rendered buffer {}", index);
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PhysicalFrame, BLACK, PHYSICAL_PIXELS, PHYSICAL_WIDTH, WHITE};
    use std::sync::{mpsc, Barrier};

    fn lit_plane() -> GraphicsPlane {
        let mut plane = BLANK_PLANE;
        plane[0][0] = 1;
        plane
    }

    /// A transport that forwards the top-left game pixel of every frame it gets
    fn probe() -> (impl DisplayTransport, mpsc::Receiver<u16>) {
        let (tx, rx) = mpsc::channel();
        let transport = move |frame: &PhysicalFrame| {
            let _ = tx.send(frame[16 * PHYSICAL_WIDTH + 8]);
        };
        (transport, rx)
    }

    #[test]
    fn test_present_swaps_active_buffer() {
        let (mut pipeline, mut task) = FramePipeline::new(|_: &PhysicalFrame| {});
        for _ in 0..4 {
            let before = pipeline.active_index();
            pipeline.present_frame(&BLANK_PLANE);
            let rendered = task.render_next();
            assert_eq!(rendered, Some(before));
            assert_ne!(pipeline.active_index(), before);
        }
    }

    #[test]
    fn test_active_buffer_alternates_with_period_two() {
        let (mut pipeline, _task) = FramePipeline::new(|_: &PhysicalFrame| {});
        let mut seen = vec![pipeline.active_index()];
        for _ in 0..6 {
            pipeline.present_frame(&BLANK_PLANE);
            seen.push(pipeline.active_index());
        }
        assert_eq!(seen, vec![0, 1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_render_task_sees_presented_frame() {
        let (transport, frames) = probe();
        let (mut pipeline, mut task) = FramePipeline::new(transport);
        pipeline.present_frame(&lit_plane());
        task.render_next();
        assert_eq!(frames.try_recv(), Ok(WHITE));
    }

    #[test]
    fn test_pending_frame_is_replaced_by_newer_one() {
        let (transport, frames) = probe();
        let (mut pipeline, mut task) = FramePipeline::new(transport);
        pipeline.present_frame(&lit_plane());
        pipeline.present_frame(&BLANK_PLANE);
        task.render_next();
        assert_eq!(frames.try_recv(), Ok(BLACK));
        assert!(frames.try_recv().is_err());
    }

    #[test]
    fn test_writer_avoids_buffer_being_read() {
        let (mut pipeline, task) = FramePipeline::new(|_: &PhysicalFrame| {});
        pipeline.present_frame(&BLANK_PLANE);
        // Pretend the render task picked up buffer 0 and is still compositing it
        {
            let mut handoff = task.shared.handoff();
            handoff.reading = handoff.ready.take();
        }
        assert_eq!(pipeline.active_index(), 1);
        pipeline.present_frame(&lit_plane());
        pipeline.present_frame(&lit_plane());
        let handoff = task.shared.handoff();
        assert_eq!(handoff.reading, Some(0));
        assert_eq!(handoff.ready, Some(1));
        assert_eq!(*task.shared.buffer(0), BLANK_PLANE);
    }

    #[test]
    fn test_overlay_lasts_one_render_cycle() {
        let (transport, frames) = probe();
        let (mut pipeline, mut task) = FramePipeline::new(transport);
        let overlay = Arc::new([0xFFFF_FFFF; PHYSICAL_PIXELS]);

        pipeline.present_with_overlay(&BLANK_PLANE, Arc::clone(&overlay));
        task.render_next();
        assert_eq!(frames.try_recv(), Ok(WHITE));
        // The pipeline no longer holds the overlay
        assert_eq!(Arc::strong_count(&overlay), 1);

        pipeline.present_frame(&BLANK_PLANE);
        task.render_next();
        assert_eq!(frames.try_recv(), Ok(BLACK));
    }

    #[test]
    fn test_plain_present_clears_pending_overlay() {
        let (transport, frames) = probe();
        let (mut pipeline, mut task) = FramePipeline::new(transport);
        let overlay = Arc::new([0xFFFF_FFFF; PHYSICAL_PIXELS]);
        pipeline.present_with_overlay(&BLANK_PLANE, Arc::clone(&overlay));
        pipeline.present_frame(&BLANK_PLANE);
        assert_eq!(Arc::strong_count(&overlay), 1);
        task.render_next();
        assert_eq!(frames.try_recv(), Ok(BLACK));
    }

    #[test]
    fn test_shutdown_stops_render_task_without_rendering() {
        let (transport, frames) = probe();
        let (mut pipeline, mut task) = FramePipeline::new(transport);
        pipeline.present_frame(&lit_plane());
        pipeline.shutdown().expect("no render thread to join");
        assert_eq!(task.render_next(), None);
        assert!(frames.try_recv().is_err());
    }

    #[test]
    fn test_spawned_render_task_renders_and_shuts_down() {
        let (transport, frames) = probe();
        let mut pipeline = FramePipeline::spawn(transport).expect("render thread should start");
        pipeline.present_frame(&lit_plane());
        assert_eq!(frames.recv(), Ok(WHITE));
        pipeline.shutdown().expect("render thread should stop cleanly");
        // The transport went away with the render task
        assert!(frames.recv().is_err());
    }

    #[test]
    fn test_shutdown_wakes_idle_render_task() {
        let (pipeline, task) = FramePipeline::new(|_: &PhysicalFrame| {});
        let worker = thread::spawn(move || task.run());
        drop(pipeline);
        worker.join().expect("render task should exit");
    }

    #[test]
    fn test_shutdown_mid_pass_delivers_that_frame_only() {
        let entered = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));
        let (tx, frames) = mpsc::channel();
        let transport = {
            let entered = Arc::clone(&entered);
            let release = Arc::clone(&release);
            move |frame: &PhysicalFrame| {
                entered.wait();
                release.wait();
                let _ = tx.send(frame[16 * PHYSICAL_WIDTH + 8]);
            }
        };
        let mut pipeline = FramePipeline::spawn(transport).expect("render thread should start");
        let shared = Arc::clone(&pipeline.shared);

        pipeline.present_frame(&lit_plane());
        // The render task is now inside the transport with the lit frame
        entered.wait();
        pipeline.present_frame(&BLANK_PLANE);
        let stopper = thread::spawn(move || pipeline.shutdown());
        while !shared.handoff().shutdown {
            thread::yield_now();
        }
        release.wait();

        stopper
            .join()
            .expect("shutdown should not panic")
            .expect("render thread should stop cleanly");
        assert_eq!(frames.recv(), Ok(WHITE));
        // The blank frame was pending at shutdown and never rendered
        assert!(frames.recv().is_err());
        assert_eq!(shared.handoff().ready, Some(1));
    }

    #[test]
    fn test_concurrent_frames_are_never_torn() {
        let (tx, rx) = mpsc::channel();
        let transport = move |frame: &PhysicalFrame| {
            let first = frame[16 * PHYSICAL_WIDTH + 8];
            let mut game_area =
                (16..48).flat_map(move |y| (8..72).map(move |x| frame[y * PHYSICAL_WIDTH + x]));
            let _ = tx.send(game_area.all(|pixel| pixel == first));
        };
        let mut pipeline = FramePipeline::spawn(transport).expect("render thread should start");
        let full = [[1; 64]; 32];
        for n in 0..500 {
            let plane = if n % 2 == 0 { full } else { BLANK_PLANE };
            pipeline.present_frame(&plane);
        }
        pipeline.shutdown().expect("render thread should stop cleanly");
        assert!(rx.iter().all(|uniform| uniform));
    }
}
