use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pokip8_display::constants::PhysicalFrame;
use pokip8_display::DisplayTransport;

/// # Latest frame
/// Holds the most recent frame the render task finished, for a consumer that picks frames up
/// at its own pace. A new frame replaces one that hasn't been taken yet, so the consumer always
/// gets the newest frame and a frame can only be lost to a newer one.
#[derive(Clone, Default)]
pub struct LatestFrame {
    slot: Arc<Mutex<Option<Box<PhysicalFrame>>>>,
}

impl LatestFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that stores every frame it is sent into this slot
    pub fn transport(&self) -> impl DisplayTransport + 'static {
        let latest = self.clone();
        move |frame: &PhysicalFrame| {
            *latest.slot() = Some(Box::new(*frame));
        }
    }

    /// Takes the newest frame, if one arrived since the last take
    pub fn take(&self) -> Option<Box<PhysicalFrame>> {
        self.slot().take()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Box<PhysicalFrame>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::pause_overlay;
    use pokip8_core::state::BLANK_PLANE;
    use pokip8_display::constants::{BLACK, PHYSICAL_PIXELS, WHITE};
    use pokip8_display::{Compositor, FramePipeline};

    #[test]
    fn test_newer_frame_replaces_untaken_one() {
        let latest = LatestFrame::new();
        let mut transport = latest.transport();
        transport.send_frame(&[BLACK; PHYSICAL_PIXELS]);
        transport.send_frame(&[WHITE; PHYSICAL_PIXELS]);

        let frame = latest.take().expect("a frame was sent");
        assert!(frame.iter().all(|&pixel| pixel == WHITE));
        assert!(latest.take().is_none());
    }

    #[test]
    fn test_frame_after_take_is_kept() {
        let latest = LatestFrame::new();
        let mut transport = latest.transport();
        transport.send_frame(&[WHITE; PHYSICAL_PIXELS]);
        latest.take();
        transport.send_frame(&[BLACK; PHYSICAL_PIXELS]);
        let frame = latest.take().expect("a frame was sent");
        assert!(frame.iter().all(|&pixel| pixel == BLACK));
    }

    #[test]
    fn test_pause_menu_frame_survives_unshown_game_frame() {
        let latest = LatestFrame::new();
        let (mut pipeline, mut task) = FramePipeline::new(latest.transport());
        // A game frame the host hasn't shown yet, then the pause menu on top
        pipeline.present_frame(&BLANK_PLANE);
        task.render_next();
        let overlay = pause_overlay();
        pipeline.present_with_overlay(&BLANK_PLANE, Arc::clone(&overlay));
        task.render_next();

        let frame = latest.take().expect("a frame was rendered");
        let mut compositor = Compositor::new();
        let expected = compositor.compose(&BLANK_PLANE, Some(&*overlay));
        assert_eq!(frame[..], expected[..]);
    }
}
