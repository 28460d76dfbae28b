use log::{debug, info};

use pokip8_core::Chip8;
use pokip8_display::constants::{
    PhysicalFrame, BLACK, PHYSICAL_HEIGHT, PHYSICAL_PIXELS, PHYSICAL_WIDTH,
};
use pokip8_display::FramePipeline;

use crate::latest::LatestFrame;

/// Runs the interpreter without a window and prints the last physical frame as text.
///
/// # Arguments
/// * `chip8` an interpreter with a program loaded
/// * `cycles` how many steps to run
pub fn run(chip8: &mut Chip8, cycles: u64) {
    let frame = run_frames(chip8, cycles);
    print!("{}", frame_to_text(&frame));
}

/// Runs `cycles` steps, rendering on this thread, and returns the last frame the transport
/// received.
fn run_frames(chip8: &mut Chip8, cycles: u64) -> Box<PhysicalFrame> {
    let latest = LatestFrame::new();
    let (mut pipeline, mut task) = FramePipeline::new(latest.transport());

    let mut presented = 0;
    for _ in 0..cycles {
        chip8.step();
        if chip8.take_draw_flag() {
            pipeline.present_frame(chip8.graphics());
            task.render_next();
            presented += 1;
        }
    }
    // End on the current plane even if nothing was drawn
    pipeline.present_frame(chip8.graphics());
    task.render_next();
    info!("ran {} cycles, {} frames presented", cycles, presented + 1);

    let frame = latest
        .take()
        .unwrap_or_else(|| Box::new([BLACK; PHYSICAL_PIXELS]));
    let lit = frame.iter().filter(|&&pixel| pixel != BLACK).count();
    debug!("last frame has {} pixels lit", lit);
    frame
}

/// One line per physical row, `#` for a lit pixel and `.` for a dark one
fn frame_to_text(frame: &PhysicalFrame) -> String {
    let mut text = String::with_capacity((PHYSICAL_WIDTH + 1) * PHYSICAL_HEIGHT);
    for row in frame.chunks(PHYSICAL_WIDTH) {
        text.extend(row.iter().map(|&pixel| if pixel == BLACK { '.' } else { '#' }));
        text.push('\n');
    }
    text
}
