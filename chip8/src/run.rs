use std::error::Error;
use std::time::Instant;

use log::info;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use pokip8_core::Chip8;
use pokip8_display::FramePipeline;

use crate::config::Config;
use crate::keymap::keymap;
use crate::latest::LatestFrame;
use crate::menu;
use crate::screen::Screen;

/// Runs `chip8` in an SDL2 window until it is closed.
///
/// The render task runs on its own thread; SDL2 windows can't leave the main thread, so finished
/// frames come back through a latest-frame slot to be shown here.
pub fn run(mut chip8: Chip8, config: &Config) -> Result<(), Box<dyn Error>> {
    let sdl = sdl2::init()?;
    let mut screen = Screen::new(&sdl, config.scale)?;
    let mut events = sdl.event_pump()?;

    let latest = LatestFrame::new();
    let mut pipeline = FramePipeline::spawn(latest.transport())?;
    pipeline.present_frame(chip8.graphics());

    let mut last_cycle = Instant::now();
    let mut paused = false;

    'event: loop {
        // Show the newest finished frame
        if let Some(frame) = latest.take() {
            screen.render(&frame)?;
        }

        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => break 'event,
                Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    repeat: false,
                    ..
                } => {
                    paused = !paused;
                    info!("{}", if paused { "paused" } else { "resumed" });
                    if paused {
                        pipeline.present_with_overlay(chip8.graphics(), menu::pause_overlay());
                    } else {
                        pipeline.present_frame(chip8.graphics());
                    }
                }
                Event::KeyDown {
                    keycode: Some(key), ..
                } => {
                    if let Some(kc) = keymap(key) {
                        chip8.key_press(kc);
                    }
                }
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    if let Some(kc) = keymap(key) {
                        chip8.key_release(kc);
                    }
                }
                _ => continue,
            };
        }

        // Update state
        if !paused {
            chip8.step();
            if chip8.take_draw_flag() {
                pipeline.present_frame(chip8.graphics());
            }
        }

        // Handle timing
        let current_time = Instant::now();
        let elapsed_cycle_time = current_time - last_cycle;
        if config.cycle_time() > elapsed_cycle_time {
            std::thread::sleep(config.cycle_time() - elapsed_cycle_time);
        }
        last_cycle = Instant::now();
    }

    pipeline.shutdown()?;
    Ok(())
}
