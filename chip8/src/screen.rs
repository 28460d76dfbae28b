use std::error::Error;

use sdl2::pixels::PixelFormatEnum;

use pokip8_display::constants::{PhysicalFrame, PHYSICAL_HEIGHT, PHYSICAL_WIDTH};

/// # Screen
/// Stands in for the handheld's 80x64 panel: an SDL2 window showing physical frames, each
/// pixel scaled up to a `scale`-sized square.
pub struct Screen {
    canvas: sdl2::render::WindowCanvas,
}

impl Screen {
    /// Creates a window bound to an sdl2 context.
    ///
    /// # Arguments
    /// * `sdl` an sdl2 context with which to draw
    /// * `scale` the size multiplier for each pixel
    pub fn new(sdl: &sdl2::Sdl, scale: u32) -> Result<Self, Box<dyn Error>> {
        let video_subsystem = sdl.video()?;
        let window = video_subsystem
            .window(
                "pokip8",
                PHYSICAL_WIDTH as u32 * scale,
                PHYSICAL_HEIGHT as u32 * scale,
            )
            .position_centered()
            .build()?;
        let canvas = window.into_canvas().build()?;
        Ok(Screen { canvas })
    }

    /// Converts a physical frame from the panel's byte order to an SDL2 RGB565 texture.
    ///
    /// The panel gets every pixel byte-swapped; SDL2 wants packed pixels in native order, so
    /// each pixel is swapped back.
    ///
    /// # Arguments
    /// * `frame` a physical frame as sent to the transport
    fn frame_to_sdl_texture(frame: &PhysicalFrame) -> Vec<u8> {
        let mut texture = Vec::with_capacity(frame.len() * 2);
        for pixel in frame.iter() {
            texture.extend_from_slice(&pixel.swap_bytes().to_ne_bytes());
        }
        texture
    }

    /// Shows a physical frame.
    ///
    /// # Arguments
    /// * `frame` a physical frame as sent to the transport
    pub fn render(&mut self, frame: &PhysicalFrame) -> Result<(), Box<dyn Error>> {
        let texture_creator = self.canvas.texture_creator();
        let mut texture = texture_creator.create_texture_streaming(
            PixelFormatEnum::RGB565,
            PHYSICAL_WIDTH as u32,
            PHYSICAL_HEIGHT as u32,
        )?;
        texture.update(None, &Screen::frame_to_sdl_texture(frame), PHYSICAL_WIDTH * 2)?;

        self.canvas.copy(&texture, None, None)?;
        self.canvas.present();
        Ok(())
    }
}
