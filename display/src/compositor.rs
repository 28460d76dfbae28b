use pokip8_core::GraphicsPlane;

use crate::constants::{
    OverlayBuffer, PhysicalFrame, BLACK, MARGIN_X, MARGIN_Y, PHYSICAL_PIXELS, PHYSICAL_WIDTH,
    WHITE,
};
use pokip8_core::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// # Compositor
/// Turns a 64x32 graphics plane into an 80x64 physical frame.
///
/// The game area sits in the middle of the physical display with an 8 pixel dead zone to the
/// left and right and a 16 pixel dead zone above and below:
/// ```text
///  0      8                              72     80
///  +------+------------------------------+------+ 0
///  |                 dead zone                  |
///  +      +------------------------------+      + 16
///  |      |          64x32 plane         |      |
///  +      +------------------------------+      + 48
///  |                 dead zone                  |
///  +--------------------------------------------+ 64
/// ```
/// Set pixels are white and everything else black, in RGB565. An optional overlay is blended
/// over the whole display, then every pixel is byte-swapped for the transport.
///
/// The output frame is allocated once and reused for every pass.
pub struct Compositor {
    scratch: Box<PhysicalFrame>,
}

impl Compositor {
    pub fn new() -> Self {
        Compositor {
            scratch: Box::new([BLACK; PHYSICAL_PIXELS]),
        }
    }

    /// Renders `plane` and the optional `overlay` into the scratch frame and returns it.
    ///
    /// # Arguments
    /// * `plane` the graphics plane to scale
    /// * `overlay` an ARGB layer covering the whole physical display
    pub fn compose(
        &mut self,
        plane: &GraphicsPlane,
        overlay: Option<&OverlayBuffer>,
    ) -> &PhysicalFrame {
        for (index, pixel) in self.scratch.iter_mut().enumerate() {
            let mut colour = sample(plane, index % PHYSICAL_WIDTH, index / PHYSICAL_WIDTH);
            if let Some(overlay) = overlay {
                colour = blend(colour, overlay[index]);
            }
            *pixel = colour.swap_bytes();
        }
        &self.scratch
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

/// Colour of the physical pixel at (x, y) before any overlay
fn sample(plane: &GraphicsPlane, x: usize, y: usize) -> u16 {
    let in_game_area = (MARGIN_X..MARGIN_X + DISPLAY_WIDTH).contains(&x)
        && (MARGIN_Y..MARGIN_Y + DISPLAY_HEIGHT).contains(&y);
    if in_game_area && plane[y - MARGIN_Y][x - MARGIN_X] != 0 {
        WHITE
    } else {
        BLACK
    }
}

/// Mixes an ARGB overlay pixel over an RGB565 background.
///
/// Alpha is squeezed into 128..=255 so the background is always at least half covered.
fn blend(background: u16, overlay: u32) -> u16 {
    let background = u32::from(background);
    let br = ((background >> 11) & 0x1F) << 3;
    let bg = ((background >> 5) & 0x3F) << 2;
    let bb = (background & 0x1F) << 3;

    let alpha = ((overlay >> 24) & 0xFF) / 2 + 128;
    let or = (overlay >> 16) & 0xFF;
    let og = (overlay >> 8) & 0xFF;
    let ob = overlay & 0xFF;

    let r = br * (256 - alpha) + or * alpha;
    let g = bg * (256 - alpha) + og * alpha;
    let b = bb * (256 - alpha) + ob * alpha;

    (((r >> 11) << 11) | ((g >> 10) << 5) | (b >> 11)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PHYSICAL_HEIGHT;
    use pokip8_core::state::BLANK_PLANE;

    fn at(frame: &PhysicalFrame, x: usize, y: usize) -> u16 {
        frame[y * PHYSICAL_WIDTH + x]
    }

    #[test]
    fn test_lit_plane_leaves_dead_zone_black() {
        let mut compositor = Compositor::new();
        let plane = [[1; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        let frame = compositor.compose(&plane, None);
        for y in 0..PHYSICAL_HEIGHT {
            for x in 0..PHYSICAL_WIDTH {
                let in_game_area = x >= 8 && x < 72 && y >= 16 && y < 48;
                let expected = if in_game_area { WHITE } else { BLACK };
                assert_eq!(at(frame, x, y), expected, "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_game_area_corners_map_to_plane_corners() {
        let mut compositor = Compositor::new();
        let mut plane = BLANK_PLANE;
        plane[0][0] = 1;
        plane[DISPLAY_HEIGHT - 1][DISPLAY_WIDTH - 1] = 1;
        let frame = compositor.compose(&plane, None);
        assert_eq!(at(frame, 8, 16), WHITE);
        assert_eq!(at(frame, 71, 47), WHITE);
        assert_eq!(at(frame, 9, 16), BLACK);
        assert_eq!(at(frame, 7, 16), BLACK);
        assert_eq!(at(frame, 72, 47), BLACK);
        assert_eq!(at(frame, 71, 48), BLACK);
    }

    #[test]
    fn test_transparent_overlay_darkens_by_half() {
        assert_eq!(blend(WHITE, 0x0000_0000), 0x7BEF);
        assert_eq!(blend(BLACK, 0x0000_0000), BLACK);
    }

    #[test]
    fn test_opaque_overlay_replaces_background() {
        assert_eq!(blend(BLACK, 0xFFFF_FFFF), WHITE);
        assert_eq!(blend(WHITE, 0xFF00_0000), 0x0000);
        assert_eq!(blend(BLACK, 0xFFFF_0000), 0xF800);
        assert_eq!(blend(BLACK, 0xFF00_FF00), 0x07E0);
        assert_eq!(blend(BLACK, 0xFF00_00FF), 0x001F);
    }

    #[test]
    fn test_output_is_byte_swapped() {
        let mut compositor = Compositor::new();
        let plane = [[1; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        let overlay = [0x0000_0000; PHYSICAL_PIXELS];
        let frame = compositor.compose(&plane, Some(&overlay));
        assert_eq!(at(frame, 8, 16), 0xEF7B);
        assert_eq!(at(frame, 0, 0), BLACK);
    }

    #[test]
    fn test_overlay_covers_dead_zone() {
        let mut compositor = Compositor::new();
        let overlay = [0xFFFF_FFFF; PHYSICAL_PIXELS];
        let frame = compositor.compose(&BLANK_PLANE, Some(&overlay));
        assert!(frame.iter().all(|&pixel| pixel == WHITE));
    }
}
