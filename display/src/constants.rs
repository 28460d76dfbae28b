use pokip8_core::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// Width of the physical display in pixels
pub const PHYSICAL_WIDTH: usize = 80;
/// Height of the physical display in pixels
pub const PHYSICAL_HEIGHT: usize = 64;
/// Pixels on the physical display
pub const PHYSICAL_PIXELS: usize = PHYSICAL_WIDTH * PHYSICAL_HEIGHT;

/// Dead zone to the left and right of the game area
pub const MARGIN_X: usize = (PHYSICAL_WIDTH - DISPLAY_WIDTH) / 2;
/// Dead zone above and below the game area
pub const MARGIN_Y: usize = (PHYSICAL_HEIGHT - DISPLAY_HEIGHT) / 2;

/// RGB565 white, the colour of a set pixel
pub const WHITE: u16 = 0xFFFF;
/// RGB565 black, the colour of unset pixels and the dead zone
pub const BLACK: u16 = 0x0000;

/// One physical frame, row-major, each pixel RGB565 in the transport's byte order
pub type PhysicalFrame = [u16; PHYSICAL_PIXELS];

/// An overlay layer, row-major, each pixel packed as `0xAARRGGBB`
pub type OverlayBuffer = [u32; PHYSICAL_PIXELS];
