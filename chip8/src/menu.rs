use std::sync::Arc;

use pokip8_display::constants::{OverlayBuffer, PHYSICAL_PIXELS, PHYSICAL_WIDTH};

/// Fully transparent; the compositor still dims the game under it by half
const BACKDROP: u32 = 0x0000_0000;
const PANEL: u32 = 0xC020_2040;
const BORDER: u32 = 0xFFFF_FFFF;

/// Panel bounds as (left, top, right, bottom), exclusive of right and bottom
const PANEL_BOUNDS: (usize, usize, usize, usize) = (16, 20, 64, 44);

/// The pause menu: a bordered panel over the middle of the dimmed game
pub fn pause_overlay() -> Arc<OverlayBuffer> {
    let mut overlay = [BACKDROP; PHYSICAL_PIXELS];
    let (left, top, right, bottom) = PANEL_BOUNDS;
    for y in top..bottom {
        for x in left..right {
            let edge = x == left || x == right - 1 || y == top || y == bottom - 1;
            overlay[y * PHYSICAL_WIDTH + x] = if edge { BORDER } else { PANEL };
        }
    }
    Arc::new(overlay)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_overlay_layout() {
        let overlay = pause_overlay();
        assert_eq!(overlay[0], BACKDROP);
        assert_eq!(overlay[20 * PHYSICAL_WIDTH + 16], BORDER);
        assert_eq!(overlay[43 * PHYSICAL_WIDTH + 63], BORDER);
        assert_eq!(overlay[30 * PHYSICAL_WIDTH + 40], PANEL);
        assert_eq!(overlay[30 * PHYSICAL_WIDTH + 64], BACKDROP);
    }
}
