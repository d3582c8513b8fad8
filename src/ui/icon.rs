//! Tray icon rendering.

use tray_icon::Icon;

use crate::constants::TRAY_ICON_SIZE;

const BACKGROUND: [u8; 4] = [18, 18, 18, 255];
const LOCKED_FILL: [u8; 4] = [206, 43, 43, 255];
const UNLOCKED_FILL: [u8; 4] = [46, 166, 72, 255];

/// Draw the tray icon as a raw RGBA buffer: dark square with a centered
/// status square, red when locked and green when unlocked.
pub fn tray_icon(locked: bool) -> Icon {
    let size = TRAY_ICON_SIZE;
    let fill = if locked { LOCKED_FILL } else { UNLOCKED_FILL };
    let (lo, hi) = (size / 4, size * 3 / 4);

    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let inside = x >= lo && x < hi && y >= lo && y < hi;
            rgba.extend_from_slice(if inside { &fill } else { &BACKGROUND });
        }
    }

    Icon::from_rgba(rgba, size, size).expect("Failed to create tray icon")
}
