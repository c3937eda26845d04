//! Shared fixtures for the chaser benchmarks

use chaser_core::Frame;

/// Mono frame with a filled ball of `radius` centered at `(cx, cy)`
pub fn ball_frame(width: usize, height: usize, cx: usize, cy: usize, radius: usize) -> Frame {
    let mut pixels = vec![30u8; width * height];
    let r2 = (radius * radius) as isize;
    for y in cy.saturating_sub(radius)..(cy + radius + 1).min(height) {
        for x in cx.saturating_sub(radius)..(cx + radius + 1).min(width) {
            let (dx, dy) = (x as isize - cx as isize, y as isize - cy as isize);
            if dx * dx + dy * dy <= r2 {
                pixels[y * width + x] = 255;
            }
        }
    }
    Frame::mono8(height, width, pixels)
}

/// Mono frame with no target at all, forcing a full scan
pub fn dark_frame(width: usize, height: usize) -> Frame {
    Frame::mono8(height, width, vec![30u8; width * height])
}

/// Packed RGB frame with a white ball, three bytes per pixel
pub fn rgb_ball_frame(width: usize, height: usize, cx: usize, cy: usize, radius: usize) -> Frame {
    let mono = ball_frame(width, height, cx, cy, radius);
    let pixels: Vec<u8> = mono.pixels().iter().flat_map(|&p| [p, p, p]).collect();
    Frame::rgb8(height, width, pixels)
}
