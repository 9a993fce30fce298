//! Coordinate transformation between layout space and PDF user space
//!
//! Layout coordinates have a top-left origin with y growing downwards, the
//! way text extractors report boxes. PDF user space has a bottom-left origin.

/// Convert a top-left origin point to PDF coordinates within `media_box`
/// (`[x, y, width, height]`)
pub fn top_left_to_pdf(x: f64, y: f64, media_box: [f64; 4]) -> (f64, f64) {
    let [mb_x, mb_y, _, mb_height] = media_box;
    (mb_x + x, mb_y + mb_height - y)
}
