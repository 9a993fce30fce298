//! Working-area geometry shared by the placement checkers
//!
//! Margins are configured for the reading orientation. A landscape sheet is
//! read turned a quarter turn counter-clockwise, so its physical top edge is
//! the reader's left, its physical right edge the reader's top, and so on.

use crate::config::MarginConfig;
use crate::document::{Orientation, PageModel};
use shared_types::{MarginSide, Rect};

/// Reading-orientation side that a physical page edge corresponds to
pub fn reading_side(orientation: Orientation, physical: MarginSide) -> MarginSide {
    match orientation {
        Orientation::Portrait => physical,
        Orientation::Landscape => match physical {
            MarginSide::Top => MarginSide::Left,
            MarginSide::Right => MarginSide::Top,
            MarginSide::Bottom => MarginSide::Right,
            MarginSide::Left => MarginSide::Bottom,
        },
    }
}

/// Required margin in points along a physical page edge
pub fn physical_margin_pt(
    orientation: Orientation,
    margins: &MarginConfig,
    physical: MarginSide,
) -> f64 {
    margins.required_pt(reading_side(orientation, physical))
}

/// Page rectangle left after subtracting the four required margins
pub fn working_area(page: &dyn PageModel, margins: &MarginConfig) -> Rect {
    let orientation = page.orientation();
    let m = |side| physical_margin_pt(orientation, margins, side);
    Rect::new(
        m(MarginSide::Left),
        m(MarginSide::Top),
        page.width() - m(MarginSide::Right),
        page.height() - m(MarginSide::Bottom),
    )
}
