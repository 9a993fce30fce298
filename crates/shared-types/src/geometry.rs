//! Page geometry in points, top-left origin (y grows downward)

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box `(x0, y0)`-`(x1, y1)` with `x0 <= x1`, `y0 <= y1`
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center_x(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x0, self.y0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Smallest box containing both
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// True when `other` lies inside `self`, allowing `tolerance` points of overhang
    pub fn contains_rect(&self, other: &Rect, tolerance: f64) -> bool {
        other.x0 >= self.x0 - tolerance
            && other.y0 >= self.y0 - tolerance
            && other.x1 <= self.x1 + tolerance
            && other.y1 <= self.y1 + tolerance
    }

    /// Union of all boxes, `None` for an empty iterator
    pub fn union_all<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects.into_iter().fold(None, |acc, r| match acc {
            None => Some(*r),
            Some(u) => Some(u.union(r)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_all() {
        let rects = [
            Rect::new(10.0, 10.0, 20.0, 20.0),
            Rect::new(5.0, 15.0, 12.0, 40.0),
        ];
        assert_eq!(
            Rect::union_all(&rects),
            Some(Rect::new(5.0, 10.0, 20.0, 40.0))
        );
        assert_eq!(Rect::union_all(&[]), None);
    }

    #[test]
    fn test_contains_rect_with_tolerance() {
        let area = Rect::new(0.0, 0.0, 100.0, 100.0);
        let overhang = Rect::new(-1.0, 0.0, 50.0, 50.0);
        assert!(!area.contains_rect(&overhang, 0.0));
        assert!(area.contains_rect(&overhang, 2.0));
    }
}
