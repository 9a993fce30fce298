use crate::geometry::{Point, Rect};

/// Side of the page a margin measurement refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl MarginSide {
    pub const ALL: [MarginSide; 4] = [
        MarginSide::Left,
        MarginSide::Right,
        MarginSide::Top,
        MarginSide::Bottom,
    ];

    /// Russian label used in annotations and reports
    pub fn label_ru(self) -> &'static str {
        match self {
            MarginSide::Left => "левое",
            MarginSide::Right => "правое",
            MarginSide::Top => "верхнее",
            MarginSide::Bottom => "нижнее",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            MarginSide::Left => "left",
            MarginSide::Right => "right",
            MarginSide::Top => "top",
            MarginSide::Bottom => "bottom",
        }
    }
}

/// What kind of graphic object a placement violation refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphicKind {
    Image,
    Vector,
    Table,
}

impl GraphicKind {
    pub fn label_ru(self) -> &'static str {
        match self {
            GraphicKind::Image => "Изображение",
            GraphicKind::Vector => "Векторный объект",
            GraphicKind::Table => "Таблица",
        }
    }
}

/// Every rule deviation the engine can report
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViolationKind {
    DisallowedQuote {
        character: char,
        /// Character offset in the page text the checker read
        offset: usize,
        context: String,
        /// Name of the extraction strategy that produced the page text
        strategy: String,
    },
    LandscapeOrientation,
    Margin { side: MarginSide, actual_cm: f64, required_cm: f64 },
    PageNumberOnTitlePage,
    PageNumberMissing,
    NoPaginationAnywhere,
    PageNumberMismatch { expected: u32, found: String },
    PageNumberNotCentered { deviation_mm: f64 },
    PageNumberFont { font: String, size: f64 },
    MultiplePageNumberCandidates { count: usize },
    BlankLineAfterPageNumber,
    DoubleSpace,
    GraphicOutsideMargins { graphic: GraphicKind },
    GraphicNotCentered { graphic: GraphicKind, deviation_pt: f64 },
}

/// Where on the page a violation was located
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Point(Point),
    Box(Rect),
}

impl Geometry {
    /// Point a marker for this geometry is anchored at
    pub fn anchor(&self) -> Point {
        match self {
            Geometry::Point(p) => *p,
            Geometry::Box(r) => r.top_left(),
        }
    }
}

/// One detected rule deviation. Pages are 1-indexed.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub page: u32,
    pub geometry: Geometry,
    pub user_message: String,
    pub admin_message: String,
}

/// Annotation stroke color, RGB components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl StrokeColor {
    pub const RED: StrokeColor = StrokeColor {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };
}

/// A marker to place on a page. Coordinates are top-left origin, points.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnnotationRequest {
    pub anchor: Point,
    pub title: String,
    pub body: String,
    pub stroke: Option<StrokeColor>,
}

impl AnnotationRequest {
    pub fn new(anchor: Point, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            anchor,
            title: title.into(),
            body: body.into(),
            stroke: None,
        }
    }

    pub fn with_stroke(mut self, stroke: StrokeColor) -> Self {
        self.stroke = Some(stroke);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ComplianceReport {
    pub user_summary: String,
    pub admin_details: String,
}

impl ComplianceReport {
    pub fn new(user_summary: impl Into<String>, admin_details: impl Into<String>) -> Self {
        Self {
            user_summary: user_summary.into(),
            admin_details: admin_details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_kind_serializes_tagged() {
        let kind = ViolationKind::Margin {
            side: MarginSide::Left,
            actual_cm: 2.5,
            required_cm: 3.0,
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert!(json.contains(r#""type":"margin""#));
        assert!(json.contains(r#""side":"left""#));
    }

    #[test]
    fn test_box_geometry_anchors_top_left() {
        let geometry = Geometry::Box(Rect::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(geometry.anchor(), Point::new(10.0, 20.0));
    }
}
