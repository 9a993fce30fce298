pub mod geometry;
pub mod types;

pub use geometry::{Point, Rect};
pub use types::{
    AnnotationRequest, ComplianceReport, Geometry, GraphicKind, MarginSide, StrokeColor,
    Violation, ViolationKind,
};
