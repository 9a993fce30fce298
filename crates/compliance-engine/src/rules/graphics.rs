//! Placement of images and vector drawings
//!
//! Objects no larger than the minimum size in either dimension are treated
//! as decoration (rules, hairlines, bullets) and skipped.

use super::{
    fallback_anchor, page_mut, place_annotation, summary_line, CheckKind, CheckOutcome, Checker,
    SERVICE_TITLE,
};
use crate::config::{ComplianceConfig, GraphicsConfig, MarginConfig};
use crate::document::{DocumentModel, PageModel};
use crate::error::CheckError;
use crate::layout::working_area;
use crate::units::round2;
use shared_types::{
    AnnotationRequest, ComplianceReport, Geometry, GraphicKind, Rect, Violation, ViolationKind,
};

/// Containment and centering checks against the working area
pub(crate) fn placement_violations(
    graphic: GraphicKind,
    bbox: &Rect,
    area: &Rect,
    margin_tolerance_pt: f64,
    center_tolerance_pt: f64,
) -> Vec<ViolationKind> {
    let mut kinds = Vec::new();
    if !area.contains_rect(bbox, margin_tolerance_pt) {
        kinds.push(ViolationKind::GraphicOutsideMargins { graphic });
    }
    let deviation = (bbox.center_x() - area.center_x()).abs();
    if deviation > center_tolerance_pt {
        kinds.push(ViolationKind::GraphicNotCentered {
            graphic,
            deviation_pt: round2(deviation),
        });
    }
    kinds
}

fn reason(kind: &ViolationKind) -> String {
    match kind {
        ViolationKind::GraphicOutsideMargins { graphic } => {
            format!("{} выходит за поля", graphic.label_ru())
        }
        ViolationKind::GraphicNotCentered {
            graphic,
            deviation_pt,
        } => format!(
            "{} не по центру относительно полей (отклонение {} pt)",
            graphic.label_ru(),
            deviation_pt
        ),
        other => format!("{:?}", other),
    }
}

/// Annotate one misplaced object and turn its failures into violations
///
/// Returns the admin log line for the object.
pub(crate) fn report_object(
    page: &mut dyn PageModel,
    page_no: u32,
    slot: usize,
    bbox: Rect,
    kinds: Vec<ViolationKind>,
    violations: &mut Vec<Violation>,
) -> String {
    let reasons: Vec<String> = kinds.iter().map(reason).collect();
    let line = format!(
        "[page_{}] {}; bbox=[{:.2}, {:.2}, {:.2}, {:.2}]",
        page_no,
        reasons.join("; "),
        bbox.x0,
        bbox.y0,
        bbox.x1,
        bbox.y1
    );
    let fallback = fallback_anchor(&*page, slot);
    place_annotation(
        page,
        page_no,
        AnnotationRequest::new(bbox.top_left(), SERVICE_TITLE, reasons.join("\n")),
        fallback,
    );
    for (kind, text) in kinds.into_iter().zip(reasons) {
        violations.push(Violation {
            admin_message: format!("[page_{}] {}", page_no, text),
            user_message: text,
            kind,
            page: page_no,
            geometry: Geometry::Box(bbox),
        });
    }
    line
}

pub struct GraphicsChecker {
    graphics: GraphicsConfig,
    margins: MarginConfig,
}

impl GraphicsChecker {
    pub fn new(config: &ComplianceConfig) -> Self {
        Self {
            graphics: config.graphics.clone(),
            margins: config.margins.clone(),
        }
    }

    fn significant(&self, bbox: &Rect) -> bool {
        bbox.width() > self.graphics.min_object_size_pt
            && bbox.height() > self.graphics.min_object_size_pt
    }

    fn objects(&self, page: &dyn PageModel) -> Vec<(GraphicKind, Rect)> {
        let images = page.image_boxes().into_iter().map(|b| (GraphicKind::Image, b));
        let vectors = page.drawing_boxes().into_iter().map(|b| (GraphicKind::Vector, b));
        images
            .chain(vectors)
            .filter(|(_, b)| self.significant(b))
            .collect()
    }
}

impl Checker for GraphicsChecker {
    fn kind(&self) -> CheckKind {
        CheckKind::Graphics
    }

    fn check(&self, document: &mut dyn DocumentModel) -> Result<CheckOutcome, CheckError> {
        let mut violations = Vec::new();
        let mut count_lines = Vec::new();
        let mut admin_lines = Vec::new();
        let (mut total_images, mut total_vectors) = (0usize, 0usize);

        for index in 0..document.page_count() {
            let page_no = (index + 1) as u32;
            let page = page_mut(document, index)?;
            let area = working_area(&*page, &self.margins);
            let objects = self.objects(&*page);

            let images = objects.iter().filter(|(k, _)| *k == GraphicKind::Image).count();
            let vectors = objects.len() - images;
            total_images += images;
            total_vectors += vectors;
            count_lines.push(format!(
                "Страница {}: изображений {}, векторных объектов {}",
                page_no, images, vectors
            ));

            let mut slot = 0;
            for (graphic, bbox) in objects {
                let kinds = placement_violations(
                    graphic,
                    &bbox,
                    &area,
                    self.graphics.margin_tolerance_pt,
                    self.graphics.center_tolerance_pt,
                );
                if kinds.is_empty() {
                    continue;
                }
                admin_lines.push(report_object(page, page_no, slot, bbox, kinds, &mut violations));
                slot += 1;
            }
        }

        tracing::info!(
            images = total_images,
            vectors = total_vectors,
            violations = violations.len(),
            "graphics check finished"
        );

        let mut admin = format!(
            "Найдено изображений: {}, векторных объектов: {}\n{}",
            total_images,
            total_vectors,
            count_lines.join("\n")
        );
        if admin_lines.is_empty() {
            admin.push_str("\n\nНарушений по изображениям не найдено.");
        } else {
            admin.push_str("\n\n");
            admin.push_str(&admin_lines.join("\n"));
        }

        Ok(CheckOutcome {
            report: ComplianceReport::new(
                summary_line(
                    "Нарушений по изображениям не найдено.",
                    "Изображения вне полей или не по центру",
                    &violations,
                ),
                admin,
            ),
            violations,
        })
    }
}
