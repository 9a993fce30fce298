//! Full engine run over a three page manuscript

use compliance_engine::document::TextSpan;
use compliance_engine::units::{cm_to_pt, mm_to_pt};
use compliance_engine::{
    CheckKind, ComplianceConfig, ComplianceEngine, LayoutTables, MemoryDocument, MemoryPage,
};
use pretty_assertions::assert_eq;
use shared_types::{Rect, ViolationKind};

const WIDTH: f64 = 595.28;
const HEIGHT: f64 = 841.89;

fn span(text: &str, bbox: Rect) -> TextSpan {
    TextSpan::new(text, bbox, "TimesNewRomanPSMT", 12.0)
}

/// Body text filling the working area edge to edge
fn body(text: &str) -> TextSpan {
    span(
        text,
        Rect::new(cm_to_pt(3.0), cm_to_pt(2.0), WIDTH - cm_to_pt(1.5), HEIGHT - cm_to_pt(2.0)),
    )
}

fn page_number(text: &str, shift_pt: f64) -> TextSpan {
    let center = cm_to_pt(3.0) + (WIDTH - cm_to_pt(4.5)) / 2.0 + shift_pt;
    span(text, Rect::new(center - 3.0, HEIGHT - 40.0, center + 3.0, HEIGHT - 28.0))
}

fn manuscript() -> MemoryDocument {
    MemoryDocument::new(vec![
        MemoryPage::new(WIDTH, HEIGHT).with_line(vec![body("Выпускная квалификационная работа")]),
        MemoryPage::new(WIDTH, HEIGHT)
            .with_line(vec![body("Термин \"word\" в тексте")])
            .with_line(vec![page_number("2", 0.0)]),
        MemoryPage::new(WIDTH, HEIGHT)
            .with_line(vec![body("foo  bar")])
            .with_line(vec![page_number("3", mm_to_pt(15.0))]),
    ])
}

#[test]
fn three_page_manuscript() {
    let mut doc = manuscript();
    let detector = LayoutTables::from_document(&doc);
    let run = ComplianceEngine::new(ComplianceConfig::default())
        .with_table_detector(detector)
        .run(&mut doc)
        .unwrap();

    let counts: Vec<(CheckKind, usize)> = run
        .sections
        .iter()
        .map(|s| (s.kind, s.violations().len()))
        .collect();
    assert_eq!(
        counts,
        vec![
            (CheckKind::Quotes, 2),
            (CheckKind::Margins, 0),
            (CheckKind::PageNumbers, 1),
            (CheckKind::DoubleSpaces, 1),
            (CheckKind::Graphics, 0),
            (CheckKind::Tables, 0),
        ]
    );

    let quotes = run.section(CheckKind::Quotes).unwrap().violations();
    assert!(quotes.iter().all(|v| v.page == 2));

    let numbers = run.section(CheckKind::PageNumbers).unwrap().violations();
    assert_eq!(numbers[0].page, 3);
    assert!(matches!(
        numbers[0].kind,
        ViolationKind::PageNumberNotCentered { .. }
    ));

    let spaces = run.section(CheckKind::DoubleSpaces).unwrap().violations();
    assert_eq!(spaces[0].page, 3);

    let lines: Vec<&str> = run.report.user_summary.lines().collect();
    assert_eq!(
        &lines[..4],
        &[
            "⚠️ Кавычки: обнаружено 2 случая нарушений на страницах: 2. Используйте кавычки-«ёлочки».",
            "✅ Все поля на всех страницах соответствуют требованиям.",
            "⚠️ Нумерация страниц: обнаружено 1 нарушение на страницах: 3.",
            "⚠️ Двойные пробелы: обнаружено 1 нарушение на страницах: 3.",
        ]
    );
    assert_eq!(run.violations.len(), 4);
}

#[test]
fn admin_digest_follows_run_order() {
    let mut doc = manuscript();
    let run = ComplianceEngine::default().run(&mut doc).unwrap();
    let admin = &run.report.admin_details;

    let positions: Vec<usize> = CheckKind::ORDER
        .iter()
        .map(|k| admin.find(&format!("[{}]", k.title())).unwrap())
        .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
}

#[test]
fn annotations_do_not_change_later_measurements() {
    let mut doc = manuscript();
    let first = ComplianceEngine::default().run(&mut doc).unwrap();
    // second pass over the already annotated document
    let second = ComplianceEngine::default().run(&mut doc).unwrap();
    assert_eq!(first.violations, second.violations);
    assert!(doc.pages[1].annotations.len() >= 2);
}

#[test]
fn annotated_layout_round_trips_through_save() {
    let mut doc = manuscript();
    ComplianceEngine::default().run(&mut doc).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checked.json");
    compliance_engine::DocumentModel::save(&doc, &path).unwrap();

    let reloaded = MemoryDocument::from_file(&path).unwrap();
    assert_eq!(reloaded.pages.len(), 3);
    for (saved, original) in reloaded.pages.iter().zip(&doc.pages) {
        let titles = |p: &MemoryPage| p.annotations.iter().map(|a| a.title.clone()).collect::<Vec<_>>();
        assert_eq!(titles(saved), titles(original));
    }
}
