//! PDF/JSON出力の統合テスト

use chrono::NaiveDate;
use daily_report_common::{entries_from_json, ImageSource, MaterialItem};
use daily_report_common::Entry;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use site_daily_report::error::ReportError;
use site_daily_report::export::paginate::{Paginator, SliceMode};
use site_daily_report::export::raster::Rasterizer;
use site_daily_report::export::target::RenderTarget;
use site_daily_report::export::{export_json, DirectorySink, ExportCoordinator, ExportSelection};
use site_daily_report::photos::PhotoResolver;
use std::io::Cursor;
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn coordinator(mode: SliceMode) -> ExportCoordinator {
    ExportCoordinator::new(
        Paginator::new(Rasterizer::new(None), mode),
        PhotoResolver::new(reqwest::Client::new()),
    )
}

fn png_photo() -> ImageSource {
    let image = RgbaImage::from_pixel(64, 48, Rgba([30, 120, 200, 128]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    ImageSource::inline("image/png", buf)
}

fn create_test_entry(site: &str, day: u32) -> Entry {
    let mut entry = Entry::blank(date(2024, 3, day));
    entry.site = site.to_string();
    entry.area = "Kitchen & Bath".to_string();
    entry.weather = "Overcast".to_string();
    entry.manpower = "4 carpenters".to_string();
    entry.obstacles = "Tile delivery <late>".to_string();
    entry.category_progress.set("Demolition", 80);
    entry.materials_required = true;
    let mut item = MaterialItem::new("Drywall", "40 sheets");
    item.needed_by = Some(date(2024, 3, 8));
    entry.add_material(item);
    entry.add_photo(png_photo());
    entry
}

#[tokio::test]
async fn test_single_pdf_export() {
    let dir = tempdir().expect("Failed to create temp dir");
    let sink = DirectorySink::new(dir.path());
    let entry = create_test_entry("Prime 11 Unit 213", 5);

    let exported = coordinator(SliceMode::Crop)
        .export_pdf(ExportSelection::Single(&entry), date(2024, 4, 1), &sink)
        .await;

    let exported = exported.expect("PDF生成に失敗");
    assert_eq!(exported.file_name, "Daily-Report_2024-03-05_Prime 11 Unit 213.pdf");
    assert!(exported.location.exists(), "PDFファイルが作成されていない");

    let bytes = std::fs::read(&exported.location).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(bytes.len(), exported.bytes);
}

#[tokio::test]
async fn test_batch_pdf_export_both_modes() {
    let entries: Vec<Entry> = (1..=3).map(|d| create_test_entry("Prime 11 Unit 213", d)).collect();

    for mode in [SliceMode::Crop, SliceMode::Legacy] {
        let dir = tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let exported = coordinator(mode)
            .export_pdf(ExportSelection::All(&entries), date(2024, 4, 1), &sink)
            .await
            .unwrap_or_else(|e| panic!("{}: {}", mode, e));
        assert_eq!(exported.file_name, "Daily-Reports_2024-04-01.pdf");
        assert!(exported.location.exists());
    }
}

#[tokio::test]
async fn test_unmounted_target_emits_nothing() {
    let dir = tempdir().unwrap();
    let sink = DirectorySink::new(dir.path().join("out"));
    let entry = create_test_entry("A", 5);

    let result = coordinator(SliceMode::Crop)
        .with_target(RenderTarget::unmounted())
        .export_pdf(ExportSelection::Single(&entry), date(2024, 4, 1), &sink)
        .await;

    assert!(matches!(result, Err(ReportError::RenderTargetUnavailable)));
    assert!(!dir.path().join("out").exists(), "失敗時にファイルが作成された");
}

#[tokio::test]
async fn test_unresolvable_photo_still_exports() {
    let dir = tempdir().unwrap();
    let sink = DirectorySink::new(dir.path());
    let mut entry = create_test_entry("A", 5);
    entry.add_photo(ImageSource::inline("image/jpeg", vec![0xFF, 0xD8, 0x00]));

    let result = coordinator(SliceMode::Crop)
        .export_pdf(ExportSelection::Single(&entry), date(2024, 4, 1), &sink)
        .await;
    assert!(result.is_ok(), "写真1枚の失敗で出力が止まった: {:?}", result.err());
}

#[test]
fn test_json_export_roundtrip() {
    let dir = tempdir().unwrap();
    let sink = DirectorySink::new(dir.path());
    let entries = vec![create_test_entry("A", 4), create_test_entry("B", 5)];

    let exported = export_json(&entries, date(2024, 4, 1), &sink).unwrap();
    assert_eq!(exported.file_name, "daily-report-2024-04-01.json");

    let bytes = std::fs::read(&exported.location).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.starts_with("[\n"), "整形されていない");
    assert!(text.contains("\"categoryProgress\""));

    let parsed = entries_from_json(&bytes).unwrap();
    assert_eq!(parsed, entries);
}

#[test]
fn test_json_export_empty() {
    let dir = tempdir().unwrap();
    let sink = DirectorySink::new(dir.path());
    let exported = export_json(&[], date(2024, 4, 1), &sink).unwrap();
    let parsed = entries_from_json(&std::fs::read(&exported.location).unwrap()).unwrap();
    assert!(parsed.is_empty());
}
