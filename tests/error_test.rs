//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use daily_report_common::ImageSource;
use site_daily_report::error::ReportError;
use site_daily_report::scanner;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"));
    assert!(result.is_err());

    let err = result.unwrap_err();
    assert!(matches!(err, ReportError::FolderNotFound(_)));
}

/// 画像のないフォルダは空の一覧
#[test]
fn test_load_photos_no_images() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("test.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    let photos = scanner::load_photos(dir.path()).unwrap();
    assert!(photos.is_empty());
}

/// ReportErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        ReportError::RenderTargetUnavailable,
        ReportError::ExportInProgress,
        ReportError::UploadFailure("503".to_string()),
        ReportError::LookupFailure("timeout".to_string()),
        ReportError::Store("broken".to_string()),
        ReportError::NoDraft,
        ReportError::Config("テスト設定エラー".to_string()),
        ReportError::FolderNotFound("/path/to/folder".to_string()),
        ReportError::PdfGeneration("PDF生成エラー".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

#[test]
fn test_upload_failure_message() {
    let err = ReportError::UploadFailure("HTTP 500".to_string());
    let display = format!("{}", err);

    assert!(display.contains("保存に失敗"));
    assert!(display.contains("HTTP 500"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: ReportError = io_err.into();

    assert!(matches!(err, ReportError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: ReportError = json_err.into();

    assert!(matches!(err, ReportError::JsonParse(_)));
}

/// common::Errorは透過的に表示される
#[test]
fn test_common_error_transparent() {
    let common_err = ImageSource::parse("ftp://example.com/a.jpg").unwrap_err();
    let err: ReportError = common_err.into();

    assert!(matches!(err, ReportError::Common(_)));
    assert!(format!("{}", err).contains("ftp://example.com/a.jpg"));
}
