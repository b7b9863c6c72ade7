//! 写真フォルダの読み込み

use crate::error::{ReportError, Result};
use crate::photos::validate_inline;
use daily_report_common::ImageSource;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub path: PathBuf,
    pub file_name: String,
    pub mime: &'static str,
}

/// 直下の jpg/jpeg/png をファイル名順に列挙
pub fn scan_folder(folder: &Path) -> Result<Vec<PhotoFile>> {
    if !folder.is_dir() {
        return Err(ReportError::FolderNotFound(folder.display().to_string()));
    }

    let mut photos: Vec<PhotoFile> = WalkDir::new(folder)
        .max_depth(1) // 直下のみ
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let ext = e.path().extension()?.to_string_lossy().to_string();
            let mime = ImageSource::mime_for_extension(&ext)?;
            Some(PhotoFile {
                file_name: e.file_name().to_string_lossy().to_string(),
                path: e.into_path(),
                mime,
            })
        })
        .collect();

    photos.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(photos)
}

/// フォルダの写真をインライン画像として読み込む
///
/// 画像として読めないファイルは警告して飛ばす。
pub fn load_photos(folder: &Path) -> Result<Vec<ImageSource>> {
    let mut sources = Vec::new();
    for file in scan_folder(folder)? {
        let bytes = std::fs::read(&file.path)?;
        let source = ImageSource::inline(file.mime, bytes);
        match validate_inline(&source) {
            Ok(()) => sources.push(source),
            Err(e) => log::warn!("{} をスキップ: {}", file.file_name, e),
        }
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::fs;

    fn write_png(path: &Path) {
        DynamicImage::ImageRgb8(RgbImage::new(2, 2))
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_folder(Path::new("/nonexistent/folder"));
        assert!(matches!(result, Err(ReportError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_folder_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.JPG"), b"dummy").unwrap();
        fs::write(dir.path().join("a.png"), b"dummy").unwrap();
        fs::write(dir.path().join("c.jpeg"), b"dummy").unwrap();
        fs::write(dir.path().join("notes.txt"), b"text").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("d.jpg"), b"dummy").unwrap();

        let found = scan_folder(dir.path()).unwrap();
        let names: Vec<&str> = found.iter().map(|p| p.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.JPG", "c.jpeg"]);
        assert_eq!(found[0].mime, "image/png");
        assert_eq!(found[1].mime, "image/jpeg");
    }

    #[test]
    fn test_load_photos_skips_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("01.png"));
        fs::write(dir.path().join("02.jpg"), b"not a jpeg").unwrap();
        write_png(&dir.path().join("03.png"));

        let photos = load_photos(dir.path()).unwrap();
        assert_eq!(photos.len(), 2);
        assert!(photos.iter().all(|p| !p.is_remote()));
    }
}
