pub mod paginate;
pub mod pdf;
pub mod raster;
pub mod target;

use crate::error::{ReportError, Result};
use crate::photos::PhotoResolver;
use chrono::NaiveDate;
use daily_report_common::render::REPORT_TITLE;
use daily_report_common::{entries_to_json, render, render_many, Entry, Layout, PageSize};
use paginate::Paginator;
use std::path::{Path, PathBuf};
use target::RenderTarget;
use tokio::sync::Mutex;

/// PDF出力の対象
#[derive(Debug, Clone, Copy)]
pub enum ExportSelection<'a> {
    Single(&'a Entry),
    All(&'a [Entry]),
}

impl ExportSelection<'_> {
    fn layout(&self) -> Layout {
        match self {
            ExportSelection::Single(entry) => render(entry),
            ExportSelection::All(entries) => render_many(entries),
        }
    }
}

/// PDFファイル名
///
/// - 1件: `Daily-Report_<日付>_<現場>.pdf`（エントリの日付）
/// - 全件: `Daily-Reports_<今日>.pdf`
pub fn pdf_file_name(selection: &ExportSelection<'_>, today: NaiveDate) -> String {
    match selection {
        ExportSelection::Single(entry) => {
            format!("Daily-Report_{}_{}.pdf", entry.date.format("%Y-%m-%d"), entry.site)
        }
        ExportSelection::All(_) => format!("Daily-Reports_{}.pdf", today.format("%Y-%m-%d")),
    }
}

pub fn json_file_name(today: NaiveDate) -> String {
    format!("daily-report-{}.json", today.format("%Y-%m-%d"))
}

/// 出力ファイルの受け渡し先（ダウンロード相当）
pub trait DownloadSink {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// 指定フォルダに書き出す
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        // 現場名にパス区切りが入っていてもフォルダ外に出さない
        let safe_name = file_name.replace(['/', '\\'], "-");
        let path = self.dir.join(safe_name);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub location: PathBuf,
    pub bytes: usize,
}

/// 出力の取りまとめ
///
/// 描画領域はここが排他的に所有し、同時に1件しか出力しない。
pub struct ExportCoordinator {
    target: Mutex<RenderTarget>,
    paginator: Paginator,
    resolver: PhotoResolver,
    page: PageSize,
}

impl ExportCoordinator {
    pub fn new(paginator: Paginator, resolver: PhotoResolver) -> Self {
        Self {
            target: Mutex::new(RenderTarget::default()),
            paginator,
            resolver,
            page: PageSize::a4_portrait(),
        }
    }

    pub fn with_target(mut self, target: RenderTarget) -> Self {
        self.target = Mutex::new(target);
        self
    }

    pub fn with_page(mut self, page: PageSize) -> Self {
        self.page = page;
        self
    }

    /// PDFを生成して受け渡し先に書き出す
    ///
    /// 描画領域の中身は成功・失敗どちらでも元に戻る。
    pub async fn export_pdf(
        &self,
        selection: ExportSelection<'_>,
        today: NaiveDate,
        sink: &dyn DownloadSink,
    ) -> Result<ExportedFile> {
        let mut target = self
            .target
            .try_lock()
            .map_err(|_| ReportError::ExportInProgress)?;

        let pages = {
            let swap = target.swap_in(selection.layout())?;
            let photos = self.resolver.resolve_layout(swap.contents()).await;
            if photos.missing() > 0 {
                log::warn!("{}枚の写真をプレースホルダで出力します", photos.missing());
            }
            self.paginator
                .paginate(swap.contents(), &photos, swap.width_px(), self.page)?
        };
        drop(target);

        let bytes = pdf::assemble_pdf(&pages, self.page, REPORT_TITLE, pdf::DEFAULT_JPEG_QUALITY)?;
        let file_name = pdf_file_name(&selection, today);
        let location = sink.deliver(&file_name, &bytes)?;

        log::info!(
            "PDF出力: {} ({}ページ, {}バイト, {})",
            location.display(),
            pages.len(),
            bytes.len(),
            self.paginator.mode()
        );

        Ok(ExportedFile {
            file_name,
            location,
            bytes: bytes.len(),
        })
    }

}

/// 全エントリを整形JSONで書き出す
///
/// 描画領域を使わないので出力中のPDFとは排他しない。
pub fn export_json(entries: &[Entry], today: NaiveDate, sink: &dyn DownloadSink) -> Result<ExportedFile> {
    let bytes = entries_to_json(entries)?;
    let file_name = json_file_name(today);
    let location = sink.deliver(&file_name, &bytes)?;

    log::info!("JSON出力: {} ({}件)", location.display(), entries.len());

    Ok(ExportedFile {
        file_name,
        location,
        bytes: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::paginate::SliceMode;
    use crate::export::raster::Rasterizer;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn coordinator() -> ExportCoordinator {
        ExportCoordinator::new(
            Paginator::new(Rasterizer::new(None), SliceMode::Crop),
            PhotoResolver::new(reqwest::Client::new()),
        )
    }

    #[test]
    fn test_single_file_name() {
        let mut entry = Entry::blank(date(2024, 3, 5));
        entry.site = "Prime 11 Unit 213".to_string();
        let name = pdf_file_name(&ExportSelection::Single(&entry), date(2024, 4, 1));
        assert_eq!(name, "Daily-Report_2024-03-05_Prime 11 Unit 213.pdf");
    }

    #[test]
    fn test_batch_file_name_uses_today() {
        let entries = vec![Entry::blank(date(2024, 3, 5))];
        let name = pdf_file_name(&ExportSelection::All(&entries), date(2024, 4, 1));
        assert_eq!(name, "Daily-Reports_2024-04-01.pdf");
        assert_eq!(json_file_name(date(2024, 4, 1)), "daily-report-2024-04-01.json");
    }

    #[test]
    fn test_directory_sink_strips_separators() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let path = sink.deliver("Daily-Report_2024-03-05_A/B.pdf", b"x").unwrap();
        assert_eq!(path, dir.path().join("Daily-Report_2024-03-05_A-B.pdf"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_second_export_rejected_while_in_flight() {
        let coordinator = coordinator();
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let entry = Entry::blank(date(2024, 3, 5));

        let _held = coordinator.target.lock().await;
        let result = coordinator
            .export_pdf(ExportSelection::Single(&entry), date(2024, 3, 5), &sink)
            .await;
        assert!(matches!(result, Err(ReportError::ExportInProgress)));
    }

    #[tokio::test]
    async fn test_export_restores_target_contents() {
        let coordinator = coordinator();
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let entry = Entry::blank(date(2024, 3, 5));

        let exported = coordinator
            .export_pdf(ExportSelection::Single(&entry), date(2024, 3, 5), &sink)
            .await
            .unwrap();
        assert!(exported.bytes > 0);
        assert!(coordinator.target.lock().await.contents().is_empty());
    }
}
