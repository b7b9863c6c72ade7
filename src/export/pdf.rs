//! PDF組み立て
//!
//! ページ画像をJPEGにして1ページ1枚で貼り付ける（A4縦、pt単位）。

use crate::error::{ReportError, Result};
use crate::export::paginate::PageImage;
use daily_report_common::page::{pt_to_mm, PageSize};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use printpdf::{Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Pt, RawImage, XObjectId, XObjectTransform};
use std::sync::Arc;

/// 既定のJPEG品質
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// 画像を72dpiとして扱い、1px = 1pt で拡縮を計算する
const PLACEMENT_DPI: f32 = 72.0;

pub fn assemble_pdf(
    pages: &[PageImage],
    page: PageSize,
    title: &str,
    jpeg_quality: u8,
) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::new(title);
    let mut warnings = Vec::new();
    let mut pdf_pages = Vec::with_capacity(pages.len());
    // 旧出力互換モードでは全ページ同じ画像なので1回だけ埋め込む
    let mut last: Option<(Arc<RgbImage>, XObjectId)> = None;

    for page_image in pages {
        let id = match &last {
            Some((image, id)) if Arc::ptr_eq(image, &page_image.image) => id.clone(),
            _ => {
                let jpeg = encode_jpeg(&page_image.image, jpeg_quality)?;
                let raw = RawImage::decode_from_bytes(&jpeg, &mut warnings)
                    .map_err(|e| ReportError::PdfGeneration(format!("画像埋め込みエラー: {}", e)))?;
                let id = doc.add_image(&raw);
                last = Some((Arc::clone(&page_image.image), id.clone()));
                id
            }
        };

        let scale = page.width_pt / page_image.image.width().max(1) as f32;
        let transform = XObjectTransform {
            translate_x: Some(Pt(0.0)),
            translate_y: Some(Pt(page.height_pt - page_image.height_pt)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(PLACEMENT_DPI),
            ..Default::default()
        };

        pdf_pages.push(PdfPage::new(
            Mm(pt_to_mm(page.width_pt)),
            Mm(pt_to_mm(page.height_pt)),
            vec![Op::UseXobject { id, transform }],
        ));
    }

    let bytes = doc
        .with_pages(pdf_pages)
        .save(&PdfSaveOptions::default(), &mut warnings);

    if !warnings.is_empty() {
        log::debug!("PDF生成時の警告: {}件", warnings.len());
    }
    Ok(bytes)
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)).encode_image(image)?;
    Ok(buf)
}
