//! 写真の解決
//!
//! レイアウト中の写真ソース（インライン/リモート）を画像に読み込み、
//! 白背景に合成した不透明RGBとして描画側に渡す。

use crate::error::Result;
use daily_report_common::page::{RASTER_SCALE, THUMB_HEIGHT_PX, THUMB_WIDTH_PX};
use daily_report_common::{ImageSource, Layout};
use image::{DynamicImage, Rgb, RgbImage};

/// レイアウト順の解決済み写真（失敗したものは None）
#[derive(Debug, Clone, Default)]
pub struct PhotoSet {
    images: Vec<Option<RgbImage>>,
}

impl PhotoSet {
    pub fn new(images: Vec<Option<RgbImage>>) -> Self {
        Self { images }
    }

    pub fn get(&self, index: usize) -> Option<&RgbImage> {
        self.images.get(index).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// 読み込めなかった写真の数
    pub fn missing(&self) -> usize {
        self.images.iter().filter(|img| img.is_none()).count()
    }
}

pub struct PhotoResolver {
    client: reqwest::Client,
}

impl PhotoResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// レイアウト内の全写真を順に読み込む
    ///
    /// 個々の失敗は警告ログのみで、該当枠はプレースホルダ表示になる。
    pub async fn resolve_layout(&self, layout: &Layout) -> PhotoSet {
        let mut images = Vec::new();
        for (index, source) in layout.photos().enumerate() {
            match self.load(source).await {
                Ok(image) => images.push(Some(prepare_thumbnail(&image))),
                Err(e) => {
                    log::warn!("写真{}を読み込めません ({:?}): {}", index + 1, source, e);
                    images.push(None);
                }
            }
        }
        PhotoSet::new(images)
    }

    pub async fn load(&self, source: &ImageSource) -> Result<DynamicImage> {
        match source {
            ImageSource::Inline { bytes, .. } => Ok(image::load_from_memory(bytes)?),
            ImageSource::Remote(url) => {
                let bytes = self
                    .client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .bytes()
                    .await?;
                Ok(image::load_from_memory(&bytes)?)
            }
        }
    }
}

/// 描画サイズまで縮小して白背景に合成
fn prepare_thumbnail(image: &DynamicImage) -> RgbImage {
    let max_w = THUMB_WIDTH_PX * RASTER_SCALE;
    let max_h = THUMB_HEIGHT_PX * RASTER_SCALE;
    if image.width() > max_w || image.height() > max_h {
        flatten_onto_white(&image.thumbnail(max_w, max_h))
    } else {
        flatten_onto_white(image)
    }
}

/// 透過部分を白で埋めた不透明画像に変換
pub fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut out = RgbImage::new(width, height);

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    out
}

/// 画像データとして読めるか（保存前のチェック用）
pub fn validate_inline(source: &ImageSource) -> Result<()> {
    if let ImageSource::Inline { bytes, .. } = source {
        image::load_from_memory(bytes)?;
    }
    Ok(())
}
