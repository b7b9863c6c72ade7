//! ページ分割
//!
//! ラスタライズした縦長画像をページ幅に合わせて拡縮し、
//! ページ高さごとに区切って1ページ1枚の画像にする。
//!
//! - ページ上の高さ = 画像高さ * ページ幅 / 画像幅
//! - 残り高さが0以下になるまで1ページずつ追加（最低1ページ）
//!
//! 改ページで区切られた区間（日報1件分）ごとに別の画像として描画し、
//! ページ列を連結する。件数が増えてもキャンバスは1件分の大きさに収まる。

use crate::error::Result;
use crate::export::raster::Rasterizer;
use crate::photos::PhotoSet;
use daily_report_common::page::{PageSize, PAGE_EPSILON_PT};
use daily_report_common::{Block, Layout};
use image::{imageops, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// ページ画像の切り出し方
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceMode {
    /// ページごとに該当範囲だけを切り出す（デフォルト）
    #[default]
    Crop,
    /// 全ページに画像全体を上端合わせで配置（旧出力互換）
    Legacy,
}

impl std::str::FromStr for SliceMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "crop" => Ok(SliceMode::Crop),
            "legacy" => Ok(SliceMode::Legacy),
            _ => Err(format!("Unknown slice mode: {}. Use crop or legacy", s)),
        }
    }
}

impl std::fmt::Display for SliceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SliceMode::Crop => write!(f, "crop"),
            SliceMode::Legacy => write!(f, "legacy"),
        }
    }
}

/// 1ページ分の画像。ページ上端・全幅に配置する
#[derive(Debug, Clone)]
pub struct PageImage {
    pub image: Arc<RgbImage>,
    /// ページ上の配置高さ（pt）
    pub height_pt: f32,
}

/// 拡縮後の画像高さからページ数を求める
pub fn page_count(scaled_height_pt: f32, page_height_pt: f32) -> usize {
    if page_height_pt <= 0.0 {
        return 1;
    }
    let mut pages = 1;
    let mut remaining = scaled_height_pt - page_height_pt;
    while remaining > PAGE_EPSILON_PT {
        pages += 1;
        remaining -= page_height_pt;
    }
    pages
}

/// 縦長画像をページ単位に分割
pub fn slice_into_pages(image: RgbImage, page: PageSize, mode: SliceMode) -> Vec<PageImage> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        let blank = RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]));
        return vec![PageImage {
            height_pt: page.scaled_height_pt(1, 1),
            image: Arc::new(blank),
        }];
    }

    let scaled_height = page.scaled_height_pt(width, height);
    let count = page_count(scaled_height, page.height_pt);
    log::debug!(
        "ページ分割: {}x{}px → {:.1}pt / {:.1}pt = {}ページ ({})",
        width,
        height,
        scaled_height,
        page.height_pt,
        count,
        mode
    );

    match mode {
        SliceMode::Legacy => {
            let shared = Arc::new(image);
            (0..count)
                .map(|_| PageImage {
                    image: Arc::clone(&shared),
                    height_pt: scaled_height,
                })
                .collect()
        }
        SliceMode::Crop => {
            let band = page.band_height_px(width);
            (0..count)
                .map(|i| {
                    let top = ((i as f32 * band).round() as u32).min(height - 1);
                    let bottom = if i + 1 == count {
                        height
                    } else {
                        (((i + 1) as f32 * band).round() as u32).clamp(top + 1, height)
                    };
                    let slice = imageops::crop_imm(&image, 0, top, width, bottom - top).to_image();
                    PageImage {
                        height_pt: page.scaled_height_pt(width, bottom - top),
                        image: Arc::new(slice),
                    }
                })
                .collect()
        }
    }
}

/// ラスタライズ + ページ分割
pub struct Paginator {
    rasterizer: Rasterizer,
    mode: SliceMode,
}

impl Paginator {
    pub fn new(rasterizer: Rasterizer, mode: SliceMode) -> Self {
        Self { rasterizer, mode }
    }

    pub fn mode(&self) -> SliceMode {
        self.mode
    }

    pub fn paginate(
        &self,
        layout: &Layout,
        photos: &PhotoSet,
        width_px: u32,
        page: PageSize,
    ) -> Result<Vec<PageImage>> {
        let mut pages = Vec::new();
        let mut first_photo = 0;
        for section in layout.sections() {
            let image = self
                .rasterizer
                .rasterize_section(section, photos, first_photo, width_px, page)?;
            first_photo += section.iter().map(Block::photo_count).sum::<usize>();
            pages.extend(slice_into_pages(image, page, self.mode));
        }
        Ok(pages)
    }
}
