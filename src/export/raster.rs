//! レイアウトのラスタライズ
//!
//! 固定幅（論理794px）の縦長1枚画像に描画する。
//! 1. 配置計算（論理px、描画命令の列）
//! 2. 倍率をかけて白背景のRGBキャンバスに描画
//!
//! キャンバスはアルファを持たないので、透過部分が黒/透明になることはない。

use crate::error::{ReportError, Result};
use crate::photos::PhotoSet;
use ab_glyph::{FontVec, PxScale};
use daily_report_common::page::{PageSize, RASTER_SCALE, THUMB_HEIGHT_PX, THUMB_WIDTH_PX};
use daily_report_common::{Block, GridRow, Layout, SafeText};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

// ============================================
// 寸法（論理px）
// ============================================

const PADDING: u32 = 32;
const BLOCK_GAP: u32 = 14;
const CELL_PAD: u32 = 6;
const PHOTO_GAP: u32 = 12;
const LABEL_WIDTH: u32 = 110;

const LINE_HEIGHT: f32 = 1.4;
const BODY_SIZE: f32 = 12.0;
const CAPTION_SIZE: f32 = 14.0;

/// フォント未指定時の平均文字幅（em比）
const AVG_GLYPH_RATIO: f32 = 0.55;

/// キャンバス上限（ピクセル数）
const MAX_CANVAS_PIXELS: u64 = 400_000_000;

// ============================================
// 色
// ============================================

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const TEXT_COLOR: Rgb<u8> = Rgb([17, 24, 39]);
const BORDER: Rgb<u8> = Rgb([209, 213, 219]);
const LABEL_FILL: Rgb<u8> = Rgb([243, 244, 246]);
const HEADER_FILL: Rgb<u8> = Rgb([229, 231, 235]);
const PLACEHOLDER_FILL: Rgb<u8> = Rgb([249, 250, 251]);
const MISSING_PHOTO: Rgb<u8> = Rgb([238, 238, 238]);

fn heading_size(level: u8) -> f32 {
    match level {
        1 => 24.0,
        2 => 16.0,
        _ => CAPTION_SIZE,
    }
}

fn line_height(size: f32) -> u32 {
    (size * LINE_HEIGHT).ceil() as u32
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Area {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

#[derive(Debug, Clone, PartialEq)]
enum DrawOp {
    Fill { area: Area, color: Rgb<u8> },
    Stroke { area: Area, color: Rgb<u8> },
    Text { x: u32, y: u32, size: f32, text: String },
    Photo { area: Area, index: usize },
}

/// 表の1セル
struct Cell<'a> {
    x: u32,
    w: u32,
    text: &'a SafeText,
    fill: Option<Rgb<u8>>,
}

pub struct Rasterizer {
    font: Option<FontVec>,
    scale: u32,
    max_pixels: u64,
}

impl Rasterizer {
    /// フォントなしの場合、文字は描かず枠と写真のみ描画する
    pub fn new(font: Option<FontVec>) -> Self {
        Self {
            font,
            scale: RASTER_SCALE,
            max_pixels: MAX_CANVAS_PIXELS,
        }
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale.max(1);
        self
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// 1枚のキャンバスの上限ピクセル数
    pub fn with_pixel_limit(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// レイアウトを縦長1枚の画像に描画
    ///
    /// `page` は改ページ位置の計算にのみ使う。
    pub fn rasterize(
        &self,
        layout: &Layout,
        photos: &PhotoSet,
        width_px: u32,
        page: PageSize,
    ) -> Result<RgbImage> {
        self.rasterize_section(&layout.blocks, photos, 0, width_px, page)
    }

    /// ブロック列を描画
    ///
    /// `first_photo` はこの区間の最初の写真の `photos` 内での位置。
    pub fn rasterize_section(
        &self,
        blocks: &[Block],
        photos: &PhotoSet,
        first_photo: usize,
        width_px: u32,
        page: PageSize,
    ) -> Result<RgbImage> {
        let (ops, height) = self.plan(blocks, first_photo, width_px, page);

        let width = width_px * self.scale;
        let height = height * self.scale;
        if width as u64 * height as u64 > self.max_pixels {
            return Err(ReportError::Render(format!(
                "描画サイズが大きすぎます: {}x{}px",
                width, height
            )));
        }

        let mut canvas = RgbImage::from_pixel(width, height, WHITE);
        for op in &ops {
            self.paint(&mut canvas, op, photos);
        }

        log::debug!("ラスタライズ完了: {}x{}px, 描画命令{}件", width, height, ops.len());
        Ok(canvas)
    }

    fn plan(&self, blocks: &[Block], first_photo: usize, width_px: u32, page: PageSize) -> (Vec<DrawOp>, u32) {
        let mut planner = Planner {
            raster: self,
            ops: Vec::new(),
            y: PADDING,
            left: PADDING,
            width: width_px.saturating_sub(PADDING * 2).max(1),
            band: page.band_height_px(width_px),
            photo_index: first_photo,
        };
        for block in blocks {
            planner.block(block);
        }
        (planner.ops, planner.y + PADDING)
    }

    fn text_width(&self, text: &str, size: f32) -> f32 {
        match &self.font {
            Some(font) => text_size(PxScale::from(size), font, text).0 as f32,
            None => text.chars().count() as f32 * size * AVG_GLYPH_RATIO,
        }
    }

    /// 幅に収まるように折り返す（空文字は空行1つ）
    fn wrap(&self, text: &str, size: f32, max_width: u32) -> Vec<String> {
        let max = max_width as f32;
        let mut lines = Vec::new();

        for paragraph in text.split('\n') {
            let mut line = String::new();
            for word in paragraph.split_whitespace() {
                let candidate = if line.is_empty() {
                    word.to_string()
                } else {
                    format!("{} {}", line, word)
                };
                if self.text_width(&candidate, size) <= max {
                    line = candidate;
                    continue;
                }

                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                // 1語で幅を超える場合は文字単位
                for ch in word.chars() {
                    line.push(ch);
                    if line.chars().count() > 1 && self.text_width(&line, size) > max {
                        line.pop();
                        lines.push(std::mem::take(&mut line));
                        line.push(ch);
                    }
                }
            }
            lines.push(line);
        }
        lines
    }

    fn paint(&self, canvas: &mut RgbImage, op: &DrawOp, photos: &PhotoSet) {
        let s = self.scale;
        match op {
            DrawOp::Fill { area, color } => draw_filled_rect_mut(canvas, self.rect(area), *color),
            DrawOp::Stroke { area, color } => draw_hollow_rect_mut(canvas, self.rect(area), *color),
            DrawOp::Text { x, y, size, text } => {
                if let Some(font) = &self.font {
                    draw_text_mut(
                        canvas,
                        TEXT_COLOR,
                        (x * s) as i32,
                        (y * s) as i32,
                        PxScale::from(size * s as f32),
                        font,
                        text,
                    );
                }
            }
            DrawOp::Photo { area, index } => {
                let rect = self.rect(area);
                match photos.get(*index) {
                    Some(photo) => {
                        let (w, h) = (area.w * s, area.h * s);
                        let thumb = fit_within(photo, w, h);
                        let x = area.x * s + (w - thumb.width()) / 2;
                        let y = area.y * s + (h - thumb.height()) / 2;
                        imageops::replace(canvas, &thumb, x as i64, y as i64);
                    }
                    None => draw_filled_rect_mut(canvas, rect, MISSING_PHOTO),
                }
                draw_hollow_rect_mut(canvas, rect, BORDER);
            }
        }
    }

    fn rect(&self, area: &Area) -> Rect {
        Rect::at((area.x * self.scale) as i32, (area.y * self.scale) as i32)
            .of_size((area.w * self.scale).max(1), (area.h * self.scale).max(1))
    }
}

/// アスペクト比を保って枠内に縮小
fn fit_within(photo: &RgbImage, max_w: u32, max_h: u32) -> RgbImage {
    let (w, h) = photo.dimensions();
    if w == 0 || h == 0 {
        return RgbImage::from_pixel(1, 1, WHITE);
    }
    let ratio = (max_w as f32 / w as f32).min(max_h as f32 / h as f32);
    let tw = ((w as f32 * ratio).round() as u32).clamp(1, max_w);
    let th = ((h as f32 * ratio).round() as u32).clamp(1, max_h);
    imageops::resize(photo, tw, th, FilterType::Triangle)
}

/// 配置計算（上から順に積む）
struct Planner<'a> {
    raster: &'a Rasterizer,
    ops: Vec<DrawOp>,
    y: u32,
    left: u32,
    width: u32,
    /// 1ページの高さ（論理px）
    band: f32,
    photo_index: usize,
}

impl Planner<'_> {
    fn block(&mut self, block: &Block) {
        match block {
            Block::Heading { level, text } => self.heading(*level, text),
            Block::MetadataGrid { rows } => {
                for row in rows {
                    self.grid_row(row);
                }
                self.y += BLOCK_GAP;
            }
            Block::Table { caption, headers, rows } => {
                self.heading(3, caption);
                self.table_row(headers, Some(HEADER_FILL));
                for row in rows {
                    self.table_row(row, None);
                }
                self.y += BLOCK_GAP;
            }
            Block::Placeholder { caption, text } => {
                self.heading(3, caption);
                let cell = Cell {
                    x: self.left,
                    w: self.width,
                    text,
                    fill: Some(PLACEHOLDER_FILL),
                };
                self.row(&[cell]);
                self.y += BLOCK_GAP;
            }
            Block::PhotoGrid { caption, photos } => {
                self.heading(3, caption);
                self.photo_grid(photos.len());
                self.y += BLOCK_GAP;
            }
            Block::PageBreak => self.page_break(),
        }
    }

    fn heading(&mut self, level: u8, text: &SafeText) {
        let size = heading_size(level);
        let line_h = line_height(size);
        for line in self.raster.wrap(&text.plain(), size, self.width) {
            self.ops.push(DrawOp::Text {
                x: self.left,
                y: self.y,
                size,
                text: line,
            });
            self.y += line_h;
        }
        self.y += CELL_PAD;
    }

    /// セル行を描画（高さは最も行数の多いセルに合わせる）
    fn row(&mut self, cells: &[Cell<'_>]) {
        let line_h = line_height(BODY_SIZE);
        let wrapped: Vec<Vec<String>> = cells
            .iter()
            .map(|cell| {
                let inner = cell.w.saturating_sub(CELL_PAD * 2).max(1);
                self.raster.wrap(&cell.text.plain(), BODY_SIZE, inner)
            })
            .collect();
        let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1) as u32;
        let h = lines * line_h + CELL_PAD * 2;

        for (cell, cell_lines) in cells.iter().zip(wrapped) {
            let area = Area {
                x: cell.x,
                y: self.y,
                w: cell.w,
                h,
            };
            if let Some(color) = cell.fill {
                self.ops.push(DrawOp::Fill { area, color });
            }
            self.ops.push(DrawOp::Stroke { area, color: BORDER });
            for (i, text) in cell_lines.into_iter().enumerate() {
                if text.is_empty() {
                    continue;
                }
                self.ops.push(DrawOp::Text {
                    x: cell.x + CELL_PAD,
                    y: self.y + CELL_PAD + i as u32 * line_h,
                    size: BODY_SIZE,
                    text,
                });
            }
        }
        self.y += h;
    }

    fn grid_row(&mut self, row: &GridRow) {
        let left = self.left;
        let half = self.width / 2;
        let label = |x: u32, text| Cell {
            x,
            w: LABEL_WIDTH,
            text,
            fill: Some(LABEL_FILL),
        };
        let value = |x: u32, w: u32, text| Cell {
            x,
            w: w.max(1),
            text,
            fill: None,
        };

        let cells = match row {
            GridRow::Pair(l, r) => vec![
                label(left, &l.label),
                value(left + LABEL_WIDTH, half.saturating_sub(LABEL_WIDTH), &l.value),
                label(left + half, &r.label),
                value(
                    left + half + LABEL_WIDTH,
                    self.width.saturating_sub(half + LABEL_WIDTH),
                    &r.value,
                ),
            ],
            GridRow::Span(cell) => vec![
                label(left, &cell.label),
                value(left + LABEL_WIDTH, self.width.saturating_sub(LABEL_WIDTH), &cell.value),
            ],
        };
        self.row(&cells);
    }

    /// 均等幅の表の1行（最終列が端数を吸収）
    fn table_row(&mut self, texts: &[SafeText], fill: Option<Rgb<u8>>) {
        if texts.is_empty() {
            return;
        }
        let count = texts.len() as u32;
        let col_w = self.width / count;
        let left = self.left;
        let width = self.width;
        let cells: Vec<Cell<'_>> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let i = i as u32;
                let w = if i + 1 == count { width - col_w * i } else { col_w };
                Cell {
                    x: left + col_w * i,
                    w: w.max(1),
                    text,
                    fill,
                }
            })
            .collect();
        self.row(&cells);
    }

    fn photo_grid(&mut self, count: usize) {
        if count == 0 {
            self.ops.push(DrawOp::Text {
                x: self.left,
                y: self.y,
                size: BODY_SIZE,
                text: "-".to_string(),
            });
            self.y += line_height(BODY_SIZE);
            return;
        }

        let per_row = ((self.width + PHOTO_GAP) / (THUMB_WIDTH_PX + PHOTO_GAP)).max(1);
        let rows = (count as u32).div_ceil(per_row);
        for i in 0..count as u32 {
            let area = Area {
                x: self.left + (i % per_row) * (THUMB_WIDTH_PX + PHOTO_GAP),
                y: self.y + (i / per_row) * (THUMB_HEIGHT_PX + PHOTO_GAP),
                w: THUMB_WIDTH_PX,
                h: THUMB_HEIGHT_PX,
            };
            self.ops.push(DrawOp::Photo {
                area,
                index: self.photo_index,
            });
            self.photo_index += 1;
        }
        self.y += rows * (THUMB_HEIGHT_PX + PHOTO_GAP) - PHOTO_GAP;
    }

    /// 次のページ境界へ送る
    fn page_break(&mut self) {
        if self.band <= 0.0 {
            return;
        }
        let pages_used = (self.y as f32 / self.band).ceil();
        self.y = (pages_used * self.band).ceil() as u32 + PADDING;
    }
}
