//! ページ寸法モジュール
//!
//! mm基準のA4定義と、ラスタ画像 ⇔ PDFページの換算

// ============================================
// mm基準（Source of Truth）
// ============================================

/// A4サイズ（mm）
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

// ============================================
// 変換係数
// ============================================

/// mm → pt変換 (1mm = 72/25.4 pt ≈ 2.835pt)
pub const MM_TO_PT: f32 = 72.0 / 25.4;

/// pt → px変換 (96dpi基準)
pub const PT_TO_PX: f32 = 96.0 / 72.0;
pub const PX_TO_PT: f32 = 72.0 / 96.0;

// ============================================
// 描画面
// ============================================

/// 描画面の論理幅（A4縦 @96dpi）
pub const DOCUMENT_WIDTH_PX: u32 = 794;

/// ラスタライズ倍率
pub const RASTER_SCALE: u32 = 2;

/// 写真サムネイル（論理px）
pub const THUMB_WIDTH_PX: u32 = 220;
pub const THUMB_HEIGHT_PX: u32 = 165;

/// ページ寸法の比較誤差（pt）
pub const PAGE_EPSILON_PT: f32 = 1e-3;

/// 出力ページサイズ（pt）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl PageSize {
    pub fn new(width_pt: f32, height_pt: f32) -> Self {
        Self { width_pt, height_pt }
    }

    /// A4縦
    pub fn a4_portrait() -> Self {
        Self::new(mm_to_pt(A4_WIDTH_MM), mm_to_pt(A4_HEIGHT_MM))
    }

    /// 画像をページ幅いっぱいに置いたときの高さ（pt）
    ///
    /// `画像高さ * ページ幅 / 画像幅`
    pub fn scaled_height_pt(&self, image_width: u32, image_height: u32) -> f32 {
        if image_width == 0 {
            return 0.0;
        }
        image_height as f32 * self.width_pt / image_width as f32
    }

    /// 1ページ分の高さを画像ピクセルに換算
    pub fn band_height_px(&self, image_width: u32) -> f32 {
        self.height_pt * image_width as f32 / self.width_pt
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::a4_portrait()
    }
}

// ============================================
// ヘルパー関数
// ============================================

/// mm → pt 変換
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

/// pt → mm 変換
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / MM_TO_PT
}

/// px → pt 変換
#[inline]
pub fn px_to_pt(px: f32) -> f32 {
    px * PX_TO_PT
}

/// pt → px 変換
#[inline]
pub fn pt_to_px(pt: f32) -> f32 {
    pt * PT_TO_PX
}
