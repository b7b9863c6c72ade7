//! 描画領域（スクラッチ）
//!
//! PDF出力時だけ中身を差し替え、終了時に必ず元へ戻す。

use crate::error::{ReportError, Result};
use daily_report_common::page::DOCUMENT_WIDTH_PX;
use daily_report_common::Layout;

#[derive(Debug, Clone)]
pub struct RenderTarget {
    mounted: bool,
    width_px: u32,
    contents: Layout,
}

impl RenderTarget {
    /// 描画可能な領域
    pub fn mounted(width_px: u32) -> Self {
        Self {
            mounted: true,
            width_px,
            contents: Layout::default(),
        }
    }

    /// 未準備の領域（出力は RenderTargetUnavailable になる）
    pub fn unmounted() -> Self {
        Self {
            mounted: false,
            width_px: DOCUMENT_WIDTH_PX,
            contents: Layout::default(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn width_px(&self) -> u32 {
        self.width_px
    }

    pub fn contents(&self) -> &Layout {
        &self.contents
    }

    /// 表示中の内容を置き換える（プレビュー用）
    pub fn set_contents(&mut self, layout: Layout) {
        self.contents = layout;
    }

    /// 一時的に中身を差し替える。ガードを落とすと元に戻る。
    pub fn swap_in(&mut self, layout: Layout) -> Result<ScopedSwap<'_>> {
        if !self.mounted || self.width_px == 0 {
            return Err(ReportError::RenderTargetUnavailable);
        }
        let original = std::mem::replace(&mut self.contents, layout);
        Ok(ScopedSwap {
            target: self,
            original,
        })
    }
}

impl Default for RenderTarget {
    fn default() -> Self {
        Self::mounted(DOCUMENT_WIDTH_PX)
    }
}

pub struct ScopedSwap<'a> {
    target: &'a mut RenderTarget,
    original: Layout,
}

impl ScopedSwap<'_> {
    pub fn contents(&self) -> &Layout {
        &self.target.contents
    }

    pub fn width_px(&self) -> u32 {
        self.target.width_px
    }
}

impl Drop for ScopedSwap<'_> {
    fn drop(&mut self) {
        self.target.contents = std::mem::take(&mut self.original);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daily_report_common::{Block, SafeText};

    fn layout_with(text: &str) -> Layout {
        Layout {
            blocks: vec![Block::Heading {
                level: 1,
                text: SafeText::escape(text),
            }],
        }
    }

    #[test]
    fn test_swap_restores_on_drop() {
        let mut target = RenderTarget::default();
        target.set_contents(layout_with("preview"));

        {
            let swap = target.swap_in(layout_with("export")).unwrap();
            assert_eq!(swap.contents(), &layout_with("export"));
            assert_eq!(swap.width_px(), DOCUMENT_WIDTH_PX);
        }

        assert_eq!(target.contents(), &layout_with("preview"));
    }

    #[test]
    fn test_swap_restores_on_error_path() {
        fn failing_export(target: &mut RenderTarget) -> Result<()> {
            let _swap = target.swap_in(layout_with("export"))?;
            Err(ReportError::Render("失敗".to_string()))
        }

        let mut target = RenderTarget::default();
        target.set_contents(layout_with("preview"));

        assert!(failing_export(&mut target).is_err());
        assert_eq!(target.contents(), &layout_with("preview"));
    }

    #[test]
    fn test_unmounted_rejects_swap() {
        let mut target = RenderTarget::unmounted();
        {
            let result = target.swap_in(layout_with("export"));
            assert!(matches!(result, Err(ReportError::RenderTargetUnavailable)));
        }
        assert!(target.contents().is_empty());
    }
}
