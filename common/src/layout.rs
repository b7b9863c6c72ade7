//! レイアウトツリー
//!
//! 日報1件（または複数件）をラスタライズ前のブロック列で表現する。
//! テキストはすべて `SafeText`（エスケープ済み）で保持する。

use crate::escape::{escape_html, SafeText};
use crate::image_source::ImageSource;

/// メタデータ表の1セル
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub label: SafeText,
    pub value: SafeText,
}

impl GridCell {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: SafeText::escape(label),
            value: SafeText::or_dash(value),
        }
    }
}

/// メタデータ表の1行（2列 or 全幅）
#[derive(Debug, Clone, PartialEq)]
pub enum GridRow {
    Pair(GridCell, GridCell),
    Span(GridCell),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading {
        level: u8,
        text: SafeText,
    },
    MetadataGrid {
        rows: Vec<GridRow>,
    },
    Table {
        caption: SafeText,
        headers: Vec<SafeText>,
        rows: Vec<Vec<SafeText>>,
    },
    /// 表の代わりに出す1行ブロック（資材なし = "No"）
    Placeholder {
        caption: SafeText,
        text: SafeText,
    },
    PhotoGrid {
        caption: SafeText,
        photos: Vec<ImageSource>,
    },
    /// 以降を次ページから開始
    PageBreak,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub blocks: Vec<Block>,
}

impl Block {
    pub fn photo_count(&self) -> usize {
        match self {
            Block::PhotoGrid { photos, .. } => photos.len(),
            _ => 0,
        }
    }
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// 改ページを挟んで連結
    pub fn append_with_break(&mut self, other: Layout) {
        if !self.blocks.is_empty() {
            self.blocks.push(Block::PageBreak);
        }
        self.blocks.extend(other.blocks);
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn page_breaks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::PageBreak))
            .count()
    }

    /// 改ページで区切った区間（最低1区間）
    ///
    /// 各区間はページ先頭から始まる。
    pub fn sections(&self) -> impl Iterator<Item = &[Block]> {
        self.blocks.split(|b| matches!(b, Block::PageBreak))
    }

    /// 全写真（ブロック順）
    pub fn photos(&self) -> impl Iterator<Item = &ImageSource> {
        self.blocks.iter().flat_map(|block| match block {
            Block::PhotoGrid { photos, .. } => photos.as_slice(),
            _ => &[][..],
        })
    }

    /// HTML断片に変換（同じ入力なら同じ出力）
    pub fn to_markup(&self) -> String {
        let mut html = String::new();
        html.push_str("<section class=\"report\">\n");
        for block in &self.blocks {
            write_block(&mut html, block);
        }
        html.push_str("</section>\n");
        html
    }
}

fn write_block(html: &mut String, block: &Block) {
    match block {
        Block::Heading { level, text } => {
            let level = (*level).clamp(1, 6);
            html.push_str(&format!("<h{0}>{1}</h{0}>\n", level, text));
        }
        Block::MetadataGrid { rows } => {
            html.push_str("<table class=\"meta\">\n");
            for row in rows {
                match row {
                    GridRow::Pair(left, right) => {
                        html.push_str(&format!(
                            "<tr><th>{}</th><td>{}</td><th>{}</th><td>{}</td></tr>\n",
                            left.label, left.value, right.label, right.value
                        ));
                    }
                    GridRow::Span(cell) => {
                        html.push_str(&format!(
                            "<tr><th>{}</th><td colspan=\"3\">{}</td></tr>\n",
                            cell.label, cell.value
                        ));
                    }
                }
            }
            html.push_str("</table>\n");
        }
        Block::Table { caption, headers, rows } => {
            html.push_str(&format!("<h3>{}</h3>\n<table class=\"grid\">\n<thead><tr>", caption));
            for header in headers {
                html.push_str(&format!("<th>{}</th>", header));
            }
            html.push_str("</tr></thead>\n<tbody>\n");
            for row in rows {
                html.push_str("<tr>");
                for cell in row {
                    html.push_str(&format!("<td>{}</td>", cell));
                }
                html.push_str("</tr>\n");
            }
            html.push_str("</tbody>\n</table>\n");
        }
        Block::Placeholder { caption, text } => {
            html.push_str(&format!(
                "<h3>{}</h3>\n<div class=\"placeholder\">{}</div>\n",
                caption, text
            ));
        }
        Block::PhotoGrid { caption, photos } => {
            html.push_str(&format!("<h3>{}</h3>\n<div class=\"photos\">\n", caption));
            for photo in photos {
                html.push_str(&format!(
                    "<img class=\"thumb\" src=\"{}\" alt=\"\">\n",
                    escape_html(&photo.to_uri())
                ));
            }
            html.push_str("</div>\n");
        }
        Block::PageBreak => html.push_str("<div class=\"page-break\"></div>\n"),
    }
}
