//! 日報 → レイアウト変換
//!
//! 純粋関数。同じエントリからは常に同じレイアウトを返す。

use crate::entry::Entry;
use crate::escape::SafeText;
use crate::layout::{Block, GridCell, GridRow, Layout};

pub const REPORT_TITLE: &str = "Daily Report";
pub const PROGRESS_CAPTION: &str = "Category Progress";
pub const MATERIALS_CAPTION: &str = "Materials Required";
pub const PHOTOS_CAPTION: &str = "Photos";
/// 資材表を出さない場合の表示
pub const NO_MATERIALS: &str = "No";

/// 進捗表ヘッダ
const PROGRESS_HEADERS: &[&str] = &["Category", "Progress"];
/// 資材表ヘッダ
const MATERIAL_HEADERS: &[&str] = &["Item", "Qty", "Needed By", "Notes"];

/// 1件分のレイアウト
pub fn render(entry: &Entry) -> Layout {
    let mut layout = Layout::new();

    layout.push(Block::Heading {
        level: 1,
        text: SafeText::escape(REPORT_TITLE),
    });
    layout.push(Block::Heading {
        level: 2,
        text: SafeText::escape(&entry.date.format("%Y-%m-%d").to_string()),
    });

    layout.push(Block::MetadataGrid {
        rows: vec![
            GridRow::Pair(
                GridCell::new("Site", &entry.site),
                GridCell::new("Area", &entry.area),
            ),
            GridRow::Pair(
                GridCell::new("Weather", &entry.weather),
                GridCell::new("Manpower", &entry.manpower),
            ),
            GridRow::Pair(
                GridCell::new("Obstacles", &entry.obstacles),
                GridCell::new("Safety", &entry.safety_incidents),
            ),
            GridRow::Span(GridCell::new("Notes", &entry.notes)),
        ],
    });

    layout.push(Block::Table {
        caption: SafeText::escape(PROGRESS_CAPTION),
        headers: headers(PROGRESS_HEADERS),
        rows: entry
            .category_progress
            .iter()
            .map(|(name, value)| {
                vec![SafeText::escape(name), SafeText::escape(&format!("{}%", value))]
            })
            .collect(),
    });

    layout.push(materials_block(entry));

    layout.push(Block::PhotoGrid {
        caption: SafeText::escape(PHOTOS_CAPTION),
        photos: entry.photos.clone(),
    });

    layout
}

/// 複数件を改ページ区切りで連結
pub fn render_many(entries: &[Entry]) -> Layout {
    entries.iter().fold(Layout::new(), |mut layout, entry| {
        layout.append_with_break(render(entry));
        layout
    })
}

fn materials_block(entry: &Entry) -> Block {
    if !entry.has_material_table() {
        return Block::Placeholder {
            caption: SafeText::escape(MATERIALS_CAPTION),
            text: SafeText::escape(NO_MATERIALS),
        };
    }

    Block::Table {
        caption: SafeText::escape(MATERIALS_CAPTION),
        headers: headers(MATERIAL_HEADERS),
        rows: entry
            .material_items
            .iter()
            .map(|item| {
                let needed_by = item
                    .needed_by
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                vec![
                    SafeText::or_dash(&item.name),
                    SafeText::or_dash(&item.quantity),
                    SafeText::or_dash(&needed_by),
                    SafeText::or_dash(&item.notes),
                ]
            })
            .collect(),
    }
}

fn headers(labels: &[&str]) -> Vec<SafeText> {
    labels.iter().map(|label| SafeText::escape(label)).collect()
}
