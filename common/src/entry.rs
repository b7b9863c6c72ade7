//! 日報エントリの型定義
//!
//! - Entry: 1日分の日報
//! - CategoryProgress: 工程ごとの進捗率（挿入順を保持、0〜100にクランプ）
//! - MaterialItem: 資材手配の1行

use crate::error::{Error, Result};
use crate::image_source::ImageSource;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 新規エントリに必ず含まれる工程（表示順）
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Demolition",
    "Framing",
    "Plumbing",
    "Electrical",
    "HVAC",
    "Insulation",
    "Drywall",
    "Painting",
    "Flooring",
    "Tiling",
    "Cabinetry",
    "Fixtures",
    "Cleanup",
];

/// 進捗率を 0〜100 に丸める
pub fn clamp_percent(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

// ============================================
// CategoryProgress
// ============================================

/// 工程名 → 進捗率(%)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, i64>")]
pub struct CategoryProgress(IndexMap<String, u8>);

impl From<IndexMap<String, i64>> for CategoryProgress {
    fn from(raw: IndexMap<String, i64>) -> Self {
        Self(
            raw.into_iter()
                .map(|(name, value)| (name, clamp_percent(value)))
                .collect(),
        )
    }
}

impl CategoryProgress {
    /// 既定工程をすべて0%で作成
    pub fn with_defaults() -> Self {
        Self(
            DEFAULT_CATEGORIES
                .iter()
                .map(|name| (name.to_string(), 0))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<u8> {
        self.0.get(name).copied()
    }

    /// 値を設定（未登録なら末尾に追加）
    pub fn set(&mut self, name: &str, value: i64) {
        self.0.insert(name.to_string(), clamp_percent(value));
    }

    /// 工程を追加。既に存在する場合は false
    pub fn add_category(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.0.contains_key(name) {
            return false;
        }
        self.0.insert(name.to_string(), 0);
        true
    }

    /// 工程を削除（残りの順序は維持）
    pub fn remove_category(&mut self, name: &str) -> Option<u8> {
        self.0.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================
// MaterialItem
// ============================================

/// 資材手配
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    /// 必要日（空文字 = 未指定）
    #[serde(default, with = "optional_date")]
    pub needed_by: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

impl MaterialItem {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            quantity: quantity.into(),
            needed_by: None,
            notes: String::new(),
        }
    }
}

mod optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_str(&d.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

// ============================================
// Entry
// ============================================

/// 作業日報（1日分）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// 作成時に採番、以後不変
    pub id: String,

    /// 対象日
    pub date: NaiveDate,

    #[serde(default)]
    pub site: String,

    #[serde(default)]
    pub area: String,

    #[serde(default)]
    pub category_progress: CategoryProgress,

    #[serde(default)]
    pub weather: String,

    #[serde(default)]
    pub obstacles: String,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub manpower: String,

    #[serde(default)]
    pub safety_incidents: String,

    /// false の場合 material_items は出力しない
    #[serde(default)]
    pub materials_required: bool,

    #[serde(default)]
    pub material_items: Vec<MaterialItem>,

    #[serde(default)]
    pub photos: Vec<ImageSource>,
}

/// `YYYY-MM-DD` 形式の日付を解析
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate(raw.to_string()))
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Entry {
    /// 既定工程0%の空エントリ
    pub fn blank(date: NaiveDate) -> Self {
        Self {
            id: new_id(),
            date,
            site: String::new(),
            area: String::new(),
            category_progress: CategoryProgress::with_defaults(),
            weather: String::new(),
            obstacles: String::new(),
            notes: String::new(),
            manpower: String::new(),
            safety_incidents: String::new(),
            materials_required: false,
            material_items: Vec::new(),
            photos: Vec::new(),
        }
    }

    /// 現場の新規エントリ
    ///
    /// 同じ現場の最新エントリがあれば進捗率を引き継ぐ。履歴は読むだけ。
    pub fn for_site(site: &str, date: NaiveDate, history: &[Entry]) -> Self {
        let mut entry = Self::blank(date);
        entry.site = site.trim().to_string();
        if let Some(previous) = latest_for_site(site, history) {
            entry.category_progress = previous.category_progress.clone();
        }
        entry
    }

    pub fn add_material(&mut self, item: MaterialItem) {
        self.material_items.push(item);
    }

    pub fn remove_material(&mut self, id: &str) -> Option<MaterialItem> {
        let pos = self.material_items.iter().position(|m| m.id == id)?;
        Some(self.material_items.remove(pos))
    }

    pub fn add_photo(&mut self, photo: ImageSource) {
        self.photos.push(photo);
    }

    pub fn remove_photo(&mut self, index: usize) -> Option<ImageSource> {
        (index < self.photos.len()).then(|| self.photos.remove(index))
    }

    /// 資材表を出力するか
    pub fn has_material_table(&self) -> bool {
        self.materials_required && !self.material_items.is_empty()
    }
}

/// 現場ごとの最新エントリ（同日なら後に追加されたもの）
pub fn latest_for_site<'a>(site: &str, history: &'a [Entry]) -> Option<&'a Entry> {
    let site = site.trim();
    history
        .iter()
        .filter(|e| e.site.trim() == site)
        .max_by_key(|e| e.date)
}

/// エントリ一覧を整形済みJSONに変換
pub fn entries_to_json(entries: &[Entry]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(entries)?)
}

pub fn entries_from_json(bytes: &[u8]) -> Result<Vec<Entry>> {
    Ok(serde_json::from_slice(bytes)?)
}
