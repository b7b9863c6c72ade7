//! Daily Report Common Library
//!
//! CLIと各フロントエンドで共有する型と純粋ロジック
//! （エントリモデル・レイアウト・レンダラ・ページ寸法・天気コード）

pub mod entry;
pub mod error;
pub mod escape;
pub mod image_source;
pub mod layout;
pub mod page;
pub mod render;
pub mod weather;

pub use entry::{
    clamp_percent, entries_from_json, entries_to_json, latest_for_site, parse_date, CategoryProgress,
    Entry, MaterialItem, DEFAULT_CATEGORIES,
};
pub use error::{Error, Result};
pub use escape::SafeText;
pub use image_source::ImageSource;
pub use layout::{Block, GridCell, GridRow, Layout};
pub use page::PageSize;
pub use render::{render, render_many};
pub use weather::{describe_weather_code, WeatherReading};
