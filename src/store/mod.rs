//! エントリの保存先
//!
//! - LocalStore: 端末内のJSONファイル
//! - RemoteStore: REST行ストア + 写真用オブジェクトストレージ

pub mod local;
pub mod remote;

use crate::config::{Backend, Config};
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use daily_report_common::Entry;

pub use local::LocalStore;
pub use remote::RemoteStore;

/// 一覧取得の絞り込み条件（未指定は全件）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub site: Option<String>,
    pub date: Option<NaiveDate>,
}

impl EntryFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_site(site: impl Into<String>) -> Self {
        Self {
            site: Some(site.into()),
            date: None,
        }
    }

    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        let site_ok = self
            .site
            .as_deref()
            .map_or(true, |site| entry.site.trim() == site.trim());
        let date_ok = self.date.map_or(true, |date| entry.date == date);
        site_ok && date_ok
    }
}

/// 保存先の共通インターフェース
///
/// 一覧は新しく保存した順。保存済みエントリの上書きはしない（追加と削除のみ）。
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn list(&self, filter: &EntryFilter) -> Result<Vec<Entry>>;

    async fn insert(&self, entry: &Entry) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// 表示用の保存先名
    fn describe(&self) -> String;
}

/// 設定に応じた保存先を開く
pub fn open(config: &Config, client: reqwest::Client) -> Result<Box<dyn EntryStore>> {
    match config.backend {
        Backend::Local => Ok(Box::new(LocalStore::new(config.local_store_path()?))),
        Backend::Remote => {
            let creds = config.remote_credentials()?;
            Ok(Box::new(RemoteStore::new(client, creds, &config.photo_bucket)))
        }
    }
}
