//! ローカル保存（JSONファイル1つに全件を書き戻す）

use super::{EntryFilter, EntryStore};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use daily_report_common::{entries_from_json, entries_to_json, Entry};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 保存順の全件（ファイルが無ければ空）
    async fn read_all(&self) -> Result<Vec<Entry>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => entries_from_json(&bytes)
                .map_err(|e| ReportError::Store(format!("{}: {}", self.path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(ReportError::Store(format!("{}: {}", self.path.display(), e))),
        }
    }

    /// 一時ファイルに書いてから置き換える
    async fn write_all(&self, entries: &[Entry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = entries_to_json(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl EntryStore for LocalStore {
    async fn list(&self, filter: &EntryFilter) -> Result<Vec<Entry>> {
        let mut entries: Vec<Entry> = self
            .read_all()
            .await?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();
        entries.reverse();
        Ok(entries)
    }

    async fn insert(&self, entry: &Entry) -> Result<()> {
        let mut entries = self
            .read_all()
            .await
            .map_err(|e| ReportError::UploadFailure(e.to_string()))?;
        if entries.iter().any(|e| e.id == entry.id) {
            return Err(ReportError::UploadFailure(format!("ID {} は保存済みです", entry.id)));
        }
        entries.push(entry.clone());
        self.write_all(&entries)
            .await
            .map_err(|e| ReportError::UploadFailure(e.to_string()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut entries = self.read_all().await?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Err(ReportError::Store(format!("エントリが見つかりません: {}", id)));
        }
        self.write_all(&entries).await
    }

    fn describe(&self) -> String {
        format!("local ({})", self.path.display())
    }
}
