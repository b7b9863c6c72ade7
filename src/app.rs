//! アプリケーション状態
//!
//! 保存済み一覧と編集中の下書きを持つ。保存先への書き込みはここを通す。

use crate::error::{ReportError, Result};
use crate::store::{EntryFilter, EntryStore};
use chrono::NaiveDate;
use daily_report_common::Entry;

pub struct AppState {
    store: Box<dyn EntryStore>,
    entries: Vec<Entry>,
    draft: Option<Entry>,
}

impl AppState {
    pub fn new(store: Box<dyn EntryStore>) -> Self {
        Self {
            store,
            entries: Vec::new(),
            draft: None,
        }
    }

    pub fn store(&self) -> &dyn EntryStore {
        self.store.as_ref()
    }

    /// 表示用の一覧（日付の新しい順）
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn find(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn draft(&self) -> Option<&Entry> {
        self.draft.as_ref()
    }

    pub async fn load(&mut self, filter: &EntryFilter) -> Result<usize> {
        let mut entries = self.store.list(filter).await?;
        // 同日は保存先の順（新しく保存した順）を保つ
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        self.entries = entries;
        Ok(self.entries.len())
    }

    /// 新しい下書きを作る
    ///
    /// 同じ現場の最新エントリから進捗率を引き継ぐ。一覧は変更しない。
    pub async fn new_draft(&mut self, site: &str, date: NaiveDate) -> Result<&mut Entry> {
        let history = match self.store.list(&EntryFilter::for_site(site)).await {
            Ok(history) => history,
            Err(e) => {
                log::warn!("履歴を取得できないため既定値で作成します: {}", e);
                self.entries.clone()
            }
        };
        // 保存先は新しい順で返すので、保存順に戻してから最新を探す
        let history: Vec<Entry> = history.into_iter().rev().collect();
        let draft = Entry::for_site(site, date, &history);
        Ok(self.draft.insert(draft))
    }

    /// 下書きを保存して一覧に加える
    ///
    /// 失敗した場合、下書きはそのまま残る。
    pub async fn save_draft(&mut self) -> Result<&Entry> {
        let draft = self.draft.as_ref().ok_or(ReportError::NoDraft)?;
        self.store.insert(draft).await?;

        let saved = self.draft.take().ok_or(ReportError::NoDraft)?;
        let pos = self
            .entries
            .iter()
            .position(|e| e.date <= saved.date)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, saved);
        Ok(&self.entries[pos])
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.store.delete(id).await?;
        self.entries.retain(|e| e.id != id);
        Ok(())
    }
}
