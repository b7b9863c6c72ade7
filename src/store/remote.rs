//! REST行ストア（PostgREST互換）
//!
//! テーブル `daily_reports`、写真はオブジェクトストレージに内容ハッシュ名で置き、
//! 行には公開URLだけを保存する。

use super::{EntryFilter, EntryStore};
use crate::config::RemoteCredentials;
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use daily_report_common::{CategoryProgress, Entry, ImageSource, MaterialItem};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const TABLE: &str = "daily_reports";

/// 行の形
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRow {
    pub id: String,
    pub entry_date: NaiveDate,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub category_progress: CategoryProgress,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub obstacles: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub manpower: Option<String>,
    #[serde(default)]
    pub safety_incidents: Option<String>,
    #[serde(default)]
    pub materials_required: bool,
    #[serde(default)]
    pub material_items: Vec<MaterialItem>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    /// サーバ側で採番
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl EntryRow {
    /// 写真はURL化済みであること
    pub fn from_entry(entry: &Entry, photo_urls: Vec<String>) -> Self {
        let text = |s: &str| Some(s.to_string());
        Self {
            id: entry.id.clone(),
            entry_date: entry.date,
            site: text(&entry.site),
            area: text(&entry.area),
            category_progress: entry.category_progress.clone(),
            weather: text(&entry.weather),
            obstacles: text(&entry.obstacles),
            notes: text(&entry.notes),
            manpower: text(&entry.manpower),
            safety_incidents: text(&entry.safety_incidents),
            materials_required: entry.materials_required,
            material_items: entry.material_items.clone(),
            photo_urls,
            created_at: None,
        }
    }

    pub fn into_entry(self) -> Entry {
        let photos = self
            .photo_urls
            .iter()
            .filter_map(|url| match ImageSource::parse(url) {
                Ok(source) => Some(source),
                Err(e) => {
                    log::warn!("写真URLを無視します ({}): {}", self.id, e);
                    None
                }
            })
            .collect();

        Entry {
            id: self.id,
            date: self.entry_date,
            site: self.site.unwrap_or_default(),
            area: self.area.unwrap_or_default(),
            category_progress: self.category_progress,
            weather: self.weather.unwrap_or_default(),
            obstacles: self.obstacles.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
            manpower: self.manpower.unwrap_or_default(),
            safety_incidents: self.safety_incidents.unwrap_or_default(),
            materials_required: self.materials_required,
            material_items: self.material_items,
            photos,
        }
    }
}

/// 内容ハッシュによる写真のオブジェクト名
pub fn photo_object_name(mime: &str, bytes: &[u8]) -> String {
    let hash = hex::encode(Sha256::digest(bytes));
    let ext = match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    };
    format!("{}.{}", hash, ext)
}

pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
    key: String,
    bucket: String,
}

impl RemoteStore {
    pub fn new(client: reqwest::Client, creds: RemoteCredentials, bucket: &str) -> Self {
        Self {
            client,
            base_url: creds.url,
            key: creds.key,
            bucket: bucket.to_string(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TABLE)
    }

    fn object_url(&self, name: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, name)
    }

    pub fn public_url(&self, name: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, self.bucket, name)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    /// インライン写真をアップロードしてURLの並びにする（順序は保持）
    async fn upload_photos(&self, photos: &[ImageSource]) -> Result<Vec<String>> {
        let mut urls = Vec::with_capacity(photos.len());
        for photo in photos {
            match photo {
                ImageSource::Remote(url) => urls.push(url.clone()),
                ImageSource::Inline { mime, bytes } => {
                    let name = photo_object_name(mime, bytes);
                    self.authorized(self.client.post(self.object_url(&name)))
                        .header(reqwest::header::CONTENT_TYPE, mime.as_str())
                        .header("x-upsert", "true")
                        .body(bytes.clone())
                        .send()
                        .await
                        .and_then(|r| r.error_for_status())
                        .map_err(|e| ReportError::UploadFailure(format!("写真 {}: {}", name, e)))?;
                    log::debug!("写真アップロード: {}", name);
                    urls.push(self.public_url(&name));
                }
            }
        }
        Ok(urls)
    }
}

fn query_for(filter: &EntryFilter) -> Vec<(&'static str, String)> {
    let mut query = vec![("select", "*".to_string())];
    if let Some(site) = &filter.site {
        query.push(("site", format!("eq.{}", site.trim())));
    }
    if let Some(date) = filter.date {
        query.push(("entry_date", format!("eq.{}", date.format("%Y-%m-%d"))));
    }
    query.push(("order", "created_at.desc".to_string()));
    query
}

#[async_trait]
impl EntryStore for RemoteStore {
    async fn list(&self, filter: &EntryFilter) -> Result<Vec<Entry>> {
        let rows: Vec<EntryRow> = self
            .authorized(self.client.get(self.table_url()))
            .query(&query_for(filter))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ReportError::Store(e.to_string()))?
            .json()
            .await
            .map_err(|e| ReportError::Store(e.to_string()))?;
        Ok(rows.into_iter().map(EntryRow::into_entry).collect())
    }

    async fn insert(&self, entry: &Entry) -> Result<()> {
        let urls = self.upload_photos(&entry.photos).await?;
        let row = EntryRow::from_entry(entry, urls);
        self.authorized(self.client.post(self.table_url()))
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ReportError::UploadFailure(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.authorized(self.client.delete(self.table_url()))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ReportError::UploadFailure(e.to_string()))?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("remote ({})", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RemoteStore {
        RemoteStore::new(
            reqwest::Client::new(),
            RemoteCredentials {
                url: "https://db.example.com".into(),
                key: "k".into(),
            },
            "photos",
        )
    }

    #[test]
    fn test_row_roundtrip() {
        let mut entry = Entry::blank(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        entry.site = "Prime 11 Unit 213".into();
        entry.category_progress.set("Demolition", 80);
        entry.add_photo(ImageSource::remote("https://cdn.example.com/a.jpg"));

        let urls = vec!["https://cdn.example.com/a.jpg".to_string()];
        let row = EntryRow::from_entry(&entry, urls);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["entry_date"], "2024-03-05");
        assert_eq!(json["category_progress"]["Demolition"], 80);
        assert!(json.get("created_at").is_none());

        let back: EntryRow = serde_json::from_value(json).unwrap();
        assert_eq!(back.into_entry(), entry);
    }

    #[test]
    fn test_row_with_nulls() {
        let row: EntryRow = serde_json::from_str(
            r#"{"id":"x","entry_date":"2024-03-05","site":null,"weather":null,
                "photo_urls":["ftp://bad","https://ok.example.com/p.png"],
                "created_at":"2024-03-05T10:00:00Z"}"#,
        )
        .unwrap();
        let entry = row.into_entry();
        assert_eq!(entry.site, "");
        assert_eq!(entry.photos.len(), 1);
    }

    #[test]
    fn test_photo_object_name_is_content_addressed() {
        let a = photo_object_name("image/jpeg", b"abc");
        assert_eq!(a, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad.jpg");
        assert_eq!(photo_object_name("image/png", b"abc").rsplit('.').next(), Some("png"));
    }

    #[test]
    fn test_urls() {
        let store = store();
        assert_eq!(store.table_url(), "https://db.example.com/rest/v1/daily_reports");
        assert_eq!(
            store.public_url("h.jpg"),
            "https://db.example.com/storage/v1/object/public/photos/h.jpg"
        );
    }

    #[test]
    fn test_query_for_filter() {
        let filter = EntryFilter::for_site("A").on_date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        let query = query_for(&filter);
        assert!(query.contains(&("site", "eq.A".to_string())));
        assert!(query.contains(&("entry_date", "eq.2024-03-05".to_string())));
        assert_eq!(query.last(), Some(&("order", "created_at.desc".to_string())));
    }
}
