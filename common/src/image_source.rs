//! 写真ソース
//!
//! 端末で選択した写真（インラインのバイト列）と、保存済みの写真（リモートURL）を
//! 1つの型で扱う。JSON上はどちらも文字列:
//! - インライン: `data:<mime>;base64,<data>`
//! - リモート: `https://...`

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// 端末で読み込んだ画像データ
    Inline { mime: String, bytes: Vec<u8> },
    /// 保存先で解決済みのURL
    Remote(String),
}

impl ImageSource {
    pub fn inline(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::Inline { mime: mime.into(), bytes }
    }

    pub fn remote(url: impl Into<String>) -> Self {
        Self::Remote(url.into())
    }

    /// 拡張子からMIMEタイプを推定（対応形式のみ）
    pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some("image/jpeg"),
            "png" => Some("image/png"),
            _ => None,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// 文字列表現（data URL または URL）
    pub fn to_uri(&self) -> String {
        match self {
            Self::Inline { mime, bytes } => {
                format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
            }
            Self::Remote(url) => url.clone(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();

        if let Some(rest) = raw.strip_prefix("data:") {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| Error::InvalidImageSource(truncate(raw)))?;
            let mime = header
                .strip_suffix(";base64")
                .ok_or_else(|| Error::InvalidImageSource(truncate(raw)))?;
            let bytes = STANDARD
                .decode(payload)
                .map_err(|e| Error::InvalidImageSource(format!("{}: {}", truncate(raw), e)))?;
            return Ok(Self::inline(mime, bytes));
        }

        if raw.starts_with("https://") || raw.starts_with("http://") {
            return Ok(Self::remote(raw));
        }

        Err(Error::InvalidImageSource(truncate(raw)))
    }
}

/// エラーメッセージ用にdata URLを短縮
fn truncate(raw: &str) -> String {
    const MAX: usize = 48;
    if raw.chars().count() > MAX {
        let head: String = raw.chars().take(MAX).collect();
        format!("{}...", head)
    } else {
        raw.to_string()
    }
}

// data URLはログに出すと長すぎるのでサイズだけ表示
impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline { mime, bytes } => f
                .debug_struct("Inline")
                .field("mime", mime)
                .field("len", &bytes.len())
                .finish(),
            Self::Remote(url) => f.debug_tuple("Remote").field(url).finish(),
        }
    }
}

impl FromStr for ImageSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ImageSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_uri())
    }
}

impl<'de> Deserialize<'de> for ImageSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
