use crate::error::{ReportError, Result};
use crate::export::paginate::SliceMode;
use ab_glyph::FontVec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_REMOTE_URL: &str = "DAILY_REPORT_URL";
pub const ENV_REMOTE_KEY: &str = "DAILY_REPORT_KEY";

const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";
const DEFAULT_PHOTO_BUCKET: &str = "daily-report-photos";

/// 保存先
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// 端末内のJSONファイル
    #[default]
    Local,
    /// 行ストア（REST）
    Remote,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Local => write!(f, "local"),
            Backend::Remote => write!(f, "remote"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub backend: Backend,
    pub local_path: Option<PathBuf>,
    pub remote_url: Option<String>,
    pub remote_key: Option<String>,
    pub photo_bucket: String,
    pub output_dir: Option<PathBuf>,
    pub font_path: Option<PathBuf>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub slice_mode: SliceMode,
    pub weather_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Local,
            local_path: None,
            remote_url: None,
            remote_key: None,
            photo_bucket: DEFAULT_PHOTO_BUCKET.into(),
            output_dir: None,
            font_path: None,
            latitude: None,
            longitude: None,
            slice_mode: SliceMode::Crop,
            weather_url: DEFAULT_WEATHER_URL.into(),
        }
    }
}

/// 行ストアの接続情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCredentials {
    pub url: String,
    pub key: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReportError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("daily-report").join("config.json"))
    }

    /// ローカル保存ファイルの場所
    pub fn local_store_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.local_path {
            return Ok(path.clone());
        }
        let data = dirs::data_dir()
            .ok_or_else(|| ReportError::Config("データディレクトリが見つかりません".into()))?;
        Ok(data.join("daily-report").join("entries.json"))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    pub fn remote_credentials(&self) -> Result<RemoteCredentials> {
        // 環境変数を優先
        resolve_credentials(
            std::env::var(ENV_REMOTE_URL).ok(),
            std::env::var(ENV_REMOTE_KEY).ok(),
            self.remote_url.as_deref(),
            self.remote_key.as_deref(),
        )
    }

    /// 描画用フォント（未設定なら None）
    pub fn load_font(&self) -> Result<Option<FontVec>> {
        let Some(path) = &self.font_path else {
            return Ok(None);
        };
        let bytes = std::fs::read(path)?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| ReportError::Config(format!("フォントを読み込めません ({}): {}", path.display(), e)))?;
        Ok(Some(font))
    }
}

/// 接続情報の決定（環境変数 > 設定ファイル）
pub fn resolve_credentials(
    env_url: Option<String>,
    env_key: Option<String>,
    file_url: Option<&str>,
    file_key: Option<&str>,
) -> Result<RemoteCredentials> {
    let pick = |env: Option<String>, file: Option<&str>| {
        env.filter(|v| !v.trim().is_empty())
            .or_else(|| file.filter(|v| !v.trim().is_empty()).map(str::to_string))
    };

    let url = pick(env_url, file_url)
        .ok_or_else(|| ReportError::Config(format!("接続先URLが未設定です ({} または remoteUrl)", ENV_REMOTE_URL)))?;
    let key = pick(env_key, file_key)
        .ok_or_else(|| ReportError::Config(format!("アクセスキーが未設定です ({} または remoteKey)", ENV_REMOTE_KEY)))?;

    Ok(RemoteCredentials {
        url: url.trim_end_matches('/').to_string(),
        key,
    })
}
