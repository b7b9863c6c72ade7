use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("描画領域が準備されていません")]
    RenderTargetUnavailable,

    #[error("別のエクスポートが実行中です")]
    ExportInProgress,

    #[error("保存に失敗しました: {0}")]
    UploadFailure(String),

    #[error("天気情報の取得に失敗しました: {0}")]
    LookupFailure(String),

    #[error("データ読み込みエラー: {0}")]
    Store(String),

    #[error("保存する下書きがありません")]
    NoDraft,

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("描画エラー: {0}")]
    Render(String),

    #[error("画像処理エラー: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF生成エラー: {0}")]
    PdfGeneration(String),

    #[error("通信エラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] daily_report_common::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
