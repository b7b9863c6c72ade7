use crate::config::Backend;
use crate::export::paginate::SliceMode;
use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "daily-report")]
#[command(about = "改修工事の作業日報 作成・PDF出力ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 日報を作成して保存
    New {
        /// 現場名
        #[arg(short, long, required = true)]
        site: String,

        /// エリア・部屋
        #[arg(short, long, default_value = "")]
        area: String,

        /// 対象日 YYYY-MM-DD（デフォルト: 今日）
        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        /// 進捗率 工程=数値（複数指定可）
        #[arg(short, long = "progress")]
        progress: Vec<String>,

        /// 天気（手入力）
        #[arg(long, conflicts_with = "lookup_weather")]
        weather: Option<String>,

        /// 設定の座標から現在の天気を取得
        #[arg(long)]
        lookup_weather: bool,

        /// 人員
        #[arg(long, default_value = "")]
        manpower: String,

        /// 支障・課題
        #[arg(long, default_value = "")]
        obstacles: String,

        /// 安全・事故
        #[arg(long, default_value = "")]
        safety: String,

        /// 備考
        #[arg(long, default_value = "")]
        notes: String,

        /// 写真フォルダ（jpg/png）
        #[arg(long)]
        photos: Option<PathBuf>,

        /// 資材 品名:数量[:YYYY-MM-DD[:備考]]（複数指定可）
        #[arg(short, long = "material")]
        material: Vec<String>,

        /// 対話式で入力
        #[arg(short, long)]
        interactive: bool,
    },

    /// 保存済みの日報を一覧表示
    List {
        #[arg(short, long)]
        site: Option<String>,

        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// 日報を削除
    Delete {
        #[arg(required = true)]
        id: String,
    },

    /// PDFを出力
    #[command(group(ArgGroup::new("selection").required(true).args(["id", "all"])))]
    ExportPdf {
        /// 出力する日報のID
        #[arg(long)]
        id: Option<String>,

        /// 全件をまとめて出力
        #[arg(long)]
        all: bool,

        /// 出力フォルダ（デフォルト: 設定の outputDir）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ページの切り出し方 (crop/legacy)
        #[arg(long)]
        slice_mode: Option<SliceMode>,
    },

    /// 全件をJSONで出力
    ExportJson {
        /// 出力フォルダ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示・変更
    Config {
        /// 現在の設定を表示
        #[arg(long)]
        show: bool,

        /// 保存先 (local/remote)
        #[arg(long)]
        set_backend: Option<Backend>,

        /// 行ストアのURL
        #[arg(long)]
        set_remote_url: Option<String>,

        /// 出力フォルダ
        #[arg(long)]
        set_output_dir: Option<PathBuf>,

        /// 描画用フォント（TTF/OTF）
        #[arg(long)]
        set_font: Option<PathBuf>,

        /// 天気取得の緯度
        #[arg(long, allow_hyphen_values = true)]
        set_latitude: Option<f64>,

        /// 天気取得の経度
        #[arg(long, allow_hyphen_values = true)]
        set_longitude: Option<f64>,

        /// ページの切り出し方 (crop/legacy)
        #[arg(long)]
        set_slice_mode: Option<SliceMode>,
    },
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    daily_report_common::parse_date(raw).map_err(|e| e.to_string())
}
