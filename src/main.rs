use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use site_daily_report::{app, cli, config, error, export, form, photos, scanner, store, weather};
use app::AppState;
use cli::{Cli, Commands};
use config::Config;
use export::paginate::Paginator;
use export::raster::Rasterizer;
use export::{DirectorySink, ExportCoordinator, ExportSelection};
use store::EntryFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = Config::load().context("設定ファイルを読み込めません")?;
    let client = reqwest::Client::new();
    let today = Local::now().date_naive();

    match cli.command {
        Commands::New {
            site,
            area,
            date,
            progress,
            weather: weather_text,
            lookup_weather,
            manpower,
            obstacles,
            safety,
            notes,
            photos: photo_dir,
            material,
            interactive,
        } => {
            println!("📝 daily-report - 日報作成\n");

            let mut app = AppState::new(store::open(&config, client.clone())?);
            let date = date.unwrap_or(today);

            let lookup = if lookup_weather {
                println!("- 天気を取得中...");
                Some(match config.coordinates() {
                    Some((lat, lon)) => {
                        weather::WeatherClient::new(client.clone(), config.weather_url.clone())
                            .current(lat, lon)
                            .await
                    }
                    None => Err(error::ReportError::LookupFailure(
                        "座標が未設定です (config --set-latitude/--set-longitude)".into(),
                    )),
                })
            } else {
                None
            };

            let loaded_photos = match &photo_dir {
                Some(dir) => {
                    let loaded = scanner::load_photos(dir)?;
                    println!("✔ {}枚の写真を読み込み", loaded.len());
                    loaded
                }
                None => Vec::new(),
            };

            let draft = app.new_draft(&site, date).await?;
            draft.area = area;
            draft.manpower = manpower;
            draft.obstacles = obstacles;
            draft.safety_incidents = safety;
            draft.notes = notes;
            if let Some(text) = weather_text {
                draft.weather = text;
            }
            if let Some(result) = lookup {
                weather::fill_weather(draft, result);
                println!("✔ 天気: {}", draft.weather);
            }
            for photo in loaded_photos {
                draft.add_photo(photo);
            }
            form::apply_arguments(draft, &progress, &material)?;

            if interactive {
                form::run_interactive(draft)?;
            }

            let store_name = app.store().describe();
            let saved = app
                .save_draft()
                .await
                .context("日報を保存できませんでした（入力内容は保存されていません）")?;
            println!("✔ 保存しました: {} ({} {})", saved.id, saved.date, saved.site);
            println!("  保存先: {}", store_name);
            println!("\n✅ 完了");
        }

        Commands::List { site, date } => {
            let mut app = AppState::new(store::open(&config, client)?);
            let filter = EntryFilter { site, date };
            let count = app.load(&filter).await?;

            if count == 0 {
                println!("日報がありません");
                return Ok(());
            }

            println!("日報一覧 ({}件):", count);
            for entry in app.entries() {
                println!(
                    "  {}  {}  {} / {}  写真{}枚",
                    entry.id,
                    entry.date,
                    entry.site,
                    if entry.area.is_empty() { "-" } else { &entry.area },
                    entry.photos.len()
                );
            }
        }

        Commands::Delete { id } => {
            let mut app = AppState::new(store::open(&config, client)?);
            app.delete(&id).await?;
            println!("✔ 削除しました: {}", id);
        }

        Commands::ExportPdf { id, all: _, output, slice_mode } => {
            println!("📄 daily-report - PDF出力\n");

            let mut app = AppState::new(store::open(&config, client.clone())?);
            app.load(&EntryFilter::all()).await?;

            let selection = match &id {
                Some(id) => ExportSelection::Single(
                    app.find(id)
                        .with_context(|| format!("日報が見つかりません: {}", id))?,
                ),
                None => {
                    if app.entries().is_empty() {
                        bail!("出力する日報がありません");
                    }
                    ExportSelection::All(app.entries())
                }
            };

            let font = config.load_font()?;
            if font.is_none() {
                println!("⚠ フォント未設定のため文字は描画されません (config --set-font)");
            }
            let mode = slice_mode.unwrap_or(config.slice_mode);
            let coordinator = ExportCoordinator::new(
                Paginator::new(Rasterizer::new(font), mode),
                photos::PhotoResolver::new(client),
            );
            let sink = DirectorySink::new(output.unwrap_or_else(|| config.output_dir()));

            println!("- PDFを生成中... (切り出し: {})", mode);
            let exported = coordinator.export_pdf(selection, today, &sink).await?;
            println!("✔ PDF出力: {} ({} bytes)", exported.location.display(), exported.bytes);
            println!("\n✅ エクスポート完了");
        }

        Commands::ExportJson { output } => {
            let mut app = AppState::new(store::open(&config, client)?);
            app.load(&EntryFilter::all()).await?;

            let sink = DirectorySink::new(output.unwrap_or_else(|| config.output_dir()));
            let exported = export::export_json(app.entries(), today, &sink)?;
            println!("✔ JSON出力: {} ({}件)", exported.location.display(), app.entries().len());
        }

        Commands::Config {
            show,
            set_backend,
            set_remote_url,
            set_output_dir,
            set_font,
            set_latitude,
            set_longitude,
            set_slice_mode,
        } => {
            let mut config = config;
            let mut changed = false;

            if let Some(backend) = set_backend {
                config.backend = backend;
                changed = true;
            }
            if let Some(url) = set_remote_url {
                config.remote_url = Some(url);
                changed = true;
            }
            if let Some(dir) = set_output_dir {
                config.output_dir = Some(dir);
                changed = true;
            }
            if let Some(font) = set_font {
                config.font_path = Some(font);
                changed = true;
            }
            if let Some(lat) = set_latitude {
                config.latitude = Some(lat);
                changed = true;
            }
            if let Some(lon) = set_longitude {
                config.longitude = Some(lon);
                changed = true;
            }
            if let Some(mode) = set_slice_mode {
                config.slice_mode = mode;
                changed = true;
            }

            if changed {
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                println!("設定:");
                println!("  保存先: {}", config.backend);
                match config.backend {
                    config::Backend::Local => {
                        println!("  保存ファイル: {}", config.local_store_path()?.display());
                    }
                    config::Backend::Remote => {
                        let status = match config.remote_credentials() {
                            Ok(creds) => format!("{} (キー設定済み)", creds.url),
                            Err(_) => "未設定".to_string(),
                        };
                        println!("  接続先: {}", status);
                        println!("  写真バケット: {}", config.photo_bucket);
                    }
                }
                println!("  出力フォルダ: {}", config.output_dir().display());
                println!(
                    "  フォント: {}",
                    config
                        .font_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                );
                match config.coordinates() {
                    Some((lat, lon)) => println!("  座標: {}, {}", lat, lon),
                    None => println!("  座標: 未設定"),
                }
                println!("  切り出し: {}", config.slice_mode);
            }
        }
    }

    Ok(())
}
