use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use kit_scan::{cli, config, error, export, ocr, scanner, storage, verify};
use cli::{Cli, Commands, MaterialAction, SessionAction, TemplateAction};
use config::Config;
use error::{KitScanError, Result};
use kit_scan_common::{build_ocr_prompt_for, Backup, PendingScan, ReconciliationStore};
use std::path::PathBuf;
use std::time::Duration;
use storage::FileStorage;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type Store = ReconciliationStore<FileStorage>;

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "kit_scan=debug,kit_scan_common=debug"
    } else {
        "kit_scan=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn format_timestamp(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;
    let data_dir = config.resolve_data_dir(cli.data_dir.clone())?;
    tracing::debug!("データディレクトリ: {}", data_dir.display());
    let mut store = Store::open(FileStorage::new(&data_dir));

    match cli.command {
        Commands::Template { action } => run_template(&mut store, action)?,

        Commands::Material { action } => run_material(&mut store, action)?,

        Commands::Scan { target, provider, yes } => {
            println!("📋 kit-scan - 用紙読み取り\n");

            // 1. 画像収集
            println!("[1/3] 画像をスキャン中...");
            let images = scanner::collect_images(&target)?;
            if images.is_empty() {
                return Err(KitScanError::NoImagesFound(target.display().to_string()));
            }
            println!("✔ {}枚の画像を検出\n", images.len());

            let template = store.current_template().clone();
            let prompt = build_ocr_prompt_for(&template);
            println!("テンプレート: {} ({})", template.name, template.id);
            println!("AIプロバイダ: {}\n", provider.display_name());

            let mut confirmed = 0usize;
            for (i, image) in images.iter().enumerate() {
                // 2. OCR
                println!("[2/3] ({}/{}) {}", i + 1, images.len(), image.file_name);
                let spinner = create_spinner("読み取り中...");
                let result = ocr::extract_items(provider, image, &prompt, &config).await;
                spinner.finish_and_clear();

                let items = match result {
                    Ok(items) => items,
                    Err(e) => {
                        println!("✖ 読み取り失敗: {}\n", e);
                        continue;
                    }
                };

                let mut pending = PendingScan::from_ocr(&image.file_name, items);
                if pending.is_empty() {
                    println!("⚠ 明細が読み取れませんでした。スキップします\n");
                    continue;
                }

                // 3. 確認
                println!("[3/3] 確認");
                let outcome = if yes {
                    verify::print_pending(&pending);
                    verify::VerifyOutcome::Confirmed
                } else {
                    verify::run_interactive_verify(&mut pending)?
                };

                match outcome {
                    verify::VerifyOutcome::Confirmed => {
                        if let Some(id) = pending.confirm(&mut store) {
                            confirmed += 1;
                            println!("✔ 履歴に追加: {}\n", id);
                        }
                    }
                    verify::VerifyOutcome::Discarded => println!("→ 破棄しました\n"),
                }
            }

            println!("✅ 完了: {}/{}枚を確定", confirmed, images.len());
        }

        Commands::Session { action } => run_session(&mut store, action)?,

        Commands::Report { format, output, title } => {
            let report = store.report();
            if let Some(path) = export::export_report(&report, format, output.as_deref(), &title)? {
                println!(
                    "✔ 出力: {} ({}行, {}セッション)",
                    path.display(),
                    report.entries.len(),
                    report.session_count
                );
            }
        }

        Commands::Backup { output } => {
            let backup = store.backup();
            let path = output.unwrap_or_else(|| PathBuf::from(backup.file_name()));
            std::fs::write(&path, backup.to_json_pretty()?)?;
            println!(
                "✔ バックアップ: {} (テンプレート{}件, セッション{}件)",
                path.display(),
                backup.templates.len(),
                backup.sessions.len()
            );
        }

        Commands::Restore { input } => {
            if !input.exists() {
                return Err(KitScanError::FileNotFound(input.display().to_string()));
            }
            let content = std::fs::read_to_string(&input)?;
            let backup = Backup::from_json(&content)?;
            store.restore(backup);
            println!(
                "✔ 復元しました (テンプレート{}件, セッション{}件)",
                store.templates().len(),
                store.sessions().len()
            );
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  データ: {}", data_dir.display());
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}

fn run_template(store: &mut Store, action: TemplateAction) -> Result<()> {
    match action {
        TemplateAction::List => {
            let current = store.current_template_id().to_string();
            for t in store.templates() {
                let mark = if t.id == current { "*" } else { " " };
                println!("{} {:<38} {} ({}品目)", mark, t.id, t.name, t.materials.len());
            }
        }
        TemplateAction::Show { id } => {
            let template = match id {
                Some(id) => store
                    .find_template(&id)
                    .ok_or_else(|| KitScanError::NotFound(format!("テンプレート {}", id)))?,
                None => store.current_template(),
            };
            println!("{} ({})", template.name, template.id);
            for m in &template.materials {
                println!("  {:<38} {:<12} {}", m.id, m.code, m.name);
            }
            println!("QR: {}", template.qr_payload());
        }
        TemplateAction::Add { name } => {
            let id = store.add_template(&name);
            println!("✔ テンプレートを追加: {} ({})", name, id);
        }
        TemplateAction::Rename { id, name } => {
            if !store.rename_template(&id, &name) {
                return Err(KitScanError::NotFound(format!("テンプレート {}", id)));
            }
            println!("✔ 名前を変更: {}", name);
        }
        TemplateAction::Remove { id } => {
            if store.find_template(&id).is_none() {
                return Err(KitScanError::NotFound(format!("テンプレート {}", id)));
            }
            if !store.remove_template(&id) {
                println!("⚠ 最後のテンプレートは削除できません");
            } else {
                println!("✔ 削除しました: {}", id);
            }
        }
        TemplateAction::Select { id } => {
            if store.find_template(&id).is_none() {
                println!("⚠ 存在しないIDです。先頭のテンプレートが使われます: {}", id);
            }
            store.select_template(&id);
            println!("✔ 選択: {}", store.current_template().name);
        }
    }
    Ok(())
}

fn run_material(store: &mut Store, action: MaterialAction) -> Result<()> {
    match action {
        MaterialAction::List => {
            println!("{} ({})", store.current_template().name, store.current_template_id());
            for m in store.materials() {
                println!("  {:<38} {:<12} {}", m.id, m.code, m.name);
            }
        }
        MaterialAction::Add { code, name } => match store.add_material(&code, &name) {
            Some(id) => println!("✔ 資材を追加: {} {} ({})", code, name, id),
            None => println!("⚠ 選択中のテンプレートが見つかりません"),
        },
        MaterialAction::Update { id, code, name } => {
            if !store.update_material(&id, &code, &name) {
                return Err(KitScanError::NotFound(format!("資材 {}", id)));
            }
            println!("✔ 更新しました: {} {}", code, name);
        }
        MaterialAction::Remove { id } => {
            if !store.remove_material(&id) {
                return Err(KitScanError::NotFound(format!("資材 {}", id)));
            }
            println!("✔ 削除しました: {}", id);
        }
    }
    Ok(())
}

fn run_session(store: &mut Store, action: SessionAction) -> Result<()> {
    match action {
        SessionAction::List => {
            if store.sessions().is_empty() {
                println!("セッションがありません");
            }
            for s in store.sessions() {
                println!(
                    "{:<38} {} {:<28} {}行 計{}",
                    s.id,
                    format_timestamp(&s.timestamp),
                    s.image_url,
                    s.items.len(),
                    s.total_quantity()
                );
            }
        }
        SessionAction::Show { id } => {
            let session = store
                .find_session(&id)
                .ok_or_else(|| KitScanError::NotFound(format!("セッション {}", id)))?;
            println!("{} {} {}", session.id, format_timestamp(&session.timestamp), session.image_url);
            for item in &session.items {
                println!(
                    "  {:<8} {:<12} {:<36} {:>4}",
                    item.status, item.code, item.name, item.quantity
                );
            }
        }
        SessionAction::Delete { id } => {
            if !store.delete_session(&id) {
                return Err(KitScanError::NotFound(format!("セッション {}", id)));
            }
            println!("✔ 削除しました: {}", id);
        }
        SessionAction::SetQty { id, code, quantity } => {
            if !store.update_session_item(&id, &code, quantity) {
                return Err(KitScanError::NotFound(format!("セッション {} / {}", id, code)));
            }
            println!("✔ {} を {} に変更", code, quantity);
        }
        SessionAction::Toggle { id, code } => {
            if !store.toggle_item_status(&id, &code) {
                return Err(KitScanError::NotFound(format!("セッション {} / {}", id, code)));
            }
            println!("✔ {} のエラー指定を切り替えました", code);
        }
    }
    Ok(())
}
