use anyhow::Context;
use clap::Parser;
use dialoguer::{Confirm, Input};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unredo_common::catalog::{AVAILABLE_MODELS, STYLE_PRESETS};
use unredo_common::view::{progress_label, status_headline};
use unredo_common::{AttachmentRole, Composer, JobId, JobStatus, JobUpdate, Studio};
use unredo_studio::backend::GeminiBackend;
use unredo_studio::cli::{Cli, Commands};
use unredo_studio::config::Config;
use unredo_studio::session::{AttachmentSource, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load().context("設定の読み込みに失敗")?;

    match cli.command {
        Commands::Generate {
            prompt,
            env,
            headline,
            model,
            resolution,
            aspect,
            style,
            count,
            actor,
            reference,
            output,
            no_retry,
        } => {
            println!("🎬 unredo - 画像生成\n");

            let api_key = config.get_api_key()?;

            let prompt = match prompt {
                Some(p) => p,
                None => Input::<String>::new()
                    .with_prompt("プロンプト")
                    .interact_text()?,
            };

            // 1. フォーム
            let mut composer = Composer::new();
            composer.set_model(model.as_deref().unwrap_or(&config.model))?;
            composer.set_main_prompt(prompt);
            composer.set_background_prompt(env.unwrap_or_default());
            composer.set_headline_text(headline.unwrap_or_default());
            if let Some(aspect) = aspect {
                composer.set_aspect_ratio(aspect);
            }
            if let Some(resolution) = resolution {
                composer.set_resolution(resolution)?;
            }
            if let Some(style) = style.as_deref() {
                composer.set_style_preset(style)?;
            }
            let count = composer.set_generation_count(count);

            let backend = GeminiBackend::new(&config, api_key)?;
            let mut session = Session::new(Studio::with_composer(composer), Arc::new(backend));

            // 2. 添付
            let sources: Vec<AttachmentSource> = actor
                .into_iter()
                .map(|a| AttachmentSource {
                    path: a.path,
                    role: AttachmentRole::Actor,
                    emotion: a.emotion,
                })
                .chain(reference.into_iter().map(|path| AttachmentSource {
                    path,
                    role: AttachmentRole::Reference,
                    emotion: None,
                }))
                .collect();

            if !sources.is_empty() {
                println!("[1/3] 添付画像を読み込み中...");
                let report = session.attach_files(sources).await;
                for (path, e) in &report.failed {
                    println!("⚠ {}: {}", path.display(), e);
                }
                println!("✔ {}枚を添付\n", report.attached.len());
            }

            // 3. 生成
            println!("[2/3] 生成中... ({}枚)", count);
            let mut ids = session.submit()?;
            loop {
                run_with_progress(&mut session, &ids).await;

                let failed: Vec<JobId> = ids
                    .iter()
                    .copied()
                    .filter(|id| {
                        session.studio().gallery().get(*id).map(|i| i.status())
                            == Some(JobStatus::Error)
                    })
                    .collect();

                if failed.is_empty() || no_retry {
                    break;
                }

                let retry = Confirm::new()
                    .with_prompt(format!("{}件が失敗しました。同じ設定で再生成しますか?", failed.len()))
                    .default(false)
                    .interact()?;
                if !retry {
                    break;
                }

                ids = Vec::new();
                for id in failed {
                    ids.push(session.retry(id)?);
                    session.remove(id);
                }
            }

            // 4. 保存
            println!("\n[3/3] 保存中...");
            let output_dir = output.unwrap_or_else(|| config.output_dir());
            let completed: Vec<JobId> = session
                .studio()
                .gallery()
                .iter()
                .filter(|item| item.status() == JobStatus::Success)
                .map(|item| item.id)
                .collect();
            for id in completed {
                session.request_download(id, output_dir.clone())?;
            }
            for (id, saved) in session.finish_downloads().await {
                match saved {
                    Ok(path) => println!("✔ {}: {}", id, path.display()),
                    Err(e) => println!("✗ {}: {}", id, e),
                }
            }

            let stats = session.studio().stats();
            println!(
                "\n✅ 完了 (成功: {} / 失敗: {} / 合計: {})",
                stats.archived, stats.failed, stats.total
            );
        }

        Commands::Config {
            set_api_key,
            set_model,
            set_output_dir,
            show,
        } => {
            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを保存しました");
            }

            if let Some(model) = set_model {
                unredo_common::catalog::find_model(&model)
                    .with_context(|| format!("不明なモデル: {}", model))?;
                config.model = model;
                config.save()?;
                println!("✔ モデルを保存しました");
            }

            if let Some(dir) = set_output_dir {
                config.output_dir = Some(dir);
                config.save()?;
                println!("✔ 保存先を保存しました");
            }

            if show {
                println!("設定ファイル: {}", Config::config_path()?.display());
                println!(
                    "APIキー: {}",
                    if config.get_api_key().is_ok() { "設定済み" } else { "未設定" }
                );
                println!("モデル: {}", config.model);
                println!("APIベース: {}", config.api_base);
                println!("保存先: {}", config.output_dir().display());
                println!("タイムアウト: {}秒", config.timeout_seconds);
            }
        }

        Commands::Catalog => {
            println!("モデル:");
            for model in AVAILABLE_MODELS {
                println!(
                    "  {} [{}] {}{}",
                    model.id,
                    model.tier.badge(),
                    model.name,
                    if model.supports_resolution { " (1K/2K/4K)" } else { "" }
                );
            }
            println!("\nスタイルプリセット:");
            for style in STYLE_PRESETS {
                println!("  {}", style);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "unredo=debug,unredo_studio=debug"
    } else {
        "unredo=info,unredo_studio=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// ジョブごとの進捗バーを表示しながら通知を適用する
async fn run_with_progress(session: &mut Session, ids: &[JobId]) {
    let multi = MultiProgress::new();
    let style = ProgressStyle::with_template("{prefix:>8} [{bar:30}] {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");

    let mut bars: HashMap<JobId, ProgressBar> = HashMap::new();
    for &id in ids {
        let bar = multi.add(ProgressBar::new(100));
        bar.set_style(style.clone());
        bar.set_prefix(id.to_string());
        bar.set_message(status_headline(JobStatus::Queued));
        bars.insert(id, bar);
    }

    while let Some(event) = session.next_event().await {
        let Some(bar) = bars.get(&event.id) else {
            continue;
        };
        let Some(item) = session.studio().gallery().get(event.id) else {
            continue;
        };

        if let Some(progress) = item.progress() {
            bar.set_position(progress as u64);
        }
        match &event.update {
            JobUpdate::Started | JobUpdate::Progress(_) => {
                let label = item.progress().map(progress_label).unwrap_or_default();
                bar.set_message(format!("{} {}", status_headline(item.status()), label));
            }
            JobUpdate::Succeeded { .. } | JobUpdate::Failed { .. } => {
                bar.set_position(100);
                let message = match item.error() {
                    Some(e) => format!("{} {}", status_headline(item.status()), e),
                    None => status_headline(item.status()).to_string(),
                };
                bar.finish_with_message(message);
            }
        }
    }
}
