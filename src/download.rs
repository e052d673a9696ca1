//! 生成画像の保存
//!
//! Data URI はそのままデコードし、http(s) URL は取得してから保存する

use crate::error::{Result, StudioError};
use base64::prelude::*;
use chrono::{DateTime, Local};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use unredo_common::data_url::extension_for_mime;
use unredo_common::{DataUrl, DownloadRequest};

lazy_static::lazy_static! {
    static ref SLUG_RE: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// プロンプトからファイル名用の短い識別子を作る
pub fn slugify(prompt: &str) -> String {
    let lower = prompt.to_lowercase();
    let slug = SLUG_RE.replace_all(&lower, "-");
    let slug: String = slug.trim_matches('-').chars().take(32).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "image".to_string()
    } else {
        slug.to_string()
    }
}

/// 保存ファイル名: unredo_<日時>_<slug>_<job>_<sha256先頭8桁>.<拡張子>
pub fn output_file_name(
    request: &DownloadRequest,
    prompt: &str,
    bytes: &[u8],
    extension: &str,
    now: DateTime<Local>,
) -> String {
    let digest = hex::encode(Sha256::digest(bytes));
    format!(
        "unredo_{}_{}_{}_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        slugify(prompt),
        request.job,
        &digest[..8],
        extension
    )
}

/// 画像URLからバイト列と拡張子を取得
pub async fn fetch_image(client: &reqwest::Client, image_url: &str) -> Result<(Vec<u8>, String)> {
    if image_url.starts_with("data:") {
        let data = DataUrl::parse(image_url)?;
        let bytes = BASE64_STANDARD
            .decode(data.base64())
            .map_err(|e| StudioError::Download(format!("Base64デコード失敗: {}", e)))?;
        return Ok((bytes, data.extension().to_string()));
    }

    if image_url.starts_with("http://") || image_url.starts_with("https://") {
        let response = client.get(image_url).send().await?.error_for_status()?;
        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or_default().trim().to_string())
            .unwrap_or_default();
        let bytes = response.bytes().await?.to_vec();
        let extension = match extension_for_mime(&mime) {
            "bin" => image::guess_format(&bytes)
                .ok()
                .and_then(|f| f.extensions_str().first().copied())
                .unwrap_or("bin"),
            ext => ext,
        };
        return Ok((bytes, extension.to_string()));
    }

    Err(StudioError::Download(format!("未対応のURL: {}", preview(image_url))))
}

/// 保存依頼を処理してファイルパスを返す
pub async fn save_image(
    client: &reqwest::Client,
    request: &DownloadRequest,
    prompt: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    let (bytes, extension) = fetch_image(client, &request.image_url).await?;
    if bytes.is_empty() {
        return Err(StudioError::Download(format!("{}: 画像が空です", request.job)));
    }

    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(output_file_name(
        request,
        prompt,
        &bytes,
        &extension,
        Local::now(),
    ));
    tokio::fs::write(&path, &bytes).await?;

    tracing::info!(job = %request.job, path = %path.display(), "画像を保存");
    Ok(path)
}

fn preview(url: &str) -> String {
    url.chars().take(40).collect()
}
