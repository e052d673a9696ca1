//! 添付画像の読み込み
//!
//! ファイルを読み込んで画像形式を判定し、Data URI に変換する

use crate::error::{Result, StudioError};
use base64::prelude::*;
use image::ImageFormat;
use std::path::Path;
use unredo_common::DataUrl;

/// 送信できる画像形式
const SUPPORTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::WebP,
    ImageFormat::Gif,
];

/// 読み込み済みの添付ファイル
#[derive(Debug, Clone)]
pub struct DecodedFile {
    pub file_name: String,
    pub data: DataUrl,
}

/// ファイルを非同期に読み込んで Data URI に変換
pub async fn decode_file(path: &Path) -> Result<DecodedFile> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StudioError::FileNotFound(path.display().to_string())
        } else {
            StudioError::Io(e)
        }
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    decode_bytes(&file_name, &bytes)
}

/// バイト列を画像として検証して Data URI に変換
pub fn decode_bytes(file_name: &str, bytes: &[u8]) -> Result<DecodedFile> {
    if bytes.is_empty() {
        return Err(StudioError::Decode(format!("{}: ファイルが空です", file_name)));
    }

    let format = image::guess_format(bytes)
        .map_err(|e| StudioError::Decode(format!("{}: {}", file_name, e)))?;

    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(StudioError::Decode(format!(
            "{}: 未対応の画像形式 {:?}",
            file_name, format
        )));
    }

    let encoded = BASE64_STANDARD.encode(bytes);
    let data = DataUrl::from_base64(format.to_mime_type(), &encoded)?;

    Ok(DecodedFile {
        file_name: file_name.to_string(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_decode_png_magic() {
        let decoded = decode_bytes("a.png", PNG_MAGIC).unwrap();
        assert_eq!(decoded.data.mime_type(), "image/png");
        assert_eq!(decoded.file_name, "a.png");
        assert_eq!(BASE64_STANDARD.decode(decoded.data.base64()).unwrap(), PNG_MAGIC);
    }

    #[test]
    fn test_decode_rejects_text() {
        let err = decode_bytes("notes.txt", b"hello world, not an image").unwrap_err();
        assert!(matches!(err, StudioError::Decode(_)));
        assert!(err.to_string().contains("notes.txt"));
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert!(matches!(decode_bytes("empty.png", b""), Err(StudioError::Decode(_))));
    }
}
