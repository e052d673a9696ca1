//! Data URI ユーティリティ
//!
//! ファイル読み込み結果（`data:image/png;base64,...`）を検証済みの値として保持し、
//! Base64ペイロードとMIMEタイプを取り出す。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// 検証済みの Data URI
///
/// 不変条件: `data:<mime>[;params];base64,<payload>` 形式で、MIMEタイプとペイロードが空でない
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataUrl(String);

impl DataUrl {
    /// 文字列を検証して Data URI に変換
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let body = value
            .strip_prefix(PREFIX)
            .ok_or_else(|| Error::Decode("data URIではありません".into()))?;

        let (header, payload) = body
            .split_once(',')
            .ok_or_else(|| Error::Decode("ペイロード区切りがありません".into()))?;

        if !header.ends_with(BASE64_MARKER) {
            return Err(Error::Decode("Base64エンコードされていません".into()));
        }

        let mime = header.split(';').next().unwrap_or_default();
        if mime.is_empty() || !mime.contains('/') {
            return Err(Error::Decode(format!("MIMEタイプが不正: {:?}", mime)));
        }

        if payload.is_empty() {
            return Err(Error::Decode("ペイロードが空です".into()));
        }
        if !payload.bytes().all(is_base64_byte) {
            return Err(Error::Decode("ペイロードにBase64以外の文字が含まれています".into()));
        }

        Ok(Self(value))
    }

    /// MIMEタイプとBase64ペイロードから組み立てる
    pub fn from_base64(mime_type: &str, base64: &str) -> Result<Self> {
        Self::parse(format!("{PREFIX}{mime_type}{BASE64_MARKER},{base64}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// MIMEタイプ（例: "image/png"）
    pub fn mime_type(&self) -> &str {
        self.0[PREFIX.len()..]
            .split([';', ','])
            .next()
            .unwrap_or_default()
    }

    /// Base64ペイロード部分
    pub fn base64(&self) -> &str {
        self.0.split_once(',').map(|(_, p)| p).unwrap_or_default()
    }

    /// 保存時の拡張子
    pub fn extension(&self) -> &'static str {
        extension_for_mime(self.mime_type())
    }
}

/// MIMEタイプから拡張子を決定（不明な場合は "bin"）
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type.to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/heic" => "heic",
        _ => "bin",
    }
}

fn is_base64_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=' | b'-' | b'_')
}

impl FromStr for DataUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DataUrl {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<DataUrl> for String {
    fn from(value: DataUrl) -> Self {
        value.0
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_URL: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[test]
    fn test_parse_extracts_parts() {
        let url = DataUrl::parse(PNG_URL).unwrap();
        assert_eq!(url.mime_type(), "image/png");
        assert_eq!(url.base64(), "iVBORw0KGgo=");
        assert_eq!(url.extension(), "png");
        assert_eq!(url.as_str(), PNG_URL);
    }

    #[test]
    fn test_parse_with_extra_params() {
        let url = DataUrl::parse("data:image/jpeg;name=a.jpg;base64,/9j/4AAQ").unwrap();
        assert_eq!(url.mime_type(), "image/jpeg");
        assert_eq!(url.base64(), "/9j/4AAQ");
        assert_eq!(url.extension(), "jpg");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(DataUrl::parse("image/png;base64,AAAA"), Err(Error::Decode(_))));
        assert!(matches!(DataUrl::parse("data:image/png;base64"), Err(Error::Decode(_))));
        assert!(matches!(DataUrl::parse("data:image/png,AAAA"), Err(Error::Decode(_))));
        assert!(matches!(DataUrl::parse("data:;base64,AAAA"), Err(Error::Decode(_))));
        assert!(matches!(DataUrl::parse("data:image/png;base64,"), Err(Error::Decode(_))));
        assert!(matches!(DataUrl::parse("data:image/png;base64,AA AA"), Err(Error::Decode(_))));
    }

    #[test]
    fn test_from_base64() {
        let url = DataUrl::from_base64("image/webp", "UklGRg==").unwrap();
        assert_eq!(url.as_str(), "data:image/webp;base64,UklGRg==");
        assert_eq!(url.extension(), "webp");
    }

    #[test]
    fn test_serde_validates() {
        let json = format!("\"{}\"", PNG_URL);
        let url: DataUrl = serde_json::from_str(&json).unwrap();
        assert_eq!(url.mime_type(), "image/png");
        assert_eq!(serde_json::to_string(&url).unwrap(), json);

        let bad = serde_json::from_str::<DataUrl>("\"not a data url\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_extension_unknown_mime() {
        assert_eq!(extension_for_mime("application/octet-stream"), "bin");
        assert_eq!(extension_for_mime("IMAGE/PNG"), "png");
    }
}
