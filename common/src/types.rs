//! 生成リクエストの型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - AspectRatio / ImageResolution: 出力形式
//! - UploadedImage / Actor: 添付画像
//! - GenerationSettings: 送信時点の設定スナップショット

use crate::data_url::DataUrl;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// アスペクト比
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }

    /// もう一方の比率
    pub fn toggled(&self) -> Self {
        match self {
            AspectRatio::Landscape => AspectRatio::Portrait,
            AspectRatio::Portrait => AspectRatio::Landscape,
        }
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "16:9" | "landscape" | "wide" => Ok(AspectRatio::Landscape),
            "9:16" | "portrait" | "tall" => Ok(AspectRatio::Portrait),
            _ => Err(Error::InvalidValue(format!("アスペクト比 {}（16:9 または 9:16）", s))),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 出力解像度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ImageResolution {
    #[default]
    #[serde(rename = "1K")]
    OneK,
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
}

impl ImageResolution {
    pub const ALL: [ImageResolution; 3] = [
        ImageResolution::OneK,
        ImageResolution::TwoK,
        ImageResolution::FourK,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageResolution::OneK => "1K",
            ImageResolution::TwoK => "2K",
            ImageResolution::FourK => "4K",
        }
    }

    /// 長辺のピクセル数
    pub fn pixels(&self) -> u32 {
        match self {
            ImageResolution::OneK => 1024,
            ImageResolution::TwoK => 2048,
            ImageResolution::FourK => 4096,
        }
    }
}

impl FromStr for ImageResolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "1K" | "1024" => Ok(ImageResolution::OneK),
            "2K" | "2048" => Ok(ImageResolution::TwoK),
            "4K" | "4096" => Ok(ImageResolution::FourK),
            _ => Err(Error::InvalidValue(format!("解像度 {}（1K/2K/4K）", s))),
        }
    }
}

impl fmt::Display for ImageResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 添付画像の役割
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentRole {
    /// 登場人物
    Actor,
    /// 参考画像（サムネイル・ロゴ）
    Reference,
}

impl AttachmentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentRole::Actor => "actor",
            AttachmentRole::Reference => "reference",
        }
    }
}

impl FromStr for AttachmentRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "actor" => Ok(AttachmentRole::Actor),
            "reference" | "ref" => Ok(AttachmentRole::Reference),
            _ => Err(Error::InvalidValue(format!("添付の役割 {}（actor/reference）", s))),
        }
    }
}

/// 添付画像ID（Composer内で一意）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttachmentId(pub u32);

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "img-{}", self.0)
    }
}

/// ユーザーが添付した画像
///
/// ファイルハンドル自体はファイル層が保持し、ここでは元のファイル名と
/// 読み込み済みの Data URI だけを持つ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub id: AttachmentId,
    pub file_name: String,
    pub data: DataUrl,
}

impl UploadedImage {
    /// プレビュー表示用URL
    pub fn preview_url(&self) -> &str {
        self.data.as_str()
    }

    pub fn base64_data(&self) -> &str {
        self.data.base64()
    }

    pub fn mime_type(&self) -> &str {
        self.data.mime_type()
    }
}

/// 登場人物画像（表情ラベル付き）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    #[serde(flatten)]
    pub image: UploadedImage,
    #[serde(default)]
    pub emotion: String,
}

/// 送信時点の生成設定スナップショット
///
/// ジョブに紐付いた後は変更しない（ギャラリーはそのまま表示する）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    pub model_id: String,
    pub main_prompt: String,
    /// 背景・環境（空なら未指定）
    #[serde(default)]
    pub background_prompt: String,
    /// 見出しテキスト（空なら未指定）
    #[serde(default)]
    pub headline_text: String,
    pub image_resolution: ImageResolution,
    pub aspect_ratio: AspectRatio,
    pub style_preset: String,
    pub generation_count: u8,
    #[serde(default)]
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub references: Vec<UploadedImage>,
}

impl GenerationSettings {
    pub fn attachment_count(&self) -> usize {
        self.actors.len() + self.references.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_toggle() {
        assert_eq!(AspectRatio::Landscape.toggled(), AspectRatio::Portrait);
        assert_eq!(AspectRatio::Portrait.toggled(), AspectRatio::Landscape);
    }

    #[test]
    fn test_aspect_ratio_parse() {
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Landscape);
        assert_eq!("Portrait".parse::<AspectRatio>().unwrap(), AspectRatio::Portrait);
        assert!("1:1".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_resolution_parse() {
        assert_eq!("2k".parse::<ImageResolution>().unwrap(), ImageResolution::TwoK);
        assert_eq!("4096".parse::<ImageResolution>().unwrap(), ImageResolution::FourK);
        assert!("8K".parse::<ImageResolution>().is_err());
        assert_eq!(ImageResolution::default().pixels(), 1024);
    }

    #[test]
    fn test_settings_serialize() {
        let settings = GenerationSettings {
            model_id: "gemini-2.5-flash-image".to_string(),
            main_prompt: "neon cat".to_string(),
            background_prompt: String::new(),
            headline_text: "SALE".to_string(),
            image_resolution: ImageResolution::TwoK,
            aspect_ratio: AspectRatio::Portrait,
            style_preset: "Neon Cyberpunk".to_string(),
            generation_count: 2,
            actors: vec![],
            references: vec![],
        };

        let json = serde_json::to_string(&settings).expect("シリアライズ失敗");
        assert!(json.contains("\"mainPrompt\":\"neon cat\""));
        assert!(json.contains("\"aspectRatio\":\"9:16\""));
        assert!(json.contains("\"imageResolution\":\"2K\""));
    }

    #[test]
    fn test_actor_deserialize_flattened() {
        let json = r#"{
            "id": 3,
            "fileName": "face.png",
            "data": "data:image/png;base64,iVBORw0KGgo=",
            "emotion": "angry"
        }"#;

        let actor: Actor = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(actor.image.id, AttachmentId(3));
        assert_eq!(actor.image.mime_type(), "image/png");
        assert_eq!(actor.emotion, "angry");
    }
}
