//! Gemini 画像生成APIのリクエスト/レスポンス型
//!
//! 通信手段（CLIのreqwest、Webのfetch）に依存しない部分だけを持つ

use crate::catalog;
use crate::data_url::DataUrl;
use crate::error::{Error, Result};
use crate::prompts::build_generation_prompt;
use crate::types::GenerationSettings;
use serde::{Deserialize, Serialize};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// generateContent エンドポイントURL
pub fn endpoint(api_base: &str, model_id: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        api_base.trim_end_matches('/'),
        model_id
    )
}

/// Gemini APIリクエスト
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(alias = "mime_type")]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
    pub image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
}

/// 設定スナップショットからリクエストを作成
///
/// 画像パートは「人物 → 参考画像」の順（プロンプト内の番号と一致させる）
pub fn build_request(settings: &GenerationSettings) -> GeminiRequest {
    let mut parts = vec![Part::Text {
        text: build_generation_prompt(settings),
    }];

    let images = settings
        .actors
        .iter()
        .map(|a| &a.image)
        .chain(settings.references.iter());
    for image in images {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type().to_string(),
                data: image.base64_data().to_string(),
            },
        });
    }

    let image_size = catalog::supports_resolution(&settings.model_id)
        .then(|| settings.image_resolution.as_str().to_string());

    GeminiRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts,
        }],
        generation_config: GenerationConfig {
            response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            image_config: ImageConfig {
                aspect_ratio: settings.aspect_ratio.as_str().to_string(),
                image_size,
            },
        },
    }
}

/// Gemini APIレスポンス
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeminiResponse {
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Candidate {
    pub content: Option<ResponseContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResponseContent {
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponsePart {
    pub text: Option<String>,
    #[serde(alias = "inline_data")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl GeminiResponse {
    /// 最初の画像パートを Data URI として取り出す
    pub fn into_image(self) -> Result<DataUrl> {
        let mut texts = Vec::new();
        let mut finish_reason = None;

        for candidate in self.candidates {
            if finish_reason.is_none() {
                finish_reason = candidate.finish_reason;
            }
            let Some(content) = candidate.content else {
                continue;
            };
            for part in content.parts {
                if let Some(inline) = part.inline_data {
                    if !inline.data.is_empty() {
                        return DataUrl::from_base64(&inline.mime_type, &inline.data);
                    }
                }
                if let Some(text) = part.text {
                    texts.push(text);
                }
            }
        }

        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(Error::Parse(format!("プロンプトがブロックされました: {}", reason)));
        }
        if !texts.is_empty() {
            return Err(Error::Parse(format!(
                "画像が返されませんでした: {}",
                texts.join(" ").trim()
            )));
        }
        Err(Error::Parse(format!(
            "画像が返されませんでした (finishReason: {})",
            finish_reason.as_deref().unwrap_or("unknown")
        )))
    }
}

/// レスポンス本文から画像を取り出す
pub fn parse_image_response(body: &str) -> Result<DataUrl> {
    let response: GeminiResponse = serde_json::from_str(body)?;
    response.into_image()
}

/// エラーレスポンス本文からメッセージを取り出す（取れなければ本文そのまま）
pub fn api_error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!("API error {}: {}", status, envelope.error.message),
        Err(_) => {
            let preview: String = body.chars().take(200).collect();
            format!("API error {}: {}", status, preview.trim())
        }
    }
}
