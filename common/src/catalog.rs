//! モデル・スタイルのカタログ
//!
//! UIのセレクトボックスとCLIの `catalog` コマンドで共有する定数群

use serde::Serialize;

/// モデルの性能区分（カードのバッジ表示用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModelTier {
    Fast,
    Pro,
}

impl ModelTier {
    pub fn badge(&self) -> &'static str {
        match self {
            ModelTier::Fast => "FAST",
            ModelTier::Pro => "PRO",
        }
    }
}

/// 画像生成モデル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub tier: ModelTier,
    /// 解像度（1K/2K/4K）を指定できるか
    pub supports_resolution: bool,
}

pub const AVAILABLE_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gemini-3-pro-image-preview",
        name: "Nano Banana Pro (Gemini 3 Pro Image)",
        tier: ModelTier::Pro,
        supports_resolution: true,
    },
    ModelInfo {
        id: "gemini-2.5-flash-image",
        name: "Nano Banana (Gemini 2.5 Flash Image)",
        tier: ModelTier::Fast,
        supports_resolution: false,
    },
];

pub const DEFAULT_MODEL_ID: &str = "gemini-3-pro-image-preview";

/// スタイルプリセット（先頭がデフォルト）
pub const STYLE_PRESETS: &[&str] = &[
    "Cinematic Realism",
    "Hyper-Real Product Shot",
    "Neon Cyberpunk",
    "Anime Key Visual",
    "Comic Book Ink",
    "Retro 80s Poster",
    "Vintage Film Grain",
    "Dark Fantasy",
    "Minimal Flat Vector",
    "3D Clay Render",
    "Watercolor Sketch",
];

pub fn find_model(model_id: &str) -> Option<&'static ModelInfo> {
    AVAILABLE_MODELS.iter().find(|m| m.id == model_id)
}

/// モデルIDから性能区分を判定
///
/// カタログにないIDは「2.5 を含めば FAST、それ以外は PRO」で判定する
pub fn model_tier(model_id: &str) -> ModelTier {
    match find_model(model_id) {
        Some(model) => model.tier,
        None if model_id.contains("2.5") => ModelTier::Fast,
        None => ModelTier::Pro,
    }
}

pub fn supports_resolution(model_id: &str) -> bool {
    find_model(model_id).is_some_and(|m| m.supports_resolution)
}

pub fn is_style_preset(name: &str) -> bool {
    STYLE_PRESETS.contains(&name)
}
