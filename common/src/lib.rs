//! UnReDO Studio Common Library
//!
//! CLIとWeb(WASM)で共有される生成ジョブの状態管理:
//! - composer: リクエスト作成フォーム
//! - gallery / lifecycle: ジョブ一覧と状態遷移
//! - lightbox: 拡大表示
//! - gemini: 画像生成APIのリクエスト/レスポンス

pub mod catalog;
pub mod composer;
pub mod data_url;
pub mod error;
pub mod gallery;
pub mod gemini;
pub mod lifecycle;
pub mod lightbox;
pub mod prompts;
pub mod studio;
pub mod types;
pub mod view;

pub use catalog::{ModelInfo, ModelTier, AVAILABLE_MODELS, DEFAULT_MODEL_ID, STYLE_PRESETS};
pub use composer::{Composer, UploadSlot, MAX_ATTACHMENTS};
pub use data_url::DataUrl;
pub use error::{Error, Result};
pub use gallery::{Gallery, GalleryItem, GalleryStats, JobId};
pub use lifecycle::{ease_progress, JobState, JobStatus, JobUpdate, UpdateOutcome};
pub use lightbox::Lightbox;
pub use prompts::build_generation_prompt;
pub use studio::{DownloadRequest, Studio};
pub use types::{
    Actor, AspectRatio, AttachmentId, AttachmentRole, GenerationSettings, ImageResolution,
    UploadedImage,
};
pub use view::{CardAction, CardView};
