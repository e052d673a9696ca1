//! ジョブカードの表示用データ
//!
//! Web・CLIの両方が同じ文言で状態を表示するための変換

use crate::catalog::model_tier;
use crate::gallery::{GalleryItem, JobId};
use crate::lifecycle::{clamp_progress, JobState, JobStatus};
use crate::types::AspectRatio;

/// 状態ごとの見出し
pub fn status_headline(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Queued => "> AWAITING_CORE",
        JobStatus::Generating => "> NEURAL_RENDERING",
        JobStatus::Success => "> RENDER_COMPLETE",
        JobStatus::Error => "> RENDER_FAILED",
    }
}

/// 進捗表示（"buffer: 40%"）
pub fn progress_label(progress: f32) -> String {
    format!("buffer: {}%", clamp_progress(progress).round() as u8)
}

/// カードに出す操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Download,
    Remove,
}

/// 1枚分のカード
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub id: JobId,
    pub status: JobStatus,
    pub headline: &'static str,
    /// 処理中のみ
    pub progress_label: Option<String>,
    /// 処理中のみ（0〜100）
    pub progress_percent: Option<u8>,
    pub image_url: Option<String>,
    pub error: Option<String>,
    pub resolution_badge: &'static str,
    pub tier_badge: &'static str,
    pub portrait: bool,
    pub prompt: String,
}

impl CardView {
    pub fn from_item(item: &GalleryItem) -> Self {
        let status = item.status();
        let progress = match &item.state {
            JobState::Queued { progress } | JobState::Generating { progress } => Some(*progress),
            JobState::Success { .. } | JobState::Error { .. } => None,
        };

        Self {
            id: item.id,
            status,
            headline: status_headline(status),
            progress_label: progress.map(progress_label),
            progress_percent: progress.map(|p| clamp_progress(p).round() as u8),
            image_url: item.image_url().map(str::to_string),
            error: item.error().map(str::to_string),
            resolution_badge: item.settings.image_resolution.as_str(),
            tier_badge: model_tier(&item.settings.model_id).badge(),
            portrait: item.settings.aspect_ratio == AspectRatio::Portrait,
            prompt: item.settings.main_prompt.clone(),
        }
    }

    /// ライトボックスを開けるか
    pub fn can_focus(&self) -> bool {
        self.status == JobStatus::Success && self.image_url.is_some()
    }

    /// 状態ごとの操作（失敗カードは削除のみ、再生成はない）
    pub fn actions(&self) -> &'static [CardAction] {
        match self.status {
            JobStatus::Queued | JobStatus::Generating => &[],
            JobStatus::Success => &[CardAction::Download, CardAction::Remove],
            JobStatus::Error => &[CardAction::Remove],
        }
    }
}
