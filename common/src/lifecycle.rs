//! 生成ジョブのライフサイクル
//!
//! queued → generating → {success, error}
//!
//! 遷移のきっかけはすべて外部（バックエンドからの通知）。
//! success / error は終端で、以降の更新は無視する。

use serde::Serialize;

/// 擬似進捗の上限（完了通知が来るまで100%にはしない）
pub const SYNTHETIC_PROGRESS_CEILING: f32 = 95.0;

/// ジョブ状態のタグ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Generating,
    Success,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Generating => "generating",
            JobStatus::Success => "success",
            JobStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Error)
    }

    /// ヘッダーの PROCESSING に数えるか
    pub fn is_processing(&self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Generating)
    }
}

/// ジョブ状態（状態ごとに意味のあるデータだけを持つ）
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Queued { progress: f32 },
    Generating { progress: f32 },
    Success { image_url: String },
    Error { message: String },
}

impl Default for JobState {
    fn default() -> Self {
        JobState::Queued { progress: 0.0 }
    }
}

/// バックエンドから届く部分更新
#[derive(Debug, Clone, PartialEq)]
pub enum JobUpdate {
    /// バックエンドが処理を開始した
    Started,
    /// 進捗（0〜100、範囲外はクランプ）
    Progress(f32),
    Succeeded { image_url: String },
    Failed { message: String },
}

impl JobUpdate {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobUpdate::Succeeded { .. } | JobUpdate::Failed { .. })
    }
}

/// 更新適用の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// 終端状態のため、または変化がないため無視した
    Ignored,
    /// 該当IDがない（削除済み・クリア済み）
    Missing,
}

impl JobState {
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Queued { .. } => JobStatus::Queued,
            JobState::Generating { .. } => JobStatus::Generating,
            JobState::Success { .. } => JobStatus::Success,
            JobState::Error { .. } => JobStatus::Error,
        }
    }

    /// 進捗（非終端状態のみ）
    pub fn progress(&self) -> Option<f32> {
        match self {
            JobState::Queued { progress } | JobState::Generating { progress } => Some(*progress),
            JobState::Success { .. } | JobState::Error { .. } => None,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            JobState::Success { image_url } => Some(image_url),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            JobState::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// 部分更新を適用
    pub fn apply(&mut self, update: JobUpdate) -> UpdateOutcome {
        if self.is_terminal() {
            return UpdateOutcome::Ignored;
        }

        let next = match (&*self, update) {
            (JobState::Queued { progress }, JobUpdate::Started) => JobState::Generating {
                progress: *progress,
            },
            (_, JobUpdate::Started) => return UpdateOutcome::Ignored,
            (_, JobUpdate::Progress(value)) => JobState::Generating {
                progress: clamp_progress(value),
            },
            (_, JobUpdate::Succeeded { image_url }) if image_url.trim().is_empty() => {
                JobState::Error {
                    message: "バックエンドが空の画像URLを返しました".into(),
                }
            }
            (_, JobUpdate::Succeeded { image_url }) => JobState::Success { image_url },
            (_, JobUpdate::Failed { message }) => JobState::Error {
                message: if message.trim().is_empty() {
                    "不明なエラー".into()
                } else {
                    message
                },
            },
        };

        *self = next;
        UpdateOutcome::Applied
    }
}

/// 進捗を 0〜100 にクランプ（NaN は 0）
pub fn clamp_progress(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// 擬似進捗の次の値
///
/// 上限までの残りの 12% ずつ進め、上限は超えない
pub fn ease_progress(current: f32) -> f32 {
    let current = clamp_progress(current);
    if current >= SYNTHETIC_PROGRESS_CEILING {
        return current;
    }
    let step = ((SYNTHETIC_PROGRESS_CEILING - current) * 0.12).max(0.5);
    (current + step).min(SYNTHETIC_PROGRESS_CEILING)
}
