//! 画像生成バックエンド
//!
//! バックエンドは1ジョブ分の設定を受け取り、画像の Data URI か失敗を返す。
//! 進捗は [`ProgressSink`] 経由でセッションに通知する。

mod gemini;

pub use gemini::GeminiBackend;

use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use unredo_common::{DataUrl, GenerationSettings, JobId, JobUpdate};

/// ジョブ宛ての状態通知
#[derive(Debug, Clone, PartialEq)]
pub struct JobEvent {
    pub id: JobId,
    pub update: JobUpdate,
}

/// 1ジョブ分の進捗通知口
#[derive(Debug, Clone)]
pub struct ProgressSink {
    id: JobId,
    tx: UnboundedSender<JobEvent>,
}

impl ProgressSink {
    pub fn new(id: JobId, tx: UnboundedSender<JobEvent>) -> Self {
        Self { id, tx }
    }

    /// 進捗を通知（受信側が閉じていれば黙って捨てる）
    pub fn report(&self, progress: f32) {
        let _ = self.tx.send(JobEvent {
            id: self.id,
            update: JobUpdate::Progress(progress),
        });
    }
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// 1枚生成する
    async fn generate(&self, settings: &GenerationSettings, progress: ProgressSink) -> Result<DataUrl>;
}
