//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("メインプロンプトが空です")]
    EmptyPrompt,

    #[error("添付画像は最大{limit}枚までです")]
    AttachmentCapacity { limit: usize },

    #[error("デコードエラー: {0}")]
    Decode(String),

    #[error("未対応のモデル: {0}")]
    UnknownModel(String),

    #[error("未対応のスタイルプリセット: {0}")]
    UnknownStyle(String),

    #[error("未対応の値: {0}")]
    InvalidValue(String),

    #[error("モデル {0} は解像度を変更できません")]
    ResolutionLocked(String),

    #[error("ジョブ {0} は完了していません")]
    NotCompleted(String),

    #[error("ジョブ {0} は失敗していません")]
    NotFailed(String),

    #[error("ジョブが見つかりません: {0}")]
    JobNotFound(String),

    #[error("ジョブIDが重複しています: {0}")]
    DuplicateJob(String),

    #[error("レスポンス解析エラー: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
