//! 生成セッション
//!
//! [`Studio`] を1か所で所有し、添付の読み込み完了・バックエンドからの通知を
//! チャネル経由で1件ずつ適用する。各ジョブは独立したタスクで動き、
//! 1件の失敗が他のジョブに影響することはない。

use crate::backend::{GenerationBackend, JobEvent, ProgressSink};
use crate::decode::{decode_file, DecodedFile};
use crate::download::save_image;
use crate::error::{Result, StudioError};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use unredo_common::{AttachmentId, AttachmentRole, JobId, JobUpdate, Studio, UpdateOutcome};

/// 添付予定のファイル
#[derive(Debug, Clone)]
pub struct AttachmentSource {
    pub path: PathBuf,
    pub role: AttachmentRole,
    /// 俳優の表情指定
    pub emotion: Option<String>,
}

/// 添付処理の結果
#[derive(Debug, Default)]
pub struct AttachReport {
    pub attached: Vec<AttachmentId>,
    pub failed: Vec<(PathBuf, StudioError)>,
}

/// 適用済みの通知
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedEvent {
    pub id: JobId,
    pub update: JobUpdate,
    pub outcome: UpdateOutcome,
}

/// 保存タスクの結果
pub type DownloadResult = (JobId, Result<PathBuf>);

pub struct Session {
    studio: Studio,
    backend: Arc<dyn GenerationBackend>,
    events_tx: UnboundedSender<JobEvent>,
    events_rx: UnboundedReceiver<JobEvent>,
    downloads: JoinSet<DownloadResult>,
    client: reqwest::Client,
    /// バックエンドへ送信済みで終端通知を待っているジョブ
    in_flight: HashSet<JobId>,
}

impl Session {
    pub fn new(studio: Studio, backend: Arc<dyn GenerationBackend>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            studio,
            backend,
            events_tx,
            events_rx,
            downloads: JoinSet::new(),
            client: reqwest::Client::new(),
            in_flight: HashSet::new(),
        }
    }

    pub fn studio(&self) -> &Studio {
        &self.studio
    }

    pub fn studio_mut(&mut self) -> &mut Studio {
        &mut self.studio
    }

    /// ファイルを並行して読み込み、完了した順に添付する
    ///
    /// 読み込み失敗や上限超過はそのファイルだけを失敗として返し、
    /// 他の添付には影響しない
    pub async fn attach_files(&mut self, sources: Vec<AttachmentSource>) -> AttachReport {
        let mut decodes: JoinSet<(AttachmentSource, Result<DecodedFile>)> = JoinSet::new();
        for source in sources {
            decodes.spawn(async move {
                let decoded = decode_file(&source.path).await;
                (source, decoded)
            });
        }

        let mut report = AttachReport::default();
        while let Some(joined) = decodes.join_next().await {
            let (source, decoded) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!("読み込みタスクが異常終了: {}", e);
                    continue;
                }
            };

            let attached = decoded.and_then(|file| {
                self.studio
                    .attach(file.file_name, file.data, source.role)
                    .map_err(StudioError::from)
            });

            match attached {
                Ok(id) => {
                    if let Some(emotion) = source.emotion.as_deref() {
                        self.studio.composer_mut().set_actor_emotion(id, emotion);
                    }
                    tracing::debug!(attachment = %id, path = %source.path.display(), "添付");
                    report.attached.push(id);
                }
                Err(e) => {
                    tracing::warn!(path = %source.path.display(), "添付できません: {}", e);
                    report.failed.push((source.path, e));
                }
            }
        }
        report
    }

    /// フォームの内容で投入し、各ジョブをバックエンドへ送る
    pub fn submit(&mut self) -> Result<Vec<JobId>> {
        let ids = self.studio.submit()?;
        for &id in &ids {
            self.dispatch(id);
        }
        tracing::info!(count = ids.len(), "ジョブを投入");
        Ok(ids)
    }

    /// 失敗したジョブと同じ設定で新しいジョブを投入
    pub fn retry(&mut self, id: JobId) -> Result<JobId> {
        let new_id = self.studio.retry(id)?;
        self.dispatch(new_id);
        tracing::info!(from = %id, job = %new_id, "再生成");
        Ok(new_id)
    }

    /// ジョブを削除（実行中でも可。遅れて届く通知は無視される）
    pub fn remove(&mut self, id: JobId) -> bool {
        self.in_flight.remove(&id);
        self.studio.remove(id)
    }

    pub fn clear_all(&mut self) -> usize {
        self.in_flight.clear();
        self.studio.clear_all()
    }

    /// 終端通知を待っているジョブの件数
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn dispatch(&mut self, id: JobId) {
        let Some(item) = self.studio.gallery().get(id) else {
            return;
        };
        let settings = Arc::clone(&item.settings);
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tracing::debug!(job = %id, model = %settings.model_id, "バックエンドへ送信");
        self.in_flight.insert(id);

        // Started はここで同期的に送り、以降の進捗より必ず先に届くようにする
        let _ = tx.send(JobEvent {
            id,
            update: JobUpdate::Started,
        });

        tokio::spawn(async move {
            let sink = ProgressSink::new(id, tx.clone());
            let worker =
                tokio::spawn(async move { backend.generate(&settings, sink).await });

            let update = match worker.await {
                Ok(Ok(image)) => JobUpdate::Succeeded {
                    image_url: image.into(),
                },
                Ok(Err(e)) => JobUpdate::Failed {
                    message: e.to_string(),
                },
                Err(e) => JobUpdate::Failed {
                    message: format!("生成タスクが異常終了しました: {}", e),
                },
            };
            let _ = tx.send(JobEvent { id, update });
        });
    }

    /// 次の通知を1件適用する
    ///
    /// 送信済みで終端通知を待つジョブがなければ None。
    /// 送信していない待機中ジョブは待たない
    pub async fn next_event(&mut self) -> Option<AppliedEvent> {
        if self.in_flight.is_empty() {
            return None;
        }
        let event = self.events_rx.recv().await?;
        let outcome = self.studio.apply_update(event.id, event.update.clone());
        if outcome == UpdateOutcome::Missing {
            tracing::debug!(job = %event.id, "削除済みジョブへの通知を無視");
        }
        if event.update.is_terminal() || outcome == UpdateOutcome::Missing {
            self.in_flight.remove(&event.id);
        }
        Some(AppliedEvent {
            id: event.id,
            update: event.update,
            outcome,
        })
    }

    /// 送信済みのジョブがすべて終わるまで通知を適用する
    pub async fn run_until_idle(&mut self) {
        while self.next_event().await.is_some() {}
    }

    /// 完了済みジョブの保存をバックグラウンドで開始
    pub fn request_download(&mut self, id: JobId, output_dir: PathBuf) -> Result<()> {
        let request = self.studio.download_request(id)?;
        let prompt = self
            .studio
            .gallery()
            .get(id)
            .map(|item| item.settings.main_prompt.clone())
            .unwrap_or_default();
        let client = self.client.clone();

        self.downloads.spawn(async move {
            let saved = save_image(&client, &request, &prompt, &output_dir).await;
            (request.job, saved)
        });
        Ok(())
    }

    /// 開始済みの保存をすべて待つ
    pub async fn finish_downloads(&mut self) -> Vec<DownloadResult> {
        let mut results = Vec::new();
        while let Some(joined) = self.downloads.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => tracing::warn!("保存タスクが異常終了: {}", e),
            }
        }
        results
    }
}
