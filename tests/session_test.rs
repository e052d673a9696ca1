//! 生成セッションのテスト
//!
//! 台本どおりに振る舞うバックエンドでジョブの流れを検証

use async_trait::async_trait;
use base64::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use unredo_common::{
    Composer, DataUrl, GenerationSettings, JobStatus, JobUpdate, Studio, UpdateOutcome,
};
use unredo_studio::backend::{GenerationBackend, ProgressSink};
use unredo_studio::error::{Result, StudioError};
use unredo_studio::session::Session;

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// n回目の呼び出しをどう終えるかを決めるバックエンド
struct ScriptedBackend {
    calls: AtomicUsize,
    fail_on: Vec<usize>,
    panic_on: Vec<usize>,
}

impl ScriptedBackend {
    fn succeeding() -> Self {
        Self::new(vec![], vec![])
    }

    fn new(fail_on: Vec<usize>, panic_on: Vec<usize>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on,
            panic_on,
        }
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, _settings: &GenerationSettings, progress: ProgressSink) -> Result<DataUrl> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        progress.report(50.0);
        if self.panic_on.contains(&call) {
            panic!("scripted panic");
        }
        if self.fail_on.contains(&call) {
            return Err(StudioError::ApiCall("quota exceeded".into()));
        }
        Ok(DataUrl::from_base64("image/png", &BASE64_STANDARD.encode(PNG_BYTES))?)
    }
}

fn session_with(backend: ScriptedBackend, count: u8) -> Session {
    let mut composer = Composer::new();
    composer.set_main_prompt("neon cat");
    composer.set_generation_count(count);
    Session::new(Studio::with_composer(composer), Arc::new(backend))
}

/// 全件成功
#[tokio::test]
async fn test_batch_completes() {
    let mut session = session_with(ScriptedBackend::succeeding(), 3);
    let ids = session.submit().expect("投入失敗");
    assert_eq!(ids.len(), 3);
    assert_eq!(session.studio().stats().processing, 3);

    session.run_until_idle().await;

    let stats = session.studio().stats();
    assert_eq!(stats.processing, 0);
    assert_eq!(stats.archived, 3);
    for id in ids {
        let item = session.studio().gallery().get(id).unwrap();
        assert_eq!(item.status(), JobStatus::Success);
        assert!(item.image_url().unwrap().starts_with("data:image/png;base64,"));
        assert_eq!(item.error(), None);
    }
}

/// 1ジョブの通知順: 開始 → 進捗 → 完了
#[tokio::test]
async fn test_event_order_for_single_job() {
    let mut session = session_with(ScriptedBackend::succeeding(), 1);
    let ids = session.submit().unwrap();

    let mut updates = Vec::new();
    while let Some(event) = session.next_event().await {
        assert_eq!(event.id, ids[0]);
        assert_eq!(event.outcome, UpdateOutcome::Applied);
        updates.push(event.update);
    }

    assert_eq!(updates.len(), 3);
    assert_eq!(updates[0], JobUpdate::Started);
    assert_eq!(updates[1], JobUpdate::Progress(50.0));
    assert!(matches!(updates[2], JobUpdate::Succeeded { .. }));
}

/// 1件の失敗は他のジョブに影響しない
#[tokio::test]
async fn test_failure_is_isolated() {
    let mut session = session_with(ScriptedBackend::new(vec![1], vec![]), 3);
    session.submit().unwrap();
    session.run_until_idle().await;

    let stats = session.studio().stats();
    assert_eq!(stats.archived, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.processing, 0);

    let failed = session
        .studio()
        .gallery()
        .iter()
        .find(|item| item.status() == JobStatus::Error)
        .unwrap();
    assert!(failed.error().unwrap().contains("quota exceeded"));
    assert_eq!(failed.image_url(), None);
}

/// バックエンドが異常終了してもジョブは失敗として終わる
#[tokio::test]
async fn test_backend_panic_becomes_error() {
    let mut session = session_with(ScriptedBackend::new(vec![], vec![0]), 1);
    let ids = session.submit().unwrap();
    session.run_until_idle().await;

    let item = session.studio().gallery().get(ids[0]).unwrap();
    assert_eq!(item.status(), JobStatus::Error);
    assert!(!item.error().unwrap().is_empty());
}

/// 実行中に削除したジョブは遅れて届く通知で復活しない
#[tokio::test]
async fn test_remove_in_flight_job() {
    let mut session = session_with(ScriptedBackend::succeeding(), 3);
    let ids = session.submit().unwrap();

    assert!(session.remove(ids[1]));
    session.run_until_idle().await;

    let gallery = session.studio().gallery();
    assert_eq!(gallery.len(), 2);
    assert!(!gallery.contains(ids[1]));
    assert_eq!(session.studio().stats().archived, 2);
}

/// 送信していない待機中ジョブがあっても待ち続けない
#[tokio::test]
async fn test_undispatched_job_does_not_block_idle() {
    let mut session = session_with(ScriptedBackend::succeeding(), 1);
    let queued = session.studio_mut().submit().unwrap();
    assert_eq!(session.studio().stats().processing, 1);
    assert_eq!(session.in_flight(), 0);

    let waited = timeout(Duration::from_secs(2), session.run_until_idle()).await;
    assert!(waited.is_ok());
    assert_eq!(
        session.studio().gallery().get(queued[0]).unwrap().status(),
        JobStatus::Queued
    );

    // 送信したジョブだけを待つ
    let sent = session.submit().unwrap();
    assert_eq!(session.in_flight(), 1);
    let waited = timeout(Duration::from_secs(2), session.run_until_idle()).await;
    assert!(waited.is_ok());
    assert_eq!(session.in_flight(), 0);
    assert_eq!(
        session.studio().gallery().get(sent[0]).unwrap().status(),
        JobStatus::Success
    );
    assert_eq!(session.studio().stats().processing, 1);
}

/// 送信済みジョブを全件削除すれば待機はすぐ終わり、後続の投入にも影響しない
#[tokio::test]
async fn test_removing_all_dispatched_jobs_ends_wait() {
    let mut session = session_with(ScriptedBackend::succeeding(), 2);
    let ids = session.submit().unwrap();
    assert_eq!(session.clear_all(), 2);
    assert_eq!(session.in_flight(), 0);

    let waited = timeout(Duration::from_secs(2), session.run_until_idle()).await;
    assert!(waited.is_ok());

    // 削除済みジョブの遅延通知が残っていても新しいジョブは完了する
    let next = session.submit().unwrap();
    let waited = timeout(Duration::from_secs(2), session.run_until_idle()).await;
    assert!(waited.is_ok());
    for id in ids {
        assert!(!session.studio().gallery().contains(id));
    }
    assert!(next
        .iter()
        .all(|id| session.studio().gallery().get(*id).unwrap().status() == JobStatus::Success));
}

/// 再生成は新しいジョブを作り、失敗したジョブはそのまま残る
#[tokio::test]
async fn test_retry_creates_new_job() {
    let mut session = session_with(ScriptedBackend::new(vec![0], vec![]), 1);
    let ids = session.submit().unwrap();
    session.run_until_idle().await;
    assert_eq!(session.studio().stats().failed, 1);

    let retried = session.retry(ids[0]).expect("再生成失敗");
    assert_ne!(retried, ids[0]);
    session.run_until_idle().await;

    let gallery = session.studio().gallery();
    assert_eq!(gallery.get(ids[0]).unwrap().status(), JobStatus::Error);
    assert_eq!(gallery.get(retried).unwrap().status(), JobStatus::Success);
    assert!(Arc::ptr_eq(
        &gallery.get(ids[0]).unwrap().settings,
        &gallery.get(retried).unwrap().settings
    ));
}

/// 成功したジョブは再生成できない
#[tokio::test]
async fn test_retry_rejects_successful_job() {
    let mut session = session_with(ScriptedBackend::succeeding(), 1);
    let ids = session.submit().unwrap();
    session.run_until_idle().await;

    let err = session.retry(ids[0]).unwrap_err();
    assert!(matches!(err, StudioError::Core(unredo_common::Error::NotFailed(_))));
}

/// 空のプロンプトは投入されない
#[tokio::test]
async fn test_empty_prompt_never_enters_gallery() {
    let mut session = Session::new(Studio::new(), Arc::new(ScriptedBackend::succeeding()));
    session.studio_mut().composer_mut().set_main_prompt("   ");

    let err = session.submit().unwrap_err();
    assert!(matches!(err, StudioError::Core(unredo_common::Error::EmptyPrompt)));
    assert!(session.studio().gallery().is_empty());
    assert!(session.next_event().await.is_none());
}

/// 完了済みジョブの保存
#[tokio::test]
async fn test_download_completed_job() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut session = session_with(ScriptedBackend::succeeding(), 1);
    let ids = session.submit().unwrap();
    session.run_until_idle().await;

    session
        .request_download(ids[0], dir.path().to_path_buf())
        .expect("保存依頼失敗");
    let results = session.finish_downloads().await;
    assert_eq!(results.len(), 1);

    let (job, saved) = &results[0];
    assert_eq!(*job, ids[0]);
    let path = saved.as_ref().expect("保存失敗");
    assert_eq!(path.extension().unwrap(), "png");
    assert!(path.file_name().unwrap().to_string_lossy().contains("neon-cat"));
    assert_eq!(std::fs::read(path).unwrap(), PNG_BYTES);
}

/// 失敗したジョブは保存できない
#[tokio::test]
async fn test_download_failed_job_rejected() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut session = session_with(ScriptedBackend::new(vec![0], vec![]), 1);
    let ids = session.submit().unwrap();
    session.run_until_idle().await;

    let err = session
        .request_download(ids[0], dir.path().to_path_buf())
        .unwrap_err();
    assert!(matches!(err, StudioError::Core(unredo_common::Error::NotCompleted(_))));
}
