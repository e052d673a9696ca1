//! 添付画像の読み込みテスト

use std::path::PathBuf;
use std::sync::Arc;
use tempfile::tempdir;
use unredo_common::{AttachmentRole, DataUrl, GenerationSettings, Studio, MAX_ATTACHMENTS};
use unredo_studio::backend::{GenerationBackend, ProgressSink};
use unredo_studio::decode::decode_file;
use unredo_studio::error::{Result, StudioError};
use unredo_studio::session::{AttachmentSource, Session};

struct UnusedBackend;

#[async_trait::async_trait]
impl GenerationBackend for UnusedBackend {
    async fn generate(&self, _settings: &GenerationSettings, _progress: ProgressSink) -> Result<DataUrl> {
        Err(StudioError::ApiCall("unused".into()))
    }
}

fn write_png(dir: &std::path::Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::new(2, 2).save(&path).expect("PNG書き込み失敗");
    path
}

fn source(path: PathBuf, role: AttachmentRole) -> AttachmentSource {
    AttachmentSource {
        path,
        role,
        emotion: None,
    }
}

/// 実際のPNGファイルを読み込む
#[tokio::test]
async fn test_decode_png_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = write_png(dir.path(), "actor.png");

    let decoded = decode_file(&path).await.expect("読み込み失敗");
    assert_eq!(decoded.file_name, "actor.png");
    assert_eq!(decoded.data.mime_type(), "image/png");
    assert!(decoded.data.as_str().starts_with("data:image/png;base64,"));
}

/// 役割ごとに振り分けられ、表情が設定される
#[tokio::test]
async fn test_attach_files_by_role() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut session = Session::new(Studio::new(), Arc::new(UnusedBackend));

    let report = session
        .attach_files(vec![
            AttachmentSource {
                path: write_png(dir.path(), "hero.png"),
                role: AttachmentRole::Actor,
                emotion: Some("smiling".into()),
            },
            source(write_png(dir.path(), "thumb.png"), AttachmentRole::Reference),
        ])
        .await;

    assert_eq!(report.attached.len(), 2);
    assert!(report.failed.is_empty());

    let composer = session.studio().composer();
    assert_eq!(composer.actors().len(), 1);
    assert_eq!(composer.actors()[0].emotion, "smiling");
    assert_eq!(composer.references().len(), 1);
    assert_eq!(composer.references()[0].file_name, "thumb.png");
}

/// 読み込み失敗は他の添付に影響しない
#[tokio::test]
async fn test_attach_failure_is_isolated() {
    let dir = tempdir().expect("Failed to create temp dir");
    let text = dir.path().join("notes.txt");
    std::fs::write(&text, "not an image").unwrap();

    let mut session = Session::new(Studio::new(), Arc::new(UnusedBackend));
    let report = session
        .attach_files(vec![
            source(write_png(dir.path(), "ok.png"), AttachmentRole::Reference),
            source(text.clone(), AttachmentRole::Reference),
            source(dir.path().join("missing.png"), AttachmentRole::Actor),
        ])
        .await;

    assert_eq!(report.attached.len(), 1);
    assert_eq!(report.failed.len(), 2);
    assert_eq!(session.studio().composer().attachment_count(), 1);
    assert!(report
        .failed
        .iter()
        .any(|(path, e)| *path == text && matches!(e, StudioError::Decode(_))));
}

/// 上限を超えた分は拒否される
#[tokio::test]
async fn test_attach_capacity() {
    let dir = tempdir().expect("Failed to create temp dir");
    let sources: Vec<AttachmentSource> = (0..MAX_ATTACHMENTS + 1)
        .map(|i| source(write_png(dir.path(), &format!("ref{}.png", i)), AttachmentRole::Reference))
        .collect();

    let mut session = Session::new(Studio::new(), Arc::new(UnusedBackend));
    let report = session.attach_files(sources).await;

    assert_eq!(report.attached.len(), MAX_ATTACHMENTS);
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(
        report.failed[0].1,
        StudioError::Core(unredo_common::Error::AttachmentCapacity { .. })
    ));
    assert_eq!(session.studio().composer().attachment_count(), MAX_ATTACHMENTS);
}
