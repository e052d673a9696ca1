//! アプリケーション状態コンテナ
//!
//! フォーム・ギャラリー・ライトボックスをまとめて保持し、
//! 画面からの操作とバックエンドからの通知をここで一括して適用する。
//! 描画層はこの構造体への参照だけを受け取る。

use crate::composer::Composer;
use crate::data_url::DataUrl;
use crate::error::{Error, Result};
use crate::gallery::{Gallery, GalleryItem, GalleryStats, JobId};
use crate::lifecycle::{JobStatus, JobUpdate, UpdateOutcome};
use crate::lightbox::Lightbox;
use crate::types::{AttachmentId, AttachmentRole};
use std::sync::Arc;

/// 保存依頼（保存処理は呼び出し側の外部機能が行う）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub job: JobId,
    pub image_url: String,
}

#[derive(Debug, Default)]
pub struct Studio {
    composer: Composer,
    gallery: Gallery,
    lightbox: Lightbox,
}

impl Studio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_composer(composer: Composer) -> Self {
        Self {
            composer,
            ..Default::default()
        }
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut Composer {
        &mut self.composer
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    /// フォームの内容でジョブを投入
    pub fn submit(&mut self) -> Result<Vec<JobId>> {
        self.composer.submit(&mut self.gallery)
    }

    pub fn attach(
        &mut self,
        file_name: impl Into<String>,
        data: DataUrl,
        role: AttachmentRole,
    ) -> Result<AttachmentId> {
        self.composer.attach(file_name, data, role)
    }

    pub fn detach(&mut self, id: AttachmentId, role: AttachmentRole) -> bool {
        self.composer.detach(id, role)
    }

    /// バックエンドからの通知を適用
    pub fn apply_update(&mut self, id: JobId, update: JobUpdate) -> UpdateOutcome {
        self.gallery.update(id, update)
    }

    pub fn remove(&mut self, id: JobId) -> bool {
        let removed = self.gallery.remove(id);
        self.lightbox.reconcile(&self.gallery);
        removed
    }

    pub fn clear_all(&mut self) -> usize {
        let removed = self.gallery.clear_all();
        self.lightbox.close();
        removed
    }

    pub fn focus(&mut self, id: JobId) -> Result<()> {
        self.lightbox.open(&self.gallery, id)
    }

    pub fn unfocus(&mut self) {
        self.lightbox.close();
    }

    pub fn focused_item(&self) -> Option<&GalleryItem> {
        self.lightbox.item(&self.gallery)
    }

    /// 完了済みジョブの保存依頼を作成
    pub fn download_request(&self, id: JobId) -> Result<DownloadRequest> {
        let item = self
            .gallery
            .get(id)
            .ok_or_else(|| Error::JobNotFound(id.to_string()))?;
        let image_url = item
            .image_url()
            .ok_or_else(|| Error::NotCompleted(id.to_string()))?;
        Ok(DownloadRequest {
            job: id,
            image_url: image_url.to_string(),
        })
    }

    /// 失敗したジョブと同じ設定で新しいジョブを1件投入
    ///
    /// 失敗したジョブ自体は変更しない
    pub fn retry(&mut self, id: JobId) -> Result<JobId> {
        let item = self
            .gallery
            .get(id)
            .ok_or_else(|| Error::JobNotFound(id.to_string()))?;
        if item.status() != JobStatus::Error {
            return Err(Error::NotFailed(id.to_string()));
        }
        let settings = Arc::clone(&item.settings);
        let new_id = self.gallery.issue_id();
        self.gallery
            .append(vec![GalleryItem::queued(new_id, settings)])?;
        Ok(new_id)
    }

    pub fn stats(&self) -> GalleryStats {
        self.gallery.stats()
    }

    /// 処理中のジョブ数（送信ボタンの表示切替に使う）
    pub fn active_jobs(&self) -> usize {
        self.gallery.processing()
    }
}
