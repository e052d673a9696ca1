//! ライトボックス（拡大表示）の選択状態
//!
//! ギャラリーモデルには含めない画面ローカルの状態

use crate::error::{Error, Result};
use crate::gallery::{Gallery, GalleryItem, JobId};
use crate::lifecycle::JobStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lightbox {
    focused: Option<JobId>,
}

impl Lightbox {
    /// 完了済み（画像あり）のジョブだけ開ける
    pub fn open(&mut self, gallery: &Gallery, id: JobId) -> Result<()> {
        let item = gallery
            .get(id)
            .ok_or_else(|| Error::JobNotFound(id.to_string()))?;
        if item.status() != JobStatus::Success || item.image_url().is_none() {
            return Err(Error::NotCompleted(id.to_string()));
        }
        self.focused = Some(id);
        Ok(())
    }

    pub fn close(&mut self) {
        self.focused = None;
    }

    pub fn focused(&self) -> Option<JobId> {
        self.focused
    }

    pub fn is_open(&self) -> bool {
        self.focused.is_some()
    }

    /// 表示中のジョブ（削除済みなら None）
    pub fn item<'g>(&self, gallery: &'g Gallery) -> Option<&'g GalleryItem> {
        self.focused
            .and_then(|id| gallery.get(id))
            .filter(|item| item.image_url().is_some())
    }

    /// 表示中のジョブが消えていれば閉じる
    pub fn reconcile(&mut self, gallery: &Gallery) -> bool {
        if self.focused.is_some() && self.item(gallery).is_none() {
            self.focused = None;
            return true;
        }
        false
    }
}
