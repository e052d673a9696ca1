//! ギャラリー（ジョブ一覧）
//!
//! - IDからレコードへのマップで更新をO(1)で処理
//! - 表示順は挿入順（古い順）で保持
//! - 一度発行したIDは削除後も再利用しない

use crate::error::{Error, Result};
use crate::lifecycle::{JobState, JobStatus, JobUpdate, UpdateOutcome};
use crate::types::GenerationSettings;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// ジョブID
///
/// `Gallery::issue_id` でのみ発行される
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct JobId(u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// ギャラリーの1件（1回分の生成ジョブ）
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryItem {
    pub id: JobId,
    pub state: JobState,
    pub settings: Arc<GenerationSettings>,
}

impl GalleryItem {
    /// 待機中のジョブを作成
    pub fn queued(id: JobId, settings: Arc<GenerationSettings>) -> Self {
        Self {
            id,
            state: JobState::default(),
            settings,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    pub fn progress(&self) -> Option<f32> {
        self.state.progress()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.state.image_url()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }
}

/// ヘッダー表示用の集計（毎回コレクションから再計算）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GalleryStats {
    /// queued + generating
    pub processing: usize,
    /// success
    pub archived: usize,
    pub failed: usize,
    pub total: usize,
}

/// ジョブコレクション
#[derive(Debug, Default)]
pub struct Gallery {
    items: HashMap<JobId, GalleryItem>,
    order: Vec<JobId>,
    next_id: u64,
    /// これまでに追加された最大のID
    high_water: u64,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しいジョブIDを発行
    pub fn issue_id(&mut self) -> JobId {
        self.next_id += 1;
        JobId(self.next_id)
    }

    /// ジョブを送信順に追加
    ///
    /// 既存・バッチ内重複・追加済みの最大ID以下のIDが1件でもあれば、何も追加せずにエラーを返す。
    /// 削除済みIDは必ず最大ID以下なので復活しない
    pub fn append(&mut self, jobs: Vec<GalleryItem>) -> Result<Vec<JobId>> {
        let mut seen = HashSet::with_capacity(jobs.len());
        for job in &jobs {
            if job.id.0 <= self.high_water || !seen.insert(job.id) {
                return Err(Error::DuplicateJob(job.id.to_string()));
            }
        }

        let mut ids = Vec::with_capacity(jobs.len());
        for job in jobs {
            // 別のギャラリーで発行されたIDでも今後の発行と衝突させない
            self.next_id = self.next_id.max(job.id.0);
            self.high_water = self.high_water.max(job.id.0);
            ids.push(job.id);
            self.order.push(job.id);
            self.items.insert(job.id, job);
        }
        Ok(ids)
    }

    /// IDに該当するジョブだけに更新を適用
    ///
    /// 該当なし（削除済みなど）は何もしない
    pub fn update(&mut self, id: JobId, update: JobUpdate) -> UpdateOutcome {
        match self.items.get_mut(&id) {
            Some(item) => item.state.apply(update),
            None => UpdateOutcome::Missing,
        }
    }

    /// ジョブを削除（該当なしなら false）
    pub fn remove(&mut self, id: JobId) -> bool {
        if self.items.remove(&id).is_none() {
            return false;
        }
        self.order.retain(|existing| *existing != id);
        true
    }

    /// 全件削除（処理中のジョブも含む）
    pub fn clear_all(&mut self) -> usize {
        let removed = self.order.len();
        self.order.clear();
        self.items.clear();
        removed
    }

    pub fn get(&self, id: JobId) -> Option<&GalleryItem> {
        self.items.get(&id)
    }

    pub fn contains(&self, id: JobId) -> bool {
        self.items.contains_key(&id)
    }

    /// 挿入順に列挙
    pub fn iter(&self) -> impl Iterator<Item = &GalleryItem> + '_ {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    /// 挿入順のID一覧
    pub fn ids(&self) -> &[JobId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn count_status(&self, status: JobStatus) -> usize {
        self.items.values().filter(|i| i.status() == status).count()
    }

    /// 処理中（queued + generating）の件数
    pub fn processing(&self) -> usize {
        self.items
            .values()
            .filter(|i| i.status().is_processing())
            .count()
    }

    /// 完了（success）の件数
    pub fn archived(&self) -> usize {
        self.count_status(JobStatus::Success)
    }

    pub fn stats(&self) -> GalleryStats {
        let mut stats = GalleryStats {
            total: self.items.len(),
            ..Default::default()
        };
        for item in self.items.values() {
            match item.status() {
                JobStatus::Queued | JobStatus::Generating => stats.processing += 1,
                JobStatus::Success => stats.archived += 1,
                JobStatus::Error => stats.failed += 1,
            }
        }
        stats
    }
}
