//! リクエスト作成フォームの状態
//!
//! 入力中の生成設定と添付画像を保持し、送信時に不変のスナップショットを作る。
//! 送信後も添付画像はクリアしない（同じ人物で続けて生成するため）。

use crate::catalog::{self, DEFAULT_MODEL_ID, STYLE_PRESETS};
use crate::data_url::DataUrl;
use crate::error::{Error, Result};
use crate::gallery::{Gallery, GalleryItem, JobId};
use crate::types::{
    Actor, AspectRatio, AttachmentId, AttachmentRole, GenerationSettings, ImageResolution,
    UploadedImage,
};
use std::sync::Arc;

/// 添付画像の上限（人物 + 参考画像の合計）
pub const MAX_ATTACHMENTS: usize = 5;

pub const MIN_GENERATION_COUNT: u8 = 1;
pub const MAX_GENERATION_COUNT: u8 = 4;

/// フォーム上のアップロード枠
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSlot {
    /// 枠1: 人物
    Actor,
    /// 枠2: 参考サムネイル
    Thumbnail,
    /// 枠3: ロゴ
    Logo,
}

impl UploadSlot {
    pub const ALL: [UploadSlot; 3] = [UploadSlot::Actor, UploadSlot::Thumbnail, UploadSlot::Logo];

    pub fn role(&self) -> AttachmentRole {
        match self {
            UploadSlot::Actor => AttachmentRole::Actor,
            UploadSlot::Thumbnail | UploadSlot::Logo => AttachmentRole::Reference,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UploadSlot::Actor => "ACTOR",
            UploadSlot::Thumbnail => "REF_THUMB",
            UploadSlot::Logo => "LOGO",
        }
    }
}

/// 入力中の生成リクエスト
#[derive(Debug, Clone)]
pub struct Composer {
    model_id: String,
    main_prompt: String,
    background_prompt: String,
    headline_text: String,
    image_resolution: ImageResolution,
    aspect_ratio: AspectRatio,
    style_preset: String,
    generation_count: u8,
    actors: Vec<Actor>,
    references: Vec<UploadedImage>,
    next_attachment: u32,
}

impl Default for Composer {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            main_prompt: String::new(),
            background_prompt: String::new(),
            headline_text: String::new(),
            image_resolution: ImageResolution::default(),
            aspect_ratio: AspectRatio::default(),
            style_preset: STYLE_PRESETS[0].to_string(),
            generation_count: MIN_GENERATION_COUNT,
            actors: Vec::new(),
            references: Vec::new(),
            next_attachment: 0,
        }
    }
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- 読み取り ----

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn main_prompt(&self) -> &str {
        &self.main_prompt
    }

    pub fn background_prompt(&self) -> &str {
        &self.background_prompt
    }

    pub fn headline_text(&self) -> &str {
        &self.headline_text
    }

    pub fn image_resolution(&self) -> ImageResolution {
        self.image_resolution
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn style_preset(&self) -> &str {
        &self.style_preset
    }

    pub fn generation_count(&self) -> u8 {
        self.generation_count
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn references(&self) -> &[UploadedImage] {
        &self.references
    }

    pub fn attachment_count(&self) -> usize {
        self.actors.len() + self.references.len()
    }

    pub fn has_capacity(&self) -> bool {
        self.attachment_count() < MAX_ATTACHMENTS
    }

    /// 解像度セレクトを有効にするか（モデル依存）
    pub fn resolution_editable(&self) -> bool {
        catalog::supports_resolution(&self.model_id)
    }

    /// 送信ボタンを有効にするか
    pub fn can_submit(&self) -> bool {
        !self.main_prompt.trim().is_empty()
    }

    /// アップロード枠に表示する画像
    pub fn slot(&self, slot: UploadSlot) -> Option<&UploadedImage> {
        match slot {
            UploadSlot::Actor => self.actors.first().map(|a| &a.image),
            UploadSlot::Thumbnail => self.references.first(),
            UploadSlot::Logo => self.references.get(1),
        }
    }

    // ---- 入力 ----

    pub fn set_main_prompt(&mut self, value: impl Into<String>) {
        self.main_prompt = value.into();
    }

    pub fn set_background_prompt(&mut self, value: impl Into<String>) {
        self.background_prompt = value.into();
    }

    pub fn set_headline_text(&mut self, value: impl Into<String>) {
        self.headline_text = value.into();
    }

    /// モデルを切り替える
    ///
    /// 解像度指定に対応しないモデルへ切り替えた場合は解像度をデフォルトへ戻す
    pub fn set_model(&mut self, model_id: &str) -> Result<()> {
        let model = catalog::find_model(model_id)
            .ok_or_else(|| Error::UnknownModel(model_id.to_string()))?;
        self.model_id = model.id.to_string();
        if !model.supports_resolution {
            self.image_resolution = ImageResolution::default();
        }
        Ok(())
    }

    pub fn set_resolution(&mut self, resolution: ImageResolution) -> Result<()> {
        if resolution != self.image_resolution && !self.resolution_editable() {
            return Err(Error::ResolutionLocked(self.model_id.clone()));
        }
        self.image_resolution = resolution;
        Ok(())
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        self.aspect_ratio = aspect_ratio;
    }

    pub fn toggle_aspect_ratio(&mut self) -> AspectRatio {
        self.aspect_ratio = self.aspect_ratio.toggled();
        self.aspect_ratio
    }

    pub fn set_style_preset(&mut self, name: &str) -> Result<()> {
        if !catalog::is_style_preset(name) {
            return Err(Error::UnknownStyle(name.to_string()));
        }
        self.style_preset = name.to_string();
        Ok(())
    }

    /// 生成枚数を設定（1〜4にクランプ）
    pub fn set_generation_count(&mut self, count: u8) -> u8 {
        self.generation_count = count.clamp(MIN_GENERATION_COUNT, MAX_GENERATION_COUNT);
        self.generation_count
    }

    pub fn increment_count(&mut self) -> u8 {
        self.set_generation_count(self.generation_count.saturating_add(1))
    }

    pub fn decrement_count(&mut self) -> u8 {
        self.set_generation_count(self.generation_count.saturating_sub(1))
    }

    // ---- 添付 ----

    /// 読み込み済みの画像を添付
    ///
    /// 合計が上限に達している場合は追加せずにエラーを返す
    pub fn attach(
        &mut self,
        file_name: impl Into<String>,
        data: DataUrl,
        role: AttachmentRole,
    ) -> Result<AttachmentId> {
        if !self.has_capacity() {
            return Err(Error::AttachmentCapacity {
                limit: MAX_ATTACHMENTS,
            });
        }

        self.next_attachment += 1;
        let image = UploadedImage {
            id: AttachmentId(self.next_attachment),
            file_name: file_name.into(),
            data,
        };
        let id = image.id;

        match role {
            AttachmentRole::Actor => self.actors.push(Actor {
                image,
                emotion: String::new(),
            }),
            AttachmentRole::Reference => self.references.push(image),
        }
        Ok(id)
    }

    /// 添付を外す（該当なしなら false）
    pub fn detach(&mut self, id: AttachmentId, role: AttachmentRole) -> bool {
        let before = self.attachment_count();
        match role {
            AttachmentRole::Actor => self.actors.retain(|a| a.image.id != id),
            AttachmentRole::Reference => self.references.retain(|r| r.id != id),
        }
        self.attachment_count() != before
    }

    /// 人物画像の表情ラベルを設定
    pub fn set_actor_emotion(&mut self, id: AttachmentId, emotion: impl Into<String>) -> bool {
        match self.actors.iter_mut().find(|a| a.image.id == id) {
            Some(actor) => {
                actor.emotion = emotion.into();
                true
            }
            None => false,
        }
    }

    // ---- 送信 ----

    /// 現在の入力から設定スナップショットを作成
    pub fn snapshot(&self) -> Result<GenerationSettings> {
        if !self.can_submit() {
            return Err(Error::EmptyPrompt);
        }

        Ok(GenerationSettings {
            model_id: self.model_id.clone(),
            main_prompt: self.main_prompt.trim().to_string(),
            background_prompt: self.background_prompt.trim().to_string(),
            headline_text: self.headline_text.trim().to_string(),
            image_resolution: self.image_resolution,
            aspect_ratio: self.aspect_ratio,
            style_preset: self.style_preset.clone(),
            generation_count: self.generation_count,
            actors: self.actors.clone(),
            references: self.references.clone(),
        })
    }

    /// 生成枚数分のジョブを作成してギャラリーへ追加
    pub fn submit(&self, gallery: &mut Gallery) -> Result<Vec<JobId>> {
        let settings = Arc::new(self.snapshot()?);
        let jobs = (0..settings.generation_count)
            .map(|_| GalleryItem::queued(gallery.issue_id(), Arc::clone(&settings)))
            .collect();
        gallery.append(jobs)
    }
}
