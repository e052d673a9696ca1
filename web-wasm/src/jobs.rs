//! ジョブの実行
//!
//! 1ジョブごとに spawn_local で API を呼び、応答待ちの間は擬似進捗を送る。
//! 状態の変更はすべて `RwSignal<Studio>` への更新として1回ずつ適用する。

use crate::api::gemini::generate_image;
use futures::future::{select, Either};
use gloo::timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::sync::Arc;
use unredo_common::{ease_progress, JobId, JobUpdate, Studio, UpdateOutcome};

const PROGRESS_INTERVAL_MS: u32 = 400;

/// フォームの内容で投入して各ジョブを開始
pub fn submit(studio: RwSignal<Studio>, api_key: String) -> Result<Vec<JobId>, String> {
    let ids = studio
        .try_update(|s| s.submit())
        .ok_or_else(|| "画面が破棄されています".to_string())?
        .map_err(|e| e.to_string())?;
    for &id in &ids {
        dispatch(studio, id, api_key.clone());
    }
    Ok(ids)
}

fn apply(studio: RwSignal<Studio>, id: JobId, update: JobUpdate) -> Option<UpdateOutcome> {
    studio.try_update(|s| s.apply_update(id, update))
}

fn dispatch(studio: RwSignal<Studio>, id: JobId, api_key: String) {
    let Some(settings) = studio.with_untracked(|s| {
        s.gallery().get(id).map(|item| Arc::clone(&item.settings))
    }) else {
        return;
    };

    apply(studio, id, JobUpdate::Started);

    spawn_local(async move {
        let request = Box::pin(generate_image(&api_key, &settings));
        let ticker = Box::pin(tick_progress(studio, id));

        let update = match select(request, ticker).await {
            Either::Left((Ok(image), _)) => JobUpdate::Succeeded {
                image_url: image.into(),
            },
            Either::Left((Err(message), _)) => JobUpdate::Failed { message },
            // 削除済み: 応答を待たずに終える
            Either::Right(((), _)) => return,
        };

        if apply(studio, id, update) == Some(UpdateOutcome::Missing) {
            leptos::logging::log!("{} は削除済みのため結果を破棄", id);
        }
    });
}

/// ジョブが消えるまで擬似進捗を送り続ける
async fn tick_progress(studio: RwSignal<Studio>, id: JobId) {
    let mut current = 0.0_f32;
    loop {
        TimeoutFuture::new(PROGRESS_INTERVAL_MS).await;
        current = ease_progress(current);
        match apply(studio, id, JobUpdate::Progress(current)) {
            Some(UpdateOutcome::Applied) | Some(UpdateOutcome::Ignored) => {}
            Some(UpdateOutcome::Missing) | None => return,
        }
    }
}
