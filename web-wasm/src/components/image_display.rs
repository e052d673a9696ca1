//! ギャラリー表示コンポーネント
//!
//! カードはジョブIDをキーに並べ、各カードは自分のジョブだけを購読する

use crate::download::trigger_download;
use leptos::prelude::*;
use unredo_common::{CardAction, CardView, JobId, JobStatus, Studio};

#[component]
pub fn ImageDisplay(studio: RwSignal<Studio>) -> impl IntoView {
    let (notice, set_notice) = signal(None::<String>);

    let download = move |id: JobId| {
        let result = studio
            .with_untracked(|s| s.download_request(id))
            .map_err(|e| e.to_string())
            .and_then(|request| trigger_download(&request));
        set_notice.set(result.err());
    };

    let focus = move |id: JobId| {
        let result = studio
            .try_update(|s| s.focus(id))
            .unwrap_or(Ok(()))
            .map_err(|e| e.to_string());
        set_notice.set(result.err());
    };

    let is_empty = move || studio.with(|s| s.gallery().is_empty());

    view! {
        <div class="image-display">
            <div class="gallery-header">
                <h2>"OUTPUT_GALLERY"</h2>
                <Show when=move || !is_empty()>
                    <button
                        class="btn btn-danger"
                        on:click=move |_| {
                            studio.update(|s| {
                                s.clear_all();
                            });
                        }
                    >
                        "PURGE_DATABASE"
                    </button>
                </Show>
            </div>

            <Show when=move || notice.get().is_some()>
                <p class="text-error">{move || notice.get().unwrap_or_default()}</p>
            </Show>

            <Show
                when=move || !is_empty()
                fallback=|| view! {
                    <div class="gallery-idle">
                        <h3>"SYSTEM_IDLE"</h3>
                        <p class="text-muted">"AWAITING INPUT PARAMETERS"</p>
                    </div>
                }
            >
                <div class="gallery-grid">
                    <For
                        each=move || studio.with(|s| s.gallery().ids().to_vec())
                        key=|id| *id
                        children=move |id| {
                            view! { <ImageCard studio=studio id=id on_download=download on_focus=focus /> }
                        }
                    />
                </div>
            </Show>

            <LightboxView studio=studio on_download=download />
        </div>
    }
}

#[component]
fn ImageCard<FD, FF>(
    studio: RwSignal<Studio>,
    id: JobId,
    on_download: FD,
    on_focus: FF,
) -> impl IntoView
where
    FD: Fn(JobId) + Copy + Send + Sync + 'static,
    FF: Fn(JobId) + Copy + Send + Sync + 'static,
{
    let card = Memo::new(move |_| studio.with(|s| s.gallery().get(id).map(CardView::from_item)));
    let status = move || card.get().map(|c| c.status);
    let remove = move |_| {
        studio.update(|s| {
            s.remove(id);
        });
    };
    let actions = move || {
        card.get()
            .map(|c| c.actions())
            .unwrap_or(&[])
            .iter()
            .map(|action| match action {
                CardAction::Download => view! {
                    <button class="btn btn-small" on:click=move |_| on_download(id)>"DOWNLOAD"</button>
                }
                .into_any(),
                CardAction::Remove => view! {
                    <button class="btn btn-danger btn-small" on:click=remove>"DELETE"</button>
                }
                .into_any(),
            })
            .collect_view()
    };

    view! {
        <div
            class="image-card"
            class:portrait=move || card.get().map(|c| c.portrait).unwrap_or(false)
        >
            <Show when=move || matches!(status(), Some(JobStatus::Queued | JobStatus::Generating))>
                <div class="card-processing" class:scanning=move || status() == Some(JobStatus::Generating)>
                    <div class="card-headline">{move || card.get().map(|c| c.headline).unwrap_or_default()}</div>
                    <div class="card-progress">
                        <span>{move || card.get().and_then(|c| c.progress_label).unwrap_or_default()}</span>
                        <div class="progress-cells">
                            {(0..10u8)
                                .map(|i| {
                                    view! {
                                        <div
                                            class="progress-cell"
                                            class:filled=move || {
                                                card.get()
                                                    .and_then(|c| c.progress_percent)
                                                    .map(|p| i < p / 10)
                                                    .unwrap_or(false)
                                            }
                                        ></div>
                                    }
                                })
                                .collect_view()}
                        </div>
                    </div>
                </div>
            </Show>

            <Show when=move || status() == Some(JobStatus::Error)>
                <div class="card-error">
                    <span class="text-error">"SYSTEM FAILURE"</span>
                    <span class="text-muted">{move || card.get().and_then(|c| c.error).unwrap_or_default()}</span>
                    <div class="card-actions">{actions}</div>
                </div>
            </Show>

            <Show when=move || card.get().map(|c| c.can_focus()).unwrap_or(false)>
                <img
                    src=move || card.get().and_then(|c| c.image_url).unwrap_or_default()
                    alt="Generated"
                    on:click=move |_| on_focus(id)
                />
                <div class="card-overlay">
                    <div class="card-badges">
                        <span>{move || card.get().map(|c| c.resolution_badge).unwrap_or_default()}</span>
                        <span>{move || card.get().map(|c| c.tier_badge).unwrap_or_default()}</span>
                    </div>
                    <div class="card-actions">{actions}</div>
                </div>
            </Show>
        </div>
    }
}

/// 完了済みジョブの拡大表示
#[component]
fn LightboxView<FD>(studio: RwSignal<Studio>, on_download: FD) -> impl IntoView
where
    FD: Fn(JobId) + Copy + Send + Sync + 'static,
{
    let focused = Memo::new(move |_| studio.with(|s| s.focused_item().map(CardView::from_item)));

    view! {
        <Show when=move || focused.get().is_some()>
            <div class="lightbox">
                <button
                    class="lightbox-close"
                    on:click=move |_| studio.update(|s| s.unfocus())
                >
                    "CLOSE_VIEW"
                </button>
                <img
                    src=move || focused.get().and_then(|c| c.image_url).unwrap_or_default()
                    alt="Full View"
                />
                <div class="lightbox-hud">
                    <button
                        class="btn btn-primary"
                        on:click=move |_| {
                            if let Some(card) = focused.get_untracked() {
                                on_download(card.id);
                            }
                        }
                    >
                        "DOWNLOAD"
                    </button>
                    <div>
                        <span class="text-muted">"Job ID"</span>
                        <span>{move || focused.get().map(|c| c.id.to_string()).unwrap_or_default()}</span>
                    </div>
                    <div>
                        <span class="text-muted">"Prompt Data"</span>
                        <span>{move || focused.get().map(|c| c.prompt).unwrap_or_default()}</span>
                    </div>
                </div>
            </div>
        </Show>
    }
}
