//! 入力フォームコンポーネント
//!
//! フォームの状態はすべて Studio の Composer が持ち、ここでは表示と入力の受け渡しだけを行う

use crate::jobs;
use crate::upload::read_file;
use leptos::prelude::*;
use unredo_common::catalog::{AVAILABLE_MODELS, STYLE_PRESETS};
use unredo_common::{
    AspectRatio, ImageResolution, Studio, UploadSlot, MAX_ATTACHMENTS,
};
use wasm_bindgen::JsCast;
use web_sys::HtmlInputElement;

#[component]
pub fn InputControls(studio: RwSignal<Studio>, api_key: ReadSignal<String>) -> impl IntoView {
    let (error, set_error) = signal(None::<String>);

    let attachment_count = move || studio.with(|s| s.composer().attachment_count());
    let active_jobs = move || studio.with(|s| s.active_jobs());
    let can_submit = move || studio.with(|s| s.composer().can_submit()) && !api_key.get().is_empty();

    let on_generate = move |_| match jobs::submit(studio, api_key.get_untracked()) {
        Ok(_) => set_error.set(None),
        Err(e) => set_error.set(Some(e)),
    };

    view! {
        <div class="input-controls">
            // SYSTEM CORE
            <div class="form-group">
                <label for="model">"SYSTEM CORE"</label>
                <select
                    id="model"
                    on:change=move |ev| {
                        let model_id = event_target_value(&ev);
                        let result = studio.try_update(|s| s.composer_mut().set_model(&model_id));
                        if let Some(Err(e)) = result {
                            set_error.set(Some(e.to_string()));
                        }
                    }
                >
                    {AVAILABLE_MODELS
                        .iter()
                        .map(|model| {
                            let id = model.id;
                            view! {
                                <option
                                    value=id
                                    selected=move || studio.with(|s| s.composer().model_id() == id)
                                >
                                    {model.name}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
            </div>

            // ACTION（添付画像）
            <div class="form-group">
                <label>{move || format!("ACTION ({}/{})", attachment_count(), MAX_ATTACHMENTS)}</label>
                <div class="upload-slots">
                    {UploadSlot::ALL
                        .into_iter()
                        .map(|slot| view! { <SlotView studio=studio slot=slot set_error=set_error /> })
                        .collect_view()}
                </div>
            </div>

            // JOB_PARAMETERS
            <div class="form-group">
                <label for="main-prompt">"SCENE_DESCRIPTION"</label>
                <textarea
                    id="main-prompt"
                    placeholder="> INPUT SCENE DATA..."
                    prop:value=move || studio.with(|s| s.composer().main_prompt().to_string())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        studio.update(|s| s.composer_mut().set_main_prompt(value));
                    }
                ></textarea>
            </div>
            <div class="form-group">
                <label for="background-prompt">"ENVIRONMENT_CONFIG"</label>
                <input
                    type="text"
                    id="background-prompt"
                    placeholder="> INPUT ENV DATA..."
                    prop:value=move || studio.with(|s| s.composer().background_prompt().to_string())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        studio.update(|s| s.composer_mut().set_background_prompt(value));
                    }
                />
            </div>
            <div class="form-group">
                <label for="headline">"OVERLAY_TEXT"</label>
                <input
                    type="text"
                    id="headline"
                    placeholder="HEADLINE GOES HERE"
                    prop:value=move || studio.with(|s| s.composer().headline_text().to_string())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        studio.update(|s| s.composer_mut().set_headline_text(value));
                    }
                />
            </div>

            // OUTPUT_FORMAT
            <div class="output-format">
                <div class="form-group">
                    <label for="resolution">"RES"</label>
                    <select
                        id="resolution"
                        disabled=move || !studio.with(|s| s.composer().resolution_editable())
                        on:change=move |ev| {
                            let Ok(resolution) = event_target_value(&ev).parse::<ImageResolution>() else {
                                return;
                            };
                            let result = studio.try_update(|s| s.composer_mut().set_resolution(resolution));
                            if let Some(Err(e)) = result {
                                set_error.set(Some(e.to_string()));
                            }
                        }
                    >
                        {ImageResolution::ALL
                            .into_iter()
                            .map(|resolution| {
                                view! {
                                    <option
                                        value=resolution.as_str()
                                        selected=move || {
                                            studio.with(|s| s.composer().image_resolution() == resolution)
                                        }
                                    >
                                        {format!("{}px ({})", resolution.pixels(), resolution)}
                                    </option>
                                }
                            })
                            .collect_view()}
                    </select>
                </div>

                <div class="form-group">
                    <label>"BATCH_SIZE"</label>
                    <div class="batch-size">
                        <button on:click=move |_| {
                            studio.update(|s| {
                                s.composer_mut().decrement_count();
                            });
                        }>"-"</button>
                        <span>{move || studio.with(|s| s.composer().generation_count())}</span>
                        <button on:click=move |_| {
                            studio.update(|s| {
                                s.composer_mut().increment_count();
                            });
                        }>"+"</button>
                    </div>
                </div>

                <div class="aspect-ratio">
                    {[AspectRatio::Landscape, AspectRatio::Portrait]
                        .into_iter()
                        .map(|aspect| {
                            view! {
                                <button
                                    class="btn btn-aspect"
                                    class:active=move || studio.with(|s| s.composer().aspect_ratio() == aspect)
                                    on:click=move |_| studio.update(|s| s.composer_mut().set_aspect_ratio(aspect))
                                >
                                    {aspect.as_str()}
                                </button>
                            }
                        })
                        .collect_view()}
                </div>
            </div>

            // STYLE_MATRIX
            <div class="form-group">
                <label for="style">"STYLE_MATRIX"</label>
                <select
                    id="style"
                    on:change=move |ev| {
                        let style = event_target_value(&ev);
                        let result = studio.try_update(|s| s.composer_mut().set_style_preset(&style));
                        if let Some(Err(e)) = result {
                            set_error.set(Some(e.to_string()));
                        }
                    }
                >
                    {STYLE_PRESETS
                        .iter()
                        .map(|&style| {
                            view! {
                                <option
                                    value=style
                                    selected=move || studio.with(|s| s.composer().style_preset() == style)
                                >
                                    {style}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
            </div>

            <Show when=move || error.get().is_some()>
                <p class="text-error">{move || error.get().unwrap_or_default()}</p>
            </Show>

            <button class="btn btn-primary btn-generate" disabled=move || !can_submit() on:click=on_generate>
                {move || if active_jobs() > 0 { "PROCESSING..." } else { "INITIATE_GENERATE" }}
            </button>
        </div>
    }
}

/// 添付スロット1枠
#[component]
fn SlotView(
    studio: RwSignal<Studio>,
    slot: UploadSlot,
    set_error: WriteSignal<Option<String>>,
) -> impl IntoView {
    let role = slot.role();
    let current = move || {
        studio.with(|s| {
            s.composer()
                .slot(slot)
                .map(|image| (image.id, image.preview_url().to_string()))
        })
    };
    let has_capacity = move || studio.with(|s| s.composer().has_capacity());

    let on_change = move |ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        input.set_value("");

        let file_name = file.name();
        read_file(file, move |result| {
            let message = match result {
                Ok(data) => studio
                    .try_update(|s| s.attach(file_name.clone(), data, role))
                    .and_then(|attached| attached.err())
                    .map(|e| e.to_string()),
                Err(e) => Some(e),
            };
            set_error.set(message);
        });
    };

    view! {
        <div class="upload-slot">
            {move || match current() {
                Some((id, preview)) => view! {
                    <img src=preview alt=slot.label() />
                    <button
                        class="slot-remove"
                        on:click=move |_| {
                            studio.update(|s| {
                                s.detach(id, role);
                            });
                        }
                    >
                        "×"
                    </button>
                    <Show when=move || slot == UploadSlot::Actor>
                        <input
                            type="text"
                            class="slot-emotion"
                            placeholder="EMOTION"
                            on:input=move |ev| {
                                let emotion = event_target_value(&ev);
                                studio.update(|s| {
                                    s.composer_mut().set_actor_emotion(id, emotion);
                                });
                            }
                        />
                    </Show>
                }
                .into_any(),
                None => view! {
                    <label class="slot-empty" class:disabled=move || !has_capacity()>
                        <span>{format!("UPLOAD {}", slot.label())}</span>
                        <input
                            type="file"
                            accept="image/*"
                            class="hidden"
                            disabled=move || !has_capacity()
                            on:change=on_change
                        />
                    </label>
                }
                .into_any(),
            }}
        </div>
    }
}
