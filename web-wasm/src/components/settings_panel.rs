//! 設定パネルコンポーネント

use crate::storage::{self, StoredSettings};
use leptos::prelude::*;
use unredo_common::Studio;

#[component]
pub fn SettingsPanel(
    studio: RwSignal<Studio>,
    api_key: ReadSignal<String>,
    set_api_key: WriteSignal<String>,
) -> impl IntoView {
    let (api_key_status, set_api_key_status) = signal(String::new());

    let on_save = move |_| {
        let settings = StoredSettings {
            api_key: api_key.get_untracked(),
            model_id: Some(studio.with_untracked(|s| s.composer().model_id().to_string())),
        };
        match storage::save(&settings) {
            Ok(()) => set_api_key_status.set("保存しました".to_string()),
            Err(e) => set_api_key_status.set(e),
        }
    };

    let on_clear = move |_| {
        storage::clear();
        set_api_key.set(String::new());
        set_api_key_status.set("削除しました".to_string());
    };

    view! {
        <div class="settings-panel">
            <div class="form-group">
                <label for="api-key">"Gemini API Key"</label>
                <input
                    type="password"
                    id="api-key"
                    placeholder="API Keyを入力..."
                    prop:value=move || api_key.get()
                    on:input=move |ev| {
                        set_api_key.set(event_target_value(&ev));
                    }
                />
                <a
                    href="https://aistudio.google.com/app/apikey"
                    target="_blank"
                    rel="noopener noreferrer"
                    class="api-key-link"
                >
                    "APIキーを取得 →"
                </a>
                <div class="api-actions">
                    <button class="btn btn-primary btn-small" on:click=on_save>"保存"</button>
                    <button class="btn btn-tertiary btn-small" on:click=on_clear>"削除"</button>
                </div>
                <div class="api-key-status">
                    {move || api_key_status.get()}
                </div>
            </div>
        </div>
    }
}
