//! メインアプリケーションコンポーネント

use crate::components::{
    header::Header,
    image_display::ImageDisplay,
    input_controls::InputControls,
    settings_panel::SettingsPanel,
};
use crate::storage;
use leptos::prelude::*;
use unredo_common::{Composer, Studio};

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let stored = storage::load();

    // 保存済みのモデルがカタログから消えていれば既定のモデルのまま
    let mut composer = Composer::new();
    if let Some(model_id) = stored.model_id.as_deref() {
        if composer.set_model(model_id).is_err() {
            leptos::logging::warn!("保存済みのモデル {} は使用できません", model_id);
        }
    }

    let studio = RwSignal::new(Studio::with_composer(composer));
    let (api_key, set_api_key) = signal(stored.api_key);

    view! {
        <div class="container">
            <Header studio=studio />

            <SettingsPanel studio=studio api_key=api_key set_api_key=set_api_key />

            <main class="studio-layout">
                <InputControls studio=studio api_key=api_key />
                <ImageDisplay studio=studio />
            </main>
        </div>
    }
}
