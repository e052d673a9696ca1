//! ヘッダーコンポーネント

use leptos::prelude::*;
use unredo_common::Studio;

#[component]
pub fn Header(studio: RwSignal<Studio>) -> impl IntoView {
    let stats = Memo::new(move |_| studio.with(|s| s.stats()));

    view! {
        <header class="header">
            <h1>"UnReDO."</h1>
            <div class="header-status">
                <span class="status-dot" class:active=move || stats.get().processing > 0></span>
                <span>"SYS_ONLINE"</span>
            </div>
            <div class="header-stats">
                <span>{move || format!("PROCESSING: {}", stats.get().processing)}</span>
                <span>{move || format!("ARCHIVED: {}", stats.get().archived)}</span>
                <Show when=move || stats.get().failed > 0>
                    <span class="text-error">{move || format!("FAILED: {}", stats.get().failed)}</span>
                </Show>
            </div>
        </header>
    }
}
