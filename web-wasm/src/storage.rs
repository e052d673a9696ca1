//! ブラウザ設定の保存（localStorage）

use gloo::storage::{LocalStorage, Storage};
use serde::{Deserialize, Serialize};

const STORAGE_KEY: &str = "unredo.settings";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub model_id: Option<String>,
}

/// 保存済みの設定（なければ既定値）
pub fn load() -> StoredSettings {
    LocalStorage::get(STORAGE_KEY).unwrap_or_default()
}

pub fn save(settings: &StoredSettings) -> Result<(), String> {
    LocalStorage::set(STORAGE_KEY, settings).map_err(|e| format!("保存失敗: {}", e))
}

pub fn clear() {
    LocalStorage::delete(STORAGE_KEY);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_settings_tolerates_missing_fields() {
        let settings: StoredSettings = serde_json::from_str(r#"{"apiKey":"k"}"#).unwrap();
        assert_eq!(settings.api_key, "k");
        assert_eq!(settings.model_id, None);
    }
}
