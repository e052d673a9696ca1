//! Gemini API バックエンド

use super::{GenerationBackend, ProgressSink};
use crate::config::Config;
use crate::error::{Result, StudioError};
use async_trait::async_trait;
use std::time::Duration;
use unredo_common::gemini::{api_error_message, build_request, endpoint, parse_image_response};
use unredo_common::{ease_progress, DataUrl, GenerationSettings};

pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    progress_interval: Duration,
}

impl GeminiBackend {
    pub fn new(config: &Config, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            api_key,
            api_base: config.api_base.clone(),
            progress_interval: Duration::from_millis(config.progress_interval_ms.max(50)),
        })
    }

    async fn request(&self, settings: &GenerationSettings) -> Result<DataUrl> {
        let url = endpoint(&self.api_base, &settings.model_id);
        let body = build_request(settings);

        tracing::debug!(model = %settings.model_id, "Gemini API 呼び出し");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| StudioError::ApiCall(e.to_string()))?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(StudioError::ApiCall(api_error_message(status.as_u16(), &text)));
        }

        parse_image_response(&text).map_err(|e| StudioError::ApiParse(e.to_string()))
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate(&self, settings: &GenerationSettings, progress: ProgressSink) -> Result<DataUrl> {
        let request = self.request(settings);
        tokio::pin!(request);

        // 応答が返るまで擬似進捗を送り続ける
        let mut ticker = tokio::time::interval(self.progress_interval);
        ticker.tick().await;
        let mut current = 0.0_f32;

        loop {
            tokio::select! {
                result = &mut request => return result,
                _ = ticker.tick() => {
                    current = ease_progress(current);
                    progress.report(current);
                }
            }
        }
    }
}
