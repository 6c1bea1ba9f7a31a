//! Gemini API連携（reqwest）

use crate::error::{KitScanError, Result};
use crate::scanner::ImagePayload;
use kit_scan_common::gemini::{endpoint_url, GeminiRequest, GeminiResponse};
use std::time::Duration;
use tracing::debug;

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| KitScanError::ApiCall(format!("HTTPクライアント作成エラー: {}", e)))?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    /// プロンプトと画像を送信してテキスト応答を得る
    pub async fn generate(&self, prompt: &str, image: &ImagePayload) -> Result<String> {
        let request = GeminiRequest::with_image(prompt, &image.mime_type, &image.data);
        debug!(
            "Gemini呼び出し: model={} prompt={}chars image={}bytes(base64)",
            self.model,
            prompt.len(),
            image.data.len()
        );

        let response = self
            .client
            .post(endpoint_url(&self.model, &self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| KitScanError::ApiCall(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(KitScanError::ApiCall(format!("API error: {} {}", status, body.trim())));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| KitScanError::ApiParse(e.to_string()))?;

        let text = payload.into_text()?;
        debug!("Gemini応答: {}chars", text.len());
        Ok(text)
    }
}
