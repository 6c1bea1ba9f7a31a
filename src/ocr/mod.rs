//! OCR呼び出し
//!
//! 画像1枚をAIに送り、`{code, name, quantity}` の明細リストを得る。
//! 失敗時はエラーを返すだけで、ストアには触れない。

mod claude_cli;
mod gemini;

pub use claude_cli::build_cli_prompt;
pub use gemini::GeminiClient;

use crate::ai_provider::AiProvider;
use crate::config::Config;
use crate::error::{KitScanError, Result};
use crate::scanner::{load_image_payload, ImageInfo};
use kit_scan_common::{parse_ocr_response, RawScanItem};

/// OCRレスポンスをパース（共通パーサーをラップ）
pub fn parse_response(response: &str) -> Result<Vec<RawScanItem>> {
    parse_ocr_response(response)
        .map_err(|e| KitScanError::ApiParse(format!("OCR結果の読み取りに失敗: {}", e)))
}

/// 用紙画像から明細を抽出
pub async fn extract_items(
    provider: AiProvider,
    image: &ImageInfo,
    prompt: &str,
    config: &Config,
) -> Result<Vec<RawScanItem>> {
    let response = match provider {
        AiProvider::Gemini => {
            let client = GeminiClient::new(
                config.get_api_key()?,
                config.model.clone(),
                config.timeout_seconds,
            )?;
            let payload = load_image_payload(&image.path, config.max_image_size)?;
            client.generate(prompt, &payload).await?
        }
        AiProvider::Claude => {
            let abs_path = std::fs::canonicalize(&image.path)?;
            let cli_prompt = build_cli_prompt(&abs_path, prompt);
            claude_cli::run_claude_cli(&cli_prompt).await?
        }
    };

    parse_response(&response)
}
