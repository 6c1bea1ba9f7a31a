//! Gemini API連携（fetch）

use kit_scan_common::gemini::{
    endpoint_url, extract_base64_from_data_url, extract_mime_type_from_data_url, GeminiRequest,
    GeminiResponse,
};
use kit_scan_common::{parse_ocr_response, RawScanItem};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Gemini API呼び出し
async fn call_gemini_api(api_key: &str, request: &GeminiRequest) -> Result<String, JsValue> {
    let url = endpoint_url(DEFAULT_MODEL, api_key);
    let body = serde_json::to_string(request).map_err(js_err)?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(&body));

    let request = Request::new_with_str_and_init(&url, &opts)?;
    request.headers().set("Content-Type", "application/json")?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window is not available"))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
    let resp: Response = resp_value.dyn_into()?;

    if !resp.ok() {
        return Err(JsValue::from_str(&format!("API error: {}", resp.status())));
    }

    let json = JsFuture::from(resp.json()?).await?;
    let response: GeminiResponse = serde_wasm_bindgen::from_value(json)?;
    response.into_text().map_err(js_err)
}

/// 用紙画像（Data URL）から明細を読み取る
pub async fn analyze_form(
    api_key: &str,
    data_url: &str,
    prompt: &str,
) -> Result<Vec<RawScanItem>, JsValue> {
    let data = extract_base64_from_data_url(data_url)
        .ok_or_else(|| JsValue::from_str("Invalid data URL"))?;
    let mime_type = extract_mime_type_from_data_url(data_url);

    let request = GeminiRequest::with_image(prompt, mime_type, data);
    let text = call_gemini_api(api_key, &request).await?;

    tracing::debug!("Gemini応答: {}chars", text.len());
    parse_ocr_response(&text).map_err(js_err)
}
