//! Gemini API 呼び出し（ブラウザ fetch）
//!
//! リクエスト本文と応答の解釈は unredo_common::gemini を使う

use unredo_common::gemini::{api_error_message, build_request, endpoint, GEMINI_API_BASE};
use unredo_common::{gemini::parse_image_response, DataUrl, GenerationSettings};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

/// 1枚生成して Data URI を返す
pub async fn generate_image(api_key: &str, settings: &GenerationSettings) -> Result<DataUrl, String> {
    let url = endpoint(GEMINI_API_BASE, &settings.model_id);
    let body = serde_json::to_string(&build_request(settings)).map_err(|e| e.to_string())?;

    let (status, text) = post_json(&url, api_key, &body)
        .await
        .map_err(|e| format!("通信エラー: {}", js_error_message(&e)))?;

    if !(200..300).contains(&status) {
        return Err(api_error_message(status, &text));
    }

    parse_image_response(&text).map_err(|e| e.to_string())
}

async fn post_json(url: &str, api_key: &str, body: &str) -> Result<(u16, String), JsValue> {
    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(body));

    let request = Request::new_with_str_and_init(url, &opts)?;
    request.headers().set("Content-Type", "application/json")?;
    request.headers().set("x-goog-api-key", api_key)?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window がありません"))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
    let resp: Response = resp_value.dyn_into()?;

    let text = JsFuture::from(resp.text()?).await?;
    Ok((resp.status(), text.as_string().unwrap_or_default()))
}

pub(crate) fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", value))
}
