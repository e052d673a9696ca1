//! 生成画像のダウンロード（アンカークリック）

use unredo_common::{DataUrl, DownloadRequest};
use wasm_bindgen::JsCast;
use web_sys::HtmlAnchorElement;

/// 保存ファイル名: unredo_<job>_<時刻ms>.<拡張子>
pub fn download_file_name(request: &DownloadRequest, timestamp_ms: u64) -> String {
    let extension = DataUrl::parse(request.image_url.as_str())
        .map(|data| data.extension())
        .unwrap_or("png");
    format!("unredo_{}_{}.{}", request.job, timestamp_ms, extension)
}

pub fn trigger_download(request: &DownloadRequest) -> Result<(), String> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| "document がありません".to_string())?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(|e| format!("{:?}", e))?
        .dyn_into()
        .map_err(|_| "アンカー要素を作成できません".to_string())?;

    anchor.set_href(&request.image_url);
    anchor.set_download(&download_file_name(request, js_sys::Date::now() as u64));
    anchor.click();
    Ok(())
}
