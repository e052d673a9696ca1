//! 添付ファイルの読み込み（FileReader）

use crate::api::gemini::js_error_message;
use std::rc::Rc;
use unredo_common::DataUrl;
use wasm_bindgen::prelude::*;
use web_sys::{File, FileReader, ProgressEvent};

/// ファイルを Data URI として読み込み、完了時に1回だけコールバックする
pub fn read_file<F>(file: File, on_loaded: F)
where
    F: Fn(Result<DataUrl, String>) + 'static,
{
    let file_name = file.name();
    let reader = match FileReader::new() {
        Ok(reader) => reader,
        Err(e) => {
            on_loaded(Err(js_error_message(&e)));
            return;
        }
    };
    let on_loaded = Rc::new(on_loaded);

    let onload = {
        let reader = reader.clone();
        let on_loaded = Rc::clone(&on_loaded);
        let file_name = file_name.clone();
        Closure::wrap(Box::new(move |_: ProgressEvent| {
            let result = reader
                .result()
                .ok()
                .and_then(|value| value.as_string())
                .ok_or_else(|| format!("{}: 読み込み結果を取得できません", file_name))
                .and_then(|value| validate_image(&file_name, value));
            on_loaded(result);
        }) as Box<dyn FnMut(_)>)
    };

    let onerror = {
        let on_loaded = Rc::clone(&on_loaded);
        let file_name = file_name.clone();
        Closure::wrap(Box::new(move |_: ProgressEvent| {
            on_loaded(Err(format!("{}: 読み込みに失敗しました", file_name)));
        }) as Box<dyn FnMut(_)>)
    };

    reader.set_onload(Some(onload.as_ref().unchecked_ref()));
    reader.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onload.forget();
    onerror.forget();

    if let Err(e) = reader.read_as_data_url(&file) {
        on_loaded(Err(js_error_message(&e)));
    }
}

/// 画像の Data URI か確認
fn validate_image(file_name: &str, value: String) -> Result<DataUrl, String> {
    let data = DataUrl::parse(value).map_err(|e| format!("{}: {}", file_name, e))?;
    if !data.mime_type().starts_with("image/") {
        return Err(format!("{}: 画像ファイルではありません ({})", file_name, data.mime_type()));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_image() {
        assert!(validate_image("a.png", "data:image/png;base64,iVBORw0KGgo=".into()).is_ok());

        let err = validate_image("a.txt", "data:text/plain;base64,aGVsbG8=".into()).unwrap_err();
        assert!(err.contains("a.txt"));

        assert!(validate_image("empty.png", "data:".into()).is_err());
    }
}
