//! 文件下载与外部链接

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// 把文本内容作为文件下载（CSV 导出）
pub fn download_text(file_name: &str, mime: &str, content: &str) -> Result<(), String> {
    save_blob(file_name, mime, content).map_err(|e| format!("{:?}", e))
}

fn save_blob(file_name: &str, mime: &str, content: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let parts = js_sys::Array::of1(&JsValue::from_str(content));
    let props = BlobPropertyBag::new();
    props.set_type(mime);
    let blob = Blob::new_with_str_sequence_and_options(&parts, &props)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    Url::revoke_object_url(&url)
}

/// 在新标签页打开链接（WhatsApp、网页邮箱）
pub fn open_url(url: &str) {
    let opened = web_sys::window()
        .and_then(|w| w.open_with_url_and_target(url, "_blank").ok())
        .flatten();
    if opened.is_none() {
        tracing::warn!(%url, "popup blocked or window unavailable");
    }
}

/// 在当前页触发协议链接（`tel:`、`mailto:`）
pub fn launch_url(url: &str) {
    if let Some(window) = web_sys::window()
        && let Err(err) = window.location().set_href(url)
    {
        tracing::warn!(%url, error = ?err, "failed to open link");
    }
}
