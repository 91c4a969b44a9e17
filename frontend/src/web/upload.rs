//! 本地文件读取（头像上传）
//!
//! 使用 `FileReader` 把文件读成 data URL，回调风格与 `timer::Timeout` 一致。

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{File, FileReader, HtmlInputElement};

/// 取出 `<input type="file">` 选中的第一个文件
pub fn selected_file(input: &HtmlInputElement) -> Option<File> {
    input.files().and_then(|files| files.get(0))
}

/// 异步读取文件为 data URL，读取结束后调用一次 `on_done`
///
/// 读取无法开始时返回错误且不会调用回调。
pub fn read_data_url<F>(file: &File, on_done: F) -> Result<(), String>
where
    F: FnOnce(Option<String>) + 'static,
{
    let reader = FileReader::new().map_err(|e| format!("{:?}", e))?;

    let target = reader.clone();
    let callback = Closure::once_into_js(move || {
        on_done(target.result().ok().and_then(|v| v.as_string()));
    });
    reader.set_onloadend(Some(callback.unchecked_ref()));

    reader.read_as_data_url(file).map_err(|e| format!("{:?}", e))
}
