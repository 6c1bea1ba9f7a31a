//! localStorage への永続化
//!
//! キーはCLI版のファイル保存と同じJSON文書を保持する。

use kit_scan_common::persist::{
    decode_sessions, decode_templates, encode_sessions, encode_templates, SESSIONS_KEY,
    TEMPLATES_KEY,
};
use kit_scan_common::{Error, Persistence, Result, ScanSession, Template};
use wasm_bindgen::JsValue;

#[derive(Debug, Default)]
pub struct LocalStore;

fn storage_error(action: &str, key: &str, err: JsValue) -> Error {
    Error::Io(std::io::Error::other(format!(
        "localStorage {} failed ({}): {:?}",
        action, key, err
    )))
}

fn available<S>(
    lookup: std::result::Result<Option<S>, JsValue>,
    action: &str,
    key: &str,
) -> Result<S> {
    lookup
        .map_err(|e| storage_error(action, key, e))?
        .ok_or_else(|| storage_error(action, key, JsValue::from_str("localStorage is not available")))
}

impl LocalStore {
    /// localStorage を取得
    ///
    /// サンドボックス化されたiframeやサイトデータ無効時は例外ではなくエラーを返す。
    fn storage(action: &str, key: &str) -> Result<web_sys::Storage> {
        let window = web_sys::window()
            .ok_or_else(|| storage_error(action, key, JsValue::from_str("window is not available")))?;
        available(window.local_storage(), action, key)
    }

    fn read(key: &str) -> Result<Option<String>> {
        Self::storage("read", key)?
            .get_item(key)
            .map_err(|e| storage_error("read", key, e))
    }

    fn write(key: &str, value: &str) -> Result<()> {
        Self::storage("write", key)?
            .set_item(key, value)
            .map_err(|e| storage_error("write", key, e))
    }
}

impl Persistence for LocalStore {
    fn load_templates(&self) -> Result<Option<Vec<Template>>> {
        Self::read(TEMPLATES_KEY)?
            .map(|json| decode_templates(&json))
            .transpose()
    }

    fn save_templates(&mut self, templates: &[Template]) -> Result<()> {
        Self::write(TEMPLATES_KEY, &encode_templates(templates)?)
    }

    fn load_sessions(&self) -> Result<Option<Vec<ScanSession>>> {
        Self::read(SESSIONS_KEY)?
            .map(|json| decode_sessions(&json))
            .transpose()
    }

    fn save_sessions(&mut self, sessions: &[ScanSession]) -> Result<()> {
        Self::write(SESSIONS_KEY, &encode_sessions(sessions)?)
    }
}
