//! Kit Scan Web bindings (WASM)
//!
//! JS側のUIから使う照合ストアのファサード。
//! データは localStorage に保存される。

mod api;
mod storage;

use kit_scan_common::export::{to_csv, to_tsv};
use kit_scan_common::{
    build_ocr_prompt, build_ocr_prompt_for, Backup, PendingScan, RawScanItem,
    ReconciliationStore, ScanResult,
};
use serde::Serialize;
use storage::LocalStore;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// 用紙画像（Data URL）をGeminiで読み取り、`{code, name, quantity}` の配列を返す
///
/// `prompt` 省略時は汎用の読み取りプロンプトを使う。
#[wasm_bindgen(js_name = analyzeForm)]
pub async fn analyze_form(
    api_key: String,
    data_url: String,
    prompt: Option<String>,
) -> Result<JsValue, JsValue> {
    let prompt = prompt.unwrap_or_else(build_ocr_prompt);
    let items = api::gemini::analyze_form(&api_key, &data_url, &prompt).await?;
    to_js(&items)
}

#[wasm_bindgen]
pub struct KitScanApp {
    store: ReconciliationStore<LocalStore>,
    pending: Option<PendingScan>,
}

#[wasm_bindgen]
impl KitScanApp {
    #[wasm_bindgen(constructor)]
    pub fn new() -> KitScanApp {
        KitScanApp {
            store: ReconciliationStore::open(LocalStore),
            pending: None,
        }
    }

    // ---- テンプレート ----

    pub fn templates(&self) -> Result<JsValue, JsValue> {
        to_js(self.store.templates())
    }

    #[wasm_bindgen(js_name = currentTemplateId)]
    pub fn current_template_id(&self) -> String {
        self.store.current_template_id().to_string()
    }

    #[wasm_bindgen(js_name = currentTemplate)]
    pub fn current_template(&self) -> Result<JsValue, JsValue> {
        to_js(self.store.current_template())
    }

    pub fn materials(&self) -> Result<JsValue, JsValue> {
        to_js(self.store.materials())
    }

    #[wasm_bindgen(js_name = addTemplate)]
    pub fn add_template(&mut self, name: &str) -> String {
        self.store.add_template(name)
    }

    #[wasm_bindgen(js_name = renameTemplate)]
    pub fn rename_template(&mut self, id: &str, new_name: &str) -> bool {
        self.store.rename_template(id, new_name)
    }

    #[wasm_bindgen(js_name = removeTemplate)]
    pub fn remove_template(&mut self, id: &str) -> bool {
        self.store.remove_template(id)
    }

    #[wasm_bindgen(js_name = selectTemplate)]
    pub fn select_template(&mut self, id: &str) {
        self.store.select_template(id);
    }

    #[wasm_bindgen(js_name = addMaterial)]
    pub fn add_material(&mut self, code: &str, name: &str) -> Option<String> {
        self.store.add_material(code, name)
    }

    #[wasm_bindgen(js_name = updateMaterial)]
    pub fn update_material(&mut self, material_id: &str, code: &str, name: &str) -> bool {
        self.store.update_material(material_id, code, name)
    }

    #[wasm_bindgen(js_name = removeMaterial)]
    pub fn remove_material(&mut self, material_id: &str) -> bool {
        self.store.remove_material(material_id)
    }

    /// 印刷用QRコードのペイロード
    #[wasm_bindgen(js_name = qrPayload)]
    pub fn qr_payload(&self, template_id: &str) -> Option<String> {
        self.store.find_template(template_id).map(|t| t.qr_payload())
    }

    /// 選択中テンプレート向けの読み取りプロンプト
    #[wasm_bindgen(js_name = ocrPrompt)]
    pub fn ocr_prompt(&self) -> String {
        build_ocr_prompt_for(self.store.current_template())
    }

    // ---- 確認待ち ----

    /// OCR結果を確認待ちとして保持（前の確認待ちは破棄）
    #[wasm_bindgen(js_name = beginPending)]
    pub fn begin_pending(&mut self, image_ref: &str, raw_items: JsValue) -> Result<JsValue, JsValue> {
        let items: Vec<RawScanItem> = serde_wasm_bindgen::from_value(raw_items)?;
        let pending = PendingScan::from_ocr(image_ref, items);
        let js = to_js(&pending.items)?;
        self.pending = Some(pending);
        Ok(js)
    }

    #[wasm_bindgen(js_name = pendingItems)]
    pub fn pending_items(&self) -> Result<JsValue, JsValue> {
        match &self.pending {
            Some(p) => to_js(&p.items),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = pendingSetQuantity)]
    pub fn pending_set_quantity(&mut self, index: usize, quantity: u32) -> bool {
        self.pending
            .as_mut()
            .map(|p| p.set_quantity_at(index, quantity))
            .unwrap_or(false)
    }

    #[wasm_bindgen(js_name = pendingToggleStatus)]
    pub fn pending_toggle_status(&mut self, index: usize) -> bool {
        self.pending
            .as_mut()
            .map(|p| p.toggle_status_at(index))
            .unwrap_or(false)
    }

    /// 確認待ちを履歴に確定。明細が空なら何もしない
    #[wasm_bindgen(js_name = confirmPending)]
    pub fn confirm_pending(&mut self) -> Option<String> {
        let pending = self.pending.take()?;
        pending.confirm(&mut self.store)
    }

    #[wasm_bindgen(js_name = discardPending)]
    pub fn discard_pending(&mut self) {
        self.pending = None;
    }

    // ---- セッション ----

    pub fn sessions(&self) -> Result<JsValue, JsValue> {
        to_js(self.store.sessions())
    }

    /// 明細を直接セッションとして記録
    #[wasm_bindgen(js_name = confirmSession)]
    pub fn confirm_session(&mut self, image_ref: &str, items: JsValue) -> Result<String, JsValue> {
        let items: Vec<ScanResult> = serde_wasm_bindgen::from_value(items)?;
        Ok(self.store.confirm_session(image_ref, items))
    }

    #[wasm_bindgen(js_name = deleteSession)]
    pub fn delete_session(&mut self, id: &str) -> bool {
        self.store.delete_session(id)
    }

    #[wasm_bindgen(js_name = updateSessionItem)]
    pub fn update_session_item(&mut self, session_id: &str, code: &str, quantity: u32) -> bool {
        self.store.update_session_item(session_id, code, quantity)
    }

    #[wasm_bindgen(js_name = toggleItemStatus)]
    pub fn toggle_item_status(&mut self, session_id: &str, code: &str) -> bool {
        self.store.toggle_item_status(session_id, code)
    }

    // ---- 集計・出力 ----

    pub fn consolidate(&self) -> Result<JsValue, JsValue> {
        to_js(&self.store.consolidate())
    }

    pub fn report(&self) -> Result<JsValue, JsValue> {
        to_js(&self.store.report())
    }

    #[wasm_bindgen(js_name = exportCsv)]
    pub fn export_csv(&self) -> String {
        to_csv(&self.store.consolidate())
    }

    #[wasm_bindgen(js_name = exportTsv)]
    pub fn export_tsv(&self) -> String {
        to_tsv(&self.store.consolidate())
    }

    // ---- バックアップ ----

    /// `[ファイル名, JSON]` を返す
    #[wasm_bindgen(js_name = backupJson)]
    pub fn backup_json(&self) -> Result<js_sys::Array, JsValue> {
        let backup = self.store.backup();
        let json = backup.to_json_pretty().map_err(js_err)?;
        let out = js_sys::Array::new();
        out.push(&JsValue::from_str(&backup.file_name()));
        out.push(&JsValue::from_str(&json));
        Ok(out)
    }

    /// バックアップJSONで現在のデータを置き換える
    #[wasm_bindgen(js_name = restoreJson)]
    pub fn restore_json(&mut self, json: &str) -> Result<(), JsValue> {
        let backup = Backup::from_json(json).map_err(js_err)?;
        self.store.restore(backup);
        self.pending = None;
        Ok(())
    }
}

impl Default for KitScanApp {
    fn default() -> Self {
        Self::new()
    }
}
