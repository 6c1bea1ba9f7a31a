//! 確認待ちの読み取り結果
//!
//! OCR結果は直接履歴に入らず、ここでレビュアーの確認を経てから
//! `ReconciliationStore::confirm_session` に渡される。

use crate::store::{Persistence, ReconciliationStore};
use crate::types::{RawScanItem, ScanResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingScan {
    pub image_ref: String,
    pub items: Vec<ScanResult>,
}

impl PendingScan {
    /// OCR結果から生成（ステータスは数量から導出）
    pub fn from_ocr(image_ref: impl Into<String>, raw_items: Vec<RawScanItem>) -> Self {
        Self {
            image_ref: image_ref.into(),
            items: raw_items.into_iter().map(ScanResult::from).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn set_quantity(&mut self, code: &str, quantity: u32) -> bool {
        self.apply(code, |item| item.set_quantity(quantity))
    }

    pub fn toggle_status(&mut self, code: &str) -> bool {
        self.apply(code, ScanResult::toggle_status)
    }

    /// インデックス指定版（コードが空や重複する行の編集用）
    pub fn set_quantity_at(&mut self, index: usize, quantity: u32) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.set_quantity(quantity);
                true
            }
            None => false,
        }
    }

    pub fn toggle_status_at(&mut self, index: usize) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.toggle_status();
                true
            }
            None => false,
        }
    }

    /// 履歴に確定する
    ///
    /// 明細が空の場合は何もせず `None` を返す。
    pub fn confirm<P: Persistence>(self, store: &mut ReconciliationStore<P>) -> Option<String> {
        if self.items.is_empty() {
            return None;
        }
        Some(store.confirm_session(&self.image_ref, self.items))
    }

    fn apply<F>(&mut self, code: &str, mut f: F) -> bool
    where
        F: FnMut(&mut ScanResult),
    {
        let mut touched = false;
        for item in self.items.iter_mut().filter(|i| i.code == code) {
            f(item);
            touched = true;
        }
        touched
    }
}
