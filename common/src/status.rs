//! 明細ステータスの状態遷移
//!
//! - empty: 数量0（未記入）
//! - verified: 数量 > 0 で確認済み
//! - error: レビュアーが要確認としてマークした行
//!
//! error 以外の状態は常に数量から導出される。

use crate::types::ScanResult;
use serde::{Deserialize, Serialize};

/// 明細ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Verified,
    Error,
    #[default]
    Empty,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Verified => "verified",
            ItemStatus::Error => "error",
            ItemStatus::Empty => "empty",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// 数量からステータスを導出
pub fn derive_status(quantity: u32) -> ItemStatus {
    if quantity > 0 {
        ItemStatus::Verified
    } else {
        ItemStatus::Empty
    }
}

impl ScanResult {
    /// 数量を変更する
    ///
    /// ステータスは必ず数量から再計算される。error フラグも消える。
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.status = derive_status(quantity);
    }

    /// error ⇄ 通常状態 を切り替える
    pub fn toggle_status(&mut self) {
        self.status = match self.status {
            ItemStatus::Error => derive_status(self.quantity),
            ItemStatus::Verified | ItemStatus::Empty => ItemStatus::Error,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: u32) -> ScanResult {
        ScanResult::new("SUT-001", "Fio", quantity)
    }

    #[test]
    fn test_derive_status() {
        assert_eq!(derive_status(0), ItemStatus::Empty);
        for q in [1, 2, 10, u32::MAX] {
            assert_eq!(derive_status(q), ItemStatus::Verified);
        }
    }

    #[test]
    fn test_new_item_status_derived() {
        assert_eq!(item(3).status, ItemStatus::Verified);
        assert_eq!(item(0).status, ItemStatus::Empty);
    }

    /// error 中に数量を編集すると error が消える（既存挙動を維持）
    #[test]
    fn test_set_quantity_clears_error() {
        let mut it = item(2);
        it.toggle_status();
        assert_eq!(it.status, ItemStatus::Error);

        it.set_quantity(5);
        assert_eq!(it.quantity, 5);
        assert_eq!(it.status, ItemStatus::Verified);
    }

    #[test]
    fn test_set_quantity_to_zero() {
        let mut it = item(4);
        it.set_quantity(0);
        assert_eq!(it.status, ItemStatus::Empty);
    }

    #[test]
    fn test_toggle_twice_returns_to_verified() {
        let mut it = item(3);
        it.toggle_status();
        assert_eq!(it.status, ItemStatus::Error);
        it.toggle_status();
        assert_eq!(it.status, ItemStatus::Verified);
    }

    #[test]
    fn test_toggle_empty_goes_to_error_and_back() {
        let mut it = item(0);
        it.toggle_status();
        assert_eq!(it.status, ItemStatus::Error);
        it.toggle_status();
        assert_eq!(it.status, ItemStatus::Empty);
    }

    #[test]
    fn test_status_serialize_lowercase() {
        let json = serde_json::to_string(&ItemStatus::Verified).unwrap();
        assert_eq!(json, "\"verified\"");
        let status: ItemStatus = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(status, ItemStatus::Error);
    }
}
