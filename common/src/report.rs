//! 集計レポート

use crate::session_log::consolidate;
use crate::types::{ConsolidatedEntry, ScanSession};
use serde::Serialize;

/// 集計結果とその母数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedReport {
    pub entries: Vec<ConsolidatedEntry>,
    /// 全集計行の数量合計
    pub total_items: u64,
    /// 集計対象のセッション数
    pub session_count: usize,
}

impl ConsolidatedReport {
    pub fn from_sessions(sessions: &[ScanSession]) -> Self {
        let entries = consolidate(sessions);
        let total_items = entries.iter().map(|e| e.quantity).sum();
        Self {
            entries,
            total_items,
            session_count: sessions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.session_count == 0
    }
}
