//! 読み取りセッション履歴と集計
//!
//! セッションは常に新しい順（timestamp降順）で保持する。

use crate::types::{new_id, ConsolidatedEntry, ScanResult, ScanSession};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// セッション履歴
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionLog {
    sessions: Vec<ScanSession>,
}

impl SessionLog {
    /// 保存済みセッションから生成（新しい順に並べ直す）
    pub fn from_sessions(mut sessions: Vec<ScanSession>) -> Self {
        sort_newest_first(&mut sessions);
        Self { sessions }
    }

    pub fn sessions(&self) -> &[ScanSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&ScanSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// 確認済み明細からセッションを追加
    pub fn confirm_session(&mut self, image_ref: &str, items: Vec<ScanResult>) -> String {
        self.confirm_session_at(image_ref, items, Utc::now())
    }

    /// 時刻指定版
    pub fn confirm_session_at(
        &mut self,
        image_ref: &str,
        items: Vec<ScanResult>,
        timestamp: DateTime<Utc>,
    ) -> String {
        let id = new_id();
        self.sessions.push(ScanSession {
            id: id.clone(),
            timestamp,
            image_url: image_ref.to_string(),
            items,
        });
        sort_newest_first(&mut self.sessions);
        id
    }

    pub fn delete_session(&mut self, id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        self.sessions.len() != before
    }

    /// 明細の数量を変更（コード一致の全明細が対象）
    pub fn update_session_item(&mut self, session_id: &str, code: &str, quantity: u32) -> bool {
        self.for_each_item(session_id, code, |item| item.set_quantity(quantity))
    }

    /// 明細の error フラグを切り替え（コード一致の全明細が対象）
    pub fn toggle_item_status(&mut self, session_id: &str, code: &str) -> bool {
        self.for_each_item(session_id, code, ScanResult::toggle_status)
    }

    fn for_each_item<F>(&mut self, session_id: &str, code: &str, mut apply: F) -> bool
    where
        F: FnMut(&mut ScanResult),
    {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) else {
            return false;
        };
        let mut touched = false;
        for item in session.items.iter_mut().filter(|i| i.code == code) {
            apply(item);
            touched = true;
        }
        touched
    }

    /// 全セッションの集計
    pub fn consolidate(&self) -> Vec<ConsolidatedEntry> {
        consolidate(&self.sessions)
    }
}

fn sort_newest_first(sessions: &mut [ScanSession]) {
    sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// 集計キー: コード、空ならば名称
fn consolidation_key(item: &ScanResult) -> &str {
    if item.code.is_empty() {
        &item.name
    } else {
        &item.code
    }
}

/// セッション群を資材コード単位で合算
///
/// - 最初に出現した明細の code/name/status を採用
/// - 出力はコードの昇順（同順位は出現順）
pub fn consolidate(sessions: &[ScanSession]) -> Vec<ConsolidatedEntry> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<ConsolidatedEntry> = Vec::new();

    for item in sessions.iter().flat_map(|s| s.items.iter()) {
        let key = consolidation_key(item);
        match index.get(key) {
            Some(&pos) => entries[pos].quantity += u64::from(item.quantity),
            None => {
                index.insert(key, entries.len());
                entries.push(ConsolidatedEntry {
                    code: item.code.clone(),
                    name: item.name.clone(),
                    quantity: u64::from(item.quantity),
                    status: item.status,
                });
            }
        }
    }

    entries.sort_by(|a, b| a.code.cmp(&b.code));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ItemStatus;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap()
    }

    fn item(code: &str, name: &str, quantity: u32) -> ScanResult {
        ScanResult::new(code, name, quantity)
    }

    #[test]
    fn test_confirm_sorts_newest_first() {
        let mut log = SessionLog::default();
        let old = log.confirm_session_at("a.jpg", vec![], at(0));
        let new = log.confirm_session_at("b.jpg", vec![], at(30));
        let mid = log.confirm_session_at("c.jpg", vec![], at(15));

        let ids: Vec<&str> = log.sessions().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![new.as_str(), mid.as_str(), old.as_str()]);
    }

    #[test]
    fn test_confirm_preserves_reviewed_status() {
        let mut log = SessionLog::default();
        let mut flagged = item("GZ-101", "Gaze", 4);
        flagged.toggle_status();
        let id = log.confirm_session("form.jpg", vec![flagged]);

        let session = log.find(&id).unwrap();
        assert_eq!(session.image_url, "form.jpg");
        assert_eq!(session.items[0].status, ItemStatus::Error);
    }

    #[test]
    fn test_from_sessions_resorts() {
        let mut log = SessionLog::default();
        log.confirm_session_at("a", vec![], at(1));
        log.confirm_session_at("b", vec![], at(2));
        let mut stored = log.sessions().to_vec();
        stored.reverse();

        let reloaded = SessionLog::from_sessions(stored);
        assert_eq!(reloaded, log);
    }

    #[test]
    fn test_delete_missing_session_is_noop() {
        let mut log = SessionLog::default();
        log.confirm_session_at("a.jpg", vec![item("A", "Alpha", 1)], at(0));
        let before = serde_json::to_string(log.sessions()).unwrap();

        assert!(!log.delete_session("does-not-exist"));
        let after = serde_json::to_string(log.sessions()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_delete_session() {
        let mut log = SessionLog::default();
        let id = log.confirm_session_at("a.jpg", vec![], at(0));
        assert!(log.delete_session(&id));
        assert!(log.is_empty());
    }

    #[test]
    fn test_update_session_item_clears_error() {
        let mut log = SessionLog::default();
        let id = log.confirm_session_at("a.jpg", vec![item("A", "Alpha", 2)], at(0));

        assert!(log.toggle_item_status(&id, "A"));
        assert_eq!(log.find(&id).unwrap().items[0].status, ItemStatus::Error);

        assert!(log.update_session_item(&id, "A", 5));
        let it = &log.find(&id).unwrap().items[0];
        assert_eq!(it.quantity, 5);
        assert_eq!(it.status, ItemStatus::Verified);
    }

    #[test]
    fn test_update_missing_targets_is_noop() {
        let mut log = SessionLog::default();
        let id = log.confirm_session_at("a.jpg", vec![item("A", "Alpha", 2)], at(0));
        let before = log.clone();

        assert!(!log.update_session_item("ghost", "A", 9));
        assert!(!log.update_session_item(&id, "ZZZ", 9));
        assert!(!log.toggle_item_status(&id, "ZZZ"));
        assert_eq!(log, before);
    }

    #[test]
    fn test_consolidate_sums_by_code_regardless_of_order() {
        let mut first = SessionLog::default();
        first.confirm_session_at("s1", vec![item("A", "Alpha", 2)], at(0));
        first.confirm_session_at("s2", vec![item("A", "Alpha", 3)], at(1));

        let mut second = SessionLog::default();
        second.confirm_session_at("s2", vec![item("A", "Alpha", 3)], at(0));
        second.confirm_session_at("s1", vec![item("A", "Alpha", 2)], at(1));

        for log in [first, second] {
            let report = log.consolidate();
            assert_eq!(report.len(), 1);
            assert_eq!(report[0].code, "A");
            assert_eq!(report[0].quantity, 5);
        }
    }

    #[test]
    fn test_consolidate_falls_back_to_name() {
        let mut log = SessionLog::default();
        log.confirm_session_at(
            "s1",
            vec![item("", "Dreno", 1), item("", "Dreno", 2), item("", "Cateter", 4)],
            at(0),
        );

        let report = log.consolidate();
        assert_eq!(report.len(), 2);
        let dreno = report.iter().find(|e| e.name == "Dreno").unwrap();
        assert_eq!(dreno.quantity, 3);
        let cateter = report.iter().find(|e| e.name == "Cateter").unwrap();
        assert_eq!(cateter.quantity, 4);
    }

    #[test]
    fn test_consolidate_first_seen_wins() {
        let mut log = SessionLog::default();
        let mut flagged = item("A", "Alpha (novo)", 1);
        flagged.toggle_status();
        log.confirm_session_at("old", vec![item("A", "Alpha", 2)], at(0));
        log.confirm_session_at("new", vec![flagged], at(5));

        // 新しい順に走査するため、新しいセッションの名称とステータスが残る
        let report = log.consolidate();
        assert_eq!(report[0].name, "Alpha (novo)");
        assert_eq!(report[0].status, ItemStatus::Error);
        assert_eq!(report[0].quantity, 3);
    }

    #[test]
    fn test_consolidate_empty() {
        assert!(SessionLog::default().consolidate().is_empty());
    }

    #[test]
    fn test_end_to_end_consolidation() {
        let mut log = SessionLog::default();
        log.confirm_session_at("form1.jpg", vec![item("SUT-001", "Fio", 2)], at(0));

        let report = log.consolidate();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].code, "SUT-001");
        assert_eq!(report[0].name, "Fio");
        assert_eq!(report[0].quantity, 2);

        log.confirm_session_at(
            "form2.jpg",
            vec![item("SUT-001", "Fio", 1), item("GZ-101", "Gaze", 4)],
            at(10),
        );

        let report = log.consolidate();
        let rows: Vec<(&str, u64)> = report.iter().map(|e| (e.code.as_str(), e.quantity)).collect();
        assert_eq!(rows, vec![("GZ-101", 4), ("SUT-001", 3)]);
    }
}
