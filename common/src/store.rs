//! 照合ストア
//!
//! テンプレート台帳とセッション履歴を所有し、すべての変更をここに集約する。
//! 変更があった場合はその都度永続化する（書き込みスルー）。
//! 永続化の失敗はログに残して無視する。

use crate::backup::Backup;
use crate::error::Result;
use crate::registry::TemplateRegistry;
use crate::report::ConsolidatedReport;
use crate::session_log::SessionLog;
use crate::types::{ConsolidatedEntry, MaterialItem, ScanResult, ScanSession, Template};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// 永続化の接続先
///
/// `Ok(None)` は保存データなしを表す。
pub trait Persistence {
    fn load_templates(&self) -> Result<Option<Vec<Template>>>;
    fn save_templates(&mut self, templates: &[Template]) -> Result<()>;
    fn load_sessions(&self) -> Result<Option<Vec<ScanSession>>>;
    fn save_sessions(&mut self, sessions: &[ScanSession]) -> Result<()>;
}

/// 照合ストア本体
#[derive(Debug)]
pub struct ReconciliationStore<P: Persistence> {
    registry: TemplateRegistry,
    log: SessionLog,
    persistence: P,
}

impl<P: Persistence> ReconciliationStore<P> {
    /// 保存データを読み込んで開く
    ///
    /// 読み込みに失敗した場合や空の場合はデフォルトにフォールバックする。
    pub fn open(persistence: P) -> Self {
        let templates = match persistence.load_templates() {
            Ok(Some(t)) => t,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("テンプレートの読み込みに失敗、デフォルトを使用: {}", e);
                Vec::new()
            }
        };
        let sessions = match persistence.load_sessions() {
            Ok(Some(s)) => s,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("セッションの読み込みに失敗、空の履歴を使用: {}", e);
                Vec::new()
            }
        };

        Self {
            registry: TemplateRegistry::from_templates(templates),
            log: SessionLog::from_sessions(sessions),
            persistence,
        }
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn into_persistence(self) -> P {
        self.persistence
    }

    // ---- 読み取り ----

    pub fn templates(&self) -> &[Template] {
        self.registry.templates()
    }

    pub fn current_template_id(&self) -> &str {
        self.registry.current_template_id()
    }

    pub fn current_template(&self) -> &Template {
        self.registry.current_template()
    }

    pub fn materials(&self) -> &[MaterialItem] {
        self.registry.materials()
    }

    pub fn find_template(&self, id: &str) -> Option<&Template> {
        self.registry.find(id)
    }

    pub fn sessions(&self) -> &[ScanSession] {
        self.log.sessions()
    }

    pub fn find_session(&self, id: &str) -> Option<&ScanSession> {
        self.log.find(id)
    }

    pub fn consolidate(&self) -> Vec<ConsolidatedEntry> {
        self.log.consolidate()
    }

    pub fn report(&self) -> ConsolidatedReport {
        ConsolidatedReport::from_sessions(self.log.sessions())
    }

    // ---- テンプレート ----

    pub fn add_template(&mut self, name: &str) -> String {
        let id = self.registry.add_template(name);
        self.persist_templates();
        id
    }

    pub fn rename_template(&mut self, id: &str, new_name: &str) -> bool {
        self.templates_changed(|r| r.rename_template(id, new_name))
    }

    pub fn remove_template(&mut self, id: &str) -> bool {
        self.templates_changed(|r| r.remove_template(id))
    }

    /// 選択状態は保存しない
    pub fn select_template(&mut self, id: &str) {
        self.registry.select_template(id);
    }

    pub fn add_material(&mut self, code: &str, name: &str) -> Option<String> {
        let id = self.registry.add_material(code, name)?;
        self.persist_templates();
        Some(id)
    }

    pub fn update_material(&mut self, material_id: &str, code: &str, name: &str) -> bool {
        self.templates_changed(|r| r.update_material(material_id, code, name))
    }

    pub fn remove_material(&mut self, material_id: &str) -> bool {
        self.templates_changed(|r| r.remove_material(material_id))
    }

    // ---- セッション ----

    /// 確認済み明細をセッションとして記録
    pub fn confirm_session(&mut self, image_ref: &str, items: Vec<ScanResult>) -> String {
        self.confirm_session_at(image_ref, items, Utc::now())
    }

    pub fn confirm_session_at(
        &mut self,
        image_ref: &str,
        items: Vec<ScanResult>,
        timestamp: DateTime<Utc>,
    ) -> String {
        let count = items.len();
        let id = self.log.confirm_session_at(image_ref, items, timestamp);
        info!("セッション確定: {} ({}件)", id, count);
        self.persist_sessions();
        id
    }

    pub fn delete_session(&mut self, id: &str) -> bool {
        self.sessions_changed(|log| log.delete_session(id))
    }

    pub fn update_session_item(&mut self, session_id: &str, code: &str, quantity: u32) -> bool {
        self.sessions_changed(|log| log.update_session_item(session_id, code, quantity))
    }

    pub fn toggle_item_status(&mut self, session_id: &str, code: &str) -> bool {
        self.sessions_changed(|log| log.toggle_item_status(session_id, code))
    }

    // ---- バックアップ ----

    pub fn backup(&self) -> Backup {
        Backup::new(self.templates().to_vec(), self.sessions().to_vec())
    }

    /// バックアップで両コレクションを置き換える
    pub fn restore(&mut self, backup: Backup) {
        self.registry = TemplateRegistry::from_templates(backup.templates);
        self.log = SessionLog::from_sessions(backup.sessions);
        self.persist_templates();
        self.persist_sessions();
    }

    // ---- 内部 ----

    fn templates_changed<F>(&mut self, mutate: F) -> bool
    where
        F: FnOnce(&mut TemplateRegistry) -> bool,
    {
        let changed = mutate(&mut self.registry);
        if changed {
            self.persist_templates();
        }
        changed
    }

    fn sessions_changed<F>(&mut self, mutate: F) -> bool
    where
        F: FnOnce(&mut SessionLog) -> bool,
    {
        let changed = mutate(&mut self.log);
        if changed {
            self.persist_sessions();
        }
        changed
    }

    fn persist_templates(&mut self) {
        if let Err(e) = self.persistence.save_templates(self.registry.templates()) {
            warn!("テンプレートの保存に失敗: {}", e);
        }
    }

    fn persist_sessions(&mut self) {
        if let Err(e) = self.persistence.save_sessions(self.log.sessions()) {
            warn!("セッションの保存に失敗: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::persist::{MemoryStorage, SESSIONS_KEY, TEMPLATES_KEY};
    use crate::registry::default_templates;
    use crate::status::ItemStatus;

    /// 書き込みが常に失敗するストレージ
    #[derive(Default)]
    struct BrokenStorage;

    impl Persistence for BrokenStorage {
        fn load_templates(&self) -> Result<Option<Vec<Template>>> {
            Err(Error::Parse("quota".into()))
        }
        fn save_templates(&mut self, _: &[Template]) -> Result<()> {
            Err(Error::Parse("quota".into()))
        }
        fn load_sessions(&self) -> Result<Option<Vec<ScanSession>>> {
            Err(Error::Parse("quota".into()))
        }
        fn save_sessions(&mut self, _: &[ScanSession]) -> Result<()> {
            Err(Error::Parse("quota".into()))
        }
    }

    #[test]
    fn test_open_without_data_uses_defaults() {
        let store = ReconciliationStore::open(MemoryStorage::new());
        assert_eq!(store.templates(), default_templates().as_slice());
        assert_eq!(store.current_template_id(), "1");
        assert!(store.sessions().is_empty());
    }

    #[test]
    fn test_open_with_corrupt_data_uses_defaults() {
        let mut storage = MemoryStorage::new();
        storage.set_raw(TEMPLATES_KEY, "{broken");
        storage.set_raw(SESSIONS_KEY, "[1,2,3]");

        let store = ReconciliationStore::open(storage);
        assert_eq!(store.templates().len(), 2);
        assert!(store.sessions().is_empty());
    }

    #[test]
    fn test_mutations_write_through() {
        let mut store = ReconciliationStore::open(MemoryStorage::new());
        let id = store.add_template("Cardiologia");
        store.add_material("CAT-01", "Cateter");
        store.confirm_session("form.jpg", vec![ScanResult::new("CAT-01", "Cateter", 1)]);

        let reopened = ReconciliationStore::open(store.into_persistence());
        assert_eq!(reopened.templates().len(), 3);
        let cardio = reopened.find_template(&id).unwrap();
        assert_eq!(cardio.materials[0].code, "CAT-01");
        assert_eq!(reopened.sessions().len(), 1);
        assert_eq!(reopened.sessions()[0].items[0].quantity, 1);
    }

    #[test]
    fn test_every_edit_survives_reopen() {
        let mut store = ReconciliationStore::open(MemoryStorage::new());

        // テンプレート
        assert!(store.rename_template("2", "Ortopedia"));
        let cardio = store.add_template("Cardiologia");
        assert!(store.remove_template(&cardio));

        // 資材（選択中の "1" が対象）
        store.select_template("1");
        assert!(store.update_material("1", "SUT-001X", "Fio Nylon 3-0 (novo)"));
        assert!(store.remove_material("6"));

        // セッション
        let keep = store.confirm_session(
            "a.jpg",
            vec![ScanResult::new("GZ-101", "Gaze", 2), ScanResult::new("LUV-75", "Luva", 1)],
        );
        let gone = store.confirm_session("b.jpg", vec![ScanResult::new("GZ-101", "Gaze", 9)]);
        assert!(store.update_session_item(&keep, "GZ-101", 5));
        assert!(store.toggle_item_status(&keep, "LUV-75"));
        assert!(store.delete_session(&gone));

        let reopened = ReconciliationStore::open(store.into_persistence());

        let ids: Vec<&str> = reopened.templates().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(reopened.find_template("2").unwrap().name, "Ortopedia");

        let materials = &reopened.find_template("1").unwrap().materials;
        assert_eq!(materials.len(), 5);
        assert_eq!(materials[0].code, "SUT-001X");
        assert_eq!(materials[0].name, "Fio Nylon 3-0 (novo)");
        assert!(materials.iter().all(|m| m.id != "6"));

        assert_eq!(reopened.sessions().len(), 1);
        assert!(reopened.find_session(&gone).is_none());
        let session = reopened.find_session(&keep).unwrap();
        assert_eq!(session.items[0].quantity, 5);
        assert_eq!(session.items[0].status, ItemStatus::Verified);
        assert_eq!(session.items[1].status, ItemStatus::Error);
    }

    #[test]
    fn test_noop_does_not_write() {
        let mut store = ReconciliationStore::open(MemoryStorage::new());
        assert!(!store.rename_template("ghost", "X"));
        assert!(!store.delete_session("ghost"));
        assert!(store.persistence().raw(TEMPLATES_KEY).is_none());
        assert!(store.persistence().raw(SESSIONS_KEY).is_none());
    }

    #[test]
    fn test_persistence_failure_is_ignored() {
        let mut store = ReconciliationStore::open(BrokenStorage);
        assert_eq!(store.templates().len(), 2);

        let id = store.confirm_session("x.jpg", vec![ScanResult::new("A", "a", 2)]);
        assert!(store.toggle_item_status(&id, "A"));
        assert_eq!(store.find_session(&id).unwrap().items[0].status, ItemStatus::Error);
        assert!(store.remove_template("2"));
        assert_eq!(store.templates().len(), 1);
    }

    #[test]
    fn test_remove_last_template_keeps_store() {
        let mut store = ReconciliationStore::open(MemoryStorage::new());
        assert!(store.remove_template("2"));
        assert!(!store.remove_template("1"));
        assert_eq!(store.templates().len(), 1);
        assert_eq!(store.current_template().id, "1");
    }

    #[test]
    fn test_restore_replaces_collections() {
        let mut source = ReconciliationStore::open(MemoryStorage::new());
        source.add_template("Cardiologia");
        source.confirm_session("a.jpg", vec![ScanResult::new("A", "Alpha", 2)]);
        let backup = source.backup();

        let mut target = ReconciliationStore::open(MemoryStorage::new());
        target.restore(backup);
        assert_eq!(target.templates(), source.templates());
        assert_eq!(target.sessions(), source.sessions());
        assert!(target.persistence().raw(SESSIONS_KEY).is_some());
    }

    #[test]
    fn test_timestamps_survive_reopen() {
        let mut store = ReconciliationStore::open(MemoryStorage::new());
        let ts: DateTime<Utc> = "2024-05-01T10:30:00Z".parse().unwrap();
        let id = store.confirm_session_at("a.jpg", vec![], ts);

        let reopened = ReconciliationStore::open(store.into_persistence());
        assert_eq!(reopened.find_session(&id).unwrap().timestamp, ts);
    }
}
