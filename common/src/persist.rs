//! 永続化フォーマット
//!
//! テンプレートとセッションは別々のJSON文書として保存する。
//! キー名はブラウザ版の localStorage と共通。

use crate::error::Result;
use crate::store::Persistence;
use crate::types::{ScanSession, Template};
use std::collections::HashMap;

/// テンプレート一覧の保存キー
pub const TEMPLATES_KEY: &str = "scanner_ns_templates";
/// セッション一覧の保存キー
pub const SESSIONS_KEY: &str = "scanner_ns_sessions";

pub fn encode_templates(templates: &[Template]) -> Result<String> {
    Ok(serde_json::to_string(templates)?)
}

pub fn decode_templates(json: &str) -> Result<Vec<Template>> {
    Ok(serde_json::from_str(json)?)
}

/// timestamp は RFC 3339 文字列としてエンコードされる
pub fn encode_sessions(sessions: &[ScanSession]) -> Result<String> {
    Ok(serde_json::to_string(sessions)?)
}

pub fn decode_sessions(json: &str) -> Result<Vec<ScanSession>> {
    Ok(serde_json::from_str(json)?)
}

/// メモリ上のキー・値ストア
///
/// テストやデモ用。値はエンコード済みJSONで保持する。
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 生の保存値を取得
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// 生の値を直接書き込む（破損データの再現用）
    pub fn set_raw(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

impl Persistence for MemoryStorage {
    fn load_templates(&self) -> Result<Option<Vec<Template>>> {
        self.raw(TEMPLATES_KEY).map(decode_templates).transpose()
    }

    fn save_templates(&mut self, templates: &[Template]) -> Result<()> {
        let json = encode_templates(templates)?;
        self.entries.insert(TEMPLATES_KEY.to_string(), json);
        Ok(())
    }

    fn load_sessions(&self) -> Result<Option<Vec<ScanSession>>> {
        self.raw(SESSIONS_KEY).map(decode_sessions).transpose()
    }

    fn save_sessions(&mut self, sessions: &[ScanSession]) -> Result<()> {
        let json = encode_sessions(sessions)?;
        self.entries.insert(SESSIONS_KEY.to_string(), json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScanResult;

    #[test]
    fn test_decode_sessions_parses_iso_timestamp() {
        let json = r#"[{
            "id": "s1",
            "timestamp": "2024-05-01T10:30:00.000Z",
            "imageUrl": "data:image/jpeg;base64,AAAA",
            "items": [{"code": "SUT-001", "name": "Fio", "quantity": 2, "status": "verified"}]
        }]"#;

        let sessions = decode_sessions(json).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].timestamp.to_rfc3339(), "2024-05-01T10:30:00+00:00");
        assert_eq!(sessions[0].items[0], ScanResult::new("SUT-001", "Fio", 2));
    }

    #[test]
    fn test_decode_corrupt_json_fails() {
        assert!(decode_templates("{not json").is_err());
        assert!(decode_sessions("[{\"id\": 1}]").is_err());
    }

    #[test]
    fn test_memory_storage_absent() {
        let storage = MemoryStorage::new();
        assert!(storage.load_templates().unwrap().is_none());
        assert!(storage.load_sessions().unwrap().is_none());
    }

    #[test]
    fn test_memory_storage_roundtrip_templates() {
        let mut storage = MemoryStorage::new();
        let templates = crate::registry::default_templates();
        storage.save_templates(&templates).unwrap();
        assert_eq!(storage.load_templates().unwrap(), Some(templates));
        assert!(storage.raw(TEMPLATES_KEY).unwrap().starts_with('['));
    }
}
