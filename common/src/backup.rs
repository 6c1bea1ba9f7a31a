//! バックアップ文書
//!
//! テンプレートとセッションを1つのJSON文書にまとめる。

use crate::error::Result;
use crate::types::{ScanSession, Template};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    #[serde(default)]
    pub templates: Vec<Template>,
    #[serde(default)]
    pub sessions: Vec<ScanSession>,
    pub backup_date: DateTime<Utc>,
}

impl Backup {
    pub fn new(templates: Vec<Template>, sessions: Vec<ScanSession>) -> Self {
        Self {
            templates,
            sessions,
            backup_date: Utc::now(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// ダウンロード用のファイル名
    pub fn file_name(&self) -> String {
        format!("kit-scan-backup-{}.json", self.backup_date.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::default_templates;
    use crate::types::ScanResult;

    #[test]
    fn test_backup_json_shape() {
        let mut backup = Backup::new(default_templates(), vec![]);
        backup.backup_date = "2024-06-30T08:00:00Z".parse().unwrap();

        let json = backup.to_json_pretty().unwrap();
        assert!(json.contains("\"templates\""));
        assert!(json.contains("\"sessions\": []"));
        assert!(json.contains("\"backupDate\": \"2024-06-30T08:00:00Z\""));
        assert!(json.contains('\n'));
        assert_eq!(backup.file_name(), "kit-scan-backup-2024-06-30.json");
    }

    #[test]
    fn test_backup_from_json() {
        let session = ScanSession {
            id: "s1".into(),
            timestamp: "2024-06-01T12:00:00Z".parse().unwrap(),
            image_url: "a.jpg".into(),
            items: vec![ScanResult::new("GZ-101", "Gaze", 4)],
        };
        let backup = Backup::new(default_templates(), vec![session]);
        let json = backup.to_json_pretty().unwrap();

        let restored = Backup::from_json(&json).unwrap();
        assert_eq!(restored, backup);
    }

    #[test]
    fn test_backup_missing_collections_default_to_empty() {
        let backup = Backup::from_json(r#"{"backupDate":"2024-06-30T08:00:00Z"}"#).unwrap();
        assert!(backup.templates.is_empty());
        assert!(backup.sessions.is_empty());
    }
}
