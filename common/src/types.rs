//! データモデル
//!
//! CLIとWeb(WASM)で共有される型:
//! - MaterialItem / Template: キット定義（チェックリスト）
//! - RawScanItem: OCRの出力（ステータスなし）
//! - ScanResult / ScanSession: 確認済みの読み取り結果
//! - ConsolidatedEntry: 全セッションの集計行（保存しない）

use crate::status::{derive_status, ItemStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 新しい識別子を生成
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// テンプレート内の資材1件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialItem {
    pub id: String,
    pub code: String,
    pub name: String,
}

impl MaterialItem {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            code: code.into(),
            name: name.into(),
        }
    }
}

/// キット（チェックリスト）定義
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub materials: Vec<MaterialItem>,
}

impl Template {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            materials: Vec::new(),
        }
    }

    /// 印刷用QRコードに埋め込むペイロード
    pub fn qr_payload(&self) -> String {
        let tag = TemplateTag {
            id: self.id.clone(),
            name: self.name.clone(),
        };
        serde_json::to_string(&tag).unwrap_or_default()
    }
}

/// QRコードから読み取ったテンプレート識別情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTag {
    pub id: String,
    pub name: String,
}

impl TemplateTag {
    pub fn from_qr_payload(payload: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(payload.trim())?)
    }
}

/// OCRが返す生データ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawScanItem {
    pub code: String,
    pub name: String,
    pub quantity: u32,
}

/// 確認済み明細
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub code: String,
    pub name: String,
    pub quantity: u32,
    pub status: ItemStatus,
}

impl ScanResult {
    /// 数量からステータスを導出して生成
    pub fn new(code: impl Into<String>, name: impl Into<String>, quantity: u32) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            quantity,
            status: derive_status(quantity),
        }
    }
}

impl From<RawScanItem> for ScanResult {
    fn from(raw: RawScanItem) -> Self {
        Self::new(raw.code, raw.name, raw.quantity)
    }
}

/// 1枚の用紙の読み取り結果（確認済み）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSession {
    pub id: String,
    /// RFC 3339 文字列で保存
    pub timestamp: DateTime<Utc>,
    /// 元画像への参照（ファイルパスまたはData URL）
    pub image_url: String,
    #[serde(default)]
    pub items: Vec<ScanResult>,
}

impl ScanSession {
    /// 数量合計
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

/// 集計行
///
/// `status` は最初に出現した明細のものをそのまま持ち回す。
/// 集計レベルでの意味はない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedEntry {
    pub code: String,
    pub name: String,
    pub quantity: u64,
    pub status: ItemStatus,
}
