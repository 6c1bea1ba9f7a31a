//! 区切り文字形式（CSV/TSV）の集計出力
//!
//! 1行目はヘッダー `code,name,quantity`、以降は集計行。

use crate::types::ConsolidatedEntry;

const HEADER: [&str; 3] = ["code", "name", "quantity"];

/// 区切り文字の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// カンマ区切り。全フィールドをダブルクォートで囲む
    Comma,
    /// タブ区切り。クォートなし（表計算ソフトへの貼り付け用）
    Tab,
}

impl Delimiter {
    fn separator(&self) -> &'static str {
        match self {
            Delimiter::Comma => ",",
            Delimiter::Tab => "\t",
        }
    }

    fn field(&self, value: &str) -> String {
        match self {
            Delimiter::Comma => format!("\"{}\"", value.replace('"', "\"\"")),
            Delimiter::Tab => value
                .chars()
                .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
                .collect(),
        }
    }
}

/// 集計行を区切り文字形式に変換
pub fn render(entries: &[ConsolidatedEntry], delimiter: Delimiter) -> String {
    let sep = delimiter.separator();
    let mut lines = Vec::with_capacity(entries.len() + 1);

    lines.push(
        HEADER
            .iter()
            .map(|h| delimiter.field(h))
            .collect::<Vec<_>>()
            .join(sep),
    );

    for entry in entries {
        let quantity = entry.quantity.to_string();
        lines.push(
            [entry.code.as_str(), entry.name.as_str(), quantity.as_str()]
                .iter()
                .map(|v| delimiter.field(v))
                .collect::<Vec<_>>()
                .join(sep),
        );
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn to_csv(entries: &[ConsolidatedEntry]) -> String {
    render(entries, Delimiter::Comma)
}

pub fn to_tsv(entries: &[ConsolidatedEntry]) -> String {
    render(entries, Delimiter::Tab)
}
