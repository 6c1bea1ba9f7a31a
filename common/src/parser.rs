//! OCRレスポンスパーサー
//!
//! AIのレスポンスからJSON配列を抽出し、
//! `{code, name, quantity}` の明細リストに変換する

use crate::error::{Error, Result};
use crate::types::RawScanItem;
use regex::Regex;
use serde_json::Value;

/// APIレスポンスからJSON部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の [...] 配列
/// 3. エラー
///
/// オブジェクト（`{...}`）で始まるレスポンスは配列ではないのでエラー。
///
/// # Examples
/// ```
/// use kit_scan_common::extract_json;
///
/// let response = "```json\n[{\"code\": \"SUT-001\"}]\n```";
/// let json = extract_json(response).unwrap();
/// assert!(json.starts_with('['));
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    let mut body = response.trim();

    // ```json ... ``` ブロックを探す
    if let Some(start_marker) = body.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        body = match body[start..].find("```") {
            Some(end_offset) => body[start..start + end_offset].trim(),
            None => body[start..].trim(),
        };
    } else if let Some(stripped) = body.strip_prefix("```") {
        body = stripped.trim_end_matches("```").trim();
    }

    if body.starts_with('{') {
        return Err(Error::Parse("レスポンスが配列ではありません".into()));
    }

    // 生の [...] を探す
    if let Some(start) = body.find('[') {
        if let Some(end) = body.rfind(']') {
            if end >= start {
                return Ok(&body[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

/// OCRレスポンスをパース
///
/// 配列の各要素はオブジェクトでなければならない。
/// 数量は寛容に読み取る（`parse_quantity` 参照）。
pub fn parse_ocr_response(response: &str) -> Result<Vec<RawScanItem>> {
    let json_str = extract_json(response)?;
    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| Error::Parse(format!("OCR JSONパースエラー: {}", e)))?;

    let Value::Array(rows) = value else {
        return Err(Error::Parse("レスポンスが配列ではありません".into()));
    };

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            if !row.is_object() {
                return Err(Error::Parse(format!("{}行目がオブジェクトではありません", i + 1)));
            }
            Ok(RawScanItem {
                code: text_field(row.get("code")),
                name: text_field(row.get("name")),
                quantity: parse_quantity(row.get("quantity")),
            })
        })
        .collect()
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// 手書き数量の読み取り
///
/// - 数値: 負数は0、小数は切り捨て
/// - 文字列: 最初の数字列（"2 un" → 2）。"-" や "" は0
/// - null / 欠落: 0
pub fn parse_quantity(value: Option<&Value>) -> u32 {
    lazy_static::lazy_static! {
        static ref DIGITS_RE: Regex = Regex::new(r"\d+").unwrap();
    }

    match value {
        Some(Value::Number(n)) => {
            if let Some(u) = n.as_u64() {
                u32::try_from(u).unwrap_or(u32::MAX)
            } else if let Some(f) = n.as_f64() {
                if f <= 0.0 {
                    0
                } else {
                    f.trunc().min(u32::MAX as f64) as u32
                }
            } else {
                0
            }
        }
        Some(Value::String(s)) => DIGITS_RE
            .find(s)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // =============================================
    // extract_json テスト
    // =============================================

    #[test]
    fn test_extract_json_with_block() {
        let response = r#"Aqui está:
```json
[
  {"code": "SUT-001", "name": "Fio", "quantity": 1}
]
```
Fim."#;
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("SUT-001"));
    }

    #[test]
    fn test_extract_json_bare_fence() {
        let response = "```\n[{\"code\": \"A\"}]\n```";
        assert_eq!(extract_json(response).unwrap(), "[{\"code\": \"A\"}]");
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = r#"Result: [{"code": "A"}] done."#;
        assert_eq!(extract_json(response).unwrap(), r#"[{"code": "A"}]"#);
    }

    #[test]
    fn test_extract_json_object_rejected() {
        let response = r#"{"items": [{"code": "A"}]}"#;
        assert!(matches!(extract_json(response), Err(Error::Parse(_))));
    }

    #[test]
    fn test_extract_json_error() {
        let result = extract_json("Não consegui ler a imagem.");
        if let Err(Error::Parse(msg)) = result {
            assert!(msg.contains("JSONが見つかりません"));
        } else {
            panic!("Expected Parse error");
        }
        assert!(extract_json("").is_err());
    }

    // =============================================
    // parse_ocr_response テスト
    // =============================================

    #[test]
    fn test_parse_ocr_response() {
        let response = r#"[
          { "code": "SUT-01", "name": "Fio Nylon", "quantity": 1 },
          { "code": "MANUAL-1", "name": "Dreno Suctor 3.2mm", "quantity": 0 }
        ]"#;
        let items = parse_ocr_response(response).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].code, "SUT-01");
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[1].name, "Dreno Suctor 3.2mm");
        assert_eq!(items[1].quantity, 0);
    }

    #[test]
    fn test_parse_ocr_response_missing_fields() {
        let items = parse_ocr_response(r#"[{"name": "Algodão"}]"#).unwrap();
        assert_eq!(items[0].code, "");
        assert_eq!(items[0].name, "Algodão");
        assert_eq!(items[0].quantity, 0);
    }

    #[test]
    fn test_parse_ocr_response_numeric_code() {
        let items = parse_ocr_response(r#"[{"code": 101, "name": "Gaze", "quantity": 3}]"#).unwrap();
        assert_eq!(items[0].code, "101");
    }

    #[test]
    fn test_parse_ocr_response_non_object_row() {
        let result = parse_ocr_response(r#"[1, 2]"#);
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_parse_ocr_response_malformed() {
        let result = parse_ocr_response(r#"[{"code": "A", }"#);
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_parse_ocr_response_empty_array() {
        assert!(parse_ocr_response("[]").unwrap().is_empty());
    }

    // =============================================
    // parse_quantity テスト
    // =============================================

    #[test]
    fn test_parse_quantity_variants() {
        assert_eq!(parse_quantity(Some(&json!(4))), 4);
        assert_eq!(parse_quantity(Some(&json!(-2))), 0);
        assert_eq!(parse_quantity(Some(&json!(2.7))), 2);
        assert_eq!(parse_quantity(Some(&json!("3"))), 3);
        assert_eq!(parse_quantity(Some(&json!("2 un"))), 2);
        assert_eq!(parse_quantity(Some(&json!("-"))), 0);
        assert_eq!(parse_quantity(Some(&json!(""))), 0);
        assert_eq!(parse_quantity(Some(&Value::Null)), 0);
        assert_eq!(parse_quantity(None), 0);
        assert_eq!(parse_quantity(Some(&json!(true))), 0);
    }
}
