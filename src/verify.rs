//! 対話式確認モジュール
//!
//! OCR結果（PendingScan）を一覧表示し、数量修正・エラー指定を経て
//! 履歴に確定するか破棄するかを選ぶ。

use crate::error::Result;
use dialoguer::Input;
use kit_scan_common::{ItemStatus, PendingScan};

/// 確認画面の操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyAction {
    /// 行の数量を変更（0始まりインデックス）
    SetQuantity(usize, u32),
    /// 行のエラー指定を切り替え
    Toggle(usize),
    /// 確定
    Confirm,
    /// 破棄
    Discard,
    /// 解釈できない入力
    Invalid(String),
}

/// 確認の結末
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Confirmed,
    Discarded,
}

/// 入力文字列を操作に変換
///
/// - `<番号> <数量>` : 数量変更（番号は1始まり）
/// - `e <番号>`      : エラー指定の切り替え
/// - `y` / 空        : 確定
/// - `n` / `q`       : 破棄
pub fn parse_action(input: &str) -> VerifyAction {
    let trimmed = input.trim();
    let parts: Vec<&str> = trimmed.split_whitespace().collect();

    match parts.as_slice() {
        [] | ["y"] | ["Y"] => VerifyAction::Confirm,
        ["n"] | ["N"] | ["q"] | ["Q"] => VerifyAction::Discard,
        ["e", n] | ["E", n] => match parse_row(n) {
            Some(idx) => VerifyAction::Toggle(idx),
            None => VerifyAction::Invalid(trimmed.to_string()),
        },
        [n, qty] => match (parse_row(n), qty.parse::<u32>()) {
            (Some(idx), Ok(q)) => VerifyAction::SetQuantity(idx, q),
            _ => VerifyAction::Invalid(trimmed.to_string()),
        },
        _ => VerifyAction::Invalid(trimmed.to_string()),
    }
}

fn parse_row(s: &str) -> Option<usize> {
    s.parse::<usize>().ok().filter(|n| *n >= 1).map(|n| n - 1)
}

/// 操作を適用。確定/破棄なら結末を返す
pub fn apply_action(pending: &mut PendingScan, action: VerifyAction) -> Option<VerifyOutcome> {
    match action {
        VerifyAction::SetQuantity(idx, qty) => {
            if pending.set_quantity_at(idx, qty) {
                println!("  → {}行目を {} に変更", idx + 1, qty);
            } else {
                println!("  → {}行目はありません", idx + 1);
            }
            None
        }
        VerifyAction::Toggle(idx) => {
            if pending.toggle_status_at(idx) {
                println!("  → {}行目: {}", idx + 1, pending.items[idx].status);
            } else {
                println!("  → {}行目はありません", idx + 1);
            }
            None
        }
        VerifyAction::Confirm => Some(VerifyOutcome::Confirmed),
        VerifyAction::Discard => Some(VerifyOutcome::Discarded),
        VerifyAction::Invalid(input) => {
            println!("  → 入力を解釈できません: {}", input);
            None
        }
    }
}

fn status_mark(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Verified => "✔",
        ItemStatus::Error => "✖",
        ItemStatus::Empty => "·",
    }
}

pub fn print_pending(pending: &PendingScan) {
    println!("📋 {} ({}行)", pending.image_ref, pending.items.len());
    for (i, item) in pending.items.iter().enumerate() {
        println!(
            "  {:>3}. {} {:<12} {:<36} {:>4}",
            i + 1,
            status_mark(item.status),
            item.code,
            item.name,
            item.quantity
        );
    }
}

/// 対話式で確認
pub fn run_interactive_verify(pending: &mut PendingScan) -> Result<VerifyOutcome> {
    println!("操作: [番号 数量]数量変更 [e 番号]エラー切替 [y/Enter]確定 [n]破棄");
    println!("---");

    loop {
        print_pending(pending);

        let input: String = Input::new()
            .with_prompt("操作")
            .allow_empty(true)
            .interact_text()?;

        if let Some(outcome) = apply_action(pending, parse_action(&input)) {
            return Ok(outcome);
        }
        println!();
    }
}
