//! Claude CLI連携モジュール
//!
//! 画像ファイルのパスをプロンプトに含めて `claude -p` を実行する。

use crate::error::{KitScanError, Result};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// 画像パス付きのプロンプトを組み立てる
pub fn build_cli_prompt(image_path: &Path, ocr_prompt: &str) -> String {
    let path = image_path.display().to_string().replace('\\', "/");
    let raw_prompt = format!(
        "Read the following image file and analyze it: {}\n\n{}",
        path, ocr_prompt
    );
    // 改行をスペースに置換してコマンドライン経由で渡す
    raw_prompt.replace('\n', " ").replace('"', "\\\"")
}

pub async fn run_claude_cli(prompt: &str) -> Result<String> {
    debug!("Claude CLI呼び出し: prompt={}chars", prompt.len());

    // Windowsではcmd /c経由
    #[cfg(windows)]
    let output = Command::new("cmd")
        .args(["/c", "claude", "-p", prompt, "--output-format", "text"])
        .output()
        .await
        .map_err(|e| KitScanError::CliExecution(format!("Claude CLI実行エラー: {}", e)))?;

    #[cfg(not(windows))]
    let output = Command::new("claude")
        .args(["-p", prompt, "--output-format", "text"])
        .output()
        .await
        .map_err(|e| KitScanError::CliExecution(format!("Claude CLI実行エラー: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(KitScanError::ApiCall(format!(
            "Claude CLI failed (code {:?}): {}",
            output.status.code(),
            stderr
        )));
    }

    let response = String::from_utf8_lossy(&output.stdout).to_string();

    let preview: String = response.chars().take(500).collect();
    debug!("Claude CLI応答: {}", preview);

    Ok(response)
}
