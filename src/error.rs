use thiserror::Error;

#[derive(Error, Debug)]
pub enum KitScanError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`kit-scan config --set-api-key YOUR_KEY` で設定するか GEMINI_API_KEY を指定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("エクスポートエラー: {0}")]
    Export(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),

    #[error("対象が見つかりません: {0}")]
    NotFound(String),

    #[error("入力エラー: {0}")]
    Prompt(String),
}

impl From<kit_scan_common::Error> for KitScanError {
    fn from(e: kit_scan_common::Error) -> Self {
        use kit_scan_common::Error as E;
        match e {
            E::Io(e) => KitScanError::Io(e),
            E::Json(e) => KitScanError::JsonParse(e),
            E::Parse(msg) => KitScanError::ApiParse(msg),
            E::Export(msg) => KitScanError::Export(msg),
        }
    }
}

impl From<dialoguer::Error> for KitScanError {
    fn from(e: dialoguer::Error) -> Self {
        KitScanError::Prompt(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KitScanError>;
