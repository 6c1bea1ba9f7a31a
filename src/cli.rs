use clap::{Parser, Subcommand};
use crate::ai_provider::AiProvider;
use crate::export::ReportFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kit-scan")]
#[command(about = "手術キット・チェックリスト照合ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// データ保存先（テンプレート・セッション）
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// キットテンプレートの管理
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// 選択中テンプレートの資材管理
    Material {
        #[command(subcommand)]
        action: MaterialAction,
    },

    /// 用紙画像を読み取り、確認して履歴に追加
    Scan {
        /// 画像ファイルまたはフォルダ
        #[arg(required = true)]
        target: PathBuf,

        /// AIプロバイダ (gemini/claude)
        #[arg(long, default_value = "gemini")]
        provider: AiProvider,

        /// 確認を省略してそのまま確定
        #[arg(short, long)]
        yes: bool,
    },

    /// 読み取り履歴の管理
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// 全セッションの集計を出力
    Report {
        /// 出力形式 (table/csv/tsv/xlsx)
        #[arg(short, long, default_value = "table")]
        format: ReportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Excelのシートタイトル
        #[arg(short, long, default_value = "Consolidado de Materiais")]
        title: String,
    },

    /// テンプレートとセッションをJSONにバックアップ
    Backup {
        /// 出力ファイル（省略時は kit-scan-backup-YYYY-MM-DD.json）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// バックアップJSONから復元（現在のデータは置き換え）
    Restore {
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
pub enum TemplateAction {
    /// 一覧
    List,
    /// 詳細（資材とQRペイロード）。ID省略時は選択中テンプレート
    Show { id: Option<String> },
    /// 追加
    Add { name: String },
    /// 名前変更
    Rename { id: String, name: String },
    /// 削除（最後の1件は削除不可）
    Remove { id: String },
    /// 選択
    Select { id: String },
}

#[derive(Subcommand)]
pub enum MaterialAction {
    /// 一覧
    List,
    /// 追加
    Add { code: String, name: String },
    /// コードと名称を更新
    Update { id: String, code: String, name: String },
    /// 削除
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// 一覧（新しい順）
    List,
    /// 明細を表示
    Show { id: String },
    /// 削除
    Delete { id: String },
    /// コードが一致する明細の数量を変更
    SetQty {
        id: String,
        code: String,
        quantity: u32,
    },
    /// コードが一致する明細のエラー指定を切り替え
    Toggle { id: String, code: String },
}
