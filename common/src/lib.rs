//! Kit Scan Common Library
//!
//! CLIとWeb(WASM)で共有される照合ストア・型・ユーティリティ

pub mod types;
pub mod status;
pub mod error;
pub mod registry;
pub mod session_log;
pub mod store;
pub mod persist;
pub mod pending;
pub mod parser;
pub mod prompts;
pub mod gemini;
pub mod backup;
pub mod report;
pub mod export;

pub use types::{
    ConsolidatedEntry, MaterialItem, RawScanItem, ScanResult, ScanSession, Template, TemplateTag,
};
pub use status::{derive_status, ItemStatus};
pub use error::{Error, Result};
pub use registry::{default_templates, TemplateRegistry};
pub use session_log::{consolidate, SessionLog};
pub use store::{Persistence, ReconciliationStore};
pub use persist::MemoryStorage;
pub use pending::PendingScan;
pub use parser::{extract_json, parse_ocr_response};
pub use prompts::{build_ocr_prompt, build_ocr_prompt_for};
pub use backup::Backup;
pub use report::ConsolidatedReport;
