//! ファイル保存モジュール
//!
//! データディレクトリ直下に templates.json / sessions.json を置く。
//! 書き込みは一時ファイル経由で置き換える。

use kit_scan_common::persist::{decode_sessions, decode_templates, encode_sessions, encode_templates};
use kit_scan_common::{Persistence, ScanSession, Template};
use std::path::{Path, PathBuf};

const TEMPLATES_FILE_NAME: &str = "templates.json";
const SESSIONS_FILE_NAME: &str = "sessions.json";

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn templates_path(&self) -> PathBuf {
        self.dir.join(TEMPLATES_FILE_NAME)
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.dir.join(SESSIONS_FILE_NAME)
    }

    fn read_optional(path: &Path) -> kit_scan_common::Result<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn write_replace(&self, path: &Path, content: &str) -> kit_scan_common::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl Persistence for FileStorage {
    fn load_templates(&self) -> kit_scan_common::Result<Option<Vec<Template>>> {
        Self::read_optional(&self.templates_path())?
            .map(|json| decode_templates(&json))
            .transpose()
    }

    fn save_templates(&mut self, templates: &[Template]) -> kit_scan_common::Result<()> {
        let json = encode_templates(templates)?;
        self.write_replace(&self.templates_path(), &json)
    }

    fn load_sessions(&self) -> kit_scan_common::Result<Option<Vec<ScanSession>>> {
        Self::read_optional(&self.sessions_path())?
            .map(|json| decode_sessions(&json))
            .transpose()
    }

    fn save_sessions(&mut self, sessions: &[ScanSession]) -> kit_scan_common::Result<()> {
        let json = encode_sessions(sessions)?;
        self.write_replace(&self.sessions_path(), &json)
    }
}
