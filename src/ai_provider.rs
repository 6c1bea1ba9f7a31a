use clap::ValueEnum;

/// OCRに使うAIプロバイダ
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum AiProvider {
    /// Gemini API（HTTP）
    #[default]
    Gemini,
    /// Claude CLI（ローカルの `claude` コマンド）
    Claude,
}

impl AiProvider {
    pub fn display_name(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "gemini",
            AiProvider::Claude => "claude",
        }
    }
}
