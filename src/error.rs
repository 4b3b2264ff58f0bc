
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParaqueryError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Data corruption: {message}")]
    DataCorruption { message: String },
    #[error("Parse error: {message}")]
    Parse { message: String, line: Option<usize>, col: Option<usize> },
    #[error("Incorrect value '{value}' for setting '{setting}'")]
    Setting { setting: String, value: String },
    #[error("Incorrect setting name '{0}'")]
    UnknownSetting(String),
    #[error("Execution error: {0}")]
    Execution(String),
}

impl ParaqueryError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse { message: message.into(), line: None, col: None }
    }
    pub fn setting(setting: &str, value: &str) -> Self {
        Self::Setting { setting: setting.to_string(), value: value.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, ParaqueryError>;

// Helper conversions
impl From<rusqlite::Error> for ParaqueryError {
    fn from(e: rusqlite::Error) -> Self { Self::Persistence(e.to_string()) }
}
impl From<config::ConfigError> for ParaqueryError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<serde_json::Error> for ParaqueryError {
    fn from(e: serde_json::Error) -> Self { Self::DataCorruption { message: e.to_string() } }
}
impl From<pest::error::Error<crate::parser::Rule>> for ParaqueryError {
    fn from(e: pest::error::Error<crate::parser::Rule>) -> Self {
        let (line, col) = match e.line_col {
            pest::error::LineColLocation::Pos((l, c)) => (l, c),
            pest::error::LineColLocation::Span((l, c), _) => (l, c),
        };
        Self::Parse { message: e.variant.message().into_owned(), line: Some(line), col: Some(col) }
    }
}
