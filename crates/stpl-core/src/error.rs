use thiserror::Error;

use crate::host::HostError;

#[derive(Error, Debug)]
pub enum StplError {
    // Template errors
    #[error("SYNTAX_ERROR: {template}:{line}: {message}")]
    Syntax {
        template: String,
        line: usize,
        message: String,
    },

    #[error("GENERATION_ERROR: {template}:{line}: {message}")]
    Generation {
        template: String,
        line: usize,
        message: String,
    },

    #[error("RUNTIME_ERROR: {template}:{line}: {kind}")]
    Runtime {
        template: String,
        line: usize,
        kind: RuntimeErrorKind,
    },

    // Config errors
    #[error("CONFIG_PARSE_ERROR: {0}")]
    ConfigParse(String),

    #[error("CONFIG_INVALID_VALUE: {field}: {reason}")]
    ConfigInvalidValue { field: String, reason: String },

    // Argument errors
    #[error("INVALID_ARGUMENTS: {0}")]
    InvalidArguments(String),

    // IO errors
    #[error("IO_ERROR: {0}")]
    Io(#[from] std::io::Error),
}

/// What went wrong while a compiled program was executing
#[derive(Error, Debug)]
pub enum RuntimeErrorKind {
    #[error("name '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("key '{0}' not found")]
    NotFound(String),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("type error: {0}")]
    Type(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("'{type_name}' has no method '{method}'")]
    UnknownMethod { type_name: String, method: String },

    #[error("{function}(): {reason}")]
    BadArguments { function: String, reason: String },

    #[error("include depth limit of {0} exceeded")]
    IncludeDepth(usize),

    #[error("value error: {0}")]
    Value(String),

    #[error(transparent)]
    Host(#[from] HostError),
}

impl From<serde_json::Error> for StplError {
    fn from(err: serde_json::Error) -> Self {
        StplError::InvalidArguments(format!("JSON error: {}", err))
    }
}

impl From<toml::de::Error> for StplError {
    fn from(err: toml::de::Error) -> Self {
        StplError::ConfigParse(err.to_string())
    }
}

impl StplError {
    pub(crate) fn syntax(template: &str, line: usize, message: impl Into<String>) -> Self {
        StplError::Syntax {
            template: template.to_string(),
            line,
            message: message.into(),
        }
    }

    pub(crate) fn generation(template: &str, line: usize, message: impl Into<String>) -> Self {
        StplError::Generation {
            template: template.to_string(),
            line,
            message: message.into(),
        }
    }

    /// True for malformed-template errors
    pub fn is_syntax(&self) -> bool {
        matches!(self, StplError::Syntax { .. })
    }

    /// True for errors raised while executing a compiled program
    pub fn is_runtime(&self) -> bool {
        matches!(self, StplError::Runtime { .. })
    }
}

pub type Result<T> = std::result::Result<T, StplError>;
