use thiserror::Error;

/// The input document is malformed or incomplete.
///
/// `field` is a path into the document such as `endpointCalls[2].arguments[0]`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },
}

impl ConfigError {
    pub fn missing(field: impl Into<String>) -> Self {
        ConfigError::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Offending field, if the error points at one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::Yaml(_) => None,
            ConfigError::MissingField { field } | ConfigError::InvalidField { field, .. } => {
                Some(field)
            }
        }
    }
}

/// A scanned source file is not valid Go.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// One file of an extraction run could not be turned into an outline.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),

    #[error("syntax error at {0}")]
    Syntax(#[from] SyntaxError),
}
