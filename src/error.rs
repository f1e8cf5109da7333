//! Error types for schemagen

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// schemagen errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema parse error: {0}")]
    SchemaParse(String),

    #[error("Type reference error: {0}")]
    TypeRef(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Code parse error: {0}")]
    CodeParse(String),

    #[error("Validation failed for {0}.")]
    ValidationFailed(String),

    #[error("Cannot deconstruct a null {0} instance")]
    NullInstance(String),

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Property '{property}' is not settable on {type_name}")]
    UnknownProperty { type_name: String, property: String },

    #[error("Dangling object reference #{0}")]
    DanglingReference(usize),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
