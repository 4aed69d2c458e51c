//! Error taxonomy for parsing and generation.
//!
//! Validation failures are not errors in this sense; see
//! [`crate::validate::ValidationReport`].
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed JSON at path {path}: {message}")]
    Json { path: String, message: String },

    #[error("malformed YAML in {}: {message}", file.display())]
    Yaml { file: PathBuf, message: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("can not import file {}", path.display())]
    MissingInclude { path: PathBuf },

    #[error("cyclic include chain: {chain}")]
    IncludeCycle { chain: String },

    #[error("property `{property}` has an invalid pattern `{pattern}`")]
    InvalidPattern { property: String, pattern: String },

    #[error("property `{property}`: {message}")]
    InvalidConstraint { property: String, message: String },

    #[error("unresolved schema reference `{reference}`")]
    UnresolvedReference { reference: String },

    #[error("recursive schema reference `{reference}`")]
    RecursiveReference { reference: String },

    #[error("resource `{path}` is not declared in {}", file.display())]
    ResourceNotFound { path: String, file: PathBuf },

    #[error("malformed document {}: {message}", file.display())]
    Malformed { file: PathBuf, message: String },

    #[error("invalid schema for {location}: {source}")]
    Schema {
        location: String,
        #[source]
        source: Box<ParseError>,
    },
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("object `{parent}` declares property `{name}` more than once")]
    DuplicateProperty { parent: String, name: String },

    #[error("`{key}` must be an object schema, found {kind}")]
    UnsupportedRoot { key: String, kind: String },

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}
