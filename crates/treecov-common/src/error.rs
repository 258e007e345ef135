//! Error types with actionable diagnostics (Andon principle).
//!
//! All errors include contextual information to help users resolve issues
//! without needing to consult external documentation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for treecov operations.
pub type Result<T> = std::result::Result<T, TreecovError>;

/// Errors that can occur while deriving test suites.
///
/// Configuration variants are user errors and are reported before any
/// derivation starts. Structural variants mean the surrogate tree cannot be
/// trusted and abort the whole run.
#[derive(Error, Debug)]
pub enum TreecovError {
    /// Configuration file not found at expected path.
    #[error("Configuration file not found: {path}\n  → Create a config file or drop --config to use defaults")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file has invalid syntax.
    #[error("Invalid configuration syntax in {path}:\n  {message}\n  → Check YAML syntax at the indicated line")]
    ConfigParsing { path: PathBuf, message: String },

    /// Configuration value is invalid.
    #[error("Invalid configuration value for '{field}': {message}\n  → {suggestion}")]
    ConfigValue { field: String, message: String, suggestion: String },

    /// The surrogate tree is malformed.
    #[error("Malformed decision tree at node {node}: {message}\n  → Re-export the tree from the training library; derivation cannot trust any leaf")]
    TreeStructure { node: usize, message: String },

    /// The training dataset is unusable.
    #[error("Invalid training dataset: {message}\n  → Provide the feature matrix the surrogate tree was trained on")]
    Dataset { message: String },

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic error for unexpected conditions.
    #[error("Internal error: {message}\n  → Please report this bug at https://github.com/paiml/treecov/issues")]
    Internal { message: String },
}

impl TreecovError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    /// Create a configuration value error.
    pub fn config_value(
        field: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::ConfigValue {
            field: field.into(),
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Check if this error is user-recoverable.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigParsing { .. }
                | Self::ConfigValue { .. }
                | Self::Dataset { .. }
        )
    }

    /// Get the error code for structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "E001",
            Self::ConfigParsing { .. } => "E002",
            Self::ConfigValue { .. } => "E003",
            Self::TreeStructure { .. } => "E010",
            Self::Dataset { .. } => "E011",
            Self::Io { .. } => "E050",
            Self::Serialization { .. } => "E051",
            Self::Internal { .. } => "E999",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_unique() {
        let errors = vec![
            TreecovError::ConfigNotFound { path: "".into() },
            TreecovError::ConfigParsing { path: "".into(), message: "".into() },
            TreecovError::config_value("", "", ""),
            TreecovError::TreeStructure { node: 0, message: "".into() },
            TreecovError::Dataset { message: "".into() },
            TreecovError::io("", std::io::Error::other("x")),
            TreecovError::Serialization { message: "".into() },
            TreecovError::Internal { message: "".into() },
        ];

        let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_config_errors_are_user_errors() {
        assert!(TreecovError::ConfigNotFound { path: "".into() }.is_user_error());
        assert!(TreecovError::config_value("seed", "bad", "fix").is_user_error());
        assert!(!TreecovError::TreeStructure { node: 3, message: "".into() }.is_user_error());
        assert!(!TreecovError::Internal { message: "".into() }.is_user_error());
    }

    #[test]
    fn test_config_value_error_includes_suggestion() {
        let err = TreecovError::config_value(
            "boundary_value_rate",
            "must be in (1, 100]",
            "Use a value like 20.0",
        );
        let msg = err.to_string();
        assert!(msg.contains("boundary_value_rate"));
        assert!(msg.contains("(1, 100]"));
        assert!(msg.contains("Use a value like 20.0"));
    }

    #[test]
    fn test_tree_structure_error_names_node() {
        let err = TreecovError::TreeStructure { node: 7, message: "cycle".into() };
        let msg = err.to_string();
        assert!(msg.contains("node 7"));
        assert!(msg.contains("cycle"));
    }

    #[test]
    fn test_io_error_constructor() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = TreecovError::io("reading tree", io_err);

        assert!(matches!(err, TreecovError::Io { .. }));
        assert!(err.to_string().contains("reading tree"));
    }

    #[test]
    fn test_internal_error_mentions_bug_report() {
        let err = TreecovError::Internal { message: "unexpected state".into() };
        let msg = err.to_string();
        assert!(msg.contains("github.com"));
        assert!(msg.contains("issues"));
    }
}
