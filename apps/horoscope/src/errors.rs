use std::path::PathBuf;

use thiserror::Error;

use crate::llm_client::LlmError;

/// Fatal errors for a generation run.
/// Anything here aborts the run; recoverable API failures live in `LlmError`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Required input file is missing: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("Environment variable '{var}' is required in this generation mode")]
    MissingCredential { var: &'static str },

    #[error("Invalid input file {}: {source}", path.display())]
    InvalidInput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unresolved placeholders in {page}: {}", tokens.join(", "))]
    UnresolvedPlaceholders { page: String, tokens: Vec<String> },

    #[error("Could not set up the generation client: {0}")]
    LlmSetup(#[from] LlmError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_placeholders_lists_every_token() {
        let err = AppError::UnresolvedPlaceholders {
            page: "belier.html".to_string(),
            tokens: vec!["{{foo}}".to_string(), "{{bar}}".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unresolved placeholders in belier.html: {{foo}}, {{bar}}"
        );
    }

    #[test]
    fn test_missing_input_shows_path() {
        let err = AppError::MissingInput {
            path: PathBuf::from("./signs.json"),
        };
        assert!(err.to_string().contains("./signs.json"));
    }
}
