//! Input records and their loaders.

pub mod article;
pub mod sign;

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::errors::AppError;

pub use article::Article;
pub use sign::SignRecord;

/// Reads a required JSON list. A missing file is fatal.
pub fn load_required_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
    if !path.exists() {
        return Err(AppError::MissingInput {
            path: path.to_owned(),
        });
    }
    parse_list(path)
}

/// Reads a required text file (templates). A missing file is fatal.
pub fn load_required_text(path: &Path) -> Result<String, AppError> {
    if !path.exists() {
        return Err(AppError::MissingInput {
            path: path.to_owned(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Reads the optional article list and its template. Returns `None` when
/// either file is absent, so the blog feature is skipped.
pub fn load_articles(
    list_path: &Path,
    template_path: &Path,
) -> Result<Option<(Vec<Article>, String)>, AppError> {
    if !list_path.exists() || !template_path.exists() {
        info!(
            "Article list or template not found ({}, {}); skipping blog pages",
            list_path.display(),
            template_path.display()
        );
        return Ok(None);
    }
    let articles = parse_list(list_path)?;
    let template = std::fs::read_to_string(template_path)?;
    Ok(Some((articles, template)))
}

fn parse_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| AppError::InvalidInput {
        path: path.to_owned(),
        source,
    })
}
