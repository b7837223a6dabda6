//! Placeholder substitution for `{{token}}` templates.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::errors::AppError;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder pattern is valid")
    })
}

/// Replaces every `{{token}}` in `template` with its value, in a single pass
/// so substituted text is never re-scanned. Values are inserted as-is: escape
/// them with [`escape_html`] or [`escape_href`] first unless they are trusted markup.
///
/// Any placeholder without a value is an error naming `page`.
pub fn render_template(
    template: &str,
    values: &[(&str, String)],
    page: &str,
) -> Result<String, AppError> {
    let lookup: HashMap<&str, &str> = values.iter().map(|(k, v)| (*k, v.as_str())).collect();
    let mut unresolved: Vec<String> = Vec::new();

    let rendered = placeholder_pattern().replace_all(template, |caps: &Captures| {
        match lookup.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => {
                if !unresolved.iter().any(|t| t == &caps[0]) {
                    unresolved.push(caps[0].to_string());
                }
                caps[0].to_string()
            }
        }
    });

    if !unresolved.is_empty() {
        return Err(AppError::UnresolvedPlaceholders {
            page: page.to_string(),
            tokens: unresolved,
        });
    }
    Ok(rendered.into_owned())
}

/// Escapes text for element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    // Writing into a String never fails.
    let _ = pulldown_cmark::escape::escape_html(&mut escaped, text);
    escaped
}

/// Escapes a link target for `href`/`src` attributes and `<loc>` elements:
/// entity-escapes `&` and quotes, percent-encodes anything outside ASCII.
pub fn escape_href(url: &str) -> String {
    let mut escaped = String::with_capacity(url.len());
    let _ = pulldown_cmark::escape::escape_href(&mut escaped, url);
    escaped
}

/// Fails when `template` uses a placeholder outside `known`. Lets a run
/// reject a bad template before it writes or requests anything.
pub fn check_placeholders(template: &str, known: &[&str], page: &str) -> Result<(), AppError> {
    let mut unknown: Vec<String> = Vec::new();
    for caps in placeholder_pattern().captures_iter(template) {
        if !known.contains(&&caps[1]) && !unknown.iter().any(|t| t == &caps[0]) {
            unknown.push(caps[0].to_string());
        }
    }

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(AppError::UnresolvedPlaceholders {
            page: page.to_string(),
            tokens: unknown,
        })
    }
}
