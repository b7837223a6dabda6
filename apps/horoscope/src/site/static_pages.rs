//! Hand-written pages copied from the pages directory.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::info;

use crate::render::NavLink;

/// A static page found in the pages directory, not yet decorated.
#[derive(Debug, Clone)]
pub struct StaticPage {
    pub file: String,
    pub label: String,
    pub html: String,
}

impl StaticPage {
    pub fn nav_link(&self) -> NavLink {
        NavLink {
            label: self.label.clone(),
            href: self.file.clone(),
        }
    }
}

fn title_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title pattern is valid"))
}

/// Navigation label for a page: its `<title>` up to the first separator,
/// otherwise the file name ("mentions-legales.html" → "Mentions legales").
fn page_label(file: &str, html: &str) -> String {
    if let Some(caps) = title_pattern().captures(html) {
        let title = caps[1].trim();
        let cut = [" | ", " - ", " – "]
            .iter()
            .filter_map(|sep| title.find(sep))
            .min()
            .unwrap_or(title.len());
        let title = title[..cut].trim();
        if !title.is_empty() {
            return title.to_string();
        }
    }

    let stem = file.trim_end_matches(".html").replace(['-', '_'], " ");
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => stem,
    }
}

/// Loads each named page from `dir`. Missing pages are skipped with a notice.
pub fn load_static_pages(dir: &Path, names: &[String]) -> std::io::Result<Vec<StaticPage>> {
    let mut pages = Vec::new();
    for name in names {
        let path = dir.join(name);
        if !path.is_file() {
            info!("Static page {} not found; skipping", path.display());
            continue;
        }
        let html = std::fs::read_to_string(&path)?;
        pages.push(StaticPage {
            label: page_label(name, &html),
            file: name.clone(),
            html,
        });
    }
    Ok(pages)
}
