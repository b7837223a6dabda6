//! Named slots for fragment injection.
//!
//! A fragment is stored between `<!-- slot:NAME -->` and `<!-- /slot:NAME -->`
//! markers. Injecting into a document that already has the slot replaces its
//! body; otherwise the slot is inserted at its anchor. A missing anchor leaves
//! the document untouched.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// JSON-LD script, before `</head>`.
    StructuredData,
    /// Breadcrumb navigation, before the opening `<main>` tag.
    Breadcrumb,
    /// Links to other signs, before `</main>`.
    CrossSell,
    /// Shared footer, before `</body>`.
    Footer,
}

impl Slot {
    pub fn name(self) -> &'static str {
        match self {
            Slot::StructuredData => "structured-data",
            Slot::Breadcrumb => "breadcrumb",
            Slot::CrossSell => "cross-sell",
            Slot::Footer => "footer",
        }
    }

    fn anchor(self) -> &'static str {
        match self {
            Slot::StructuredData => "</head>",
            Slot::Breadcrumb => "<main",
            Slot::CrossSell => "</main>",
            Slot::Footer => "</body>",
        }
    }

    fn open_marker(self) -> String {
        format!("<!-- slot:{} -->", self.name())
    }

    fn close_marker(self) -> String {
        format!("<!-- /slot:{} -->", self.name())
    }
}

fn bare_footer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)<footer\b[^>]*>.*?</footer>\s*").expect("footer pattern is valid")
    })
}

/// Opening and closing tags of elements whose footers belong to their content.
fn content_container_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)<(/?)(?:main|article|section|aside|blockquote|figure)\b")
            .expect("container pattern is valid")
    })
}

/// How many content containers are still open at the end of `prefix`.
fn container_depth(prefix: &str) -> i32 {
    content_container_pattern()
        .captures_iter(prefix)
        .fold(0, |depth, caps| if caps[1].is_empty() { depth + 1 } else { depth - 1 })
}

/// Removes page-level footers. Footers nested in a content container (a
/// quote attribution, an article byline) are kept.
fn strip_site_footers(document: &str) -> String {
    let mut out = String::with_capacity(document.len());
    let mut copied_to = 0;
    for found in bare_footer_pattern().find_iter(document) {
        if container_depth(&document[..found.start()]) <= 0 {
            out.push_str(&document[copied_to..found.start()]);
            copied_to = found.end();
        }
    }
    out.push_str(&document[copied_to..]);
    out
}

/// Puts `fragment` into `slot` of `document`.
pub fn inject(document: &str, slot: Slot, fragment: &str) -> String {
    let wrapped = format!(
        "{}\n{}\n{}",
        slot.open_marker(),
        fragment.trim(),
        slot.close_marker()
    );

    if let Some((start, end)) = find_slot(document, slot) {
        return format!("{}{}{}", &document[..start], wrapped, &document[end..]);
    }

    // A page that has never been through injection may carry its own footer.
    let cleaned = match slot {
        Slot::Footer => strip_site_footers(document),
        _ => document.to_string(),
    };

    match find_anchor(&cleaned, slot.anchor()) {
        Some(at) => format!("{}{}\n{}", &cleaned[..at], wrapped, &cleaned[at..]),
        None => {
            debug!("Anchor {} not found; slot '{}' skipped", slot.anchor(), slot.name());
            document.to_string()
        }
    }
}

/// Byte range of an existing slot, markers included.
fn find_slot(document: &str, slot: Slot) -> Option<(usize, usize)> {
    let open = slot.open_marker();
    let close = slot.close_marker();
    let start = document.find(&open)?;
    let close_at = document[start..].find(&close)? + start;
    Some((start, close_at + close.len()))
}

/// Case-insensitive search for a tag anchor. An opening-tag anchor such as
/// `<main` only matches when followed by whitespace or `>`.
fn find_anchor(document: &str, anchor: &str) -> Option<usize> {
    let haystack = document.to_ascii_lowercase();
    let mut from = 0;
    while let Some(found) = haystack[from..].find(anchor) {
        let at = from + found;
        let next = haystack[at + anchor.len()..].chars().next();
        if anchor.ends_with('>') || matches!(next, Some(c) if c == '>' || c.is_whitespace()) {
            return Some(at);
        }
        from = at + anchor.len();
    }
    None
}

/// Number of times `slot` appears in `document`.
#[cfg(test)]
pub fn slot_count(document: &str, slot: Slot) -> usize {
    document.matches(&slot.open_marker()).count()
}
