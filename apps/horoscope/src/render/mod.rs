//! Page rendering: template substitution, fragment builders and named-slot
//! injection.

pub mod fragments;
pub mod pages;
pub mod slots;
pub mod template;

use chrono::NaiveDate;

pub const SITE_NAME: &str = "Maison Horoscope Authentique";

/// A link in the shared navigation. `href` is relative to the site root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

/// Site-wide facts every page fragment draws on. Built once per run.
#[derive(Debug, Clone)]
pub struct SiteContext {
    /// Absolute base URL, without trailing slash.
    pub site_url: String,
    pub today: NaiveDate,
    pub signs: Vec<NavLink>,
    pub pages: Vec<NavLink>,
    pub has_blog: bool,
}

impl SiteContext {
    /// Absolute URL for a root-relative path.
    pub fn absolute(&self, path: &str) -> String {
        format!("{}/{}", self.site_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
pub(crate) fn fixture_site() -> SiteContext {
    use crate::models::sign::fixture_signs;

    SiteContext {
        site_url: "https://example.test".to_string(),
        today: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        signs: fixture_signs()
            .iter()
            .map(|s| NavLink {
                label: s.name.clone(),
                href: s.page_file(),
            })
            .collect(),
        pages: vec![NavLink {
            label: "Contact".to_string(),
            href: "contact.html".to_string(),
        }],
        has_blog: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_joins_with_single_slash() {
        let site = fixture_site();
        assert_eq!(site.absolute("/lion.html"), "https://example.test/lion.html");
        assert_eq!(site.absolute(""), "https://example.test/");
    }
}
