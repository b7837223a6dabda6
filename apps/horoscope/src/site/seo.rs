//! Sitemap and robots emitters.

use chrono::NaiveDate;

use crate::render::template::escape_href;
use crate::render::SiteContext;

/// Builds `sitemap.xml` for `routes` (root-relative paths, `""` for the home
/// page), all stamped with `lastmod`.
pub fn sitemap(site: &SiteContext, routes: &[String], lastmod: NaiveDate) -> String {
    let urls: String = routes
        .iter()
        .map(|route| {
            format!(
                "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n  </url>\n",
                escape_href(&site.absolute(route)),
                lastmod
            )
        })
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n\
         {urls}</urlset>\n"
    )
}

pub fn robots(site: &SiteContext) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}\n",
        site.absolute("sitemap.xml")
    )
}
