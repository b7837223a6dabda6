//! Reusable HTML fragments injected into pages.
//!
//! `prefix` arguments make root-relative links work from nested pages
//! (`""` at the root, `"../"` under `blog/`).

use chrono::Datelike;
use serde_json::{json, Value};

use crate::dates::french_long_date;
use crate::models::{Article, SignRecord};
use crate::render::template::{escape_href, escape_html};
use crate::render::{SiteContext, SITE_NAME};

const CROSS_SELL_COUNT: usize = 3;

/// One breadcrumb step; the last step is the current page and has no link.
pub struct Crumb<'a> {
    pub label: &'a str,
    pub href: Option<&'a str>,
}

pub fn breadcrumb(trail: &[Crumb], prefix: &str) -> String {
    let items: Vec<String> = trail
        .iter()
        .map(|crumb| match crumb.href {
            Some(href) => format!(
                r#"<li><a href="{prefix}{}" class="hover:text-[#D4AF37]">{}</a></li>"#,
                escape_href(href),
                escape_html(crumb.label)
            ),
            None => format!(
                r#"<li aria-current="page" class="text-gray-600">{}</li>"#,
                escape_html(crumb.label)
            ),
        })
        .collect();

    format!(
        r#"<nav aria-label="Fil d'Ariane" class="container mx-auto px-4 pt-6 text-xs uppercase tracking-widest text-gray-400">
    <ol class="flex gap-2">{}</ol>
</nav>"#,
        items.join(r#"<li aria-hidden="true">›</li>"#)
    )
}

/// Links to the signs that follow `position` in the list, wrapping around.
pub fn cross_sell(signs: &[SignRecord], position: usize) -> String {
    let count = CROSS_SELL_COUNT.min(signs.len().saturating_sub(1));
    let cards: String = (1..=count)
        .map(|offset| &signs[(position + offset) % signs.len()])
        .map(|sign| {
            format!(
                r#"
        <a href="{slug}.html" class="block text-center group">
            <img src="assets/{image}" alt="{name}" class="w-24 h-auto mx-auto mb-2">
            <span class="font-cinzel text-sm group-hover:text-[#D4AF37]">{name}</span>
        </a>"#,
                slug = escape_href(&sign.slug),
                image = escape_href(&sign.image),
                name = escape_html(&sign.name),
            )
        })
        .collect();

    format!(
        r#"<aside class="max-w-3xl mx-auto my-16 text-center">
    <p class="text-xs tracking-[0.3em] uppercase text-gray-400 mb-6">Découvrez aussi</p>
    <div class="grid grid-cols-3 gap-6">{cards}
    </div>
</aside>"#
    )
}

/// Wraps a JSON-LD value in its script tag.
pub fn structured_data(value: &Value) -> String {
    // `</` inside the script body would end the tag early.
    let body = value.to_string().replace("</", "<\\/");
    format!(r#"<script type="application/ld+json">{body}</script>"#)
}

fn organization() -> Value {
    json!({ "@type": "Organization", "name": SITE_NAME })
}

fn breadcrumb_list(site: &SiteContext, steps: &[(&str, &str)]) -> Value {
    json!({
        "@type": "BreadcrumbList",
        "itemListElement": steps
            .iter()
            .enumerate()
            .map(|(i, (name, path))| json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": name,
                "item": site.absolute(path),
            }))
            .collect::<Vec<_>>(),
    })
}

pub fn sign_json_ld(site: &SiteContext, sign: &SignRecord, summary: &str) -> Value {
    let page = sign.page_file();
    json!({
        "@context": "https://schema.org",
        "@graph": [
            {
                "@type": "Article",
                "headline": format!("Horoscope {} du {}", sign.name, french_long_date(site.today)),
                "description": summary,
                "datePublished": site.today.to_string(),
                "image": site.absolute(&format!("assets/{}", sign.image)),
                "mainEntityOfPage": site.absolute(&page),
                "articleSection": "Horoscope du jour",
                "author": organization(),
                "publisher": organization(),
            },
            breadcrumb_list(site, &[("Accueil", ""), (sign.name.as_str(), page.as_str())]),
        ]
    })
}

pub fn article_json_ld(site: &SiteContext, article: &Article) -> Value {
    let page = article.page_path();
    json!({
        "@context": "https://schema.org",
        "@graph": [
            {
                "@type": "BlogPosting",
                "headline": article.title,
                "about": article.subject,
                "articleSection": article.category,
                "datePublished": site.today.to_string(),
                "image": site.absolute(&format!("assets/{}", article.image)),
                "mainEntityOfPage": site.absolute(&page),
                "author": organization(),
                "publisher": organization(),
            },
            breadcrumb_list(
                site,
                &[("Accueil", ""), ("Blog", "blog.html"), (article.title.as_str(), page.as_str())],
            ),
        ]
    })
}

pub fn website_json_ld(site: &SiteContext) -> Value {
    json!({
        "@context": "https://schema.org",
        "@type": "WebSite",
        "name": SITE_NAME,
        "url": site.absolute(""),
        "inLanguage": "fr-FR",
    })
}

pub fn webpage_json_ld(site: &SiteContext, label: &str, path: &str) -> Value {
    json!({
        "@context": "https://schema.org",
        "@graph": [
            {
                "@type": "WebPage",
                "name": label,
                "url": site.absolute(path),
                "isPartOf": { "@type": "WebSite", "name": SITE_NAME, "url": site.absolute("") },
            },
            breadcrumb_list(site, &[("Accueil", ""), (label, path)]),
        ]
    })
}

/// Shared footer: home, every sign, the blog when present, static pages.
pub fn footer(site: &SiteContext, prefix: &str) -> String {
    let link = |label: &str, href: &str| {
        format!(
            r#"<a href="{prefix}{}" class="hover:text-black">{}</a>"#,
            escape_href(href),
            escape_html(label)
        )
    };

    let signs: Vec<String> = site.signs.iter().map(|l| link(&l.label, &l.href)).collect();
    let mut pages = vec![link("Accueil", "index.html")];
    if site.has_blog {
        pages.push(link("Blog", "blog.html"));
    }
    pages.extend(site.pages.iter().map(|l| link(&l.label, &l.href)));

    format!(
        r#"<footer class="text-center py-10 text-gray-400 text-xs relative z-10">
    <nav aria-label="Signes" class="flex flex-wrap justify-center gap-4 mb-4 uppercase tracking-widest">{}</nav>
    <nav aria-label="Pages" class="flex flex-wrap justify-center gap-4 mb-6">{}</nav>
    <p>© {} {}</p>
</footer>"#,
        signs.join("\n        "),
        pages.join("\n        "),
        site.today.year(),
        SITE_NAME
    )
}
