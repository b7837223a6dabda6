//! Full-page rendering: sign pages, article pages and decorated static pages.

use crate::dates::french_long_date;
use crate::errors::AppError;
use crate::generation::articles::ArticleBody;
use crate::generation::prediction::Prediction;
use crate::models::{Article, SignRecord};
use crate::render::fragments::{
    article_json_ld, breadcrumb, cross_sell, footer, sign_json_ld, structured_data,
    webpage_json_ld, Crumb,
};
use crate::render::slots::{inject, Slot};
use crate::render::template::{check_placeholders, escape_href, escape_html, render_template};
use crate::render::SiteContext;

/// Placeholders a sign page template may use.
pub const SIGN_PLACEHOLDERS: &[&str] = &[
    "name",
    "slug",
    "date",
    "image",
    "horoscope_amour",
    "horoscope_travail",
    "horoscope_sante",
    "today",
];

/// Placeholders an article template may use.
pub const ARTICLE_PLACEHOLDERS: &[&str] =
    &["title", "slug", "subject", "category", "image", "content", "today"];

pub fn check_sign_template(template: &str, source: &str) -> Result<(), AppError> {
    check_placeholders(template, SIGN_PLACEHOLDERS, source)
}

pub fn check_article_template(template: &str, source: &str) -> Result<(), AppError> {
    check_placeholders(template, ARTICLE_PLACEHOLDERS, source)
}

/// Renders the page for `signs[position]` with its prediction, then injects
/// structured data, breadcrumb, cross-sell block and footer.
pub fn render_sign_page(
    template: &str,
    signs: &[SignRecord],
    position: usize,
    prediction: &Prediction,
    site: &SiteContext,
) -> Result<String, AppError> {
    let sign = &signs[position];
    let values = [
        ("name", escape_html(&sign.name)),
        ("slug", escape_href(&sign.slug)),
        ("date", escape_html(&sign.date)),
        ("image", escape_href(&sign.image)),
        ("horoscope_amour", escape_html(&prediction.amour)),
        ("horoscope_travail", escape_html(&prediction.travail)),
        ("horoscope_sante", escape_html(&prediction.sante)),
        ("today", french_long_date(site.today)),
    ];
    let html = render_template(template, &values, &sign.page_file())?;

    let html = inject(
        &html,
        Slot::StructuredData,
        &structured_data(&sign_json_ld(site, sign, &prediction.amour)),
    );
    let html = inject(
        &html,
        Slot::Breadcrumb,
        &breadcrumb(
            &[
                Crumb { label: "Accueil", href: Some("index.html") },
                Crumb { label: &sign.name, href: None },
            ],
            "",
        ),
    );
    let html = inject(&html, Slot::CrossSell, &cross_sell(signs, position));
    Ok(inject(&html, Slot::Footer, &footer(site, "")))
}

/// Renders a blog article page. The page lives under `blog/`, so shared
/// links are prefixed with `../`.
pub fn render_article_page(
    template: &str,
    article: &Article,
    body: &ArticleBody,
    site: &SiteContext,
) -> Result<String, AppError> {
    let content = body
        .paragraphes
        .iter()
        .map(|p| format!("<p>{}</p>", escape_html(p)))
        .collect::<Vec<_>>()
        .join("\n");

    let values = [
        ("title", escape_html(&article.title)),
        ("slug", escape_href(&article.slug)),
        ("subject", escape_html(&article.subject)),
        ("category", escape_html(&article.category)),
        ("image", escape_href(&article.image)),
        ("content", content),
        ("today", french_long_date(site.today)),
    ];
    let html = render_template(template, &values, &article.page_path())?;

    let html = inject(
        &html,
        Slot::StructuredData,
        &structured_data(&article_json_ld(site, article)),
    );
    let html = inject(
        &html,
        Slot::Breadcrumb,
        &breadcrumb(
            &[
                Crumb { label: "Accueil", href: Some("index.html") },
                Crumb { label: "Blog", href: Some("blog.html") },
                Crumb { label: &article.title, href: None },
            ],
            "../",
        ),
    );
    Ok(inject(&html, Slot::Footer, &footer(site, "../")))
}

/// Adds the shared fragments to a hand-written page copied from the pages
/// directory. Safe to apply to a page that was decorated before.
pub fn decorate_static_page(html: &str, label: &str, file: &str, site: &SiteContext) -> String {
    let html = inject(
        html,
        Slot::StructuredData,
        &structured_data(&webpage_json_ld(site, label, file)),
    );
    let html = inject(
        &html,
        Slot::Breadcrumb,
        &breadcrumb(
            &[
                Crumb { label: "Accueil", href: Some("index.html") },
                Crumb { label, href: None },
            ],
            "",
        ),
    );
    inject(&html, Slot::Footer, &footer(site, ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sign::fixture_signs;
    use crate::render::fixture_site;
    use crate::render::slots::slot_count;

    const SIGN_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="fr">
<head><title>Horoscope {{name}}</title></head>
<body>
<main>
<h1>{{name}}</h1><p>{{date}}</p><img src="assets/{{image}}" alt="{{name}}">
<section id="amour">{{horoscope_amour}}</section>
<section id="travail">{{horoscope_travail}}</section>
<section id="sante">{{horoscope_sante}}</section>
<a href="{{slug}}.html">{{today}}</a>
</main>
<footer>ancien pied de page</footer>
</body>
</html>"#;

    fn prediction() -> Prediction {
        Prediction {
            amour: "Un aveu <inattendu>.".to_string(),
            travail: "Une réunion décisive.".to_string(),
            sante: "Marchez davantage.".to_string(),
        }
    }

    #[test]
    fn test_sign_page_substitutes_and_injects() {
        let signs = fixture_signs();
        let html = render_sign_page(SIGN_TEMPLATE, &signs, 2, &prediction(), &fixture_site()).unwrap();

        assert_eq!(html.matches("<h1>Gémeaux</h1>").count(), 1);
        assert!(html.contains("Un aveu &lt;inattendu&gt;."));
        assert!(html.contains("Une réunion décisive."));
        assert!(html.contains("lundi 19 octobre 2026"));
        assert!(!html.contains("ancien pied de page"));
        for slot in [Slot::StructuredData, Slot::Breadcrumb, Slot::CrossSell, Slot::Footer] {
            assert_eq!(slot_count(&html, slot), 1);
        }
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_sign_page_with_unknown_placeholder_fails() {
        let signs = fixture_signs();
        let template = format!("{SIGN_TEMPLATE}{{{{horoscope_argent}}}}");
        let err = render_sign_page(&template, &signs, 0, &prediction(), &fixture_site()).unwrap_err();
        assert!(matches!(err, AppError::UnresolvedPlaceholders { .. }));
    }

    #[test]
    fn test_template_checks_accept_every_rendered_placeholder() {
        assert!(check_sign_template(SIGN_TEMPLATE, "template.html").is_ok());
        assert!(check_article_template("{{title}}{{content}}{{today}}", "a.html").is_ok());

        let err = check_sign_template("{{name}}{{content}}", "template.html").unwrap_err();
        assert!(matches!(err, AppError::UnresolvedPlaceholders { tokens, .. } if tokens == ["{{content}}"]));
    }

    #[test]
    fn test_sign_page_without_main_still_renders() {
        let signs = fixture_signs();
        let template = "<html><body><h1>{{name}}</h1>{{horoscope_amour}}{{horoscope_travail}}{{horoscope_sante}}</body></html>";
        let html = render_sign_page(template, &signs, 0, &prediction(), &fixture_site()).unwrap();
        assert_eq!(slot_count(&html, Slot::Breadcrumb), 0);
        assert_eq!(slot_count(&html, Slot::CrossSell), 0);
        assert_eq!(slot_count(&html, Slot::Footer), 1);
    }

    #[test]
    fn test_article_page_renders_paragraphs_and_nested_links() {
        let article = Article {
            slug: "pleine-lune".to_string(),
            title: "La pleine lune".to_string(),
            subject: "ses effets".to_string(),
            category: "Lune".to_string(),
            image: "lune.jpg".to_string(),
        };
        let body = ArticleBody {
            paragraphes: vec!["Un.".to_string(), "Deux & trois.".to_string()],
        };
        let template = "<html><head></head><body><main><h1>{{title}}</h1>{{content}}</main></body></html>";

        let html = render_article_page(template, &article, &body, &fixture_site()).unwrap();

        assert!(html.contains("<p>Un.</p>\n<p>Deux &amp; trois.</p>"));
        assert!(html.contains(r#"href="../blog.html""#));
        assert!(html.contains(r#"href="../index.html""#));
    }

    #[test]
    fn test_static_page_decoration_is_idempotent() {
        let site = fixture_site();
        let page = "<html><head></head><body><main><h1>Contact</h1></main><footer>old</footer></body></html>";
        let once = decorate_static_page(page, "Contact", "contact.html", &site);
        let twice = decorate_static_page(&once, "Contact", "contact.html", &site);
        assert_eq!(once, twice);
        assert_eq!(twice.matches("<footer").count(), 1);
    }
}
