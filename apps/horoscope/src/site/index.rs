//! Site Assembler: the home page and the blog listing.

use crate::generation::prediction::SignPrediction;
use crate::models::{Article, SignRecord};
use crate::render::fragments::{footer, structured_data, website_json_ld};
use crate::render::slots::{inject, Slot};
use crate::render::template::{escape_href, escape_html};
use crate::render::{SiteContext, SITE_NAME};

const TEASER_CHARS: usize = 90;

/// Animation delay for card `i`, in seconds. Spread over 0.0–1.9s without
/// randomness so reruns produce identical output.
fn card_delay(i: usize) -> f32 {
    ((i * 7) % 20) as f32 / 10.0
}

/// Shortens `text` to at most `max` characters, on a word boundary.
fn teaser(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    let cut = match cut.rfind(' ') {
        Some(space) => &cut[..space],
        None => cut.as_str(),
    };
    format!("{}…", cut.trim_end_matches([',', ';', ':', '.']))
}

fn sign_card(i: usize, sign: &SignRecord, prediction: Option<&SignPrediction>) -> String {
    let excerpt = match prediction {
        Some(p) if p.is_generated() => format!(
            r#"
                <p class="text-[10px] text-gray-500 normal-case mt-2 font-sans">{}</p>"#,
            escape_html(&teaser(&p.prediction.amour, TEASER_CHARS))
        ),
        _ => String::new(),
    };

    format!(
        r#"
    <a href="{slug}.html" class="card-link group block" style="animation-delay: {delay:.2}s">
        <div class="flex flex-col items-center p-4 transition-transform duration-500 hover:scale-[1.01] h-auto">
            <img src="assets/{image}" alt="{name}" class="w-full h-auto drop-shadow-xl mb-4 relative z-10 block">
            <div class="text-center relative z-10 mt-auto">
                <h2 class="text-lg text-gray-800 font-cinzel group-hover:text-[#D4AF37] transition-colors font-bold">{name}</h2>
                <p class="text-[9px] text-gray-400 uppercase tracking-widest mt-1">{date}</p>{excerpt}
            </div>
        </div>
    </a>"#,
        slug = escape_href(&sign.slug),
        delay = card_delay(i),
        image = escape_href(&sign.image),
        name = escape_html(&sign.name),
        date = escape_html(&sign.date),
    )
}

fn page_shell(title: &str, header: &str, main: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <link href="https://fonts.googleapis.com/css2?family=Cinzel:wght@400;700&display=swap" rel="stylesheet">
    <style>
        body {{ background-color: #FAFAFA; font-family: 'Cinzel', serif; }}
        @keyframes float {{
            0% {{ transform: translateY(0px); }}
            50% {{ transform: translateY(-5px); }}
            100% {{ transform: translateY(0px); }}
        }}
        .card-link {{ animation: float 7s ease-in-out infinite; }}
    </style>
</head>
<body class="min-h-screen flex flex-col bg-[#FAFAFA] selection:bg-black selection:text-white">
{header}
    <main class="flex-grow container mx-auto px-4 pb-24 relative z-10">
{main}
    </main>
</body>
</html>
"#
    )
}

/// Builds `index.html`: a hero (with the entrance image when one exists) and
/// one card per sign, in input order. `predictions`, when given, is aligned
/// with `signs` and adds a teaser under generated cards.
pub fn build_index(
    signs: &[SignRecord],
    predictions: Option<&[SignPrediction]>,
    entrance_image: Option<&str>,
    site: &SiteContext,
) -> String {
    let cards: String = signs
        .iter()
        .enumerate()
        .map(|(i, sign)| sign_card(i, sign, predictions.and_then(|p| p.get(i))))
        .collect();

    let hero = entrance_image
        .map(|image| {
            format!(
                r#"
            <img src="assets/{}" alt="Entrée de la maison" class="w-40 h-auto mx-auto mt-10">"#,
                escape_href(image)
            )
        })
        .unwrap_or_default();

    let header = format!(
        r#"    <header class="text-center py-16 px-4 relative z-20">
        <p class="text-xs tracking-[0.4em] uppercase text-gray-400 mb-6 font-bold">Bienvenue à la maison</p>
        <div class="flex flex-col items-center">
            <h1 class="text-5xl md:text-7xl font-bold text-black tracking-tight mb-4">HOROSCOPE</h1>
            <div class="w-24 h-[1px] bg-black mb-4"></div>
            <h2 class="text-3xl md:text-5xl text-black tracking-[0.2em] font-normal">AUTHENTIQUE</h2>{hero}
        </div>
    </header>"#
    );
    let main = format!(
        r#"        <div class="grid grid-cols-2 md:grid-cols-3 lg:grid-cols-4 gap-4 md:gap-8 max-w-7xl mx-auto items-end">{cards}
        </div>"#
    );

    let html = page_shell(
        &format!("Horoscope Authentique - {SITE_NAME}"),
        &header,
        &main,
    );
    let html = inject(&html, Slot::StructuredData, &structured_data(&website_json_ld(site)));
    inject(&html, Slot::Footer, &footer(site, ""))
}

/// Builds `blog.html`, one entry per article in input order.
pub fn build_blog_index(articles: &[Article], site: &SiteContext) -> String {
    let entries: String = articles
        .iter()
        .map(|article| {
            format!(
                r#"
            <a href="{path}" class="block group">
                <img src="assets/{image}" alt="{title}" class="w-full h-48 object-cover mb-4">
                <p class="text-[9px] text-gray-400 uppercase tracking-widest">{category}</p>
                <h2 class="text-lg text-gray-800 group-hover:text-[#D4AF37] font-bold">{title}</h2>
            </a>"#,
                path = escape_href(&article.page_path()),
                image = escape_href(&article.image),
                title = escape_html(&article.title),
                category = escape_html(&article.category),
            )
        })
        .collect();

    let header = r#"    <header class="text-center py-16 px-4">
        <h1 class="text-4xl md:text-6xl font-bold text-black tracking-tight">LE BLOG</h1>
    </header>"#;
    let main = format!(
        r#"        <div class="grid grid-cols-1 md:grid-cols-3 gap-8 max-w-6xl mx-auto">{entries}
        </div>"#
    );

    let html = page_shell(&format!("Blog - {SITE_NAME}"), header, &main);
    let html = inject(&html, Slot::StructuredData, &structured_data(&website_json_ld(site)));
    inject(&html, Slot::Footer, &footer(site, ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::prediction::Prediction;
    use crate::models::sign::fixture_signs;
    use crate::render::fixture_site;
    use crate::render::slots::slot_count;

    #[test]
    fn test_index_lists_every_sign_in_order() {
        let signs = fixture_signs();
        let html = build_index(&signs, None, Some("entrance.png"), &fixture_site());

        assert_eq!(html.matches("class=\"card-link").count(), 12);
        let positions: Vec<usize> = signs
            .iter()
            .map(|s| html.find(&format!("<a href=\"{}.html\" class=\"card-link", s.slug)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(html.contains(r#"src="assets/entrance.png""#));
        assert_eq!(slot_count(&html, Slot::Footer), 1);
    }

    #[test]
    fn test_index_without_entrance_image_omits_hero() {
        let html = build_index(&fixture_signs(), None, None, &fixture_site());
        assert!(!html.contains("Entrée de la maison"));
    }

    #[test]
    fn test_index_is_deterministic() {
        let signs = fixture_signs();
        let site = fixture_site();
        assert_eq!(
            build_index(&signs, None, None, &site),
            build_index(&signs, None, None, &site)
        );
    }

    #[test]
    fn test_generated_predictions_add_teasers() {
        let signs = fixture_signs()[..2].to_vec();
        let predictions = vec![
            SignPrediction::generated(Prediction {
                amour: "Vénus vous sourit.".to_string(),
                travail: "t".to_string(),
                sante: "s".to_string(),
            }),
            SignPrediction::static_content(),
        ];
        let html = build_index(&signs, Some(predictions.as_slice()), None, &fixture_site());
        assert!(html.contains("Vénus vous sourit."));
        assert!(!html.contains(&Prediction::fallback().amour));
    }

    #[test]
    fn test_teaser_cuts_on_word_boundary() {
        assert_eq!(teaser("court", 10), "court");
        assert_eq!(teaser("une phrase beaucoup trop longue", 12), "une phrase…");
    }

    #[test]
    fn test_card_delay_stays_under_two_seconds() {
        assert!((0..12).map(card_delay).all(|d| (0.0..2.0).contains(&d)));
    }

    #[test]
    fn test_blog_index_links_articles() {
        let articles = vec![Article {
            slug: "eclipse".to_string(),
            title: "L'éclipse".to_string(),
            subject: "s".to_string(),
            category: "Ciel".to_string(),
            image: "eclipse.jpg".to_string(),
        }];
        let html = build_blog_index(&articles, &fixture_site());
        assert!(html.contains(r#"href="blog/eclipse.html""#));
        assert!(html.contains("L'éclipse"));
        assert!(html.contains(r#"src="assets/eclipse.jpg""#));
    }
}
