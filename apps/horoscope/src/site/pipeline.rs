//! Site build: sequences the whole run.
//!
//! Flow: load inputs → generate predictions → sign pages → index → articles →
//!       static pages → assets → sitemap + robots.
//!
//! Every file is rewritten in place, so a rerun over an existing output
//! directory converges on the same result.

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::config::{Config, GenerationMode};
use crate::dates::today;
use crate::errors::AppError;
use crate::generation::articles::generate_article_body;
use crate::generation::generator::ContentGenerator;
use crate::llm_client::{LlmClient, RetryPolicy};
use crate::models::{load_articles, load_required_list, load_required_text, SignRecord};
use crate::render::pages::{
    check_article_template, check_sign_template, decorate_static_page, render_article_page,
    render_sign_page,
};
use crate::render::{NavLink, SiteContext};
use crate::site::assets::{copy_assets, find_entrance_image};
use crate::site::index::{build_blog_index, build_index};
use crate::site::seo::{robots, sitemap};
use crate::site::static_pages::load_static_pages;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// What a run produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub sign_pages: usize,
    pub generated: usize,
    pub fallback: usize,
    pub articles: usize,
    pub static_pages: usize,
    pub assets: usize,
}

/// Applies the credential policy and builds the generation client.
///
/// - `Off`: no client.
/// - `Auto`: no client when the credential is missing.
/// - `Required`: a missing credential is fatal.
pub fn resolve_llm(config: &Config) -> Result<Option<LlmClient>, AppError> {
    let retry = RetryPolicy {
        max_attempts: config.max_attempts,
        backoff: config.backoff,
    };

    match (config.generation, &config.api_key) {
        (GenerationMode::Off, _) => {
            info!("Generation is off; pages will use static content");
            Ok(None)
        }
        (GenerationMode::Auto, None) => {
            info!("{} is not set; pages will use static content", API_KEY_VAR);
            Ok(None)
        }
        (GenerationMode::Required, None) => {
            Err(AppError::MissingCredential { var: API_KEY_VAR })
        }
        (_, Some(key)) => Ok(Some(LlmClient::new(
            key.clone(),
            config.model.clone(),
            retry,
        )?)),
    }
}

fn write_page(output_dir: &Path, relative: &str, contents: &str) -> Result<(), AppError> {
    let path = output_dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, contents)?;
    Ok(())
}

fn warn_on_duplicate_slugs(signs: &[SignRecord]) {
    let mut seen = HashSet::new();
    for sign in signs {
        if !seen.insert(sign.slug.as_str()) {
            warn!("Duplicate slug '{}'; a later page will overwrite an earlier one", sign.slug);
        }
    }
}

/// Runs the full build. Fails only on missing or invalid required inputs,
/// template contract violations and filesystem errors; generation problems
/// degrade to fallback content.
pub async fn build_site(config: &Config, llm: Option<LlmClient>) -> Result<RunSummary, AppError> {
    // Step 1: required inputs, before anything is written
    let signs: Vec<SignRecord> = load_required_list(&config.signs_path)?;
    let template = load_required_text(&config.template_path)?;
    check_sign_template(&template, &config.template_path.display().to_string())?;
    info!("Loaded {} signs and the page template", signs.len());
    warn_on_duplicate_slugs(&signs);

    // Step 2: optional inputs
    let articles = load_articles(&config.articles_path, &config.article_template_path)?;
    if let Some((_, article_template)) = &articles {
        check_article_template(
            article_template,
            &config.article_template_path.display().to_string(),
        )?;
    }
    let static_pages = load_static_pages(&config.pages_dir, &config.static_pages)?;

    let site = SiteContext {
        site_url: config.site_url.clone(),
        today: today(),
        signs: signs
            .iter()
            .map(|s| NavLink {
                label: s.name.clone(),
                href: s.page_file(),
            })
            .collect(),
        pages: static_pages.iter().map(|p| p.nav_link()).collect(),
        has_blog: articles.as_ref().is_some_and(|(list, _)| !list.is_empty()),
    };

    std::fs::create_dir_all(&config.output_dir)?;
    let mut summary = RunSummary::default();

    // Step 3: predictions
    let generator = ContentGenerator::new(llm, config);
    let predictions = generator.predict(&signs).await;
    summary.generated = predictions.iter().filter(|p| p.is_generated()).count();
    summary.fallback = predictions.len() - summary.generated;

    // Step 4: sign pages
    info!("Writing sign pages...");
    for (position, (sign, prediction)) in signs.iter().zip(&predictions).enumerate() {
        let html = render_sign_page(&template, &signs, position, &prediction.prediction, &site)?;
        write_page(&config.output_dir, &sign.page_file(), &html)?;
        summary.sign_pages += 1;
    }

    // Step 5: index
    let entrance = find_entrance_image(&config.assets_dir);
    if entrance.is_none() {
        info!("No image found for the home page hero");
    }
    let index = build_index(&signs, Some(predictions.as_slice()), entrance.as_deref(), &site);
    write_page(&config.output_dir, "index.html", &index)?;

    // Step 6: blog
    let mut routes: Vec<String> = vec![String::new()];
    routes.extend(static_pages.iter().map(|p| p.file.clone()));

    if let Some((list, article_template)) = &articles {
        info!("Writing {} articles...", list.len());
        for (i, article) in list.iter().enumerate() {
            if i > 0 && generator.llm().is_some() && !config.request_interval.is_zero() {
                tokio::time::sleep(config.request_interval).await;
            }
            let body = generate_article_body(generator.llm(), article).await;
            let html = render_article_page(article_template, article, &body, &site)?;
            write_page(&config.output_dir, &article.page_path(), &html)?;
            summary.articles += 1;
        }
        if !list.is_empty() {
            write_page(&config.output_dir, "blog.html", &build_blog_index(list, &site))?;
            routes.push("blog.html".to_string());
        }
    }

    // Step 7: static pages
    for page in &static_pages {
        let html = decorate_static_page(&page.html, &page.label, &page.file, &site);
        write_page(&config.output_dir, &page.file, &html)?;
        summary.static_pages += 1;
    }

    // Step 8: assets
    summary.assets = copy_assets(&config.assets_dir, &config.output_dir.join("assets"))?;

    // Step 9: SEO files
    routes.extend(signs.iter().map(SignRecord::page_file));
    if let Some((list, _)) = &articles {
        routes.extend(list.iter().map(|a| a.page_path()));
    }
    write_page(&config.output_dir, "sitemap.xml", &sitemap(&site, &routes, site.today))?;
    write_page(&config.output_dir, "robots.txt", &robots(&site))?;

    info!(
        "Site written to {}: {} sign pages ({} generated, {} fallback), {} articles, {} static pages, {} assets",
        config.output_dir.display(),
        summary.sign_pages,
        summary.generated,
        summary.fallback,
        summary.articles,
        summary.static_pages,
        summary.assets
    );
    Ok(summary)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
