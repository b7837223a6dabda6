//! Article bodies for the optional blog pages.

use serde::Deserialize;
use tracing::{info, warn};

use crate::generation::prompts::ARTICLE_PROMPT_TEMPLATE;
use crate::llm_client::prompts::{HOUSE_STYLE, JSON_ONLY_INSTRUCTION};
use crate::llm_client::LlmClient;
use crate::models::Article;

const FALLBACK_PARAGRAPH: &str = "Cet article est en cours de rédaction par nos astrologues. \
    Revenez très bientôt pour le découvrir en intégralité.";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArticleBody {
    #[serde(alias = "paragraphs")]
    pub paragraphes: Vec<String>,
}

impl ArticleBody {
    pub fn fallback() -> Self {
        Self {
            paragraphes: vec![FALLBACK_PARAGRAPH.to_string()],
        }
    }

    fn cleaned(self) -> Option<Self> {
        let paragraphes: Vec<String> = self
            .paragraphes
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        (!paragraphes.is_empty()).then_some(Self { paragraphes })
    }
}

pub fn build_article_prompt(article: &Article) -> String {
    ARTICLE_PROMPT_TEMPLATE
        .replace("{house_style}", HOUSE_STYLE)
        .replace("{title}", &article.title)
        .replace("{subject}", &article.subject)
        .replace("{category}", &article.category)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
}

/// Generates the body of `article`, or the fallback paragraph when
/// generation is disabled or fails.
pub async fn generate_article_body(llm: Option<&LlmClient>, article: &Article) -> ArticleBody {
    let Some(llm) = llm else {
        return ArticleBody::fallback();
    };

    match llm
        .call_json::<ArticleBody>(&build_article_prompt(article))
        .await
    {
        Ok(body) => match body.cleaned() {
            Some(body) => {
                info!(
                    "Generated article '{}' ({} paragraphs)",
                    article.slug,
                    body.paragraphes.len()
                );
                body
            }
            None => {
                warn!("Article '{}' came back empty; using fallback", article.slug);
                ArticleBody::fallback()
            }
        },
        Err(e) => {
            warn!("Article '{}' generation failed: {}; using fallback", article.slug, e);
            ArticleBody::fallback()
        }
    }
}
