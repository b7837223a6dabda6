use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

/// Whether the run calls the text-generation API, and what a missing
/// credential means for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Never call the API; every page gets fallback content.
    Off,
    /// Generate when a credential is present, otherwise use fallback content.
    Auto,
    /// A missing credential aborts the run before any output is written.
    Required,
}

impl FromStr for GenerationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "disabled" | "static" => Ok(GenerationMode::Off),
            "auto" => Ok(GenerationMode::Auto),
            "required" | "strict" => Ok(GenerationMode::Required),
            other => Err(anyhow!("unknown generation mode '{other}'")),
        }
    }
}

/// How predictions are requested from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One request for all signs.
    Batched,
    /// One request per sign, spaced by `request_interval`.
    PerSign,
}

impl FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "batched" | "batch" => Ok(Strategy::Batched),
            "per_sign" => Ok(Strategy::PerSign),
            other => Err(anyhow!("unknown generation strategy '{other}'")),
        }
    }
}

/// Run configuration loaded from environment variables.
/// Read once at startup and passed to each component.
#[derive(Debug, Clone)]
pub struct Config {
    pub signs_path: PathBuf,
    pub template_path: PathBuf,
    pub articles_path: PathBuf,
    pub article_template_path: PathBuf,
    pub pages_dir: PathBuf,
    pub static_pages: Vec<String>,
    pub assets_dir: PathBuf,
    pub output_dir: PathBuf,
    pub site_url: String,
    pub generation: GenerationMode,
    pub strategy: Strategy,
    pub max_attempts: u32,
    pub backoff: Duration,
    pub request_interval: Duration,
    pub model: String,
    pub expose_errors: bool,
    /// Trimmed; `None` when unset or blank.
    pub api_key: Option<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            signs_path: env_or("HOROSCOPE_SIGNS_PATH", "./signs.json").into(),
            template_path: env_or("HOROSCOPE_TEMPLATE_PATH", "./template.html").into(),
            articles_path: env_or("HOROSCOPE_ARTICLES_PATH", "./articles.json").into(),
            article_template_path: env_or(
                "HOROSCOPE_ARTICLE_TEMPLATE_PATH",
                "./template-article.html",
            )
            .into(),
            pages_dir: env_or("HOROSCOPE_PAGES_DIR", "./pages").into(),
            static_pages: parse_list(&env_or(
                "HOROSCOPE_STATIC_PAGES",
                "a-propos.html,contact.html,mentions-legales.html",
            )),
            assets_dir: env_or("HOROSCOPE_ASSETS_DIR", "./assets").into(),
            output_dir: env_or("HOROSCOPE_OUTPUT_DIR", "./public").into(),
            site_url: env_or("HOROSCOPE_SITE_URL", "https://www.horoscope-authentique.fr")
                .trim_end_matches('/')
                .to_string(),
            generation: parse_env("HOROSCOPE_GENERATION", "auto")?,
            strategy: parse_env("HOROSCOPE_STRATEGY", "batched")?,
            max_attempts: parse_env::<u32>("HOROSCOPE_MAX_ATTEMPTS", "3")?.max(1),
            backoff: Duration::from_secs(parse_env("HOROSCOPE_BACKOFF_SECS", "10")?),
            request_interval: Duration::from_secs(parse_env(
                "HOROSCOPE_REQUEST_INTERVAL_SECS",
                "4",
            )?),
            model: env_or("HOROSCOPE_MODEL", "gemini-1.5-flash"),
            expose_errors: parse_env("HOROSCOPE_EXPOSE_ERRORS", "false")?,
            api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .and_then(|key| normalize_credential(&key)),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// A configuration rooted at `root`, with generation disabled and
    /// zero delays. Used by tests.
    #[cfg(test)]
    pub fn for_root(root: &std::path::Path) -> Self {
        Config {
            signs_path: root.join("signs.json"),
            template_path: root.join("template.html"),
            articles_path: root.join("articles.json"),
            article_template_path: root.join("template-article.html"),
            pages_dir: root.join("pages"),
            static_pages: vec!["a-propos.html".to_string(), "contact.html".to_string()],
            assets_dir: root.join("assets"),
            output_dir: root.join("public"),
            site_url: "https://example.test".to_string(),
            generation: GenerationMode::Off,
            strategy: Strategy::Batched,
            max_attempts: 3,
            backoff: Duration::from_secs(10),
            request_interval: Duration::from_secs(4),
            model: "test-model".to_string(),
            expose_errors: false,
            api_key: None,
            rust_log: "debug".to_string(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env_or(key, default);
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'"))
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trims the credential; a blank value counts as missing.
pub fn normalize_credential(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
