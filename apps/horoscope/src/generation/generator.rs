//! Content Generator: turns the sign list into one prediction per sign.
//!
//! Flow: build prompt → llm_client::call_json (bounded retry) → match response
//!       keys to signs → fill gaps with fallback content.
//!
//! Generation never fails the run: every sign leaves here with a prediction,
//! generated or fallback.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{Config, Strategy};
use crate::dates::{french_long_date, today};
use crate::generation::matching::KeyedResponse;
use crate::generation::prediction::{Prediction, RawPrediction, SignPrediction};
use crate::generation::prompts::HOROSCOPE_PROMPT_TEMPLATE;
use crate::llm_client::prompts::{HOUSE_STYLE, JSON_ONLY_INSTRUCTION};
use crate::llm_client::LlmClient;
use crate::models::SignRecord;

const MISSING_KEY_REASON: &str = "signe absent de la réponse";
const EMPTY_ENTRY_REASON: &str = "réponse vide pour ce signe";

pub struct ContentGenerator {
    /// `None` when generation is disabled for this run.
    llm: Option<LlmClient>,
    strategy: Strategy,
    /// Pause between per-sign requests, to stay under the API rate limit.
    request_interval: Duration,
    expose_errors: bool,
}

impl ContentGenerator {
    pub fn new(llm: Option<LlmClient>, config: &Config) -> Self {
        Self {
            llm,
            strategy: config.strategy,
            request_interval: config.request_interval,
            expose_errors: config.expose_errors,
        }
    }

    pub fn llm(&self) -> Option<&LlmClient> {
        self.llm.as_ref()
    }

    /// Returns one prediction per sign, in the order of `signs`.
    pub async fn predict(&self, signs: &[SignRecord]) -> Vec<SignPrediction> {
        let Some(llm) = &self.llm else {
            info!("Generation disabled; using static content for {} signs", signs.len());
            return signs.iter().map(|_| SignPrediction::static_content()).collect();
        };
        if signs.is_empty() {
            return Vec::new();
        }

        let predictions = match self.strategy {
            Strategy::Batched => self.predict_batched(llm, signs).await,
            Strategy::PerSign => self.predict_per_sign(llm, signs).await,
        };

        let generated = predictions.iter().filter(|p| p.is_generated()).count();
        info!(
            "Predictions ready: {} generated, {} fallback",
            generated,
            predictions.len() - generated
        );
        predictions
    }

    async fn predict_batched(&self, llm: &LlmClient, signs: &[SignRecord]) -> Vec<SignPrediction> {
        info!("Requesting predictions for {} signs in one call", signs.len());
        match llm
            .call_json::<HashMap<String, Value>>(&build_prompt(signs))
            .await
        {
            Ok(raw) => {
                let response = KeyedResponse::new(raw);
                debug!(
                    "Response carried {} keys for {} signs",
                    response.key_count(),
                    signs.len()
                );
                signs
                    .iter()
                    .map(|sign| self.resolve_entry(sign, response.entry_for(sign)))
                    .collect()
            }
            Err(e) => {
                warn!("Batched generation failed: {}; every sign uses fallback content", e);
                signs
                    .iter()
                    .map(|_| SignPrediction::failed(e.to_string(), self.expose_errors))
                    .collect()
            }
        }
    }

    async fn predict_per_sign(&self, llm: &LlmClient, signs: &[SignRecord]) -> Vec<SignPrediction> {
        let mut predictions = Vec::with_capacity(signs.len());

        for (i, sign) in signs.iter().enumerate() {
            if i > 0 && !self.request_interval.is_zero() {
                tokio::time::sleep(self.request_interval).await;
            }
            info!("Requesting prediction {}/{}: {}", i + 1, signs.len(), sign.name);

            let prediction = match llm
                .call_json::<HashMap<String, Value>>(&build_prompt(std::slice::from_ref(sign)))
                .await
            {
                Ok(raw) if is_bare_prediction(&raw) => {
                    let entry = Value::Object(raw.into_iter().collect());
                    self.resolve_entry(sign, Some(&entry))
                }
                Ok(raw) => self.resolve_entry(sign, KeyedResponse::new(raw).entry_for(sign)),
                Err(e) => {
                    warn!("Generation for {} failed: {}; using fallback", sign.name, e);
                    SignPrediction::failed(e.to_string(), self.expose_errors)
                }
            };
            predictions.push(prediction);
        }

        predictions
    }

    fn resolve_entry(&self, sign: &SignRecord, entry: Option<&Value>) -> SignPrediction {
        let Some(entry) = entry else {
            warn!("No prediction for {} in the response; using fallback", sign.name);
            return SignPrediction::failed(MISSING_KEY_REASON, self.expose_errors);
        };

        let raw = serde_json::from_value::<RawPrediction>(entry.clone()).unwrap_or_default();
        match Prediction::from_generated(raw) {
            Some(prediction) => SignPrediction::generated(prediction),
            None => {
                warn!("Empty prediction for {}; using fallback", sign.name);
                SignPrediction::failed(EMPTY_ENTRY_REASON, self.expose_errors)
            }
        }
    }
}

/// A per-sign response may skip the sign-name level and return the three
/// fields directly.
fn is_bare_prediction(raw: &HashMap<String, Value>) -> bool {
    ["amour", "travail", "sante", "santé"]
        .iter()
        .any(|field| raw.get(*field).is_some_and(Value::is_string))
}

/// Builds the horoscope prompt for `signs`, keyed by their exact names.
pub fn build_prompt(signs: &[SignRecord]) -> String {
    let sign_list = signs
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let example_key = signs.first().map(|s| s.name.as_str()).unwrap_or("Bélier");

    HOROSCOPE_PROMPT_TEMPLATE
        .replace("{house_style}", HOUSE_STYLE)
        .replace("{today}", &french_long_date(today()))
        .replace("{sign_list}", &sign_list)
        .replace("{example_key}", example_key)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
