//! Prediction: the love/work/health copy shown on a sign page.

use serde::{Deserialize, Serialize};

pub const FALLBACK_AMOUR: &str =
    "Les énergies planétaires favorisent une connexion intense aujourd'hui.";
pub const FALLBACK_TRAVAIL: &str = "La rigueur est votre alliée aujourd'hui.";
pub const FALLBACK_SANTE: &str = "Prenez le temps de vous ressourcer.";

/// The three text fields of a sign's daily horoscope.
/// Never empty once constructed: see [`Prediction::from_generated`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub amour: String,
    pub travail: String,
    pub sante: String,
}

/// One sign's entry as the model returns it. Every field is optional so a
/// partially filled entry still deserializes.
#[derive(Debug, Default, Deserialize)]
pub struct RawPrediction {
    #[serde(default, alias = "love")]
    pub amour: Option<String>,
    #[serde(default, alias = "work")]
    pub travail: Option<String>,
    #[serde(default, alias = "santé", alias = "health")]
    pub sante: Option<String>,
}

/// Where a sign's prediction came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionSource {
    Generated,
    /// Generation disabled for this run.
    Static,
    /// Generation was attempted and failed.
    Fallback { reason: String },
}

#[derive(Debug, Clone)]
pub struct SignPrediction {
    pub prediction: Prediction,
    pub source: PredictionSource,
}

impl Prediction {
    pub fn fallback() -> Self {
        Self {
            amour: FALLBACK_AMOUR.to_string(),
            travail: FALLBACK_TRAVAIL.to_string(),
            sante: FALLBACK_SANTE.to_string(),
        }
    }

    /// Fallback text with the failure reason appended to each field, so a
    /// degraded page is visibly marked.
    pub fn fallback_with_diagnostic(reason: &str) -> Self {
        let mark = |text: &str| format!("{text} (erreur : {reason})");
        Self {
            amour: mark(FALLBACK_AMOUR),
            travail: mark(FALLBACK_TRAVAIL),
            sante: mark(FALLBACK_SANTE),
        }
    }

    /// Builds a prediction from model output. Blank fields take the fallback
    /// text for that field; returns `None` if every field is blank.
    pub fn from_generated(raw: RawPrediction) -> Option<Self> {
        let clean = |field: Option<String>| {
            field
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let (amour, travail, sante) = (clean(raw.amour), clean(raw.travail), clean(raw.sante));
        if amour.is_none() && travail.is_none() && sante.is_none() {
            return None;
        }
        Some(Self {
            amour: amour.unwrap_or_else(|| FALLBACK_AMOUR.to_string()),
            travail: travail.unwrap_or_else(|| FALLBACK_TRAVAIL.to_string()),
            sante: sante.unwrap_or_else(|| FALLBACK_SANTE.to_string()),
        })
    }
}

impl SignPrediction {
    pub fn generated(prediction: Prediction) -> Self {
        Self {
            prediction,
            source: PredictionSource::Generated,
        }
    }

    pub fn static_content() -> Self {
        Self {
            prediction: Prediction::fallback(),
            source: PredictionSource::Static,
        }
    }

    pub fn failed(reason: impl Into<String>, expose_errors: bool) -> Self {
        let reason = reason.into();
        let prediction = if expose_errors {
            Prediction::fallback_with_diagnostic(&reason)
        } else {
            Prediction::fallback()
        };
        Self {
            prediction,
            source: PredictionSource::Fallback { reason },
        }
    }

    pub fn is_generated(&self) -> bool {
        self.source == PredictionSource::Generated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_fields_are_never_empty() {
        let p = Prediction::fallback();
        assert!(!p.amour.is_empty() && !p.travail.is_empty() && !p.sante.is_empty());
    }

    #[test]
    fn test_blank_generated_field_takes_fallback_text() {
        let raw = RawPrediction {
            amour: Some("Un regard suffit.".to_string()),
            travail: Some("   ".to_string()),
            sante: None,
        };
        let p = Prediction::from_generated(raw).unwrap();
        assert_eq!(p.amour, "Un regard suffit.");
        assert_eq!(p.travail, FALLBACK_TRAVAIL);
        assert_eq!(p.sante, FALLBACK_SANTE);
    }

    #[test]
    fn test_all_blank_generated_is_rejected() {
        assert!(Prediction::from_generated(RawPrediction::default()).is_none());
    }

    #[test]
    fn test_raw_prediction_accepts_accented_sante() {
        let raw: RawPrediction =
            serde_json::from_str(r#"{"amour":"a","travail":"b","santé":"c"}"#).unwrap();
        assert_eq!(raw.sante.as_deref(), Some("c"));
    }

    #[test]
    fn test_failed_with_exposed_errors_shows_reason() {
        let failed = SignPrediction::failed("Rate limited (status 429)", true);
        assert!(failed.prediction.amour.starts_with(FALLBACK_AMOUR));
        assert!(failed.prediction.sante.ends_with("(erreur : Rate limited (status 429))"));
        assert!(!failed.is_generated());
    }

    #[test]
    fn test_failed_without_exposed_errors_is_plain_fallback() {
        let failed = SignPrediction::failed("boom", false);
        assert_eq!(failed.prediction, Prediction::fallback());
    }
}
