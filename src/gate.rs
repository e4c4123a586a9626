//! Validation gate: the single choke point between generators and scoring
//!
//! A rewriting generator is untrusted input. The gate inspects every
//! candidate against structural checks and reverts to the original when a
//! check fails, so the pipeline can never emit something worse than doing
//! nothing. It is a total function: always a usable text, never an error.

use crate::models::RevertReason;
use crate::textutil;
use serde::Deserialize;
use tracing::debug;

/// Tunable gate policy.
///
/// The acceptance window and change cutoff are deployment policy, not fixed
/// constants: tighter bounds preserve meaning, looser bounds let aggressive
/// rewrites through.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Reject candidates shorter than this fraction of the original.
    pub min_ratio: f64,
    /// Reject candidates longer than this fraction of the original.
    pub max_ratio: f64,
    /// Reject when |len(candidate) - len(original)| / len(original) exceeds
    /// this. Stricter than the ratio window on the shrink side.
    pub max_relative_change: f64,
    /// Skip the truncation check for candidates with fewer words than this.
    pub min_words_for_truncation_check: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_ratio: 0.3,
            max_ratio: 1.5,
            max_relative_change: 0.5,
            min_words_for_truncation_check: 3,
        }
    }
}

/// Result of gating one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gated {
    pub text: String,
    /// `Some(reason)` when the candidate was reverted to the original.
    pub reverted: Option<RevertReason>,
}

impl Gated {
    fn passed(text: &str) -> Self {
        Self {
            text: text.to_string(),
            reverted: None,
        }
    }

    fn reverted(original: &str, reason: RevertReason) -> Self {
        Self {
            text: original.to_string(),
            reverted: Some(reason),
        }
    }
}

/// Gate a candidate against the original. Checks run in order: emptiness,
/// length-ratio window, relative change, truncation.
pub fn validate(original: &str, candidate: &str, config: &GateConfig) -> Gated {
    let trimmed = candidate.trim();
    if trimmed == original {
        // An identity candidate changed nothing; there is nothing to revert to.
        return Gated::passed(trimmed);
    }
    if trimmed.is_empty() {
        debug!(reason = %RevertReason::Empty, "candidate reverted");
        return Gated::reverted(original, RevertReason::Empty);
    }

    let orig_len = original.chars().count();
    let cand_len = trimmed.chars().count();

    if orig_len > 0 {
        let ratio = cand_len as f64 / orig_len as f64;
        if ratio < config.min_ratio || ratio > config.max_ratio {
            debug!(ratio, reason = %RevertReason::LengthRatio, "candidate reverted");
            return Gated::reverted(original, RevertReason::LengthRatio);
        }

        let relative_change = (cand_len as f64 - orig_len as f64).abs() / orig_len as f64;
        if relative_change > config.max_relative_change {
            debug!(
                relative_change,
                reason = %RevertReason::RelativeChange,
                "candidate reverted"
            );
            return Gated::reverted(original, RevertReason::RelativeChange);
        }
    }

    let word_count = trimmed.split_whitespace().count();
    if word_count >= config.min_words_for_truncation_check
        && textutil::ends_with_function_word(trimmed)
    {
        debug!(reason = %RevertReason::Truncation, "candidate reverted");
        return Gated::reverted(original, RevertReason::Truncation);
    }

    Gated::passed(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGINAL: &str = "Купме ашарга була инде? Симереп буласыз бит";

    #[test]
    fn test_identity_candidate_never_reverted() {
        let gated = validate(ORIGINAL, ORIGINAL, &GateConfig::default());
        assert_eq!(gated.reverted, None);
        assert_eq!(gated.text, ORIGINAL);
    }

    #[test]
    fn test_empty_candidate_reverts() {
        for candidate in ["", "   ", "\t\n"] {
            let gated = validate(ORIGINAL, candidate, &GateConfig::default());
            assert_eq!(gated.reverted, Some(RevertReason::Empty));
            assert_eq!(gated.text, ORIGINAL);
        }
    }

    #[test]
    fn test_too_short_candidate_reverts() {
        // 20% of the original length — below the 0.3 floor.
        let original = "а".repeat(100);
        let candidate = "б".repeat(20);
        let gated = validate(&original, &candidate, &GateConfig::default());
        assert_eq!(gated.reverted, Some(RevertReason::LengthRatio));
        assert_eq!(gated.text, original);
    }

    #[test]
    fn test_too_long_candidate_reverts() {
        let original = "а".repeat(50);
        let candidate = "б".repeat(100);
        let gated = validate(&original, &candidate, &GateConfig::default());
        assert_eq!(gated.reverted, Some(RevertReason::LengthRatio));
    }

    #[test]
    fn test_relative_change_stricter_than_ratio() {
        // 40% of original passes the 0.3 ratio floor but fails a 0.25
        // relative-change cutoff.
        let config = GateConfig {
            max_relative_change: 0.25,
            ..Default::default()
        };
        let original = "а".repeat(100);
        let candidate = "б".repeat(40);
        let gated = validate(&original, &candidate, &config);
        assert_eq!(gated.reverted, Some(RevertReason::RelativeChange));
    }

    #[test]
    fn test_truncation_reverts() {
        let original = "сине анда котеп ятмыйлар, сиди на жопе";
        let candidate = "сине анда котеп ятмыйлар, сиди на";
        let gated = validate(original, candidate, &GateConfig::default());
        assert_eq!(gated.reverted, Some(RevertReason::Truncation));
        assert_eq!(gated.text, original);
    }

    #[test]
    fn test_truncation_with_trailing_punctuation() {
        let original = "озын җөмлә монда иде һәм дәвам итә";
        let candidate = "озын җөмлә монда иде һәм да...";
        let gated = validate(original, candidate, &GateConfig::default());
        assert_eq!(gated.reverted, Some(RevertReason::Truncation));
    }

    #[test]
    fn test_short_candidate_skips_truncation_check() {
        // Two words — below the truncation-check threshold, even though the
        // last word is a function word.
        let gated = validate("кил бар да", "бар да", &GateConfig::default());
        assert_eq!(gated.reverted, None);
        assert_eq!(gated.text, "бар да");
    }

    #[test]
    fn test_acceptable_candidate_passes() {
        let original = "Купме ашарга була инде? Симереп чучка буласыз бит";
        let candidate = "Купме ашарга була инде? Симереп буласыз бит";
        let gated = validate(original, candidate, &GateConfig::default());
        assert_eq!(gated.reverted, None);
        assert_eq!(gated.text, candidate);
    }

    #[test]
    fn test_checks_run_in_order() {
        // Empty beats everything else, whatever the config.
        let config = GateConfig {
            min_ratio: 0.0,
            max_ratio: 100.0,
            max_relative_change: 100.0,
            ..Default::default()
        };
        let gated = validate(ORIGINAL, "", &config);
        assert_eq!(gated.reverted, Some(RevertReason::Empty));
    }
}
