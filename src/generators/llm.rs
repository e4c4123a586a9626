//! LLM-backed rewriter
//!
//! Wraps [`LlmClient`] as a [`Generator`]: builds the detox or refinement
//! prompt, calls the model, and cleans the reply (models echo prefixes,
//! wrapping quotes, and occasional metadata lines). Structural validation is
//! not done here — that is the gate's job.

use super::{prompts, Generator, GenResult, LlmClient};
use crate::models::MatchSet;

/// Reply prefixes models are known to echo despite instructions.
const REPLY_PREFIXES: &[&str] = &[
    "детокс:",
    "детоксифицированный текст:",
    "детоксифицированный:",
    "исправленный текст:",
    "результат:",
    "ответ:",
    "output:",
];

/// Line markers indicating model chatter rather than the rewrite itself.
const METADATA_MARKERS: &[&str] = &["токсичный:", "детокс:", "шаг ", "оригинал:", "попытка"];

pub struct LlmRewriter {
    client: LlmClient,
    label: String,
}

impl LlmRewriter {
    pub fn new(client: LlmClient, label: impl Into<String>) -> Self {
        Self {
            client,
            label: label.into(),
        }
    }
}

impl Generator for LlmRewriter {
    fn label(&self) -> &str {
        &self.label
    }

    fn generate(&self, original: &str, hint: Option<&MatchSet>) -> GenResult<String> {
        let prompt = match hint {
            Some(residual) if !residual.is_empty() => {
                prompts::refinement_prompt(original, residual)
            }
            _ => prompts::detox_prompt(original),
        };
        let reply = self.client.complete(&prompt)?;
        Ok(clean_reply(&reply))
    }
}

/// Strip wrapping quotes, known reply prefixes, and metadata lines; keep the
/// first meaningful line. May return an empty string — the gate reverts
/// those.
pub fn clean_reply(reply: &str) -> String {
    let mut text = reply.trim().trim_matches(['"', '\'', '`']).trim().to_string();

    let lower = text.to_lowercase();
    for prefix in REPLY_PREFIXES {
        if lower.starts_with(prefix) {
            text = text[prefix.len()..].trim().to_string();
            break;
        }
    }

    if text.contains('\n') {
        let first_meaningful = text
            .lines()
            .map(str::trim)
            .find(|line| {
                !line.is_empty()
                    && !METADATA_MARKERS
                        .iter()
                        .any(|marker| line.to_lowercase().contains(marker))
            })
            .unwrap_or("");
        text = first_meaningful.to_string();
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_reply_strips_quotes_and_prefix() {
        assert_eq!(clean_reply("\"Детокс: сине анда котеп ятмыйлар\""), "сине анда котеп ятмыйлар");
        assert_eq!(clean_reply("Результат: текст"), "текст");
    }

    #[test]
    fn test_clean_reply_takes_first_meaningful_line() {
        let reply = "Оригинал: кутак сырлама\nсырлама\nПопытка 2: что-то";
        assert_eq!(clean_reply(reply), "сырлама");
    }

    #[test]
    fn test_clean_reply_plain_text_untouched() {
        assert_eq!(clean_reply("сине анда котеп ятмыйлар"), "сине анда котеп ятмыйлар");
    }

    #[test]
    fn test_clean_reply_all_metadata_is_empty() {
        assert_eq!(clean_reply("Оригинал: а\nПопытка 1: б"), "");
    }
}
