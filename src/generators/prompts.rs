//! Prompt builders for the detox rewriters
//!
//! Two prompts: the first-pass rewrite prompt with lexicon guidance and
//! few-shot examples, and the narrower refinement prompt naming the exact
//! residual matches a first attempt left behind.

use crate::models::MatchSet;

/// First-pass prompt: remove toxic lexis only, preserve everything else.
pub fn detox_prompt(text: &str) -> String {
    format!(
        r#"Детоксифицируй татарский текст. УДАЛИ токсичную лексику, СОХРАНИ смысл.

ОБЯЗАТЕЛЬНО УДАЛИТЬ:
- Русские маты: бля, хуй, пизд, ебан, сука, жопа, срать, говно
- Замаскированные: Заипали (=заебали), бляяя, нахуй
- Татарские: кутак, кут, кутенэ, чучка, дунгыз, тиле, ангыра, сосоп
- Оскорбления: сволочь, идиот, дебил, придурок, тупой
- Слабые: блин, хрен (удалять если возможно)

СОХРАНИТЬ:
- @упоминания (@user) - НЕ токсичны
- Смысл, эмоции, структуру
- Эмодзи, пунктуацию :) =D ))

ПРИМЕРЫ:
Токс: сине анда котеп ятмыйлар, сиди на жопе
Детокс: сине анда котеп ятмыйлар, сиди

Токс: Заипали, нэрсэ булэк итим
Детокс: Надоело, нэрсэ булэк итим

Токс: @user, син кил давай, кутак сырлама!
Детокс: @user, син кил давай, сырлама!

Токс: Уз кутенэ приключение эзлэгэнсен
Детокс: Узе приключение эзлэгэнсен

ТЕКСТ: {text}

Детокс (ТОЛЬКО результат):"#
    )
}

/// Refinement prompt for a second, narrower pass: names the exact residual
/// lexicon hits the first pass left behind.
pub fn refinement_prompt(original: &str, residual: &MatchSet) -> String {
    let remaining: Vec<&str> = residual.iter().map(String::as_str).collect();
    format!(
        r#"ТОКСИЧНОСТЬ ОСТАЛАСЬ! Исправь:

Текст: {original}
Осталось: {}

УДАЛИ эти слова, сохрани всё остальное. Верни ТОЛЬКО исправленный текст:"#,
        remaining.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detox_prompt_embeds_text() {
        let prompt = detox_prompt("кутак сырлама");
        assert!(prompt.contains("ТЕКСТ: кутак сырлама"));
        assert!(prompt.contains("@упоминания"));
    }

    #[test]
    fn test_refinement_prompt_lists_residual() {
        let mut residual = MatchSet::new();
        residual.insert("чучка".to_string());
        residual.insert("дунгыз".to_string());
        let prompt = refinement_prompt("оригинал", &residual);
        // BTreeSet keeps the hint list deterministic.
        assert!(prompt.contains("дунгыз, чучка"));
        assert!(prompt.contains("Текст: оригинал"));
    }
}
