//! Built-in pattern catalog for the Tatar/Russian deployment
//!
//! One entry per lexical root; rules cover the morphological variants seen
//! in the training data. Short roots carry explicit `\b` boundaries so they
//! do not fire inside unrelated words.

use super::{PatternRule, Tier};

fn rule(id: &str, tier: Tier, rule: &str) -> PatternRule {
    PatternRule {
        id: id.to_string(),
        tier,
        rule: rule.to_string(),
    }
}

/// The default catalog.
pub fn builtin_catalog() -> Vec<PatternRule> {
    use Tier::*;
    vec![
        // Obfuscated spellings, frequently missed by plain word lists
        rule("заипал", Disguised, r"заипал[иоа]"),
        rule("нахуй", Disguised, r"нах[уе]й"),
        rule("похуй", Disguised, r"пох[уе]й"),
        rule("бляяя", Disguised, r"бля{2,}"),
        rule("хуйй", Disguised, r"ху+й+"),
        // Strong profanity
        rule("бля", Strong, r"\bбля[тдь]?\b"),
        rule("блят", Strong, r"блят[ьи]?"),
        rule("хуй", Strong, r"\bху[йёея]\b"),
        rule("хуйня", Strong, r"хуйн[яуе]"),
        rule("пизд", Strong, r"пизд[аеуой]?"),
        rule("ебан", Strong, r"[её]бан[аыое]?"),
        rule("ебать", Strong, r"[её]ба[тл][ьи]?"),
        rule("сука", Strong, r"\bсук[аи]\b"),
        rule("пидор", Strong, r"пидор|пидар"),
        // Vulgar
        rule("жоп", Vulgar, r"жоп[аеуойы]?"),
        rule("срать", Vulgar, r"сра[тлн]|сру"),
        rule("говно", Vulgar, r"говн[оауе]"),
        rule("дерьмо", Vulgar, r"дерьм[оау]"),
        // Mild expletives
        rule("блин", Mild, r"\bблин\b"),
        rule("хрен", Mild, r"\bхрен[аоуы]?\b"),
        rule("черт", Mild, r"\bчерт[аоу]?\b"),
        // Insults
        rule("сволочь", Offensive, r"сволоч[ьи]"),
        rule("идиот", Offensive, r"идиот"),
        rule("дебил", Offensive, r"дебил"),
        rule("урод", Offensive, r"\bурод"),
        rule("тварь", Offensive, r"твар[ьи]"),
        rule("козел", Offensive, r"козел|козёл"),
        rule("мудак", Offensive, r"мудак"),
        rule("придурок", Offensive, r"придур[оа]к"),
        rule("тупой", Offensive, r"\bтупо[йе]\b"),
        rule("дурак", Offensive, r"дурак|\bдура\b"),
        // Tatar offensive roots, all morphological variants
        rule("кутак", Native, r"кута[ккг]"),
        rule("кут", Native, r"\bкут[ене]?\b"),
        rule("кутен", Native, r"кутен[эеа]"),
        rule("кутлак", Native, r"кутла[ккг]"),
        rule("куттак", Native, r"кутта[ккг]"),
        rule("чучка", Native, r"чучк[ауоеи]?"),
        rule("дунгыз", Native, r"дунгыз"),
        rule("тиле", Native, r"\bтиле\b"),
        rule("ангыра", Native, r"ангыр[ауы]"),
        rule("тинтэк", Native, r"тинт[эә]к"),
        rule("сосоп", Native, r"сосоп"),
        rule("тычкак", Native, r"тычкак"),
        rule("убырлы", Native, r"убырлы[кгк]?"),
        // Cross-lingual code-switch constructions
        rule("на хуй", CodeSwitch, r"на\s*х[уе][йр]"),
        rule("пошол", CodeSwitch, r"пошол\s*на"),
        rule("иди на", CodeSwitch, r"иди\s*на\s*х"),
        rule("дохуя", CodeSwitch, r"дох[уе][йя]"),
    ]
}
