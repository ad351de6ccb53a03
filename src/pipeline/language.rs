//! Heuristic language detection.
//!
//! Text is cut into sentence-like segments and each segment is judged on its
//! own, so a document mixing an English paragraph with a Russian one reports
//! both languages. Per segment:
//!
//! * **Non-Latin scripts** identify the language directly (Greek → `el`,
//!   Hangul → `ko`, …) once they make up a meaningful share of its letters.
//!   Han characters report `zh` unless kana in the same segment marks it as
//!   Japanese.
//! * **Latin script** is scored against short stop-word lists, with words
//!   unique to one list weighted double. The best language wins only with at
//!   least [`MIN_STOPWORD_HITS`] hits and a strict lead over the runner-up.
//!
//! When no segment settles a Latin language, the whole text is scored once
//! more so that several short sentences can add up. Short or ambiguous input
//! yields an empty set, which is a valid result, not an error.

use crate::pipeline::tokenize::tokens;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Minimum stop-word hits for a Latin-script language to be reported.
pub const MIN_STOPWORD_HITS: usize = 2;

/// Minimum letters of a non-Latin script in a segment.
const MIN_SCRIPT_LETTERS: usize = 2;

/// Minimum share of a segment's letters a script must cover.
const MIN_SCRIPT_SHARE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Script {
    Latin,
    Greek,
    Cyrillic,
    Hebrew,
    Arabic,
    Devanagari,
    Thai,
    Hangul,
    Kana,
    Han,
}

fn script_of(c: char) -> Option<Script> {
    let script = match c {
        'a'..='z' | 'A'..='Z' | '\u{00C0}'..='\u{024F}' | '\u{1E00}'..='\u{1EFF}' => Script::Latin,
        '\u{0370}'..='\u{03FF}' | '\u{1F00}'..='\u{1FFF}' => Script::Greek,
        '\u{0400}'..='\u{052F}' => Script::Cyrillic,
        '\u{0590}'..='\u{05FF}' => Script::Hebrew,
        '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' => Script::Arabic,
        '\u{0900}'..='\u{097F}' => Script::Devanagari,
        '\u{0E00}'..='\u{0E7F}' => Script::Thai,
        '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}' | '\u{AC00}'..='\u{D7AF}' => {
            Script::Hangul
        }
        '\u{3040}'..='\u{30FF}' => Script::Kana,
        '\u{3400}'..='\u{4DBF}' | '\u{4E00}'..='\u{9FFF}' => Script::Han,
        _ => return None,
    };
    Some(script)
}

// Ordered so ties and iteration are deterministic.
static STOPWORDS: Lazy<Vec<(&'static str, HashSet<&'static str>)>> = Lazy::new(|| {
    let lists: [(&str, &[&str]); 7] = [
        (
            "en",
            &[
                "the", "and", "is", "are", "was", "were", "of", "to", "in", "that", "it", "with",
                "for", "this", "you", "not", "have", "be", "on", "at", "from", "over",
            ],
        ),
        (
            "es",
            &[
                "el", "la", "los", "las", "lo", "de", "del", "que", "y", "es", "en", "por", "con",
                "un", "una", "para", "está", "son", "pero", "como", "muy", "se", "al", "mi", "su",
            ],
        ),
        (
            "fr",
            &[
                "le", "la", "les", "de", "des", "et", "est", "en", "un", "une", "dans", "pour",
                "pas", "que", "qui", "sur", "avec", "sont", "ce", "il", "je", "du", "au",
            ],
        ),
        (
            "de",
            &[
                "der", "die", "das", "und", "ist", "nicht", "ein", "eine", "mit", "auf", "für",
                "sich", "dem", "den", "zu", "ich", "auch", "von",
            ],
        ),
        (
            "it",
            &[
                "il", "la", "lo", "gli", "che", "di", "è", "un", "una", "per", "non", "sono",
                "della", "con", "del", "questo", "anche", "ma", "nel",
            ],
        ),
        (
            "pt",
            &[
                "o", "os", "as", "não", "é", "um", "uma", "que", "com", "para", "de", "do", "da",
                "dos", "em", "está", "são", "mas", "como",
            ],
        ),
        (
            "nl",
            &[
                "de", "het", "een", "en", "is", "van", "niet", "dat", "op", "met", "voor", "zijn",
                "ik", "ook", "maar", "te", "er",
            ],
        ),
    ];
    lists
        .iter()
        .map(|(code, words)| (*code, words.iter().copied().collect()))
        .collect()
});

/// Number of stop-word lists each word appears in.
static STOPWORD_SPREAD: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    let mut spread = HashMap::new();
    for (_, list) in STOPWORDS.iter() {
        for word in list {
            *spread.entry(*word).or_insert(0) += 1;
        }
    }
    spread
});

/// A stop-word found in only one list is stronger evidence than a shared one
/// (`de`, `en`, `la`).
fn stopword_weight(word: &str) -> usize {
    match STOPWORD_SPREAD.get(word) {
        Some(1) => 2,
        _ => 1,
    }
}

/// Detect the languages present in `text` as ISO 639-1 codes.
pub fn detect_languages(text: &str) -> BTreeSet<String> {
    let mut found: BTreeSet<String> = BTreeSet::new();
    let mut latin_found = false;

    for segment in text.split(is_segment_break) {
        let scripts = script_letters(segment);
        let total: usize = scripts.values().sum();
        if total == 0 {
            continue;
        }
        let significant = |script: Script| {
            scripts.get(&script).is_some_and(|&n| {
                n >= MIN_SCRIPT_LETTERS && n as f64 / total as f64 >= MIN_SCRIPT_SHARE
            })
        };

        for (script, code) in [
            (Script::Greek, "el"),
            (Script::Hebrew, "he"),
            (Script::Arabic, "ar"),
            (Script::Devanagari, "hi"),
            (Script::Thai, "th"),
            (Script::Hangul, "ko"),
            (Script::Kana, "ja"),
        ] {
            if significant(script) {
                found.insert(code.to_string());
            }
        }
        if significant(Script::Cyrillic) {
            let ukrainian = segment.chars().any(|c| matches!(c, 'і' | 'ї' | 'є' | 'ґ'));
            found.insert(if ukrainian { "uk" } else { "ru" }.to_string());
        }
        if significant(Script::Han) && !scripts.contains_key(&Script::Kana) {
            found.insert("zh".to_string());
        }
        if significant(Script::Latin) {
            if let Some(code) = best_latin_language(segment) {
                found.insert(code.to_string());
                latin_found = true;
            }
        }
    }

    if !latin_found {
        if let Some(code) = best_latin_language(text) {
            found.insert(code.to_string());
        }
    }

    found
}

fn is_segment_break(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | ';' | '\n' | '。' | '！' | '？')
}

fn script_letters(segment: &str) -> BTreeMap<Script, usize> {
    let mut counts = BTreeMap::new();
    for script in segment
        .chars()
        .filter(|c| c.is_alphabetic())
        .filter_map(script_of)
    {
        *counts.entry(script).or_insert(0) += 1;
    }
    counts
}

/// Score Latin-script words in `text` against each stop-word list.
///
/// A language needs [`MIN_STOPWORD_HITS`] stop-word occurrences and a
/// weighted score strictly above every other language.
fn best_latin_language(text: &str) -> Option<&'static str> {
    let words: Vec<String> = tokens(text)
        .filter(|t| t.is_word())
        .map(|t| t.text.to_lowercase())
        .collect();
    if words.is_empty() {
        return None;
    }

    // (code, weighted score, raw hits)
    let mut scores: Vec<(&'static str, usize, usize)> = STOPWORDS
        .iter()
        .map(|(code, list)| {
            let (score, hits) = words
                .iter()
                .filter(|w| list.contains(w.as_str()))
                .fold((0, 0), |(score, hits), w| (score + stopword_weight(w), hits + 1));
            (*code, score, hits)
        })
        .collect();
    // Stable sort keeps list order among equal scores.
    scores.sort_by(|a, b| b.1.cmp(&a.1));

    let (best_code, best, hits) = scores[0];
    let runner_up = scores.get(1).map_or(0, |s| s.1);
    (hits >= MIN_STOPWORD_HITS && best > runner_up).then_some(best_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs(text: &str) -> Vec<String> {
        detect_languages(text).into_iter().collect()
    }

    #[test]
    fn english_sentence() {
        assert_eq!(langs("The quick brown fox jumps over the lazy dog."), vec!["en"]);
    }

    #[test]
    fn french_sentence() {
        assert_eq!(langs("Le chat est sur la table avec les enfants."), vec!["fr"]);
    }

    #[test]
    fn spanish_sentence() {
        assert_eq!(langs("Yo vivo en la ciudad de Madrid con mi familia."), vec!["es"]);
        assert_eq!(langs("La casa de mi madre es grande."), vec!["es"]);
    }

    #[test]
    fn shared_stopwords_do_not_decide_alone() {
        // "de" and "en" appear in several lists; nothing exclusive backs them up.
        assert!(detect_languages("de en").is_empty());
        assert_eq!(langs("Het huis van de man is groot en mooi."), vec!["nl"]);
    }

    #[test]
    fn german_sentence() {
        assert_eq!(langs("Der Hund und die Katze sind nicht im Haus."), vec!["de"]);
    }

    #[test]
    fn mixed_english_and_russian() {
        let text = "This is the first part of the text.\nЭто вторая часть текста.";
        assert_eq!(langs(text), vec!["en", "ru"]);
    }

    #[test]
    fn japanese_is_not_reported_as_chinese() {
        assert_eq!(langs("東京はとても大きい都市です"), vec!["ja"]);
        assert_eq!(langs("我们今天去北京"), vec!["zh"]);
    }

    #[test]
    fn short_input_is_inconclusive() {
        assert!(detect_languages("hello").is_empty());
        assert!(detect_languages("ok 42").is_empty());
    }

    #[test]
    fn non_latin_scripts() {
        assert_eq!(langs("Καλημέρα κόσμε"), vec!["el"]);
        assert_eq!(langs("안녕하세요 세계"), vec!["ko"]);
        assert_eq!(langs("Привіт, як справи? Це їжа"), vec!["uk"]);
    }

    #[test]
    fn short_sentences_add_up_across_segments() {
        // One stop-word per sentence, two in total.
        assert_eq!(langs("Cats sleep. Dogs bark. The end. Birds sing in trees."), vec!["en"]);
    }
}
