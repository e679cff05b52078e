use regex::Regex;
use std::sync::OnceLock;

/// Splits free text into lower-cased noun phrases
pub trait TextChunker: Send + Sync {
    fn noun_phrases(&self, text: &str) -> Vec<String>;
}

/// Function words that never belong to a noun phrase
const FUNCTION_WORDS: &[&str] = &[
    // wh-words and question openers
    "how", "what", "which", "who", "whom", "whose", "why", "when", "where", "whether",
    // auxiliaries and copulas
    "do", "does", "did", "done", "is", "are", "was", "were", "be", "been", "being", "am",
    "has", "have", "had", "having", "can", "could", "will", "would", "shall", "should",
    "may", "might", "must",
    // determiners and quantifiers
    "a", "an", "the", "this", "that", "these", "those", "some", "any", "each", "every",
    "all", "both", "either", "neither", "no", "not", "other", "another", "such", "there",
    // pronouns
    "i", "me", "my", "we", "us", "our", "you", "your", "he", "him", "his", "she", "her",
    "it", "its", "they", "them", "their",
    // prepositions
    "of", "in", "on", "at", "to", "for", "from", "with", "without", "by", "about",
    "into", "onto", "over", "under", "between", "among", "through", "during", "via",
    "against", "within", "across", "after", "before", "than", "like", "per",
    // conjunctions and adverbs
    "and", "or", "but", "nor", "so", "if", "then", "also", "as", "more", "most", "less",
    "very", "much", "many", "just", "only",
];

/// Relational verbs typical of graph questions, matched by stem
const RELATION_VERBS: &[&str] = &[
    "affect", "treat", "cause", "bind", "interact", "regulate", "upregulate",
    "downregulate", "inhibit", "activate", "express", "associate", "relate", "link",
    "connect", "influence", "impact", "target", "induce", "reduce", "increase",
    "decrease", "prevent", "palliate", "resemble", "involve", "participate", "localize",
    "contribute", "lead", "mediate", "modulate", "work", "help", "use", "act",
    "produce", "block", "trigger", "worsen", "improve", "lower", "raise",
];

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| {
        Regex::new(r"[\p{L}\p{N}]+(?:['\-][\p{L}\p{N}]+)*|[^\s\p{L}\p{N}]")
            .expect("Invalid word regex")
    })
}

fn is_relation_verb(word: &str) -> bool {
    RELATION_VERBS.iter().any(|stem| {
        word == *stem
            || word
                .strip_prefix(stem)
                .map(|suffix| matches!(suffix, "s" | "es" | "ed" | "d" | "ing"))
                .unwrap_or(false)
            || stem
                .strip_suffix('e')
                .and_then(|base| word.strip_prefix(base))
                .map(|suffix| suffix == "ing")
                .unwrap_or(false)
    })
}

fn breaks_phrase(token: &str) -> bool {
    let first = token.chars().next().unwrap_or(' ');
    !first.is_alphanumeric() || FUNCTION_WORDS.contains(&token) || is_relation_verb(token)
}

/// Deterministic lexicon-based noun phrase chunker
///
/// A phrase is a maximal run of words that are neither function words nor
/// relational verbs; punctuation also ends a phrase. Apostrophes and hyphens
/// inside words are kept so names like `parkinson's` survive intact.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconChunker;

impl TextChunker for LexiconChunker {
    fn noun_phrases(&self, text: &str) -> Vec<String> {
        let normalised = text.replace(['\u{2019}', '\u{2018}'], "'").to_lowercase();

        let mut phrases = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for token in word_regex().find_iter(&normalised).map(|m| m.as_str()) {
            if breaks_phrase(token) {
                if !current.is_empty() {
                    phrases.push(current.join(" "));
                    current.clear();
                }
            } else {
                current.push(token);
            }
        }
        if !current.is_empty() {
            phrases.push(current.join(" "));
        }

        phrases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_phrases() {
        let phrases = LexiconChunker.noun_phrases("How does metformin affect Parkinson's disease?");
        assert_eq!(phrases, vec!["metformin", "parkinson's disease"]);
    }

    #[test]
    fn test_typographic_apostrophe() {
        let phrases = LexiconChunker.noun_phrases("Parkinson\u{2019}s disease");
        assert_eq!(phrases, vec!["parkinson's disease"]);
    }

    #[test]
    fn test_verb_inflections_break_phrases() {
        let phrases = LexiconChunker.noun_phrases("Which genes are upregulated by valproic acid");
        assert_eq!(phrases, vec!["genes", "valproic acid"]);
        let phrases = LexiconChunker.noun_phrases("drugs treating epilepsy");
        assert_eq!(phrases, vec!["drugs", "epilepsy"]);
    }

    #[test]
    fn test_hyphenated_terms_survive() {
        let phrases = LexiconChunker.noun_phrases("What binds alpha-synuclein, and why?");
        assert_eq!(phrases, vec!["alpha-synuclein"]);
    }

    #[test]
    fn test_repeated_phrases_are_kept() {
        let phrases = LexiconChunker.noun_phrases("insulin or insulin");
        assert_eq!(phrases, vec!["insulin", "insulin"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(LexiconChunker.noun_phrases("").is_empty());
        assert!(LexiconChunker.noun_phrases("how does it?").is_empty());
    }
}
