//! Legacy Jira wiki markup → readable text.
//!
//! Only applied to bodies that arrive as plain strings; ADF bodies are already
//! structured and go through [`crate::adf`].

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RULES: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"\{code[^}]*\}").unwrap(), "```"),
        (Regex::new(r"\{noformat\}").unwrap(), "```"),
        (Regex::new(r"\{color[^}]*\}").unwrap(), ""),
        (Regex::new(r"\{panel[^}]*\}").unwrap(), ""),
        (Regex::new(r"(?m)^h([1-6])\.\s*").unwrap(), ""),
        (Regex::new(r"\[([^\]|]+)\|([^\]]+)\]").unwrap(), "$1"),
        (Regex::new(r"\{\{([^}]+)\}\}").unwrap(), "$1"),
        (Regex::new(r"(^|\s)\*([^*\s](?:[^*]*[^*\s])?)\*").unwrap(), "$1$2"),
        (Regex::new(r"(^|\s)_([^_\s](?:[^_]*[^_\s])?)_").unwrap(), "$1$2"),
        (Regex::new(r"(^|\s)\+([^+\s](?:[^+]*[^+\s])?)\+").unwrap(), "$1$2"),
        (Regex::new(r"(^|\s)-([^-\s](?:[^-]*[^-\s])?)-(\s|$)").unwrap(), "$1$2$3"),
        (Regex::new(r"(?m)^bq\.\s*").unwrap(), "> "),
    ];
}

/// Strip wiki formatting markers, keeping the text they decorate.
pub fn clean_wiki_markup(text: &str) -> String {
    let mut result = text.to_owned();
    for (pattern, replacement) in RULES.iter() {
        result = pattern.replace_all(&result, *replacement).into_owned();
    }
    result.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_headings_links_and_emphasis() {
        let raw = "h2. Steps\nClick [the button|https://x.test] and see *bold* text";
        assert_eq!(
            clean_wiki_markup(raw),
            "Steps\nClick the button and see bold text"
        );
    }

    #[test]
    fn leaves_dates_and_hyphenated_words_alone() {
        let raw = "Deployed 2024-01-15 to pre-prod";
        assert_eq!(clean_wiki_markup(raw), raw);
    }

    #[test]
    fn code_markers_become_fences() {
        assert_eq!(clean_wiki_markup("{code:java}x();{code}"), "```x();```");
    }

    #[test]
    fn minus_signs_are_not_strike_through() {
        assert_eq!(clean_wiki_markup("from -5 - 10"), "from -5 - 10");
        assert_eq!(clean_wiki_markup("was -removed text- here"), "was removed text here");
        assert_eq!(clean_wiki_markup("2 * 3 * 4"), "2 * 3 * 4");
    }
}
