//! Text canonicalisation shared by matching, scoring and native search.

use scraper::Html;

/// Replace typographic quotes and dashes with their ASCII counterparts.
///
/// - `‘` `’` become `'`
/// - `“` `”` become `"`
/// - `–` `—` become `-`
///
/// Idempotent: the output contains none of the replaced characters.
///
/// ```
/// use extrachill_search::normalize::normalize_term;
///
/// assert_eq!(normalize_term("Don’t — “stop”"), "Don't - \"stop\"");
/// ```
pub fn normalize_term(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            other => other,
        })
        .collect()
}

/// Normalized, lower-cased form used for every comparison.
pub fn fold(raw: &str) -> String {
    normalize_term(raw).to_lowercase()
}

/// Strip markup from a body, keeping only its text nodes.
pub fn plain_text(markup: &str) -> String {
    if !markup.contains('<') && !markup.contains('&') {
        return markup.to_owned();
    }
    let fragment = Html::parse_fragment(markup);
    fragment.root_element().text().collect()
}

/// Split folded text into its whitespace-separated words.
pub fn words(folded: &str) -> Vec<&str> {
    folded.split_whitespace().collect()
}

/// First `max_words` words of `text`, with `…` appended when truncated.
pub fn trim_words(text: &str, max_words: usize) -> String {
    let all: Vec<&str> = text.split_whitespace().collect();
    if all.len() <= max_words {
        return all.join(" ");
    }
    let mut out = all[..max_words].join(" ");
    out.push('\u{2026}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn replaces_single_quotes() {
        assert_eq!(normalize_term("it\u{2019}s \u{2018}ok\u{2019}"), "it's 'ok'");
    }

    #[test]
    fn replaces_double_quotes() {
        assert_eq!(normalize_term("\u{201C}live\u{201D}"), "\"live\"");
    }

    #[test]
    fn replaces_dashes() {
        assert_eq!(normalize_term("a\u{2013}b\u{2014}c"), "a-b-c");
    }

    #[test]
    fn leaves_ascii_untouched() {
        assert_eq!(normalize_term("plain 'ascii' - \"text\""), "plain 'ascii' - \"text\"");
    }

    #[test]
    fn fold_lowercases_after_normalizing() {
        assert_eq!(fold("Don\u{2019}t STOP"), "don't stop");
    }

    #[test]
    fn plain_text_strips_tags() {
        assert_eq!(
            plain_text("<p>Jazz <strong>festival</strong> lineup</p>"),
            "Jazz festival lineup"
        );
    }

    #[test]
    fn plain_text_passes_through_unmarked_text() {
        assert_eq!(plain_text("no markup here"), "no markup here");
    }

    #[test]
    fn plain_text_decodes_entities() {
        assert_eq!(plain_text("rock &amp; roll"), "rock & roll");
    }

    #[test]
    fn words_splits_on_any_whitespace() {
        assert_eq!(words("jazz\tfestival \n 2024"), vec!["jazz", "festival", "2024"]);
        assert!(words("   ").is_empty());
    }

    #[test]
    fn trim_words_truncates_with_ellipsis() {
        assert_eq!(trim_words("one two three four", 2), "one two\u{2026}");
        assert_eq!(trim_words("one  two", 5), "one two");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "\\PC*") {
            let once = normalize_term(&s);
            prop_assert_eq!(normalize_term(&once), once);
        }

        #[test]
        fn normalize_is_idempotent_on_typographic_input(
            s in "[a-z \u{2018}\u{2019}\u{201C}\u{201D}\u{2013}\u{2014}]{0,40}"
        ) {
            let once = normalize_term(&s);
            prop_assert!(!once.contains('\u{2019}'), "typographic quote survived");
            prop_assert_eq!(normalize_term(&once), once);
        }
    }
}
