//! Text patterns and wording helpers shared by the checkers

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A printed page number: one to three ASCII digits
    static ref PAGE_NUMBER_PATTERN: Regex = Regex::new(r"^[0-9]{1,3}$").unwrap();
}

/// Noun forms for "violation"
pub const VIOLATION_FORMS: (&str, &str, &str) = ("нарушение", "нарушения", "нарушений");

/// True when the trimmed text could be a printed page number
pub fn is_page_number_text(text: &str) -> bool {
    PAGE_NUMBER_PATTERN.is_match(text.trim())
}

/// Closed set of disallowed quotation glyphs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteSet {
    chars: Vec<char>,
}

impl QuoteSet {
    pub fn new(disallowed: &str) -> Self {
        let mut chars: Vec<char> = Vec::new();
        for c in disallowed.chars() {
            if !chars.contains(&c) {
                chars.push(c);
            }
        }
        Self { chars }
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    /// Number of disallowed characters in `text`
    pub fn count_in(&self, text: &str) -> usize {
        text.chars().filter(|c| self.contains(*c)).count()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

/// Pick the Russian noun form agreeing with `n`
///
/// `forms` is (one, few, many): 1 нарушение, 3 нарушения, 5 нарушений.
pub fn plural_ru<'a>(n: usize, forms: (&'a str, &'a str, &'a str)) -> &'a str {
    let n100 = n % 100;
    let n10 = n % 10;
    if (11..=19).contains(&n100) {
        forms.2
    } else if n10 == 1 {
        forms.0
    } else if (2..=4).contains(&n10) {
        forms.1
    } else {
        forms.2
    }
}

/// "3 нарушения" style phrase
pub fn count_phrase(n: usize, forms: (&str, &str, &str)) -> String {
    format!("{} {}", n, plural_ru(n, forms))
}

/// Comma-separated page list
pub fn format_pages(pages: &[u32]) -> String {
    pages
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `U+XXXX` label for a character
pub fn codepoint_label(c: char) -> String {
    format!("U+{:04X}", c as u32)
}

/// Up to `radius` characters on each side of the character at `char_pos`
pub fn extract_context(text: &str, char_pos: usize, radius: usize) -> String {
    let start = char_pos.saturating_sub(radius);
    text.chars()
        .skip(start)
        .take(char_pos - start + radius)
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_page_number_text() {
        assert!(is_page_number_text("5"));
        assert!(is_page_number_text(" 123 "));
        assert!(!is_page_number_text("1234"));
        assert!(!is_page_number_text("12a"));
        assert!(!is_page_number_text(""));
        assert!(!is_page_number_text("٣"));
    }

    #[test]
    fn test_plural_ru() {
        assert_eq!(plural_ru(1, VIOLATION_FORMS), "нарушение");
        assert_eq!(plural_ru(2, VIOLATION_FORMS), "нарушения");
        assert_eq!(plural_ru(5, VIOLATION_FORMS), "нарушений");
        assert_eq!(plural_ru(11, VIOLATION_FORMS), "нарушений");
        assert_eq!(plural_ru(21, VIOLATION_FORMS), "нарушение");
        assert_eq!(plural_ru(112, VIOLATION_FORMS), "нарушений");
        assert_eq!(plural_ru(0, VIOLATION_FORMS), "нарушений");
    }

    #[test]
    fn test_quote_set_deduplicates() {
        let set = QuoteSet::new("\"\"'");
        assert_eq!(set.chars(), &['"', '\'']);
        assert_eq!(set.count_in("a \"b\" 'c' «d»"), 4);
    }

    #[test]
    fn test_extract_context_clamps_to_text() {
        let text = "Слово \"в кавычках\" и дальше";
        assert_eq!(extract_context(text, 6, 3), "во \"в");
        assert_eq!(extract_context("ab", 0, 30), "ab");
    }

    #[test]
    fn test_codepoint_label() {
        assert_eq!(codepoint_label('“'), "U+201C");
    }

    proptest! {
        #[test]
        fn prop_plural_teens_use_many_form(n in 0usize..10_000) {
            if (11..=19).contains(&(n % 100)) {
                prop_assert_eq!(plural_ru(n, VIOLATION_FORMS), "нарушений");
            }
        }
    }
}
