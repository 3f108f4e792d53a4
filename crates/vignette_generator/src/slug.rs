//! Filesystem-safe slugs for output directories.

const MAX_SLUG_LEN: usize = 60;

/// Convert a topic into a lowercase hyphenated slug, truncated to 60
/// characters at a word boundary where one exists past the halfway mark.
pub fn slugify(topic: &str) -> String {
    let mut cleaned = String::with_capacity(topic.len());
    for c in topic.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() || c == '-' {
            cleaned.push(c);
        } else if !c.is_ascii() {
            // Fold accented letters to their ascii base where obvious,
            // drop the rest.
            if let Some(base) = ascii_fold(c) {
                cleaned.push(base);
            }
        }
    }

    let mut slug = String::with_capacity(cleaned.len());
    let mut in_separator = false;
    for c in cleaned.chars() {
        if c.is_whitespace() || c == '-' {
            in_separator = true;
        } else {
            if in_separator && !slug.is_empty() {
                slug.push('-');
            }
            in_separator = false;
            slug.push(c);
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        if let Some(cut) = slug.rfind('-') {
            if cut > MAX_SLUG_LEN / 2 {
                slug.truncate(cut);
            }
        }
    }
    slug.trim_matches('-').to_string()
}

fn ascii_fold(c: char) -> Option<char> {
    match c {
        'à'..='å' => Some('a'),
        'è'..='ë' => Some('e'),
        'ì'..='ï' => Some('i'),
        'ò'..='ö' => Some('o'),
        'ù'..='ü' => Some('u'),
        'ñ' => Some('n'),
        'ç' => Some('c'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Toddler Bedtime Battles"), "toddler-bedtime-battles");
    }

    #[test]
    fn strips_punctuation_and_collapses_separators() {
        assert_eq!(slugify("why won't they sleep?!  --  help"), "why-wont-they-sleep-help");
    }

    #[test]
    fn folds_accents() {
        assert_eq!(slugify("café naïve"), "cafe-naive");
    }

    #[test]
    fn truncates_at_word_boundary() {
        let long = "a-very-long-topic-name-that-keeps-going-and-going-well-past-sixty-characters";
        let slug = slugify(long);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
        // Does not cut in the middle of a word.
        assert!(long.starts_with(&slug));
        assert_eq!(long.as_bytes()[slug.len()], b'-');
    }

    #[test]
    fn empty_input_gives_empty_slug() {
        assert_eq!(slugify("   "), "");
    }
}
