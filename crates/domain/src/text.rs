//! Text normalization and evasion-resistant term matching
//!
//! `normalize` canonicalizes raw text for matching only; callers keep the
//! original text for storage and display.

/// Separators deleted outright during normalization
const SEPARATORS: [char; 5] = [' ', '-', '_', '.', '*'];

/// Leet-speak substitutions applied after separator stripping
const LEET: [(char, char); 10] = [
    ('0', 'o'),
    ('1', 'i'),
    ('3', 'e'),
    ('4', 'a'),
    ('5', 's'),
    ('7', 't'),
    ('8', 'b'),
    ('$', 's'),
    ('@', 'a'),
    ('!', 'i'),
];

/// Single-character evasion substitutes per letter, used by `variations`
const SUBSTITUTES: [(char, &[char]); 7] = [
    ('a', &['@', '4']),
    ('e', &['3']),
    ('i', &['1', '!']),
    ('o', &['0']),
    ('s', &['$', '5']),
    ('t', &['7']),
    ('b', &['8']),
];

const VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

/// Canonicalize text for fuzzy matching.
///
/// Lower-cases, deletes separators, applies leet substitutions, then
/// collapses runs: letters keep at most two in a row ("pool" survives,
/// "sooooo" becomes "soo"), every other character keeps one.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last: Option<char> = None;
    let mut run = 0usize;

    for ch in text.to_lowercase().chars() {
        if SEPARATORS.contains(&ch) {
            continue;
        }
        let ch = leet(ch);

        if last == Some(ch) {
            if ch.is_alphabetic() && run < 2 {
                out.push(ch);
                run += 1;
            }
            continue;
        }

        out.push(ch);
        last = Some(ch);
        run = 1;
    }

    out
}

fn leet(ch: char) -> char {
    LEET.iter()
        .find(|(from, _)| *from == ch)
        .map(|(_, to)| *to)
        .unwrap_or(ch)
}

/// Candidate evasive spellings of a banned term.
///
/// One substitution axis at a time: for each distinct letter with known
/// substitutes, every occurrence of that letter is replaced by one substitute.
/// Terms longer than 3 characters also yield the term minus its last
/// character, and terms longer than 4 the term minus its last two.
pub fn variations(term: &str) -> Vec<String> {
    let term = term.to_lowercase();
    let mut out: Vec<String> = Vec::new();
    let mut seen_letters: Vec<char> = Vec::new();

    for letter in term.chars() {
        if seen_letters.contains(&letter) {
            continue;
        }
        seen_letters.push(letter);

        let Some((_, subs)) = SUBSTITUTES.iter().find(|(l, _)| *l == letter) else {
            continue;
        };
        for sub in subs.iter() {
            push_unique(&mut out, term.replace(letter, &sub.to_string()));
        }
    }

    let chars: Vec<char> = term.chars().collect();
    if chars.len() > 3 {
        push_unique(&mut out, chars[..chars.len() - 1].iter().collect());
    }
    if chars.len() > 4 {
        push_unique(&mut out, chars[..chars.len() - 2].iter().collect());
    }

    out
}

fn push_unique(out: &mut Vec<String>, candidate: String) {
    if !candidate.is_empty() && !out.contains(&candidate) {
        out.push(candidate);
    }
}

/// `term` with a, e, i, o, u removed
pub fn strip_vowels(term: &str) -> String {
    term.chars().filter(|c| !VOWELS.contains(c)).collect()
}

/// Vowel-stripped fallback predicate.
///
/// Aggressive: short consonant skeletons over-match unrelated words, so it
/// only applies to terms of 4+ characters whose skeleton keeps 2+ characters.
pub fn vowel_skeleton_matches(term: &str, normalized: &str, raw_lower: &str) -> bool {
    if term.chars().count() < 4 {
        return false;
    }
    let skeleton = strip_vowels(term);
    skeleton.chars().count() >= 2 && (normalized.contains(&skeleton) || raw_lower.contains(&skeleton))
}

/// A piece of text prepared once for repeated term lookups
#[derive(Debug, Clone)]
pub struct PreparedText {
    raw_lower: String,
    normalized: String,
}

impl PreparedText {
    pub fn new(raw: &str) -> Self {
        Self {
            raw_lower: raw.to_lowercase(),
            normalized: normalize(raw),
        }
    }

    pub fn raw_lower(&self) -> &str {
        &self.raw_lower
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

/// Matches banned terms against prepared text, including evasive spellings
#[derive(Debug, Clone, Copy)]
pub struct TermMatcher {
    vowel_skeletons: bool,
}

impl TermMatcher {
    pub fn new(vowel_skeletons: bool) -> Self {
        Self { vowel_skeletons }
    }

    /// Whether `term`, or any evasive spelling of it, is present in `text`
    pub fn contains(&self, text: &PreparedText, term: &str) -> bool {
        let term = term.to_lowercase();
        if term.is_empty() {
            return false;
        }

        if text.raw_lower.contains(&term) || text.normalized.contains(&term) {
            return true;
        }

        if variations(&term)
            .iter()
            .any(|v| text.normalized.contains(v.as_str()) || text.raw_lower.contains(v.as_str()))
        {
            return true;
        }

        self.vowel_skeletons && vowel_skeleton_matches(&term, &text.normalized, &text.raw_lower)
    }
}

impl Default for TermMatcher {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_separators_and_case() {
        assert_eq!(normalize("F u-c_k.*"), "fuck");
        assert_eq!(normalize("Cozy Home"), "cozyhome");
    }

    #[test]
    fn test_normalize_applies_leet_substitutions() {
        assert_eq!(normalize("h0u$3"), "house");
        assert_eq!(normalize("@11 7h!5"), "aiithis");
        assert_eq!(normalize("8eds"), "beds");
    }

    #[test]
    fn test_normalize_collapses_runs() {
        assert_eq!(normalize("aaa"), "aa");
        assert_eq!(normalize("bb"), "bb");
        assert_eq!(normalize("ccccc"), "cc");
        assert_eq!(normalize("pool"), "pool");
        assert_eq!(normalize("sooooo nice"), "soonice");
        // "!" maps to the letter "i", so it keeps a double
        assert_eq!(normalize("wow!!!???"), "wowii?");
    }

    #[test]
    fn test_normalize_collapses_after_substitution() {
        // "0" becomes "o" before the run is counted
        assert_eq!(normalize("o0o0o"), "oo");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "",
            "F u c k this",
            "Sooooo   AMAZING!!! 3 b3ds, 2 baths @ $250k",
            "pool-side 4-plex *** 100% occupied",
            "a.a.a.a.a",
            "Lake   Front - - - Dock!!!1!",
            "0o0o0o 11!!ii 55$$ss",
            "MiXeD_CaSe-with.punctuation*and spaces",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_variations_single_axis_substitutions() {
        let v = variations("bass");
        assert!(v.contains(&"8ass".to_string()));
        assert!(v.contains(&"b@ss".to_string()));
        assert!(v.contains(&"b4ss".to_string()));
        assert!(v.contains(&"ba$$".to_string()));
        assert!(v.contains(&"ba55".to_string()));
        // no Cartesian product
        assert!(!v.contains(&"8@ss".to_string()));
    }

    #[test]
    fn test_variations_truncations() {
        let v = variations("fuck");
        assert_eq!(v, vec!["fuc".to_string()]);

        let v = variations("cunts");
        assert!(v.contains(&"cunt".to_string()));
        assert!(v.contains(&"cun".to_string()));

        assert!(variations("abc").iter().all(|v| v.len() == 3));
    }

    #[test]
    fn test_strip_vowels() {
        assert_eq!(strip_vowels("bullshit"), "bllsht");
    }

    #[test]
    fn test_matcher_catches_spaced_and_leet_spellings() {
        let matcher = TermMatcher::default();
        assert!(matcher.contains(&PreparedText::new("f u c k this"), "fuck"));
        assert!(matcher.contains(&PreparedText::new("what a BULL$H1T deal"), "bullshit"));
        assert!(matcher.contains(&PreparedText::new("total a$$hole"), "asshole"));
        assert!(!matcher.contains(&PreparedText::new("lovely family home"), "fuck"));
    }

    #[test]
    fn test_matcher_vowel_skeleton_can_be_disabled() {
        let text = PreparedText::new("such a bllsht listing");
        assert!(TermMatcher::new(true).contains(&text, "bullshit"));
        assert!(!TermMatcher::new(false).contains(&text, "bullshit"));
    }

    #[test]
    fn test_truncation_variants_reach_into_longer_words() {
        // Terms are kept out of the builtin list when this happens to them
        let matcher = TermMatcher::new(false);
        assert!(matcher.contains(&PreparedText::new("Walk to retail"), "retard"));
        assert!(matcher.contains(&PreparedText::new("Glass house"), "asshole"));
        assert!(matcher.contains(&PreparedText::new("Fuchsia wall"), "fuck"));
        assert!(matcher.contains(&PreparedText::new("New horse barn"), "whores"));
    }

    #[test]
    fn test_vowel_skeleton_over_matches_unrelated_words() {
        let text = PreparedText::new("Brown kraft cabinets");
        assert!(TermMatcher::new(true).contains(&text, "wanker"));
        assert!(!TermMatcher::new(false).contains(&text, "wanker"));

        let text = PreparedText::new("Long gravel driveway");
        assert!(TermMatcher::new(true).contains(&text, "nigger"));
        assert!(!TermMatcher::new(false).contains(&text, "nigger"));
    }

    #[test]
    fn test_vowel_skeleton_requires_long_terms() {
        assert!(!vowel_skeleton_matches("abc", "bc", "bc"));
        assert!(!vowel_skeleton_matches("aeio", "x", "x"));
        assert!(vowel_skeleton_matches("dickhead", "dckhd", ""));
    }
}
