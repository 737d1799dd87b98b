use once_cell::sync::Lazy;
use regex::Regex;

/// A word starts at an uppercase letter and runs until the next one.
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Lu}\P{Lu}*").unwrap());

/// Split a concatenated action identifier into lowercase words.
///
/// `GetBucketPolicy` becomes `["get", "bucket", "policy"]`. Text before the
/// first uppercase letter is not a word, so an identifier without any
/// uppercase letter yields an empty sequence.
pub fn tokenize(action: &str) -> Vec<String> {
    WORD_RE
        .find_iter(action)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}
