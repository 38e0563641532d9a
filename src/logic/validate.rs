use regex::Regex;
use std::sync::LazyLock;

static VALID_TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").unwrap());

/// Shown when a typed name cannot become a tag
pub const INVALID_TAG_HINT: &str = "Valid characters include a-z, 0-9, and '_'.";

/// Shown when a typed name is acceptable but matches no new option
pub const EXISTING_TAG_HINT: &str = "Tag already exists.";

/// True iff `candidate` is made up entirely of `a-z`, `0-9` and `_`.
pub fn is_valid_tag_name(candidate: &str) -> bool {
    VALID_TAG_NAME.is_match(candidate)
}

/// Hint for a tag picker that has no option to offer for `input`.
///
/// A well-formed name that produced no option must already be in the list,
/// anything else is rejected for its characters.
pub fn option_hint(input: &str) -> &'static str {
    if is_valid_tag_name(input) {
        EXISTING_TAG_HINT
    } else {
        INVALID_TAG_HINT
    }
}
