use std::sync::LazyLock;

use regex::Regex;

static DEF_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap_or_else(|err| panic!("def name pattern: {err}"))
});

/// `true` if `name` can identify a def: an ASCII letter or underscore
/// followed by letters, digits and underscores.
///
/// ```
/// use dg_def::is_valid_def_name;
///
/// assert!(is_valid_def_name("TestDef"));
/// assert!(!is_valid_def_name("1NumberPrefix"));
/// ```
pub fn is_valid_def_name(name: &str) -> bool {
    DEF_NAME.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::is_valid_def_name;

    #[test]
    fn accepted_names() {
        for name in ["TestDef", "_hidden", "a", "Snake_Case_9"] {
            assert!(is_valid_def_name(name), "{name}");
        }
    }

    #[test]
    fn rejected_names() {
        for name in ["1NumberPrefix", "Contains Spaces", "HasPunctuation!", "", "Ümlaut"] {
            assert!(!is_valid_def_name(name), "{name}");
        }
    }
}
