use regex::Regex;
use std::sync::OnceLock;

/// Remove ASCII control characters (`\x00`-`\x1f`) so a value can never break out of
/// the single-line fields consumers expect.
pub(crate) fn strip_control<S: AsRef<str>>(s: S) -> String {
    CONTROL_CHARS_RE
        .get_or_init(|| Regex::new(r"[\x00-\x1f]").unwrap())
        .replace_all(s.as_ref(), "")
        .to_string()
}

static CONTROL_CHARS_RE: OnceLock<Regex> = OnceLock::new();
