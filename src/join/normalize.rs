use std::sync::LazyLock;

use regex::Regex;

static NOT_KEY_CHAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").expect("valid regex"));
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Join key form of an artist or track name.
///
/// Lowercases and trims, then deletes everything but `a-z`, `0-9` and
/// whitespace, then collapses whitespace runs to one space. Trimming comes
/// first, so whitespace uncovered by the deletion survives as a single
/// space: `"Beyoncé!! "` gives `"beyonc"` but `"AC / DC"` gives `"ac dc"`
/// and `"x !"` gives `"x "`. A missing value normalizes to `""`.
pub fn normalize_text(s: Option<&str>) -> String {
    let Some(s) = s else {
        return String::new();
    };
    let lowered = s.to_lowercase();
    let stripped = NOT_KEY_CHAR.replace_all(lowered.trim(), "");
    WHITESPACE_RUN.replace_all(&stripped, " ").into_owned()
}
