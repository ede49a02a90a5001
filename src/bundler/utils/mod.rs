//! Shared helpers for bundle assembly.

pub mod fs;

use regex::Regex;
use std::sync::LazyLock;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]").expect("non-alphanumeric regex is valid"));

/// Strips every character that is not an ASCII letter or digit.
///
/// Used for bundle identifier segments and internal build names, both of
/// which must not contain spaces, dots or punctuation.
pub fn alphanumeric(value: &str) -> String {
    NON_ALPHANUMERIC.replace_all(value, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_everything_but_letters_and_digits() {
        assert_eq!(alphanumeric("Report Server 2"), "ReportServer2");
        assert_eq!(alphanumeric("i-net Clear.Reports!"), "inetClearReports");
        assert_eq!(alphanumeric("Ünïcode"), "ncode");
        assert_eq!(alphanumeric(""), "");
    }
}
