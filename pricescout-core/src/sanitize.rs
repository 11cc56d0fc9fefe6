//! Clean-up for loose JSON emitted by generative backends.
//!
//! Applied only before the loose array parse. The tight strategy parses
//! its match as-is.

use regex::Regex;
use std::sync::LazyLock;

static REPEATED_COMMAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(?:\s*,)+").expect("valid regex"));

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([\]}])").expect("valid regex"));

/// Sanitise a JSON fragment.
///
/// - control characters (below U+0020) become a single space
/// - runs of commas collapse to one
/// - a comma directly before `]` or `}` is removed
///
/// The result is a fixed point: `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(json_text: &str) -> String {
    let spaced: String = json_text
        .chars()
        .map(|c| if (c as u32) < 0x20 { ' ' } else { c })
        .collect();
    let collapsed = REPEATED_COMMAS.replace_all(&spaced, ",");
    TRAILING_COMMA.replace_all(&collapsed, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_characters_become_spaces() {
        assert_eq!(sanitize("[\n{\"a\":\t1}\r]"), "[ {\"a\": 1} ]");
        assert_eq!(sanitize("a\u{0}b"), "a b");
    }

    #[test]
    fn trailing_comma_before_bracket_removed() {
        assert_eq!(sanitize("[1, 2, 3,]"), "[1, 2, 3]");
        assert_eq!(sanitize("{\"a\": 1, }"), "{\"a\": 1}");
    }

    #[test]
    fn repeated_commas_collapsed() {
        assert_eq!(sanitize("[1,, 2,,,3]"), "[1, 2,3]");
        assert_eq!(sanitize("[1, , 2]"), "[1, 2]");
    }

    #[test]
    fn repeated_then_trailing() {
        assert_eq!(sanitize("[1,,]"), "[1]");
        assert_eq!(sanitize("[{\"a\":1},\n,\n]"), "[{\"a\":1}]");
    }

    #[test]
    fn well_formed_json_untouched() {
        let input = r##"[{"Product":"X","Price":"$1","Store":"S","URL":"#"}]"##;
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn sanitize_is_idempotent() {
        let samples = [
            "",
            "[1,,]",
            "[ , , ]",
            "{\"a\":[1,2,],,\"b\":{\"c\":3,},}",
            "line\none\ttwo\r\n,,,]",
            ",}],],",
            "[1,],]",
            "no json at all",
        ];
        for sample in samples {
            let once = sanitize(sample);
            let twice = sanitize(&once);
            assert_eq!(once, twice, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn non_ascii_preserved() {
        assert_eq!(sanitize("[\"café\", \"€5\",]"), "[\"café\", \"€5\"]");
    }
}
