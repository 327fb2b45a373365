use std::sync::LazyLock;

use regex::Regex;

static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)https?://").unwrap());

/// Token that starts the "[click here for more...]" trailer.
const READ_MORE_TOKEN: &str = "[click";

/// Clean one free-text line for posting: drop the read-more trailer, strip
/// URL schemes so the channel does not unfurl previews, collapse whitespace.
pub fn normalize(line: &str) -> String {
    line.split_whitespace()
        .map(strip_schemes)
        .filter(|t| !t.is_empty())
        .take_while(|t| t != READ_MORE_TOKEN)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Removing one scheme can splice a new one together ("hthttp://tp://"),
/// so repeat until nothing matches.
fn strip_schemes(token: &str) -> String {
    let mut out = token.to_string();
    while SCHEME_RE.is_match(&out) {
        out = SCHEME_RE.replace_all(&out, "").into_owned();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_click_trailer() {
        assert_eq!(
            normalize("A haunted manor adventure. [click here for more...]"),
            "A haunted manor adventure."
        );
    }

    #[test]
    fn strips_url_schemes() {
        assert_eq!(
            normalize("See https://example.com/a and http://foo.org"),
            "See example.com/a and foo.org"
        );
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("  one\t two   three  "), "one two three");
    }

    #[test]
    fn bare_scheme_token_disappears() {
        assert_eq!(normalize("before https:// after"), "before after");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("[click here]"), "");
    }

    #[test]
    fn idempotent() {
        let inputs = [
            "A haunted manor adventure. [click here for more...]",
            "hthttp://tp://example.com nested",
            "before https:// after",
            "https://[click trailing",
            "   spaced    out   text ",
            "HTTPS://Example.COM",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", input);
        }
    }
}
