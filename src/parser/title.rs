use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::ParseAnomaly;

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\bdate\s*added\s*:\s*").unwrap());

const DATE_LEN: usize = 10;

/// Title line split at the `Date Added:` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleSplit<'a> {
    pub title: String,
    pub remainder: &'a str,
}

/// Separate the product title from everything after the `Date Added:` marker.
/// Separators left between title and marker ("—", "-", "|") are dropped.
pub fn split_title(line: &str) -> Result<TitleSplit<'_>, ParseAnomaly> {
    let m = MARKER_RE
        .find(line)
        .ok_or_else(|| ParseAnomaly::MissingDateMarker(line.to_string()))?;

    let title = line[..m.start()]
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '–' | '—' | '|'))
        .trim_start()
        .to_string();

    Ok(TitleSplit {
        title,
        remainder: &line[m.end()..],
    })
}

/// The first token after the marker carries the date in its first ten
/// characters; whatever follows, in that token and after it, is trailing text.
pub fn parse_date(remainder: &str) -> Result<(NaiveDate, String), ParseAnomaly> {
    let mut tokens = remainder.split_whitespace();
    let token = tokens
        .next()
        .ok_or_else(|| ParseAnomaly::MissingDate(remainder.to_string()))?;

    let (date_part, rest) = match (token.get(..DATE_LEN), token.get(DATE_LEN..)) {
        (Some(d), Some(r)) => (d, r),
        _ => return Err(ParseAnomaly::MalformedDate(token.to_string())),
    };

    let date_added = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| ParseAnomaly::MalformedDate(token.to_string()))?;

    let trailing = std::iter::once(rest)
        .chain(tokens)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Ok((date_added, trailing))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Parsed {
        title: String,
        date_added: NaiveDate,
        trailing: String,
    }

    fn parse_title_line(line: &str) -> Result<Parsed, ParseAnomaly> {
        let split = split_title(line)?;
        let (date_added, trailing) = parse_date(split.remainder)?;
        Ok(Parsed {
            title: split.title,
            date_added,
            trailing,
        })
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn em_dash_separator_and_trailing_text() {
        let t = parse_title_line(
            "Curse of Strahd (Fantasy Grounds Edition) — Date Added: 2024-05-01 more text",
        )
        .unwrap();
        assert_eq!(t.title, "Curse of Strahd (Fantasy Grounds Edition)");
        assert_eq!(t.date_added, date("2024-05-01"));
        assert_eq!(t.trailing, "more text");
    }

    #[test]
    fn irregular_spacing() {
        let t = parse_title_line("Tomb Raid   Date   Added:   2023-11-20").unwrap();
        assert_eq!(t.title, "Tomb Raid");
        assert_eq!(t.date_added, date("2023-11-20"));
        assert_eq!(t.trailing, "");
    }

    #[test]
    fn case_insensitive_marker() {
        let t = parse_title_line("Lost Mine DATE ADDED: 2024-01-02").unwrap();
        assert_eq!(t.title, "Lost Mine");
    }

    #[test]
    fn text_glued_to_date() {
        let t = parse_title_line("Hoard Date Added: 2024-05-01Publisher: Someone else").unwrap();
        assert_eq!(t.date_added, date("2024-05-01"));
        assert_eq!(t.trailing, "Publisher: Someone else");
    }

    #[test]
    fn missing_marker() {
        let err = parse_title_line("Curse of Strahd 2024-05-01").unwrap_err();
        assert!(matches!(err, ParseAnomaly::MissingDateMarker(_)));
    }

    #[test]
    fn nothing_after_marker() {
        let err = parse_title_line("Curse of Strahd Date Added:   ").unwrap_err();
        assert!(matches!(err, ParseAnomaly::MissingDate(_)));
    }

    #[test]
    fn short_or_bad_date() {
        assert!(matches!(
            parse_title_line("X Date Added: 2024-5-1").unwrap_err(),
            ParseAnomaly::MalformedDate(_)
        ));
        assert!(matches!(
            parse_title_line("X Date Added: yesterday!!").unwrap_err(),
            ParseAnomaly::MalformedDate(_)
        ));
    }

    #[test]
    fn multibyte_date_token_does_not_panic() {
        let err = parse_title_line("X Date Added: 2024-05-ü1").unwrap_err();
        assert!(matches!(err, ParseAnomaly::MalformedDate(_)));
    }
}
