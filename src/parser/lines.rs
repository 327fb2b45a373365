use super::price::{self, Price};

/// Storefront name printed at the bottom of every listing row.
pub const STOREFRONT_FOOTER: &str = "Dungeon Masters Guild";

/// A line below the title line, tagged by what the assembler does with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyLine {
    Footer,
    Price(Price),
    Text(String),
}

/// Title line plus the tagged lines under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEntry {
    pub title_line: String,
    pub body: Vec<BodyLine>,
}

/// Split flattened row text into trimmed non-blank lines, order preserved.
pub fn classify(raw_text: &str) -> Vec<String> {
    raw_text
        .replace("\r\n", "\n")
        .split('\n')
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

/// First surviving line is the title line; the rest are tagged body lines.
/// Returns `None` for an entry with no text at all.
pub fn classify_entry(raw_text: &str) -> Option<ClassifiedEntry> {
    let mut lines = classify(raw_text).into_iter();
    let title_line = lines.next()?;
    let body = lines.map(|l| classify_body_line(&l)).collect();
    Some(ClassifiedEntry { title_line, body })
}

fn classify_body_line(line: &str) -> BodyLine {
    if line == STOREFRONT_FOOTER {
        return BodyLine::Footer;
    }
    match price::extract_price(line) {
        Some(p) => BodyLine::Price(p),
        None => BodyLine::Text(line.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_blank_lines_and_trims() {
        let lines = classify("\n  first  \n\n \t\nsecond\r\n   \nthird");
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn empty_text() {
        assert!(classify("").is_empty());
        assert!(classify_entry(" \n\n ").is_none());
    }

    #[test]
    fn tags_body_lines() {
        let entry = classify_entry(
            "Title Date Added: 2024-05-01\nA description\nDungeon Masters Guild\n$4.95",
        )
        .unwrap();
        assert_eq!(entry.title_line, "Title Date Added: 2024-05-01");
        assert_eq!(entry.body.len(), 3);
        assert_eq!(entry.body[0], BodyLine::Text("A description".into()));
        assert_eq!(entry.body[1], BodyLine::Footer);
        assert!(matches!(entry.body[2], BodyLine::Price(_)));
    }

    #[test]
    fn title_only() {
        let entry = classify_entry("Just a title").unwrap();
        assert_eq!(entry.title_line, "Just a title");
        assert!(entry.body.is_empty());
    }
}
