use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.productListing tr").unwrap());
static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// One product row of the search results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Concatenated text nodes of the row, newlines as in the page source.
    pub text: String,
    /// `href` of the first anchor in the row, made absolute.
    pub link: Option<String>,
}

/// Pull every row out of the product listing table.
pub fn extract_rows(html: &str, base: &Url) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);

    document
        .select(&ROW_SELECTOR)
        .map(|row| {
            let text = row.text().collect::<String>();
            let link = row
                .select(&ANCHOR_SELECTOR)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| resolve(base, href));
            ListingEntry { text, link }
        })
        .collect()
}

fn resolve(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.dmsguild.com").unwrap()
    }

    #[test]
    fn fixture_rows() {
        let html = std::fs::read_to_string("tests/fixtures/browse.html").unwrap();
        let rows = extract_rows(&html, &base());
        assert_eq!(rows.len(), 6);

        // Header row has no anchor
        assert!(rows[0].link.is_none());

        assert_eq!(
            rows[1].link.as_deref(),
            Some("https://www.dmsguild.com/product/480001/Curse-of-Strahd-Fantasy-Grounds")
        );
        assert!(rows[1].text.contains("Date Added: 2024-05-01"));
        assert!(rows[1].text.contains("$5.00"));
    }

    #[test]
    fn relative_links_resolved() {
        let html = r#"<table class="productListing"><tr><td>
            <a href="/product/1/Thing">Thing</a> Date Added: 2024-05-01
        </td></tr></table>"#;
        let rows = extract_rows(html, &base());
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].link.as_deref(),
            Some("https://www.dmsguild.com/product/1/Thing")
        );
    }

    #[test]
    fn other_tables_ignored() {
        let html = r#"<table class="nav"><tr><td><a href="/x">x</a></td></tr></table>"#;
        assert!(extract_rows(html, &base()).is_empty());
    }
}
