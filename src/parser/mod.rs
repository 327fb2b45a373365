pub mod lines;
pub mod price;
pub mod text;
pub mod title;

use chrono::NaiveDate;

use crate::dedup::{DedupMemory, Verdict};
use crate::error::ParseAnomaly;
use crate::listing::ListingEntry;
use crate::message::ParsedProduct;
use lines::BodyLine;

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Only titles containing this substring are considered. `None` keeps all.
    pub title_filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoLink,
    Anomaly(ParseAnomaly),
    Filtered,
    NotToday(NaiveDate),
    AlreadySeen,
    SearchLink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Kept(ParsedProduct),
    Skipped {
        title: Option<String>,
        reason: SkipReason,
    },
}

impl Extraction {
    fn skip(title: Option<&str>, reason: SkipReason) -> Self {
        Extraction::Skipped {
            title: title.map(str::to_string),
            reason,
        }
    }
}

/// Row text → lines → title/date → dedup → product. Every title that gets as
/// far as a parsed date is recorded in `memory`, whether or not it is kept.
pub fn process_entry(
    entry: &ListingEntry,
    options: &ExtractOptions,
    memory: &mut DedupMemory,
) -> Extraction {
    let Some(link) = entry.link.as_deref() else {
        return Extraction::skip(None, SkipReason::NoLink);
    };

    let Some(classified) = lines::classify_entry(&entry.text) else {
        return Extraction::skip(None, SkipReason::Anomaly(ParseAnomaly::Empty));
    };

    let split = match title::split_title(&classified.title_line) {
        Ok(s) => s,
        Err(e) => return Extraction::skip(None, SkipReason::Anomaly(e)),
    };
    let title = split.title.as_str();

    if let Some(filter) = options.title_filter.as_deref() {
        if !title.contains(filter) {
            return Extraction::skip(Some(title), SkipReason::Filtered);
        }
    }

    let (date_added, trailing) = match title::parse_date(split.remainder) {
        Ok(parsed) => parsed,
        Err(e) => return Extraction::skip(Some(title), SkipReason::Anomaly(e)),
    };

    match memory.observe(title, date_added) {
        Verdict::Fresh => {}
        Verdict::AlreadySeen => return Extraction::skip(Some(title), SkipReason::AlreadySeen),
        Verdict::NotToday => {
            return Extraction::skip(Some(title), SkipReason::NotToday(date_added))
        }
    }

    let mut description = Vec::new();
    let mut price = None;
    let trailing = text::normalize(&trailing);
    if !trailing.is_empty() {
        description.push(trailing);
    }
    for line in classified.body {
        match line {
            BodyLine::Footer => {}
            // A later price line replaces an earlier one.
            BodyLine::Price(p) => price = Some(p),
            BodyLine::Text(t) => {
                let t = text::normalize(&t);
                if !t.is_empty() {
                    description.push(t);
                }
            }
        }
    }

    let product = ParsedProduct {
        title: split.title,
        date_added,
        description,
        price,
        link: link.to_string(),
    };

    if product.points_at_search() {
        return Extraction::Skipped {
            title: Some(product.title),
            reason: SkipReason::SearchLink,
        };
    }

    Extraction::Kept(product)
}
