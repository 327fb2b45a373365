use chrono::NaiveDate;
use url::Url;

use crate::parser::price::Price;

/// Discord rejects message content above this many characters.
pub const MESSAGE_LIMIT: usize = 2000;

/// Path of the search page itself. Rows sometimes link back to it instead of
/// to a product.
const SEARCH_ENDPOINT: &str = "browse.php";

const CALL_TO_ACTION: &str = "[*click the link below for more information*]";
const UNKNOWN_PRICE: &str = "Price: Unknown";

/// A listing entry that survived extraction and deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedProduct {
    pub title: String,
    pub date_added: NaiveDate,
    pub description: Vec<String>,
    pub price: Option<Price>,
    pub link: String,
}

impl ParsedProduct {
    pub fn points_at_search(&self) -> bool {
        self.link.contains(SEARCH_ENDPOINT)
    }

    /// Product link with the referral parameter appended.
    pub fn affiliate_link(&self, affiliate_id: &str) -> String {
        if affiliate_id.is_empty() {
            return self.link.clone();
        }
        match Url::parse(&self.link) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("affiliate_id", affiliate_id);
                url.into()
            }
            Err(_) => {
                let sep = if self.link.contains('?') { '&' } else { '?' };
                format!("{}{}affiliate_id={}", self.link, sep, affiliate_id)
            }
        }
    }

    /// Render the channel message, at most [`MESSAGE_LIMIT`] characters.
    /// The description is shortened first, then the title; the link always
    /// survives.
    pub fn format(&self, affiliate_id: &str) -> String {
        let date = self.date_added.format("%Y-%m-%d").to_string();
        let head = |title: &str| {
            format!(
                "**__{}__**\n**Date Added**: {}\n**Description**:\n",
                title, date
            )
        };
        let price = self
            .price
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| UNKNOWN_PRICE.to_string());
        let tail = format!(
            "{}\n{}\n**Link**: {}",
            CALL_TO_ACTION,
            price,
            self.affiliate_link(affiliate_id)
        );
        let tail_len = tail.chars().count();

        let mut header = head(&self.title);
        if header.chars().count() + tail_len > MESSAGE_LIMIT {
            let frame = head("").chars().count();
            let room = MESSAGE_LIMIT.saturating_sub(frame + tail_len + 1);
            let mut title = truncate(&self.title, room);
            title.push('…');
            header = head(&title);
        }

        let mut description: String = self
            .description
            .iter()
            .map(|line| format!("{}\n", line))
            .collect();

        let budget = MESSAGE_LIMIT.saturating_sub(header.chars().count() + tail_len);
        if description.chars().count() > budget {
            description = if budget >= 2 {
                let mut cut = truncate(&description, budget - 2);
                cut.push_str("…\n");
                cut
            } else {
                String::new()
            };
        }

        format!("{}{}{}", header, description, tail)
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
