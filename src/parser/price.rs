use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

// Struck-through list price followed by the sale price: "15 $20", "$15.00 $9.99".
static DISCOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$?\d[\d.,]*\s+\$\d[\d.,]*(\s|$)").unwrap());

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\$?\d[\d.,]*$").unwrap());

const FREE: &str = "FREE";
const PAY_WHAT_YOU_WANT: &str = "Pay What You Want";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Price {
    Regular(String),
    Sale { normal: String, sale: String },
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Regular(p) => write!(f, "Price: {}", p),
            Price::Sale { normal, sale } => {
                write!(f, "Normal Price: {}\nSale Price: {}", normal, sale)
            }
        }
    }
}

/// Recognise a price line. Returns `None` when the line is not a price.
pub fn extract_price(line: &str) -> Option<Price> {
    let line = line.trim();

    if DISCOUNT_RE.is_match(line) {
        let mut tokens = line.split_whitespace();
        let normal = tokens.next()?.to_string();
        let sale = tokens.next()?.to_string();
        let extra: Vec<&str> = tokens.collect();
        // Prose that merely opens with two amounts stays in the description.
        if extra.iter().any(|t| !AMOUNT_RE.is_match(t)) {
            return None;
        }
        if !extra.is_empty() {
            warn!(line, extra = ?extra, "ignoring unexpected tokens in sale price");
        }
        return Some(Price::Sale { normal, sale });
    }

    if line.starts_with('$') || line == FREE || line == PAY_WHAT_YOU_WANT {
        return Some(Price::Regular(line.to_string()));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_price() {
        let p = extract_price("15 $20").unwrap();
        assert_eq!(p.to_string(), "Normal Price: 15\nSale Price: $20");
    }

    #[test]
    fn sale_price_with_dollar_signs() {
        let p = extract_price("$14.99 $9.99").unwrap();
        assert_eq!(
            p,
            Price::Sale {
                normal: "$14.99".into(),
                sale: "$9.99".into()
            }
        );
    }

    #[test]
    fn sale_price_extra_tokens_ignored() {
        let p = extract_price("15 $20 $25").unwrap();
        assert_eq!(p.to_string(), "Normal Price: 15\nSale Price: $20");
    }

    #[test]
    fn regular_price() {
        assert_eq!(extract_price("$5.00").unwrap().to_string(), "Price: $5.00");
    }

    #[test]
    fn free_and_pwyw() {
        assert_eq!(extract_price("FREE").unwrap().to_string(), "Price: FREE");
        assert_eq!(
            extract_price("Pay What You Want").unwrap().to_string(),
            "Price: Pay What You Want"
        );
    }

    #[test]
    fn not_a_price() {
        assert!(extract_price("A town of 15 houses").is_none());
        assert!(extract_price("Free stuff inside").is_none());
        assert!(extract_price("2024 edition").is_none());
    }

    #[test]
    fn amounts_followed_by_prose_are_not_a_sale() {
        assert!(extract_price("10 $1 coins and maps").is_none());
        assert!(extract_price("3 $5-off vouchers").is_none());
    }
}
