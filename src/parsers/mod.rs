use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ScrapeError;
use crate::models::Rating;

static PRICE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+(?:\.\d+)?$").expect("Invalid price regex")
});

// Word-form ratings the site uses in place of numbers
const RATING_TOKENS: [(&str, u8); 5] = [
    ("One", 1),
    ("Two", 2),
    ("Three", 3),
    ("Four", 4),
    ("Five", 5),
];

/// Clean and normalize text by removing extra whitespace and decoding HTML entities
pub fn clean_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    decoded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Parse a listing price like "£51.77": the first character is the currency
/// symbol, the remainder must be a plain decimal number.
pub fn parse_price(price_text: &str) -> Result<f64, ScrapeError> {
    let mut chars = price_text.chars();
    chars.next();
    let numeric = chars.as_str().trim();

    if !PRICE_REGEX.is_match(numeric) {
        return Err(ScrapeError::Format {
            field: "price",
            value: price_text.to_string(),
        });
    }

    numeric.parse::<f64>().map_err(|_| ScrapeError::Format {
        field: "price",
        value: price_text.to_string(),
    })
}

/// Map a rating token ("One".."Five") to its numeric rating. Anything
/// outside the five known tokens is malformed and fails the batch.
pub fn parse_rating(token: &str) -> Result<Rating, ScrapeError> {
    RATING_TOKENS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|&(_, value)| Rating(value))
        .ok_or_else(|| ScrapeError::Format {
            field: "rating",
            value: token.to_string(),
        })
}
