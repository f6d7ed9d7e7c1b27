use serde::{Deserialize, Serialize};
use std::fmt;

/// One book as lifted off the site, every field still in its on-page
/// textual form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBookRecord {
    pub title: String,
    pub price_text: String,
    pub availability_text: String,
    pub rating_token: String,
    pub detail_url: String,
    pub category: String,
}

// NewType pattern for type safety
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Rating(pub u8);

impl Rating {
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fully normalized book: price and rating coerced into numeric form,
/// every other field carried over from the raw record unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRow {
    pub title: String,
    pub price: f64,
    pub availability_text: String,
    pub rating: Rating,
    pub category: String,
    pub detail_url: String,
}
