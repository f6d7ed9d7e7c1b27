use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::ScrapeError;
use crate::models::{BookRow, Rating, RawBookRecord};
use crate::parsers::{parse_price, parse_rating};

/// Convert collector output into typed rows. Pure and order-preserving;
/// the first malformed field fails the whole batch.
pub fn normalize(records: Vec<RawBookRecord>) -> Result<Vec<BookRow>, ScrapeError> {
    records.into_iter().map(normalize_record).collect()
}

fn normalize_record(record: RawBookRecord) -> Result<BookRow, ScrapeError> {
    let price = parse_price(&record.price_text)?;
    let rating = parse_rating(&record.rating_token)?;

    Ok(BookRow {
        title: record.title,
        price,
        availability_text: record.availability_text,
        rating,
        category: record.category,
        detail_url: record.detail_url,
    })
}

/// Immutable ordered collection of normalized rows. Built once per scrape,
/// then only read.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    rows: Vec<BookRow>,
}

impl Dataset {
    pub fn from_records(records: Vec<RawBookRecord>) -> Result<Self, ScrapeError> {
        Ok(Self {
            rows: normalize(records)?,
        })
    }

    pub fn rows(&self) -> &[BookRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted unique categories, for filter option lists.
    pub fn categories(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.rows.iter().map(|r| r.category.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }

    pub fn price_range(&self) -> Option<(f64, f64)> {
        let mut prices = self.rows.iter().map(|r| r.price);
        let first = prices.next()?;
        Some(prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    pub fn filter(&self, filter: &BookFilter) -> Vec<&BookRow> {
        self.rows.iter().filter(|row| filter.matches(row)).collect()
    }

    pub fn summary(&self) -> DatasetSummary {
        let book_count = self.rows.len();
        let unique_titles = self
            .rows
            .iter()
            .map(|r| r.title.as_str())
            .collect::<BTreeSet<_>>()
            .len();
        let category_count = self.categories().len();

        let (avg_price, avg_rating) = if book_count == 0 {
            (0.0, 0.0)
        } else {
            let price_sum: f64 = self.rows.iter().map(|r| r.price).sum();
            let rating_sum: u32 = self.rows.iter().map(|r| u32::from(r.rating.value())).sum();
            (
                price_sum / book_count as f64,
                f64::from(rating_sum) / book_count as f64,
            )
        };

        DatasetSummary {
            book_count,
            unique_titles,
            category_count,
            avg_price,
            avg_rating,
        }
    }

    /// Book count per category, most populated first.
    pub fn category_counts(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.category.as_str()).or_default() += 1;
        }

        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(category, count)| (category.to_string(), count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }
}

/// Row selection mirroring the dashboard sidebar: category membership,
/// inclusive price bounds, rating membership. `None` leaves a dimension
/// unconstrained.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub categories: Option<BTreeSet<String>>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub ratings: Option<BTreeSet<Rating>>,
}

impl BookFilter {
    pub fn matches(&self, row: &BookRow) -> bool {
        if let Some(categories) = &self.categories {
            if !categories.contains(&row.category) {
                return false;
            }
        }

        if let Some(min) = self.price_min {
            if row.price < min {
                return false;
            }
        }
        if let Some(max) = self.price_max {
            if row.price > max {
                return false;
            }
        }

        if let Some(ratings) = &self.ratings {
            if !ratings.contains(&row.rating) {
                return false;
            }
        }

        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub book_count: usize,
    pub unique_titles: usize,
    pub category_count: usize,
    pub avg_price: f64,
    pub avg_rating: f64,
}
