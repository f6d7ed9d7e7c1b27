use anyhow::Result;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

mod cache;
mod config;
mod dataset;
mod error;
mod models;
mod parsers;
mod scrapers;
mod utils;

use crate::cache::DatasetCache;
use crate::config::Config;
use crate::dataset::BookFilter;
use crate::models::Rating;
use crate::scrapers::BooksToScrapeScraper;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("book_scraper=info".parse()?),
        )
        .init();

    info!("Starting Book Scraper");

    let config = Arc::new(Config::load()?);

    let client = utils::http::create_client(&config)?;
    let scraper = BooksToScrapeScraper::new(config.clone());
    let cache = DatasetCache::new(config.cache_ttl_seconds);

    let dataset = cache
        .get_or_refresh(&client, &scraper, config.page_count)
        .await?;

    let summary = dataset.summary();
    info!(
        "Scraped {} books: {} unique titles across {} categories",
        summary.book_count, summary.unique_titles, summary.category_count
    );
    info!(
        "Average price £{:.2}, average rating {:.2}",
        summary.avg_price, summary.avg_rating
    );

    if let Some((min, max)) = dataset.price_range() {
        info!("Prices range from £{:.2} to £{:.2}", min, max);
    }

    for (category, count) in dataset.category_counts() {
        info!("{:>3} books in {}", count, category);
    }

    let five_star = dataset.filter(&BookFilter {
        ratings: Some(BTreeSet::from([Rating(5)])),
        ..Default::default()
    });
    info!("{} books rated five stars", five_star.len());

    Ok(())
}
