use async_trait::async_trait;
use reqwest::Client;

use crate::config::SiteConfig;
use crate::error::ScrapeError;
use crate::models::RawBookRecord;

mod books_toscrape;

pub use books_toscrape::BooksToScrapeScraper;

#[async_trait]
pub trait BookScraper: Send + Sync {
    /// Walk listing pages 1..=page_count in order and produce one raw record
    /// per book. The first failed fetch or parse aborts the whole run.
    async fn collect(
        &self,
        client: &Client,
        page_count: u32,
    ) -> Result<Vec<RawBookRecord>, ScrapeError>;

    fn site_config(&self) -> &SiteConfig;
}
