use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::dataset::Dataset;
use crate::error::ScrapeError;
use crate::scrapers::BookScraper;

struct CacheEntry {
    page_count: u32,
    dataset: Arc<Dataset>,
    fetched_at: DateTime<Utc>,
}

/// Process-lifetime dataset cache. An entry is reused only while its
/// page_count matches the request and it is younger than the TTL; anything
/// else triggers a full Collector + Normalizer run.
pub struct DatasetCache {
    ttl: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

impl DatasetCache {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_seconds),
            entry: Mutex::new(None),
        }
    }

    pub async fn get_or_refresh(
        &self,
        client: &Client,
        scraper: &dyn BookScraper,
        page_count: u32,
    ) -> Result<Arc<Dataset>, ScrapeError> {
        let mut entry = self.entry.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.page_count == page_count && Utc::now() - cached.fetched_at < self.ttl {
                info!("Using cached dataset ({} rows)", cached.dataset.len());
                return Ok(cached.dataset.clone());
            }
        }

        info!("Refreshing dataset over {} listing pages", page_count);

        // A failed run must not leave a stale entry behind
        *entry = None;

        let records = scraper.collect(client, page_count).await?;
        let dataset = Arc::new(Dataset::from_records(records)?);

        *entry = Some(CacheEntry {
            page_count,
            dataset: dataset.clone(),
            fetched_at: Utc::now(),
        });

        Ok(dataset)
    }

    pub async fn invalidate(&self) {
        let mut entry = self.entry.lock().await;
        *entry = None;
        info!("Dataset cache invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::{Config, SiteConfig};
    use crate::models::{RawBookRecord, Rating};
    use crate::scrapers::BooksToScrapeScraper;

    struct FakeScraper {
        site: SiteConfig,
        calls: AtomicU32,
        fail_first: bool,
    }

    impl FakeScraper {
        fn new(fail_first: bool) -> Self {
            Self {
                site: SiteConfig {
                    name: "Books to Scrape".to_string(),
                    base_url: "http://test".to_string(),
                },
                calls: AtomicU32::new(0),
                fail_first,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BookScraper for FakeScraper {
        async fn collect(
            &self,
            _client: &Client,
            _page_count: u32,
        ) -> Result<Vec<RawBookRecord>, ScrapeError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && call == 0 {
                return Err(ScrapeError::Parse {
                    url: "http://test/catalogue/page-1.html".to_string(),
                    what: "product pod container",
                });
            }

            Ok(vec![RawBookRecord {
                title: "Sapiens".to_string(),
                price_text: "£54.23".to_string(),
                availability_text: "In stock".to_string(),
                rating_token: "Five".to_string(),
                detail_url: "http://test/catalogue/sapiens_1/index.html".to_string(),
                category: "History".to_string(),
            }])
        }

        fn site_config(&self) -> &SiteConfig {
            &self.site
        }
    }

    #[tokio::test]
    async fn fresh_entry_is_reused() {
        let cache = DatasetCache::new(3600);
        let scraper = FakeScraper::new(false);
        let client = Client::new();

        let first = cache.get_or_refresh(&client, &scraper, 5).await.unwrap();
        let second = cache.get_or_refresh(&client, &scraper, 5).await.unwrap();

        assert_eq!(scraper.calls(), 1);
        assert_eq!(first.rows(), second.rows());
    }

    #[tokio::test]
    async fn page_count_change_forces_a_refresh() {
        let cache = DatasetCache::new(3600);
        let scraper = FakeScraper::new(false);
        let client = Client::new();

        cache.get_or_refresh(&client, &scraper, 1).await.unwrap();
        cache.get_or_refresh(&client, &scraper, 2).await.unwrap();

        assert_eq!(scraper.calls(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_a_refresh() {
        let cache = DatasetCache::new(3600);
        let scraper = FakeScraper::new(false);
        let client = Client::new();

        cache.get_or_refresh(&client, &scraper, 5).await.unwrap();
        cache.invalidate().await;
        cache.get_or_refresh(&client, &scraper, 5).await.unwrap();

        assert_eq!(scraper.calls(), 2);
    }

    #[tokio::test]
    async fn expired_entry_is_refreshed() {
        let cache = DatasetCache::new(0);
        let scraper = FakeScraper::new(false);
        let client = Client::new();

        cache.get_or_refresh(&client, &scraper, 5).await.unwrap();
        cache.get_or_refresh(&client, &scraper, 5).await.unwrap();

        assert_eq!(scraper.calls(), 2);
    }

    #[tokio::test]
    async fn failed_run_propagates_and_is_not_cached() {
        let cache = DatasetCache::new(3600);
        let scraper = FakeScraper::new(true);
        let client = Client::new();

        let err = cache.get_or_refresh(&client, &scraper, 5).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Parse { .. }));

        // Next read runs the pipeline again instead of serving anything stale
        let dataset = cache.get_or_refresh(&client, &scraper, 5).await.unwrap();
        assert_eq!(scraper.calls(), 2);
        assert_eq!(dataset.len(), 1);
    }

    #[tokio::test]
    async fn end_to_end_single_book_pipeline() {
        let server = MockServer::start().await;

        let listing = r#"<html><body><ol class="row">
            <article class="product_pod">
                <p class="star-rating Three"></p>
                <h3><a href="../../../a-light-in-the-attic_1000/index.html"
                       title="A Light in the Attic">A Light in the ...</a></h3>
                <div class="product_price">
                    <p class="price_color">£51.77</p>
                    <p class="instock availability"><i class="icon-ok"></i> In stock</p>
                </div>
            </article>
        </ol></body></html>"#;

        let detail = r#"<html><body>
            <ul class="breadcrumb">
                <li><a href="../index.html">Home</a></li>
                <li><a href="../category/books_1/index.html">Books</a></li>
                <li><a href="../category/books/poetry_23/index.html">Poetry</a></li>
                <li class="active">A Light in the Attic</li>
            </ul>
        </body></html>"#;

        Mock::given(method("GET"))
            .and(path("/catalogue/page-1.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/catalogue/a-light-in-the-attic_1000/index.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail))
            .mount(&server)
            .await;

        let config = Arc::new(Config {
            site: SiteConfig {
                name: "Books to Scrape".to_string(),
                base_url: server.uri(),
            },
            page_count: 1,
            user_agent: "book-scraper-tests".to_string(),
            request_timeout_secs: 5,
            cache_ttl_seconds: 3600,
        });
        let scraper = BooksToScrapeScraper::new(config);
        let client = Client::new();
        let cache = DatasetCache::new(3600);

        let dataset = cache.get_or_refresh(&client, &scraper, 1).await.unwrap();

        assert_eq!(dataset.len(), 1);
        let row = &dataset.rows()[0];
        assert_eq!(row.title, "A Light in the Attic");
        assert_eq!(row.price, 51.77);
        assert_eq!(row.rating, Rating(3));
        assert_eq!(row.category, "Poetry");
        assert_eq!(row.availability_text, "In stock");
        assert_eq!(
            row.detail_url,
            format!("{}/catalogue/a-light-in-the-attic_1000/index.html", server.uri())
        );
    }
}
