use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use crate::config::{Config, SiteConfig};
use crate::error::ScrapeError;
use crate::models::RawBookRecord;
use crate::parsers::clean_text;
use crate::scrapers::BookScraper;
use crate::utils::http::fetch;

static PRODUCT_POD: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article.product_pod").expect("Invalid product pod selector"));
static TITLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h3 a").expect("Invalid title link selector"));
static PRICE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.price_color").expect("Invalid price selector"));
static AVAILABILITY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.instock.availability").expect("Invalid availability selector"));
static STAR_RATING: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.star-rating").expect("Invalid star rating selector"));
static BREADCRUMB_ITEM: Lazy<Selector> =
    Lazy::new(|| Selector::parse("ul.breadcrumb li").expect("Invalid breadcrumb selector"));

pub struct BooksToScrapeScraper {
    config: Arc<Config>,
}

impl BooksToScrapeScraper {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

/// Listing-page fields for one book, before the detail-page category lookup.
#[derive(Debug, Clone)]
struct ListingEntry {
    title: String,
    price_text: String,
    availability_text: String,
    rating_token: String,
    relative_href: String,
}

#[async_trait]
impl BookScraper for BooksToScrapeScraper {
    async fn collect(
        &self,
        client: &Client,
        page_count: u32,
    ) -> Result<Vec<RawBookRecord>, ScrapeError> {
        let site = self.site_config();
        info!("Scraping {} listing pages from {}", page_count, site.name);

        let mut records = Vec::new();

        for page in 1..=page_count {
            let listing_url = site.listing_url(page);
            let response = fetch(client, &listing_url).await?;
            let html = response.text().await.map_err(|source| ScrapeError::Fetch {
                url: listing_url.clone(),
                source,
            })?;

            let entries = extract_listing_entries(&html, &listing_url)?;
            info!("Found {} books on listing page {}", entries.len(), page);

            for entry in entries {
                let detail_url = resolve_detail_url(site, &entry.relative_href)?;
                debug!("Fetching detail page {}", detail_url);

                let detail_response = fetch(client, &detail_url).await?;
                let detail_html =
                    detail_response
                        .text()
                        .await
                        .map_err(|source| ScrapeError::Fetch {
                            url: detail_url.clone(),
                            source,
                        })?;
                let category = extract_category(&detail_html, &detail_url)?;

                records.push(RawBookRecord {
                    title: entry.title,
                    price_text: entry.price_text,
                    availability_text: entry.availability_text,
                    rating_token: entry.rating_token,
                    detail_url,
                    category,
                });
            }
        }

        Ok(records)
    }

    fn site_config(&self) -> &SiteConfig {
        &self.config.site
    }
}

/// Pull the per-book summary fields out of one listing page, in document
/// order. All the site-specific selector conventions live here.
fn extract_listing_entries(html: &str, url: &str) -> Result<Vec<ListingEntry>, ScrapeError> {
    let document = Html::parse_document(html);

    let mut entries = Vec::new();

    for pod in document.select(&PRODUCT_POD) {
        let link = pod
            .select(&TITLE_LINK)
            .next()
            .ok_or_else(|| missing(url, "book title link"))?;
        let title = link
            .value()
            .attr("title")
            .ok_or_else(|| missing(url, "title attribute"))?
            .to_string();
        let relative_href = link
            .value()
            .attr("href")
            .ok_or_else(|| missing(url, "detail link"))?
            .to_string();

        let price_text = pod
            .select(&PRICE)
            .next()
            .map(|el| clean_text(&el.text().collect::<String>()))
            .ok_or_else(|| missing(url, "price"))?;

        let availability_text = pod
            .select(&AVAILABILITY)
            .next()
            .map(|el| clean_text(&el.text().collect::<String>()))
            .ok_or_else(|| missing(url, "availability"))?;

        // Rating is carried as the second class token, e.g. "star-rating Three"
        let rating_token = pod
            .select(&STAR_RATING)
            .next()
            .and_then(|el| el.value().attr("class"))
            .and_then(|classes| classes.split_whitespace().nth(1))
            .map(str::to_string)
            .ok_or_else(|| missing(url, "star rating"))?;

        entries.push(ListingEntry {
            title,
            price_text,
            availability_text,
            rating_token,
            relative_href,
        });
    }

    if entries.is_empty() {
        return Err(missing(url, "product pod container"));
    }

    Ok(entries)
}

/// Listing hrefs look like ../../../some-title_123/index.html and resolve
/// against the catalogue root once the ../ hops are dropped.
fn resolve_detail_url(site: &SiteConfig, relative_href: &str) -> Result<String, ScrapeError> {
    let stripped = relative_href.trim_start_matches("../");

    let base = Url::parse(&site.catalogue_url())
        .map_err(|_| missing(&site.base_url, "valid catalogue base URL"))?;
    let resolved = base
        .join(stripped)
        .map_err(|_| missing(relative_href, "resolvable detail link"))?;

    Ok(resolved.to_string())
}

/// Category is the third breadcrumb entry; the first two are the Home and
/// Books navigation labels.
fn extract_category(html: &str, url: &str) -> Result<String, ScrapeError> {
    let document = Html::parse_document(html);

    document
        .select(&BREADCRUMB_ITEM)
        .nth(2)
        .map(|el| clean_text(&el.text().collect::<String>()))
        .ok_or_else(|| missing(url, "breadcrumb category"))
}

fn missing(url: &str, what: &'static str) -> ScrapeError {
    ScrapeError::Parse {
        url: url.to_string(),
        what,
    }
}
