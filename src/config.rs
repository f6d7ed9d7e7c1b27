use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub page_count: u32,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub cache_ttl_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub base_url: String,
}

impl SiteConfig {
    /// Listing pages live at {base}/catalogue/page-{n}.html, n starting at 1.
    pub fn listing_url(&self, page: u32) -> String {
        format!("{}/catalogue/page-{}.html", self.base_url, page)
    }

    /// Root the relative detail links resolve against.
    pub fn catalogue_url(&self) -> String {
        format!("{}/catalogue/", self.base_url)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Config {
            site: SiteConfig {
                name: "Books to Scrape".to_string(),
                base_url: "http://books.toscrape.com".to_string(),
            },
            page_count: 5,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36".to_string(),
            request_timeout_secs: 25,
            cache_ttl_seconds: 3600,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_listing_urls_from_template() {
        let config = Config::load().unwrap();
        assert_eq!(
            config.site.listing_url(1),
            "http://books.toscrape.com/catalogue/page-1.html"
        );
        assert_eq!(
            config.site.listing_url(5),
            "http://books.toscrape.com/catalogue/page-5.html"
        );
    }
}
