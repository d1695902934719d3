use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::{Result, ScrapeError};

pub const DEFAULT_BASE_URL: &str = "https://webscraper.io/";
pub const LISTING_ROOT: &str = "test-sites/e-commerce/more/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Listing pages relative to `LISTING_ROOT`, paired with the CSV they produce.
pub const PAGES: [(&str, &str); 6] = [
    ("", "home"),
    ("computers/", "computers"),
    ("phones/", "phones"),
    ("computers/laptops/", "laptops"),
    ("computers/tablets/", "tablets"),
    ("phones/touch/", "touch"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Every field comes from the listing card.
    Inline,
    /// Reviews and rating come from the product's own page.
    DetailPage,
}

impl FromStr for ExtractionStrategy {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(ExtractionStrategy::Inline),
            "detail" | "detail-page" => Ok(ExtractionStrategy::DetailPage),
            other => Err(ScrapeError::config(
                "SCRAPER_STRATEGY",
                format!("unknown strategy '{}', expected 'inline' or 'detail'", other),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: Url,
    pub strategy: ExtractionStrategy,
    pub output_dir: PathBuf,
    pub max_load_more: usize,
    pub click_delay: Duration,
    pub headless: bool,
    pub user_agent: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Settings with every knob at its default.
    pub fn defaults() -> Result<Self> {
        Self::from_lookup(|_| None)
    }

    /// Builds settings from any key lookup, falling back to defaults for absent keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_base = lookup("SCRAPER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut base_url = Url::parse(raw_base.trim())
            .map_err(|e| ScrapeError::config("SCRAPER_BASE_URL", e.to_string()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut settings = Settings {
            base_url,
            strategy: ExtractionStrategy::Inline,
            output_dir: PathBuf::from("."),
            max_load_more: 100,
            click_delay: Duration::from_millis(500),
            headless: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        };

        if let Some(raw) = lookup("SCRAPER_STRATEGY") {
            settings.strategy = raw.parse()?;
        }
        if let Some(raw) = lookup("SCRAPER_OUTPUT_DIR") {
            settings.output_dir = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("SCRAPER_MAX_LOAD_MORE") {
            settings.max_load_more = parse_number("SCRAPER_MAX_LOAD_MORE", &raw)?;
        }
        if let Some(raw) = lookup("SCRAPER_CLICK_DELAY_MS") {
            settings.click_delay =
                Duration::from_millis(parse_number("SCRAPER_CLICK_DELAY_MS", &raw)?);
        }
        if let Some(raw) = lookup("SCRAPER_HEADLESS") {
            settings.headless = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(ScrapeError::config(
                        "SCRAPER_HEADLESS",
                        format!("expected a boolean, got '{}'", other),
                    ));
                }
            };
        }
        if let Some(raw) = lookup("SCRAPER_USER_AGENT") {
            settings.user_agent = raw;
        }

        Ok(settings)
    }

    /// Resolved listing URLs with their output names, in run order.
    pub fn page_urls(&self) -> Result<Vec<(Url, &'static str)>> {
        let root = self.base_url.join(LISTING_ROOT)?;
        PAGES
            .iter()
            .map(|(path, name)| Ok((root.join(path)?, *name)))
            .collect()
    }
}

fn parse_number<T: FromStr>(key: &'static str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| ScrapeError::config(key, format!("'{}' is not a number", raw)))
}
