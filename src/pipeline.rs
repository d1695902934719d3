use std::path::PathBuf;

use tracing::{error, info};
use url::Url;

use crate::archiver;
use crate::config::{ExtractionStrategy, Settings};
use crate::error::{Result, ScrapeError};
use crate::fetcher::Fetcher;
use crate::models::Product;
use crate::parser::{self, Selectors};

#[derive(Debug, Clone, PartialEq)]
pub struct PageReport {
    pub name: &'static str,
    pub url: Url,
    pub products: usize,
    pub path: PathBuf,
}

/// Static HTML for `url`, or the browser-rendered page when it hides items
/// behind a "load more" control.
pub fn fetch_listing<F: Fetcher>(fetcher: &F, selectors: &Selectors, url: &Url) -> Result<String> {
    let html = fetcher.get(url)?;
    if parser::has_load_more(&parser::parse_document(&html), selectors) {
        info!(%url, "load more control found, rendering in browser");
        return fetcher.get_rendered(url);
    }
    Ok(html)
}

pub fn scrape_page<F: Fetcher>(
    fetcher: &F,
    selectors: &Selectors,
    settings: &Settings,
    url: &Url,
) -> Result<Vec<Product>> {
    let html = fetch_listing(fetcher, selectors, url)?;
    let doc = parser::parse_document(&html);
    let cards = parser::locate_cards(&doc, selectors);
    info!(%url, cards = cards.len(), "cards located");

    cards
        .into_iter()
        .map(|card| match settings.strategy {
            ExtractionStrategy::Inline => parser::extract_inline(card, selectors),
            ExtractionStrategy::DetailPage => {
                let link = parser::card_link(card, selectors)?;
                let detail_url = settings.base_url.join(&link)?;
                let detail_html = fetcher.get(&detail_url)?;
                let detail = parser::parse_document(&detail_html);
                let region = parser::locate_cards(&detail, selectors)
                    .into_iter()
                    .next()
                    .ok_or_else(|| ScrapeError::missing("num_of_reviews", parser::CARD))?;
                parser::extract_with_region(card, region, selectors)
            }
        })
        .collect()
}

/// Scrapes every configured page in order and writes one CSV per page.
/// The first failure aborts the run.
pub fn run<F: Fetcher>(fetcher: &F, settings: &Settings) -> Result<Vec<PageReport>> {
    let selectors = Selectors::new()?;
    let mut reports = Vec::new();

    for (url, name) in settings.page_urls()? {
        info!(%url, name, strategy = ?settings.strategy, "scraping page");
        let products = scrape_page(fetcher, &selectors, settings, &url)
            .inspect_err(|e| error!(%url, name, "page failed: {}", e))
            .map_err(|e| e.on_page(name))?;
        let path = archiver::save_to_csv(&products, &settings.output_dir, name)
            .map_err(|e| e.on_page(name))?;
        reports.push(PageReport {
            name,
            url,
            products: products.len(),
            path,
        });
    }

    Ok(reports)
}
