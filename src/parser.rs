use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, ScrapeError};
use crate::models::Product;

pub const CARD: &str = ".card";
pub const TITLE: &str = ".title";
pub const DESCRIPTION: &str = ".description";
pub const PRICE: &str = ".price";
pub const REVIEW_COUNT: &str = ".review-count";
pub const FILLED_STAR: &str = ".ws-icon-star";
pub const LOAD_MORE: &str = ".ecomerce-items-scroll-more";
pub const COOKIE_ACCEPT: &str = ".acceptCookies";

/// Compiled selectors for the product card layout.
pub struct Selectors {
    pub card: Selector,
    pub title: Selector,
    pub description: Selector,
    pub price: Selector,
    pub review_count: Selector,
    pub filled_star: Selector,
    pub load_more: Selector,
}

impl Selectors {
    pub fn new() -> Result<Self> {
        Ok(Selectors {
            card: compile(CARD)?,
            title: compile(TITLE)?,
            description: compile(DESCRIPTION)?,
            price: compile(PRICE)?,
            review_count: compile(REVIEW_COUNT)?,
            filled_star: compile(FILLED_STAR)?,
            load_more: compile(LOAD_MORE)?,
        })
    }
}

fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|_| ScrapeError::InvalidSelector(css.to_string()))
}

pub fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}

/// All product cards in document order. A page without cards yields an empty list.
pub fn locate_cards<'a>(doc: &'a Html, selectors: &Selectors) -> Vec<ElementRef<'a>> {
    doc.select(&selectors.card).collect()
}

pub fn has_load_more(doc: &Html, selectors: &Selectors) -> bool {
    doc.select(&selectors.load_more).next().is_some()
}

/// Builds a product from a listing card alone.
pub fn extract_inline(card: ElementRef<'_>, selectors: &Selectors) -> Result<Product> {
    extract_with_region(card, card, selectors)
}

/// Builds a product whose title, description and price come from `card`
/// while review count and rating are read from `region`.
pub fn extract_with_region(
    card: ElementRef<'_>,
    region: ElementRef<'_>,
    selectors: &Selectors,
) -> Result<Product> {
    let title = first(card, &selectors.title, "title", TITLE)?
        .value()
        .attr("title")
        .map(clean_text)
        .ok_or_else(|| ScrapeError::Parse {
            field: "title",
            reason: "title element has no title attribute".to_string(),
        })?;
    if title.is_empty() {
        return Err(ScrapeError::Parse {
            field: "title",
            reason: "title attribute is empty".to_string(),
        });
    }

    let description = first_text(card, &selectors.description, "description", DESCRIPTION)?;
    let price = parse_price(&first_text(card, &selectors.price, "price", PRICE)?)?;

    let reviews = first(region, &selectors.review_count, "num_of_reviews", REVIEW_COUNT)?;
    let num_of_reviews = parse_review_count(&reviews.text().collect::<String>())?;
    let rating = count_stars(region, selectors);

    Ok(Product {
        title,
        description,
        price,
        rating,
        num_of_reviews,
    })
}

/// Link from a listing card to its product page, as written in the markup.
pub fn card_link(card: ElementRef<'_>, selectors: &Selectors) -> Result<String> {
    first(card, &selectors.title, "title", TITLE)?
        .value()
        .attr("href")
        .map(|href| href.trim().to_string())
        .ok_or_else(|| ScrapeError::Parse {
            field: "title",
            reason: "title element has no href".to_string(),
        })
}

pub fn count_stars(region: ElementRef<'_>, selectors: &Selectors) -> u32 {
    region.select(&selectors.filled_star).count() as u32
}

/// Trims whitespace and non-breaking spaces from both ends.
pub fn clean_text(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{a0}')
        .to_string()
}

pub fn parse_price(raw: &str) -> Result<f64> {
    let cleaned = clean_text(raw);
    let amount = cleaned.strip_prefix('$').unwrap_or(&cleaned).trim();
    match amount.parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(price),
        _ => Err(ScrapeError::not_numeric("price", raw)),
    }
}

/// Reads the leading count out of text like `"\n\t5 reviews\n"`.
pub fn parse_review_count(raw: &str) -> Result<u32> {
    let flattened = raw.replace(['\t', '\n'], "");
    let token = flattened
        .split_whitespace()
        .next()
        .ok_or_else(|| ScrapeError::not_numeric("num_of_reviews", raw))?;
    token
        .parse()
        .map_err(|_| ScrapeError::not_numeric("num_of_reviews", raw))
}

fn first<'a>(
    scope: ElementRef<'a>,
    selector: &Selector,
    field: &'static str,
    css: &str,
) -> Result<ElementRef<'a>> {
    scope
        .select(selector)
        .next()
        .ok_or_else(|| ScrapeError::missing(field, css))
}

fn first_text(
    scope: ElementRef<'_>,
    selector: &Selector,
    field: &'static str,
    css: &str,
) -> Result<String> {
    let element = first(scope, selector, field, css)?;
    element
        .text()
        .next()
        .map(clean_text)
        .ok_or_else(|| ScrapeError::Parse {
            field,
            reason: format!("'{}' has no text", css),
        })
}
