pub mod archiver;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod parser;
pub mod pipeline;

pub use config::{ExtractionStrategy, Settings};
pub use error::{Result, ScrapeError};
pub use fetcher::{Fetcher, HttpFetcher};
pub use models::Product;
