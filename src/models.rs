use serde::{Deserialize, Serialize};

/// One product card scraped from a listing page.
///
/// Field order is the CSV column order; rows are written through serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub rating: u32,
    pub num_of_reviews: u32,
}

impl Product {
    /// Header row, kept so an empty page still gets one.
    pub const COLUMNS: [&'static str; 5] =
        ["title", "description", "price", "rating", "num_of_reviews"];
}
