use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::models::Product;

/// Writes `products` to `<dir>/<name>.csv`, replacing any previous file.
pub fn save_to_csv(products: &[Product], dir: &Path, name: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.csv", name));

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)?;
    wtr.write_record(Product::COLUMNS)?;
    for product in products {
        wtr.serialize(product)?;
    }
    wtr.flush()?;

    info!(path = %path.display(), rows = products.len(), "Products saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample(n: usize) -> Vec<Product> {
        (0..n)
            .map(|i| Product {
                title: format!("Product {}", i),
                description: "Quad-core, 8GB RAM, \"fast\"".to_string(),
                price: 100.0 + i as f64,
                rating: (i % 6) as u32,
                num_of_reviews: i as u32,
            })
            .collect()
    }

    #[test]
    fn rows_read_back_in_order() {
        let dir = TempDir::new().unwrap();
        let products = sample(3);
        let path = save_to_csv(&products, dir.path(), "laptops").unwrap();
        assert_eq!(path, dir.path().join("laptops.csv"));

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(headers, csv::StringRecord::from(Product::COLUMNS.to_vec()));

        let back: Vec<Product> = rdr.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(back, products);
    }

    #[test]
    fn prices_keep_their_decimal_form() {
        let dir = TempDir::new().unwrap();
        let products: Vec<Product> = [400.0, 295.99, 0.0, 10.5]
            .into_iter()
            .map(|price| Product {
                title: "t".to_string(),
                description: "d".to_string(),
                price,
                rating: 4,
                num_of_reviews: 12,
            })
            .collect();
        let path = save_to_csv(&products, dir.path(), "computers").unwrap();

        let text = fs::read_to_string(path).unwrap();
        let rows: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(
            rows,
            ["t,d,400.0,4,12", "t,d,295.99,4,12", "t,d,0.0,4,12", "t,d,10.5,4,12"]
        );
    }

    #[test]
    fn second_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let products = sample(2);
        save_to_csv(&products, dir.path(), "phones").unwrap();
        let path = save_to_csv(&products, dir.path(), "phones").unwrap();

        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn empty_list_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = save_to_csv(&[], dir.path(), "touch").unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text, "title,description,price,rating,num_of_reviews\n");
    }

    #[test]
    fn unwritable_target_fails() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("home.csv")).unwrap();
        assert!(save_to_csv(&sample(1), dir.path(), "home").is_err());
    }
}
