use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("invalid configuration for {key}: {reason}")]
    Config { key: &'static str, reason: String },

    #[error("invalid CSS selector '{0}'")]
    InvalidSelector(String),

    #[error("request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    // headless_chrome reports failures as anyhow errors, which carry no std::error::Error impl.
    #[error("browser session failed: {0:#}")]
    Browser(anyhow::Error),

    #[error("could not extract {field}: {reason}")]
    Parse { field: &'static str, reason: String },

    #[error("failed to write csv: {0}")]
    Write(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("page '{name}' failed: {source}")]
    Page {
        name: &'static str,
        source: Box<ScrapeError>,
    },
}

impl ScrapeError {
    pub fn missing(field: &'static str, selector: &str) -> Self {
        ScrapeError::Parse {
            field,
            reason: format!("no element matches '{}'", selector),
        }
    }

    pub fn not_numeric(field: &'static str, text: &str) -> Self {
        ScrapeError::Parse {
            field,
            reason: format!("'{}' is not a valid number", text),
        }
    }

    pub fn on_page(self, name: &'static str) -> Self {
        ScrapeError::Page {
            name,
            source: Box::new(self),
        }
    }

    pub fn config(key: &'static str, reason: impl Into<String>) -> Self {
        ScrapeError::Config {
            key,
            reason: reason.into(),
        }
    }
}

impl From<anyhow::Error> for ScrapeError {
    fn from(err: anyhow::Error) -> Self {
        ScrapeError::Browser(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_name_the_field() {
        let err = ScrapeError::not_numeric("price", "N/A");
        assert_eq!(err.to_string(), "could not extract price: 'N/A' is not a valid number");

        let err = ScrapeError::missing("title", ".title");
        assert!(err.to_string().contains("'.title'"));
    }

    #[test]
    fn page_errors_keep_their_cause() {
        let err = ScrapeError::not_numeric("price", "free").on_page("computers");
        assert_eq!(
            err.to_string(),
            "page 'computers' failed: could not extract price: 'free' is not a valid number"
        );
        let cause = std::error::Error::source(&err).unwrap();
        assert!(cause.to_string().starts_with("could not extract price"));
    }
}
