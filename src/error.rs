//! Error type for everything outside the animation engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Download failed (connection, timeout, non-2xx status)
    #[error("HTTP error fetching {url}: {message}")]
    Http { url: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error in {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// The loaded series cannot be animated
    #[error("Data error: {0}")]
    Data(String),
}

impl Error {
    pub fn http(url: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Http { url: url.into(), message: err.to_string() }
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_source() {
        let err = Error::http("https://example.test/00.json", "timed out");
        assert_eq!(err.to_string(), "HTTP error fetching https://example.test/00.json: timed out");
        assert_eq!(Error::data("no snapshots").to_string(), "Data error: no snapshots");
    }

    #[test]
    fn io_converts() {
        fn open() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        assert!(matches!(open(), Err(Error::Io(_))));
    }
}
